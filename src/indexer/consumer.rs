use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::boc::{self, Boc};
use crate::error::Error;
use crate::indexer::config::{ConfigError, IndexerConfig};
use crate::indexer::route::{ItemKind, Route};
use crate::indexer::subscriber::{DecodedBlock, Subscriber, Subscribers};
use crate::models::Block;

/// Decodes complete item payloads and dispatches them to subscribers.
pub struct Consumer {
    config: IndexerConfig,
    routes: HashMap<Route, Option<Arc<dyn Subscriber>>>,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl Consumer {
    /// Builds the route table from the config.
    ///
    /// Routes without a subscriber are kept, items for them are rejected
    /// with [`ConsumerError::NoSubscriber`].
    pub fn new(config: IndexerConfig, subscribers: &Subscribers) -> Result<Self, ConfigError> {
        ok!(config.validate());

        let mut routes = HashMap::new();
        for route in config.routes() {
            let subscriber = subscribers.get(&route.handler).cloned();
            if subscriber.is_some() {
                tracing::info!(%route, "registered route");
            } else {
                tracing::warn!(%route, "route has no subscriber");
            }
            routes.insert(route, subscriber);
        }

        Ok(Self {
            config,
            routes,
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        })
    }

    /// Returns the consumer config.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Decodes one complete block payload using the configured encoding.
    pub fn decode(&self, payload: &[u8]) -> Result<DecodedBlock, ConsumerError> {
        let raw = ok!(self
            .config
            .payload_encoding
            .to_raw(payload)
            .map_err(ConsumerError::Boc));
        let file_hash = Boc::file_hash(&raw);

        let tree = ok!(Boc::decode(&raw).map_err(ConsumerError::Boc));
        let Some(root) = tree.root() else {
            return Err(ConsumerError::Boc(boc::de::Error::RootCellNotFound));
        };
        let block = ok!(root.parse::<Block>().map_err(ConsumerError::Decode));

        Ok(DecodedBlock { file_hash, block })
    }

    /// Resolves the route, decodes the payload and dispatches the block.
    ///
    /// Only successful deliveries are counted here.
    pub fn handle(&self, path: &str, payload: &[u8]) -> Result<(), ConsumerError> {
        let (route, subscriber) = ok!(self.resolve(path));
        let block = ok!(self.decode(payload));
        self.dispatch(route, subscriber, &block);
        Ok(())
    }

    /// Handles the item, logging and counting failures.
    ///
    /// Returns `true` if the item was delivered.
    pub fn process(&self, path: &str, payload: &[u8]) -> bool {
        match self.handle(path, payload) {
            Ok(()) => true,
            Err(e) => {
                self.on_failure(path, &e);
                false
            }
        }
    }

    /// Decodes independent payloads in parallel and dispatches them
    /// in the input order.
    ///
    /// Returns the number of delivered items.
    #[cfg(feature = "rayon")]
    pub fn process_batch<P, B>(&self, items: &[(P, B)]) -> usize
    where
        P: AsRef<str> + Sync,
        B: AsRef<[u8]> + Sync,
    {
        use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

        let decoded = items
            .par_iter()
            .map(|(path, payload)| -> Result<_, ConsumerError> {
                let (route, subscriber) = ok!(self.resolve(path.as_ref()));
                let block = ok!(self.decode(payload.as_ref()));
                Ok((route, subscriber, block))
            })
            .collect::<Vec<_>>();

        let mut delivered = 0;
        for ((path, _), item) in items.iter().zip(decoded) {
            match item {
                Ok((route, subscriber, block)) => {
                    self.dispatch(route, subscriber, &block);
                    delivered += 1;
                }
                Err(e) => self.on_failure(path.as_ref(), &e),
            }
        }
        delivered
    }

    /// Returns delivery counters.
    pub fn stats(&self) -> ConsumerStats {
        ConsumerStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn resolve(&self, path: &str) -> Result<(&Route, &Arc<dyn Subscriber>), ConsumerError> {
        let Ok(route) = path.parse::<Route>() else {
            return Err(ConsumerError::UnknownRoute(path.to_owned()));
        };
        let Some((route, subscriber)) = self.routes.get_key_value(&route) else {
            return Err(ConsumerError::UnknownRoute(path.to_owned()));
        };
        if route.kind != ItemKind::Block {
            return Err(ConsumerError::UnsupportedKind(route.kind));
        }
        match subscriber {
            Some(subscriber) => Ok((route, subscriber)),
            None => Err(ConsumerError::NoSubscriber(route.clone())),
        }
    }

    fn dispatch(&self, route: &Route, subscriber: &Arc<dyn Subscriber>, block: &DecodedBlock) {
        tracing::debug!(
            %route,
            seq_no = block.block.info.seq_no,
            file_hash = %block.file_hash,
            "decoded block"
        );
        subscriber.on_block(block);
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn on_failure(&self, path: &str, error: &ConsumerError) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(route = path, %error, "failed to process item");
    }
}

impl std::fmt::Debug for Consumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Consumer")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Delivery counters.
#[derive(Default, Debug, Clone, Copy, Eq, PartialEq)]
pub struct ConsumerStats {
    /// Blocks passed to subscribers.
    pub delivered: u64,
    /// Items skipped because of errors.
    pub failed: u64,
}

/// Error type for item processing.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ConsumerError {
    /// The path is not a configured route.
    #[error("unknown route `{0}`")]
    UnknownRoute(String),
    /// Items of this kind are not decoded.
    #[error("unsupported item kind `{0}`")]
    UnsupportedKind(ItemKind),
    /// The route has no subscriber.
    #[error("no subscriber for route `{0}`")]
    NoSubscriber(Route),
    /// Malformed BOC.
    #[error("invalid BOC")]
    Boc(#[from] boc::de::Error),
    /// Malformed block.
    #[error("invalid block")]
    Decode(#[from] Error),
}
