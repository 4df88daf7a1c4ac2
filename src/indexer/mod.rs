//! Consumer of the indexer item streams.
//!
//! Each configured handler is streamed on its own route (`/{kind}/{handler}`).
//! A complete payload of a block route is decoded into a [`Block`] and passed
//! to the subscriber with the handler name. Malformed items are logged and
//! skipped.
//!
//! [`Block`]: crate::models::Block

pub use self::config::{
    ConfigError, DataSource, HandlerConfig, IndexerConfig, PayloadEncoding, TransportConfig,
    TransportKind,
};
pub use self::consumer::{Consumer, ConsumerError, ConsumerStats};
pub use self::route::{ItemKind, ParseRouteError, Route};
pub use self::subscriber::{DecodedBlock, Subscriber, Subscribers};

mod config;
mod consumer;
mod route;
mod subscriber;

#[cfg(test)]
mod tests;
