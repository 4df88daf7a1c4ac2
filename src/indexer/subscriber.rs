use std::collections::HashMap;
use std::sync::Arc;

use crate::cell::HashBytes;
use crate::models::Block;

/// A fully decoded block item.
#[derive(Debug, Clone, Eq, PartialEq, serde::Serialize)]
pub struct DecodedBlock {
    /// SHA-256 of the serialized BOC.
    pub file_hash: HashBytes,
    /// Decoded block.
    pub block: Block,
}

/// Receiver of decoded items for a handler name.
pub trait Subscriber: Send + Sync {
    /// Called once per successfully decoded block.
    fn on_block(&self, block: &DecodedBlock);
}

impl<F> Subscriber for F
where
    F: Fn(&DecodedBlock) + Send + Sync,
{
    #[inline]
    fn on_block(&self, block: &DecodedBlock) {
        self(block)
    }
}

/// Subscribers keyed by the handler name.
#[derive(Default, Clone)]
pub struct Subscribers {
    inner: HashMap<String, Arc<dyn Subscriber>>,
}

impl Subscribers {
    /// Creates an empty set of subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber for the handler name, replacing the previous one.
    pub fn subscribe<S>(&mut self, handler: impl Into<String>, subscriber: S) -> &mut Self
    where
        S: Subscriber + 'static,
    {
        self.inner.insert(handler.into(), Arc::new(subscriber));
        self
    }

    /// Returns a subscriber for the handler name.
    pub fn get(&self, handler: &str) -> Option<&Arc<dyn Subscriber>> {
        self.inner.get(handler)
    }

    /// Returns `true` if there is a subscriber for the handler name.
    pub fn contains(&self, handler: &str) -> bool {
        self.inner.contains_key(handler)
    }

    /// Returns the number of registered subscribers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no registered subscribers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.inner.keys()).finish()
    }
}
