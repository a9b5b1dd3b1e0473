//! Cache invalidation collaborators.
//!
//! The registry signals after every successful mutation. Delivery is
//! fire-and-forget: a failure here is logged by the registry and never
//! rolls the mutation back.

use tokio::sync::broadcast;

use crate::error::{DomainError, Result};

/// Tags invalidated after every registry mutation.
pub const INVALIDATION_TAGS: [&str; 2] = ["rendered", "url.site"];

/// Receives cache-tag invalidations.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, tags: &[&str]) -> Result<()>;
}

/// Discards every invalidation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _tags: &[&str]) -> Result<()> {
        Ok(())
    }
}

/// Publishes invalidated tag sets to in-process subscribers.
#[derive(Debug, Clone)]
pub struct BroadcastInvalidator {
    tx: broadcast::Sender<Vec<String>>,
}

impl BroadcastInvalidator {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Vec<String>> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastInvalidator {
    fn default() -> Self {
        Self::new(64)
    }
}

impl CacheInvalidator for BroadcastInvalidator {
    fn invalidate(&self, tags: &[&str]) -> Result<()> {
        let tags = tags.iter().map(|t| t.to_string()).collect();
        self.tx
            .send(tags)
            .map(|_| ())
            .map_err(|_| DomainError::InvalidatorFailure("no cache subscribers".into()))
    }
}
