use crate::engine::{BrowserEngine, BrowserOptions};
use crate::error::{BrowserError, Result};
use crate::page::BrowserPage;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

/// Bounded pool of browser engines.
///
/// At most `capacity` engines run at once. Further requests queue on the
/// semaphore until a lease is released.
#[derive(Clone)]
pub struct BrowserPool {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    options: BrowserOptions,
}

/// A reserved pool slot without a running engine
pub struct PoolSlot {
    _permit: OwnedSemaphorePermit,
}

/// A running engine holding one pool slot until closed or dropped
pub struct BrowserLease {
    engine: BrowserEngine,
    _slot: PoolSlot,
}

impl BrowserPool {
    /// Create a pool with `capacity` slots (at least one).
    ///
    /// No engine is launched until a slot is leased.
    pub fn new(capacity: usize, options: BrowserOptions) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            options,
        }
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots not currently leased
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot without launching an engine.
    ///
    /// The slot is released when the returned [`PoolSlot`] is dropped.
    ///
    /// # Errors
    /// Returns [`BrowserError::PoolClosed`] if the semaphore was closed.
    pub async fn acquire_slot(&self) -> Result<PoolSlot> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| BrowserError::PoolClosed)?;
        Ok(PoolSlot { _permit: permit })
    }

    /// Take a free slot without waiting; `None` when every slot is leased.
    pub fn try_acquire_slot(&self) -> Option<PoolSlot> {
        Arc::clone(&self.semaphore)
            .try_acquire_owned()
            .ok()
            .map(|permit| PoolSlot { _permit: permit })
    }

    /// Wait for a free slot and launch an engine in it.
    ///
    /// Callers queue here once `capacity` leases are outstanding. If the
    /// launch fails the slot is released before the error is returned.
    ///
    /// # Errors
    /// Returns [`BrowserError::PoolClosed`] or the engine launch failure.
    pub async fn acquire(&self) -> Result<BrowserLease> {
        let slot = self.acquire_slot().await?;
        debug!(available = self.available(), "browser slot acquired");
        let engine = BrowserEngine::launch(self.options.clone()).await?;
        Ok(BrowserLease {
            engine,
            _slot: slot,
        })
    }
}

impl BrowserLease {
    /// Open a new tab on the leased engine
    pub async fn open_page(&self) -> Result<BrowserPage> {
        self.engine.open_page().await
    }

    /// Shut the engine down and release the slot
    pub async fn close(self) {
        self.engine.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_capacity_is_at_least_one() {
        let pool = BrowserPool::new(0, BrowserOptions::default());
        assert_eq!(pool.capacity(), 1);
    }

    #[tokio::test]
    async fn test_slots_are_bounded() {
        let pool = BrowserPool::new(2, BrowserOptions::default());
        let first = pool.acquire_slot().await.expect("first slot");
        let _second = pool.acquire_slot().await.expect("second slot");
        assert_eq!(pool.available(), 0);
        assert!(pool.try_acquire_slot().is_none());

        drop(first);
        assert_eq!(pool.available(), 1);
        assert!(pool.try_acquire_slot().is_some());
    }

    #[tokio::test]
    async fn test_waiters_queue_until_release() {
        let pool = BrowserPool::new(1, BrowserOptions::default());
        let held = pool.acquire_slot().await.expect("slot");

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.acquire_slot().await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter
            .await
            .expect("waiter task")
            .expect("slot after release");
    }
}
