use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

// ============================================================================
// Lazy Connection Slot
// ============================================================================
//
// Shared connect-or-reuse discipline for both publisher variants. Nothing
// connects at construction; the first publish triggers a guarded connect.
// The slot is re-checked after the lock is acquired, so concurrent first
// publishes share a single connect attempt. On publish failure the holder
// calls invalidate(), dropping the client so the next publish reconnects.
//
// ============================================================================

pub struct LazyConnection<C> {
    slot: Mutex<Option<Arc<C>>>,
}

impl<C> LazyConnection<C> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the held client, connecting first if the slot is empty.
    /// Competing callers wait on the lock and then reuse the winner's client.
    pub async fn get_or_connect<F, Fut, E>(&self, connect: F) -> Result<Arc<C>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<C, E>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let client = Arc::new(connect().await?);
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Drop the held client so the next get_or_connect re-establishes it.
    pub async fn invalidate(&self) {
        self.slot.lock().await.take();
    }

    pub async fn is_connected(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl<C> Default for LazyConnection<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_first_use_connects_exactly_once() {
        let lazy = LazyConnection::<u32>::new();
        let attempts = AtomicUsize::new(0);

        let publishes = (0..8).map(|_| {
            lazy.get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                // Widen the race window so competitors pile up on the lock.
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<u32, ()>(7)
            })
        });

        for client in futures_util::future::join_all(publishes).await {
            assert_eq!(*client.unwrap(), 7);
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reconnect() {
        let lazy = LazyConnection::<u32>::new();
        let attempts = AtomicUsize::new(0);

        let connect = || async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, ()>(1)
        };
        let first = lazy.get_or_connect(connect).await.unwrap();
        assert!(lazy.is_connected().await);

        lazy.invalidate().await;
        assert!(!lazy.is_connected().await);

        let second = lazy
            .get_or_connect(|| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ()>(2)
            })
            .await
            .unwrap();

        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        // The old client object was discarded, not reused.
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_failed_connect_leaves_slot_empty() {
        let lazy = LazyConnection::<u32>::new();

        let result = lazy
            .get_or_connect(|| async { Err::<u32, &str>("broker down") })
            .await;
        assert!(result.is_err());
        assert!(!lazy.is_connected().await);

        // Next attempt is free to try again and succeed.
        let client = lazy
            .get_or_connect(|| async { Ok::<u32, &str>(3) })
            .await
            .unwrap();
        assert_eq!(*client, 3);
    }
}
