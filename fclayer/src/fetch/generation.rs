//! Fetch generations.
//!
//! A generation is one fetch-and-render cycle for one viewport. Every task it
//! spawns holds a clone of its [`GenerationToken`]; superseding the
//! generation cancels the token, and results are checked against it before
//! they are used.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Monotonic generation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationId(pub u64);

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// Shared marker for one generation: an id, a cancellation flag and a count
/// of in-flight operations.
#[derive(Debug, Clone)]
pub struct GenerationToken {
    id: GenerationId,
    cancel: CancellationToken,
    outstanding: Arc<AtomicUsize>,
}

impl GenerationToken {
    pub fn new(id: GenerationId) -> Self {
        Self {
            id,
            cancel: CancellationToken::new(),
            outstanding: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Marks the generation superseded. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Completes when the generation is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Registers an in-flight operation until the guard is dropped.
    pub fn track(&self) -> OperationGuard {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        OperationGuard {
            outstanding: Arc::clone(&self.outstanding),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }
}

/// Decrements the owning generation's outstanding count on drop.
#[derive(Debug)]
pub struct OperationGuard {
    outstanding: Arc<AtomicUsize>,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_shared_by_clones() {
        let token = GenerationToken::new(GenerationId(1));
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_outstanding_counter() {
        let token = GenerationToken::new(GenerationId(2));
        let a = token.track();
        let b = token.clone().track();
        assert_eq!(token.outstanding(), 2);
        drop(a);
        assert_eq!(token.outstanding(), 1);
        drop(b);
        assert_eq!(token.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_future_resolves() {
        let token = GenerationToken::new(GenerationId(3));
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("cancellation observed")
            .unwrap();
    }

    #[test]
    fn test_display() {
        assert_eq!(GenerationId(7).to_string(), "gen-7");
    }
}
