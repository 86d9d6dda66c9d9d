//! Per-session cancellation.
//!
//! Each [`StreamSession`](super::stream_session::StreamSession) creates its
//! own token and hands out [`CancelHandle`] clones. A handle can only signal
//! and observe; it cannot be re-armed or attached to another session, so a
//! late cancel can never hit a newer stream.

use tokio_util::sync::CancellationToken;

/// Single-use cancel signal for one stream attempt
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Signal cancellation. Calls after the first are no-ops.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once [`cancel`](Self::cancel) has been called.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_idempotent() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_clones_share_the_signal() {
        let handle = CancelHandle::new();
        let clone = handle.clone();
        clone.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_separate_handles_are_independent() {
        let a = CancelHandle::new();
        let b = CancelHandle::new();
        a.cancel();
        assert!(!b.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let handle = CancelHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });
        handle.cancel();
        task.await.unwrap();
    }
}
