//! Cooperative cancellation signal
//!
//! Every service operation receives a `CancelToken`. Long-running work checks
//! it between steps, and storage writes check it right before commit so a
//! cancelled operation never leaves a partial change behind.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, clonable cancellation flag
///
/// All clones observe the same state: once any clone calls [`CancelToken::cancel`],
/// every clone reports `is_cancelled() == true`.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signals cancellation to every clone of this token
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns a guard that cancels the token when dropped
    ///
    /// HTTP handlers hold the guard for the lifetime of the request future;
    /// if the client goes away and the future is dropped, the blocking work
    /// still running on the pool sees the cancellation before it commits.
    pub fn drop_guard(&self) -> DropGuard {
        DropGuard {
            token: self.clone(),
        }
    }
}

/// Cancels its token on drop
#[derive(Debug)]
pub struct DropGuard {
    token: CancelToken,
}

impl Drop for DropGuard {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::CancelToken;

    #[test]
    fn clones_share_cancellation() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn drop_guard_cancels_on_drop() {
        let token = CancelToken::new();
        {
            let _guard = token.drop_guard();
            assert!(!token.is_cancelled());
        }
        assert!(token.is_cancelled());
    }
}
