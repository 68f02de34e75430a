//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(test)]
use std::sync::atomic::AtomicUsize;

/// Shared, advisory abort flag.
///
/// Clones observe the same flag, so a host can keep one clone and hand
/// another to a running clustering. The engine polls it between stages, at
/// the top of every pass, before every node step and before every node of
/// the convergence sweep.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    #[cfg(test)]
    polls_left: Option<Arc<AtomicUsize>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request early termination. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        #[cfg(test)]
        if let Some(polls) = &self.polls_left {
            if polls.fetch_sub(1, Ordering::Relaxed) <= 1 {
                self.cancel();
            }
        }
        self.flag.load(Ordering::Relaxed)
    }

    /// A token that cancels itself on its `polls`-th check.
    #[cfg(test)]
    pub(crate) fn tripping_after(polls: usize) -> Self {
        Self { polls_left: Some(Arc::new(AtomicUsize::new(polls))), ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_and_idempotent() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn test_tripping_token_fires_on_nth_poll() {
        let token = CancellationToken::tripping_after(2);
        assert!(!token.is_cancelled());
        assert!(token.is_cancelled());
        assert!(token.is_cancelled());
    }
}
