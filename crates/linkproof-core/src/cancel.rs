//! Cooperative cancellation.
//!
//! A [`ProtocolSession`](crate::ProtocolSession) checks its token once per
//! round. Clones share one flag, so another thread (a deadline watchdog,
//! a shutdown handler) can stop a session it does not own.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Fresh, not-cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state_across_threads() {
        let t = CancellationToken::new();
        let t2 = t.clone();
        assert!(!t.is_cancelled());
        std::thread::spawn(move || t2.cancel())
            .join()
            .expect("join");
        assert!(t.is_cancelled());
    }
}
