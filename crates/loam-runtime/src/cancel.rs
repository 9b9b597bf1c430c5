//! Per-cycle cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returned by worker stages that observed a cancelled token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("generation cycle cancelled")]
pub struct Cancelled;

/// Shared flag polled by workers between chunk units.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Hands out one live token per cycle. Arming a new cycle cancels the previous token.
#[derive(Debug, Default)]
pub struct CancellationController {
    current: CancelToken,
    shut_down: bool,
}

impl CancellationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels whatever cycle holds the current token and arms a fresh one. After
    /// [`CancellationController::shutdown`] the returned token is already cancelled.
    pub fn begin_cycle(&mut self) -> CancelToken {
        self.current.cancel();
        self.current = CancelToken::new();
        if self.shut_down {
            self.current.cancel();
        }
        self.current.clone()
    }

    pub fn shutdown(&mut self) {
        self.shut_down = true;
        self.current.cancel();
    }

    #[inline]
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cycle_cancels_the_previous_token_only() {
        let mut ctl = CancellationController::new();
        let first = ctl.begin_cycle();
        let second = ctl.begin_cycle();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(first.check(), Err(Cancelled));
        assert_eq!(second.check(), Ok(()));
    }

    #[test]
    fn shutdown_cancels_current_and_future_tokens() {
        let mut ctl = CancellationController::new();
        let live = ctl.begin_cycle();
        ctl.shutdown();
        assert!(live.is_cancelled());
        assert!(ctl.begin_cycle().is_cancelled());
        assert!(ctl.is_shut_down());
    }

    #[test]
    fn clones_share_the_flag() {
        let t = CancelToken::new();
        let c = t.clone();
        c.cancel();
        assert!(t.is_cancelled());
    }
}
