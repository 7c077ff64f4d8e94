use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Identifies one spawn batch and its frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub u64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Cooperative cancellation flag shared between a run and its scheduled frames.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A pending frame callback. Ticking a frame whose token was cancelled, or whose
/// run is no longer current, does nothing.
#[derive(Debug, Clone)]
pub struct ScheduledFrame {
    pub run: RunId,
    pub token: CancelToken,
}

impl ScheduledFrame {
    pub fn is_live(&self) -> bool {
        !self.token.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let frame = ScheduledFrame {
            run: RunId(3),
            token: token.clone(),
        };
        assert!(frame.is_live());
        token.cancel();
        assert!(!frame.is_live());
    }
}
