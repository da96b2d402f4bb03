//! Per-client admission control.
//!
//! The gateway only sees the [`RateLimiter`] trait, so the in-process
//! [`FixedWindowLimiter`] can be swapped for a shared counter store when the
//! gateway runs on more than one instance.

pub mod fixed_window;

pub use fixed_window::{FixedWindowLimiter, RateLimitRecord};

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Request admitted; `count` is the number admitted in the current window.
    Admitted { count: u32 },
    /// Request rejected; the window reopens in `retry_after_secs`.
    Limited { retry_after_secs: u64 },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admitted { .. })
    }
}

/// Capability interface for admission control keyed by client.
pub trait RateLimiter: Send + Sync {
    /// Check and record one request for `key`.
    ///
    /// The check and the increment happen as one step per key.
    fn check(&self, key: &str) -> Decision;

    fn admit(&self, key: &str) -> bool {
        self.check(key).is_admitted()
    }
}
