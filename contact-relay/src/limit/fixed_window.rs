//! Fixed-window limiter held in process memory.
//!
//! Records live until the process exits. An expired record is only noticed
//! and replaced when the same key shows up again; there is no sweeper.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use super::{Decision, RateLimiter};
use crate::util::clock::{Clock, SystemClock};

/// Request count for one client inside its current window.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitRecord {
    pub count: u32,
    pub window_start: Instant,
}

impl RateLimitRecord {
    fn fresh(now: Instant) -> Self {
        Self {
            count: 1,
            window_start: now,
        }
    }
}

/// Fixed-window rate limiter backed by a sharded concurrent map.
///
/// DashMap's entry API holds the shard lock for the whole
/// check-then-increment, so two requests for the same key cannot both
/// observe the pre-increment count.
pub struct FixedWindowLimiter {
    records: DashMap<String, RateLimitRecord>,
    max_requests: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::with_clock(max_requests, window, Arc::new(SystemClock))
    }

    pub fn with_clock(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            max_requests,
            window,
            clock,
        }
    }

    /// Number of clients currently holding a record (expired ones included).
    #[cfg(test)]
    pub(crate) fn tracked_clients(&self) -> usize {
        self.records.len()
    }

    /// Snapshot of the record for `key`, if any.
    #[cfg(test)]
    pub(crate) fn record(&self, key: &str) -> Option<RateLimitRecord> {
        self.records.get(key).map(|r| *r)
    }

    fn retry_after(&self, elapsed: Duration) -> u64 {
        let remaining = self.window.saturating_sub(elapsed);
        let secs = (remaining.as_millis() + 999) / 1000;
        (secs as u64).max(1)
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn check(&self, key: &str) -> Decision {
        let now = self.clock.now();

        match self.records.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(RateLimitRecord::fresh(now));
                Decision::Admitted { count: 1 }
            }
            Entry::Occupied(mut slot) => {
                let elapsed = now.saturating_duration_since(slot.get().window_start);

                if elapsed > self.window {
                    debug!(client = %key, "rate_limit_window_reset");
                    slot.insert(RateLimitRecord::fresh(now));
                    return Decision::Admitted { count: 1 };
                }

                let record = slot.get_mut();
                if record.count >= self.max_requests {
                    return Decision::Limited {
                        retry_after_secs: self.retry_after(elapsed),
                    };
                }

                record.count += 1;
                Decision::Admitted {
                    count: record.count,
                }
            }
        }
    }
}
