//! Per-identifier fixed-window rate limiting
//!
//! The limiter owns a bounded bucket map and takes its notion of time from an
//! injected [`Clock`] so windows can be driven deterministically in tests.
//! Used by the gateway client to throttle calls per model identifier.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Time source abstraction so tests can advance time manually.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time source used outside tests.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: Instant,
}

/// Fixed-window counter keyed by caller-supplied identifier.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    max_buckets: usize,
    clock: Box<dyn Clock>,
    buckets: HashMap<String, Bucket>,
}

impl RateLimiter {
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
    const DEFAULT_MAX_BUCKETS: usize = 1024;

    pub fn new(limit: u32, window: Duration) -> Self {
        Self::with_clock(limit, window, Box::new(SystemClock))
    }

    pub fn with_clock(limit: u32, window: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            limit,
            window,
            max_buckets: Self::DEFAULT_MAX_BUCKETS,
            clock,
            buckets: HashMap::new(),
        }
    }

    /// Record one call attempt for `identifier` and decide whether it may
    /// proceed within the current window.
    pub fn check(&mut self, identifier: &str) -> RateDecision {
        let now = self.clock.now();

        match self.buckets.get_mut(identifier) {
            Some(bucket) if bucket.reset_at > now => {
                if bucket.count >= self.limit {
                    return RateDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: bucket.reset_at,
                    };
                }
                bucket.count += 1;
                RateDecision {
                    allowed: true,
                    remaining: self.limit - bucket.count,
                    reset_at: bucket.reset_at,
                }
            }
            _ => {
                self.evict_if_full(now);
                let reset_at = now + self.window;
                self.buckets
                    .insert(identifier.to_string(), Bucket { count: 1, reset_at });
                RateDecision {
                    allowed: true,
                    remaining: self.limit.saturating_sub(1),
                    reset_at,
                }
            }
        }
    }

    /// Keep the bucket map bounded: drop expired windows first, then the
    /// bucket closest to expiry if the map is still at capacity.
    fn evict_if_full(&mut self, now: Instant) {
        if self.buckets.len() < self.max_buckets {
            return;
        }
        self.buckets.retain(|_, bucket| bucket.reset_at > now);
        if self.buckets.len() >= self.max_buckets {
            if let Some(oldest) = self
                .buckets
                .iter()
                .min_by_key(|(_, bucket)| bucket.reset_at)
                .map(|(id, _)| id.clone())
            {
                self.buckets.remove(&oldest);
            }
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT, Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    struct ManualClock {
        origin: Instant,
        offset_ms: Arc<AtomicU64>,
    }

    impl ManualClock {
        fn new() -> (Self, Arc<AtomicU64>) {
            let offset = Arc::new(AtomicU64::new(0));
            (
                Self {
                    origin: Instant::now(),
                    offset_ms: offset.clone(),
                },
                offset,
            )
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.origin + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    #[test]
    fn test_denies_at_limit_within_window() {
        let (clock, _offset) = ManualClock::new();
        let mut limiter = RateLimiter::with_clock(3, Duration::from_secs(60), Box::new(clock));

        assert!(limiter.check("model-a").allowed);
        assert!(limiter.check("model-a").allowed);
        let third = limiter.check("model-a");
        assert!(third.allowed);
        assert_eq!(third.remaining, 0);
        assert!(!limiter.check("model-a").allowed);
    }

    #[test]
    fn test_window_rollover_resets_count() {
        let (clock, offset) = ManualClock::new();
        let mut limiter = RateLimiter::with_clock(1, Duration::from_secs(60), Box::new(clock));

        assert!(limiter.check("model-a").allowed);
        assert!(!limiter.check("model-a").allowed);

        offset.store(61_000, Ordering::SeqCst);
        assert!(limiter.check("model-a").allowed);
    }

    #[test]
    fn test_identifiers_tracked_independently() {
        let (clock, _offset) = ManualClock::new();
        let mut limiter = RateLimiter::with_clock(1, Duration::from_secs(60), Box::new(clock));

        assert!(limiter.check("model-a").allowed);
        assert!(limiter.check("model-b").allowed);
        assert!(!limiter.check("model-a").allowed);
    }
}
