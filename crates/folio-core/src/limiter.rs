//! Per-client sliding-window rate limiting.
//!
//! Each client key keeps a log of the instants at which it was admitted.
//! A request is admitted only if fewer than `limit` entries fall inside the
//! trailing `window`, so the quota holds over *any* window of that length,
//! not just aligned buckets.

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::error::{CoreError, CoreResult};
use crate::identity::ClientKey;

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    /// Over quota. `retry_after` is how long until the oldest logged request
    /// leaves the window.
    Reject { retry_after: Duration },
}

impl Decision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Decision::Admit)
    }

    pub fn into_result(self) -> CoreResult<()> {
        match self {
            Decision::Admit => Ok(()),
            Decision::Reject { retry_after } => Err(CoreError::RateLimitExceeded { retry_after }),
        }
    }
}

pub struct RateLimiter {
    limit: usize,
    window: Duration,
    history: DashMap<ClientKey, Vec<Instant>>,
}

impl RateLimiter {
    /// # Errors
    ///
    /// [`CoreError::Config`] if `limit` or `window` is zero.
    pub fn new(limit: usize, window: Duration) -> CoreResult<Self> {
        if limit == 0 {
            return Err(CoreError::Config("rate limit must be positive".to_string()));
        }
        if window.is_zero() {
            return Err(CoreError::Config("rate limit window must be positive".to_string()));
        }
        Ok(Self {
            limit,
            window,
            history: DashMap::new(),
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decides whether `key` may make a request at `now`, recording it if so.
    ///
    /// The entry guard holds the shard lock from prune to append, so two
    /// concurrent calls for the same key can never both see the last free slot.
    pub fn allow(&self, key: &ClientKey, now: Instant) -> Decision {
        let mut log = self.history.entry(key.clone()).or_default();
        prune(&mut log, now, self.window);

        if log.len() >= self.limit {
            let retry_after = log
                .iter()
                .min()
                .map(|oldest| (*oldest + self.window).saturating_duration_since(now))
                .unwrap_or(self.window);
            tracing::debug!(client = %key, in_window = log.len(), "request rejected");
            return Decision::Reject { retry_after };
        }

        log.push(now);
        tracing::debug!(client = %key, in_window = log.len(), "request admitted");
        Decision::Admit
    }

    /// Prunes every log and drops keys that have nothing left in the window.
    /// Returns the number of keys removed.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let window = self.window;
        let mut evicted = 0;
        self.history.retain(|_, log| {
            prune(log, now, window);
            let keep = !log.is_empty();
            if !keep {
                evicted += 1;
            }
            keep
        });
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.history.len(), "evicted idle clients");
        }
        evicted
    }

    pub fn tracked_keys(&self) -> usize {
        self.history.len()
    }
}

/// Drops timestamps older than `window`. One exactly `window` old still counts.
fn prune(log: &mut Vec<Instant>, now: Instant, window: Duration) {
    log.retain(|t| now.saturating_duration_since(*t) <= window);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    fn limiter(limit: usize, window_ms: u64) -> RateLimiter {
        RateLimiter::new(limit, Duration::from_millis(window_ms)).unwrap()
    }

    fn at(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    #[test]
    fn rejects_zero_limit() {
        let err = RateLimiter::new(0, Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn rejects_zero_window() {
        let err = RateLimiter::new(3, Duration::ZERO).err().unwrap();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn admits_up_to_limit_then_recovers_after_window() {
        let rl = limiter(3, 1000);
        let key = ClientKey::from("203.0.113.9");
        let t0 = Instant::now();

        for _ in 0..3 {
            assert_eq!(rl.allow(&key, t0), Decision::Admit);
        }
        assert!(!rl.allow(&key, at(t0, 100)).is_admitted());
        assert_eq!(rl.allow(&key, at(t0, 1010)), Decision::Admit);
    }

    #[test]
    fn rejected_attempts_are_not_recorded() {
        let rl = limiter(2, 1000);
        let key = ClientKey::from("a");
        let t0 = Instant::now();

        rl.allow(&key, t0);
        rl.allow(&key, at(t0, 500));
        for ms in [600, 700, 800, 900] {
            assert!(!rl.allow(&key, at(t0, ms)).is_admitted());
        }
        // Only the t0 entry has expired; the rejections above left no trace.
        assert!(rl.allow(&key, at(t0, 1001)).is_admitted());
        assert!(!rl.allow(&key, at(t0, 1002)).is_admitted());
    }

    #[test]
    fn window_slides_rather_than_resetting() {
        let rl = limiter(2, 1000);
        let key = ClientKey::from("a");
        let t0 = Instant::now();

        assert!(rl.allow(&key, at(t0, 900)).is_admitted());
        assert!(rl.allow(&key, at(t0, 950)).is_admitted());
        // A fixed bucket would reset at t=1000 and let two more through.
        assert!(!rl.allow(&key, at(t0, 1050)).is_admitted());
        assert!(!rl.allow(&key, at(t0, 1100)).is_admitted());
        assert!(rl.allow(&key, at(t0, 1901)).is_admitted());
    }

    #[test]
    fn timestamp_exactly_window_old_still_counts() {
        let rl = limiter(1, 1000);
        let key = ClientKey::from("a");
        let t0 = Instant::now();

        assert!(rl.allow(&key, t0).is_admitted());
        assert!(!rl.allow(&key, at(t0, 1000)).is_admitted());
        assert!(rl.allow(&key, at(t0, 1001)).is_admitted());
    }

    #[test]
    fn reject_reports_time_until_oldest_expires() {
        let rl = limiter(2, 1000);
        let key = ClientKey::from("a");
        let t0 = Instant::now();

        rl.allow(&key, t0);
        rl.allow(&key, at(t0, 300));
        assert_eq!(
            rl.allow(&key, at(t0, 400)),
            Decision::Reject {
                retry_after: Duration::from_millis(600)
            }
        );
    }

    #[test]
    fn clients_are_tracked_independently() {
        let rl = limiter(2, 1000);
        let a = ClientKey::from("a");
        let b = ClientKey::from("b");
        let t0 = Instant::now();

        rl.allow(&a, t0);
        rl.allow(&a, t0);
        assert!(!rl.allow(&a, t0).is_admitted());

        assert!(rl.allow(&b, t0).is_admitted());
        assert!(rl.allow(&b, t0).is_admitted());
        assert!(!rl.allow(&b, t0).is_admitted());
        assert_eq!(rl.tracked_keys(), 2);
    }

    #[test]
    fn decision_into_result() {
        assert_eq!(Decision::Admit.into_result(), Ok(()));
        let retry_after = Duration::from_secs(3);
        assert_eq!(
            Decision::Reject { retry_after }.into_result(),
            Err(CoreError::RateLimitExceeded { retry_after })
        );
    }

    #[test]
    fn evict_idle_removes_only_expired_clients() {
        let rl = limiter(5, 1000);
        let t0 = Instant::now();

        rl.allow(&ClientKey::from("old"), t0);
        rl.allow(&ClientKey::from("fresh"), at(t0, 800));
        assert_eq!(rl.tracked_keys(), 2);

        assert_eq!(rl.evict_idle(at(t0, 1500)), 1);
        assert_eq!(rl.tracked_keys(), 1);

        assert_eq!(rl.evict_idle(at(t0, 1900)), 1);
        assert_eq!(rl.tracked_keys(), 0);
    }

    #[test]
    fn evicted_client_starts_with_fresh_quota() {
        let rl = limiter(1, 1000);
        let key = ClientKey::from("a");
        let t0 = Instant::now();

        rl.allow(&key, t0);
        rl.evict_idle(at(t0, 2000));
        assert!(rl.allow(&key, at(t0, 2000)).is_admitted());
    }

    #[test]
    fn concurrent_requests_admit_exactly_limit() {
        const LIMIT: usize = 5;
        const THREADS: usize = 64;

        for _ in 0..20 {
            let rl = Arc::new(limiter(LIMIT, 60_000));
            let key = ClientKey::from("198.51.100.1");
            let admitted = AtomicUsize::new(0);
            let barrier = Barrier::new(THREADS);
            let now = Instant::now();

            std::thread::scope(|s| {
                for _ in 0..THREADS {
                    s.spawn(|| {
                        barrier.wait();
                        if rl.allow(&key, now).is_admitted() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
            });

            assert_eq!(admitted.load(Ordering::SeqCst), LIMIT);
        }
    }
}
