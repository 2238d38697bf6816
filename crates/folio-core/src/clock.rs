//! Time sources.
//!
//! The limiter works on monotonic [`Instant`]s, tokens on unix seconds.
//! Both come from a [`Clock`] so tests can drive time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    /// Monotonic time, used for rate-limit windows.
    fn instant(&self) -> Instant;

    /// Wall-clock seconds since the unix epoch, used for token claims.
    fn unix_secs(&self) -> u64;
}

/// The operating system clocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn instant(&self) -> Instant {
        Instant::now()
    }

    fn unix_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A clock that only moves when told to.
///
/// Both views advance together: `advance(d)` moves the monotonic instant and
/// the unix timestamp by the same amount.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    origin_unix: u64,
    elapsed_nanos: AtomicU64,
}

impl ManualClock {
    pub fn new(origin_unix: u64) -> Self {
        Self {
            origin: Instant::now(),
            origin_unix,
            elapsed_nanos: AtomicU64::new(0),
        }
    }

    /// Moves both views forward. Saturates at `u64::MAX` nanoseconds.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .elapsed_nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |nanos| {
                Some(nanos.saturating_add(by))
            });
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_nanos.load(Ordering::SeqCst))
    }
}

impl Clock for ManualClock {
    fn instant(&self) -> Instant {
        self.origin + self.elapsed()
    }

    fn unix_secs(&self) -> u64 {
        self.origin_unix + self.elapsed().as_secs()
    }
}
