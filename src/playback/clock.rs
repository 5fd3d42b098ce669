use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Monotonic time source, in seconds from an arbitrary origin.
pub trait Clock {
    /// Current time in seconds.
    fn now_secs(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    /// Clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Settable clock with microsecond resolution. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    /// Clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to `secs`. Negative and non-finite values clamp to zero.
    pub fn set_secs(&self, secs: f64) {
        self.micros.store(secs_to_micros(secs), Ordering::SeqCst);
    }

    /// Move forward by `secs`.
    pub fn advance_secs(&self, secs: f64) {
        self.micros.fetch_add(secs_to_micros(secs), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.micros.load(Ordering::SeqCst) as f64 / 1_000_000.0
    }
}

fn secs_to_micros(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1_000_000.0).round() as u64
    } else {
        0
    }
}
