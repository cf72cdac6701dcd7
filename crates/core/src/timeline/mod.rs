use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Monotonic time source. Readings are seconds since an arbitrary origin and
/// never decrease. The engine uses the same source for elapsed session time
/// and for the phase of its free-running oscillators.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    rate: f64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::scaled(1.0)
    }

    /// A clock that runs `rate` times faster than real time. Negative or
    /// non-finite rates fall back to real time.
    pub fn scaled(rate: f64) -> Self {
        let rate = if rate.is_finite() && rate > 0.0 { rate } else { 1.0 };
        Self {
            origin: Instant::now(),
            rate,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * self.rate
    }
}

/// Manually advanced clock for deterministic hosts and tests. Clones share
/// the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    time_seconds: Arc<Mutex<f64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        *self.lock() = 0.0;
    }

    /// Moves the clock forward. Negative deltas are ignored to keep the
    /// reading monotonic.
    pub fn advance(&self, delta: f64) {
        let mut time = self.lock();
        *time += delta.max(0.0);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, f64> {
        self.time_seconds
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> f64 {
        *self.lock()
    }
}
