//! `FrameLimiter`: Fixed-rate sleeper.

use std::thread;
use std::time::{Duration, Instant};

/// Keeps a loop running at a steady rate.
///
/// The deadline advances by exactly one interval per [`FrameLimiter::sleep`],
/// so time spent working between calls is absorbed instead of added. A loop
/// that fell behind runs its next iterations without sleeping until it has
/// caught up.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: Duration,
    next: Instant,
}

impl FrameLimiter {
    /// Create a limiter for `fps` frames per second, starting now.
    ///
    /// # Panics
    /// Panics if `fps` is 0.
    pub fn new(fps: u32) -> Self {
        assert!(fps > 0, "FrameLimiter needs a non-zero rate");
        Self::with_interval(Duration::from_secs(1) / fps)
    }

    /// Create a limiter with an explicit interval, starting now.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            next: Instant::now(),
        }
    }

    /// Time between frames.
    #[inline]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The instant the next `sleep` returns at.
    #[inline]
    pub fn deadline(&self) -> Instant {
        self.next + self.interval
    }

    /// Advance the deadline by one interval and block until it passes.
    pub fn sleep(&mut self) {
        self.next += self.interval;
        let now = Instant::now();
        if self.next > now {
            thread::sleep(self.next - now);
        }
    }

    /// Restart the cadence from now, forgetting any backlog.
    pub fn reset(&mut self) {
        self.next = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cadence_does_not_drift() {
        let mut limiter = FrameLimiter::new(100);
        let start = Instant::now();
        for _ in 0..20 {
            // Work shorter than the interval is absorbed.
            thread::sleep(Duration::from_millis(4));
            limiter.sleep();
        }
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(260), "{elapsed:?}");
    }

    #[test]
    fn test_catches_up_after_stall() {
        let mut limiter = FrameLimiter::with_interval(Duration::from_millis(10));
        let start = Instant::now();
        thread::sleep(Duration::from_millis(50));
        for _ in 0..5 {
            limiter.sleep();
        }
        // The five deadlines had all passed during the stall.
        assert!(start.elapsed() < Duration::from_millis(70));
    }

    #[test]
    fn test_reset_forgets_backlog() {
        let mut limiter = FrameLimiter::with_interval(Duration::from_millis(20));
        thread::sleep(Duration::from_millis(50));
        limiter.reset();
        let start = Instant::now();
        limiter.sleep();
        assert!(start.elapsed() >= Duration::from_millis(15));
    }

    #[test]
    #[should_panic]
    fn test_zero_rate_panics() {
        let _ = FrameLimiter::new(0);
    }
}
