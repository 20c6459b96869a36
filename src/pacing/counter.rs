//! `FrameCounter`: Interval-averaged FPS estimator.

use std::time::{Duration, Instant};

/// Default averaging window.
pub const DEFAULT_UPDATE_DELAY: Duration = Duration::from_millis(800);

/// Counts samples and turns them into a rate once per averaging window.
///
/// The estimate only changes when a sample arrives after the window has
/// elapsed. It then becomes `samples / elapsed` for the window that just
/// closed and a new window starts.
#[derive(Debug, Clone)]
pub struct FrameCounter {
    samples: u32,
    window_start: Instant,
    update_delay: Duration,
    no_update_delay: bool,
    fps: f64,
    total: u64,
}

impl FrameCounter {
    /// A counter with the default 0.8 s window, starting now.
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_UPDATE_DELAY)
    }

    /// A counter with a custom window, starting now.
    pub fn with_delay(update_delay: Duration) -> Self {
        Self {
            samples: 0,
            window_start: Instant::now(),
            update_delay,
            no_update_delay: false,
            fps: 0.0,
            total: 0,
        }
    }

    /// Recompute the estimate on every sample instead of once per window.
    pub fn set_no_update_delay(&mut self, enabled: bool) {
        self.no_update_delay = enabled;
    }

    /// Change the averaging window.
    pub fn set_update_delay(&mut self, delay: Duration) {
        self.update_delay = delay;
    }

    /// Record one sample now.
    pub fn count(&mut self) {
        self.count_at(Instant::now());
    }

    /// Record one sample taken at `now`.
    pub fn count_at(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.window_start);
        if !elapsed.is_zero() && (elapsed > self.update_delay || self.no_update_delay) {
            self.fps = f64::from(self.samples) / elapsed.as_secs_f64();
            self.samples = 0;
            self.window_start = now;
        }
        self.samples = self.samples.saturating_add(1);
        self.total += 1;
    }

    /// Latest estimate in frames per second.
    #[inline]
    pub const fn fps(&self) -> f64 {
        self.fps
    }

    /// Samples recorded since creation.
    #[inline]
    pub const fn total_samples(&self) -> u64 {
        self.total
    }
}

impl Default for FrameCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_waits_for_window() {
        let mut counter = FrameCounter::with_delay(Duration::from_secs(1));
        let start = counter.window_start;
        for i in 0..10 {
            counter.count_at(start + Duration::from_millis(100 * i));
        }
        assert!(counter.fps().abs() < f64::EPSILON);
        assert_eq!(counter.total_samples(), 10);
    }

    #[test]
    fn test_estimate_after_window() {
        let mut counter = FrameCounter::with_delay(Duration::from_millis(950));
        let start = counter.window_start;
        for i in 0..10 {
            counter.count_at(start + Duration::from_millis(100 * i));
        }
        // Closes a one-second window holding ten samples.
        counter.count_at(start + Duration::from_secs(1));
        assert!((counter.fps() - 10.0).abs() < 1e-9);
        assert_eq!(counter.samples, 1);
    }

    #[test]
    fn test_no_update_delay_recomputes_every_sample() {
        let mut counter = FrameCounter::new();
        counter.set_no_update_delay(true);
        let start = counter.window_start;
        counter.count_at(start + Duration::from_millis(10));
        assert!(counter.fps().abs() < f64::EPSILON);
        counter.count_at(start + Duration::from_millis(20));
        assert!((counter.fps() - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_same_instant_does_not_divide_by_zero() {
        let mut counter = FrameCounter::new();
        counter.set_no_update_delay(true);
        let start = counter.window_start;
        counter.count_at(start);
        counter.count_at(start);
        assert!(counter.fps().is_finite());
        assert_eq!(counter.total_samples(), 2);
    }
}
