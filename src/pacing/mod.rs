//! Pacing module: Frame rate control and measurement.
//!
//! - [`FrameLimiter`]: Sleeps to a fixed cadence without accumulating drift
//! - [`FrameCounter`]: Interval-averaged frames-per-second estimate

mod counter;
mod limiter;

pub use counter::FrameCounter;
pub use limiter::FrameLimiter;
