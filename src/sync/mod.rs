//! Sync module: Foundation primitives shared by windows, the compositor and actors.
//!
//! This module contains:
//! - [`ReentrantLock`]: Exclusive lock the owning thread may re-acquire
//! - [`SaturatingCounter`]: Unsigned credit counter clamped to `[0, MAX]`
//! - [`RingLog`]: Fixed-capacity log that discards its oldest entry on overflow
//! - [`BlockingQueue`]: FIFO queue whose `pop` blocks until a value arrives

mod counter;
mod lock;
mod queue;
mod ring;

pub use counter::{SaturatingCounter, Unsigned};
pub use lock::{ReentrantLock, ReentrantLockGuard};
pub use queue::{Backpressure, BlockingQueue, Rejected};
pub use ring::RingLog;
