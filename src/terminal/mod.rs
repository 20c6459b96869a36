//! Terminal module: Everything between composed surfaces and the real screen.
//!
//! This module contains:
//! - [`Driver`]: The device contract (size, colors, present a frame)
//! - [`CrosstermDriver`]: Raw-mode stdout driver with guaranteed teardown
//! - [`HeadlessDriver`]: In-memory driver for tests and benchmarks
//! - [`Display`]: The single shared terminal surface behind one reentrant lock
//! - [`Palette`]: Numbered color pairs
//! - [`OutputBuffer`]: Single-syscall ANSI output buffer

mod backend;
mod display;
mod driver;
mod headless;
mod output;
mod palette;

pub use backend::{restore_terminal, CrosstermDriver};
pub use display::{Display, DisplayLock, PresentTarget};
pub use driver::Driver;
pub use headless::HeadlessDriver;
pub use output::OutputBuffer;
pub use palette::{ColorPair, Palette};
