//! Window module: Named, double-buffered drawing targets.
//!
//! This module contains:
//! - [`Window`]: Front/back surface pair, message queue and present gates
//! - [`WindowSpec`]: How a window is created
//! - [`DrawCommand`] and [`Painter`]: Ordered drawing through the owning actor
//! - [`format_print`]: The restricted `%d`/`%f`/`%s` formatter

mod command;
mod format;
#[allow(clippy::module_inception)]
mod window;

pub use command::{DrawCommand, Painter};
pub use format::{format_print, PrintArg};
pub use window::{
    Window, WindowLock, WindowName, WindowSpec, WindowStats, DEFAULT_COMMAND_CAPACITY,
    DEFAULT_MESSAGE_CAPACITY,
};
