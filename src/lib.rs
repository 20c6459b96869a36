//! # cellwm
//!
//! A double-buffered window compositor for character-cell terminals.
//!
//! cellwm manages independent windows over one shared terminal. Each window
//! has a front and a back surface, a message queue and its own actor
//! thread; the compositor paints them back to front and flips the result to
//! the screen at a steady frame rate.
//!
//! ## Core Concepts
//!
//! - **Double-buffered windows**: Draw into the back surface, flip when done
//! - **Present gates**: Skip credits and external credits decide whether a
//!   window's present actually happens
//! - **Actor model**: Isolated threads for input, resize detection, every
//!   window and the presentation loop
//! - **Ordered drawing**: Calls from other threads are queued for the
//!   window's own actor and applied in order
//!
//! ## Example
//!
//! ```rust,no_run
//! use cellwm::{Control, Engine, Message, Rect, WindowContext, WindowHandler, WindowSpec};
//!
//! struct Hello;
//!
//! impl WindowHandler for Hello {
//!     fn on_message(&mut self, cx: &mut WindowContext<'_>, _msg: Message) -> cellwm::Result<Control> {
//!         let window = cx.window();
//!         window.erase()?;
//!         window.draw_title()?;
//!         window.print_at(1, 1, "hello")?;
//!         window.flip(false)?;
//!         Ok(Control::Continue)
//!     }
//! }
//!
//! let mut engine = Engine::new()?;
//! engine.open_window("hello", WindowSpec::new(Rect::new(0, 0, 20, 4)).with_title("Hello"), Hello)?;
//! engine.run()?;
//! # Ok::<(), cellwm::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod buffer;
pub mod compositor;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pacing;
pub mod sync;
pub mod terminal;
pub mod window;

// Re-exports for convenience
pub use actor::{
    Control, Engine, EngineConfig, InputEvent, KeyCode, Message, MessageKind, WindowContext,
    WindowHandler,
};
pub use buffer::{Cell, Modifiers, Rgb, Style, Surface};
pub use compositor::Compositor;
pub use error::{Error, Result};
pub use layout::Rect;
pub use logging::{LogConfig, LogTail};
pub use pacing::{FrameCounter, FrameLimiter};
pub use sync::{BlockingQueue, ReentrantLock, RingLog, SaturatingCounter};
pub use terminal::{Display, Driver, HeadlessDriver};
pub use window::{PrintArg, Window, WindowName, WindowSpec};
