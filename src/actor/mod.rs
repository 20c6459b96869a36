//! Actor Model: Message-passing concurrency for the window engine.
//!
//! Every long-running activity owns a thread and talks to the rest only
//! through queues:
//! - **Input Actor**: Polls terminal events, forwards them to the engine
//! - **Resize Watcher**: Notices terminal geometry changes
//! - **Window Actors**: One per window, drain its messages and draw
//! - **Engine**: The presentation loop, paced to a target frame rate
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   InputEvent    ┌──────────────┐   Message    ┌──────────────┐
//! │ Input Thread │ ──────────────▶ │              │ ───────────▶ │Window Actor 1│
//! └──────────────┘                 │    Engine    │              └──────────────┘
//! ┌──────────────┐   InputEvent    │ (Compositor) │   Message    ┌──────────────┐
//! │Resize Watcher│ ──────────────▶ │              │ ───────────▶ │Window Actor N│
//! └──────────────┘                 └──────────────┘              └──────────────┘
//!                                         │ flip
//!                                         ▼
//!                                  ┌──────────────┐
//!                                  │   Display    │
//!                                  └──────────────┘
//! ```

mod engine;
mod input;
mod messages;
mod resize;
mod window_actor;

pub use engine::{Engine, EngineConfig};
pub use input::InputActor;
pub use messages::{InputEvent, KeyCode, Message, MessageKind};
pub use resize::{ResizeWatcher, DEFAULT_RESIZE_POLL};
pub use window_actor::{Control, WindowActor, WindowContext, WindowHandler};
