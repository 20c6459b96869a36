//! Compositor module: The window manager.
//!
//! - [`Compositor`]: Window registry, z-order, fan-out messaging and the
//!   screen-level double buffer

mod manager;

pub use manager::Compositor;
