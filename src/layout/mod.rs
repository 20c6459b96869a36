//! Layout module: Screen geometry shared by surfaces, windows and the compositor.

mod rect;

pub use rect::Rect;
