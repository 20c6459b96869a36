//! Driver: The boundary between the in-memory surfaces and a real terminal.

use super::Palette;
use crate::buffer::Surface;
use std::io;

/// A character-cell output device.
///
/// The driver receives complete frames. It is free to diff them against what
/// it showed last, but must repaint everything when `full` is set.
pub trait Driver: Send {
    /// Current terminal geometry as `(columns, rows)`.
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Whether color pairs can be shown.
    fn has_colors(&self) -> bool;

    /// Make `frame` visible.
    fn present(&mut self, frame: &Surface, palette: &Palette, full: bool) -> io::Result<()>;
}
