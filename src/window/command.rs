//! Draw commands: The units of work a window applies to its surfaces.
//!
//! Each drawing call on a [`Window`](super::Window) becomes one
//! [`DrawCommand`]. Calls made on the window's owning actor thread (or before
//! any actor claimed the window) are applied immediately. Calls from other
//! threads are queued and applied by the owner through its [`Painter`], in
//! the order each thread submitted them.

use super::Window;
use crate::buffer::Style;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    /// Move the cursor.
    MoveCursor {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
    },
    /// Write text at the cursor.
    Print(String),
    /// Move the cursor and write text.
    PrintAt {
        /// Column.
        x: u16,
        /// Row.
        y: u16,
        /// Text.
        text: String,
    },
    /// Draw a border; `'\0'` picks the default character.
    Box {
        /// Vertical edge character.
        vertical: char,
        /// Horizontal edge character.
        horizontal: char,
    },
    /// Horizontal line from the cursor.
    HLine {
        /// Line character.
        ch: char,
        /// Length in cells.
        len: u16,
    },
    /// Vertical line from the cursor.
    VLine {
        /// Line character.
        ch: char,
        /// Length in cells.
        len: u16,
    },
    /// Fill with the background and home the cursor.
    Erase,
    /// Erase and request a full repaint.
    Clear,
    /// Fill an inclusive rectangle.
    EraseRect {
        /// Left column.
        x0: u16,
        /// Top row.
        y0: u16,
        /// Right column (inclusive).
        x1: u16,
        /// Bottom row (inclusive).
        y1: u16,
        /// Fill character.
        fill: char,
    },
    /// Turn attributes on.
    AttrOn(Style),
    /// Turn attributes off.
    AttrOff(Style),
    /// Replace the attributes.
    AttrSet(Style),
    /// Background style of both surfaces.
    SetBackground(Style),
    /// Change the title drawn by [`DrawCommand::DrawTitle`].
    SetTitle(String),
    /// Draw the title bar.
    DrawTitle,
    /// Resize both surfaces.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Move both surfaces.
    MoveTo {
        /// Column of the new origin.
        x: u16,
        /// Row of the new origin.
        y: u16,
    },
    /// Mark every row of the front surface changed.
    Touch,
    /// Mark every row of the front surface unchanged.
    Untouch,
    /// Mark some rows of the front surface changed.
    TouchLines {
        /// First row.
        start: u16,
        /// Number of rows.
        count: u16,
    },
    /// Copy the back surface onto the front one.
    Flip {
        /// Erase the front surface first.
        clear: bool,
    },
    /// Add one external present credit.
    RequestPresent,
    /// Reply once every earlier command has been applied.
    Fence(Sender<()>),
}

/// The receiving end of a window's command queue.
///
/// Obtained once through [`Window::take_painter`]. Dropping it marks the
/// window's actor as gone.
#[derive(Debug)]
pub struct Painter {
    receiver: Receiver<DrawCommand>,
    alive: Arc<AtomicBool>,
}

impl Painter {
    pub(crate) fn new(receiver: Receiver<DrawCommand>, alive: Arc<AtomicBool>) -> Self {
        alive.store(true, Ordering::Release);
        Self { receiver, alive }
    }

    /// Apply every queued command to `window`, oldest first.
    ///
    /// Returns the number of commands applied.
    pub fn drain(&self, window: &Window) -> usize {
        let mut applied = 0;
        for command in self.receiver.try_iter() {
            window.apply(command);
            applied += 1;
        }
        applied
    }

    /// Number of queued commands.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}

impl Drop for Painter {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
