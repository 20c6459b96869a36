//! Buffer module: In-memory drawing surfaces.
//!
//! This module contains:
//! - [`Cell`]: The atomic unit of display
//! - [`Style`]: Curses-like attributes (modifiers plus a color pair)
//! - [`Surface`]: A grid of cells with a cursor, used by windows and the screen
//! - [`Rgb`]: True-color representation
//! - [`Modifiers`]: Text style bitflags
//! - [`diff`]: Diffing engine for generating minimal ANSI sequences

mod cell;
mod surface;
pub mod diff;

pub use cell::{Cell, CellFlags, Modifiers, Rgb, Style};
pub use surface::{HLINE, Surface, VLINE};
