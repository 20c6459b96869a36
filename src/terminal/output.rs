//! `OutputBuffer`: Single-syscall output buffer for ANSI sequences.

use crate::buffer::{Modifiers, Rgb};
use std::io::Write;

/// Pre-allocated buffer for building ANSI escape sequences.
///
/// All output is accumulated here, then flushed in a single `write()` syscall
/// to prevent terminal flickering.
pub struct OutputBuffer {
    data: Vec<u8>,
}

impl OutputBuffer {
    /// Create a new output buffer with the given capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    /// Create a buffer sized for a typical terminal (4KB).
    pub fn new() -> Self {
        Self::with_capacity(4096)
    }

    /// Clear the buffer for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Get the buffer contents.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get the buffer length.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if buffer is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write raw bytes.
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write one character as UTF-8.
    #[inline]
    pub fn write_char(&mut self, ch: char) {
        let mut utf8 = [0u8; 4];
        self.data.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    }

    /// Move cursor to (x, y), 0-indexed.
    ///
    /// Uses the most compact representation:
    /// - `\x1b[H` for home
    /// - `\x1b[{row}H` for column 1
    /// - `\x1b[{row};{col}H` otherwise
    #[inline]
    pub fn cursor_move(&mut self, x: u16, y: u16) {
        let row = u32::from(y) + 1;
        let col = u32::from(x) + 1;
        if row == 1 && col == 1 {
            self.data.extend_from_slice(b"\x1b[H");
        } else if col == 1 {
            let _ = write!(self.data, "\x1b[{row}H");
        } else {
            let _ = write!(self.data, "\x1b[{row};{col}H");
        }
    }

    /// Hide cursor.
    #[inline]
    pub fn cursor_hide(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25l");
    }

    /// Show cursor.
    #[inline]
    pub fn cursor_show(&mut self) {
        self.data.extend_from_slice(b"\x1b[?25h");
    }

    /// Set foreground color (true color).
    #[inline]
    pub fn set_fg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Set background color (true color).
    #[inline]
    pub fn set_bg(&mut self, color: Rgb) {
        let _ = write!(self.data, "\x1b[48;2;{};{};{}m", color.r, color.g, color.b);
    }

    /// Restore the terminal's default foreground and background.
    #[inline]
    pub fn default_colors(&mut self) {
        self.data.extend_from_slice(b"\x1b[39;49m");
    }

    /// Emit SGR sequences turning on each of `modifiers`.
    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        const CODES: [(Modifiers, &[u8]); 8] = [
            (Modifiers::BOLD, b"\x1b[1m"),
            (Modifiers::DIM, b"\x1b[2m"),
            (Modifiers::ITALIC, b"\x1b[3m"),
            (Modifiers::UNDERLINE, b"\x1b[4m"),
            (Modifiers::BLINK, b"\x1b[5m"),
            (Modifiers::REVERSED, b"\x1b[7m"),
            (Modifiers::HIDDEN, b"\x1b[8m"),
            (Modifiers::STRIKETHROUGH, b"\x1b[9m"),
        ];
        for (flag, code) in CODES {
            if modifiers.contains(flag) {
                self.data.extend_from_slice(code);
            }
        }
    }

    /// Reset all attributes.
    #[inline]
    pub fn reset_attrs(&mut self) {
        self.data.extend_from_slice(b"\x1b[0m");
    }

    /// Clear the entire screen.
    #[inline]
    pub fn clear_screen(&mut self) {
        self.data.extend_from_slice(b"\x1b[2J");
    }

    /// Flush to a writer in a single syscall.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    pub fn flush_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(&self.data)?;
        writer.flush()
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_move_optimization() {
        let mut output = OutputBuffer::new();

        output.cursor_move(0, 0);
        assert_eq!(output.as_bytes(), b"\x1b[H");

        output.clear();
        output.cursor_move(0, 5);
        assert_eq!(output.as_bytes(), b"\x1b[6H");

        output.clear();
        output.cursor_move(10, 5);
        assert_eq!(output.as_bytes(), b"\x1b[6;11H");
    }

    #[test]
    fn test_modifier_codes() {
        let mut output = OutputBuffer::new();
        output.set_modifiers(Modifiers::BOLD | Modifiers::REVERSED);
        assert_eq!(output.as_bytes(), b"\x1b[1m\x1b[7m");
    }

    #[test]
    fn test_write_char_utf8() {
        let mut output = OutputBuffer::new();
        output.write_char('─');
        assert_eq!(output.as_bytes(), "─".as_bytes());
    }

    #[test]
    fn test_flush_to_writer() {
        let mut output = OutputBuffer::new();
        output.write_raw(b"abc");
        let mut sink = Vec::new();
        output.flush_to(&mut sink).unwrap();
        assert_eq!(sink, b"abc");
    }
}
