//! `HeadlessDriver`: An in-memory terminal for tests and benchmarks.

use super::{Driver, Palette};
use crate::buffer::Surface;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

#[derive(Debug)]
struct HeadlessState {
    width: u16,
    height: u16,
    colors: bool,
    presents: u64,
    full_presents: u64,
    last_frame: Option<Surface>,
}

/// A driver that records frames instead of writing them anywhere.
///
/// Clones share state, so a test can keep one handle while the display owns
/// another.
#[derive(Debug, Clone)]
pub struct HeadlessDriver {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessDriver {
    /// A color-capable terminal of the given size.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Arc::new(Mutex::new(HeadlessState {
                width,
                height,
                colors: true,
                presents: 0,
                full_presents: 0,
                last_frame: None,
            })),
        }
    }

    /// A terminal without color support.
    pub fn monochrome(width: u16, height: u16) -> Self {
        let driver = Self::new(width, height);
        driver.state.lock().colors = false;
        driver
    }

    /// Change the reported geometry, as if the user resized the terminal.
    pub fn set_size(&self, width: u16, height: u16) {
        let mut state = self.state.lock();
        state.width = width;
        state.height = height;
    }

    /// Number of frames presented so far.
    pub fn presents(&self) -> u64 {
        self.state.lock().presents
    }

    /// Number of frames presented with a full repaint.
    pub fn full_presents(&self) -> u64 {
        self.state.lock().full_presents
    }

    /// Copy of the last presented frame.
    pub fn last_frame(&self) -> Option<Surface> {
        self.state.lock().last_frame.clone()
    }

    /// Text of row `y` of the last presented frame.
    pub fn row_text(&self, y: u16) -> String {
        self.state
            .lock()
            .last_frame
            .as_ref()
            .map(|frame| frame.row_text(y))
            .unwrap_or_default()
    }
}

impl Driver for HeadlessDriver {
    fn size(&self) -> io::Result<(u16, u16)> {
        let state = self.state.lock();
        Ok((state.width, state.height))
    }

    fn has_colors(&self) -> bool {
        self.state.lock().colors
    }

    fn present(&mut self, frame: &Surface, _palette: &Palette, full: bool) -> io::Result<()> {
        let mut state = self.state.lock();
        state.presents += 1;
        if full {
            state.full_presents += 1;
        }
        match &mut state.last_frame {
            Some(last) if last.rect() == frame.rect() => last.copy_from(frame),
            slot => *slot = Some(frame.clone()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Rect;

    #[test]
    fn test_clones_share_state() {
        let driver = HeadlessDriver::new(10, 4);
        let mut owned = driver.clone();

        let mut frame = Surface::new(Rect::from_size(10, 4));
        frame.print("hello");
        owned.present(&frame, &Palette::new(), true).unwrap();

        assert_eq!(driver.presents(), 1);
        assert_eq!(driver.full_presents(), 1);
        assert_eq!(driver.row_text(0), "hello     ");
    }

    #[test]
    fn test_set_size() {
        let driver = HeadlessDriver::monochrome(10, 4);
        driver.set_size(20, 6);
        assert_eq!(driver.size().unwrap(), (20, 6));
        assert!(!driver.has_colors());
    }
}
