//! Display: The process-wide terminal surface.
//!
//! Every window and the compositor eventually push pixels through one
//! [`Display`]. It owns the [`Driver`], a staged screen that virtual refreshes
//! compose into, and the palette. All of it sits behind a single
//! [`ReentrantLock`] distinct from any window lock, so a thread that already
//! holds the display may stage and flush again without deadlocking.

use super::{Driver, Palette};
use crate::buffer::{Rgb, Surface};
use crate::error::{Error, Result};
use crate::layout::Rect;
use crate::sync::{ReentrantLock, ReentrantLockGuard};
use std::io;

struct DisplayState {
    driver: Box<dyn Driver>,
    screen: Surface,
    palette: Palette,
    /// Used instead of `palette` when the terminal has no colors.
    monochrome: Palette,
    colors: bool,
    force_full: bool,
    flushes: u64,
}

/// Shared terminal surface.
pub struct Display {
    state: ReentrantLock<DisplayState>,
}

/// Holds the display lock; see [`Display::lock`].
pub struct DisplayLock<'a> {
    _guard: ReentrantLockGuard<'a, DisplayState>,
}

impl Display {
    /// Wrap a driver.
    ///
    /// Fails with [`Error::InvalidGeometry`] if the driver reports an empty
    /// screen. A driver without colors is accepted; pair colors are then
    /// dropped and a warning is logged.
    pub fn new(driver: Box<dyn Driver>) -> Result<Self> {
        let (width, height) = driver.size()?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }

        let colors = driver.has_colors();
        if !colors {
            tracing::warn!("terminal has no color support, continuing in monochrome");
        }

        Ok(Self {
            state: ReentrantLock::new(DisplayState {
                driver,
                screen: Surface::new(Rect::from_size(width, height)),
                palette: Palette::new(),
                monochrome: Palette::new(),
                colors,
                force_full: true,
                flushes: 0,
            }),
        })
    }

    /// Hold the display across several operations.
    ///
    /// Calls made by the holder re-enter the lock; other threads wait.
    pub fn lock(&self) -> DisplayLock<'_> {
        DisplayLock {
            _guard: self.state.lock(),
        }
    }

    /// Geometry of the staged screen as `(columns, rows)`.
    pub fn size(&self) -> (u16, u16) {
        self.state
            .with(|state| (state.screen.width(), state.screen.height()))
    }

    /// Geometry the terminal reports right now.
    pub fn live_size(&self) -> io::Result<(u16, u16)> {
        self.state.with(|state| state.driver.size())
    }

    /// Whether color pairs are shown.
    pub fn has_colors(&self) -> bool {
        self.state.with(|state| state.colors)
    }

    /// Define color pair `pair`.
    ///
    /// Returns `false` for the reserved pair 0.
    pub fn init_pair(&self, pair: u8, fg: Rgb, bg: Rgb) -> bool {
        self.state.with(|state| {
            let defined = state.palette.init_pair(pair, fg, bg);
            state.force_full |= defined;
            defined
        })
    }

    /// Number of physical refreshes so far.
    pub fn flushes(&self) -> u64 {
        self.state.with(|state| state.flushes)
    }

    /// Virtual refresh: compose `surface` into the staged screen at its origin.
    pub fn stage(&self, surface: &Surface) {
        self.state.with(|state| state.screen.compose(surface));
    }

    /// Physical refresh: send the staged screen to the terminal.
    pub fn update(&self) -> io::Result<()> {
        self.state.with(|state| {
            let full = state.force_full || state.screen.repaint_requested();
            let palette = if state.colors {
                &state.palette
            } else {
                &state.monochrome
            };
            state.driver.present(&state.screen, palette, full)?;
            state.screen.untouch();
            state.screen.acknowledge_repaint();
            state.force_full = false;
            state.flushes += 1;
            Ok(())
        })
    }

    /// Stage `surface` and flush, as one critical section.
    pub fn refresh(&self, surface: &Surface) -> io::Result<()> {
        let _held = self.lock();
        self.stage(surface);
        self.update()
    }

    /// Resize the staged screen and force the next flush to repaint.
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }
        self.state.with(|state| {
            state.screen.resize(width, height);
            state.force_full = true;
        });
        Ok(())
    }

    /// Force the next flush to repaint everything.
    pub fn request_repaint(&self) {
        self.state.with(|state| state.force_full = true);
    }

    /// Copy of the staged screen.
    pub fn snapshot(&self) -> Surface {
        self.state.with(|state| state.screen.clone())
    }
}

impl std::fmt::Debug for Display {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Display")
            .field("size", &self.size())
            .field("colors", &self.has_colors())
            .finish_non_exhaustive()
    }
}

/// Somewhere a window can present its surface.
///
/// `compose` is the virtual half of a refresh and `flush` the physical half.
pub trait PresentTarget {
    /// Paint `surface` at its origin.
    fn compose(&mut self, surface: &Surface);

    /// Make everything composed so far visible.
    fn flush(&mut self) -> io::Result<()>;
}

impl PresentTarget for Surface {
    fn compose(&mut self, surface: &Surface) {
        Self::compose(self, surface);
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl PresentTarget for &Display {
    fn compose(&mut self, surface: &Surface) {
        self.stage(surface);
    }

    fn flush(&mut self) -> io::Result<()> {
        self.update()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::HeadlessDriver;
    use std::sync::Arc;
    use std::thread;

    fn display(width: u16, height: u16) -> (Display, HeadlessDriver) {
        let driver = HeadlessDriver::new(width, height);
        let display = Display::new(Box::new(driver.clone())).unwrap();
        (display, driver)
    }

    #[test]
    fn test_empty_terminal_rejected() {
        let driver = HeadlessDriver::new(0, 10);
        assert!(matches!(
            Display::new(Box::new(driver)),
            Err(Error::InvalidGeometry { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_stage_does_not_flush() {
        let (display, driver) = display(10, 3);
        let mut s = Surface::new(Rect::new(2, 1, 3, 1));
        s.print("abc");

        display.stage(&s);
        assert_eq!(driver.presents(), 0);
        assert_eq!(display.snapshot().row_text(1), "  abc     ");

        display.update().unwrap();
        assert_eq!(driver.presents(), 1);
        assert_eq!(driver.row_text(1), "  abc     ");
    }

    #[test]
    fn test_first_flush_is_full_then_incremental() {
        let (display, driver) = display(4, 2);
        let s = Surface::new(Rect::from_size(4, 2));
        display.refresh(&s).unwrap();
        display.refresh(&s).unwrap();
        assert_eq!(driver.presents(), 2);
        assert_eq!(driver.full_presents(), 1);
    }

    #[test]
    fn test_cleared_surface_forces_full_flush() {
        let (display, driver) = display(4, 2);
        display.update().unwrap();

        let mut s = Surface::new(Rect::from_size(4, 2));
        s.clear();
        display.refresh(&s).unwrap();
        assert_eq!(driver.full_presents(), 2);

        display.refresh(&Surface::new(Rect::from_size(4, 2))).unwrap();
        assert_eq!(driver.full_presents(), 2);
    }

    #[test]
    fn test_lock_is_reentrant_for_holder() {
        let (display, _driver) = display(4, 2);
        let held = display.lock();
        display.refresh(&Surface::new(Rect::from_size(1, 1))).unwrap();
        drop(held);
        assert_eq!(display.flushes(), 1);
    }

    #[test]
    fn test_lock_serializes_threads() {
        let (display, driver) = display(4, 2);
        let display = Arc::new(display);
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let display = Arc::clone(&display);
                thread::spawn(move || {
                    for _ in 0..25 {
                        display.refresh(&Surface::new(Rect::from_size(2, 1))).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(driver.presents(), 100);
    }

    #[test]
    fn test_monochrome_still_presents() {
        let driver = HeadlessDriver::monochrome(4, 2);
        let display = Display::new(Box::new(driver.clone())).unwrap();
        assert!(!display.has_colors());
        assert!(display.init_pair(1, Rgb::RED, Rgb::BLACK));
        display.update().unwrap();
        assert_eq!(driver.presents(), 1);
    }
}
