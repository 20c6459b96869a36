//! `CrosstermDriver`: Raw-mode terminal output through crossterm.
//!
//! Terminal setup happens in [`CrosstermDriver::new`]. Teardown is guarded so
//! it runs exactly once whichever exit path comes first: dropping the driver,
//! a panic, or SIGINT/SIGTERM/SIGHUP.

use super::{Driver, OutputBuffer, Palette};
use crate::buffer::diff::{render_diff, render_full, DiffState};
use crate::buffer::Surface;
use crate::error::{Error, Result};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

/// Set while the terminal is in raw mode and owes a teardown.
static TERMINAL_ACTIVE: AtomicBool = AtomicBool::new(false);
/// Whether the active session entered the alternate screen.
static ALTERNATE_SCREEN: AtomicBool = AtomicBool::new(false);
static PANIC_HOOK: Once = Once::new();
#[cfg(unix)]
static SIGNAL_HANDLERS: Once = Once::new();

/// Driver writing ANSI sequences to stdout.
pub struct CrosstermDriver {
    stdout: Stdout,
    output: OutputBuffer,
    /// What the terminal currently shows.
    previous: Option<Surface>,
    diff_state: DiffState,
}

impl CrosstermDriver {
    /// Put the terminal in raw mode and hide the cursor.
    ///
    /// Fails with [`Error::TerminalUnavailable`] when stdout is not a usable
    /// terminal.
    pub fn new(alternate_screen: bool) -> Result<Self> {
        let (width, height) =
            terminal::size().map_err(|e| Error::TerminalUnavailable(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(Error::TerminalUnavailable(format!(
                "terminal reports a {width}x{height} screen"
            )));
        }

        terminal::enable_raw_mode().map_err(|e| Error::TerminalUnavailable(e.to_string()))?;
        TERMINAL_ACTIVE.store(true, Ordering::SeqCst);
        ALTERNATE_SCREEN.store(alternate_screen, Ordering::SeqCst);

        let mut stdout = io::stdout();
        let entered = if alternate_screen {
            execute!(stdout, EnterAlternateScreen, cursor::Hide)
        } else {
            execute!(stdout, cursor::Hide)
        };
        if let Err(e) = entered {
            restore_terminal();
            return Err(Error::TerminalUnavailable(e.to_string()));
        }

        install_panic_hook();
        #[cfg(unix)]
        install_signal_handlers();

        tracing::debug!(width, height, alternate_screen, "terminal initialized");

        Ok(Self {
            stdout,
            output: OutputBuffer::with_capacity(65536),
            previous: None,
            diff_state: DiffState::new(),
        })
    }
}

impl Driver for CrosstermDriver {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn has_colors(&self) -> bool {
        crossterm::style::available_color_count() >= 8
    }

    fn present(&mut self, frame: &Surface, palette: &Palette, full: bool) -> io::Result<()> {
        self.output.clear();

        match &self.previous {
            Some(previous) if !full && previous.rect() == frame.rect() => {
                render_diff(previous, frame, palette, &mut self.output, &mut self.diff_state);
            }
            _ => render_full(frame, palette, &mut self.output, &mut self.diff_state),
        }

        if !self.output.is_empty() {
            self.output.flush_to(&mut self.stdout)?;
        }

        match &mut self.previous {
            Some(previous) if previous.rect() == frame.rect() => previous.copy_from(frame),
            slot => *slot = Some(frame.clone()),
        }
        Ok(())
    }
}

impl Drop for CrosstermDriver {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Leave raw mode and the alternate screen, and show the cursor.
///
/// Only the first call after setup does anything.
pub fn restore_terminal() {
    if !TERMINAL_ACTIVE.swap(false, Ordering::SeqCst) {
        return;
    }
    let mut stdout = io::stdout();
    let _ = execute!(stdout, crossterm::style::ResetColor, cursor::Show);
    if ALTERNATE_SCREEN.load(Ordering::SeqCst) {
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
    let _ = terminal::disable_raw_mode();
}

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));
    });
}

#[cfg(unix)]
fn install_signal_handlers() {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    SIGNAL_HANDLERS.call_once(|| {
        let mut signals = match Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            Ok(signals) => signals,
            Err(e) => {
                tracing::warn!(error = %e, "could not install signal handlers");
                return;
            }
        };
        let spawned = std::thread::Builder::new()
            .name("cellwm-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    tracing::info!(signal, "terminating on signal");
                    restore_terminal();
                    std::process::exit(128 + signal);
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "could not spawn signal thread");
        }
    });
}
