//! Resize Watcher: Dedicated thread that notices terminal geometry changes.
//!
//! Polls the display on a fixed interval and posts one
//! [`InputEvent::Resize`] per observed change. Polling (rather than relying
//! on the input actor's resize events alone) also catches changes on
//! drivers that never report them, such as the headless one.

use super::messages::InputEvent;
use crate::terminal::Display;
use crossbeam_channel::{Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// How often the terminal size is checked by default.
pub const DEFAULT_RESIZE_POLL: Duration = Duration::from_millis(800);

/// Longest single sleep, so shutdown is noticed promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(10);

/// Resize watcher actor.
pub struct ResizeWatcher {
    /// Handle to the watcher thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl ResizeWatcher {
    /// Spawn a watcher checking `display` every `interval`.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the watcher thread.
    #[allow(clippy::missing_panics_doc)]
    pub fn spawn(display: Arc<Display>, sender: Sender<InputEvent>, interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("cellwm-resize".to_string())
            .spawn(move || {
                Self::run_loop(&display, &sender, &shutdown_clone, interval);
            })
            .expect("Failed to spawn resize watcher thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the watcher to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the watcher thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    fn run_loop(
        display: &Display,
        sender: &Sender<InputEvent>,
        shutdown: &AtomicBool,
        interval: Duration,
    ) {
        let mut reported = None;
        let mut next_check = Instant::now() + interval;

        while !shutdown.load(Ordering::Relaxed) {
            let now = Instant::now();
            if now < next_check {
                thread::sleep((next_check - now).min(SLEEP_SLICE));
                continue;
            }
            next_check += interval;
            if next_check < now {
                next_check = now + interval;
            }

            let live = match display.live_size() {
                Ok(size) => size,
                Err(e) => {
                    tracing::debug!(error = %e, "terminal size query failed");
                    continue;
                }
            };
            if live == display.size() {
                reported = None;
                continue;
            }
            if reported == Some(live) {
                continue;
            }

            let (width, height) = live;
            match sender.try_send(InputEvent::Resize { width, height }) {
                Ok(()) => reported = Some(live),
                // The loop still has an unhandled resize; the next check retries.
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }
        }
    }
}

impl Drop for ResizeWatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}
