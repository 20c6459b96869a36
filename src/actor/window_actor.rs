//! Window Actor: One thread per window running its [`WindowHandler`].
//!
//! The actor claims the window's [`Painter`](crate::window::Painter), so
//! drawing calls made from anywhere else are applied here, in order. Between
//! messages it drains those commands and gives the handler an idle tick.

use super::messages::Message;
use crate::compositor::Compositor;
use crate::error::Result;
use crate::window::Window;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What a handler wants after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Keep running.
    Continue,
    /// Stop the whole engine.
    Quit,
}

/// Everything a handler may touch while it runs.
pub struct WindowContext<'a> {
    window: &'a Arc<Window>,
    compositor: &'a Arc<Compositor>,
}

impl<'a> WindowContext<'a> {
    /// Build a context; handlers normally receive one from their actor.
    pub const fn new(window: &'a Arc<Window>, compositor: &'a Arc<Compositor>) -> Self {
        Self { window, compositor }
    }

    /// The handled window.
    pub const fn window(&self) -> &'a Arc<Window> {
        self.window
    }

    /// The compositor the window is registered with.
    pub const fn compositor(&self) -> &'a Arc<Compositor> {
        self.compositor
    }
}

/// Behavior of one window.
///
/// Every method runs on the window's own actor thread. Errors are logged
/// and the actor keeps going.
pub trait WindowHandler: Send + 'static {
    /// Called once before the first message.
    fn on_start(&mut self, cx: &mut WindowContext<'_>) -> Result<Control> {
        let _ = cx;
        Ok(Control::Continue)
    }

    /// Called for every message taken off the window's queue.
    fn on_message(&mut self, cx: &mut WindowContext<'_>, message: Message) -> Result<Control>;

    /// Called when no message arrived within the poll interval.
    fn on_idle(&mut self, cx: &mut WindowContext<'_>) -> Result<Control> {
        let _ = cx;
        Ok(Control::Continue)
    }
}

/// A running window actor.
pub struct WindowActor {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl WindowActor {
    /// Start running `handler` for `window`.
    ///
    /// `shutdown` is shared with the engine: the actor stops once it is set
    /// and sets it itself when the handler returns [`Control::Quit`].
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the actor thread.
    pub fn spawn<H: WindowHandler>(
        window: Arc<Window>,
        compositor: Arc<Compositor>,
        handler: H,
        poll_interval: Duration,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let flag = Arc::clone(&shutdown);
        let handle = thread::Builder::new()
            .name(format!("cellwm-window-{}", window.name()))
            .spawn(move || {
                Self::run_loop(&window, &compositor, handler, poll_interval, &flag);
            })
            .expect("Failed to spawn window thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Check whether the actor thread has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Signal shutdown and wait for the actor to exit.
    pub fn join(mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("window actor panicked");
            }
        }
    }

    fn run_loop<H: WindowHandler>(
        window: &Arc<Window>,
        compositor: &Arc<Compositor>,
        mut handler: H,
        poll_interval: Duration,
        shutdown: &AtomicBool,
    ) {
        let Some(painter) = window.take_painter() else {
            tracing::error!(window = %window.name(), "window already has an actor");
            return;
        };
        tracing::debug!(window = %window.name(), "window actor started");

        let mut cx = WindowContext::new(window, compositor);
        let mut control = Self::check(window, handler.on_start(&mut cx));

        while control == Control::Continue && !shutdown.load(Ordering::Relaxed) {
            painter.drain(window);
            let result = match window.get_message_timeout(poll_interval) {
                Some(message) => handler.on_message(&mut cx, message),
                None => handler.on_idle(&mut cx),
            };
            control = Self::check(window, result);
        }
        painter.drain(window);

        if control == Control::Quit {
            tracing::info!(window = %window.name(), "window requested quit");
            shutdown.store(true, Ordering::Relaxed);
        }
        tracing::debug!(window = %window.name(), "window actor stopped");
    }

    fn check(window: &Window, result: Result<Control>) -> Control {
        result.unwrap_or_else(|err| {
            tracing::error!(window = %window.name(), error = %err, "window handler failed");
            Control::Continue
        })
    }
}

impl Drop for WindowActor {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MessageKind;
    use crate::layout::Rect;
    use crate::terminal::{Display, HeadlessDriver};
    use crate::window::WindowSpec;
    use crossbeam_channel::{bounded, Sender};
    use std::time::Instant;

    struct Echo {
        seen: Sender<MessageKind>,
        ready: Sender<()>,
    }

    impl WindowHandler for Echo {
        fn on_start(&mut self, cx: &mut WindowContext<'_>) -> Result<Control> {
            cx.window().print("started")?;
            let _ = self.ready.send(());
            Ok(Control::Continue)
        }

        fn on_message(&mut self, _cx: &mut WindowContext<'_>, message: Message) -> Result<Control> {
            let _ = self.seen.send(message.kind());
            if message.kind() == MessageKind::Key {
                return Ok(Control::Quit);
            }
            Ok(Control::Continue)
        }
    }

    fn setup() -> (Arc<Window>, Arc<Compositor>) {
        let display = Display::new(Box::new(HeadlessDriver::new(20, 5))).unwrap();
        let compositor = Arc::new(Compositor::new(Arc::new(display)));
        let spec = WindowSpec::new(Rect::new(0, 0, 10, 2)).unbuffered();
        let window = compositor.register(Window::new("echo", spec).unwrap()).unwrap();
        (window, compositor)
    }

    #[test]
    fn test_actor_handles_messages_and_quits() {
        let (window, compositor) = setup();
        let (tx, rx) = bounded(8);
        let (ready, _started) = bounded(1);
        let shutdown = Arc::new(AtomicBool::new(false));
        let actor = WindowActor::spawn(
            Arc::clone(&window),
            compositor,
            Echo { seen: tx, ready },
            Duration::from_millis(5),
            Arc::clone(&shutdown),
        );

        window.push_message(Message::update());
        window.push_message(Message::with_param(MessageKind::Key, u32::from('q')));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(MessageKind::Update));
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)), Ok(MessageKind::Key));

        let deadline = Instant::now() + Duration::from_secs(1);
        while !actor.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert!(shutdown.load(Ordering::Relaxed));
        actor.join();
        assert_eq!(window.front().row_text(0), "started   ");
    }

    #[test]
    fn test_remote_drawing_applied_by_actor() {
        let (window, compositor) = setup();
        let (tx, _rx) = bounded(8);
        let (ready, started) = bounded(1);
        let actor = WindowActor::spawn(
            Arc::clone(&window),
            compositor,
            Echo { seen: tx, ready },
            Duration::from_millis(5),
            Arc::new(AtomicBool::new(false)),
        );

        // Once started, the actor owns the window and this draw is queued.
        started.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(window.take_painter().is_none());
        window.print_at(0, 1, "remote").unwrap();
        window.sync().unwrap();
        assert_eq!(window.front().row_text(1), "remote    ");
        actor.join();
    }
}
