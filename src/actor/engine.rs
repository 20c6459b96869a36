//! Engine: Main coordinator that ties actors together.
//!
//! The Engine is the entry point for applications using cellwm. It owns
//! the display and the compositor, spawns the input, resize and window
//! actors, and runs the presentation loop.

use super::messages::{InputEvent, KeyCode, Message};
use super::resize::{ResizeWatcher, DEFAULT_RESIZE_POLL};
use super::window_actor::{WindowActor, WindowHandler};
use super::InputActor;
use crate::buffer::Rgb;
use crate::compositor::Compositor;
use crate::error::Result;
use crate::pacing::FrameLimiter;
use crate::terminal::{CrosstermDriver, Display, Driver};
use crate::window::{
    Window, WindowName, WindowSpec, DEFAULT_COMMAND_CAPACITY, DEFAULT_MESSAGE_CAPACITY,
};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for the Engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target frames per second.
    pub target_fps: u32,
    /// How often the terminal size is checked.
    pub resize_poll_interval: Duration,
    /// Input poll timeout.
    pub input_poll_timeout: Duration,
    /// How long a window actor waits for a message before idling.
    pub window_poll_interval: Duration,
    /// Capacity of each window's message queue.
    pub message_capacity: usize,
    /// Capacity of each window's command queue.
    pub command_capacity: usize,
    /// Capacity of the input event channel.
    pub event_capacity: usize,
    /// Whether to use alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            resize_poll_interval: DEFAULT_RESIZE_POLL,
            input_poll_timeout: Duration::from_millis(10),
            window_poll_interval: Duration::from_millis(10),
            message_capacity: DEFAULT_MESSAGE_CAPACITY,
            command_capacity: DEFAULT_COMMAND_CAPACITY,
            event_capacity: 64,
            alternate_screen: true,
        }
    }
}

impl EngineConfig {
    /// Set the target frame rate.
    #[must_use]
    pub const fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    /// Set the resize poll interval.
    #[must_use]
    pub const fn with_resize_poll_interval(mut self, interval: Duration) -> Self {
        self.resize_poll_interval = interval;
        self
    }

    /// Set the window actors' idle interval.
    #[must_use]
    pub const fn with_window_poll_interval(mut self, interval: Duration) -> Self {
        self.window_poll_interval = interval;
        self
    }

    /// Set the queue capacities of new windows.
    #[must_use]
    pub const fn with_queue_capacities(mut self, messages: usize, commands: usize) -> Self {
        self.message_capacity = messages;
        self.command_capacity = commands;
        self
    }

    /// Choose whether to switch to the alternate screen.
    #[must_use]
    pub const fn with_alternate_screen(mut self, enabled: bool) -> Self {
        self.alternate_screen = enabled;
        self
    }
}

/// The main cellwm engine.
///
/// Each [`Engine::tick`] drains pending input, broadcasts
/// [`MessageKind::Update`](super::MessageKind::Update) and
/// [`MessageKind::Present`](super::MessageKind::Present), forwards keys to
/// the front window, presents every window and flips. [`Engine::run`] ticks
/// at the configured rate until a window quits or [`Engine::stop`] is called.
pub struct Engine {
    /// Configuration.
    config: EngineConfig,
    display: Arc<Display>,
    compositor: Arc<Compositor>,
    events_tx: Sender<InputEvent>,
    events_rx: Receiver<InputEvent>,
    /// Only present when driving a real terminal.
    input_actor: Option<InputActor>,
    resize_watcher: Option<ResizeWatcher>,
    window_actors: Vec<WindowActor>,
    /// Shared with every window actor.
    shutdown: Arc<AtomicBool>,
    limiter: FrameLimiter,
    frame_count: u64,
}

impl Engine {
    /// Take over the terminal with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalUnavailable`](crate::Error::TerminalUnavailable)
    /// if terminal setup fails (raw mode, alternate screen, etc.).
    pub fn new() -> Result<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Take over the terminal with custom configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let driver = CrosstermDriver::new(config.alternate_screen)?;
        let mut engine = Self::with_driver(Box::new(driver), config)?;
        engine.input_actor = Some(InputActor::spawn(
            engine.events_tx.clone(),
            engine.config.input_poll_timeout,
        ));
        Ok(engine)
    }

    /// Run on an arbitrary driver, without an input actor.
    ///
    /// Keys can still be injected through [`Engine::event_sender`].
    pub fn with_driver(driver: Box<dyn Driver>, config: EngineConfig) -> Result<Self> {
        let display = Arc::new(Display::new(driver)?);
        let compositor = Arc::new(Compositor::new(Arc::clone(&display)));
        let (events_tx, events_rx) = bounded(config.event_capacity.max(1));
        let resize_watcher = ResizeWatcher::spawn(
            Arc::clone(&display),
            events_tx.clone(),
            config.resize_poll_interval,
        );
        let (width, height) = display.size();
        tracing::info!(width, height, fps = config.target_fps, "engine started");

        Ok(Self {
            limiter: FrameLimiter::new(config.target_fps.max(1)),
            config,
            display,
            compositor,
            events_tx,
            events_rx,
            input_actor: None,
            resize_watcher: Some(resize_watcher),
            window_actors: Vec::new(),
            shutdown: Arc::new(AtomicBool::new(false)),
            frame_count: 0,
        })
    }

    /// The configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared display.
    pub const fn display(&self) -> &Arc<Display> {
        &self.display
    }

    /// The compositor.
    pub const fn compositor(&self) -> &Arc<Compositor> {
        &self.compositor
    }

    /// Sender for injecting input events.
    pub fn event_sender(&self) -> Sender<InputEvent> {
        self.events_tx.clone()
    }

    /// Define color pair `pair`.
    pub fn init_pair(&self, pair: u8, fg: Rgb, bg: Rgb) -> bool {
        self.display.init_pair(pair, fg, bg)
    }

    /// Create a window, register it and start its actor.
    pub fn open_window<H: WindowHandler>(
        &mut self,
        name: impl Into<WindowName>,
        spec: WindowSpec,
        handler: H,
    ) -> Result<Arc<Window>> {
        let window = Window::with_capacity(
            name,
            spec,
            self.config.message_capacity,
            self.config.command_capacity,
        )?;
        self.attach_window(window, handler)
    }

    /// Register an existing window and start its actor.
    pub fn attach_window<H: WindowHandler>(
        &mut self,
        window: Window,
        handler: H,
    ) -> Result<Arc<Window>> {
        let window = self.compositor.register(window)?;
        self.window_actors.push(WindowActor::spawn(
            Arc::clone(&window),
            Arc::clone(&self.compositor),
            handler,
            self.config.window_poll_interval,
            Arc::clone(&self.shutdown),
        ));
        Ok(window)
    }

    /// Check if the engine is still running.
    pub fn is_running(&self) -> bool {
        !self.shutdown.load(Ordering::Relaxed)
    }

    /// Stop the engine; [`Engine::run`] returns after the current frame.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Frames presented so far.
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Present one frame without pacing.
    pub fn tick(&mut self) -> Result<()> {
        let mut keys: Vec<KeyCode> = Vec::new();
        let mut resized = false;
        for event in self.events_rx.try_iter() {
            match event {
                InputEvent::Key(key) => keys.push(key),
                InputEvent::Resize { .. } => resized = true,
                InputEvent::Error(e) => tracing::warn!(error = %e, "input error"),
            }
        }
        if resized {
            self.compositor.update_screen_size(false)?;
        }

        self.compositor.broadcast(&Message::update());
        self.compositor.broadcast(&Message::present());
        if !keys.is_empty() {
            if let Some(front) = self.compositor.front() {
                for key in keys {
                    front.push_message(Message::key(key));
                }
            }
        }

        self.compositor.present_windows(true, false, false);
        self.compositor.flip()?;
        self.frame_count += 1;
        Ok(())
    }

    /// Tick at the target rate until stopped.
    ///
    /// Returns early with the first frame error.
    pub fn run(&mut self) -> Result<()> {
        self.limiter.reset();
        while self.is_running() {
            self.tick()?;
            self.limiter.sleep();
        }
        tracing::info!(frames = self.frame_count, "engine stopped");
        Ok(())
    }

    /// Stop every actor and wait for them.
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }
        if let Some(watcher) = self.resize_watcher.take() {
            watcher.join();
        }
        for actor in self.window_actors.drain(..) {
            actor.join();
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("windows", &self.window_actors.len())
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}
