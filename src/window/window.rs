//! Window: A named, double-buffered surface pair with a message queue.

use super::command::{DrawCommand, Painter};
use super::format::{format_print, PrintArg};
use crate::actor::Message;
use crate::buffer::{Modifiers, Style, Surface};
use crate::error::{Error, Result};
use crate::layout::Rect;
use crate::pacing::FrameCounter;
use crate::sync::{Backpressure, BlockingQueue, ReentrantLock, ReentrantLockGuard, SaturatingCounter};
use crate::terminal::PresentTarget;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};
use std::time::Duration;

/// Default capacity of a window's message queue.
pub const DEFAULT_MESSAGE_CAPACITY: usize = 256;
/// Default capacity of a window's command queue.
pub const DEFAULT_COMMAND_CAPACITY: usize = 1024;
const FENCE_POLL: Duration = Duration::from_millis(50);

/// A window's registry key.
///
/// Names compare by value, so two separately built `"main"` names are the
/// same key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowName(Arc<str>);

impl WindowName {
    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WindowName {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for WindowName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl Borrow<str> for WindowName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for WindowName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

/// How a window is created.
#[derive(Debug, Clone)]
pub struct WindowSpec {
    /// Origin (relative to the compositor screen) and size.
    pub rect: Rect,
    /// Title drawn by the title bar.
    pub title: String,
    /// Style of the title bar.
    pub title_style: Style,
    /// Style erased cells are painted with.
    pub background: Style,
    /// Draw into the back surface (and flip) instead of the front one.
    pub use_buffer: bool,
    /// Presents must be paid for with an external credit.
    pub requires_external_credit: bool,
    /// Check skip credits before the external credit gate.
    pub skip_credits_checked_first: bool,
    /// Presents to suppress before the first real one.
    pub initial_skip_credits: u32,
    /// Recompute both fps estimates on every sample.
    pub no_update_delay: bool,
}

impl WindowSpec {
    /// A buffered window covering `rect` with default settings.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            title: String::new(),
            title_style: Style::new(Modifiers::BOLD | Modifiers::UNDERLINE, 2),
            background: Style::PLAIN,
            use_buffer: true,
            requires_external_credit: false,
            skip_credits_checked_first: true,
            initial_skip_credits: 0,
            no_update_delay: false,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the title bar style.
    #[must_use]
    pub const fn with_title_style(mut self, style: Style) -> Self {
        self.title_style = style;
        self
    }

    /// Set the background style.
    #[must_use]
    pub const fn with_background(mut self, style: Style) -> Self {
        self.background = style;
        self
    }

    /// Draw directly into the front surface.
    #[must_use]
    pub const fn unbuffered(mut self) -> Self {
        self.use_buffer = false;
        self
    }

    /// Require an external credit for every present.
    #[must_use]
    pub const fn with_external_credit(mut self, required: bool) -> Self {
        self.requires_external_credit = required;
        self
    }

    /// Choose which present gate is evaluated first.
    #[must_use]
    pub const fn with_skip_credits_checked_first(mut self, first: bool) -> Self {
        self.skip_credits_checked_first = first;
        self
    }

    /// Start with `credits` skip credits.
    #[must_use]
    pub const fn with_skip_credits(mut self, credits: u32) -> Self {
        self.initial_skip_credits = credits;
        self
    }

    /// Recompute fps estimates on every sample.
    #[must_use]
    pub const fn with_no_update_delay(mut self, enabled: bool) -> Self {
        self.no_update_delay = enabled;
        self
    }
}

/// Present statistics of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    /// Estimated presents per second.
    pub present_fps: f64,
    /// Estimated present requests per second.
    pub request_fps: f64,
    /// Presents performed since creation.
    pub presents: u64,
    /// Present requests since creation.
    pub requests: u64,
    /// Skip credits held.
    pub skip_credits: u32,
    /// External present credits held.
    pub external_credits: u32,
}

struct WindowState {
    front: Surface,
    back: Surface,
    title: String,
    title_style: Style,
    use_buffer: bool,
    skip_credits: SaturatingCounter<u32>,
    external_credits: SaturatingCounter<u32>,
    requires_external_credit: bool,
    skip_credits_checked_first: bool,
    present_fps: FrameCounter,
    request_fps: FrameCounter,
}

impl WindowState {
    fn target(&mut self) -> &mut Surface {
        if self.use_buffer {
            &mut self.back
        } else {
            &mut self.front
        }
    }

    /// Evaluate both present gates in the configured order.
    fn admit(&mut self) -> bool {
        if self.skip_credits_checked_first {
            if self.skip_credits.try_consume() {
                return false;
            }
            self.external_gate()
        } else {
            if !self.external_gate() {
                return false;
            }
            !self.skip_credits.try_consume()
        }
    }

    fn external_gate(&mut self) -> bool {
        !self.requires_external_credit || self.external_credits.try_consume()
    }

    fn apply(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::MoveCursor { x, y } => {
                self.target().move_cursor(x, y);
            }
            DrawCommand::Print(text) => self.target().print(&text),
            DrawCommand::PrintAt { x, y, text } => self.target().print_at(x, y, &text),
            DrawCommand::Box {
                vertical,
                horizontal,
            } => self.target().draw_box(vertical, horizontal),
            DrawCommand::HLine { ch, len } => self.target().hline(ch, len),
            DrawCommand::VLine { ch, len } => self.target().vline(ch, len),
            DrawCommand::Erase => self.target().erase(),
            DrawCommand::Clear => self.target().clear(),
            DrawCommand::EraseRect {
                x0,
                y0,
                x1,
                y1,
                fill,
            } => self.target().erase_rect(x0, y0, x1, y1, fill),
            DrawCommand::AttrOn(style) => self.target().attr_on(style),
            DrawCommand::AttrOff(style) => self.target().attr_off(style),
            DrawCommand::AttrSet(style) => self.target().attr_set(style),
            DrawCommand::SetBackground(style) => {
                self.front.set_background(style);
                self.back.set_background(style);
            }
            DrawCommand::SetTitle(title) => self.title = title,
            DrawCommand::DrawTitle => {
                let (title, style) = (std::mem::take(&mut self.title), self.title_style);
                self.target().draw_title(&title, style);
                self.title = title;
            }
            DrawCommand::Resize { width, height } => {
                if width > 0 && height > 0 {
                    self.front.resize(width, height);
                    self.back.resize(width, height);
                }
            }
            DrawCommand::MoveTo { x, y } => {
                self.front.move_to(x, y);
                self.back.move_to(x, y);
            }
            DrawCommand::Touch => self.front.touch(),
            DrawCommand::Untouch => self.front.untouch(),
            DrawCommand::TouchLines { start, count } => self.front.touch_lines(start, count),
            DrawCommand::Flip { clear } => {
                let full = Rect::from_size(self.back.width(), self.back.height());
                self.front.blit(&self.back, full, 0, 0, clear);
            }
            DrawCommand::RequestPresent => {
                self.external_credits.increment();
                self.request_fps.count();
            }
            DrawCommand::Fence(reply) => {
                let _ = reply.send(());
            }
        }
    }
}

/// Holds a window's lock; see [`Window::lock`].
pub struct WindowLock<'a> {
    _guard: ReentrantLockGuard<'a, WindowState>,
}

/// A named, double-buffered window.
///
/// The front surface is what gets presented; the back surface is where a
/// buffered window draws before flipping. Both always share one geometry.
/// All surface and credit state lives behind the window's reentrant lock.
pub struct Window {
    name: WindowName,
    state: ReentrantLock<WindowState>,
    messages: BlockingQueue<Message>,
    commands: Sender<DrawCommand>,
    /// Present until an actor claims the window.
    receiver: Mutex<Option<Receiver<DrawCommand>>>,
    painter_alive: Arc<AtomicBool>,
    owner: Mutex<Option<ThreadId>>,
}

impl Window {
    /// Create a window with default queue capacities.
    pub fn new(name: impl Into<WindowName>, spec: WindowSpec) -> Result<Self> {
        Self::with_capacity(name, spec, DEFAULT_MESSAGE_CAPACITY, DEFAULT_COMMAND_CAPACITY)
    }

    /// Create a window with explicit queue capacities.
    ///
    /// The message queue drops its oldest message when full. The command
    /// queue blocks the submitting thread until the owner catches up.
    pub fn with_capacity(
        name: impl Into<WindowName>,
        spec: WindowSpec,
        message_capacity: usize,
        command_capacity: usize,
    ) -> Result<Self> {
        let rect = spec.rect;
        if rect.is_empty() {
            return Err(Error::InvalidGeometry {
                width: rect.width,
                height: rect.height,
            });
        }

        let mut front = Surface::new(rect);
        front.set_background(spec.background);
        front.erase();
        let back = front.clone();

        let mut present_fps = FrameCounter::new();
        let mut request_fps = FrameCounter::new();
        present_fps.set_no_update_delay(spec.no_update_delay);
        request_fps.set_no_update_delay(spec.no_update_delay);

        let (commands, receiver) = bounded(command_capacity.max(1));
        let name = name.into();
        tracing::debug!(window = %name, ?rect, "window created");

        Ok(Self {
            name,
            state: ReentrantLock::new(WindowState {
                front,
                back,
                title: spec.title,
                title_style: spec.title_style,
                use_buffer: spec.use_buffer,
                skip_credits: SaturatingCounter::new(spec.initial_skip_credits),
                external_credits: SaturatingCounter::zero(),
                requires_external_credit: spec.requires_external_credit,
                skip_credits_checked_first: spec.skip_credits_checked_first,
                present_fps,
                request_fps,
            }),
            messages: BlockingQueue::bounded(message_capacity.max(1), Backpressure::DropOldest),
            commands,
            receiver: Mutex::new(Some(receiver)),
            painter_alive: Arc::new(AtomicBool::new(false)),
            owner: Mutex::new(None),
        })
    }

    /// Registry key.
    #[inline]
    pub const fn name(&self) -> &WindowName {
        &self.name
    }

    /// Hold the window lock across several operations.
    ///
    /// The holder may keep calling window methods; other threads wait. On
    /// the owner's thread (or before any actor claims the window) drawing
    /// applies immediately, so a run of calls is atomic. From any other
    /// thread drawing is only queued, and the actor applies it after the
    /// guard is dropped; [`Window::sync`] fails with [`Error::LockHeld`]
    /// while the guard is alive.
    pub fn lock(&self) -> WindowLock<'_> {
        WindowLock {
            _guard: self.state.lock(),
        }
    }

    /// Check whether any thread holds the window lock.
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Claim the window for the calling thread.
    ///
    /// From now on drawing calls from other threads are queued for the
    /// returned painter. Only the first call succeeds.
    pub fn take_painter(&self) -> Option<Painter> {
        let receiver = self.receiver.lock().take()?;
        *self.owner.lock() = Some(thread::current().id());
        tracing::debug!(window = %self.name, "painter claimed");
        Some(Painter::new(receiver, Arc::clone(&self.painter_alive)))
    }

    fn applies_inline(&self) -> bool {
        match *self.owner.lock() {
            Some(owner) => owner == thread::current().id(),
            None => true,
        }
    }

    fn submit(&self, command: DrawCommand) -> Result<()> {
        if self.applies_inline() {
            self.apply(command);
            return Ok(());
        }
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(command)) => {
                if self.state.is_held_by_current_thread() {
                    return Err(Error::LockHeld(self.name.to_string()));
                }
                tracing::debug!(window = %self.name, "command queue full, waiting for painter");
                self.commands
                    .send(command)
                    .map_err(|_| Error::ActorGone(self.name.to_string()))
            }
            Err(TrySendError::Disconnected(_)) => Err(Error::ActorGone(self.name.to_string())),
        }
    }

    pub(crate) fn apply(&self, command: DrawCommand) {
        self.state.with(|state| state.apply(command));
    }

    /// Wait until every command submitted before this call has been applied.
    ///
    /// Returns immediately when no actor has claimed the window. Fails with
    /// [`Error::OwnerThread`] on the owner's own thread and with
    /// [`Error::ActorGone`] if the painter was dropped. Fails with
    /// [`Error::LockHeld`] when the caller holds the window lock, since the
    /// actor needs it to apply anything.
    pub fn sync(&self) -> Result<()> {
        match *self.owner.lock() {
            None => return Ok(()),
            Some(owner) if owner == thread::current().id() => {
                return Err(Error::OwnerThread(self.name.to_string()));
            }
            Some(_) => {}
        }
        if self.state.is_held_by_current_thread() {
            return Err(Error::LockHeld(self.name.to_string()));
        }

        let (reply, done) = bounded(1);
        self.submit(DrawCommand::Fence(reply))?;
        loop {
            match done.recv_timeout(FENCE_POLL) {
                Ok(()) => return Ok(()),
                Err(RecvTimeoutError::Timeout) => {
                    if !self.painter_alive.load(Ordering::Acquire) {
                        return Err(Error::ActorGone(self.name.to_string()));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::ActorGone(self.name.to_string()));
                }
            }
        }
    }

    /// Move the cursor.
    pub fn move_cursor(&self, x: u16, y: u16) -> Result<()> {
        self.submit(DrawCommand::MoveCursor { x, y })
    }

    /// Write text at the cursor.
    pub fn print(&self, text: impl Into<String>) -> Result<()> {
        self.submit(DrawCommand::Print(text.into()))
    }

    /// Move the cursor and write text.
    pub fn print_at(&self, x: u16, y: u16, text: impl Into<String>) -> Result<()> {
        self.submit(DrawCommand::PrintAt {
            x,
            y,
            text: text.into(),
        })
    }

    /// Write formatted text at the cursor; see [`format_print`].
    pub fn print_fmt(&self, template: &str, args: &[PrintArg]) -> Result<()> {
        self.print(format_print(template, args))
    }

    /// Move the cursor and write formatted text; see [`format_print`].
    pub fn print_fmt_at(&self, x: u16, y: u16, template: &str, args: &[PrintArg]) -> Result<()> {
        self.print_at(x, y, format_print(template, args))
    }

    /// Draw a border; `'\0'` picks the default character.
    pub fn draw_box(&self, vertical: char, horizontal: char) -> Result<()> {
        self.submit(DrawCommand::Box {
            vertical,
            horizontal,
        })
    }

    /// Horizontal line from the cursor.
    pub fn hline(&self, ch: char, len: u16) -> Result<()> {
        self.submit(DrawCommand::HLine { ch, len })
    }

    /// Vertical line from the cursor.
    pub fn vline(&self, ch: char, len: u16) -> Result<()> {
        self.submit(DrawCommand::VLine { ch, len })
    }

    /// Fill with the background and home the cursor.
    pub fn erase(&self) -> Result<()> {
        self.submit(DrawCommand::Erase)
    }

    /// Erase and request a full terminal repaint.
    pub fn clear(&self) -> Result<()> {
        self.submit(DrawCommand::Clear)
    }

    /// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)`.
    pub fn erase_rect(&self, x0: u16, y0: u16, x1: u16, y1: u16, fill: char) -> Result<()> {
        self.submit(DrawCommand::EraseRect {
            x0,
            y0,
            x1,
            y1,
            fill,
        })
    }

    /// Turn attributes on.
    pub fn attr_on(&self, style: impl Into<Style>) -> Result<()> {
        self.submit(DrawCommand::AttrOn(style.into()))
    }

    /// Turn attributes off.
    pub fn attr_off(&self, style: impl Into<Style>) -> Result<()> {
        self.submit(DrawCommand::AttrOff(style.into()))
    }

    /// Replace the attributes.
    pub fn attr_set(&self, style: impl Into<Style>) -> Result<()> {
        self.submit(DrawCommand::AttrSet(style.into()))
    }

    /// Set the background of both surfaces.
    pub fn set_background(&self, style: impl Into<Style>) -> Result<()> {
        self.submit(DrawCommand::SetBackground(style.into()))
    }

    /// Change the title.
    pub fn set_title(&self, title: impl Into<String>) -> Result<()> {
        self.submit(DrawCommand::SetTitle(title.into()))
    }

    /// Draw the title bar on row 0.
    pub fn draw_title(&self) -> Result<()> {
        self.submit(DrawCommand::DrawTitle)
    }

    /// Resize both surfaces.
    pub fn resize(&self, width: u16, height: u16) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidGeometry { width, height });
        }
        self.submit(DrawCommand::Resize { width, height })
    }

    /// Move both surfaces.
    pub fn move_to(&self, x: u16, y: u16) -> Result<()> {
        self.submit(DrawCommand::MoveTo { x, y })
    }

    /// Mark the front surface changed.
    pub fn touch(&self) -> Result<()> {
        self.submit(DrawCommand::Touch)
    }

    /// Mark the front surface unchanged.
    pub fn untouch(&self) -> Result<()> {
        self.submit(DrawCommand::Untouch)
    }

    /// Mark rows of the front surface changed.
    pub fn touch_lines(&self, start: u16, count: u16) -> Result<()> {
        self.submit(DrawCommand::TouchLines { start, count })
    }

    /// Copy the back surface onto the front one.
    pub fn flip(&self, clear: bool) -> Result<()> {
        self.submit(DrawCommand::Flip { clear })
    }

    /// Ask for one compositor-driven present.
    ///
    /// Adds an external credit and records a sample in the request counter.
    pub fn request_present(&self) -> Result<()> {
        self.submit(DrawCommand::RequestPresent)
    }

    /// Admission-controlled refresh onto `target`.
    ///
    /// The skip gate and the external credit gate run in the configured
    /// order. If both pass, the front surface (or the back one with
    /// `via_buffer`) is composed onto `target`, flushed unless
    /// `defer_physical`, and one present is counted.
    ///
    /// Returns whether the refresh happened.
    pub fn present_onto(
        &self,
        target: &mut dyn PresentTarget,
        via_buffer: bool,
        defer_physical: bool,
    ) -> Result<bool> {
        let _held = self.state.lock();
        if !self.state.with(WindowState::admit) {
            return Ok(false);
        }

        self.state.with(|state| {
            let source = if via_buffer { &state.back } else { &state.front };
            target.compose(source);
        });
        if !defer_physical {
            target.flush()?;
        }
        self.state.with(|state| state.present_fps.count());
        Ok(true)
    }

    /// Present the front surface onto `target` without flushing.
    pub fn present_virtual(&self, target: &mut dyn PresentTarget) -> Result<bool> {
        self.present_onto(target, false, true)
    }

    /// Add one skip credit.
    pub fn skip_frame(&self) {
        self.state.with(|state| {
            state.skip_credits.increment();
        });
    }

    /// Add `credits` skip credits.
    pub fn add_skip_credits(&self, credits: u32) {
        self.state.with(|state| {
            state.skip_credits.add(credits);
        });
    }

    /// Choose which present gate runs first.
    pub fn set_skip_credits_checked_first(&self, first: bool) {
        self.state.with(|state| state.skip_credits_checked_first = first);
    }

    /// Require (or stop requiring) external credits.
    pub fn set_requires_external_credit(&self, required: bool) {
        self.state.with(|state| state.requires_external_credit = required);
    }

    /// Whether presents need external credits.
    pub fn requires_external_credit(&self) -> bool {
        self.state.with(|state| state.requires_external_credit)
    }

    /// Present statistics.
    pub fn stats(&self) -> WindowStats {
        self.state.with(|state| WindowStats {
            present_fps: state.present_fps.fps(),
            request_fps: state.request_fps.fps(),
            presents: state.present_fps.total_samples(),
            requests: state.request_fps.total_samples(),
            skip_credits: state.skip_credits.value(),
            external_credits: state.external_credits.value(),
        })
    }

    /// Origin and size.
    pub fn rect(&self) -> Rect {
        self.state.with(|state| state.front.rect())
    }

    /// Title.
    pub fn title(&self) -> String {
        self.state.with(|state| state.title.clone())
    }

    /// Apply a new geometry to both surfaces immediately.
    pub(crate) fn reshape(&self, rect: Rect) {
        self.state.with(|state| {
            for surface in [&mut state.front, &mut state.back] {
                surface.resize(rect.width, rect.height);
                surface.move_to(rect.x, rect.y);
                surface.touch();
            }
        });
    }

    /// Copy of the front surface.
    pub fn front(&self) -> Surface {
        self.state.with(|state| state.front.clone())
    }

    /// Copy of the back surface.
    pub fn back(&self) -> Surface {
        self.state.with(|state| state.back.clone())
    }

    /// Queue a message. A full queue drops its oldest message.
    pub fn push_message(&self, message: Message) {
        let dropped = self.messages.dropped();
        // Drop-oldest queues never reject.
        let _ = self.messages.push(message);
        if self.messages.dropped() != dropped {
            tracing::warn!(window = %self.name, "message queue full, dropped oldest message");
        }
    }

    /// Take the next message, blocking until one arrives.
    pub fn get_message(&self) -> Message {
        self.messages.pop()
    }

    /// Take the next message, waiting at most `timeout`.
    pub fn get_message_timeout(&self, timeout: Duration) -> Option<Message> {
        self.messages.pop_timeout(timeout)
    }

    /// Look at the next message without blocking.
    ///
    /// With `peek_only` the message stays queued.
    pub fn try_get_message(&self, peek_only: bool) -> Option<Message> {
        self.messages.peek(!peek_only)
    }

    /// Check whether a message is waiting.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Number of waiting messages.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("name", &self.name)
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}
