//! Compositor: Window registry, z-order and the screen double buffer.
//!
//! Windows are painted back to front into a screen-sized back surface,
//! which `flip` copies onto the front surface and pushes through the
//! [`Display`].
//!
//! # Lock order
//!
//! compositor, then one window, then the display. No operation holds two
//! window locks at once, and nothing here takes the compositor lock while a
//! window or display lock is held.

use crate::actor::{Message, MessageKind};
use crate::buffer::Surface;
use crate::error::{Error, Result};
use crate::layout::Rect;
use crate::pacing::FrameCounter;
use crate::sync::SaturatingCounter;
use crate::terminal::Display;
use crate::window::{Window, WindowName};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

struct CompositorState {
    windows: BTreeMap<WindowName, Arc<Window>>,
    /// Front-most first.
    z_order: Vec<WindowName>,
    back: Surface,
    front: Surface,
    pending_clears: SaturatingCounter<u32>,
    pending_erases: SaturatingCounter<u32>,
    screen_fps: FrameCounter,
}

impl CompositorState {
    fn broadcast(&self, message: &Message) {
        for window in self.windows.values() {
            window.push_message(message.clone());
        }
    }

    fn screen(&self) -> Rect {
        self.back.rect()
    }
}

/// The window manager.
///
/// Owns every registered window for as long as it stays registered and the
/// screen-level back/front surfaces, kept at the terminal's geometry.
pub struct Compositor {
    state: Mutex<CompositorState>,
    display: Arc<Display>,
}

impl Compositor {
    /// Create a compositor covering the whole display.
    pub fn new(display: Arc<Display>) -> Self {
        let (width, height) = display.size();
        let screen = Rect::from_size(width, height);
        let mut screen_fps = FrameCounter::new();
        screen_fps.set_no_update_delay(true);

        Self {
            state: Mutex::new(CompositorState {
                windows: BTreeMap::new(),
                z_order: Vec::new(),
                back: Surface::new(screen),
                front: Surface::new(screen),
                pending_clears: SaturatingCounter::zero(),
                pending_erases: SaturatingCounter::zero(),
                screen_fps,
            }),
            display,
        }
    }

    /// The display this compositor presents to.
    pub const fn display(&self) -> &Arc<Display> {
        &self.display
    }

    /// Take ownership of `window` and add it to the back of the z-order.
    ///
    /// The window is clamped onto the screen and the back surface is cleared
    /// so the next flip repaints everything.
    pub fn register(&self, window: Window) -> Result<Arc<Window>> {
        let mut state = self.state.lock();
        let name = window.name().clone();
        if state.windows.contains_key(&name) {
            tracing::warn!(window = %name, "duplicate window registration rejected");
            return Err(Error::DuplicateName(name.to_string()));
        }

        let screen = state.screen();
        let rect = window.rect();
        let clamped = rect.clamp_to(screen.width, screen.height);
        if clamped != rect {
            tracing::debug!(window = %name, ?rect, ?clamped, "window clamped to screen");
            window.reshape(clamped);
        }
        state.back.clear();

        let window = Arc::new(window);
        state.windows.insert(name.clone(), Arc::clone(&window));
        state.z_order.push(name.clone());
        tracing::debug!(window = %name, windows = state.windows.len(), "window registered");
        Ok(window)
    }

    /// Remove a window and hand it back.
    pub fn unregister(&self, name: &str) -> Result<Arc<Window>> {
        let mut state = self.state.lock();
        let window = state
            .windows
            .remove(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;
        state.z_order.retain(|entry| entry.as_str() != name);
        tracing::debug!(window = name, "window unregistered");
        Ok(window)
    }

    /// Move a window to the front, keeping everyone else's relative order.
    ///
    /// Returns `false` if no such window is registered.
    pub fn make_front(&self, name: &str) -> bool {
        let mut state = self.state.lock();
        let Some(index) = state.z_order.iter().position(|entry| entry.as_str() == name) else {
            return false;
        };
        let entry = state.z_order.remove(index);
        state.z_order.insert(0, entry);
        true
    }

    /// The front-most window.
    pub fn front(&self) -> Option<Arc<Window>> {
        let state = self.state.lock();
        let name = state.z_order.first()?;
        state.windows.get(name).cloned()
    }

    /// Look a window up by name.
    pub fn get(&self, name: &str) -> Option<Arc<Window>> {
        self.state.lock().windows.get(name).cloned()
    }

    /// Check whether a window is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.state.lock().windows.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<WindowName> {
        self.state.lock().windows.keys().cloned().collect()
    }

    /// Registered names, front-most first.
    pub fn z_order(&self) -> Vec<WindowName> {
        self.state.lock().z_order.clone()
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.state.lock().windows.len()
    }

    /// Check whether no window is registered.
    pub fn is_empty(&self) -> bool {
        self.state.lock().windows.is_empty()
    }

    /// Queue `message` on every registered window.
    pub fn broadcast(&self, message: &Message) {
        self.state.lock().broadcast(message);
    }

    /// Queue `message` on one window.
    pub fn send_message(&self, name: &str, message: Message) -> Result<()> {
        let window = self.get(name).ok_or_else(|| Error::NotFound(name.to_owned()))?;
        window.push_message(message);
        Ok(())
    }

    /// Paint every window into the back surface, back-most first.
    ///
    /// Optionally broadcasts [`MessageKind::Update`] and then
    /// [`MessageKind::Present`] beforehand. With `new_frame` the back surface
    /// is erased first. Each window goes through its own present gates.
    pub fn present_windows(&self, new_frame: bool, send_update: bool, send_present: bool) {
        let mut state = self.state.lock();
        if send_update {
            state.broadcast(&Message::new(MessageKind::Update));
        }
        if send_present {
            state.broadcast(&Message::new(MessageKind::Present));
        }

        if new_frame {
            state.back.erase();
        }

        let CompositorState {
            windows,
            z_order,
            back,
            ..
        } = &mut *state;
        for name in z_order.iter().rev() {
            let Some(window) = windows.get(name) else {
                continue;
            };
            if let Err(err) = window.present_virtual(back) {
                tracing::error!(window = %name, error = %err, "window present failed");
            }
        }
        back.touch();
    }

    /// Copy the back surface to the terminal.
    ///
    /// Afterwards at most one deferred clear and at most one deferred erase
    /// are applied to the back surface.
    pub fn flip(&self) -> Result<()> {
        let mut state = self.state.lock();
        let CompositorState {
            back,
            front,
            pending_clears,
            pending_erases,
            screen_fps,
            ..
        } = &mut *state;

        let local = Rect::from_size(back.width(), back.height());
        front.blit(back, local, 0, 0, true);
        back.acknowledge_repaint();
        self.display.refresh(front)?;
        front.acknowledge_repaint();
        front.untouch();
        screen_fps.count();

        if pending_clears.try_consume() {
            back.clear();
            self.display.stage(back);
        }
        if pending_erases.try_consume() {
            back.erase();
            self.display.stage(back);
        }
        Ok(())
    }

    /// Clear the back surface on a future flip.
    pub fn clear_buffer(&self) {
        self.state.lock().pending_clears.increment();
    }

    /// Erase the back surface on a future flip.
    pub fn erase_buffer(&self) {
        self.state.lock().pending_erases.increment();
    }

    /// Deferred clears not yet applied.
    pub fn pending_clears(&self) -> u32 {
        self.state.lock().pending_clears.value()
    }

    /// Deferred erases not yet applied.
    pub fn pending_erases(&self) -> u32 {
        self.state.lock().pending_erases.value()
    }

    /// Flips per second.
    pub fn screen_fps(&self) -> f64 {
        self.state.lock().screen_fps.fps()
    }

    /// Run `f` on the back surface.
    pub fn with_back<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> R {
        f(&mut self.state.lock().back)
    }

    /// Copy of the front surface.
    pub fn front_surface(&self) -> Surface {
        self.state.lock().front.clone()
    }

    /// Origin and size of the screen surfaces.
    pub fn screen(&self) -> Rect {
        self.state.lock().screen()
    }

    /// Check whether the terminal no longer matches the screen surfaces.
    pub fn new_screen_size(&self) -> bool {
        let screen = self.screen();
        match self.display.live_size() {
            Ok(size) => size != (screen.width, screen.height),
            Err(err) => {
                tracing::debug!(error = %err, "terminal size query failed");
                false
            }
        }
    }

    /// Adopt the terminal's current geometry.
    ///
    /// Resizes the display, both screen surfaces and any window that no
    /// longer fits, then broadcasts [`MessageKind::Resize`]. With
    /// `present_after` the windows are presented again with an update.
    /// A terminal reporting a zero dimension (a minimized pane, say) is left
    /// at its previous size.
    pub fn update_screen_size(&self, present_after: bool) -> Result<()> {
        let (width, height) = self.display.live_size()?;
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "ignoring empty terminal size");
            return Ok(());
        }
        self.display.resize(width, height)?;
        {
            let mut state = self.state.lock();
            state.back.resize(width, height);
            state.front.resize(width, height);
            state.back.clear();
            for window in state.windows.values() {
                let rect = window.rect();
                let clamped = rect.clamp_to(width, height);
                if clamped != rect {
                    window.reshape(clamped);
                }
            }
            state.broadcast(&Message::resize());
        }
        tracing::info!(width, height, "screen resized");

        if present_after {
            self.present_windows(true, true, false);
        }
        Ok(())
    }

    /// Move the screen surfaces, and every window with them, to `(x, y)`.
    pub fn update_pos(&self, x: u16, y: u16, present_after: bool) {
        {
            let mut state = self.state.lock();
            state.back.move_to(x, y);
            state.front.move_to(x, y);
            state.back.clear();
            state.broadcast(&Message::resize());
        }
        if present_after {
            self.present_windows(true, true, false);
        }
    }
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Compositor")
            .field("screen", &state.screen())
            .field("z_order", &state.z_order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::HeadlessDriver;
    use crate::window::WindowSpec;

    fn compositor(width: u16, height: u16) -> (Compositor, HeadlessDriver) {
        let driver = HeadlessDriver::new(width, height);
        let display = Display::new(Box::new(driver.clone())).unwrap();
        (Compositor::new(Arc::new(display)), driver)
    }

    fn window(name: &str, rect: Rect) -> Window {
        Window::new(name, WindowSpec::new(rect).unbuffered()).unwrap()
    }

    fn names(list: &[WindowName]) -> Vec<&str> {
        list.iter().map(WindowName::as_str).collect()
    }

    #[test]
    fn test_register_appends_and_rejects_duplicates() {
        let (wm, _) = compositor(20, 10);
        wm.register(window("a", Rect::new(0, 0, 4, 2))).unwrap();
        wm.register(window("b", Rect::new(0, 0, 4, 2))).unwrap();
        assert_eq!(names(&wm.z_order()), vec!["a", "b"]);

        let err = wm.register(window("a", Rect::new(1, 1, 2, 2))).unwrap_err();
        assert!(matches!(err, Error::DuplicateName(name) if name == "a"));
        assert_eq!(wm.get("a").unwrap().rect(), Rect::new(0, 0, 4, 2));
    }

    #[test]
    fn test_register_clamps_to_screen() {
        let (wm, _) = compositor(10, 5);
        let w = wm.register(window("big", Rect::new(8, 4, 30, 3))).unwrap();
        assert_eq!(w.rect(), Rect::new(0, 2, 10, 3));
    }

    #[test]
    fn test_unregister() {
        let (wm, _) = compositor(20, 10);
        wm.register(window("a", Rect::new(0, 0, 4, 2))).unwrap();
        let w = wm.unregister("a").unwrap();
        assert_eq!(w.name().as_str(), "a");
        assert!(wm.z_order().is_empty());
        assert!(matches!(wm.unregister("a"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_make_front_preserves_relative_order() {
        let (wm, _) = compositor(20, 10);
        for name in ["a", "b", "c", "d"] {
            wm.register(window(name, Rect::new(0, 0, 2, 2))).unwrap();
        }
        assert!(wm.make_front("c"));
        assert_eq!(names(&wm.z_order()), vec!["c", "a", "b", "d"]);
        assert!(!wm.make_front("zz"));
        assert_eq!(wm.front().unwrap().name().as_str(), "c");
    }

    #[test]
    fn test_front_of_empty_compositor() {
        let (wm, _) = compositor(20, 10);
        assert!(wm.front().is_none());
    }

    #[test]
    fn test_broadcast_and_send() {
        let (wm, _) = compositor(20, 10);
        let a = wm.register(window("a", Rect::new(0, 0, 2, 2))).unwrap();
        let b = wm.register(window("b", Rect::new(0, 0, 2, 2))).unwrap();

        wm.broadcast(&Message::with_param(MessageKind::Key, 42));
        for w in [&a, &b] {
            assert_eq!(w.message_count(), 1);
            let message = w.get_message();
            assert_eq!((message.kind(), message.param()), (MessageKind::Key, 42));
        }

        wm.send_message("b", Message::update()).unwrap();
        assert!(!a.has_messages());
        assert!(b.has_messages());
        assert!(matches!(
            wm.send_message("nobody", Message::update()),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_present_windows_paints_back_to_front() {
        let (wm, driver) = compositor(10, 3);
        let low = wm.register(window("low", Rect::new(0, 0, 6, 1))).unwrap();
        let high = wm.register(window("high", Rect::new(2, 0, 3, 1))).unwrap();
        low.print("llllll").unwrap();
        high.print("hhh").unwrap();

        wm.make_front("high");
        wm.present_windows(true, false, false);
        wm.flip().unwrap();
        assert_eq!(driver.row_text(0), "llhhhl    ");

        wm.make_front("low");
        wm.present_windows(true, false, false);
        wm.flip().unwrap();
        assert_eq!(driver.row_text(0), "llllll    ");
    }

    #[test]
    fn test_present_windows_sends_update_then_present() {
        let (wm, _) = compositor(10, 3);
        let w = wm.register(window("w", Rect::new(0, 0, 2, 1))).unwrap();
        wm.present_windows(false, true, true);
        assert_eq!(w.get_message().kind(), MessageKind::Update);
        assert_eq!(w.get_message().kind(), MessageKind::Present);
    }

    #[test]
    fn test_flip_consumes_one_credit_per_call() {
        let (wm, _) = compositor(10, 3);
        for _ in 0..3 {
            wm.clear_buffer();
        }
        for remaining in [2, 1, 0] {
            wm.with_back(|back| back.print_at(0, 0, "x"));
            wm.flip().unwrap();
            assert_eq!(wm.pending_clears(), remaining);
            assert_eq!(wm.with_back(|back| back.row_text(0)), "          ");
        }

        wm.with_back(|back| back.print_at(0, 0, "x"));
        wm.flip().unwrap();
        assert_eq!(wm.with_back(|back| back.row_text(0)), "x         ");
    }

    #[test]
    fn test_erase_credit_independent_of_clear() {
        let (wm, _) = compositor(10, 3);
        wm.erase_buffer();
        wm.erase_buffer();
        wm.clear_buffer();
        wm.flip().unwrap();
        assert_eq!((wm.pending_clears(), wm.pending_erases()), (0, 1));
        wm.flip().unwrap();
        assert_eq!((wm.pending_clears(), wm.pending_erases()), (0, 0));
    }

    #[test]
    fn test_update_screen_size() {
        let (wm, driver) = compositor(20, 10);
        let w = wm.register(window("w", Rect::new(10, 5, 8, 4))).unwrap();
        assert!(!wm.new_screen_size());

        driver.set_size(12, 6);
        assert!(wm.new_screen_size());
        wm.update_screen_size(false).unwrap();
        assert!(!wm.new_screen_size());
        assert_eq!(wm.screen(), Rect::from_size(12, 6));
        assert_eq!(w.rect(), Rect::new(4, 2, 8, 4));
        assert_eq!(w.get_message().kind(), MessageKind::Resize);
    }

    #[test]
    fn test_update_screen_size_ignores_empty_terminal() {
        let (wm, driver) = compositor(20, 10);
        let w = wm.register(window("w", Rect::new(2, 2, 8, 4))).unwrap();

        driver.set_size(0, 5);
        wm.update_screen_size(true).unwrap();
        assert_eq!(wm.screen(), Rect::from_size(20, 10));
        assert_eq!(w.rect(), Rect::new(2, 2, 8, 4));
        assert!(!w.has_messages());

        driver.set_size(20, 10);
        assert!(!wm.new_screen_size());
    }

    #[test]
    fn test_update_pos_offsets_the_screen() {
        let (wm, driver) = compositor(10, 3);
        let w = wm.register(window("w", Rect::new(0, 0, 2, 1))).unwrap();
        w.print("ab").unwrap();
        wm.update_pos(3, 1, true);
        wm.flip().unwrap();
        assert_eq!(&driver.row_text(1)[..5], "   ab");
        assert_eq!(w.get_message().kind(), MessageKind::Resize);
    }
}
