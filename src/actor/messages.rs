//! Message types for actor communication.
//!
//! [`Message`] is what windows receive in their queues. [`InputEvent`] flows
//! from the input and resize actors to the presentation loop.

use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Key codes for keyboard input.
///
/// Keys travel inside a [`Message`] parameter, so every key has a stable
/// numeric code: characters use their Unicode scalar value and the named
/// keys live just above the Unicode range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character (or a control character for Ctrl+letter).
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Backtab (Shift+Tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Esc,
}

const NAMED_BASE: u32 = 0x11_0000;
const FUNCTION_BASE: u32 = 0x11_0100;
const NAMED: [KeyCode; 15] = [
    KeyCode::Backspace,
    KeyCode::Enter,
    KeyCode::Left,
    KeyCode::Right,
    KeyCode::Up,
    KeyCode::Down,
    KeyCode::Home,
    KeyCode::End,
    KeyCode::PageUp,
    KeyCode::PageDown,
    KeyCode::Tab,
    KeyCode::BackTab,
    KeyCode::Delete,
    KeyCode::Insert,
    KeyCode::Esc,
];

impl KeyCode {
    /// Numeric code carried in a key message's parameter.
    pub fn code(self) -> u32 {
        match self {
            Self::Char(c) => u32::from(c),
            Self::F(n) => FUNCTION_BASE + u32::from(n),
            named => {
                let index = NAMED.iter().position(|k| *k == named).unwrap_or(0);
                NAMED_BASE + u32::try_from(index).unwrap_or(0)
            }
        }
    }

    /// Decode a numeric code produced by [`KeyCode::code`].
    pub fn from_code(code: u32) -> Option<Self> {
        if let Some(c) = char::from_u32(code) {
            return Some(Self::Char(c));
        }
        if code >= FUNCTION_BASE {
            return u8::try_from(code - FUNCTION_BASE).ok().map(Self::F);
        }
        let index = usize::try_from(code.checked_sub(NAMED_BASE)?).ok()?;
        NAMED.get(index).copied()
    }

    /// Check for a character key, ignoring ASCII case.
    pub fn is_char(self, expected: char) -> bool {
        matches!(self, Self::Char(c) if c.eq_ignore_ascii_case(&expected))
    }
}

/// What a [`Message`] is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// Time to update internal state.
    Update,
    /// Time to redraw and ask for a present.
    Present,
    /// A key for the front window; the parameter holds its code.
    Key,
    /// The screen geometry or position changed.
    Resize,
}

/// A message delivered through a window's queue.
///
/// The optional payload is shared read-only between the sender and every
/// receiver; receivers should not hold it beyond handling the message.
#[derive(Clone)]
pub struct Message {
    kind: MessageKind,
    param: u32,
    payload: Option<Arc<dyn Any + Send + Sync>>,
    timestamp: Instant,
}

impl Message {
    /// A message with a zero parameter.
    pub fn new(kind: MessageKind) -> Self {
        Self::with_param(kind, 0)
    }

    /// A message with a parameter.
    pub fn with_param(kind: MessageKind, param: u32) -> Self {
        Self {
            kind,
            param,
            payload: None,
            timestamp: Instant::now(),
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: Arc<dyn Any + Send + Sync>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// An update message.
    pub fn update() -> Self {
        Self::new(MessageKind::Update)
    }

    /// A present message.
    pub fn present() -> Self {
        Self::new(MessageKind::Present)
    }

    /// A resize message.
    pub fn resize() -> Self {
        Self::new(MessageKind::Resize)
    }

    /// A key message.
    pub fn key(key: KeyCode) -> Self {
        Self::with_param(MessageKind::Key, key.code())
    }

    /// Kind.
    #[inline]
    pub const fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Parameter.
    #[inline]
    pub const fn param(&self) -> u32 {
        self.param
    }

    /// When the message was created.
    #[inline]
    pub const fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// The payload, if there is one of type `T`.
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref::<T>())
    }

    /// The key of a key message.
    pub fn key_code(&self) -> Option<KeyCode> {
        match self.kind {
            MessageKind::Key => KeyCode::from_code(self.param),
            _ => None,
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind)
            .field("param", &self.param)
            .field("payload", &self.payload.is_some())
            .finish_non_exhaustive()
    }
}

/// Events from the input and resize actors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key was pressed.
    Key(KeyCode),

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },

    /// Input thread encountered an error.
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes_round_trip_for_named_keys() {
        for key in NAMED.iter().copied().chain([KeyCode::F(1), KeyCode::F(12), KeyCode::Char('q')]) {
            assert_eq!(KeyCode::from_code(key.code()), Some(key));
        }
    }

    #[test]
    fn test_char_code_is_scalar_value() {
        assert_eq!(KeyCode::Char('A').code(), 65);
        assert_eq!(KeyCode::from_code(0x03), Some(KeyCode::Char('\u{3}')));
    }

    #[test]
    fn test_key_message() {
        let msg = Message::key(KeyCode::Enter);
        assert_eq!(msg.kind(), MessageKind::Key);
        assert_eq!(msg.key_code(), Some(KeyCode::Enter));
        assert_eq!(Message::update().key_code(), None);
    }

    #[test]
    fn test_payload_downcast() {
        let msg = Message::present().with_payload(Arc::new(String::from("hi")));
        assert_eq!(msg.payload::<String>().map(String::as_str), Some("hi"));
        assert!(msg.payload::<u32>().is_none());
        assert!(Message::update().payload::<String>().is_none());
    }

    #[test]
    fn test_is_char_ignores_case() {
        assert!(KeyCode::Char('Q').is_char('q'));
        assert!(!KeyCode::Enter.is_char('q'));
    }
}
