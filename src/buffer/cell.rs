//! Cell: The atomic unit of a character-cell surface.
//!
//! A cell holds one character plus the style it was written with. Styles are
//! curses-like: a set of [`Modifiers`] and a numbered color pair that the
//! terminal [`Palette`](crate::terminal::Palette) resolves to real colors at
//! flush time.

use bitflags::bitflags;

/// True-color RGB representation.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0)
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Red
    pub const RED: Self = Self::new(205, 0, 0);
    /// Green
    pub const GREEN: Self = Self::new(0, 205, 0);
    /// Yellow
    pub const YELLOW: Self = Self::new(205, 205, 0);
    /// Blue
    pub const BLUE: Self = Self::new(0, 0, 238);

    /// Create from a 24-bit hex color (e.g., 0xFF5500).
    #[inline]
    pub const fn from_u32(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xFF) as u8,
            ((hex >> 8) & 0xFF) as u8,
            (hex & 0xFF) as u8,
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

bitflags! {
    /// Text style modifiers.
    ///
    /// ```
    /// use cellwm::Modifiers;
    /// let style = Modifiers::BOLD | Modifiers::UNDERLINE;
    /// ```
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Bold text
        const BOLD = 0b0000_0001;
        /// Dim/faint text
        const DIM = 0b0000_0010;
        /// Italic text
        const ITALIC = 0b0000_0100;
        /// Underlined text
        const UNDERLINE = 0b0000_1000;
        /// Blinking text
        const BLINK = 0b0001_0000;
        /// Reversed colors (fg/bg swapped)
        const REVERSED = 0b0010_0000;
        /// Hidden/invisible text
        const HIDDEN = 0b0100_0000;
        /// Strikethrough text
        const STRIKETHROUGH = 0b1000_0000;
    }
}

impl std::fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

bitflags! {
    /// Cell-level flags for special states.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
    pub struct CellFlags: u8 {
        /// This cell is the right half of a wide character
        const WIDE_CONTINUATION = 0b0000_0001;
    }
}

/// A curses-style attribute set: modifiers plus an optional color pair.
///
/// Pair 0 means "terminal default colors".
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Style {
    /// Text modifiers.
    pub modifiers: Modifiers,
    /// Color pair number (0 = default colors).
    pub pair: u8,
}

impl Style {
    /// No modifiers, default colors.
    pub const PLAIN: Self = Self::new(Modifiers::empty(), 0);

    /// Create a style.
    #[inline]
    pub const fn new(modifiers: Modifiers, pair: u8) -> Self {
        Self { modifiers, pair }
    }

    /// A style that only selects a color pair.
    #[inline]
    pub const fn pair(pair: u8) -> Self {
        Self::new(Modifiers::empty(), pair)
    }

    /// A style that only sets modifiers.
    #[inline]
    pub const fn modifiers(modifiers: Modifiers) -> Self {
        Self::new(modifiers, 0)
    }

    /// Turn on the modifiers of `other`; adopt its pair if it names one.
    #[inline]
    #[must_use]
    pub const fn on(self, other: Self) -> Self {
        Self {
            modifiers: self.modifiers.union(other.modifiers),
            pair: if other.pair == 0 { self.pair } else { other.pair },
        }
    }

    /// Turn off the modifiers of `other`; drop the pair if `other` names it.
    #[inline]
    #[must_use]
    pub const fn off(self, other: Self) -> Self {
        Self {
            modifiers: self.modifiers.difference(other.modifiers),
            pair: if other.pair != 0 && other.pair == self.pair {
                0
            } else {
                self.pair
            },
        }
    }
}

impl From<Modifiers> for Style {
    fn from(modifiers: Modifiers) -> Self {
        Self::modifiers(modifiers)
    }
}

/// A single character cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    ch: char,
    style: Style,
    flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// An empty cell (space with default style).
    pub const EMPTY: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
        flags: CellFlags::empty(),
    };

    /// Create a new cell with default style.
    #[inline]
    pub const fn new(ch: char) -> Self {
        Self {
            ch,
            style: Style::PLAIN,
            flags: CellFlags::empty(),
        }
    }

    /// A blank cell painted with `style`.
    #[inline]
    pub const fn blank(style: Style) -> Self {
        Self::new(' ').with_style(style)
    }

    /// Create the right-hand placeholder of a wide character.
    #[inline]
    pub const fn wide_continuation(style: Style) -> Self {
        Self {
            ch: ' ',
            style,
            flags: CellFlags::WIDE_CONTINUATION,
        }
    }

    /// The character.
    #[inline]
    pub const fn ch(&self) -> char {
        self.ch
    }

    /// The style.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// The flags.
    #[inline]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Check if this is a wide-character continuation.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Display width of the character (0, 1, or 2).
    #[inline]
    pub fn display_width(&self) -> u8 {
        if self.is_wide_continuation() {
            return 0;
        }
        u8::try_from(unicode_width::UnicodeWidthChar::width(self.ch).unwrap_or(1)).unwrap_or(1)
    }

    /// Set the style (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Reset the cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("ch", &self.ch)
            .field("style", &self.style)
            .field("flags", &self.flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_from_hex() {
        let rgb = Rgb::from_u32(0xFF8000);
        assert_eq!(rgb, Rgb::new(255, 128, 0));
    }

    #[test]
    fn test_style_on_off() {
        let base = Style::pair(2);
        let bold = base.on(Style::modifiers(Modifiers::BOLD | Modifiers::UNDERLINE));
        assert_eq!(bold.pair, 2);
        assert!(bold.modifiers.contains(Modifiers::BOLD));

        let off = bold.off(Style::new(Modifiers::BOLD, 2));
        assert_eq!(off.modifiers, Modifiers::UNDERLINE);
        assert_eq!(off.pair, 0);

        // Turning off a different pair leaves ours alone.
        assert_eq!(bold.off(Style::pair(3)).pair, 2);
    }

    #[test]
    fn test_cell_display_width() {
        assert_eq!(Cell::new('A').display_width(), 1);
        assert_eq!(Cell::new('日').display_width(), 2);
        assert_eq!(Cell::wide_continuation(Style::PLAIN).display_width(), 0);
    }

    #[test]
    fn test_cell_equality_includes_style() {
        let a = Cell::new('x').with_style(Style::pair(1));
        let b = Cell::new('x').with_style(Style::pair(1));
        let c = Cell::new('x').with_style(Style::pair(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_cell_reset() {
        let mut cell = Cell::new('X').with_style(Style::modifiers(Modifiers::BOLD));
        cell.reset();
        assert_eq!(cell, Cell::EMPTY);
    }
}
