//! Palette: Numbered color pairs registered by the host.

use crate::buffer::Rgb;

/// Foreground and background of one color pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    /// Foreground color.
    pub fg: Rgb,
    /// Background color.
    pub bg: Rgb,
}

/// Maps color pair numbers to real colors.
///
/// Pair 0 is reserved for the terminal's default colors and cannot be
/// redefined. Unregistered pairs also render with default colors.
#[derive(Clone)]
pub struct Palette {
    pairs: [Option<ColorPair>; 256],
}

impl Palette {
    /// An empty palette (everything renders in default colors).
    pub const fn new() -> Self {
        Self { pairs: [None; 256] }
    }

    /// Define pair `pair`. Returns `false` for the reserved pair 0.
    pub fn init_pair(&mut self, pair: u8, fg: Rgb, bg: Rgb) -> bool {
        if pair == 0 {
            return false;
        }
        self.pairs[usize::from(pair)] = Some(ColorPair { fg, bg });
        true
    }

    /// Look up the colors of `pair`.
    #[inline]
    pub fn resolve(&self, pair: u8) -> Option<ColorPair> {
        self.pairs[usize::from(pair)]
    }

    /// Number of defined pairs.
    pub fn len(&self) -> usize {
        self.pairs.iter().filter(|p| p.is_some()).count()
    }

    /// Check if no pair is defined.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(
                self.pairs
                    .iter()
                    .enumerate()
                    .filter_map(|(i, p)| p.map(|p| (i, p))),
            )
            .finish()
    }
}
