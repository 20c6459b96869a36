//! Rect: Position and size of a surface.

/// A rectangle defined by position and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate (column) of the top-left corner.
    pub x: u16,
    /// Y coordinate (row) of the top-left corner.
    pub y: u16,
    /// Width in columns.
    pub width: u16,
    /// Height in rows.
    pub height: u16,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from a terminal size (full screen).
    #[inline]
    pub const fn from_size(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Zero-sized rectangle.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Get the area (number of cells).
    #[inline]
    pub const fn area(&self) -> u32 {
        (self.width as u32) * (self.height as u32)
    }

    /// Check if the rectangle is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Get the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle intersects with another.
    #[inline]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Shrink the rectangle by a margin on all sides.
    #[inline]
    #[must_use]
    pub const fn shrink(&self, margin: u16) -> Self {
        let m2 = margin.saturating_mul(2);
        if self.width <= m2 || self.height <= m2 {
            return Self::ZERO;
        }
        Self::new(self.x + margin, self.y + margin, self.width - m2, self.height - m2)
    }

    /// Fit this rectangle inside a `width` x `height` area anchored at 0,0.
    ///
    /// The size is cut first, then the origin is pulled back so the far edges
    /// stay inside. The result is never smaller than 1x1.
    #[must_use]
    pub fn clamp_to(&self, width: u16, height: u16) -> Self {
        let width_limit = width.max(1);
        let height_limit = height.max(1);
        let w = self.width.clamp(1, width_limit);
        let h = self.height.clamp(1, height_limit);
        Self::new(self.x.min(width_limit - w), self.y.min(height_limit - h), w, h)
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {} {}x{})", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(2, 3, 10, 4);
        assert_eq!(rect.right(), 12);
        assert_eq!(rect.bottom(), 7);
        assert!(rect.contains(11, 6));
        assert!(!rect.contains(12, 6));
        assert_eq!(rect.area(), 40);
    }

    #[test]
    fn test_rect_shrink() {
        assert_eq!(Rect::new(0, 0, 10, 6).shrink(1), Rect::new(1, 1, 8, 4));
        assert_eq!(Rect::new(0, 0, 2, 6).shrink(1), Rect::ZERO);
    }

    #[test]
    fn test_clamp_keeps_fitting_rect() {
        let rect = Rect::new(5, 5, 10, 4);
        assert_eq!(rect.clamp_to(80, 24), rect);
    }

    #[test]
    fn test_clamp_cuts_size_then_pulls_origin() {
        let rect = Rect::new(70, 20, 40, 10);
        assert_eq!(rect.clamp_to(80, 24), Rect::new(40, 14, 40, 10));
        assert_eq!(rect.clamp_to(20, 5), Rect::new(0, 0, 20, 5));
    }

    #[test]
    fn test_clamp_never_empty() {
        assert_eq!(Rect::new(3, 3, 0, 0).clamp_to(0, 0), Rect::new(0, 0, 1, 1));
    }
}
