//! Surface: A character-cell view with a cursor, a current style and an origin.
//!
//! Surfaces are the in-memory half of the terminal driver contract. Windows
//! draw into them, the compositor composes them, and the display flushes the
//! final one to the terminal. Cells are stored in row-major order.

use super::cell::{Cell, Style};
use crate::layout::Rect;

/// Default horizontal line character.
pub const HLINE: char = '─';
/// Default vertical line character.
pub const VLINE: char = '│';
const TAB_WIDTH: u16 = 8;

/// A grid of cells positioned relative to its parent.
///
/// Alongside the cells a surface carries:
/// - a cursor, advanced by [`Surface::print`]
/// - the current drawing style, changed by the `attr_*` methods
/// - a background style, used whenever cells are erased
/// - per-row touch flags, consulted when the result is flushed
/// - a repaint request, set by [`Surface::clear`]
#[derive(Clone)]
pub struct Surface {
    /// Contiguous cell storage (row-major order).
    cells: Vec<Cell>,
    /// Origin (relative to the parent) and size.
    rect: Rect,
    cursor_x: u16,
    /// May equal `height` once output ran past the last row.
    cursor_y: u16,
    style: Style,
    background: Style,
    touched: Vec<bool>,
    repaint: bool,
}

impl Surface {
    /// Create a blank surface covering `rect`.
    ///
    /// # Panics
    /// Panics if the width or height is 0.
    pub fn new(rect: Rect) -> Self {
        assert!(!rect.is_empty(), "Surface dimensions must be non-zero");
        let size = (rect.width as usize) * (rect.height as usize);
        Self {
            cells: vec![Cell::EMPTY; size],
            rect,
            cursor_x: 0,
            cursor_y: 0,
            style: Style::PLAIN,
            background: Style::PLAIN,
            touched: vec![true; rect.height as usize],
            repaint: false,
        }
    }

    /// Origin and size.
    #[inline]
    pub const fn rect(&self) -> Rect {
        self.rect
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.rect.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.rect.height
    }

    /// Cursor position as `(x, y)`.
    #[inline]
    pub const fn cursor(&self) -> (u16, u16) {
        (self.cursor_x, self.cursor_y)
    }

    /// Current drawing style.
    #[inline]
    pub const fn style(&self) -> Style {
        self.style
    }

    /// Background style used for erased cells.
    #[inline]
    pub const fn background(&self) -> Style {
        self.background
    }

    /// Get a reference to the underlying cell slice.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a linear index.
    #[inline]
    pub fn index_of(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.rect.width && y < self.rect.height {
            Some((y as usize) * (self.rect.width as usize) + (x as usize))
        } else {
            None
        }
    }

    /// Get a reference to a cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index_of(x, y).map(|i| &self.cells[i])
    }

    /// Set a cell at (x, y).
    ///
    /// Returns `false` if coordinates are out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if let Some(idx) = self.index_of(x, y) {
            self.cells[idx] = cell;
            self.touched[y as usize] = true;
            true
        } else {
            false
        }
    }

    /// Get an iterator over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.rect.width as usize)
    }

    /// The characters of row `y`, wide-character continuations skipped.
    pub fn row_text(&self, y: u16) -> String {
        self.rows()
            .nth(y as usize)
            .map(|row| {
                row.iter()
                    .filter(|c| !c.is_wide_continuation())
                    .map(Cell::ch)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Move the cursor.
    ///
    /// Returns `false` and leaves the cursor alone if (x, y) is outside.
    pub fn move_cursor(&mut self, x: u16, y: u16) -> bool {
        if x < self.rect.width && y < self.rect.height {
            self.cursor_x = x;
            self.cursor_y = y;
            true
        } else {
            false
        }
    }

    /// Turn on the modifiers (and pair) of `style`.
    pub fn attr_on(&mut self, style: Style) {
        self.style = self.style.on(style);
    }

    /// Turn off the modifiers (and pair) of `style`.
    pub fn attr_off(&mut self, style: Style) {
        self.style = self.style.off(style);
    }

    /// Replace the current style.
    pub fn attr_set(&mut self, style: Style) {
        self.style = style;
    }

    /// Set the style erased cells are painted with.
    pub fn set_background(&mut self, style: Style) {
        self.background = style;
    }

    /// The style a character written now would carry.
    #[inline]
    fn ink(&self) -> Style {
        self.background.on(self.style)
    }

    /// Write text at the cursor, advancing it.
    ///
    /// Text wraps at the right edge. `\n` clears the rest of the line and
    /// moves to the start of the next one. Output past the last row is
    /// discarded. Zero-width characters are skipped and other control
    /// characters are shown as `?`.
    pub fn print(&mut self, text: &str) {
        for ch in text.chars() {
            self.put_char(ch);
        }
    }

    /// Move the cursor to (x, y) and write text there.
    ///
    /// Nothing is written if (x, y) is outside.
    pub fn print_at(&mut self, x: u16, y: u16, text: &str) {
        if self.move_cursor(x, y) {
            self.print(text);
        }
    }

    fn put_char(&mut self, ch: char) {
        match ch {
            '\n' => {
                self.clear_to_eol();
                self.newline();
            }
            '\r' => self.cursor_x = 0,
            '\t' => {
                let next_stop = (self.cursor_x / TAB_WIDTH + 1) * TAB_WIDTH;
                let count = next_stop.min(self.rect.width).saturating_sub(self.cursor_x);
                for _ in 0..count.max(1) {
                    self.put_glyph(' ', 1);
                }
            }
            c if c.is_control() => self.put_glyph('?', 1),
            c => {
                let width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
                if width > 0 {
                    self.put_glyph(c, if width > 1 { 2 } else { 1 });
                }
            }
        }
    }

    fn put_glyph(&mut self, ch: char, width: u16) {
        if self.cursor_y >= self.rect.height || width > self.rect.width {
            return;
        }
        if self.cursor_x + width > self.rect.width {
            self.newline();
            if self.cursor_y >= self.rect.height {
                return;
            }
        }

        let ink = self.ink();
        let (x, y) = (self.cursor_x, self.cursor_y);
        self.set(x, y, Cell::new(ch).with_style(ink));
        if width == 2 {
            self.set(x + 1, y, Cell::wide_continuation(ink));
        }

        self.cursor_x += width;
        if self.cursor_x >= self.rect.width {
            self.newline();
        }
    }

    const fn newline(&mut self) {
        self.cursor_x = 0;
        if self.cursor_y < self.rect.height {
            self.cursor_y += 1;
        }
    }

    fn clear_to_eol(&mut self) {
        if self.cursor_y >= self.rect.height {
            return;
        }
        let blank = Cell::blank(self.background);
        for x in self.cursor_x..self.rect.width {
            self.set(x, self.cursor_y, blank);
        }
    }

    /// Draw `len` copies of `ch` rightwards from the cursor.
    ///
    /// `'\0'` selects the default line character. The cursor does not move.
    pub fn hline(&mut self, ch: char, len: u16) {
        let ch = if ch == '\0' { HLINE } else { ch };
        let cell = Cell::new(ch).with_style(self.ink());
        let end = self.cursor_x.saturating_add(len).min(self.rect.width);
        for x in self.cursor_x..end {
            self.set(x, self.cursor_y, cell);
        }
    }

    /// Draw `len` copies of `ch` downwards from the cursor.
    ///
    /// `'\0'` selects the default line character. The cursor does not move.
    pub fn vline(&mut self, ch: char, len: u16) {
        let ch = if ch == '\0' { VLINE } else { ch };
        let cell = Cell::new(ch).with_style(self.ink());
        let end = self.cursor_y.saturating_add(len).min(self.rect.height);
        for y in self.cursor_y..end {
            self.set(self.cursor_x, y, cell);
        }
    }

    /// Draw a border around the whole surface.
    ///
    /// `'\0'` selects the default vertical or horizontal character. The
    /// cursor does not move.
    pub fn draw_box(&mut self, vertical: char, horizontal: char) {
        let vertical = if vertical == '\0' { VLINE } else { vertical };
        let horizontal = if horizontal == '\0' { HLINE } else { horizontal };
        let ink = self.ink();
        let right = self.rect.width - 1;
        let bottom = self.rect.height - 1;

        for x in 0..self.rect.width {
            self.set(x, 0, Cell::new(horizontal).with_style(ink));
            self.set(x, bottom, Cell::new(horizontal).with_style(ink));
        }
        for y in 0..self.rect.height {
            self.set(0, y, Cell::new(vertical).with_style(ink));
            self.set(right, y, Cell::new(vertical).with_style(ink));
        }
        if right > 0 && bottom > 0 {
            self.set(0, 0, Cell::new('┌').with_style(ink));
            self.set(right, 0, Cell::new('┐').with_style(ink));
            self.set(0, bottom, Cell::new('└').with_style(ink));
            self.set(right, bottom, Cell::new('┘').with_style(ink));
        }
    }

    /// Fill row 0 with `style` and center `title` on it.
    ///
    /// The current style is restored afterwards.
    pub fn draw_title(&mut self, title: &str, style: Style) {
        let saved = self.style;
        self.attr_on(style);
        self.move_cursor(0, 0);
        self.hline(' ', self.rect.width);

        let title_width = u16::try_from(unicode_width::UnicodeWidthStr::width(title))
            .unwrap_or(u16::MAX)
            .min(self.rect.width);
        let start = (self.rect.width - title_width) / 2;
        let mut used = 0;
        self.move_cursor(start, 0);
        for ch in title.chars() {
            let width = u16::try_from(unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0))
                .unwrap_or(0);
            if used + width > title_width {
                break;
            }
            used += width;
            self.put_char(ch);
        }
        self.style = saved;
    }

    /// Fill every cell with the background and home the cursor.
    pub fn erase(&mut self) {
        self.cells.fill(Cell::blank(self.background));
        self.touched.fill(true);
        self.cursor_x = 0;
        self.cursor_y = 0;
    }

    /// Erase and request a full repaint on the next physical refresh.
    pub fn clear(&mut self) {
        self.erase();
        self.repaint = true;
    }

    /// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)` with `fill`.
    ///
    /// Coordinates outside the surface are clipped.
    pub fn erase_rect(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, fill: char) {
        let cell = Cell::new(fill).with_style(self.background);
        let x_end = x1.min(self.rect.width.saturating_sub(1));
        let y_end = y1.min(self.rect.height.saturating_sub(1));
        for y in y0..=y_end {
            for x in x0..=x_end {
                self.set(x, y, cell);
            }
        }
    }

    /// Resize the surface, preserving content where possible.
    ///
    /// New cells take the background. The cursor is clamped inside.
    ///
    /// # Panics
    /// Panics if the new width or height is 0.
    pub fn resize(&mut self, new_width: u16, new_height: u16) {
        assert!(new_width > 0 && new_height > 0, "Surface dimensions must be non-zero");
        if new_width == self.rect.width && new_height == self.rect.height {
            return;
        }

        let new_size = (new_width as usize) * (new_height as usize);
        let mut new_cells = vec![Cell::blank(self.background); new_size];

        let copy_width = self.rect.width.min(new_width) as usize;
        let copy_height = self.rect.height.min(new_height) as usize;

        for y in 0..copy_height {
            let old_start = y * (self.rect.width as usize);
            let new_start = y * (new_width as usize);
            new_cells[new_start..new_start + copy_width]
                .copy_from_slice(&self.cells[old_start..old_start + copy_width]);
        }

        self.cells = new_cells;
        self.rect.width = new_width;
        self.rect.height = new_height;
        self.touched = vec![true; new_height as usize];
        self.cursor_x = self.cursor_x.min(new_width - 1);
        self.cursor_y = self.cursor_y.min(new_height - 1);
    }

    /// Move the origin.
    pub const fn move_to(&mut self, x: u16, y: u16) {
        self.rect.x = x;
        self.rect.y = y;
    }

    /// Mark every row as changed.
    pub fn touch(&mut self) {
        self.touched.fill(true);
    }

    /// Mark every row as unchanged.
    pub fn untouch(&mut self) {
        self.touched.fill(false);
    }

    /// Mark `count` rows starting at `start` as changed.
    pub fn touch_lines(&mut self, start: u16, count: u16) {
        let end = start.saturating_add(count).min(self.rect.height);
        for y in start..end {
            self.touched[y as usize] = true;
        }
    }

    /// Check whether row `y` changed since the last untouch.
    pub fn is_row_touched(&self, y: u16) -> bool {
        self.touched.get(y as usize).copied().unwrap_or(false)
    }

    /// Check whether any row changed.
    pub fn is_touched(&self) -> bool {
        self.touched.iter().any(|&t| t)
    }

    /// Per-row touch flags.
    pub fn touched_rows(&self) -> &[bool] {
        &self.touched
    }

    /// Check whether a full repaint was requested by [`Surface::clear`].
    #[inline]
    pub const fn repaint_requested(&self) -> bool {
        self.repaint
    }

    /// Forget a pending repaint request.
    #[inline]
    pub const fn acknowledge_repaint(&mut self) {
        self.repaint = false;
    }

    /// Copy `region` of `src` (in `src` coordinates) onto this surface at
    /// (`dst_x`, `dst_y`), clipping at both edges.
    ///
    /// With `clear_first` the whole destination is erased beforehand. A
    /// pending repaint request on `src` carries over to this surface.
    pub fn blit(&mut self, src: &Self, region: Rect, dst_x: u16, dst_y: u16, clear_first: bool) {
        if clear_first {
            self.cells.fill(Cell::blank(self.background));
            self.touched.fill(true);
        }

        let src_right = region.right().min(src.width());
        let src_bottom = region.bottom().min(src.height());

        for (row, sy) in (region.y..src_bottom).enumerate() {
            let Ok(row) = u16::try_from(row) else { break };
            let dy = dst_y.saturating_add(row);
            if dy >= self.rect.height {
                break;
            }
            for (col, sx) in (region.x..src_right).enumerate() {
                let Ok(col) = u16::try_from(col) else { break };
                let dx = dst_x.saturating_add(col);
                if dx >= self.rect.width {
                    break;
                }
                if let (Some(si), Some(di)) = (src.index_of(sx, sy), self.index_of(dx, dy)) {
                    self.cells[di] = src.cells[si];
                }
            }
            self.touched[dy as usize] = true;
        }

        if src.repaint {
            self.repaint = true;
        }
    }

    /// Paint all of `src` onto this surface at `src`'s origin.
    pub fn compose(&mut self, src: &Self) {
        let local = Rect::from_size(src.width(), src.height());
        self.blit(src, local, src.rect.x, src.rect.y, false);
    }

    /// Copy content from a surface of the same size.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.rect.width, other.rect.width);
        debug_assert_eq!(self.rect.height, other.rect.height);
        self.cells.copy_from_slice(&other.cells);
        self.touched.fill(true);
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("rect", &self.rect)
            .field("cursor", &(self.cursor_x, self.cursor_y))
            .field("style", &self.style)
            .field("repaint", &self.repaint)
            .finish_non_exhaustive()
    }
}
