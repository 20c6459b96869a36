//! Diffing Engine: Generate minimal ANSI sequences from surface changes.
//!
//! The physical refresh compares the last flushed frame with the staged one:
//! 1. Only rows marked touched on the staged frame are visited
//! 2. Changed cells emit a cursor move unless they follow the previous write
//! 3. Color pair and modifier state is tracked to avoid redundant SGR sequences
//!
//! All output is accumulated in a single [`OutputBuffer`] and flushed with one
//! syscall. Coordinates are shifted by the frame's origin.

use super::{Cell, Modifiers, Style, Surface};
use crate::terminal::{OutputBuffer, Palette};

/// State tracker for the diffing algorithm.
///
/// This tracks the "current" terminal state (cursor position, color pair,
/// modifiers) to minimize the number of escape sequences we need to emit.
#[derive(Debug, Clone)]
pub struct DiffState {
    cursor_x: u16,
    cursor_y: u16,
    /// Last emitted color pair.
    pair: Option<u8>,
    /// Last emitted modifiers.
    modifiers: Option<Modifiers>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// Create a new diff state with unknown terminal state.
    pub const fn new() -> Self {
        Self {
            cursor_x: u16::MAX,
            cursor_y: u16::MAX,
            pair: None,
            modifiers: None,
        }
    }

    /// Reset the state (e.g., after a full screen clear or palette change).
    pub const fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Statistics of a diff operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Number of cells that were different.
    pub cells_changed: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of color change sequences emitted.
    pub color_changes: usize,
    /// Number of modifier change sequences emitted.
    pub modifier_changes: usize,
}

/// Render the difference between two frames of equal size.
///
/// Rows not touched on `next` are skipped even if their cells differ.
pub fn render_diff(
    current: &Surface,
    next: &Surface,
    palette: &Palette,
    output: &mut OutputBuffer,
    state: &mut DiffState,
) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let origin = next.rect();

    for y in 0..next.height() {
        if !next.is_row_touched(y) {
            continue;
        }
        for x in 0..next.width() {
            let (Some(current_cell), Some(next_cell)) = (current.get(x, y), next.get(x, y)) else {
                continue;
            };

            if current_cell == next_cell || next_cell.is_wide_continuation() {
                continue;
            }

            result.cells_changed += 1;

            let (sx, sy) = (origin.x.saturating_add(x), origin.y.saturating_add(y));
            if state.cursor_y != sy || state.cursor_x != sx {
                output.cursor_move(sx, sy);
                state.cursor_x = sx;
                state.cursor_y = sy;
                result.cursor_moves += 1;
            }

            apply_style(next_cell.style(), palette, output, state, &mut result);
            emit_cell(output, next_cell);

            state.cursor_x = state
                .cursor_x
                .saturating_add(u16::from(next_cell.display_width().max(1)));
        }
    }

    result
}

/// Bring the terminal's attributes in line with `style`.
fn apply_style(
    style: Style,
    palette: &Palette,
    output: &mut OutputBuffer,
    state: &mut DiffState,
    result: &mut DiffResult,
) {
    // Removing a modifier needs a full reset, which also drops colors.
    let current_mods = state.modifiers.unwrap_or(Modifiers::empty());
    if !current_mods.difference(style.modifiers).is_empty() {
        output.reset_attrs();
        state.pair = None;
        state.modifiers = None;
    }

    if state.pair != Some(style.pair) {
        emit_pair(output, palette, style.pair);
        state.pair = Some(style.pair);
        result.color_changes += 1;
    }

    if state.modifiers != Some(style.modifiers) {
        let added = style
            .modifiers
            .difference(state.modifiers.unwrap_or(Modifiers::empty()));
        output.set_modifiers(added);
        state.modifiers = Some(style.modifiers);
        result.modifier_changes += 1;
    }
}

fn emit_pair(output: &mut OutputBuffer, palette: &Palette, pair: u8) {
    match palette.resolve(pair) {
        Some(colors) => {
            output.set_fg(colors.fg);
            output.set_bg(colors.bg);
        }
        None => output.default_colors(),
    }
}

#[inline]
fn emit_cell(output: &mut OutputBuffer, cell: &Cell) {
    output.write_char(cell.ch());
}

/// Generate a full redraw sequence (no diffing).
///
/// This is used for the first frame, after a resize, and whenever a repaint
/// was requested.
pub fn render_full(frame: &Surface, palette: &Palette, output: &mut OutputBuffer, state: &mut DiffState) {
    let origin = frame.rect();

    output.reset_attrs();
    if origin.x == 0 && origin.y == 0 {
        output.clear_screen();
    }
    state.reset();

    for (y, row) in frame.rows().enumerate() {
        let Ok(y) = u16::try_from(y) else { break };
        output.cursor_move(origin.x, origin.y.saturating_add(y));

        for cell in row {
            if cell.is_wide_continuation() {
                continue;
            }
            let mut scratch = DiffResult::default();
            apply_style(cell.style(), palette, output, state, &mut scratch);
            emit_cell(output, cell);
        }
    }

    output.reset_attrs();
    state.reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Rgb;
    use crate::layout::Rect;

    fn frame(width: u16, height: u16) -> Surface {
        Surface::new(Rect::from_size(width, height))
    }

    fn diff(a: &Surface, b: &Surface, palette: &Palette) -> (DiffResult, String) {
        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        let result = render_diff(a, b, palette, &mut output, &mut state);
        (result, String::from_utf8_lossy(output.as_bytes()).into_owned())
    }

    #[test]
    fn test_diff_identical_frames() {
        let a = frame(10, 5);
        let b = frame(10, 5);
        let (result, output) = diff(&a, &b, &Palette::new());
        assert_eq!(result.cells_changed, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_diff_single_cell_change() {
        let a = frame(10, 5);
        let mut b = frame(10, 5);
        b.set(5, 2, Cell::new('X'));

        let (result, output) = diff(&a, &b, &Palette::new());
        assert_eq!(result.cells_changed, 1);
        assert!(output.contains("\x1b[3;6H"));
        assert!(output.contains('X'));
    }

    #[test]
    fn test_diff_adjacent_cells_single_cursor_move() {
        let a = frame(10, 5);
        let mut b = frame(10, 5);
        b.print_at(2, 1, "ABC");

        let (result, _) = diff(&a, &b, &Palette::new());
        assert_eq!(result.cells_changed, 3);
        assert_eq!(result.cursor_moves, 1);
    }

    #[test]
    fn test_diff_pair_tracking() {
        let a = frame(10, 5);
        let mut b = frame(10, 5);
        b.attr_set(Style::pair(1));
        b.print("AB");

        let mut palette = Palette::new();
        palette.init_pair(1, Rgb::RED, Rgb::BLACK);
        let (result, output) = diff(&a, &b, &palette);

        assert_eq!(result.color_changes, 1);
        assert!(output.contains("\x1b[38;2;205;0;0m"));
    }

    #[test]
    fn test_diff_skips_untouched_rows() {
        let a = frame(20, 10);
        let mut b = frame(20, 10);
        b.set(0, 0, Cell::new('X'));
        b.set(10, 5, Cell::new('Y'));
        b.untouch();
        b.touch_lines(5, 1);

        let (result, _) = diff(&a, &b, &Palette::new());
        assert_eq!(result.cells_changed, 1);
    }

    #[test]
    fn test_diff_removed_modifier_resets() {
        let mut a = frame(4, 1);
        a.attr_on(Style::modifiers(Modifiers::BOLD));
        a.print("ab");
        let mut b = frame(4, 1);
        b.attr_on(Style::modifiers(Modifiers::BOLD));
        b.print("a");
        b.attr_off(Style::modifiers(Modifiers::BOLD));
        b.print("c");

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        state.modifiers = Some(Modifiers::BOLD);
        render_diff(&a, &b, &Palette::new(), &mut output, &mut state);
        assert!(String::from_utf8_lossy(output.as_bytes()).starts_with("\x1b[1;2H\x1b[0m"));
    }

    #[test]
    fn test_diff_offsets_by_origin() {
        let a = Surface::new(Rect::new(3, 2, 4, 2));
        let mut b = Surface::new(Rect::new(3, 2, 4, 2));
        b.set(0, 0, Cell::new('Z'));

        let (_, output) = diff(&a, &b, &Palette::new());
        assert!(output.starts_with("\x1b[3;4H"));
    }

    #[test]
    fn test_render_full() {
        let mut f = frame(3, 2);
        f.print("ABC");

        let mut output = OutputBuffer::new();
        render_full(&f, &Palette::new(), &mut output, &mut DiffState::new());

        let output = String::from_utf8_lossy(output.as_bytes());
        assert!(output.starts_with("\x1b[0m\x1b[2J\x1b[H"));
        assert!(output.contains("ABC"));
        assert!(output.ends_with("\x1b[0m"));
    }
}
