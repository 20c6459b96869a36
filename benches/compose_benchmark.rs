//! Compose benchmark: Measure one presentation frame.
//!
//! Covers the per-frame work of the compositor (painting windows back to
//! front and flipping) and the diff that turns a frame into ANSI output.

use cellwm::buffer::diff::{render_diff, DiffState};
use cellwm::terminal::{OutputBuffer, Palette};
use cellwm::{Compositor, Display, HeadlessDriver, Rect, Style, Surface, Window, WindowSpec};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

/// Create a compositor with `count` overlapping, filled windows.
fn create_compositor(width: u16, height: u16, count: u16) -> Compositor {
    let display = Display::new(Box::new(HeadlessDriver::new(width, height))).unwrap();
    let compositor = Compositor::new(Arc::new(display));
    for i in 0..count {
        let rect = Rect::new(i * 3, i * 2, width / 2, height / 2);
        let spec = WindowSpec::new(rect)
            .with_title(format!("Window {i}"))
            .with_background(Style::pair((i % 4 + 1) as u8));
        let window = compositor.register(Window::new(format!("w{i}"), spec).unwrap()).unwrap();
        window.erase().unwrap();
        window.draw_title().unwrap();
        for row in 1..rect.height {
            window.print_at(0, row, "x".repeat(rect.width as usize)).unwrap();
        }
        window.flip(false).unwrap();
    }
    compositor
}

fn create_frame(width: u16, height: u16, seed: u16) -> Surface {
    let mut surface = Surface::new(Rect::from_size(width, height));
    for y in 0..height {
        let row: String = (0..width)
            .map(|x| char::from(b'A' + ((x + y + seed) % 26) as u8))
            .collect();
        surface.print_at(0, y, &row);
    }
    surface
}

fn present_and_flip(c: &mut Criterion) {
    let compositor = create_compositor(200, 50, 4);

    c.bench_function("present_flip_200x50_4_windows", |b| {
        b.iter(|| {
            compositor.present_windows(true, false, false);
            compositor.flip().unwrap();
        })
    });
}

fn present_by_window_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("present_by_windows");

    for count in [1u16, 4, 8] {
        let compositor = create_compositor(120, 40, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &compositor, |b, wm| {
            b.iter(|| wm.present_windows(black_box(true), false, false));
        });
    }

    group.finish();
}

fn diff_full_change(c: &mut Criterion) {
    let current = create_frame(200, 50, 0);
    let next = create_frame(200, 50, 1);
    let palette = Palette::new();

    c.bench_function("diff_200x50_full_change", |b| {
        b.iter(|| {
            let mut output = OutputBuffer::with_capacity(65536);
            let mut state = DiffState::new();
            render_diff(
                black_box(&current),
                black_box(&next),
                &palette,
                &mut output,
                &mut state,
            )
        })
    });
}

criterion_group!(benches, present_and_flip, present_by_window_count, diff_full_change);
criterion_main!(benches);
