//! Compositor behavior through the public API, on a headless terminal.

use cellwm::{
    Compositor, Display, Error, HeadlessDriver, Message, MessageKind, Rect, Window, WindowSpec,
};
use std::sync::Arc;

fn compositor(width: u16, height: u16) -> (Compositor, HeadlessDriver) {
    let driver = HeadlessDriver::new(width, height);
    let display = Display::new(Box::new(driver.clone())).unwrap();
    (Compositor::new(Arc::new(display)), driver)
}

fn register(wm: &Compositor, name: &str, spec: WindowSpec) -> Arc<Window> {
    wm.register(Window::new(name, spec).unwrap()).unwrap()
}

#[test]
fn test_make_front_from_every_position() {
    let names = ["a", "b", "c", "d", "e"];
    for target in 0..names.len() {
        let (wm, _) = compositor(40, 10);
        for name in names {
            register(&wm, name, WindowSpec::new(Rect::new(0, 0, 4, 2)));
        }
        assert!(wm.make_front(names[target]));

        let order: Vec<String> = wm.z_order().iter().map(ToString::to_string).collect();
        let mut expected: Vec<String> = vec![names[target].to_owned()];
        expected.extend(
            names
                .iter()
                .filter(|n| **n != names[target])
                .map(|n| (*n).to_owned()),
        );
        assert_eq!(order, expected);
    }
}

#[test]
fn test_broadcast_reaches_every_window_once() {
    let (wm, _) = compositor(40, 10);
    let windows: Vec<_> = ["one", "two", "three"]
        .iter()
        .map(|name| register(&wm, name, WindowSpec::new(Rect::new(0, 0, 4, 2))))
        .collect();
    windows[1].push_message(Message::update());

    let before: Vec<usize> = windows.iter().map(|w| w.message_count()).collect();
    wm.broadcast(&Message::with_param(MessageKind::Present, 9));
    for (window, count) in windows.iter().zip(before) {
        assert_eq!(window.message_count(), count + 1);
    }

    for window in &windows {
        let mut last = window.get_message();
        while window.has_messages() {
            last = window.get_message();
        }
        assert_eq!((last.kind(), last.param()), (MessageKind::Present, 9));
    }
}

#[test]
fn test_duplicate_and_missing_names() {
    let (wm, _) = compositor(40, 10);
    register(&wm, "main", WindowSpec::new(Rect::new(0, 0, 4, 2)));
    let duplicate = Window::new("main", WindowSpec::new(Rect::new(0, 0, 8, 8))).unwrap();
    assert!(matches!(wm.register(duplicate), Err(Error::DuplicateName(_))));
    assert!(matches!(
        wm.send_message("ghost", Message::update()),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(wm.unregister("ghost"), Err(Error::NotFound(_))));
    assert_eq!(wm.len(), 1);
}

#[test]
fn test_skip_credits_hold_back_a_window() {
    let (wm, driver) = compositor(12, 3);
    let window = register(
        &wm,
        "late",
        WindowSpec::new(Rect::new(0, 0, 4, 1)).unbuffered().with_skip_credits(2),
    );
    window.print("late").unwrap();

    let mut shown = Vec::new();
    for _ in 0..3 {
        wm.present_windows(true, false, false);
        wm.flip().unwrap();
        shown.push(driver.row_text(0).starts_with("late"));
    }
    assert_eq!(shown, vec![false, false, true]);
    assert_eq!(window.stats().presents, 1);
}

#[test]
fn test_external_credit_window_presents_on_request() {
    let (wm, driver) = compositor(12, 3);
    let window = register(
        &wm,
        "main",
        WindowSpec::new(Rect::new(0, 1, 4, 1))
            .unbuffered()
            .with_external_credit(true),
    );
    window.print("main").unwrap();

    wm.present_windows(true, false, false);
    wm.flip().unwrap();
    assert_eq!(driver.row_text(1), " ".repeat(12));

    window.request_present().unwrap();
    wm.present_windows(true, false, false);
    wm.flip().unwrap();
    assert!(driver.row_text(1).starts_with("main"));
    assert_eq!(window.stats().external_credits, 0);
}

#[test]
fn test_deferred_clears_one_per_flip() {
    let (wm, driver) = compositor(8, 2);
    for _ in 0..3 {
        wm.clear_buffer();
    }
    let full_before = driver.full_presents();
    for expected in [2, 1, 0, 0] {
        wm.flip().unwrap();
        assert_eq!(wm.pending_clears(), expected);
    }
    // Each applied clear forces the following flip to repaint in full.
    assert!(driver.full_presents() >= full_before + 3);
}

#[test]
fn test_buffered_window_shows_only_after_flip() {
    let (wm, driver) = compositor(16, 4);
    let window = register(
        &wm,
        "info",
        WindowSpec::new(Rect::new(0, 0, 16, 3)).with_title("Info"),
    );
    window.erase().unwrap();
    window.draw_title().unwrap();
    window.print_fmt_at(0, 1, "fps %f", &[60.0.into()]).unwrap();

    wm.present_windows(true, false, false);
    wm.flip().unwrap();
    assert_eq!(driver.row_text(1).trim_end(), "");

    window.flip(false).unwrap();
    wm.present_windows(true, false, false);
    wm.flip().unwrap();
    assert_eq!(driver.row_text(0), "      Info      ");
    assert_eq!(driver.row_text(1).trim_end(), "fps 60.000000");
}
