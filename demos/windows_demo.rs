//! Windows demo: Three windows sharing one terminal.
//!
//! - **Main Window** only shows up when it asks for a present. Press Enter
//!   to unlock it, WASD to move it, F to toggle float/int readouts, Q to quit.
//! - **Info Window** redraws its frame rates every frame.
//! - **Debug Console** shows frame rates and the newest log lines.
//!
//! Run with: `cargo run --example windows_demo`

use cellwm::logging::{self, LogConfig, LogTail};
use cellwm::{
    Control, Engine, EngineConfig, Message, MessageKind, Modifiers, Rect, Rgb, Style,
    WindowContext, WindowHandler, WindowSpec,
};

const MAIN_PAIR: u8 = 1;
const TITLE_PAIR: u8 = 2;
const INFO_PAIR: u8 = 3;
const CONSOLE_PAIR: u8 = 4;

struct MainWindow {
    locked: bool,
    integers: bool,
}

impl MainWindow {
    fn draw(&self, cx: &WindowContext<'_>) -> cellwm::Result<()> {
        let window = cx.window();
        window.erase()?;
        window.draw_title()?;

        if self.locked {
            window.print_at(1, 1, "Press 'Enter' to refresh me!")?;
        } else {
            let stats = window.stats();
            let rates = [
                (3, "Screen FPS", cx.compositor().screen_fps()),
                (4, "Window FPS", stats.present_fps),
                (5, "Window Requesting FPS", stats.request_fps),
            ];
            window.print_at(0, 1, "Press 'Q' to exit!")?;
            for (row, label, fps) in rates {
                if self.integers {
                    #[allow(clippy::cast_possible_truncation)]
                    let whole = fps as i64;
                    window.print_fmt_at(1, row, "%s: %d", &[label.into(), whole.into()])?;
                } else {
                    window.print_fmt_at(1, row, "%s: %f", &[label.into(), fps.into()])?;
                }
            }
            window.print_at(1, 7, "<AWSD For Moving>")?;
            window.print_at(1, 8, "<F For Float Inverting>")?;
        }

        window.flip(false)?;
        window.request_present()
    }
}

impl WindowHandler for MainWindow {
    fn on_start(&mut self, cx: &mut WindowContext<'_>) -> cellwm::Result<Control> {
        self.draw(cx)?;
        Ok(Control::Continue)
    }

    fn on_message(&mut self, cx: &mut WindowContext<'_>, message: Message) -> cellwm::Result<Control> {
        match message.kind() {
            MessageKind::Key => {
                let Some(key) = message.key_code() else {
                    return Ok(Control::Continue);
                };
                if key.is_char('q') {
                    return Ok(Control::Quit);
                }

                let rect = cx.window().rect();
                let moved = match key {
                    k if k.is_char('a') => Some((rect.x.saturating_sub(1), rect.y)),
                    k if k.is_char('d') => Some((rect.x.saturating_add(1), rect.y)),
                    k if k.is_char('w') => Some((rect.x, rect.y.saturating_sub(1))),
                    k if k.is_char('s') => Some((rect.x, rect.y.saturating_add(1))),
                    _ => None,
                };
                if let Some((x, y)) = moved {
                    cx.window().move_to(x, y)?;
                    tracing::info!(x, y, "main window moved");
                    self.draw(cx)?;
                } else if key.is_char('f') {
                    self.integers = !self.integers;
                    self.draw(cx)?;
                } else if key == cellwm::KeyCode::Enter {
                    self.locked = false;
                    self.draw(cx)?;
                }
            }
            MessageKind::Resize => self.draw(cx)?,
            MessageKind::Update | MessageKind::Present => {}
        }
        Ok(Control::Continue)
    }
}

struct InfoWindow;

impl WindowHandler for InfoWindow {
    fn on_message(&mut self, cx: &mut WindowContext<'_>, message: Message) -> cellwm::Result<Control> {
        if message.kind() != MessageKind::Present {
            return Ok(Control::Continue);
        }

        let window = cx.window();
        let stats = window.stats();
        window.erase()?;
        window.draw_title()?;
        window.print_fmt_at(1, 2, "Screen FPS: %f", &[cx.compositor().screen_fps().into()])?;
        window.print_fmt_at(1, 3, "Window FPS: %f", &[stats.present_fps.into()])?;
        window.print_fmt_at(1, 4, "Window Requesting FPS: %f", &[stats.request_fps.into()])?;
        window.flip(false)?;
        window.request_present()?;
        Ok(Control::Continue)
    }
}

struct DebugConsole {
    tail: Option<LogTail>,
}

impl WindowHandler for DebugConsole {
    fn on_message(&mut self, cx: &mut WindowContext<'_>, message: Message) -> cellwm::Result<Control> {
        if message.kind() != MessageKind::Present {
            return Ok(Control::Continue);
        }

        let window = cx.window();
        let stats = window.stats();
        window.erase()?;
        window.draw_title()?;
        window.move_cursor(0, 1)?;
        window.print_fmt("Screen FPS:\n%f\n", &[cx.compositor().screen_fps().into()])?;
        window.print_fmt("Window FPS:\n%f\n", &[stats.present_fps.into()])?;
        window.print_fmt("Window Requesting FPS:\n%f\n", &[stats.request_fps.into()])?;

        if let Some(tail) = &self.tail {
            let rect = window.rect();
            window.hline('\0', rect.width)?;
            let lines = tail.lines();
            let room = usize::from(rect.height.saturating_sub(8));
            for (row, line) in (8..).zip(lines.iter().rev().take(room).rev()) {
                let clipped: String = line.chars().take(usize::from(rect.width)).collect();
                window.print_at(0, row, clipped)?;
            }
        }

        window.flip(false)?;
        window.request_present()?;
        Ok(Control::Continue)
    }
}

fn run(tail: Option<LogTail>) -> cellwm::Result<()> {
    let mut engine = Engine::with_config(EngineConfig::default())?;
    if !engine.display().has_colors() {
        tracing::warn!("screen does not support colors");
    }
    engine.init_pair(MAIN_PAIR, Rgb::WHITE, Rgb::BLUE);
    engine.init_pair(TITLE_PAIR, Rgb::BLACK, Rgb::WHITE);
    engine.init_pair(INFO_PAIR, Rgb::RED, Rgb::YELLOW);
    engine.init_pair(CONSOLE_PAIR, Rgb::GREEN, Rgb::RED);

    let title = Style::new(Modifiers::BOLD | Modifiers::UNDERLINE, TITLE_PAIR);

    engine.open_window(
        "main",
        WindowSpec::new(Rect::new(0, 1, 32, 12))
            .with_title("Main Window")
            .with_title_style(title)
            .with_background(Style::pair(MAIN_PAIR))
            .with_external_credit(true)
            .with_no_update_delay(true),
        MainWindow {
            locked: true,
            integers: false,
        },
    )?;
    engine.open_window(
        "info",
        WindowSpec::new(Rect::new(1, 20, 42, 14))
            .with_title("Info Window")
            .with_title_style(title)
            .with_background(Style::pair(INFO_PAIR))
            .with_no_update_delay(true),
        InfoWindow,
    )?;
    engine.open_window(
        "console",
        WindowSpec::new(Rect::new(33, 3, 20, 14))
            .with_title("Debug Console Window")
            .with_title_style(title)
            .with_background(Style::pair(CONSOLE_PAIR)),
        DebugConsole { tail },
    )?;

    engine.run()
}

fn main() {
    let tail = match logging::init(&LogConfig::default().with_ring_capacity(10)) {
        Ok(tail) => tail,
        Err(e) => {
            eprintln!("cellwm: cannot set up logging: {e}");
            None
        }
    };

    if let Err(e) = run(tail) {
        eprintln!("cellwm: {e}");
        std::process::exit(1);
    }
}
