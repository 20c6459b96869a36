//! Logging: `tracing` subscriber setup for a program that owns the terminal.
//!
//! While the engine runs, stdout belongs to the compositor, so events go to
//! an optional log file and an optional in-memory [`LogTail`] that a window
//! can render as a debug console.

use crate::sync::RingLog;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::writer::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "CELLWM_LOG";

/// Filter used when neither the config nor the environment sets one.
pub const DEFAULT_FILTER: &str = "info";

/// Where log events go.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// Filter directives; falls back to `CELLWM_LOG`, then `info`.
    pub filter: Option<String>,
    /// Append formatted events to this file.
    pub file: Option<PathBuf>,
    /// Keep the newest this many lines in a [`LogTail`] (0 disables it).
    pub ring_capacity: usize,
}

impl LogConfig {
    /// Set the filter directives.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Log to a file.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Keep a tail of the newest `capacity` lines.
    #[must_use]
    pub const fn with_ring_capacity(mut self, capacity: usize) -> Self {
        self.ring_capacity = capacity;
        self
    }

    fn env_filter(&self) -> EnvFilter {
        match &self.filter {
            Some(directives) => EnvFilter::new(directives),
            None => EnvFilter::try_from_env(LOG_ENV)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        }
    }
}

/// The newest formatted log lines, shared between the subscriber and readers.
#[derive(Debug, Clone)]
pub struct LogTail {
    lines: Arc<Mutex<RingLog<String>>>,
}

impl LogTail {
    /// A tail keeping `capacity` lines.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(RingLog::new(capacity))),
        }
    }

    /// Copy of the retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().to_vec()
    }

    /// Newest line.
    pub fn last(&self) -> Option<String> {
        self.lines.lock().last().cloned()
    }

    /// Append a line directly.
    pub fn push(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }
}

impl<'a> MakeWriter<'a> for LogTail {
    type Writer = TailWriter;

    fn make_writer(&'a self) -> Self::Writer {
        TailWriter {
            lines: Arc::clone(&self.lines),
            partial: Vec::new(),
        }
    }
}

/// Writer splitting formatted events into [`LogTail`] lines.
pub struct TailWriter {
    lines: Arc<Mutex<RingLog<String>>>,
    partial: Vec<u8>,
}

impl Write for TailWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.partial.extend_from_slice(buf);
        while let Some(end) = self.partial.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=end).collect();
            let text = String::from_utf8_lossy(&line[..end]).trim_end().to_owned();
            if !text.is_empty() {
                self.lines.lock().push(text);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.partial.is_empty() {
            let text = String::from_utf8_lossy(&self.partial).trim_end().to_owned();
            self.partial.clear();
            if !text.is_empty() {
                self.lines.lock().push(text);
            }
        }
        Ok(())
    }
}

impl Drop for TailWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// Install the global subscriber.
///
/// Returns the tail when `ring_capacity` is non-zero. If another subscriber
/// is already installed it stays in place and the tail receives nothing.
pub fn init(config: &LogConfig) -> crate::Result<Option<LogTail>> {
    let file_layer = match &config.file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_thread_names(true)
                    .with_writer(std::sync::Mutex::new(file)),
            )
        }
        None => None,
    };

    let tail = (config.ring_capacity > 0).then(|| LogTail::new(config.ring_capacity));
    let tail_layer = tail.clone().map(|tail| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .without_time()
            .with_writer(tail)
    });

    let installed = tracing_subscriber::registry()
        .with(config.env_filter())
        .with(file_layer)
        .with(tail_layer)
        .try_init();
    if installed.is_err() {
        tracing::debug!("a global subscriber is already installed");
    }
    Ok(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tail_writer_splits_lines() {
        let tail = LogTail::new(3);
        {
            let mut writer = tail.make_writer();
            writer.write_all(b"first\nsec").unwrap();
            writer.write_all(b"ond\n").unwrap();
            writer.write_all(b"third").unwrap();
        }
        assert_eq!(tail.lines(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_tail_keeps_newest() {
        let tail = LogTail::new(2);
        for line in ["a", "b", "c"] {
            tail.push(line);
        }
        assert_eq!(tail.lines(), vec!["b", "c"]);
        assert_eq!(tail.last().as_deref(), Some("c"));
    }

    #[test]
    fn test_tail_captures_events() {
        let tail = LogTail::new(4);
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .without_time()
                .with_writer(tail.clone()),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("window opened");
        });
        assert!(tail.last().is_some_and(|line| line.contains("window opened")));
    }

    #[test]
    fn test_explicit_filter_wins() {
        let config = LogConfig::default().with_filter("debug");
        assert!(config.env_filter().to_string().contains("debug"));
    }
}
