//! Error types for cellwm.

use std::io;
use thiserror::Error;

/// Everything that can go wrong in cellwm.
#[derive(Debug, Error)]
pub enum Error {
    /// Terminal I/O failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// No window is registered under this name.
    #[error("no window named `{0}`")]
    NotFound(String),

    /// A window is already registered under this name.
    #[error("a window named `{0}` is already registered")]
    DuplicateName(String),

    /// The actor owning this window has stopped.
    #[error("the actor of window `{0}` is gone")]
    ActorGone(String),

    /// The window's own actor tried to wait for itself.
    #[error("window `{0}` cannot wait for its own actor")]
    OwnerThread(String),

    /// The caller holds the window lock its actor needs to make progress.
    #[error("window `{0}` is locked by the calling thread")]
    LockHeld(String),

    /// A zero-sized geometry was requested.
    #[error("invalid geometry {width}x{height}")]
    InvalidGeometry {
        /// Requested columns.
        width: u16,
        /// Requested rows.
        height: u16,
    },

    /// The terminal could not be set up.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),
}

/// Result alias used throughout cellwm.
pub type Result<T> = std::result::Result<T, Error>;
