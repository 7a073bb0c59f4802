//! Kanbot error type — one tagged enum crossing every component boundary.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, KanbotError>;

/// All the ways Kanbot operations fail.
#[derive(Debug, Error)]
pub enum KanbotError {
    /// Configuration problem (bad file, unparsable value).
    #[error("config error: {0}")]
    Config(String),

    /// Transport or API failure talking to the board service.
    #[error("service error: {0}")]
    Service(String),

    /// A manual command was invoked with missing or invalid arguments.
    #[error("{0}")]
    Command(String),

    /// Mood store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Sink delivery failure.
    #[error("sink error: {0}")]
    Sink(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
