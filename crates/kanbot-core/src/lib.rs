//! # Kanbot Core
//! Shared foundation: error type, configuration, board domain types, and the
//! trait seams (`BoardService`, `MessageSink`) the other crates plug into.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::KanbotConfig;
pub use error::{KanbotError, Result};
pub use traits::{BoardService, MessageSink};
