//! # Kanbot Channels
//! Outbound message sinks and the inbound chat command surface.

pub mod commands;
pub mod sink;

pub use commands::{Command, CommandHandler};
pub use sink::{ConsoleSink, WebhookSink};
