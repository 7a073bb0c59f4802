//! # Kanbot Monitor
//!
//! The board monitoring engine: two independent periodic sweeps over all
//! monitored boards.
//!
//! ```text
//! Monitor (two tokio interval loops)
//!   ├── overflow sweep: boards → lists+cards → capacity check → messages
//!   ├── archive sweep:  boards → lists+cards → stale cards → close+comment
//!   └── messages → MessageSink (notify room); failures → "ERROR: ..." broadcast
//! ```
//!
//! Every sweep works only on its own freshly fetched snapshot, so overlapping
//! ticks cannot corrupt anything. One board failing is reported and skipped;
//! its siblings still get evaluated in the same tick.

pub mod archive;
pub mod capacity;
pub mod notifications;
pub mod overflow;
pub mod sweep;

pub use archive::ArchivePolicy;
pub use capacity::parse_capacity;
pub use notifications::NotificationTracker;
pub use sweep::Monitor;

#[cfg(test)]
pub(crate) mod testutil;
