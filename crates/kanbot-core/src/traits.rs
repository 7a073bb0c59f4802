//! Trait seams between the monitor and the outside world.
//!
//! Policies and sweeps only ever see these traits; the HTTP adapter and the
//! chat surface plug in behind them, and tests substitute in-memory fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Board, List, Notification, NotificationQuery};

/// Read/write access to the external board service.
///
/// Every call may fail with a transport or authorization error; failures come
/// back as tagged `Err` values, never as panics across the seam.
#[async_trait]
pub trait BoardService: Send + Sync {
    /// Monitored boards of the configured organization, open lists populated.
    async fn boards(&self) -> Result<Vec<Board>>;

    /// Lists of one board with their open cards populated.
    async fn board_lists(&self, board_id: &str) -> Result<Vec<List>>;

    /// Close a card.
    async fn archive_card(&self, card_id: &str) -> Result<()>;

    /// Leave a comment on a card.
    async fn comment_on_card(&self, card_id: &str, text: &str) -> Result<()>;

    /// Member notification feed, newest first.
    async fn recent_notifications(&self, query: &NotificationQuery) -> Result<Vec<Notification>>;
}

/// Outbound broadcast primitive: send a line of text to a named room.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn message_room(&self, room: &str, text: &str) -> Result<()>;
}
