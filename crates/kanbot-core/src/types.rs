//! Board domain types — per-sweep snapshots of the external service state,
//! plus the notification feed model.
//!
//! These double as the wire shapes: field names follow the Trello JSON with
//! serde renames, so the adapter deserializes straight into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A project space in the external service. Read-only snapshot for one sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lists: Vec<List>,
}

/// A column of cards within a board. The name may carry a capacity suffix,
/// e.g. "Doing (5)".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// A unit of work within a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(rename = "dateLastActivity")]
    pub date_last_activity: DateTime<Utc>,
    #[serde(default)]
    pub closed: bool,
    #[serde(rename = "shortUrl", default)]
    pub short_url: String,
}

/// One entry of the member notification feed, newest first on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "memberCreator")]
    pub actor: Option<Member>,
    #[serde(default)]
    pub data: NotificationData,
}

/// Closed set of notification kinds the bot understands. Anything the service
/// grows later lands in `Unknown` and is dropped, not errored on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NotificationKind {
    #[serde(rename = "changeCard")]
    CardMoved,
    #[serde(rename = "commentCard")]
    CommentAdded,
    #[serde(rename = "createdCard")]
    CardCreated,
    #[serde(other)]
    Unknown,
}

impl NotificationKind {
    /// Wire names of the recognized kinds, for the feed query filter.
    pub fn known_filters() -> &'static [&'static str] {
        &["changeCard", "commentCard", "createdCard"]
    }
}

/// Payload fields vary by kind; everything is optional and tolerated missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationData {
    pub card: Option<CardRef>,
    #[serde(rename = "listBefore")]
    pub list_before: Option<ListRef>,
    #[serde(rename = "listAfter")]
    pub list_after: Option<ListRef>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CardRef {
    pub name: String,
    #[serde(rename = "shortUrl", default)]
    pub short_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub username: String,
}

/// Query for the notification feed.
#[derive(Debug, Clone, Default)]
pub struct NotificationQuery {
    /// Comma-joined kind filter; defaults to the recognized set.
    pub filter: Vec<String>,
    /// "unread" to only fetch unseen entries.
    pub read_filter: Option<String>,
    /// Maximum number of entries.
    pub limit: u32,
    /// Lower bound: only entries newer than this notification id.
    pub since: Option<String>,
}

impl NotificationQuery {
    /// The query manual `recent` commands use: the recognized kinds, unread,
    /// bounded by the last seen id when one is known.
    pub fn recent(since: Option<String>) -> Self {
        Self {
            filter: NotificationKind::known_filters()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            read_filter: Some("unread".into()),
            limit: 10,
            since,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_wire_shape() {
        let json = r#"{
            "id": "c1",
            "name": "Task A",
            "dateLastActivity": "2026-08-10T09:00:00.000Z",
            "closed": false,
            "shortUrl": "https://trello.com/c/abc"
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();
        assert_eq!(card.name, "Task A");
        assert!(!card.closed);
        assert_eq!(card.short_url, "https://trello.com/c/abc");
    }

    #[test]
    fn test_unknown_notification_kind() {
        let json = r#"{"id": "n1", "type": "addAttachmentToCard", "memberCreator": null}"#;
        let notif: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notif.kind, NotificationKind::Unknown);
    }

    #[test]
    fn test_move_notification_payload() {
        let json = r#"{
            "id": "n2",
            "type": "changeCard",
            "memberCreator": {"username": "ada"},
            "data": {
                "card": {"name": "Task B", "shortUrl": "https://trello.com/c/def"},
                "listBefore": {"name": "Doing"},
                "listAfter": {"name": "Terminé"}
            }
        }"#;
        let notif: Notification = serde_json::from_str(json).unwrap();
        assert_eq!(notif.kind, NotificationKind::CardMoved);
        assert_eq!(notif.actor.unwrap().username, "ada");
        assert_eq!(notif.data.list_after.unwrap().name, "Terminé");
    }
}
