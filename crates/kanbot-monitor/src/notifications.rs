//! Notification fetch + dedup — renders the member feed into chat lines and
//! remembers the newest id to bound the next fetch.

use std::sync::Mutex;

use kanbot_core::error::Result;
use kanbot_core::traits::BoardService;
use kanbot_core::types::{Notification, NotificationKind, NotificationQuery};

/// Tracks the newest notification id seen so far.
///
/// One logical tracker per monitor instance, reset to unknown on restart
/// (acceptable: recent-notification queries are best-effort). Locked because
/// concurrent manual invocations are possible, if not expected.
#[derive(Default)]
pub struct NotificationTracker {
    last_seen: Mutex<Option<String>>,
}

impl NotificationTracker {
    pub fn last_seen(&self) -> Option<String> {
        self.last_seen.lock().expect("tracker lock").clone()
    }

    pub fn record(&self, id: &str) {
        *self.last_seen.lock().expect("tracker lock") = Some(id.to_string());
    }
}

/// Render one notification to a chat line.
///
/// Unrecognized kinds and payloads missing required fields yield `None` and
/// are silently dropped — the feed is forward-compatible with event types the
/// bot does not know yet, and a card move without a destination list is not a
/// move.
pub fn render(notification: &Notification) -> Option<String> {
    let actor = &notification.actor.as_ref()?.username;
    let card = notification.data.card.as_ref()?;
    match notification.kind {
        NotificationKind::CardMoved => {
            let before = notification.data.list_before.as_ref()?;
            let after = notification.data.list_after.as_ref()?;
            Some(format!(
                "{} moved card `{}` from `{}` to `{}` - {}",
                actor, card.name, before.name, after.name, card.short_url
            ))
        }
        NotificationKind::CommentAdded => {
            let text = notification.data.text.as_deref()?;
            Some(format!(
                "{} commented on card `{}`: {} - {}",
                actor, card.name, text, card.short_url
            ))
        }
        NotificationKind::CardCreated => Some(format!(
            "{} created card `{}` - {}",
            actor, card.name, card.short_url
        )),
        NotificationKind::Unknown => None,
    }
}

/// Fetch unread notifications since the last seen id and render them.
///
/// After a successful fetch the tracker is advanced to the id of the first
/// (newest) raw entry, regardless of how many entries the rendering filtered
/// out.
pub async fn fetch_recent(
    service: &dyn BoardService,
    tracker: &NotificationTracker,
) -> Result<Vec<String>> {
    let query = NotificationQuery::recent(tracker.last_seen());
    let raw = service.recent_notifications(&query).await?;
    if let Some(newest) = raw.first() {
        tracker.record(&newest.id);
    }
    Ok(raw.iter().filter_map(render).collect())
}
