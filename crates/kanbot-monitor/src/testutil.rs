//! In-memory fakes for the service and sink seams, shared by the monitor
//! tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};

use kanbot_core::error::{KanbotError, Result};
use kanbot_core::traits::{BoardService, MessageSink};
use kanbot_core::types::{Board, Card, List, Notification, NotificationQuery};

pub fn board(id: &str, name: &str) -> Board {
    Board {
        id: id.into(),
        name: name.into(),
        lists: vec![],
    }
}

pub fn list(id: &str, name: &str, cards: Vec<Card>) -> List {
    List {
        id: id.into(),
        name: name.into(),
        cards,
    }
}

/// An open card last active just now.
pub fn card(id: &str) -> Card {
    aged_card(id, &format!("card {id}"), 0)
}

/// An open card named `name`, last active `days_ago` days in the past.
pub fn aged_card(id: &str, name: &str, days_ago: i64) -> Card {
    Card {
        id: id.into(),
        name: name.into(),
        date_last_activity: Utc::now() - Duration::days(days_ago),
        closed: false,
        short_url: format!("https://trello.com/c/{id}"),
    }
}

/// Fake board service: fixed data, per-id failure switches, recorded
/// mutations.
#[derive(Default)]
pub struct FakeService {
    pub boards: Vec<Board>,
    pub lists: HashMap<String, Vec<List>>,
    pub notifications: Vec<Notification>,
    pub fail_boards: bool,
    pub fail_lists_for: HashSet<String>,
    pub fail_archive_for: HashSet<String>,
    pub fail_comment_for: HashSet<String>,
    pub archived: Mutex<Vec<String>>,
    pub comments: Mutex<Vec<(String, String)>>,
}

impl FakeService {
    pub fn with_board(board: Board, lists: Vec<List>) -> Self {
        let mut service = Self::default();
        service.lists.insert(board.id.clone(), lists);
        service.boards.push(board);
        service
    }

    pub fn archived_ids(&self) -> Vec<String> {
        self.archived.lock().unwrap().clone()
    }

    pub fn comment_count(&self) -> usize {
        self.comments.lock().unwrap().len()
    }
}

#[async_trait]
impl BoardService for FakeService {
    async fn boards(&self) -> Result<Vec<Board>> {
        if self.fail_boards {
            return Err(KanbotError::Service("boards unreachable".into()));
        }
        Ok(self.boards.clone())
    }

    async fn board_lists(&self, board_id: &str) -> Result<Vec<List>> {
        if self.fail_lists_for.contains(board_id) {
            return Err(KanbotError::Service(format!("board {board_id} unreachable")));
        }
        Ok(self.lists.get(board_id).cloned().unwrap_or_default())
    }

    async fn archive_card(&self, card_id: &str) -> Result<()> {
        if self.fail_archive_for.contains(card_id) {
            return Err(KanbotError::Service(format!("archive {card_id} refused")));
        }
        self.archived.lock().unwrap().push(card_id.to_string());
        Ok(())
    }

    async fn comment_on_card(&self, card_id: &str, text: &str) -> Result<()> {
        if self.fail_comment_for.contains(card_id) {
            return Err(KanbotError::Service(format!("comment {card_id} refused")));
        }
        self.comments
            .lock()
            .unwrap()
            .push((card_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn recent_notifications(&self, _query: &NotificationQuery) -> Result<Vec<Notification>> {
        Ok(self.notifications.clone())
    }
}

/// Sink that records every broadcast line.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn message_room(&self, room: &str, text: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((room.to_string(), text.to_string()));
        Ok(())
    }
}
