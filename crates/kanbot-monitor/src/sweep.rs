//! Sweep scheduler — two independent periodic loops that fan out across all
//! boards and forward policy messages to the notify room.
//!
//! Each tick is Idle → Fetching (boards, then per-board lists+cards) →
//! Evaluating (policy per board, flatten) → Idle. Per-board fetches run
//! concurrently; a failing board is reported and skipped while its siblings
//! finish the same tick. Ticks fire at a fixed cadence and may overlap a slow
//! sweep — harmless, since every sweep only touches its own snapshot.

use std::sync::Arc;

use futures::future::join_all;

use kanbot_core::config::KanbotConfig;
use kanbot_core::error::{KanbotError, Result};
use kanbot_core::traits::{BoardService, MessageSink};
use kanbot_core::types::Board;

use crate::archive::ArchivePolicy;
use crate::notifications::{self, NotificationTracker};
use crate::overflow;

/// The monitoring engine: owns the service and sink handles, the archive
/// policy, and the notification tracker.
pub struct Monitor {
    service: Arc<dyn BoardService>,
    sink: Arc<dyn MessageSink>,
    config: KanbotConfig,
    archive: ArchivePolicy,
    tracker: NotificationTracker,
}

impl Monitor {
    pub fn new(
        service: Arc<dyn BoardService>,
        sink: Arc<dyn MessageSink>,
        config: KanbotConfig,
    ) -> Self {
        let archive = ArchivePolicy::from_config(&config);
        Self {
            service,
            sink,
            config,
            archive,
            tracker: NotificationTracker::default(),
        }
    }

    /// One full overflow sweep across all boards. Returns the messages; also
    /// used synchronously by the `check overflow` chat command.
    pub async fn overflow_sweep(&self) -> Vec<String> {
        let boards = match self.service.boards().await {
            Ok(boards) => boards,
            Err(e) => {
                self.report(&e).await;
                return Vec::new();
            }
        };

        let per_board = join_all(boards.iter().map(|board| async {
            match self.service.board_lists(&board.id).await {
                Ok(lists) => overflow::check_board(board, &lists),
                Err(e) => {
                    self.report(&e).await;
                    Vec::new()
                }
            }
        }))
        .await;

        per_board.into_iter().flatten().collect()
    }

    /// One full archive sweep across all boards.
    pub async fn archive_sweep(&self) -> Vec<String> {
        let boards = match self.service.boards().await {
            Ok(boards) => boards,
            Err(e) => {
                self.report(&e).await;
                return Vec::new();
            }
        };

        let per_board = join_all(boards.iter().map(|board| async {
            match self.service.board_lists(&board.id).await {
                Ok(lists) => {
                    let (messages, errors) =
                        self.archive.run(self.service.as_ref(), board, &lists).await;
                    for error in &errors {
                        self.report(error).await;
                    }
                    messages
                }
                Err(e) => {
                    self.report(&e).await;
                    Vec::new()
                }
            }
        }))
        .await;

        per_board.into_iter().flatten().collect()
    }

    /// Fetch and render unread feed notifications (manual command path only;
    /// the periodic sweeps never touch the tracker).
    pub async fn recent_notifications(&self) -> Result<Vec<String>> {
        notifications::fetch_recent(self.service.as_ref(), &self.tracker).await
    }

    /// One summary block per board: name plus its list names.
    pub async fn board_summaries(&self) -> Result<Vec<String>> {
        let boards = self.service.boards().await?;
        Ok(boards.iter().map(board_info).collect())
    }

    /// Send every message to the notify room.
    pub async fn broadcast(&self, messages: &[String]) {
        if self.config.notify_room.is_empty() {
            return;
        }
        for message in messages {
            if let Err(e) = self
                .sink
                .message_room(&self.config.notify_room, message)
                .await
            {
                tracing::warn!("broadcast failed: {e}");
            }
        }
    }

    /// Default error handler: log, and announce in the notify room when one
    /// is configured. Never propagates across a sweep boundary.
    pub async fn report(&self, error: &KanbotError) {
        tracing::error!("{error}");
        if self.config.notify_room.is_empty() {
            return;
        }
        let text = format!("ERROR: {error}");
        if let Err(e) = self.sink.message_room(&self.config.notify_room, &text).await {
            tracing::warn!("error broadcast failed: {e}");
        }
    }

    /// Spawn the two periodic checkers. Each tick detaches its sweep so a
    /// slow external service never delays the cadence.
    pub fn spawn_checkers(self: &Arc<Self>) {
        let interval = std::time::Duration::from_millis(self.config.check_interval_ms);
        tracing::info!(
            "monitor started: overflow + archive sweeps every {}ms",
            self.config.check_interval_ms
        );

        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // first tick fires immediately; skip it
            loop {
                ticker.tick().await;
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move {
                    let messages = monitor.overflow_sweep().await;
                    monitor.broadcast(&messages).await;
                });
            }
        });

        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let monitor = Arc::clone(&monitor);
                tokio::spawn(async move {
                    let messages = monitor.archive_sweep().await;
                    monitor.broadcast(&messages).await;
                });
            }
        });
    }
}

/// "Board: {name}:" followed by one indented line per list.
pub fn board_info(board: &Board) -> String {
    let sep = "\n -> ";
    let lists: Vec<&str> = board.lists.iter().map(|l| l.name.as_str()).collect();
    format!("Board: {}:{}{}", board.name, sep, lists.join(sep))
}
