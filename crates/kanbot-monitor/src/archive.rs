//! Archive policy — closes stale cards sitting in the "done" list and leaves
//! an explanatory comment behind.
//!
//! The done-list match is an exact, accent-sensitive string equality: only
//! the configured literal spelling ever archives. Cards whose name starts
//! with the keep prefix are never touched, and already-closed cards are
//! filtered out before staleness is even looked at, so a second sweep over a
//! refreshed snapshot cannot archive the same card twice.

use chrono::{DateTime, Duration, Utc};
use regex::Regex;

use kanbot_core::config::KanbotConfig;
use kanbot_core::error::KanbotError;
use kanbot_core::traits::BoardService;
use kanbot_core::types::{Board, Card, List};

/// Staleness-based archival rules for one sweep.
pub struct ArchivePolicy {
    archive_days: i64,
    done_list_name: String,
    keep_re: Regex,
}

impl ArchivePolicy {
    pub fn new(archive_days: i64, done_list_name: &str, keep_prefix: &str) -> Self {
        let keep_re = Regex::new(&format!("^{}", regex::escape(keep_prefix)))
            .expect("escaped prefix is a valid regex");
        Self {
            archive_days,
            done_list_name: done_list_name.to_string(),
            keep_re,
        }
    }

    pub fn from_config(config: &KanbotConfig) -> Self {
        Self::new(
            config.archive_days,
            &config.done_list_name,
            &config.keep_prefix,
        )
    }

    pub fn archive_days(&self) -> i64 {
        self.archive_days
    }

    /// Select the cards a sweep would archive right now: open, not
    /// keep-marked, sitting in an exactly-matching done list, and last active
    /// at least `archive_days` ago.
    pub fn stale_cards<'a>(
        &self,
        lists: &'a [List],
        now: DateTime<Utc>,
    ) -> Vec<(&'a List, &'a Card)> {
        let threshold = Duration::days(self.archive_days);
        lists
            .iter()
            .filter(|list| list.name == self.done_list_name)
            .flat_map(|list| {
                list.cards
                    .iter()
                    .filter(|card| !card.closed && !self.keep_re.is_match(&card.name))
                    .filter(|card| now - card.date_last_activity >= threshold)
                    .map(move |card| (list, card))
            })
            .collect()
    }

    /// Run the policy against one board snapshot.
    ///
    /// Cards are processed concurrently; within one card the comment is only
    /// attempted after the archive succeeded. A failed archive produces no
    /// message for that card and never aborts its siblings. Returns the
    /// emitted messages plus every mutation error for the caller to report.
    pub async fn run(
        &self,
        service: &dyn BoardService,
        board: &Board,
        lists: &[List],
    ) -> (Vec<String>, Vec<KanbotError>) {
        let now = Utc::now();
        let selected = self.stale_cards(lists, now);

        let outcomes = futures::future::join_all(selected.into_iter().map(|(list, card)| {
            let comment = format!(
                "This card has not been updated since {} days, archived.",
                self.archive_days
            );
            async move {
                if let Err(e) = service.archive_card(&card.id).await {
                    return (None, Some(e));
                }
                tracing::info!("archived {}", card.name);
                let comment_error = service.comment_on_card(&card.id, &comment).await.err();
                let message = format!(
                    "card {} > {} > {} is more than {} days old, archived {}",
                    board.name, list.name, card.name, self.archive_days, card.short_url
                );
                (Some(message), comment_error)
            }
        }))
        .await;

        let mut messages = Vec::new();
        let mut errors = Vec::new();
        for (message, error) in outcomes {
            if let Some(message) = message {
                messages.push(message);
            }
            if let Some(error) = error {
                errors.push(error);
            }
        }
        (messages, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{FakeService, aged_card, board, list};

    fn policy() -> ArchivePolicy {
        ArchivePolicy::new(15, "Terminé", "Lisez-moi")
    }

    #[tokio::test]
    async fn test_stale_card_archived_commented_and_reported() {
        // Scenario: "Terminé" holds "Task A", last active 20 days ago.
        let b = board("b1", "Dev");
        let lists = vec![list("l1", "Terminé", vec![aged_card("c1", "Task A", 20)])];
        let service = FakeService::with_board(b.clone(), lists.clone());

        let (messages, errors) = policy().run(&service, &b, &lists).await;

        assert_eq!(service.archived_ids(), vec!["c1"]);
        assert_eq!(service.comment_count(), 1);
        let (_, comment) = &service.comments.lock().unwrap()[0];
        assert!(comment.contains("15 days"));
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Task A"));
        assert!(messages[0].contains("15"));
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_keep_prefix_is_never_archived() {
        // Scenario: a "Lisez-moi" card 40 days old stays put.
        let b = board("b1", "Dev");
        let lists = vec![list(
            "l1",
            "Terminé",
            vec![aged_card("c1", "Lisez-moi: guidelines", 40)],
        )];
        let service = FakeService::with_board(b.clone(), lists.clone());

        let (messages, errors) = policy().run(&service, &b, &lists).await;

        assert!(service.archived_ids().is_empty());
        assert!(messages.is_empty());
        assert!(errors.is_empty());
    }

    #[tokio::test]
    async fn test_fresh_card_not_archived() {
        let b = board("b1", "Dev");
        let lists = vec![list("l1", "Terminé", vec![aged_card("c1", "Task B", 3)])];
        let service = FakeService::with_board(b.clone(), lists.clone());

        let (messages, _) = policy().run(&service, &b, &lists).await;
        assert!(service.archived_ids().is_empty());
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_closed_card_skipped_before_staleness() {
        // Idempotence: a card already closed in the snapshot is filtered out
        // before the staleness check, so a second run cannot double-archive.
        let b = board("b1", "Dev");
        let mut stale = aged_card("c1", "Task C", 30);
        stale.closed = true;
        let lists = vec![list("l1", "Terminé", vec![stale])];
        let service = FakeService::with_board(b.clone(), lists.clone());

        let (messages, _) = policy().run(&service, &b, &lists).await;
        assert!(service.archived_ids().is_empty());
        assert_eq!(service.comment_count(), 0);
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_archive_failure_means_no_comment_no_message() {
        let b = board("b1", "Dev");
        let lists = vec![list(
            "l1",
            "Terminé",
            vec![aged_card("c1", "Task D", 20), aged_card("c2", "Task E", 20)],
        )];
        let mut service = FakeService::with_board(b.clone(), lists.clone());
        service.fail_archive_for.insert("c1".into());

        let (messages, errors) = policy().run(&service, &b, &lists).await;

        // c1 fails: no comment, no message. c2 is unaffected.
        assert_eq!(service.archived_ids(), vec!["c2"]);
        assert_eq!(service.comment_count(), 1);
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("Task E"));
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_comment_failure_still_emits_message() {
        // The archive is the mutation of record; a failed comment is reported
        // but the card is still announced as archived.
        let b = board("b1", "Dev");
        let lists = vec![list("l1", "Terminé", vec![aged_card("c1", "Task F", 20)])];
        let mut service = FakeService::with_board(b.clone(), lists.clone());
        service.fail_comment_for.insert("c1".into());

        let (messages, errors) = policy().run(&service, &b, &lists).await;

        assert_eq!(service.archived_ids(), vec!["c1"]);
        assert_eq!(messages.len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_done_name_is_exact_and_accent_sensitive() {
        let b = board("b1", "Dev");
        let lists = vec![
            // Missing accent: not a done list.
            list("l1", "Termine", vec![aged_card("c1", "Task G", 20)]),
            // Capacity-style suffix does not count as a match either.
            list("l2", "Terminé (3)", vec![aged_card("c2", "Task H", 20)]),
        ];
        let service = FakeService::with_board(b.clone(), lists.clone());

        let (messages, _) = policy().run(&service, &b, &lists).await;
        assert!(service.archived_ids().is_empty());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_stale_selection_threshold_inclusive() {
        let p = policy();
        let lists = vec![list("l1", "Terminé", vec![aged_card("c1", "Task I", 15)])];
        let selected = p.stale_cards(&lists, Utc::now());
        assert_eq!(selected.len(), 1);
    }
}
