//! Chat command surface — case-insensitive pattern matching over incoming
//! lines, dispatched against the monitor and the mood log.
//!
//! Replies go back to the invoking conversation; the periodic sweeps keep
//! broadcasting to the notify room independently of anything here.

use std::sync::{Arc, OnceLock};

use regex::Regex;

use kanbot_monitor::Monitor;
use kanbot_mood::{MoodEngine, MoodFilter, today, yesterday};

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `trello boards`
    Boards,
    /// `trello check overflow`
    CheckOverflow,
    /// `trello check archive`
    CheckArchive,
    /// `trello ping`
    Ping,
    /// `trello recent`
    Recent,
    /// `mood set <mood>`
    MoodSet(String),
    /// `mood today`
    MoodToday,
    /// `mood yesterday`
    MoodYesterday,
    /// `mood of <user|me>`
    MoodOf(String),
    /// `mood week of <user|me>`
    MoodWeek(String),
    /// `mood month of <user|me>`
    MoodMonth(String),
}

struct Patterns {
    mood_set: Regex,
    mood_week: Regex,
    mood_month: Regex,
    mood_of: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        mood_set: Regex::new(r"(?i)^mood set (\w+)$").expect("mood set regex"),
        mood_week: Regex::new(r"(?i)^mood week (?:of|for) (.+)$").expect("mood week regex"),
        mood_month: Regex::new(r"(?i)^mood month (?:of|for) (.+)$").expect("mood month regex"),
        mood_of: Regex::new(r"(?i)^mood (?:of|for) (.+)$").expect("mood of regex"),
    })
}

impl Command {
    /// Parse one chat line. Unrecognized input yields `None` and is ignored
    /// by the dispatcher.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "trello boards" => return Some(Self::Boards),
            "trello check overflow" => return Some(Self::CheckOverflow),
            "trello check archive" => return Some(Self::CheckArchive),
            "trello ping" => return Some(Self::Ping),
            "trello recent" => return Some(Self::Recent),
            "mood today" => return Some(Self::MoodToday),
            "mood yesterday" => return Some(Self::MoodYesterday),
            _ => {}
        }
        let p = patterns();
        if let Some(caps) = p.mood_set.captures(trimmed) {
            return Some(Self::MoodSet(caps[1].to_lowercase()));
        }
        if let Some(caps) = p.mood_week.captures(trimmed) {
            return Some(Self::MoodWeek(caps[1].trim().to_string()));
        }
        if let Some(caps) = p.mood_month.captures(trimmed) {
            return Some(Self::MoodMonth(caps[1].trim().to_string()));
        }
        if let Some(caps) = p.mood_of.captures(trimmed) {
            return Some(Self::MoodOf(caps[1].trim().to_string()));
        }
        None
    }
}

/// Executes commands against the monitor and the mood log.
pub struct CommandHandler {
    monitor: Arc<Monitor>,
    moods: Arc<MoodEngine>,
}

impl CommandHandler {
    pub fn new(monitor: Arc<Monitor>, moods: Arc<MoodEngine>) -> Self {
        Self { monitor, moods }
    }

    /// Run one command on behalf of `invoker` and return the reply lines.
    /// Command errors come back as reply text, never as broadcasts.
    pub async fn handle(&self, command: Command, invoker: &str) -> Vec<String> {
        match command {
            Command::Boards => match self.monitor.board_summaries().await {
                Ok(summaries) => summaries,
                Err(e) => vec![format!("ERROR: {e}")],
            },
            Command::CheckOverflow => self.monitor.overflow_sweep().await,
            Command::CheckArchive => self.monitor.archive_sweep().await,
            Command::Ping => vec!["trello PONG".into()],
            Command::Recent => match self.monitor.recent_notifications().await {
                Ok(lines) => lines,
                Err(e) => vec![format!("ERROR: {e}")],
            },
            Command::MoodSet(mood) => match self.moods.store(invoker, &mood) {
                Ok(()) => vec![format!(
                    "Recorded entry: {invoker} is in a {mood} mood today"
                )],
                Err(e) => vec![e.to_string()],
            },
            Command::MoodToday => self.mood_digest(&today(), "Today's moods:", "is"),
            Command::MoodYesterday => {
                self.mood_digest(&yesterday(), "Yesterday's moods:", "was")
            }
            Command::MoodOf(user) => {
                let user = self.resolve_user(&user, invoker);
                let filter = MoodFilter {
                    date: Some(today()),
                    user: Some(user.clone()),
                    ..MoodFilter::default()
                };
                match self.moods.query(&filter) {
                    Ok(moods) => match moods.first() {
                        Some(entry) => vec![format!(
                            "{}: {} is in a {} mood",
                            entry.date, entry.user, entry.mood
                        )],
                        None => vec![format!("{user} has not set a mood, yet")],
                    },
                    Err(e) => vec![e.to_string()],
                }
            }
            Command::MoodWeek(user) => self.mood_graph(&user, invoker, 7),
            Command::MoodMonth(user) => self.mood_graph(&user, invoker, 30),
        }
    }

    fn resolve_user(&self, user: &str, invoker: &str) -> String {
        if user.eq_ignore_ascii_case("me") {
            invoker.to_string()
        } else {
            user.to_string()
        }
    }

    fn mood_digest(&self, date: &str, header: &str, verb: &str) -> Vec<String> {
        let filter = MoodFilter {
            date: Some(date.to_string()),
            ..MoodFilter::default()
        };
        match self.moods.query(&filter) {
            Ok(moods) if moods.is_empty() => {
                vec![header.to_string(), format!("No mood entry for {date}.")]
            }
            Ok(moods) => {
                let mut lines = vec![header.to_string()];
                lines.extend(
                    moods
                        .iter()
                        .map(|m| format!("- {} {} in a {} mood", m.user, verb, m.mood)),
                );
                lines
            }
            Err(e) => vec![e.to_string()],
        }
    }

    fn mood_graph(&self, user: &str, invoker: &str, since_days: i64) -> Vec<String> {
        let user = self.resolve_user(user, invoker);
        match self.moods.graph(&user, since_days) {
            Ok(graph) => vec![graph],
            Err(e) => vec![e.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trello_commands() {
        assert_eq!(Command::parse("trello boards"), Some(Command::Boards));
        assert_eq!(
            Command::parse("Trello Check Overflow"),
            Some(Command::CheckOverflow)
        );
        assert_eq!(
            Command::parse("trello check archive"),
            Some(Command::CheckArchive)
        );
        assert_eq!(Command::parse("TRELLO PING"), Some(Command::Ping));
        assert_eq!(Command::parse("trello recent"), Some(Command::Recent));
    }

    #[test]
    fn test_parse_mood_commands() {
        assert_eq!(
            Command::parse("mood set SUNNY"),
            Some(Command::MoodSet("sunny".into()))
        );
        assert_eq!(Command::parse("mood today"), Some(Command::MoodToday));
        assert_eq!(
            Command::parse("mood of me"),
            Some(Command::MoodOf("me".into()))
        );
        assert_eq!(
            Command::parse("mood week for grace"),
            Some(Command::MoodWeek("grace".into()))
        );
        assert_eq!(
            Command::parse("mood month of ada"),
            Some(Command::MoodMonth("ada".into()))
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_partial() {
        assert_eq!(Command::parse("trello"), None);
        assert_eq!(Command::parse("trello boards please"), None);
        assert_eq!(Command::parse("mood set"), None);
        assert_eq!(Command::parse("hello there"), None);
    }

    struct EmptyService;

    #[async_trait::async_trait]
    impl kanbot_core::traits::BoardService for EmptyService {
        async fn boards(&self) -> kanbot_core::error::Result<Vec<kanbot_core::types::Board>> {
            Ok(vec![])
        }
        async fn board_lists(
            &self,
            _board_id: &str,
        ) -> kanbot_core::error::Result<Vec<kanbot_core::types::List>> {
            Ok(vec![])
        }
        async fn archive_card(&self, _card_id: &str) -> kanbot_core::error::Result<()> {
            Ok(())
        }
        async fn comment_on_card(
            &self,
            _card_id: &str,
            _text: &str,
        ) -> kanbot_core::error::Result<()> {
            Ok(())
        }
        async fn recent_notifications(
            &self,
            _query: &kanbot_core::types::NotificationQuery,
        ) -> kanbot_core::error::Result<Vec<kanbot_core::types::Notification>> {
            Ok(vec![])
        }
    }

    fn handler() -> CommandHandler {
        let monitor = Arc::new(Monitor::new(
            Arc::new(EmptyService),
            Arc::new(crate::sink::ConsoleSink),
            kanbot_core::config::KanbotConfig::default(),
        ));
        let moods = Arc::new(MoodEngine::open_in_memory().unwrap());
        CommandHandler::new(monitor, moods)
    }

    #[tokio::test]
    async fn test_ping_reply() {
        let replies = handler().handle(Command::Ping, "ada").await;
        assert_eq!(replies, vec!["trello PONG"]);
    }

    #[tokio::test]
    async fn test_mood_set_then_query_me() {
        let h = handler();
        let replies = h.handle(Command::MoodSet("sunny".into()), "ada").await;
        assert_eq!(replies, vec!["Recorded entry: ada is in a sunny mood today"]);

        let replies = h.handle(Command::MoodOf("me".into()), "ada").await;
        assert!(replies[0].contains("ada is in a sunny mood"));
    }

    #[tokio::test]
    async fn test_mood_graph_error_goes_to_invoker() {
        let replies = handler().handle(Command::MoodWeek("ada".into()), "ada").await;
        assert_eq!(replies, vec!["No mood entry for ada in the last 7 days."]);
    }

    #[tokio::test]
    async fn test_empty_sweeps_reply_nothing() {
        let h = handler();
        assert!(h.handle(Command::CheckOverflow, "ada").await.is_empty());
        assert!(h.handle(Command::CheckArchive, "ada").await.is_empty());
    }
}
