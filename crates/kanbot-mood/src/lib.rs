//! # Kanbot Mood
//! Per-user daily mood log — an append-only list with linear filtering,
//! persisted in SQLite.

use std::path::Path;
use std::sync::Mutex;

use chrono::{Duration, NaiveDate, Utc};
use rusqlite::Connection;

use kanbot_core::error::{KanbotError, Result};

/// The four moods a user can record, worst-weather-last.
pub const VALID_MOODS: [&str; 4] = ["sunny", "cloudy", "rainy", "stormy"];

/// Sparkline bars, index-aligned with `VALID_MOODS`.
const BARS: [char; 4] = ['▇', '▅', '▃', '▁'];

/// One recorded mood entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MoodEntry {
    pub date: String,
    pub user: String,
    pub mood: String,
}

/// Filters for querying the log. All optional; entries must satisfy every
/// filter that is set.
#[derive(Debug, Clone, Default)]
pub struct MoodFilter {
    /// Exact date, "YYYY-MM-DD".
    pub date: Option<String>,
    /// Only entries from the last N days.
    pub since_days: Option<i64>,
    /// Exact user.
    pub user: Option<String>,
}

/// Today's date as stored in the log.
pub fn today() -> String {
    Utc::now().date_naive().to_string()
}

/// Yesterday's date as stored in the log.
pub fn yesterday() -> String {
    (Utc::now().date_naive() - Duration::days(1)).to_string()
}

/// Mood log engine over a SQLite connection.
pub struct MoodEngine {
    conn: Mutex<Connection>,
}

impl MoodEngine {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn =
            Connection::open(path).map_err(|e| KanbotError::Store(e.to_string()))?;
        Self::init(conn)
    }

    /// In-memory engine, used by tests and ephemeral runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| KanbotError::Store(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS moods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                user TEXT NOT NULL,
                mood TEXT NOT NULL
            );",
        )
        .map_err(|e| KanbotError::Store(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Record today's mood for a user. Rejects unknown moods and duplicate
    /// entries for the same user and day.
    pub fn store(&self, user: &str, mood: &str) -> Result<()> {
        if !VALID_MOODS.contains(&mood) {
            return Err(KanbotError::Command(format!(
                "Invalid mood {mood}; valid values are {}",
                VALID_MOODS.join(", ")
            )));
        }
        let date = today();
        let existing = self.query(&MoodFilter {
            date: Some(date.clone()),
            user: Some(user.to_string()),
            ..MoodFilter::default()
        })?;
        if !existing.is_empty() {
            return Err(KanbotError::Command(format!(
                "Mood already stored for {user} on {date}"
            )));
        }

        tracing::info!("storing mood entry for {user}: {date}:{user}:{mood}");
        let conn = self.conn.lock().expect("mood db lock");
        conn.execute(
            "INSERT INTO moods (date, user, mood) VALUES (?1, ?2, ?3)",
            rusqlite::params![date, user, mood],
        )
        .map_err(|e| KanbotError::Store(e.to_string()))?;
        Ok(())
    }

    /// Full scan in insertion order, then linear filtering.
    pub fn query(&self, filter: &MoodFilter) -> Result<Vec<MoodEntry>> {
        let conn = self.conn.lock().expect("mood db lock");
        let mut stmt = conn
            .prepare("SELECT date, user, mood FROM moods ORDER BY id")
            .map_err(|e| KanbotError::Store(e.to_string()))?;
        let entries = stmt
            .query_map([], |row| {
                Ok(MoodEntry {
                    date: row.get(0)?,
                    user: row.get(1)?,
                    mood: row.get(2)?,
                })
            })
            .map_err(|e| KanbotError::Store(e.to_string()))?
            .filter_map(|r| r.ok())
            .filter(|entry| Self::matches(entry, filter))
            .collect();
        Ok(entries)
    }

    fn matches(entry: &MoodEntry, filter: &MoodFilter) -> bool {
        if let Some(date) = &filter.date
            && entry.date != *date
        {
            return false;
        }
        if let Some(since) = filter.since_days
            && since > 0
        {
            let cutoff = (Utc::now().date_naive() - Duration::days(since)).to_string();
            if entry.date < cutoff {
                return false;
            }
        }
        if let Some(user) = &filter.user
            && entry.user != *user
        {
            return false;
        }
        true
    }

    /// Sparkline of a user's moods over the last `since_days` days, one bar
    /// per entry. Both arguments are mandatory; an empty window is an error
    /// with a descriptive message for the command invoker.
    pub fn graph(&self, user: &str, since_days: i64) -> Result<String> {
        if user.is_empty() {
            return Err(KanbotError::Command("a user is mandatory".into()));
        }
        if since_days <= 0 {
            return Err(KanbotError::Command("a since filter is mandatory".into()));
        }
        let moods = self.query(&MoodFilter {
            user: Some(user.to_string()),
            since_days: Some(since_days),
            ..MoodFilter::default()
        })?;
        if moods.is_empty() {
            return Err(KanbotError::Command(format!(
                "No mood entry for {user} in the last {since_days} days."
            )));
        }
        Ok(moods
            .iter()
            .map(|entry| {
                VALID_MOODS
                    .iter()
                    .position(|m| *m == entry.mood)
                    .map(|i| BARS[i])
                    .unwrap_or('?')
            })
            .collect())
    }
}

impl MoodEngine {
    /// Insert an entry at an arbitrary date, bypassing the one-per-day check.
    /// Meant for backfills and test fixtures.
    pub fn store_at(&self, date: NaiveDate, user: &str, mood: &str) -> Result<()> {
        let conn = self.conn.lock().expect("mood db lock");
        conn.execute(
            "INSERT INTO moods (date, user, mood) VALUES (?1, ?2, ?3)",
            rusqlite::params![date.to_string(), user, mood],
        )
        .map_err(|e| KanbotError::Store(e.to_string()))?;
        Ok(())
    }
}
