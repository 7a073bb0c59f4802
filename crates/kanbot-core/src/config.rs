//! Kanbot configuration system.
//!
//! Every field has a default: the bot starts degraded rather then refusing to
//! start when credentials are absent. Values come from an optional TOML file
//! (~/.kanbot/config.toml) with environment variables taking precedence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{KanbotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KanbotConfig {
    /// Trello API key.
    #[serde(default)]
    pub api_key: String,
    /// Trello API token.
    #[serde(default)]
    pub api_token: String,
    /// Organization whose boards are monitored.
    #[serde(default = "default_organization")]
    pub organization: String,
    /// Room that receives sweep messages and default error broadcasts.
    #[serde(default)]
    pub notify_room: String,
    /// Sweep cadence in milliseconds (both policies).
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Staleness threshold in days for auto-archival.
    #[serde(default = "default_archive_days")]
    pub archive_days: i64,
    /// Exact name of the list whose stale cards get archived.
    /// Accent- and case-sensitive on purpose: only this literal spelling
    /// archives, and operators can change it here instead of in code.
    #[serde(default = "default_done_list_name")]
    pub done_list_name: String,
    /// Cards whose name starts with this prefix are never auto-archived.
    #[serde(default = "default_keep_prefix")]
    pub keep_prefix: String,
    /// Path to the mood log database.
    #[serde(default = "default_mood_db_path")]
    pub mood_db_path: String,
    /// Chat gateway webhook for outbound broadcasts; empty means log-only.
    #[serde(default)]
    pub webhook_url: String,
}

fn default_organization() -> String {
    "scopyleft".into()
}
fn default_check_interval_ms() -> u64 {
    300_000
}
fn default_archive_days() -> i64 {
    15
}
fn default_done_list_name() -> String {
    "Terminé".into()
}
fn default_keep_prefix() -> String {
    "Lisez-moi".into()
}
fn default_mood_db_path() -> String {
    KanbotConfig::home_dir()
        .join("mood.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for KanbotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_token: String::new(),
            organization: default_organization(),
            notify_room: String::new(),
            check_interval_ms: default_check_interval_ms(),
            archive_days: default_archive_days(),
            done_list_name: default_done_list_name(),
            keep_prefix: default_keep_prefix(),
            mood_db_path: default_mood_db_path(),
            webhook_url: String::new(),
        }
    }
}

impl KanbotConfig {
    /// Load config: file (if present) first, then environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KanbotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| KanbotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Overlay environment variables onto the current values.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("KANBOT_TRELLO_KEY") {
            self.api_key = v;
        }
        if let Ok(v) = std::env::var("KANBOT_TRELLO_TOKEN") {
            self.api_token = v;
        }
        if let Ok(v) = std::env::var("KANBOT_TRELLO_ORG") {
            self.organization = v;
        }
        if let Ok(v) = std::env::var("KANBOT_NOTIFY_ROOM") {
            self.notify_room = v;
        }
        if let Ok(v) = std::env::var("KANBOT_CHECK_INTERVAL") {
            match v.parse() {
                Ok(ms) => self.check_interval_ms = ms,
                Err(_) => tracing::warn!("KANBOT_CHECK_INTERVAL is not a number: {v}"),
            }
        }
        if let Ok(v) = std::env::var("KANBOT_ARCHIVE_DAYS") {
            match v.parse() {
                Ok(days) => self.archive_days = days,
                Err(_) => tracing::warn!("KANBOT_ARCHIVE_DAYS is not a number: {v}"),
            }
        }
        if let Ok(v) = std::env::var("KANBOT_DONE_LIST") {
            self.done_list_name = v;
        }
        if let Ok(v) = std::env::var("KANBOT_KEEP_PREFIX") {
            self.keep_prefix = v;
        }
        if let Ok(v) = std::env::var("KANBOT_MOOD_DB") {
            self.mood_db_path = v;
        }
        if let Ok(v) = std::env::var("KANBOT_WEBHOOK_URL") {
            self.webhook_url = v;
        }
    }

    /// Log a warning per missing credential. Non-fatal: reads will fail at
    /// the call site and be reported per sweep instead.
    pub fn warn_missing(&self) {
        if self.api_key.is_empty() {
            tracing::warn!("missing KANBOT_TRELLO_KEY");
        }
        if self.api_token.is_empty() {
            tracing::warn!("missing KANBOT_TRELLO_TOKEN");
        }
        if self.notify_room.is_empty() {
            tracing::warn!("missing KANBOT_NOTIFY_ROOM");
        }
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Kanbot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".kanbot")
    }
}
