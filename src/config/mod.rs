//! Configuration loading and management

mod io;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration structure (`~/.nutriquest/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Quest and reward rules
    #[serde(default)]
    pub progression: ProgressionSettings,

    /// Database location
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for the X-NQ-Token header. Empty disables the check.
    #[serde(default)]
    pub auth_token: String,

    /// Threads pulling requests off the listener
    #[serde(default = "default_workers")]
    pub workers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionSettings {
    /// Activity log entries kept per user (oldest dropped first)
    #[serde(default = "default_activity_log_cap")]
    pub activity_log_cap: usize,

    /// Extra attempts after a concurrent-write conflict
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    #[serde(default = "default_daily_steps_goal")]
    pub daily_steps_goal: u32,

    /// Drop guard and quest-log days older than this. Unset keeps them forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guard_retention_days: Option<u32>,

    /// Calendar-day boundary as a fixed UTC offset. Unset uses server-local time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file; defaults to ~/.nutriquest/progression.db
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    9878
}

fn default_workers() -> usize {
    4
}

fn default_activity_log_cap() -> usize {
    50
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_daily_steps_goal() -> u32 {
    crate::progression::DEFAULT_STEPS_GOAL
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            auth_token: String::new(),
            workers: default_workers(),
        }
    }
}

impl Default for ProgressionSettings {
    fn default() -> Self {
        Self {
            activity_log_cap: default_activity_log_cap(),
            max_conflict_retries: default_max_conflict_retries(),
            daily_steps_goal: default_daily_steps_goal(),
            guard_retention_days: None,
            utc_offset_minutes: None,
        }
    }
}

impl Config {
    /// Database path, falling back to the global data directory
    pub fn db_path(&self) -> PathBuf {
        self.storage
            .db_path
            .clone()
            .unwrap_or_else(|| Self::global_config_dir().join("progression.db"))
    }

    pub fn auth_token(&self) -> Option<&str> {
        Some(self.server.auth_token.trim()).filter(|t| !t.is_empty())
    }
}
