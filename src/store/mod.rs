//! Persistence boundary for the progression engine
//!
//! The engine only talks to the traits below. [`ProgressionDb`] implements all
//! of them on a single SQLite file (`~/.nutriquest/progression.db`).
//!
//! # Write discipline
//!
//! ```text
//! load_progression ──► (document, version)
//!        │
//!        ▼  mutate an in-memory copy
//! save_progression(expected_version)
//!        │
//!        ├─ version matched ──► version + 1
//!        └─ version moved   ──► StoreError::Conflict (reload, retry everything)
//! ```

mod collaborators;
mod db;
mod documents;

pub use collaborators::FoodLogEntry;
pub use db::ProgressionDb;

use crate::domain::{UserProfile, UserProgression};

/// Errors raised by storage backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("concurrent write detected for {user_id}")]
    Conflict { user_id: String },

    #[error("user {user_id} not found")]
    NotFound { user_id: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid progression document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("database lock poisoned")]
    LockPoisoned,
}

/// A progression document together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedProgression {
    pub progression: UserProgression,
    pub version: i64,
}

/// Document storage for [`UserProgression`]
pub trait ProgressionStore: Send + Sync {
    /// Create a zeroed progression; returns false if the user already had one
    fn create_progression(&self, user_id: &str) -> Result<bool, StoreError>;

    fn load_progression(&self, user_id: &str) -> Result<VersionedProgression, StoreError>;

    /// Conditional write: succeeds only if the stored version still equals
    /// `expected_version`. Returns the new version.
    fn save_progression(
        &self,
        user_id: &str,
        progression: &UserProgression,
        expected_version: i64,
    ) -> Result<i64, StoreError>;
}

/// Per-day nutrition totals derived from the food log
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct DailyTotals {
    pub calories: f64,
    pub protein: f64,
}

pub trait FoodLogSource: Send + Sync {
    /// Totals for `day` ("YYYY-MM-DD"); zero when nothing was logged
    fn daily_totals(&self, user_id: &str, day: &str) -> Result<DailyTotals, StoreError>;
}

pub trait ProfileSource: Send + Sync {
    fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;
}
