//! SQLite database connection and schema management
//!
//! Manages the `~/.nutriquest/progression.db` database with automatic schema
//! migration.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::Connection;

use super::StoreError;

/// Shared connection to the progression database
#[derive(Clone)]
pub struct ProgressionDb {
    conn: Arc<Mutex<Connection>>,
}

impl ProgressionDb {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open progression db: {}", path.display()))?;

        // WAL lets the CLI read while the server writes
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(SCHEMA_SQL)?;
        drop(conn);
        self.run_migrations()
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        let version: i32 = conn
            .query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_version",
                [],
                |r| r.get(0),
            )
            .unwrap_or(0);

        // Migration 2: food log entries carry an optional display name
        if version < 2 {
            let has_name: bool = conn
                .prepare("SELECT COUNT(*) FROM pragma_table_info('food_logs') WHERE name = 'name'")
                .and_then(|mut s| s.query_row([], |r| r.get::<_, i32>(0)))
                .map(|c| c > 0)
                .unwrap_or(false);

            if !has_name {
                conn.execute_batch("ALTER TABLE food_logs ADD COLUMN name TEXT;")?;
            }
            conn.execute("INSERT OR REPLACE INTO schema_version VALUES (2)", [])?;
        }

        Ok(())
    }
}

/// SQL schema for the progression database
const SCHEMA_SQL: &str = r#"
-- One progression document per user (JSON), versioned for conditional writes
CREATE TABLE IF NOT EXISTS progressions (
    user_id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Onboarding biometrics (read-only for the engine)
CREATE TABLE IF NOT EXISTS profiles (
    user_id TEXT PRIMARY KEY,
    weight_kg REAL,
    height_cm REAL,
    age INTEGER,
    gender TEXT,
    activity_level TEXT,
    primary_goal TEXT,
    updated_at INTEGER NOT NULL
);

-- Logged food entries, aggregated per day for smart quests
CREATE TABLE IF NOT EXISTS food_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    day_bucket TEXT NOT NULL,
    calories REAL NOT NULL DEFAULT 0,
    protein REAL NOT NULL DEFAULT 0,
    logged_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_food_user_day ON food_logs(user_id, day_bucket);

-- Schema version
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER PRIMARY KEY);
INSERT OR IGNORE INTO schema_version VALUES (1);
"#;
