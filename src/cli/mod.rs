//! CLI command implementations

pub mod init;
pub mod seed;
pub mod serve;
pub mod user;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use nutriquest::config::Config;
use nutriquest::progression::{ProgressionService, SystemClock};
use nutriquest::store::ProgressionDb;

/// Loaded configuration plus the database it points at
pub struct AppContext {
    pub config: Config,
    pub db: ProgressionDb,
}

impl AppContext {
    /// Load config (explicit path, else global, else defaults) and open the database.
    /// `db_override` wins over `storage.db_path`.
    pub fn load(config_path: Option<&Path>, db_override: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::load(config_path)?;
        if db_override.is_some() {
            config.storage.db_path = db_override;
        }

        let db = ProgressionDb::open(&config.db_path())?;
        Ok(Self { config, db })
    }

    pub fn service(&self) -> ProgressionService {
        let clock = Arc::new(SystemClock::new(self.config.progression.utc_offset_minutes));
        ProgressionService::new(&self.config.progression, self.db.clone(), clock)
    }
}
