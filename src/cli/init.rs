//! Init command implementation

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

use nutriquest::config::Config;

/// Default configuration content for nutriquest init
pub const DEFAULT_CONFIG: &str = r#"# NutriQuest Configuration
# ========================
#
# Quest and reward progression server for the NutriQuest app.

# HTTP API used by the clients
[server]
bind = "127.0.0.1"
port = 9878
# Optional shared secret, sent by clients as `X-NQ-Token`.
# Leave empty to disable (fine when the API sits behind a gateway).
auth_token = ""
# Threads serving requests
workers = 4

[progression]
# Entries kept in each user's activity feed
activity_log_cap = 50
# Extra attempts when two requests update the same user at once
max_conflict_retries = 3
# Steps needed to complete the daily steps quest
daily_steps_goal = 10000
# Forget per-day claim records older than this many days (unset = keep forever)
# guard_retention_days = 90
# Fixed UTC offset for the calendar day, in minutes (unset = server-local time)
# utc_offset_minutes = 0

[storage]
# db_path = "/var/lib/nutriquest/progression.db"
"#;

/// Write the default config to `config_path` (default ~/.nutriquest/config.toml)
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    write_default_config(&config_path)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

fn write_default_config(path: &Path) -> Result<()> {
    // Refuse to write something the loader would reject
    toml::from_str::<Config>(DEFAULT_CONFIG).context("Default config does not parse")?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    std::fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write config: {}", path.display()))?;
    Ok(())
}
