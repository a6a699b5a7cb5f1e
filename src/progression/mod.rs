//! Quest and reward progression engine
//!
//! Computes quest targets, detects completion, grants XP/coins at most once
//! per quest and day, keeps levels and streaks in sync, and unlocks titles.
//!
//! # Architecture
//!
//! ```text
//!   HTTP / CLI
//!       │
//!       ▼
//! ProgressionService ──► RewardLedger ──► StreakTracker
//!       │                    │
//!       │                    ├──► Level (xp -> level)
//!       │                    └──► QuestCatalog (rewards, targets)
//!       ├──► TitleUnlockEngine
//!       ▼
//!   store::ProgressionStore (versioned documents)
//! ```

pub mod calendar;
mod catalog;
mod error;
mod ledger;
mod levels;
mod service;
mod streaks;
mod titles;
mod views;

pub use calendar::{Clock, FixedClock, SystemClock, day_key, parse_day_key};
pub use catalog::{
    DEFAULT_CALORIE_TARGET, DEFAULT_STEPS_GOAL, QuestCatalog, QuestReward, activity_multiplier,
    basal_metabolic_rate, calorie_target, protein_target,
};
pub use error::ProgressionError;
pub use ledger::{Eligibility, LevelUp, RewardGrant, RewardLedger, award_xp};
pub use levels::{LEVELS, Level, LevelProgress};
pub use service::ProgressionService;
pub use streaks::{StreakChange, StreakTracker, StreakUpdate};
pub use titles::{TITLES, TitleDefinition, TitleUnlockEngine};
pub use views::{
    DailyQuestStatus, ProgressionSnapshot, QuestOutcome, QuestStatusEntry, SmartQuestData,
    SmartQuestEntry,
};
