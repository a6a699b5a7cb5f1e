//! NutriQuest - quest and reward progression for a health-tracking app
//!
//! Users complete daily quests (drink water, sleep, hit a protein target...)
//! and earn XP, coins, levels, streaks and titles. The engine guarantees a
//! reward is granted at most once per quest per calendar day, even when
//! clients retry or race each other.
//!
//! ## Layers
//!
//! 1. **progression**: pure rules (levels, targets, streaks, ledger, titles)
//!    plus [`progression::ProgressionService`], which loads a user's document,
//!    applies a change and saves it with an optimistic version check.
//!
//! 2. **store**: persistence traits and their SQLite implementation.
//!
//! 3. **http_server**: JSON API used by the mobile/web clients.

pub mod config;
pub mod domain;
pub mod http_server;
pub mod progression;
pub mod store;

pub use domain::*;
