//! Reward ledger - at-most-once reward granting per (quest, day)
//!
//! All checks run before the first mutation, so an error leaves the
//! progression untouched.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use super::calendar::day_key;
use super::catalog::QuestCatalog;
use super::error::ProgressionError;
use super::levels::Level;
use super::streaks::{StreakTracker, StreakUpdate};
use crate::domain::{ActivityEntry, ActivityKind, QuestType, UserProgression};

/// Evidence that a quest is done
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eligibility {
    /// Toggle quests: the act of checking it off is the completion
    Toggle,
    /// Threshold quests: progress must have reached the target
    Threshold { progress: f64, target: f64 },
}

/// A level up event
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LevelUp {
    pub old_level: u32,
    pub new_level: u32,
    pub new_title: String,
}

/// What a successful claim granted
#[derive(Debug, Clone, PartialEq)]
pub struct RewardGrant {
    pub quest: QuestType,
    pub xp_gained: u64,
    pub coins_gained: u64,
    pub level_up: Option<LevelUp>,
    pub streaks: StreakUpdate,
}

impl RewardGrant {
    pub fn leveled_up(&self) -> bool {
        self.level_up.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct RewardLedger {
    catalog: QuestCatalog,
    streaks: StreakTracker,
    activity_log_cap: usize,
}

impl RewardLedger {
    pub fn new(catalog: QuestCatalog, activity_log_cap: usize) -> Self {
        Self {
            catalog,
            streaks: StreakTracker,
            activity_log_cap: activity_log_cap.max(1),
        }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    /// Grant the reward for `quest` on `today`, at most once
    pub fn claim_reward(
        &self,
        progression: &mut UserProgression,
        quest: QuestType,
        eligibility: Eligibility,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<RewardGrant, ProgressionError> {
        let day = day_key(today);

        if progression.is_claimed(quest, &day) {
            return Err(ProgressionError::AlreadyClaimed { quest, day });
        }
        if let Eligibility::Threshold { progress, target } = eligibility {
            if progress < target {
                return Err(ProgressionError::NotYetEligible {
                    quest,
                    progress,
                    target,
                });
            }
        }

        progression.set_guard(quest, &day, true);
        let record = progression.day_record_mut(quest, &day);
        record.completed_at = Some(now);
        if let Eligibility::Threshold { progress, .. } = eligibility {
            record.progress = progress;
        } else {
            record.progress = record.progress.max(1.0);
        }

        // Streaks first: title checks read the fresh numbers
        let streaks = self
            .streaks
            .apply_completion(&mut progression.quest_stats, quest, today);

        let reward = self.catalog.reward_for(quest);
        let level_up = award_xp(progression, reward.xp);
        progression.coins = progression.coins.saturating_add(reward.coins);

        progression.push_activity(
            ActivityEntry {
                kind: ActivityKind::QuestCompleted,
                date: now,
                details: format!("Completed quest: {}", quest.label()),
                xp_gained: reward.xp,
                coins_gained: reward.coins,
            },
            self.activity_log_cap,
        );
        if let Some(up) = &level_up {
            progression.push_activity(
                ActivityEntry {
                    kind: ActivityKind::LevelUp,
                    date: now,
                    details: format!("Reached level {} ({})", up.new_level, up.new_title),
                    xp_gained: 0,
                    coins_gained: 0,
                },
                self.activity_log_cap,
            );
        }

        debug!(
            "[nq:ledger] {} claimed for {}: +{} xp, +{} coins",
            quest, day, reward.xp, reward.coins
        );

        Ok(RewardGrant {
            quest,
            xp_gained: reward.xp,
            coins_gained: reward.coins,
            level_up,
            streaks,
        })
    }
}

/// Add XP and recompute the level from it
pub fn award_xp(progression: &mut UserProgression, amount: u64) -> Option<LevelUp> {
    let old_level = Level::for_xp(progression.xp);
    progression.xp = progression.xp.saturating_add(amount);
    progression.level = Level::for_xp(progression.xp);

    (progression.level > old_level).then(|| LevelUp {
        old_level,
        new_level: progression.level,
        new_title: Level::title(progression.level).to_string(),
    })
}
