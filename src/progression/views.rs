//! Response shapes returned by the progression service

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ledger::RewardGrant;
use super::levels::{Level, LevelProgress};
use crate::domain::{ActivityEntry, QuestStats, QuestType, TitleId, TitleRecord, UserProgression};

/// Result of a quest update or smart-quest claim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestOutcome {
    pub quest_type: QuestType,
    /// Whether the quest shows as completed today after this call
    pub completed: bool,
    pub xp: u64,
    pub coins: u64,
    pub level: u32,
    pub xp_gained: u64,
    pub coins_gained: u64,
    pub leveled_up: bool,
    /// The reward had already been granted today; nothing was added
    pub already_claimed: bool,
    pub unlocked_titles: Vec<TitleId>,
    pub quest_stats: QuestStats,
}

impl QuestOutcome {
    pub(crate) fn build(
        progression: &UserProgression,
        quest: QuestType,
        day: &str,
        grant: Option<&RewardGrant>,
        unlocked_titles: Vec<TitleId>,
    ) -> Self {
        let title_coins: u64 = unlocked_titles
            .iter()
            .map(|id| super::titles::TitleDefinition::get(*id).coin_reward)
            .sum();
        Self {
            quest_type: quest,
            completed: progression.is_completed(quest, day),
            xp: progression.xp,
            coins: progression.coins,
            level: Level::for_xp(progression.xp),
            xp_gained: grant.map_or(0, |g| g.xp_gained),
            coins_gained: grant.map_or(0, |g| g.coins_gained) + title_coins,
            leveled_up: grant.is_some_and(|g| g.leveled_up()),
            already_claimed: grant.is_none() && progression.is_claimed(quest, day),
            unlocked_titles,
            quest_stats: progression.quest_stats.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestStatusEntry {
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub progress: f64,
}

/// Today's state of every quest
pub type DailyQuestStatus = BTreeMap<QuestType, QuestStatusEntry>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmartQuestEntry {
    pub target: f64,
    pub current_progress: f64,
    /// Reward already claimed today
    pub completed: bool,
    /// Target reached and reward not yet claimed
    pub claimable: bool,
}

/// Targets and progress for the food-log driven quests
pub type SmartQuestData = BTreeMap<QuestType, SmartQuestEntry>;

/// Full read-only view of a user's progression
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressionSnapshot {
    pub xp: u64,
    pub level: u32,
    pub level_progress: LevelProgress,
    pub coins: u64,
    pub quest_stats: QuestStats,
    pub titles: Vec<TitleRecord>,
    pub activity_log: Vec<ActivityEntry>,
}

impl From<&UserProgression> for ProgressionSnapshot {
    fn from(progression: &UserProgression) -> Self {
        Self {
            xp: progression.xp,
            level: Level::for_xp(progression.xp),
            level_progress: LevelProgress::new(progression.xp),
            coins: progression.coins,
            quest_stats: progression.quest_stats.clone(),
            titles: progression.titles.clone(),
            activity_log: progression.activity_log.clone(),
        }
    }
}
