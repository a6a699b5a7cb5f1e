//! Title definitions and unlock checks
//!
//! Titles are earned from *longest* streaks, so a later broken streak never
//! takes one away. The check is re-run after every committed reward and is
//! safe to run any number of times.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::domain::{
    ActivityEntry, ActivityKind, StreakFamily, TitleId, TitleRecord, UserProgression,
};

/// Title definition with its unlock condition and reward
#[derive(Debug, Clone)]
pub struct TitleDefinition {
    pub id: TitleId,
    pub name: &'static str,
    pub description: &'static str,
    /// Streak family whose longest streak is compared against `threshold`
    pub family: StreakFamily,
    pub threshold: u32,
    pub coin_reward: u64,
}

pub static TITLES: &[TitleDefinition] = &[
    TitleDefinition {
        id: TitleId::StreakLegend,
        name: "Streak Legend",
        description: "Complete quests 7 days in a row",
        family: StreakFamily::Overall,
        threshold: 7,
        coin_reward: 100,
    },
    TitleDefinition {
        id: TitleId::ProteinBeast,
        name: "Protein Beast",
        description: "Hit your protein target 5 days in a row",
        family: StreakFamily::Protein,
        threshold: 5,
        coin_reward: 75,
    },
    TitleDefinition {
        id: TitleId::NutritionExpert,
        name: "Nutrition Expert",
        description: "Hit your calorie target 5 days in a row",
        family: StreakFamily::Calorie,
        threshold: 5,
        coin_reward: 75,
    },
];

impl TitleDefinition {
    pub fn get(id: TitleId) -> &'static TitleDefinition {
        TITLES.iter().find(|t| t.id == id).unwrap_or(&TITLES[0])
    }
}

#[derive(Debug, Clone)]
pub struct TitleUnlockEngine {
    activity_log_cap: usize,
}

impl TitleUnlockEngine {
    pub fn new(activity_log_cap: usize) -> Self {
        Self {
            activity_log_cap: activity_log_cap.max(1),
        }
    }

    /// Titles whose condition holds but which are not yet in `titles`
    pub fn pending(&self, progression: &UserProgression) -> Vec<&'static TitleDefinition> {
        TITLES
            .iter()
            .filter(|t| {
                progression.quest_stats.streak(t.family).longest >= t.threshold
                    && !progression.has_title(t.id)
            })
            .collect()
    }

    /// Grant every newly satisfied title; returns the ids granted by this call
    pub fn check_and_unlock(
        &self,
        progression: &mut UserProgression,
        now: DateTime<Utc>,
    ) -> Vec<TitleId> {
        let mut newly_unlocked = Vec::new();

        for title in self.pending(progression) {
            progression.titles.push(TitleRecord {
                title_id: title.id,
                unlocked_at: now,
            });
            progression.coins = progression.coins.saturating_add(title.coin_reward);
            progression.push_activity(
                ActivityEntry {
                    kind: ActivityKind::TitleUnlocked,
                    date: now,
                    details: format!("Unlocked title: {}", title.name),
                    xp_gained: 0,
                    coins_gained: title.coin_reward,
                },
                self.activity_log_cap,
            );
            info!(
                "[nq:titles] Unlocked {} (+{} coins)",
                title.id, title.coin_reward
            );
            newly_unlocked.push(title.id);
        }

        newly_unlocked
    }
}
