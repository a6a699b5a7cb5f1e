//! Per-user progression document
//!
//! One document per user, persisted as a whole. Every mutation happens on an
//! in-memory copy which is saved in a single conditional write, so a failed
//! save never leaves a half-applied reward behind.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::QuestType;

/// Streak families tracked in [`QuestStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakFamily {
    /// Any completed quest counts
    Overall,
    /// Only the protein smart quest counts
    Protein,
    /// Only the calorie smart quest counts
    Calorie,
}

impl StreakFamily {
    pub const ALL: [StreakFamily; 3] = [Self::Overall, Self::Protein, Self::Calorie];

    /// Families fed by completing `quest` (overall is always included)
    pub fn fed_by(quest: QuestType) -> &'static [StreakFamily] {
        match quest {
            QuestType::Protein => &[Self::Overall, Self::Protein],
            QuestType::Calories => &[Self::Overall, Self::Calorie],
            _ => &[Self::Overall],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Overall => "Quest Streak",
            Self::Protein => "Protein Streak",
            Self::Calorie => "Calorie Streak",
        }
    }
}

/// Snapshot of a single streak family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakInfo {
    pub current: u32,
    pub longest: u32,
    pub last_completed: Option<NaiveDate>,
}

/// Streak bookkeeping, mutated only by the streak tracker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestStats {
    pub total_completed: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_quest_date: Option<NaiveDate>,
    pub protein_streak: u32,
    pub protein_longest_streak: u32,
    pub protein_last_completed_date: Option<NaiveDate>,
    pub calorie_streak: u32,
    pub calorie_longest_streak: u32,
    pub calorie_last_completed_date: Option<NaiveDate>,
}

impl QuestStats {
    pub fn streak(&self, family: StreakFamily) -> StreakInfo {
        match family {
            StreakFamily::Overall => StreakInfo {
                current: self.current_streak,
                longest: self.longest_streak,
                last_completed: self.last_quest_date,
            },
            StreakFamily::Protein => StreakInfo {
                current: self.protein_streak,
                longest: self.protein_longest_streak,
                last_completed: self.protein_last_completed_date,
            },
            StreakFamily::Calorie => StreakInfo {
                current: self.calorie_streak,
                longest: self.calorie_longest_streak,
                last_completed: self.calorie_last_completed_date,
            },
        }
    }

    pub fn set_streak(&mut self, family: StreakFamily, info: StreakInfo) {
        let (current, longest, last) = match family {
            StreakFamily::Overall => (
                &mut self.current_streak,
                &mut self.longest_streak,
                &mut self.last_quest_date,
            ),
            StreakFamily::Protein => (
                &mut self.protein_streak,
                &mut self.protein_longest_streak,
                &mut self.protein_last_completed_date,
            ),
            StreakFamily::Calorie => (
                &mut self.calorie_streak,
                &mut self.calorie_longest_streak,
                &mut self.calorie_last_completed_date,
            ),
        };
        *current = info.current;
        *longest = info.longest;
        *last = info.last_completed;
    }
}

/// Titles that can be unlocked from streak thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleId {
    StreakLegend,
    ProteinBeast,
    NutritionExpert,
}

impl TitleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreakLegend => "streak-legend",
            Self::ProteinBeast => "protein-beast",
            Self::NutritionExpert => "nutrition-expert",
        }
    }
}

impl std::fmt::Display for TitleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub title_id: TitleId,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    QuestCompleted,
    LevelUp,
    TitleUnlocked,
}

/// One entry of the bounded, most-recent-first activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub date: DateTime<Utc>,
    pub details: String,
    pub xp_gained: u64,
    pub coins_gained: u64,
}

/// Progress recorded for one quest on one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestDayRecord {
    pub progress: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Day key -> quest -> flag
pub type DayGuards = BTreeMap<String, BTreeMap<QuestType, bool>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProgression {
    pub xp: u64,
    /// Derived from `xp`; recomputed on every xp change, never set on its own
    pub level: u32,
    pub coins: u64,
    pub quest_stats: QuestStats,
    /// Guard for toggle and counter quests. A present key means the reward was
    /// granted that day; the value is the current checked state.
    pub daily_completions: DayGuards,
    /// Guard for smart quests (calories, protein)
    pub smart_quest_claims: DayGuards,
    pub quest_log: BTreeMap<String, BTreeMap<QuestType, QuestDayRecord>>,
    pub titles: Vec<TitleRecord>,
    pub activity_log: Vec<ActivityEntry>,
}

impl Default for UserProgression {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            coins: 0,
            quest_stats: QuestStats::default(),
            daily_completions: BTreeMap::new(),
            smart_quest_claims: BTreeMap::new(),
            quest_log: BTreeMap::new(),
            titles: Vec::new(),
            activity_log: Vec::new(),
        }
    }
}

impl UserProgression {
    fn guards(&self, quest: QuestType) -> &DayGuards {
        if quest.is_smart() {
            &self.smart_quest_claims
        } else {
            &self.daily_completions
        }
    }

    fn guards_mut(&mut self, quest: QuestType) -> &mut DayGuards {
        if quest.is_smart() {
            &mut self.smart_quest_claims
        } else {
            &mut self.daily_completions
        }
    }

    /// Guard entry for `quest` on `day`: `None` if never rewarded that day
    pub fn guard(&self, quest: QuestType, day: &str) -> Option<bool> {
        self.guards(quest).get(day)?.get(&quest).copied()
    }

    /// Whether the reward for `quest` was already granted on `day`
    pub fn is_claimed(&self, quest: QuestType, day: &str) -> bool {
        self.guard(quest, day).is_some()
    }

    /// Whether `quest` currently shows as completed on `day`
    pub fn is_completed(&self, quest: QuestType, day: &str) -> bool {
        self.guard(quest, day).unwrap_or(false)
    }

    pub fn set_guard(&mut self, quest: QuestType, day: &str, value: bool) {
        self.guards_mut(quest)
            .entry(day.to_string())
            .or_default()
            .insert(quest, value);
    }

    pub fn day_record(&self, quest: QuestType, day: &str) -> Option<&QuestDayRecord> {
        self.quest_log.get(day)?.get(&quest)
    }

    pub fn day_record_mut(&mut self, quest: QuestType, day: &str) -> &mut QuestDayRecord {
        self.quest_log
            .entry(day.to_string())
            .or_default()
            .entry(quest)
            .or_default()
    }

    pub fn has_title(&self, id: TitleId) -> bool {
        self.titles.iter().any(|t| t.title_id == id)
    }

    /// Prepend an entry and drop the oldest ones past `cap`
    pub fn push_activity(&mut self, entry: ActivityEntry, cap: usize) {
        self.activity_log.insert(0, entry);
        self.activity_log.truncate(cap);
    }

    /// Drop guard and quest-log days strictly before `cutoff` (YYYY-MM-DD)
    ///
    /// Returns the number of day keys removed.
    pub fn prune_days_before(&mut self, cutoff: &str) -> usize {
        let before =
            self.daily_completions.len() + self.smart_quest_claims.len() + self.quest_log.len();
        self.daily_completions
            .retain(|day, _| day.as_str() >= cutoff);
        self.smart_quest_claims
            .retain(|day, _| day.as_str() >= cutoff);
        self.quest_log.retain(|day, _| day.as_str() >= cutoff);
        before
            - (self.daily_completions.len() + self.smart_quest_claims.len() + self.quest_log.len())
    }
}
