//! Core domain types for NutriQuest

mod profile;
mod progression;
mod quest;

pub use profile::{ActivityLevel, Gender, PrimaryGoal, UserProfile};
pub use progression::{
    ActivityEntry, ActivityKind, DayGuards, QuestDayRecord, QuestStats, StreakFamily, StreakInfo,
    TitleId, TitleRecord, UserProgression,
};
pub use quest::{QuestKind, QuestType};
