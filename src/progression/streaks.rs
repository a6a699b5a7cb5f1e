//! Streak tracking system
//!
//! Tracks consecutive calendar days with a qualifying completion, separately
//! for the overall, protein and calorie families.

use chrono::NaiveDate;

use super::calendar::days_between;
use crate::domain::{QuestStats, QuestType, StreakFamily, StreakInfo};

/// What a completion did to one streak family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakChange {
    /// Already counted today
    Unchanged,
    /// Continued from yesterday
    Extended(u32),
    /// Gap of two or more days, or first completion ever
    Restarted,
}

impl StreakInfo {
    /// Check if the streak is still alive on `today` (completed today or yesterday)
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.last_completed
            .is_some_and(|last| days_between(last, today) <= 1)
    }

    /// Apply one qualifying completion on `today`
    pub fn complete(self, today: NaiveDate) -> (StreakInfo, StreakChange) {
        let (current, change) = match self.last_completed {
            // Also covers a last date ahead of today (clock moved backwards)
            Some(last) if last >= today => return (self, StreakChange::Unchanged),
            Some(last) if today.pred_opt() == Some(last) => {
                let current = self.current.saturating_add(1);
                (current, StreakChange::Extended(current))
            }
            _ => (1, StreakChange::Restarted),
        };
        let updated = StreakInfo {
            current,
            longest: self.longest.max(current),
            last_completed: Some(today),
        };
        (updated, change)
    }
}

/// Result of applying a completion to [`QuestStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Families whose counter moved, with the new current value
    pub changed: Vec<(StreakFamily, u32)>,
}

impl StreakUpdate {
    pub fn current(&self, family: StreakFamily) -> Option<u32> {
        self.changed
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, count)| *count)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StreakTracker;

impl StreakTracker {
    /// Record that `quest` was completed on `today`
    ///
    /// The overall family moves at most once per day; protein and calorie
    /// families only move for their own quest type.
    pub fn apply_completion(
        &self,
        stats: &mut QuestStats,
        quest: QuestType,
        today: NaiveDate,
    ) -> StreakUpdate {
        let mut update = StreakUpdate::default();
        stats.total_completed = stats.total_completed.saturating_add(1);

        for &family in StreakFamily::fed_by(quest) {
            let (info, change) = stats.streak(family).complete(today);
            stats.set_streak(family, info);
            if change != StreakChange::Unchanged {
                update.changed.push((family, info.current));
            }
        }
        update
    }

    /// Zero the current counter of every family that missed a whole day
    ///
    /// Longest streaks and last dates are left alone. Returns true if
    /// anything changed.
    pub fn expire_stale(&self, stats: &mut QuestStats, today: NaiveDate) -> bool {
        let mut changed = false;
        for family in StreakFamily::ALL {
            let info = stats.streak(family);
            if info.current > 0 && !info.is_active(today) {
                stats.set_streak(family, StreakInfo { current: 0, ..info });
                changed = true;
            }
        }
        changed
    }
}
