//! Quest catalog: rewards and per-user targets
//!
//! Targets for the smart quests come from the onboarding profile. Missing
//! fields never fail a request; the formulas fall back to fixed defaults.

use crate::domain::{ActivityLevel, Gender, PrimaryGoal, QuestType, UserProfile};

/// Calorie target when the profile lacks weight, height or age
pub const DEFAULT_CALORIE_TARGET: f64 = 2000.0;
/// Body weight assumed for the protein target when none is on file
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
/// Protein coefficient (g/kg) when no goal is on file
pub const DEFAULT_PROTEIN_PER_KG: f64 = 1.6;
/// Activity multiplier when no activity level is on file
pub const DEFAULT_ACTIVITY_MULTIPLIER: f64 = 1.4;
pub const DEFAULT_STEPS_GOAL: u32 = 10_000;

/// XP and coins granted for one completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct QuestReward {
    pub xp: u64,
    pub coins: u64,
}

#[derive(Debug, Clone)]
pub struct QuestCatalog {
    steps_goal: u32,
}

impl Default for QuestCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_STEPS_GOAL)
    }
}

impl QuestCatalog {
    pub fn new(steps_goal: u32) -> Self {
        Self {
            steps_goal: steps_goal.max(1),
        }
    }

    pub fn steps_goal(&self) -> u32 {
        self.steps_goal
    }

    pub fn reward_for(&self, quest: QuestType) -> QuestReward {
        let (xp, coins) = match quest {
            QuestType::Exercise => (40, 18),
            QuestType::Water => (20, 5),
            QuestType::Sleep => (30, 10),
            QuestType::Meal => (25, 8),
            QuestType::Steps => (30, 12),
            QuestType::Calories => (50, 20),
            QuestType::Protein => (50, 20),
        };
        QuestReward { xp, coins }
    }

    /// Progress needed for `quest` to count as done
    pub fn target_for(&self, quest: QuestType, profile: &UserProfile) -> f64 {
        match quest {
            QuestType::Water | QuestType::Sleep | QuestType::Exercise | QuestType::Meal => 1.0,
            QuestType::Steps => f64::from(self.steps_goal),
            QuestType::Calories => calorie_target(profile),
            QuestType::Protein => protein_target(profile),
        }
    }
}

pub fn activity_multiplier(level: Option<ActivityLevel>) -> f64 {
    match level {
        Some(ActivityLevel::Sedentary) => 1.2,
        Some(ActivityLevel::Light) => 1.375,
        Some(ActivityLevel::Moderate) => 1.55,
        Some(ActivityLevel::Active) => 1.725,
        Some(ActivityLevel::VeryActive) => 1.9,
        None => DEFAULT_ACTIVITY_MULTIPLIER,
    }
}

/// Mifflin-St Jeor resting energy, or `None` without weight/height/age
pub fn basal_metabolic_rate(profile: &UserProfile) -> Option<f64> {
    if !profile.has_body_metrics() {
        return None;
    }
    let weight = profile.weight_kg?;
    let height = profile.height_cm?;
    let age = f64::from(profile.age?);
    let base = 10.0 * weight + 6.25 * height - 5.0 * age;
    let offset = match profile.gender {
        Some(Gender::Male) => 5.0,
        Some(Gender::Female) => -161.0,
        Some(Gender::Other) | None => -78.0,
    };
    Some(base + offset)
}

/// Daily calorie target in kcal, rounded to a whole number
pub fn calorie_target(profile: &UserProfile) -> f64 {
    match basal_metabolic_rate(profile) {
        Some(bmr) if bmr > 0.0 => (bmr * activity_multiplier(profile.activity_level)).round(),
        _ => DEFAULT_CALORIE_TARGET,
    }
}

/// Daily protein target in grams, rounded to a whole number
pub fn protein_target(profile: &UserProfile) -> f64 {
    let weight = profile
        .weight_kg
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_WEIGHT_KG);
    let per_kg = match profile.primary_goal {
        Some(PrimaryGoal::MuscleGain) => 2.0,
        Some(PrimaryGoal::WeightLoss) => 1.6,
        Some(PrimaryGoal::Maintenance | PrimaryGoal::GeneralHealth) => 1.2,
        None => DEFAULT_PROTEIN_PER_KG,
    };
    (weight * per_kg).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            weight_kg: Some(80.0),
            height_cm: Some(180.0),
            age: Some(30),
            gender: Some(Gender::Male),
            activity_level: Some(ActivityLevel::Moderate),
            primary_goal: Some(PrimaryGoal::MuscleGain),
        }
    }

    #[test]
    fn test_toggle_targets_are_one() {
        let catalog = QuestCatalog::default();
        for quest in [
            QuestType::Water,
            QuestType::Sleep,
            QuestType::Exercise,
            QuestType::Meal,
        ] {
            assert_eq!(catalog.target_for(quest, &UserProfile::default()), 1.0);
        }
        assert_eq!(
            catalog.target_for(QuestType::Steps, &UserProfile::default()),
            10_000.0
        );
    }

    #[test]
    fn test_rewards_table() {
        let catalog = QuestCatalog::default();
        assert_eq!(
            catalog.reward_for(QuestType::Exercise),
            QuestReward { xp: 40, coins: 18 }
        );
        assert_eq!(
            catalog.reward_for(QuestType::Water),
            QuestReward { xp: 20, coins: 5 }
        );
    }

    #[test]
    fn test_calorie_target_male() {
        // 800 + 1125 - 150 + 5 = 1780 * 1.55 = 2759
        assert_eq!(calorie_target(&profile()), 2759.0);
    }

    #[test]
    fn test_calorie_target_branches_on_gender() {
        let mut female = profile();
        female.gender = Some(Gender::Female);
        // (1775 - 161) * 1.55 = 2501.7
        assert_eq!(calorie_target(&female), 2502.0);

        let mut unspecified = profile();
        unspecified.gender = None;
        unspecified.activity_level = None;
        // (1775 - 78) * 1.4 = 2375.8
        assert_eq!(calorie_target(&unspecified), 2376.0);
    }

    #[test]
    fn test_calorie_target_defaults_without_metrics() {
        let mut missing = profile();
        missing.height_cm = None;
        assert_eq!(calorie_target(&missing), DEFAULT_CALORIE_TARGET);
        assert_eq!(
            calorie_target(&UserProfile::default()),
            DEFAULT_CALORIE_TARGET
        );
    }

    #[test]
    fn test_protein_target_by_goal() {
        let mut p = profile();
        assert_eq!(protein_target(&p), 160.0);
        p.primary_goal = Some(PrimaryGoal::WeightLoss);
        assert_eq!(protein_target(&p), 128.0);
        p.primary_goal = Some(PrimaryGoal::Maintenance);
        assert_eq!(protein_target(&p), 96.0);
        p.primary_goal = None;
        assert_eq!(protein_target(&p), 128.0);
        assert_eq!(protein_target(&UserProfile::default()), 112.0);
    }
}
