//! Biometric profile collected during onboarding
//!
//! Read-only for the progression engine. Every field is optional; quest
//! targets fall back to defaults when something is missing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryGoal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    GeneralHealth,
}

macro_rules! str_enum {
    ($ty:ty { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s,)+
                }
            }

            pub fn from_str(s: &str) -> Option<Self> {
                match s {
                    $($s => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

str_enum!(Gender { Male => "male", Female => "female", Other => "other" });
str_enum!(ActivityLevel {
    Sedentary => "sedentary",
    Light => "light",
    Moderate => "moderate",
    Active => "active",
    VeryActive => "very-active",
});
str_enum!(PrimaryGoal {
    WeightLoss => "weight-loss",
    MuscleGain => "muscle-gain",
    Maintenance => "maintenance",
    GeneralHealth => "general-health",
});

/// User biometrics consumed by quest target formulas
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub primary_goal: Option<PrimaryGoal>,
}

impl UserProfile {
    /// True when the calorie formula has everything it needs
    pub fn has_body_metrics(&self) -> bool {
        self.weight_kg.is_some_and(|w| w > 0.0)
            && self.height_cm.is_some_and(|h| h > 0.0)
            && self.age.is_some()
    }
}
