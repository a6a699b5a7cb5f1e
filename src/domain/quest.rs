use serde::{Deserialize, Serialize};

/// How a quest is completed and which guard map protects its reward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestKind {
    /// Checked off by the user (progress >= 1 means done)
    Toggle,
    /// Threshold derived from food-log aggregation, claimed explicitly
    Smart,
    /// Threshold against progress the client reports (e.g. step counter)
    Counter,
}

/// Every daily quest the engine knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestType {
    Calories,
    Protein,
    Water,
    Sleep,
    Exercise,
    Meal,
    Steps,
}

impl QuestType {
    pub const ALL: [QuestType; 7] = [
        Self::Calories,
        Self::Protein,
        Self::Water,
        Self::Sleep,
        Self::Exercise,
        Self::Meal,
        Self::Steps,
    ];

    pub fn kind(&self) -> QuestKind {
        match self {
            Self::Calories | Self::Protein => QuestKind::Smart,
            Self::Water | Self::Sleep | Self::Exercise | Self::Meal => QuestKind::Toggle,
            Self::Steps => QuestKind::Counter,
        }
    }

    pub fn is_smart(&self) -> bool {
        self.kind() == QuestKind::Smart
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::Water => "water",
            Self::Sleep => "sleep",
            Self::Exercise => "exercise",
            Self::Meal => "meal",
            Self::Steps => "steps",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|q| q.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Calories => "Hit your calorie target",
            Self::Protein => "Hit your protein target",
            Self::Water => "Stay hydrated",
            Self::Sleep => "Get a full night of sleep",
            Self::Exercise => "Work out",
            Self::Meal => "Log a healthy meal",
            Self::Steps => "Reach your step goal",
        }
    }
}

impl std::fmt::Display for QuestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
