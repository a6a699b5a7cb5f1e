use crate::domain::QuestType;
use crate::store::StoreError;

/// Failures surfaced by reward claims and the progression service
#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    /// Reward for this quest was already granted today. Callers treat this as
    /// a successful no-op so polling clients can retry freely.
    #[error("{quest} reward already claimed for {day}")]
    AlreadyClaimed { quest: QuestType, day: String },

    #[error("{quest} quest not complete yet ({progress} of {target})")]
    NotYetEligible {
        quest: QuestType,
        progress: f64,
        target: f64,
    },

    #[error("{0} is not a smart quest")]
    NotSmartQuest(QuestType),

    /// Concurrent write won; reload and retry the whole operation
    #[error("progression for {user_id} was modified concurrently")]
    PersistenceConflict { user_id: String },

    #[error("no progression found for user {user_id}")]
    NotFound { user_id: String },

    #[error("storage error: {0}")]
    Store(StoreError),
}

impl ProgressionError {
    /// Whether a fresh attempt of the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PersistenceConflict { .. })
    }
}

impl From<StoreError> for ProgressionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { user_id } => Self::PersistenceConflict { user_id },
            StoreError::NotFound { user_id } => Self::NotFound { user_id },
            other => Self::Store(other),
        }
    }
}
