//! Request bodies accepted by the HTTP API

use serde::Deserialize;

use crate::domain::QuestType;

/// POST /quests/progress
#[derive(Debug, Clone, Deserialize)]
pub struct QuestProgressRequest {
    pub quest_type: QuestType,
    /// Client-reported progress. Ignored for smart quests.
    #[serde(default)]
    pub progress: f64,
    /// Explicit toggle state; `false` unchecks a toggle quest
    #[serde(default)]
    pub completed: Option<bool>,
}

/// POST /quests/smart/claim
#[derive(Debug, Clone, Deserialize)]
pub struct SmartClaimRequest {
    pub quest_type: QuestType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_request_defaults() {
        let req: QuestProgressRequest = serde_json::from_str(r#"{"quest_type":"water"}"#).unwrap();
        assert_eq!(req.quest_type, QuestType::Water);
        assert_eq!(req.progress, 0.0);
        assert_eq!(req.completed, None);
    }

    #[test]
    fn test_unknown_quest_type_rejected() {
        let err = serde_json::from_str::<SmartClaimRequest>(r#"{"quest_type":"yoga"}"#);
        assert!(err.is_err());
    }
}
