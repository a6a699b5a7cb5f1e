//! Route handlers. Each one consumes the request and always responds.

use serde::Serialize;
use tracing::{error, warn};

use super::respond_json;
use super::types::{QuestProgressRequest, SmartClaimRequest};
use crate::progression::{ProgressionError, ProgressionService};

/// Handle POST /users
pub fn handle_register(service: &ProgressionService, user_id: &str, request: tiny_http::Request) {
    match service.register(user_id) {
        Ok(created) => respond_json(
            request,
            if created { 201 } else { 200 },
            serde_json::json!({ "status": "ok", "created": created }),
        ),
        Err(e) => respond_error(request, &e),
    }
}

/// Handle GET /progression
pub fn handle_progression(
    service: &ProgressionService,
    user_id: &str,
    request: tiny_http::Request,
) {
    match service.progression(user_id) {
        Ok(snapshot) => respond_serialized(request, &snapshot),
        Err(e) => respond_error(request, &e),
    }
}

/// Handle POST /quests/progress
pub fn handle_quest_progress(
    service: &ProgressionService,
    user_id: &str,
    body: &str,
    request: tiny_http::Request,
) {
    let req: QuestProgressRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => {
            respond_invalid_json(request, &e);
            return;
        }
    };

    match service.update_quest_progress(user_id, req.quest_type, req.progress, req.completed) {
        Ok(outcome) => respond_serialized(request, &outcome),
        Err(e) => respond_error(request, &e),
    }
}

/// Handle POST /quests/smart/claim
pub fn handle_smart_claim(
    service: &ProgressionService,
    user_id: &str,
    body: &str,
    request: tiny_http::Request,
) {
    let req: SmartClaimRequest = match serde_json::from_str(body) {
        Ok(req) => req,
        Err(e) => {
            respond_invalid_json(request, &e);
            return;
        }
    };

    match service.claim_smart_quest_reward(user_id, req.quest_type) {
        Ok(outcome) => respond_serialized(request, &outcome),
        Err(e) => respond_error(request, &e),
    }
}

/// Handle GET /quests/status
pub fn handle_daily_status(
    service: &ProgressionService,
    user_id: &str,
    request: tiny_http::Request,
) {
    match service.daily_quest_status(user_id) {
        Ok(status) => respond_serialized(request, &status),
        Err(e) => respond_error(request, &e),
    }
}

/// Handle GET /quests/smart
pub fn handle_smart_data(service: &ProgressionService, user_id: &str, request: tiny_http::Request) {
    match service.smart_quest_data(user_id) {
        Ok(data) => respond_serialized(request, &data),
        Err(e) => respond_error(request, &e),
    }
}

fn respond_invalid_json(request: tiny_http::Request, err: &serde_json::Error) {
    warn!("[nq:http] Invalid JSON: {}", err);
    respond_json(
        request,
        400,
        serde_json::json!({ "error": "invalid_json", "details": err.to_string() }),
    );
}

fn respond_serialized<T: Serialize>(request: tiny_http::Request, value: &T) {
    match serde_json::to_value(value) {
        Ok(value) => respond_json(request, 200, value),
        Err(e) => {
            error!("[nq:http] Failed to serialize response: {}", e);
            respond_json(request, 500, serde_json::json!({ "error": "serialize" }));
        }
    }
}

/// HTTP status and error code for a service failure
pub(super) fn error_status(err: &ProgressionError) -> (u16, &'static str) {
    match err {
        ProgressionError::AlreadyClaimed { .. } => (200, "already_claimed"),
        ProgressionError::NotYetEligible { .. } => (422, "not_eligible"),
        ProgressionError::NotSmartQuest(_) => (400, "not_smart_quest"),
        ProgressionError::NotFound { .. } => (404, "user_not_found"),
        ProgressionError::PersistenceConflict { .. } => (409, "conflict"),
        ProgressionError::Store(_) => (500, "storage"),
    }
}

fn respond_error(request: tiny_http::Request, err: &ProgressionError) {
    let (status, code) = error_status(err);
    let body = match err {
        ProgressionError::AlreadyClaimed { quest, .. } => serde_json::json!({
            "status": "ok",
            "quest_type": quest,
            "already_claimed": true,
        }),
        ProgressionError::NotYetEligible {
            quest,
            progress,
            target,
        } => serde_json::json!({
            "error": code,
            "quest_type": quest,
            "progress": progress,
            "target": target,
        }),
        ProgressionError::Store(e) => {
            error!("[nq:http] Storage failure: {}", e);
            serde_json::json!({ "error": code })
        }
        other => serde_json::json!({ "error": code, "details": other.to_string() }),
    };
    respond_json(request, status, body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestType;
    use crate::store::StoreError;

    #[test]
    fn test_error_status_mapping() {
        let not_eligible = ProgressionError::NotYetEligible {
            quest: QuestType::Protein,
            progress: 10.0,
            target: 112.0,
        };
        assert_eq!(error_status(&not_eligible), (422, "not_eligible"));
        assert_eq!(
            error_status(&ProgressionError::NotSmartQuest(QuestType::Water)).0,
            400
        );
        assert_eq!(
            error_status(&ProgressionError::from(StoreError::Conflict {
                user_id: "a".into()
            }))
            .0,
            409
        );
        assert_eq!(
            error_status(&ProgressionError::from(StoreError::NotFound {
                user_id: "a".into()
            }))
            .0,
            404
        );
        assert_eq!(
            error_status(&ProgressionError::from(StoreError::LockPoisoned)).0,
            500
        );
    }
}
