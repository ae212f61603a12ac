//! Request handlers: free text and structured actions.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::action::ActionRequest;
use crate::api::{ActionResponse, TextRequest};
use crate::handlers::problem_details;
use crate::scheduler::{ActionOutcome, Result, SchedulerError};
use crate::server::AppState;

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/requests
///
/// Unrecognized text gets no reply (204).
pub async fn process_request(
    State(state): State<AppState>,
    Json(req): Json<TextRequest>,
) -> Response {
    let result = state.alarms.process_text(&req.text).await;
    if let Err(SchedulerError::UnrecognizedAction(_)) = result {
        return StatusCode::NO_CONTENT.into_response();
    }
    respond(result)
}

/// POST /api/v1/actions
pub async fn execute_action(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Response {
    respond(state.alarms.execute(req).await)
}

// ============================================================================
// Private Helpers
// ============================================================================

fn respond(result: Result<ActionOutcome>) -> Response {
    match result {
        Ok(outcome) => Json(ActionResponse::from(outcome)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to execute action");
            problem_details::from_scheduler_error(&e).into_response()
        }
    }
}
