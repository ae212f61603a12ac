use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::api::AlarmResponse;
use crate::handlers::problem_details;
use crate::server::AppState;

/// GET /api/v1/alarm
pub async fn get_alarm(State(state): State<AppState>) -> Response {
    let alarm = match state.alarms.active_alarm().await {
        Ok(alarm) => alarm,
        Err(e) => {
            error!(error = %e, "Failed to read active alarm");
            return problem_details::from_scheduler_error(&e).into_response();
        }
    };

    let armed = match state.alarms.status() {
        Ok(status) => status.is_armed(),
        Err(e) => return problem_details::from_scheduler_error(&e).into_response(),
    };

    Json(AlarmResponse { alarm, armed }).into_response()
}
