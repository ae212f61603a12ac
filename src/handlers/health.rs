use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::server::AppState;

/// GET /livez
pub async fn livez() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
pub struct ReadyzResponse {
    pub status: &'static str,
    /// Whether a trigger is pending. Absent when the service is down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_armed: Option<bool>,
}

/// GET /readyz
///
/// Ready while the alarm service task is running.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<ReadyzResponse>) {
    match state.alarms.status() {
        Ok(alarm_state) => (
            StatusCode::OK,
            Json(ReadyzResponse {
                status: "ok",
                alarm_armed: Some(alarm_state.is_armed()),
            }),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyzResponse {
                status: "unavailable",
                alarm_armed: None,
            }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_livez() {
        assert_eq!(livez().await, "ok");
    }

    #[test]
    fn unavailable_omits_armed() {
        let body = ReadyzResponse {
            status: "unavailable",
            alarm_armed: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "unavailable"}));
    }
}
