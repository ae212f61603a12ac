//! Shared API types used by both server handlers and client.
//!
//! These types define the contract between server and client.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::scheduler::{ActionOutcome, Alarm};

// ============================================================================
// Request Types
// ============================================================================

/// Free-text request body for `POST /api/v1/requests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// Result of an executed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub action: Action,
    pub answer: String,
    #[serde(default)]
    pub alarm_time: Option<DateTime<Local>>,
    pub alarm_name: String,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        let answer = outcome.answer();
        Self {
            action: outcome.action,
            answer,
            alarm_time: outcome.parameters.alarm_time,
            alarm_name: outcome.parameters.alarm_name,
        }
    }
}

/// Response for `GET /api/v1/alarm`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmResponse {
    /// The stored alarm if it is still ahead.
    pub alarm: Option<Alarm>,
    /// Whether a trigger is pending in the running service.
    #[serde(default)]
    pub armed: bool,
}
