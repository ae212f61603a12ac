//! Alarm delivery.
//!
//! A [`Notifier`] delivers a fired alarm somewhere. [`WebhookNotifier`] posts
//! JSON to a configured URL; [`LogNotifier`] only records the alarm through
//! `tracing` and is used when no webhook is configured.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::build_info;
use crate::scheduler::Alarm;

/// Message sent with every alarm.
const ALARM_MESSAGE: &str = "Alarm triggered";

/// Delivery failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be sent or the response not read.
    #[error("webhook transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("webhook returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Delivery did not finish in time.
    #[error("delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivers a fired alarm.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError>;
}

// ============================================================================
// Webhook
// ============================================================================

/// JSON body posted to the webhook.
#[derive(Debug, Serialize)]
struct AlarmPayload<'a> {
    message: &'a str,
    alarm_time: String,
}

/// Posts `{"message": "Alarm triggered", "alarm_time": <RFC 3339>}` to a URL.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    url: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(build_info::user_agent())
            .build()
            .unwrap_or_default();

        Self {
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        let payload = AlarmPayload {
            message: ALARM_MESSAGE,
            alarm_time: alarm.scheduled_time.to_rfc3339(),
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NotifyError::Status { status, body });
        }

        debug!(url = %self.url, status = %status, "Webhook notification delivered");
        Ok(())
    }
}

// ============================================================================
// Log
// ============================================================================

/// Records the alarm in the log. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alarm: &Alarm) -> Result<(), NotifyError> {
        info!(
            alarm_id = %alarm.id,
            alarm_name = %alarm.name,
            alarm_time = %alarm.scheduled_time,
            "{}",
            ALARM_MESSAGE
        );
        Ok(())
    }
}
