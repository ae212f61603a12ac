//! HTTP client for an alarm-scheduler server.
//!
//! Used by the `ask` and `status` CLI commands.

mod error;

pub use crate::api::{ActionResponse, AlarmResponse, TextRequest};
pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::action::ActionRequest;
use crate::build_info::{self, BuildInfo};

/// Body of `GET /readyz`.
#[derive(Debug, Deserialize)]
pub struct Readiness {
    pub status: String,
    #[serde(default)]
    pub alarm_armed: Option<bool>,
}

/// HTTP client for an alarm-scheduler server.
#[derive(Debug, Clone)]
pub struct AlarmClient {
    base_url: String,
    http: Client,
}

impl AlarmClient {
    /// Create a client for the server at `base_url`, e.g. `http://localhost:8080`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let http = Client::builder()
            .user_agent(build_info::user_agent())
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    /// Check that the server and its alarm service are up.
    pub async fn readiness(&self) -> Result<Readiness> {
        let response = self.send(self.http.get(self.url("/readyz"))).await?;

        if !response.status().is_success() {
            return Err(ClientError::NotReady {
                status: response.status().as_u16(),
            });
        }

        response.json().await.map_err(ClientError::Decode)
    }

    /// Build metadata of the server.
    pub async fn version(&self) -> Result<BuildInfo> {
        let response = self.send(self.http.get(self.url("/version"))).await?;
        decode(response).await
    }

    /// Send free text.
    ///
    /// Returns `None` when the server did not recognize the request.
    pub async fn ask(&self, text: &str) -> Result<Option<ActionResponse>> {
        let body = TextRequest {
            text: text.to_string(),
        };

        let response = self
            .send(self.http.post(self.url("/api/v1/requests")).json(&body))
            .await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        decode(response).await.map(Some)
    }

    /// Execute a structured action.
    pub async fn execute(&self, request: &ActionRequest) -> Result<ActionResponse> {
        let response = self
            .send(self.http.post(self.url("/api/v1/actions")).json(request))
            .await?;
        decode(response).await
    }

    /// The active alarm and whether a trigger is pending.
    pub async fn alarm(&self) -> Result<AlarmResponse> {
        let response = self.send(self.http.get(self.url("/api/v1/alarm"))).await?;
        decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|source| ClientError::Request {
            url: self.base_url.clone(),
            source,
        })
    }
}

/// Problem details returned by the server on failure.
#[derive(Deserialize)]
struct ProblemDetails {
    title: String,
    detail: Option<String>,
}

/// Decode a success body, or turn an error response into [`ClientError::Api`].
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(ClientError::Decode);
    }

    let message = match response.json::<ProblemDetails>().await {
        Ok(problem) => problem.detail.unwrap_or(problem.title),
        Err(_) => format!("HTTP {}", status.as_u16()),
    };
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
