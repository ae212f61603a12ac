//! Version metadata, reported by `GET /version` and sent as the user agent
//! of outgoing requests.

use serde::{Deserialize, Serialize};

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commit the binary was built from, injected by the release build.
pub const COMMIT: &str = match option_env!("ALARM_SCHEDULER_COMMIT") {
    Some(c) => c,
    None => "unknown",
};

/// `alarm-scheduler/<version>`
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub commit: String,
}

impl BuildInfo {
    /// Metadata of the running binary.
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: NAME.to_string(),
            version: VERSION.to_string(),
            commit: COMMIT.to_string(),
        }
    }
}
