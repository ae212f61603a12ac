//! CLI command implementations.

use anyhow::Result;

use alarm_scheduler::config::Config;

pub mod ask;
pub mod serve;
pub mod status;

/// Base URL of the server to talk to.
///
/// An explicit `--server` wins; otherwise the port from the config file is
/// used on the loopback address.
pub async fn server_url(config_path: &str, server: Option<&str>) -> Result<String> {
    if let Some(url) = server {
        return Ok(url.to_string());
    }

    let config = Config::load(config_path).await?;
    let host = match config.server.host.as_str() {
        "0.0.0.0" | "::" => "127.0.0.1",
        other => other,
    };
    Ok(format!("http://{}:{}", host, config.server.port))
}
