//! Send a free-text request to a running server.

use anyhow::{Context, Result};

use alarm_scheduler::client::AlarmClient;

pub async fn run(text: &str, config_path: &str, server: Option<&str>) -> Result<()> {
    let url = super::server_url(config_path, server).await?;
    let client = AlarmClient::new(&url);

    match client
        .ask(text)
        .await
        .with_context(|| format!("Failed to reach server at {url}"))?
    {
        Some(response) => println!("{}", response.answer),
        None => println!("Request not recognized: {text}"),
    }

    Ok(())
}
