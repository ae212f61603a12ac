//! Show the active alarm of a running server.

use anyhow::{Context, Result};

use alarm_scheduler::client::AlarmClient;

pub async fn run(config_path: &str, server: Option<&str>) -> Result<()> {
    let url = super::server_url(config_path, server).await?;
    let client = AlarmClient::new(&url);

    let readiness = client
        .readiness()
        .await
        .with_context(|| format!("Server at {url} is not ready"))?;
    let build = client.version().await?;
    println!(
        "Server: {} {} at {} ({})",
        build.name, build.version, url, readiness.status
    );

    let status = client.alarm().await?;
    match status.alarm {
        Some(alarm) => {
            println!("Alarm:  {}", alarm.name);
            println!("Time:   {}", alarm.scheduled_time.format("%A, %B %d %Y at %H:%M"));
            println!("Armed:  {}", if status.armed { "yes" } else { "no" });
        }
        None => println!("No active alarm is set."),
    }

    Ok(())
}
