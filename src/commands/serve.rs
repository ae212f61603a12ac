//! HTTP server command implementation.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{info, warn};

use alarm_scheduler::config::{self, Config};
use alarm_scheduler::notify::{LogNotifier, Notifier, WebhookNotifier};
use alarm_scheduler::scheduler::{
    AlarmService, AlarmServiceConfig, RecurrenceRule, SystemClock,
};
use alarm_scheduler::server::{self, AppState};
use alarm_scheduler::store::file::FileAlarmStore;

pub async fn run(
    config_path: &str,
    host_override: Option<IpAddr>,
    port_override: Option<u16>,
) -> Result<()> {
    let mut config = Config::load(config_path).await?;

    // CLI overrides config
    if let Some(host) = host_override {
        config.server.host = host.to_string();
    }
    if let Some(port) = port_override {
        config.server.port = port;
    }

    let rule = RecurrenceRule::parse(&config.alarm.cron_expression)
        .context("Invalid alarm.cron_expression")?;
    let default_time = config.alarm.default_time()?;
    let store_path = config::resolve_path(Path::new(config_path), &config.alarm.store_path);

    let notifier: Arc<dyn Notifier> = match config.alarm.webhook_url() {
        Some(url) => {
            info!(url = %url, "Alarms will be delivered by webhook");
            Arc::new(WebhookNotifier::new(url))
        }
        None => {
            warn!("No webhook_url configured, alarms will only be logged");
            Arc::new(LogNotifier)
        }
    };

    info!(
        cron_expression = %rule.expr(),
        store_path = %store_path.display(),
        "Initializing alarm service"
    );

    let service = AlarmService::new(AlarmServiceConfig {
        rule,
        store: Arc::new(FileAlarmStore::new(store_path)),
        notifier,
        clock: Arc::new(SystemClock),
        default_time,
        notify_timeout: config.alarm.notify_timeout(),
    });
    let alarms = service
        .start()
        .await
        .context("Failed to recover stored alarm")?;

    let app = server::build_app(
        AppState {
            alarms: alarms.clone(),
        },
        config.server.request_timeout_seconds,
    );

    let ip: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "Starting server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cancels the pending trigger; the stored alarm is recovered on next start
    alarms.shutdown().await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
