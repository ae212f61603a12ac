mod commands;

use std::net::IpAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use alarm_scheduler::config::DEFAULT_CONFIG_FILE;

// ============================================================================
// CLI Types
// ============================================================================

/// A single recurring alarm with manual overrides
#[derive(Parser, Debug)]
#[command(version = alarm_scheduler::build_info::VERSION, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the alarm service and its HTTP API
    Serve {
        /// Path to configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Host to bind to (overrides config file)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Send a request such as "skip the next alarm" to a running server
    Ask {
        /// Request text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Path to configuration file (used to find the server port)
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Server URL (overrides config file)
        #[arg(short, long)]
        server: Option<String>,
    },

    /// Show the active alarm of a running server
    Status {
        /// Path to configuration file (used to find the server port)
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Server URL (overrides config file)
        #[arg(short, long)]
        server: Option<String>,
    },
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> std::process::ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, host, port } => commands::serve::run(&config, host, port).await,
        Commands::Ask {
            text,
            config,
            server,
        } => commands::ask::run(&text.join(" "), &config, server.as_deref()).await,
        Commands::Status { config, server } => {
            commands::status::run(&config, server.as_deref()).await
        }
    }
}

// ============================================================================
// Initialization
// ============================================================================

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
