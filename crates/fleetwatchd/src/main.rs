//! Fleetwatch Daemon - webhook server and background jobs

use anyhow::Result;
use fleetwatch_core::{constants, Config};
use fleetwatch_db::Database;
use fleetwatch_fleet::{FleetClient, RoadSpeedChecker};
use fleetwatch_notify::{Notifier, TelegramNotifier};
use fleetwatch_pipeline::NotificationPipeline;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod jobs;
mod webhook;

use webhook::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fleetwatchd=info,fleetwatch_db=info,fleetwatch_pipeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Fleetwatch Daemon starting...");

    // Ensure home directory exists
    let home = constants::fleetwatch_home();
    if !home.exists() {
        std::fs::create_dir_all(&home)?;
        info!("Created Fleetwatch home directory: {}", home.display());
    }

    let config = Config::load()?;

    let db = Arc::new(Database::new(&config.database_path).await?);
    info!("Database ready at {}", config.database_path.display());

    let notifier: Arc<dyn Notifier> = match &config.telegram {
        Some(telegram) => Arc::new(TelegramNotifier::new(telegram.bot_token.clone())),
        None => {
            warn!("No Telegram bot token configured, deliveries will fail");
            Arc::new(TelegramNotifier::new(String::new()))
        }
    };

    let pipeline = Arc::new(NotificationPipeline::new(
        db,
        Arc::new(FleetClient::new()),
        Arc::new(RoadSpeedChecker::new()),
        notifier,
    ));

    tokio::spawn(jobs::sync_rosters_loop(
        pipeline.clone(),
        config.sync_interval_secs,
    ));
    tokio::spawn(jobs::sweep_timers_loop(
        pipeline.clone(),
        config.sweep_interval_secs,
    ));

    let state = AppState { pipeline };

    // Set up signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    tokio::select! {
        result = webhook::start_server(&config.bind_addr, state) => {
            if let Err(e) = result {
                error!("Webhook server error: {}", e);
                return Err(e.into());
            }
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    info!("Daemon shutdown complete");
    Ok(())
}
