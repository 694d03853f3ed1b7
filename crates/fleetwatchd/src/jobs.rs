//! Background loops
//!
//! Two periodic tasks run next to the webhook server: roster sync (mirrors
//! each company's vehicle list into the trucks table) and the timer sweep
//! (sends due periodic status messages). Per-iteration errors are logged
//! and the loops keep going.

use chrono::Utc;
use fleetwatch_pipeline::NotificationPipeline;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Periodically reconcile every company's trucks against the provider
pub async fn sync_rosters_loop(pipeline: Arc<NotificationPipeline>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        match pipeline.sync_rosters().await {
            Ok(synced) => debug!("Roster sync pass complete, {} company(ies)", synced),
            Err(e) => error!("Roster sync pass failed: {}", e),
        }
    }
}

/// Periodically send due timer status notifications
pub async fn sweep_timers_loop(pipeline: Arc<NotificationPipeline>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        interval.tick().await;
        match pipeline.sweep_timers(Utc::now()).await {
            Ok(0) => {}
            Ok(sent) => debug!("Timer sweep sent {} status message(s)", sent),
            Err(e) => error!("Timer sweep failed: {}", e),
        }
    }
}
