//! Subscription resolution
//!
//! Maps a classified event to the set of chat recipients subscribed to its
//! vehicle, category, and sub-type. The store may return duplicate rows when
//! a subscriber holds identical subscriptions; the set collapses them.

use crate::error::Result;
use fleetwatch_core::{ClassifiedEvent, Error};
use fleetwatch_db::Database;
use std::collections::BTreeSet;
use tracing::debug;

/// One deduplicated delivery target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Recipient {
    pub chat_id: i64,
    pub truck_name: String,
}

/// Resolve the recipients for an event
pub async fn resolve(db: &Database, event: &ClassifiedEvent) -> Result<BTreeSet<Recipient>> {
    let vehicle_id: i64 = event
        .vehicle_id
        .parse()
        .map_err(|_| Error::InvalidVehicleId(event.vehicle_id.clone()))?;

    let rows = db
        .subscriptions()
        .find_subscribers(vehicle_id, event.category, Some(&event.raw_event_type))
        .await?;

    let recipients: BTreeSet<Recipient> = rows
        .into_iter()
        .map(|row| Recipient {
            chat_id: row.chat_id,
            truck_name: row.truck_name,
        })
        .collect();

    debug!(
        "Resolved {} recipient(s) for vehicle {} event {}",
        recipients.len(),
        vehicle_id,
        event.raw_event_type
    );

    Ok(recipients)
}
