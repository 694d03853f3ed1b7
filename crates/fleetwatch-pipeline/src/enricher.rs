//! Event enrichment
//!
//! Two event families need extra provider data before rendering: harsh
//! driving (video, location, concrete harsh type, keyed off the incident
//! URL) and severe speeding (GPS location and speed, plus the posted road
//! speed limit). Everything else passes through unenriched.

use crate::error::Result;
use fleetwatch_core::ClassifiedEvent;
use fleetwatch_db::Database;
use fleetwatch_fleet::{FleetApi, RoadSpeedLookup};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Extra provider data attached to an event before rendering
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment {
    Harsh {
        video_url: Option<String>,
        location: String,
        harsh_event_type: String,
    },
    Speeding {
        location: String,
        speed_mph: f64,
        max_speed: String,
    },
}

fn incident_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)/(\d+)$").expect("static pattern"))
}

/// Pull `(vehicle_id, timestamp_ms)` off the tail of an incident URL
pub fn parse_incident_url(url: &str) -> Option<(i64, i64)> {
    let captures = incident_url_regex().captures(url)?;
    let vehicle_id = captures.get(1)?.as_str().parse().ok()?;
    let timestamp_ms = captures.get(2)?.as_str().parse().ok()?;
    Some((vehicle_id, timestamp_ms))
}

/// Whether rendering this event without enrichment would be wrong
pub fn requires_enrichment(event: &ClassifiedEvent) -> bool {
    match event.raw_event_type.as_str() {
        "harshEvent" => event.incident_url.is_some(),
        "SevereSpeedingStarted" | "SevereSpeedingStopped" => true,
        _ => false,
    }
}

/// Enriches events with provider detail lookups
pub struct EventEnricher {
    db: Arc<Database>,
    fleet: Arc<dyn FleetApi>,
    roads: Arc<dyn RoadSpeedLookup>,
}

impl EventEnricher {
    pub fn new(db: Arc<Database>, fleet: Arc<dyn FleetApi>, roads: Arc<dyn RoadSpeedLookup>) -> Self {
        Self { db, fleet, roads }
    }

    /// Enrich an event if its family calls for it.
    ///
    /// `Ok(None)` for an event that needs enrichment means the lookup came
    /// up empty; the caller suppresses delivery in that case.
    pub async fn enrich(&self, event: &ClassifiedEvent) -> Result<Option<Enrichment>> {
        match event.raw_event_type.as_str() {
            "harshEvent" if event.incident_url.is_some() => self.enrich_harsh(event).await,
            "SevereSpeedingStarted" | "SevereSpeedingStopped" => self.enrich_speeding(event).await,
            _ => Ok(None),
        }
    }

    async fn enrich_harsh(&self, event: &ClassifiedEvent) -> Result<Option<Enrichment>> {
        let url = event.incident_url.as_deref().unwrap_or_default();
        let Some((vehicle_id, timestamp_ms)) = parse_incident_url(url) else {
            warn!("Incident URL has no vehicle/timestamp suffix: {}", url);
            return Ok(None);
        };

        let Some(api_key) = self.db.trucks().api_key_for_vehicle(vehicle_id).await? else {
            warn!("No tenant API key for vehicle {}", vehicle_id);
            return Ok(None);
        };

        let Some(detail) = self
            .fleet
            .get_harsh_event_detail(&api_key, vehicle_id, timestamp_ms)
            .await?
        else {
            warn!("No harsh event detail for vehicle {}", vehicle_id);
            return Ok(None);
        };

        Ok(Some(Enrichment::Harsh {
            video_url: detail.video_url,
            location: detail.address,
            harsh_event_type: detail.harsh_event_type,
        }))
    }

    async fn enrich_speeding(&self, event: &ClassifiedEvent) -> Result<Option<Enrichment>> {
        let Ok(vehicle_id) = event.vehicle_id.parse::<i64>() else {
            warn!("Non-numeric vehicle id in speeding event: {}", event.vehicle_id);
            return Ok(None);
        };

        let Some(api_key) = self.db.trucks().api_key_for_vehicle(vehicle_id).await? else {
            warn!("No tenant API key for vehicle {}", vehicle_id);
            return Ok(None);
        };

        let Some(sample) = self
            .fleet
            .get_short_window_gps(&api_key, vehicle_id, event.occurred_at)
            .await?
        else {
            warn!("No GPS sample for vehicle {} near event time", vehicle_id);
            return Ok(None);
        };

        // A missing speed limit is rendered empty rather than suppressing
        // the notification.
        let max_speed = match self.roads.max_speed_for(&sample.address).await {
            Ok(result) => result.max_speed().to_string(),
            Err(e) => {
                warn!("Road speed lookup failed for {:?}: {}", sample.address, e);
                String::new()
            }
        };

        Ok(Some(Enrichment::Speeding {
            location: sample.address,
            speed_mph: sample.speed_mph,
            max_speed,
        }))
    }
}
