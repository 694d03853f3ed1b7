//! Event classification
//!
//! Normalizes the provider's two webhook payload shapes into a
//! `ClassifiedEvent`. Composite alerts (`eventType == "AlertIncident"`) carry
//! the actual event type as the sole key of the first condition's `details`
//! object; every other event type is a direct telemetry event.

use chrono::{DateTime, Utc};
use fleetwatch_core::{Category, ClassifiedEvent};
use serde_json::Value;

/// Why a payload was dropped instead of classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("no conditions in payload")]
    MissingConditions,

    #[error("missing vehicle id or timestamp")]
    MissingFields,

    #[error("unparseable event timestamp")]
    BadTimestamp,
}

/// Provider event types that map to the Warning category
const WARNING_EVENTS: &[&str] = &[
    "SevereSpeedingStarted",
    "SevereSpeedingEnded",
    "SevereSpeedingStopped",
    "PredictiveMaintenanceAlert",
    "SuddenFuelLevelDrop",
    "SuddenFuelLevelRise",
    "GatewayUnplugged",
];

/// Provider event types that map to the EngineStatus category
const ENGINE_EVENTS: &[&str] = &["deviceMovement", "deviceMovementStopped"];

/// Category for a provider event type; unmapped types fall open to Warning
pub fn category_for(event_type: &str) -> Category {
    if ENGINE_EVENTS.contains(&event_type) {
        Category::EngineStatus
    } else if WARNING_EVENTS.contains(&event_type) {
        Category::Warning
    } else {
        Category::Warning
    }
}

/// Vehicle ids arrive as either JSON numbers or strings
fn value_as_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DropReason> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| DropReason::BadTimestamp)
}

/// Classify a raw webhook payload
pub fn classify(payload: &Value) -> Result<ClassifiedEvent, DropReason> {
    let event_type = payload["eventType"].as_str().unwrap_or_default();

    if event_type == "AlertIncident" {
        classify_composite(payload)
    } else {
        classify_direct(payload, event_type)
    }
}

/// Composite alert: the first condition's sole `details` key names the event
fn classify_composite(payload: &Value) -> Result<ClassifiedEvent, DropReason> {
    let data = &payload["data"];
    let condition = data["conditions"]
        .as_array()
        .and_then(|conditions| conditions.first())
        .ok_or(DropReason::MissingConditions)?;

    let details = condition["details"]
        .as_object()
        .ok_or(DropReason::MissingFields)?;
    let raw_event_type = details.keys().next().ok_or(DropReason::MissingFields)?.clone();

    let vehicle_id = value_as_id(&details[&raw_event_type]["vehicle"]["id"])
        .ok_or(DropReason::MissingFields)?;
    let occurred_at = data["happenedAtTime"]
        .as_str()
        .ok_or(DropReason::MissingFields)
        .and_then(parse_timestamp)?;

    let description = condition["description"]
        .as_str()
        .unwrap_or(&raw_event_type)
        .to_string();

    Ok(ClassifiedEvent {
        category: category_for(&raw_event_type),
        raw_event_type,
        vehicle_id,
        occurred_at,
        description,
        is_resolved: data["isResolved"].as_bool().unwrap_or(false),
        incident_url: data["incidentUrl"].as_str().map(String::from),
    })
}

/// Direct telemetry event: vehicle and start time live under `data.data`
fn classify_direct(payload: &Value, event_type: &str) -> Result<ClassifiedEvent, DropReason> {
    let inner = &payload["data"]["data"];

    let vehicle_id = value_as_id(&inner["vehicle"]["id"]).ok_or(DropReason::MissingFields)?;
    let occurred_at = inner["startTime"]
        .as_str()
        .ok_or(DropReason::MissingFields)
        .and_then(parse_timestamp)?;

    Ok(ClassifiedEvent {
        category: category_for(event_type),
        raw_event_type: event_type.to_string(),
        vehicle_id,
        occurred_at,
        description: event_type.to_string(),
        is_resolved: false,
        incident_url: None,
    })
}
