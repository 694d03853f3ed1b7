//! Message rendering
//!
//! Turns a classified (and possibly enriched) event into Markdown chat
//! messages. The shared body is rendered once per event; the per-recipient
//! truck-name suffix is appended last.

use crate::enricher::Enrichment;
use fleetwatch_core::ClassifiedEvent;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub text: String,
    /// Inline "Incident Details" button target
    pub button_url: Option<String>,
    /// When present the message goes out as a video with caption
    pub video_url: Option<String>,
}

/// Title line for a plain (unenriched) event type
fn plain_title(raw_event_type: &str) -> &'static str {
    match raw_event_type {
        "deviceMovement" => "🚛 *Truck Started Moving* 🚛",
        "deviceMovementStopped" => "🛑 *Truck Stopped Moving* 🛑",
        "SuddenFuelLevelRise" => "🚨 *Sudden Fuel Level Rise Detected* 🚨",
        "SuddenFuelLevelDrop" => "🚨 *Sudden Fuel Level Drop Detected* 🚨",
        "GatewayUnplugged" => "🚨 *Gateway Unplugged* 🚨",
        _ => "🚨 *Fleet Alert* 🚨",
    }
}

/// Render the shared (recipient-independent) message body
pub fn render_body(event: &ClassifiedEvent, enrichment: Option<&Enrichment>) -> String {
    let time = event.display_time();

    let mut text = match enrichment {
        Some(Enrichment::Harsh {
            location,
            harsh_event_type,
            ..
        }) => format!(
            "⚠️ *Harsh Driving Detected* ⚠️\n\
             📢 *Event*: {}\n\
             ⏰ *Time*: {}\n\
             📍 *Location*: {}\n\
             ⚠️ *Harsh Event Type:* {} ⚠️\n",
            event.description, time, location, harsh_event_type
        ),
        Some(Enrichment::Speeding {
            location,
            speed_mph,
            max_speed,
        }) => format!(
            "⚠️ *Severe Speeding Detected* ⚠️\n\
             📢 *Event*: {}\n\
             ⏰ *Time*: {}\n\
             📍 *Location*: {}\n\
             ⚠️ *Speed*: {} ⚠️\n\
             ⚠️ *Max Speed*: {} ⚠️\n",
            event.description, time, location, speed_mph, max_speed
        ),
        None => format!(
            "{}\n📢 *Event*: {}\n⏰ *Time*: {}\n",
            plain_title(&event.raw_event_type),
            event.description,
            time
        ),
    };

    if event.is_resolved {
        text.push_str("✅ *Status*: Resolved\n");
    }

    text
}

/// Render the full per-recipient message
pub fn render(
    event: &ClassifiedEvent,
    enrichment: Option<&Enrichment>,
    truck_name: &str,
) -> RenderedMessage {
    let text = format!(
        "{}🚛 *Truck Name*: {}",
        render_body(event, enrichment),
        truck_name
    );

    // Speeding messages go out without the incident button
    let button_url = match enrichment {
        Some(Enrichment::Speeding { .. }) => None,
        _ => event.incident_url.clone(),
    };

    let video_url = match enrichment {
        Some(Enrichment::Harsh { video_url, .. }) => video_url.clone(),
        _ => None,
    };

    RenderedMessage {
        text,
        button_url,
        video_url,
    }
}

fn engine_emoji(state: &str) -> &'static str {
    match state {
        "Running" | "On" => "🟢",
        "Stopped" => "🔴",
        "Off" => "⚫️",
        "Idle" => "🟡",
        _ => "⚪️",
    }
}

/// Render the periodic timer status message for a truck
pub fn render_timer_status(
    truck_name: &str,
    engine_state: Option<&str>,
    fuel_percent: Option<f64>,
) -> String {
    let state = engine_state.unwrap_or("Unknown");
    let mut text = format!(
        "🚛 *Truck Name*: {}\n🚥 *Engine*: {} {}\n",
        truck_name,
        engine_emoji(state),
        state
    );

    if let Some(fuel) = fuel_percent {
        text.push_str(&format!("⛽ *Fuel*: {:.0}%\n", fuel));
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fleetwatch_core::Category;

    fn event(raw: &str) -> ClassifiedEvent {
        ClassifiedEvent {
            category: Category::Warning,
            raw_event_type: raw.to_string(),
            vehicle_id: "42".to_string(),
            occurred_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
            description: "Alert fired".to_string(),
            is_resolved: false,
            incident_url: None,
        }
    }

    #[test]
    fn test_plain_movement_message() {
        let rendered = render(&event("deviceMovement"), None, "Unit 7");
        assert!(rendered.text.starts_with("🚛 *Truck Started Moving* 🚛"));
        assert!(rendered.text.contains("📢 *Event*: Alert fired"));
        assert!(rendered.text.ends_with("🚛 *Truck Name*: Unit 7"));
        assert!(rendered.button_url.is_none());
        assert!(rendered.video_url.is_none());
    }

    #[test]
    fn test_unmapped_event_gets_fallback_title() {
        let rendered = render(&event("somethingNew"), None, "Unit 7");
        assert!(rendered.text.starts_with("🚨 *Fleet Alert* 🚨"));
    }

    #[test]
    fn test_resolved_appends_status_line() {
        let mut resolved = event("GatewayUnplugged");
        resolved.is_resolved = true;
        let body = render_body(&resolved, None);
        assert!(body.contains("✅ *Status*: Resolved\n"));
    }

    #[test]
    fn test_harsh_message_carries_video_and_button() {
        let mut harsh = event("harshEvent");
        harsh.incident_url = Some("https://cloud.example.com/safety/events/42/1717245000000".to_string());

        let enrichment = Enrichment::Harsh {
            video_url: Some("https://cdn.example.com/v.mp4".to_string()),
            location: "I-80, Omaha NE".to_string(),
            harsh_event_type: "Harsh Brake".to_string(),
        };
        let rendered = render(&harsh, Some(&enrichment), "Unit 7");

        assert!(rendered.text.starts_with("⚠️ *Harsh Driving Detected* ⚠️"));
        assert!(rendered.text.contains("📍 *Location*: I-80, Omaha NE"));
        assert!(rendered.text.contains("⚠️ *Harsh Event Type:* Harsh Brake ⚠️"));
        assert_eq!(rendered.video_url.as_deref(), Some("https://cdn.example.com/v.mp4"));
        assert_eq!(
            rendered.button_url.as_deref(),
            Some("https://cloud.example.com/safety/events/42/1717245000000")
        );
    }

    #[test]
    fn test_speeding_message_has_no_button() {
        let mut speeding = event("SevereSpeedingStarted");
        speeding.incident_url = Some("https://cloud.example.com/incident/1".to_string());

        let enrichment = Enrichment::Speeding {
            location: "Main Street, Springfield".to_string(),
            speed_mph: 82.0,
            max_speed: "45 mph".to_string(),
        };
        let rendered = render(&speeding, Some(&enrichment), "Unit 7");

        assert!(rendered.text.contains("⚠️ *Speed*: 82 ⚠️"));
        assert!(rendered.text.contains("⚠️ *Max Speed*: 45 mph ⚠️"));
        assert!(rendered.button_url.is_none());
    }

    #[test]
    fn test_timer_status_message() {
        let text = render_timer_status("Unit 7", Some("Running"), Some(62.4));
        assert!(text.contains("🚛 *Truck Name*: Unit 7"));
        assert!(text.contains("🚥 *Engine*: 🟢 Running"));
        assert!(text.contains("⛽ *Fuel*: 62%"));

        let unknown = render_timer_status("Unit 7", None, None);
        assert!(unknown.contains("⚪️ Unknown"));
        assert!(!unknown.contains("⛽"));
    }
}
