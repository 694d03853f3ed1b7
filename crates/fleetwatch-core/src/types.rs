//! Core types for Fleetwatch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DISPLAY_TZ;
use crate::error::{Error, Result};

/// Subscription category - the three notification families
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Warning,
    EngineStatus,
    Timer,
}

impl Category {
    /// Numeric id as stored in the subscriptions table
    pub fn as_i64(&self) -> i64 {
        match self {
            Category::Warning => 1,
            Category::EngineStatus => 2,
            Category::Timer => 3,
        }
    }

    pub fn from_i64(id: i64) -> Result<Self> {
        match id {
            1 => Ok(Category::Warning),
            2 => Ok(Category::EngineStatus),
            3 => Ok(Category::Timer),
            other => Err(Error::InvalidCategory(other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Warning => "warning",
            Category::EngineStatus => "engine_status",
            Category::Timer => "timer",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A normalized inbound telemetry event, constructed once per webhook call
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub category: Category,
    /// Provider event type string, used as the sub-filter key
    pub raw_event_type: String,
    /// Provider-assigned vehicle id
    pub vehicle_id: String,
    pub occurred_at: DateTime<Utc>,
    pub description: String,
    pub is_resolved: bool,
    pub incident_url: Option<String>,
}

impl ClassifiedEvent {
    /// Event time formatted in the fixed display timezone
    pub fn display_time(&self) -> String {
        self.occurred_at
            .with_timezone(&DISPLAY_TZ)
            .format("%Y-%m-%d %I:%M:%S %p %Z")
            .to_string()
    }
}

/// A notification subscription row
///
/// Exactly one of the per-category field groups is populated, selected by
/// `category`. The constructors enforce this instead of an untyped bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    /// Chat recipient
    pub chat_id: i64,
    /// Provider vehicle id this subscription watches
    pub truck_id: i64,
    pub category: Category,
    /// Timer only: notification interval
    pub every_minutes: Option<i64>,
    /// Timer only: when the last timer notification went out
    pub last_sent_at: Option<DateTime<Utc>>,
    /// Warning only: warning sub-type filter
    pub warning_type: Option<String>,
    /// EngineStatus only: engine sub-state filter
    pub engine_status: Option<String>,
}

impl Subscription {
    pub fn warning(chat_id: i64, truck_id: i64, warning_type: impl Into<String>) -> Self {
        Self {
            id: 0,
            chat_id,
            truck_id,
            category: Category::Warning,
            every_minutes: None,
            last_sent_at: None,
            warning_type: Some(warning_type.into()),
            engine_status: None,
        }
    }

    pub fn engine_status(chat_id: i64, truck_id: i64, engine_status: impl Into<String>) -> Self {
        Self {
            id: 0,
            chat_id,
            truck_id,
            category: Category::EngineStatus,
            every_minutes: None,
            last_sent_at: None,
            warning_type: None,
            engine_status: Some(engine_status.into()),
        }
    }

    pub fn timer(chat_id: i64, truck_id: i64, every_minutes: i64) -> Self {
        Self {
            id: 0,
            chat_id,
            truck_id,
            category: Category::Timer,
            every_minutes: Some(every_minutes),
            last_sent_at: None,
            warning_type: None,
            engine_status: None,
        }
    }

    /// The sub-filter value for this subscription's category, if any
    pub fn sub_filter(&self) -> Option<&str> {
        match self.category {
            Category::Warning => self.warning_type.as_deref(),
            Category::EngineStatus => self.engine_status.as_deref(),
            Category::Timer => None,
        }
    }
}

/// A vehicle mirrored from the provider's roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Truck {
    pub id: i64,
    pub name: String,
    /// Provider-assigned vehicle id, unique within a company
    pub vehicle_id: i64,
    pub company_id: i64,
}

/// A tenant company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    /// Provider API key for this tenant
    pub api_key: String,
}

/// An operator/subscriber account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub chat_id: i64,
    pub full_name: String,
    /// Companies this user belongs to
    pub company_ids: Vec<i64>,
    pub balance: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_category_roundtrip() {
        for cat in [Category::Warning, Category::EngineStatus, Category::Timer] {
            assert_eq!(Category::from_i64(cat.as_i64()).unwrap(), cat);
        }
        assert!(Category::from_i64(7).is_err());
    }

    #[test]
    fn test_subscription_constructors() {
        let warn = Subscription::warning(100, 42, "GatewayUnplugged");
        assert_eq!(warn.category, Category::Warning);
        assert_eq!(warn.sub_filter(), Some("GatewayUnplugged"));
        assert!(warn.every_minutes.is_none());

        let engine = Subscription::engine_status(100, 42, "deviceMovement");
        assert_eq!(engine.category, Category::EngineStatus);
        assert_eq!(engine.sub_filter(), Some("deviceMovement"));

        let timer = Subscription::timer(100, 42, 30);
        assert_eq!(timer.category, Category::Timer);
        assert_eq!(timer.every_minutes, Some(30));
        assert!(timer.sub_filter().is_none());
    }

    #[test]
    fn test_display_time_eastern() {
        let event = ClassifiedEvent {
            category: Category::EngineStatus,
            raw_event_type: "deviceMovement".to_string(),
            vehicle_id: "42".to_string(),
            occurred_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            description: "Moving".to_string(),
            is_resolved: false,
            incident_url: None,
        };
        // Noon UTC is 07:00 AM Eastern in January
        let formatted = event.display_time();
        assert!(formatted.contains("07:00:00 AM"), "got: {}", formatted);
        assert!(formatted.contains("EST"));
    }
}
