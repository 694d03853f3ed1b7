//! Fleetwatch Fleet API - provider REST client and road speed lookup

mod client;
mod error;
pub mod mock;
pub mod roadspeed;

pub use client::FleetClient;
pub use error::{FleetError, Result};
pub use roadspeed::{
    NormalizedLevenshtein, RoadSpeedChecker, RoadSpeedLookup, RoadSpeedResult, SimilarityScorer,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A vehicle as listed by the provider roster endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleSummary {
    pub id: i64,
    pub name: String,
}

/// Detail record for a harsh-driving event
#[derive(Debug, Clone, PartialEq)]
pub struct HarshEventDetail {
    pub video_url: Option<String>,
    pub address: String,
    pub harsh_event_type: String,
}

/// One GPS sample from the short-window location history
#[derive(Debug, Clone, PartialEq)]
pub struct GpsSample {
    /// Reverse-geocoded formatted address
    pub address: String,
    pub speed_mph: f64,
}

/// Trait for the fleet provider API
///
/// Every call takes the tenant API key; one shared client serves all
/// companies.
#[async_trait]
pub trait FleetApi: Send + Sync {
    /// Fetch the provider's current vehicle roster
    async fn get_vehicle_list(&self, api_key: &str) -> Result<Vec<VehicleSummary>>;

    /// Latest engine state for a vehicle, if the provider has one
    async fn get_engine_state(&self, api_key: &str, vehicle_id: i64) -> Result<Option<String>>;

    /// Latest fuel level percentage for a vehicle
    async fn get_fuel_percent(&self, api_key: &str, vehicle_id: i64) -> Result<Option<f64>>;

    /// Detail record (video, location, type) for a harsh-driving event
    async fn get_harsh_event_detail(
        &self,
        api_key: &str,
        vehicle_id: i64,
        timestamp_ms: i64,
    ) -> Result<Option<HarshEventDetail>>;

    /// Most recent GPS sample in a short window anchored at `start`
    async fn get_short_window_gps(
        &self,
        api_key: &str,
        vehicle_id: i64,
        start: DateTime<Utc>,
    ) -> Result<Option<GpsSample>>;
}
