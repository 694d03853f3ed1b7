//! In-memory fakes for the provider API and the road speed lookup

use crate::error::Result;
use crate::roadspeed::{RoadSpeedLookup, RoadSpeedResult};
use crate::{FleetApi, GpsSample, HarshEventDetail, VehicleSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Configurable fake provider for tests
#[derive(Default)]
pub struct MockFleet {
    vehicles: Mutex<Vec<VehicleSummary>>,
    engine_states: Mutex<HashMap<i64, String>>,
    fuel_percents: Mutex<HashMap<i64, f64>>,
    harsh_details: Mutex<HashMap<i64, HarshEventDetail>>,
    gps_samples: Mutex<HashMap<i64, GpsSample>>,
    call_count: AtomicUsize,
}

impl MockFleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_vehicles(&self, vehicles: Vec<VehicleSummary>) {
        *self.vehicles.lock().unwrap() = vehicles;
    }

    pub fn set_engine_state(&self, vehicle_id: i64, state: &str) {
        self.engine_states
            .lock()
            .unwrap()
            .insert(vehicle_id, state.to_string());
    }

    pub fn set_fuel_percent(&self, vehicle_id: i64, percent: f64) {
        self.fuel_percents.lock().unwrap().insert(vehicle_id, percent);
    }

    pub fn set_harsh_detail(&self, vehicle_id: i64, detail: HarshEventDetail) {
        self.harsh_details.lock().unwrap().insert(vehicle_id, detail);
    }

    pub fn set_gps_sample(&self, vehicle_id: i64, sample: GpsSample) {
        self.gps_samples.lock().unwrap().insert(vehicle_id, sample);
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn record_call(&self) {
        self.call_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl FleetApi for MockFleet {
    async fn get_vehicle_list(&self, _api_key: &str) -> Result<Vec<VehicleSummary>> {
        self.record_call();
        Ok(self.vehicles.lock().unwrap().clone())
    }

    async fn get_engine_state(&self, _api_key: &str, vehicle_id: i64) -> Result<Option<String>> {
        self.record_call();
        Ok(self.engine_states.lock().unwrap().get(&vehicle_id).cloned())
    }

    async fn get_fuel_percent(&self, _api_key: &str, vehicle_id: i64) -> Result<Option<f64>> {
        self.record_call();
        Ok(self.fuel_percents.lock().unwrap().get(&vehicle_id).copied())
    }

    async fn get_harsh_event_detail(
        &self,
        _api_key: &str,
        vehicle_id: i64,
        _timestamp_ms: i64,
    ) -> Result<Option<HarshEventDetail>> {
        self.record_call();
        Ok(self.harsh_details.lock().unwrap().get(&vehicle_id).cloned())
    }

    async fn get_short_window_gps(
        &self,
        _api_key: &str,
        vehicle_id: i64,
        _start: DateTime<Utc>,
    ) -> Result<Option<GpsSample>> {
        self.record_call();
        Ok(self.gps_samples.lock().unwrap().get(&vehicle_id).cloned())
    }
}

/// Fake road speed lookup returning a canned result
pub struct MockRoadSpeed {
    result: Mutex<RoadSpeedResult>,
    call_count: AtomicUsize,
}

impl Default for MockRoadSpeed {
    fn default() -> Self {
        Self {
            result: Mutex::new(RoadSpeedResult::NoCoordinates),
            call_count: AtomicUsize::new(0),
        }
    }
}

impl MockRoadSpeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// A lookup that always resolves to the given limit
    pub fn with_limit(road: &str, max_speed: &str) -> Self {
        Self {
            result: Mutex::new(RoadSpeedResult::Found {
                road: road.to_string(),
                max_speed: max_speed.to_string(),
            }),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn set_result(&self, result: RoadSpeedResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoadSpeedLookup for MockRoadSpeed {
    async fn max_speed_for(&self, _road_name: &str) -> Result<RoadSpeedResult> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_fleet_returns_configured_state() {
        let fleet = MockFleet::new();
        fleet.set_engine_state(7, "Running");
        fleet.set_fuel_percent(7, 62.5);

        assert_eq!(
            fleet.get_engine_state("key", 7).await.unwrap().as_deref(),
            Some("Running")
        );
        assert_eq!(fleet.get_fuel_percent("key", 7).await.unwrap(), Some(62.5));
        assert_eq!(fleet.get_engine_state("key", 8).await.unwrap(), None);
        assert_eq!(fleet.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_road_speed_canned_result() {
        let roads = MockRoadSpeed::with_limit("Main Street", "45 mph");
        let result = roads.max_speed_for("Main St").await.unwrap();
        assert_eq!(result.max_speed(), "45 mph");
        assert_eq!(roads.call_count(), 1);
    }
}
