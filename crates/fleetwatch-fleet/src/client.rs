//! REST client for the fleet telemetry provider

use crate::error::Result;
use crate::{FleetApi, GpsSample, HarshEventDetail, VehicleSummary};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use fleetwatch_core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use serde_json::Value;
use tracing::{debug, warn};

/// Default provider API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.samsara.com";

/// Width of the short GPS window used for speeding lookups
const GPS_WINDOW_MS: i64 = 2_000;

/// Lookback window for vehicle stats queries
fn stats_lookback() -> Duration {
    Duration::hours(1)
}

/// Accept ids the provider serializes as either numbers or strings
fn value_as_i64(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}

/// REST client for the fleet provider API
pub struct FleetClient {
    base_url: String,
    client: reqwest::Client,
}

impl Default for FleetClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FleetClient {
    /// Create a client against the default provider endpoint
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (useful for testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// GET an endpoint, returning None on any non-success response
    async fn fetch(
        &self,
        api_key: &str,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Option<Value>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("Fetching {} with {} params", url, params.len());

        let response = self
            .client
            .get(&url)
            .bearer_auth(api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Provider error: {} - {} at {}", status, body, url);
            return Ok(None);
        }

        Ok(Some(response.json().await?))
    }
}

#[async_trait]
impl FleetApi for FleetClient {
    async fn get_vehicle_list(&self, api_key: &str) -> Result<Vec<VehicleSummary>> {
        let Some(data) = self.fetch(api_key, "fleet/vehicles", &[]).await? else {
            return Ok(Vec::new());
        };

        let vehicles = data["data"]
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        Some(VehicleSummary {
                            id: value_as_i64(&entry["id"])?,
                            name: entry["name"].as_str()?.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(vehicles)
    }

    async fn get_engine_state(&self, api_key: &str, vehicle_id: i64) -> Result<Option<String>> {
        let end = Utc::now();
        let start = end - stats_lookback();
        let params = [
            ("types", "engineStates".to_string()),
            ("vehicleId", vehicle_id.to_string()),
            ("startMs", start.timestamp_millis().to_string()),
            ("endMs", end.timestamp_millis().to_string()),
        ];

        let Some(data) = self
            .fetch(api_key, "v1/fleet/vehicles/stats", &params)
            .await?
        else {
            return Ok(None);
        };

        let Some(stats) = data["vehicleStats"].as_array() else {
            return Ok(None);
        };

        for vehicle in stats {
            if value_as_i64(&vehicle["vehicleId"]) != Some(vehicle_id) {
                continue;
            }
            let state = vehicle["engineState"]
                .as_array()
                .and_then(|states| states.last())
                .and_then(|latest| latest["value"].as_str())
                .map(|s| s.to_string());
            return Ok(state);
        }

        Ok(None)
    }

    async fn get_fuel_percent(&self, api_key: &str, vehicle_id: i64) -> Result<Option<f64>> {
        let end = Utc::now();
        let start = end - stats_lookback();
        let params = [
            ("types", "fuelPercents".to_string()),
            ("vehicleId", vehicle_id.to_string()),
            ("startMs", start.timestamp_millis().to_string()),
            ("endMs", end.timestamp_millis().to_string()),
        ];

        let Some(data) = self.fetch(api_key, "fleet/vehicles/stats", &params).await? else {
            return Ok(None);
        };

        let Some(entries) = data["data"].as_array() else {
            return Ok(None);
        };

        for vehicle in entries {
            if value_as_i64(&vehicle["id"]) != Some(vehicle_id) {
                continue;
            }
            return Ok(vehicle["fuelPercent"]["value"].as_f64());
        }

        Ok(None)
    }

    async fn get_harsh_event_detail(
        &self,
        api_key: &str,
        vehicle_id: i64,
        timestamp_ms: i64,
    ) -> Result<Option<HarshEventDetail>> {
        let endpoint = format!("v1/fleet/vehicles/{}/safety/harsh_event", vehicle_id);
        let params = [("timestamp", timestamp_ms.to_string())];

        let Some(data) = self.fetch(api_key, &endpoint, &params).await? else {
            return Ok(None);
        };

        let Some(harsh_event_type) = data["harshEventType"].as_str() else {
            return Ok(None);
        };

        Ok(Some(HarshEventDetail {
            video_url: data["downloadForwardVideoUrl"].as_str().map(String::from),
            address: data["location"]["address"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            harsh_event_type: harsh_event_type.to_string(),
        }))
    }

    async fn get_short_window_gps(
        &self,
        api_key: &str,
        vehicle_id: i64,
        start: DateTime<Utc>,
    ) -> Result<Option<GpsSample>> {
        let start_ms = start.timestamp_millis();
        let endpoint = format!("v1/fleet/vehicles/{}/locations", vehicle_id);
        let params = [
            ("startMs", start_ms.to_string()),
            ("endMs", (start_ms + GPS_WINDOW_MS).to_string()),
        ];

        let Some(data) = self.fetch(api_key, &endpoint, &params).await? else {
            return Ok(None);
        };

        let sample = data
            .as_array()
            .and_then(|samples| samples.last())
            .map(|last| GpsSample {
                address: last["location"].as_str().unwrap_or_default().to_string(),
                speed_mph: last["speedMilesPerHour"].as_f64().unwrap_or(0.0),
            });

        Ok(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_i64_accepts_both_shapes() {
        assert_eq!(value_as_i64(&json!(42)), Some(42));
        assert_eq!(value_as_i64(&json!("42")), Some(42));
        assert_eq!(value_as_i64(&json!("not a number")), None);
        assert_eq!(value_as_i64(&json!(null)), None);
    }

    #[test]
    fn test_default_base_url() {
        let client = FleetClient::new();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
    }
}
