//! Road speed-limit lookup
//!
//! Resolves a road name to a posted speed limit: geocode the name, pull all
//! named ways around the coordinates from a map-data service, then
//! fuzzy-match the target name against the returned way names to recover a
//! `maxspeed` tag.

use crate::error::Result;
use async_trait::async_trait;
use fleetwatch_core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Default geocoding endpoint
pub const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Default map-data endpoint
pub const DEFAULT_WAY_QUERY_URL: &str = "https://overpass-api.de/api/interpreter";

/// Radius around the geocoded point to collect candidate ways, in meters
const SEARCH_RADIUS_METERS: u32 = 10_000;

/// Minimum similarity for a way name to count as a candidate
const SIMILARITY_CUTOFF: f64 = 0.4;

/// How many fuzzy-match candidates to consider
const MAX_CANDIDATES: usize = 10;

const USER_AGENT: &str = "fleetwatch-roadspeed";

/// Outcome of a speed-limit lookup; an explicit not-found, never a panic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadSpeedResult {
    /// A similar way with a posted limit was found
    Found { road: String, max_speed: String },
    /// The road name did not geocode to any coordinates
    NoCoordinates,
    /// No sufficiently similar way carried a posted limit
    NoMatch,
}

impl RoadSpeedResult {
    /// The posted limit, or an empty string when unknown
    pub fn max_speed(&self) -> &str {
        match self {
            RoadSpeedResult::Found { max_speed, .. } => max_speed,
            _ => "",
        }
    }
}

/// Pluggable scoring function for road-name similarity
pub trait SimilarityScorer: Send + Sync {
    /// Similarity in `[0, 1]`, higher is closer
    fn score(&self, a: &str, b: &str) -> f64;
}

/// Default scorer: normalized Levenshtein distance
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizedLevenshtein;

impl SimilarityScorer for NormalizedLevenshtein {
    fn score(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

/// Pick the closest-matching way names and keep those with a posted limit.
///
/// Candidates below the cutoff are dropped; the rest are ranked by score and
/// capped, mirroring a best-of-n closest-match selection.
pub fn find_similar_maxspeeds(
    target: &str,
    road_info: &HashMap<String, Option<String>>,
    scorer: &dyn SimilarityScorer,
) -> Vec<(String, String)> {
    let mut scored: Vec<(f64, &String)> = road_info
        .keys()
        .map(|name| (scorer.score(target, name), name))
        .filter(|(score, _)| *score >= SIMILARITY_CUTOFF)
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    scored
        .into_iter()
        .take(MAX_CANDIDATES)
        .filter_map(|(_, name)| {
            road_info[name]
                .as_ref()
                .map(|maxspeed| (name.clone(), maxspeed.clone()))
        })
        .collect()
}

/// Trait for the road speed-limit lookup, so the pipeline can be tested
/// without network calls
#[async_trait]
pub trait RoadSpeedLookup: Send + Sync {
    async fn max_speed_for(&self, road_name: &str) -> Result<RoadSpeedResult>;
}

/// Live lookup against geocoding and map-data services
pub struct RoadSpeedChecker {
    geocode_url: String,
    way_query_url: String,
    client: reqwest::Client,
    scorer: Box<dyn SimilarityScorer>,
}

impl Default for RoadSpeedChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl RoadSpeedChecker {
    /// Create a checker against the default services with the default scorer
    pub fn new() -> Self {
        Self::with_endpoints(DEFAULT_GEOCODE_URL, DEFAULT_WAY_QUERY_URL)
    }

    /// Create a checker against custom endpoints
    pub fn with_endpoints(geocode_url: impl Into<String>, way_query_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            geocode_url: geocode_url.into(),
            way_query_url: way_query_url.into(),
            client,
            scorer: Box::new(NormalizedLevenshtein),
        }
    }

    /// Swap in a different similarity scorer
    pub fn with_scorer(mut self, scorer: Box<dyn SimilarityScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Geocode a place name to coordinates
    async fn get_coordinates(&self, place_name: &str) -> Result<Option<(f64, f64)>> {
        let params = [
            ("q", place_name),
            ("format", "json"),
            ("limit", "1"),
        ];

        let response = self
            .client
            .get(&self.geocode_url)
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Geocoding error: {} for {:?}", response.status(), place_name);
            return Ok(None);
        }

        let data: Value = response.json().await?;
        let coords = data.as_array().and_then(|hits| hits.first()).and_then(|hit| {
            let lat = hit["lat"].as_str()?.parse().ok()?;
            let lon = hit["lon"].as_str()?.parse().ok()?;
            Some((lat, lon))
        });

        Ok(coords)
    }

    /// All named ways around a point, with their `maxspeed` tags
    async fn fetch_road_data(&self, lat: f64, lon: f64) -> Result<HashMap<String, Option<String>>> {
        let query = format!(
            "[out:json][timeout:25];\nway[\"name\"](around:{}, {}, {});\nout tags;",
            SEARCH_RADIUS_METERS, lat, lon
        );

        let response = self
            .client
            .post(&self.way_query_url)
            .body(query)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Way query error: {} near ({}, {})", response.status(), lat, lon);
            return Ok(HashMap::new());
        }

        let data: Value = response.json().await?;
        let mut road_info = HashMap::new();

        if let Some(elements) = data["elements"].as_array() {
            for element in elements {
                if let Some(name) = element["tags"]["name"].as_str() {
                    road_info.insert(
                        name.to_string(),
                        element["tags"]["maxspeed"].as_str().map(String::from),
                    );
                }
            }
        }

        Ok(road_info)
    }
}

#[async_trait]
impl RoadSpeedLookup for RoadSpeedChecker {
    async fn max_speed_for(&self, road_name: &str) -> Result<RoadSpeedResult> {
        let Some((lat, lon)) = self.get_coordinates(road_name).await? else {
            debug!("No coordinates for road {:?}", road_name);
            return Ok(RoadSpeedResult::NoCoordinates);
        };

        let road_info = self.fetch_road_data(lat, lon).await?;
        let matches = find_similar_maxspeeds(road_name, &road_info, self.scorer.as_ref());

        match matches.into_iter().next() {
            Some((road, max_speed)) => Ok(RoadSpeedResult::Found { road, max_speed }),
            None => Ok(RoadSpeedResult::NoMatch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn road_info(entries: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        entries
            .iter()
            .map(|(name, speed)| (name.to_string(), speed.map(String::from)))
            .collect()
    }

    #[test]
    fn test_scorer_orders_by_similarity() {
        let scorer = NormalizedLevenshtein;
        assert!(scorer.score("Main Street", "Main Street") > 0.99);
        assert!(scorer.score("Main Street", "Main St") > scorer.score("Main Street", "Oak Avenue"));
    }

    #[test]
    fn test_find_similar_prefers_closest_with_maxspeed() {
        let info = road_info(&[
            ("Main Street", Some("45 mph")),
            ("Main Street North", Some("35 mph")),
            ("Completely Different Road", Some("65 mph")),
        ]);

        let matches = find_similar_maxspeeds("Main Street", &info, &NormalizedLevenshtein);
        assert_eq!(matches[0], ("Main Street".to_string(), "45 mph".to_string()));
    }

    #[test]
    fn test_find_similar_skips_ways_without_maxspeed() {
        let info = road_info(&[
            ("Main Street", None),
            ("Main Street East", Some("40 mph")),
        ]);

        let matches = find_similar_maxspeeds("Main Street", &info, &NormalizedLevenshtein);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].1, "40 mph");
    }

    #[test]
    fn test_find_similar_respects_cutoff() {
        let info = road_info(&[("Zzyzx Road", Some("55 mph"))]);
        let matches = find_similar_maxspeeds("Main Street", &info, &NormalizedLevenshtein);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_result_max_speed_accessor() {
        let found = RoadSpeedResult::Found {
            road: "Main Street".to_string(),
            max_speed: "45 mph".to_string(),
        };
        assert_eq!(found.max_speed(), "45 mph");
        assert_eq!(RoadSpeedResult::NoMatch.max_speed(), "");
        assert_eq!(RoadSpeedResult::NoCoordinates.max_speed(), "");
    }
}
