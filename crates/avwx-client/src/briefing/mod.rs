// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Route weather briefings.
//!
//! Builds per-station summaries from METAR lists, combines a departure and
//! an arrival summary into a route briefing, and tallies AIR/SIGMET
//! advisories by hazard.

use std::collections::HashMap;
use std::fmt::Write as _;

use log::info;
use serde::Serialize;

use crate::api::{normalize_icao, ApiError};
use crate::observation::DecodedObservation;
use crate::products::AirSigmet;
use crate::severity::{classify, SeverityLevel, NO_METAR_DATA};

const NAUTICAL_MILE_CONVERSION: f64 = 1.15078; // 1 nautical mile = 1.15078 statute miles
const EARTH_RADIUS_MILES: f64 = 3958.8;
const UNKNOWN_HAZARD: &str = "Unknown";

/// Calculate distance between two lat/lon points using Haversine formula (in miles).
fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

/// Calculate distance in nautical miles between two lat/lon points.
#[must_use]
pub fn haversine_distance_nm(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_distance(lat1, lon1, lat2, lon2) / NAUTICAL_MILE_CONVERSION
}

/// Weather summary for one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    /// ICAO station identifier.
    pub station: String,
    /// One-line description, or the no-data label.
    pub summary_text: String,
    /// Severity of the latest observation; `None` when there was none.
    pub level: Option<SeverityLevel>,
    /// Latest observation, kept for position and raw text.
    #[serde(skip)]
    pub latest: Option<DecodedObservation>,
}

impl StationSummary {
    /// Summarize the newest entry of a METAR list.
    #[must_use]
    pub fn from_observations(station: &str, observations: &[DecodedObservation]) -> Self {
        let Some(latest) = observations.first() else {
            return Self {
                station: station.to_string(),
                summary_text: NO_METAR_DATA.to_string(),
                level: None,
                latest: None,
            };
        };

        let station = if latest.station.is_empty() {
            station.to_string()
        } else {
            latest.station.clone()
        };

        Self {
            summary_text: describe(&station, latest),
            station,
            level: Some(classify(latest)),
            latest: Some(latest.clone()),
        }
    }

    /// Station position from the latest observation.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latest.as_ref().and_then(DecodedObservation::position)
    }
}

fn describe(station: &str, obs: &DecodedObservation) -> String {
    let mut text = station.to_string();
    if let Some(category) = obs.flight_category {
        let _ = write!(text, " {category}");
    }
    let _ = write!(
        text,
        ": visibility {} SM, wind {} kt",
        obs.visibility(),
        obs.wind_speed()
    );
    if obs.has_ceiling() {
        let _ = write!(text, ", ceiling {} ft", obs.ceiling_feet());
    } else {
        text.push_str(", no ceiling");
    }
    if !obs.phenomena().is_empty() {
        let _ = write!(text, ", weather {}", obs.phenomena());
    }
    text
}

/// Validate and normalize a departure/arrival pair.
pub fn normalize_route(departure: &str, arrival: &str) -> Result<(String, String), ApiError> {
    normalize_icao(departure)
        .zip(normalize_icao(arrival))
        .ok_or(ApiError::IncompleteRoute)
}

/// Weather briefing for a departure/arrival pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteBriefing {
    pub departure: StationSummary,
    pub arrival: StationSummary,
    /// Great-circle distance, when both stations report a position.
    pub distance_nm: Option<f64>,
}

impl RouteBriefing {
    /// Combine the METAR lists of both ends of the route.
    #[must_use]
    pub fn new(
        departure: &str,
        departure_obs: &[DecodedObservation],
        arrival: &str,
        arrival_obs: &[DecodedObservation],
    ) -> Self {
        let departure = StationSummary::from_observations(departure, departure_obs);
        let arrival = StationSummary::from_observations(arrival, arrival_obs);

        let distance_nm = match (departure.position(), arrival.position()) {
            (Some((lat1, lon1)), Some((lat2, lon2))) => {
                Some(haversine_distance_nm(lat1, lon1, lat2, lon2))
            }
            _ => None,
        };

        info!(
            "Briefing {} -> {}: {:?} / {:?}",
            departure.station, arrival.station, departure.level, arrival.level
        );

        Self {
            departure,
            arrival,
            distance_nm,
        }
    }

    /// Worst severity along the route; `None` only when neither end has data.
    #[must_use]
    pub fn overall(&self) -> Option<SeverityLevel> {
        self.departure.level.max(self.arrival.level)
    }
}

/// Number of advisories for one hazard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HazardCount {
    pub hazard: String,
    pub count: usize,
}

/// Count advisories per hazard, most frequent first.
///
/// Advisories without a hazard are counted as "Unknown". Ties are ordered by
/// hazard name.
#[must_use]
pub fn count_by_hazard(advisories: &[AirSigmet]) -> Vec<HazardCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for advisory in advisories {
        let hazard = advisory
            .hazard
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(UNKNOWN_HAZARD);
        *counts.entry(hazard).or_insert(0) += 1;
    }

    let mut counts: Vec<HazardCount> = counts
        .into_iter()
        .map(|(hazard, count)| HazardCount {
            hazard: hazard.to_string(),
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.hazard.cmp(&b.hazard)));
    counts
}
