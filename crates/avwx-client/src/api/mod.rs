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

//! Request definitions for the aviation weather data API.
//!
//! Each endpoint is described by a type implementing [`Request`], which names
//! the path, the query parameters and the JSON response type. The transport
//! lives in [`crate::http`].

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::observation::DecodedObservation;
use crate::products::{AirSigmet, InternationalSigmet, Pirep, Taf};

/// Errors that can occur while talking to the weather service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("{0} airport code is required")]
    MissingStation(&'static str),

    #[error("Both Departure and Arrival airport codes are required.")]
    IncompleteRoute,

    #[error("No METAR report available")]
    NoMetarReport,
}

/// Trait for API endpoint requests.
///
/// Implement this trait to add support for another product endpoint.
pub trait Request {
    /// The decoded response body.
    type Response: DeserializeOwned + Default;

    /// Path relative to the API base URL, starting with `/`.
    fn path(&self) -> &'static str;

    /// Query parameters, excluding `format` which the client adds.
    fn query(&self) -> Vec<(&'static str, String)>;
}

/// Normalize a user-entered ICAO code: trimmed and upper-cased.
///
/// Returns `None` for blank input.
#[must_use]
pub fn normalize_icao(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_ascii_uppercase())
    }
}

/// Recent METAR observations for one or more stations.
#[derive(Debug, Clone, PartialEq)]
pub struct MetarRequest {
    /// Comma-separated ICAO identifiers.
    pub ids: String,
    /// Look-back window in hours.
    pub hours: f64,
}

impl MetarRequest {
    pub const DEFAULT_HOURS: f64 = 1.5;

    #[must_use]
    pub fn new(ids: &str) -> Self {
        Self {
            ids: ids.trim().to_ascii_uppercase(),
            hours: Self::DEFAULT_HOURS,
        }
    }

    #[must_use]
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours = hours;
        self
    }
}

impl Request for MetarRequest {
    type Response = Vec<DecodedObservation>;

    fn path(&self) -> &'static str {
        "/metar"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("ids", self.ids.clone()), ("hours", self.hours.to_string())]
    }
}

/// Terminal aerodrome forecasts for one or more stations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TafRequest {
    pub ids: String,
}

impl TafRequest {
    #[must_use]
    pub fn new(ids: &str) -> Self {
        Self {
            ids: ids.trim().to_ascii_uppercase(),
        }
    }
}

impl Request for TafRequest {
    type Response = Vec<Taf>;

    fn path(&self) -> &'static str {
        "/taf"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![("ids", self.ids.clone())]
    }
}

/// Pilot reports within a radius of an airport or navaid.
#[derive(Debug, Clone, PartialEq)]
pub struct PirepRequest {
    pub center: String,
    pub hours: f64,
    /// Search radius in nautical miles.
    pub distance_nm: u32,
}

impl PirepRequest {
    pub const DEFAULT_HOURS: f64 = 2.0;
    pub const DEFAULT_DISTANCE_NM: u32 = 100;

    #[must_use]
    pub fn new(center: &str) -> Self {
        Self {
            center: center.trim().to_ascii_uppercase(),
            hours: Self::DEFAULT_HOURS,
            distance_nm: Self::DEFAULT_DISTANCE_NM,
        }
    }

    #[must_use]
    pub fn with_hours(mut self, hours: f64) -> Self {
        self.hours = hours;
        self
    }

    #[must_use]
    pub fn with_distance(mut self, distance_nm: u32) -> Self {
        self.distance_nm = distance_nm;
        self
    }
}

impl Request for PirepRequest {
    type Response = Vec<Pirep>;

    fn path(&self) -> &'static str {
        "/pirep"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("hours", self.hours.to_string()),
            ("center", self.center.clone()),
            ("distance", self.distance_nm.to_string()),
        ]
    }
}

/// International SIGMETs filtered by hazard and flight level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternationalSigmetRequest {
    pub hazard: String,
    /// Altitude in feet the advisory must cover.
    pub level: u32,
    /// Optional ISO 8601 issue date; the service uses "now" when absent.
    pub date: Option<String>,
}

impl Default for InternationalSigmetRequest {
    fn default() -> Self {
        Self {
            hazard: "turb".to_string(),
            level: 3000,
            date: None,
        }
    }
}

impl Request for InternationalSigmetRequest {
    type Response = Vec<InternationalSigmet>;

    fn path(&self) -> &'static str {
        "/isigmet"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("hazard", self.hazard.clone()),
            ("level", self.level.to_string()),
        ];
        if let Some(date) = &self.date {
            query.push(("date", date.clone()));
        }
        query
    }
}

/// Domestic (U.S.) AIRMETs and SIGMETs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AirSigmetRequest;

impl Request for AirSigmetRequest {
    type Response = Vec<AirSigmet>;

    fn path(&self) -> &'static str {
        "/airsigmet"
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}
