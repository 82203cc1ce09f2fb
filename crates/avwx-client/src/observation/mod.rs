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

//! Decoded METAR observations.
//!
//! Records are deserialized from the JSON METAR product. Every field the API
//! may omit is kept as an `Option` and read through an accessor that
//! substitutes the documented default, so callers never compare against a
//! missing value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

mod raw;

pub use raw::{decode_metar, decode_station_file, split_station_file, StationFile};

/// Visibility assumed when the report does not carry one.
pub const DEFAULT_VISIBILITY_SM: f64 = 10.0;
/// Wind speed assumed when the report does not carry one.
pub const DEFAULT_WIND_SPEED_KT: f64 = 0.0;
/// Ceiling height used when no cloud layer restricts the sky.
pub const NO_CEILING_FEET: f64 = 99_999.0;

/// Coarse flight rules category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FlightCategory {
    /// Visual flight rules.
    #[serde(rename = "VFR")]
    Vfr,
    /// Marginal VFR.
    #[serde(rename = "MVFR")]
    Mvfr,
    /// Instrument flight rules.
    #[serde(rename = "IFR")]
    Ifr,
    /// Low IFR.
    #[serde(rename = "LIFR")]
    Lifr,
}

impl FlightCategory {
    /// METAR abbreviation for this category.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vfr => "VFR",
            Self::Mvfr => "MVFR",
            Self::Ifr => "IFR",
            Self::Lifr => "LIFR",
        }
    }

    /// Whether the category requires instrument flight rules.
    #[must_use]
    pub fn is_instrument(self) -> bool {
        matches!(self, Self::Ifr | Self::Lifr)
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a flight category abbreviation is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown flight category: {0}")]
pub struct UnknownFlightCategory(pub String);

impl FromStr for FlightCategory {
    type Err = UnknownFlightCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VFR" => Ok(Self::Vfr),
            "MVFR" => Ok(Self::Mvfr),
            "IFR" => Ok(Self::Ifr),
            "LIFR" => Ok(Self::Lifr),
            other => Err(UnknownFlightCategory(other.to_string())),
        }
    }
}

/// A single reported cloud layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    /// Coverage code (FEW, SCT, BKN, OVC, CLR, ...).
    #[serde(default)]
    pub cover: Option<String>,

    /// Layer base in feet above ground level.
    #[serde(rename = "base", default, deserialize_with = "lenient_number")]
    pub base_height_feet: Option<f64>,
}

impl CloudLayer {
    /// Create a layer with the given coverage and base.
    #[must_use]
    pub fn new(cover: &str, base_height_feet: f64) -> Self {
        Self {
            cover: Some(cover.to_string()),
            base_height_feet: Some(base_height_feet),
        }
    }
}

/// A decoded METAR observation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedObservation {
    /// ICAO station identifier.
    #[serde(rename = "icaoId", default)]
    pub station: String,

    /// Station name as reported by the service.
    #[serde(default)]
    pub name: Option<String>,

    /// Undecoded METAR text.
    #[serde(rename = "rawOb", default)]
    pub raw_text: Option<String>,

    /// Observation time.
    #[serde(rename = "obsTime", default, with = "chrono::serde::ts_seconds_option")]
    pub observed_at: Option<DateTime<Utc>>,

    /// Present weather, space-delimited METAR codes (e.g. "-RA BR").
    #[serde(rename = "wxString", default)]
    pub weather_phenomena: Option<String>,

    /// Prevailing visibility in statute miles.
    #[serde(rename = "visib", default, deserialize_with = "lenient_visibility")]
    pub visibility_statute_miles: Option<f64>,

    /// Wind direction in degrees true; `None` when variable.
    #[serde(rename = "wdir", default, deserialize_with = "lenient_number")]
    pub wind_direction_degrees: Option<f64>,

    /// Wind speed in knots.
    #[serde(rename = "wspd", default, deserialize_with = "lenient_number")]
    pub wind_speed_knots: Option<f64>,

    /// Gust speed in knots.
    #[serde(rename = "wgst", default, deserialize_with = "lenient_number")]
    pub wind_gust_knots: Option<f64>,

    /// Cloud layers, lowest first.
    #[serde(rename = "clouds", default, deserialize_with = "nullable_vec")]
    pub cloud_layers: Vec<CloudLayer>,

    /// Flight rules category.
    #[serde(rename = "fltCat", default, deserialize_with = "lenient_category")]
    pub flight_category: Option<FlightCategory>,

    /// Temperature in degrees Celsius.
    #[serde(rename = "temp", default, deserialize_with = "lenient_number")]
    pub temperature_c: Option<f64>,

    /// Dewpoint in degrees Celsius.
    #[serde(rename = "dewp", default, deserialize_with = "lenient_number")]
    pub dewpoint_c: Option<f64>,

    /// Altimeter setting in hectopascals.
    #[serde(rename = "altim", default, deserialize_with = "lenient_number")]
    pub pressure_hpa: Option<f64>,

    /// Station latitude in degrees.
    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,

    /// Station longitude in degrees.
    #[serde(rename = "lon", default)]
    pub longitude: Option<f64>,
}

impl DecodedObservation {
    /// Present weather codes, empty when none were reported.
    #[must_use]
    pub fn phenomena(&self) -> &str {
        self.weather_phenomena.as_deref().unwrap_or("")
    }

    /// Visibility in statute miles, defaulting to 10.
    #[must_use]
    pub fn visibility(&self) -> f64 {
        self.visibility_statute_miles.unwrap_or(DEFAULT_VISIBILITY_SM)
    }

    /// Wind speed in knots, defaulting to calm.
    #[must_use]
    pub fn wind_speed(&self) -> f64 {
        self.wind_speed_knots.unwrap_or(DEFAULT_WIND_SPEED_KT)
    }

    /// Base of the first reported cloud layer, or [`NO_CEILING_FEET`].
    #[must_use]
    pub fn ceiling_feet(&self) -> f64 {
        self.cloud_layers
            .first()
            .and_then(|layer| layer.base_height_feet)
            .unwrap_or(NO_CEILING_FEET)
    }

    /// Whether the observation reports a ceiling at all.
    #[must_use]
    pub fn has_ceiling(&self) -> bool {
        self.ceiling_feet() < NO_CEILING_FEET
    }

    /// Station position, when both coordinates are known.
    #[must_use]
    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Parse METAR visibility text in statute miles.
///
/// Handles whole numbers, fractions and mixed fractions (`"1 1/2"`), an
/// optional `SM` suffix, a trailing `+`, and the `M` (less than) and `P`
/// (more than) prefixes, which are read as the bound itself.
#[must_use]
pub fn parse_visibility(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix("SM").unwrap_or(text).trim_end();
    let text = text.trim_end_matches('+');
    let text = text.strip_prefix(|c| c == 'M' || c == 'P').unwrap_or(text);

    let mut total = 0.0;
    let mut parts = 0;
    for part in text.split_whitespace() {
        let value = match part.split_once('/') {
            Some((num, den)) => {
                let num: f64 = num.parse().ok()?;
                let den: f64 = den.parse().ok()?;
                if den <= 0.0 {
                    return None;
                }
                num / den
            }
            None => part.parse().ok()?,
        };
        total += value;
        parts += 1;
    }

    (parts > 0 && parts <= 2 && total.is_finite() && total >= 0.0).then_some(total)
}

fn lenient_visibility<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        NumberOrText::Number(n) => Some(n),
        NumberOrText::Text(s) => parse_visibility(&s),
    }))
}

/// Accept a number, a numeric string such as `"10+"`, or null.
///
/// Text that does not parse is treated as missing.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        NumberOrText::Number(n) => Some(n),
        NumberOrText::Text(s) => s.trim().trim_end_matches('+').parse().ok(),
    }))
}

fn lenient_category<'de, D>(deserializer: D) -> Result<Option<FlightCategory>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| s.parse().ok()))
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    const KLAX_JSON: &str = r#"{
        "icaoId": "KLAX",
        "obsTime": 1758326400,
        "temp": 21.1,
        "dewp": 15.6,
        "wdir": 250,
        "wspd": 12,
        "visib": "10+",
        "wxString": null,
        "rawOb": "KLAX 200000Z 25012KT 10SM FEW020 BKN250 21/16 A2992",
        "lat": 33.938,
        "lon": -118.389,
        "name": "Los Angeles Intl, CA, US",
        "clouds": [{"cover": "FEW", "base": 2000}, {"cover": "BKN", "base": 25000}],
        "fltCat": "VFR"
    }"#;

    #[test]
    fn test_decode_full_record() {
        let obs: DecodedObservation = serde_json::from_str(KLAX_JSON).unwrap();
        assert_eq!(obs.station, "KLAX");
        assert_eq!(obs.visibility_statute_miles, Some(10.0));
        assert_eq!(obs.wind_speed(), 12.0);
        assert_eq!(obs.cloud_layers.len(), 2);
        assert_eq!(obs.ceiling_feet(), 2000.0);
        assert_eq!(obs.flight_category, Some(FlightCategory::Vfr));
        assert_eq!(obs.phenomena(), "");
        assert_eq!(obs.observed_at.map(|t| t.timestamp()), Some(1_758_326_400));
        assert!(obs.position().is_some());
    }

    #[test]
    fn test_decode_sparse_record_uses_defaults() {
        let json = r#"{"icaoId": "KXYZ", "fltCat": "UNKN", "clouds": null}"#;
        let obs: DecodedObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.visibility(), DEFAULT_VISIBILITY_SM);
        assert_eq!(obs.wind_speed(), DEFAULT_WIND_SPEED_KT);
        assert_eq!(obs.ceiling_feet(), NO_CEILING_FEET);
        assert!(!obs.has_ceiling());
        assert!(obs.flight_category.is_none());
        assert!(obs.observed_at.is_none());
    }

    #[test]
    fn test_fractional_and_garbage_visibility() {
        let obs: DecodedObservation = serde_json::from_str(r#"{"visib": 0.25}"#).unwrap();
        assert_eq!(obs.visibility(), 0.25);

        let cases = [("M1/4", 0.25), ("1/2", 0.5), ("1 1/2", 1.5), ("P6", 6.0), ("3SM", 3.0)];
        for (text, expected) in cases {
            let json = format!(r#"{{"visib": "{text}"}}"#);
            let obs: DecodedObservation = serde_json::from_str(&json).unwrap();
            assert_eq!(obs.visibility(), expected, "{text}");
        }

        let obs: DecodedObservation = serde_json::from_str(r#"{"visib": "MISSING"}"#).unwrap();
        assert_eq!(obs.visibility(), DEFAULT_VISIBILITY_SM);
    }

    #[test]
    fn test_parse_visibility_rejects_malformed_text() {
        assert_eq!(parse_visibility(""), None);
        assert_eq!(parse_visibility("1/0"), None);
        assert_eq!(parse_visibility("1 1/2 3"), None);
        assert_eq!(parse_visibility("NaN"), None);
        assert_eq!(parse_visibility("1/2/3"), None);
    }

    #[test]
    fn test_clear_layer_without_base_has_no_ceiling() {
        let obs: DecodedObservation =
            serde_json::from_str(r#"{"clouds": [{"cover": "CLR"}]}"#).unwrap();
        assert_eq!(obs.cloud_layers.len(), 1);
        assert_eq!(obs.ceiling_feet(), NO_CEILING_FEET);
    }

    #[test]
    fn test_flight_category_parse() {
        assert_eq!("lifr".parse::<FlightCategory>(), Ok(FlightCategory::Lifr));
        assert!("IFR".parse::<FlightCategory>().unwrap().is_instrument());
        assert!(!FlightCategory::Mvfr.is_instrument());
        assert!("SVFR".parse::<FlightCategory>().is_err());
    }
}
