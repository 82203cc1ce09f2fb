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

//! Forecast and advisory products: TAF, PIREP, AIR/SIGMET and international
//! SIGMET records.
//!
//! Only the fields used for display are decoded; everything else in the
//! response is ignored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal aerodrome forecast.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taf {
    #[serde(rename = "icaoId", default)]
    pub station: String,

    #[serde(rename = "rawTAF", default)]
    pub raw_text: Option<String>,

    /// Issue time exactly as the service formats it.
    #[serde(rename = "issueTime", default)]
    pub issue_time: Option<String>,

    #[serde(rename = "validTimeFrom", default, with = "chrono::serde::ts_seconds_option")]
    pub valid_from: Option<DateTime<Utc>>,

    #[serde(rename = "validTimeTo", default, with = "chrono::serde::ts_seconds_option")]
    pub valid_to: Option<DateTime<Utc>>,
}

/// Pilot weather report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pirep {
    #[serde(rename = "rawOb", default)]
    pub raw_text: Option<String>,

    #[serde(rename = "acType", default)]
    pub aircraft_type: Option<String>,

    /// Flight level in hundreds of feet.
    #[serde(rename = "fltLvl", default)]
    pub flight_level: Option<serde_json::Value>,

    /// "PIREP" or "AIREP".
    #[serde(rename = "pirepType", default)]
    pub report_type: Option<String>,

    #[serde(rename = "lat", default)]
    pub latitude: Option<f64>,

    #[serde(rename = "lon", default)]
    pub longitude: Option<f64>,

    #[serde(rename = "obsTime", default, with = "chrono::serde::ts_seconds_option")]
    pub observed_at: Option<DateTime<Utc>>,
}

impl Pirep {
    /// Flight level as text, whether the service sent it as a number or a string.
    #[must_use]
    pub fn flight_level_text(&self) -> Option<String> {
        match self.flight_level.as_ref()? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Domestic AIRMET or SIGMET advisory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirSigmet {
    /// "AIRMET" or "SIGMET".
    #[serde(rename = "airSigmetType", default)]
    pub kind: Option<String>,

    /// Hazard code (CONVECTIVE, TURB, ICE, IFR, MTN OBSCN, ...).
    #[serde(default)]
    pub hazard: Option<String>,

    #[serde(default)]
    pub severity: Option<i64>,

    #[serde(rename = "altitudeLow1", default)]
    pub altitude_low_ft: Option<i64>,

    #[serde(rename = "altitudeHi1", default)]
    pub altitude_high_ft: Option<i64>,

    #[serde(rename = "rawAirSigmet", default)]
    pub raw_text: Option<String>,
}

/// International SIGMET issued for a flight information region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InternationalSigmet {
    #[serde(rename = "icaoId", default)]
    pub station: Option<String>,

    #[serde(rename = "firName", default)]
    pub fir_name: Option<String>,

    #[serde(default)]
    pub hazard: Option<String>,

    #[serde(default)]
    pub qualifier: Option<String>,

    #[serde(rename = "base", default)]
    pub base_ft: Option<i64>,

    #[serde(rename = "top", default)]
    pub top_ft: Option<i64>,

    #[serde(rename = "rawSigmet", default)]
    pub raw_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_taf() {
        let json = r#"{
            "icaoId": "KMCI",
            "issueTime": "2025-09-20T17:20:00Z",
            "validTimeFrom": 1758391200,
            "validTimeTo": 1758477600,
            "rawTAF": "TAF KMCI 201720Z 2018/2118 18012KT P6SM SCT250",
            "fcsts": []
        }"#;
        let taf: Taf = serde_json::from_str(json).unwrap();
        assert_eq!(taf.station, "KMCI");
        assert!(taf.raw_text.unwrap().starts_with("TAF KMCI"));
        assert_eq!(taf.issue_time.as_deref(), Some("2025-09-20T17:20:00Z"));
        assert!(taf.valid_from < taf.valid_to);
    }

    #[test]
    fn test_pirep_flight_level_forms() {
        let numeric: Pirep = serde_json::from_str(r#"{"fltLvl": 350}"#).unwrap();
        assert_eq!(numeric.flight_level_text().as_deref(), Some("350"));

        let text: Pirep = serde_json::from_str(r#"{"fltLvl": "DURD"}"#).unwrap();
        assert_eq!(text.flight_level_text().as_deref(), Some("DURD"));

        let missing: Pirep = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.flight_level_text(), None);
    }

    #[test]
    fn test_decode_airsigmet_ignores_unknown_fields() {
        let json = r#"{
            "airSigmetType": "SIGMET",
            "hazard": "CONVECTIVE",
            "severity": 1,
            "altitudeHi1": 45000,
            "coords": [{"lat": 40.0, "lon": -95.0}]
        }"#;
        let advisory: AirSigmet = serde_json::from_str(json).unwrap();
        assert_eq!(advisory.kind.as_deref(), Some("SIGMET"));
        assert_eq!(advisory.hazard.as_deref(), Some("CONVECTIVE"));
        assert_eq!(advisory.altitude_high_ft, Some(45000));
        assert_eq!(advisory.altitude_low_ft, None);
    }

    #[test]
    fn test_decode_isigmet() {
        let json = r#"{
            "icaoId": "EGRR",
            "firName": "EGTT LONDON",
            "hazard": "TURB",
            "qualifier": "SEV",
            "base": 25000,
            "top": 38000
        }"#;
        let sigmet: InternationalSigmet = serde_json::from_str(json).unwrap();
        assert_eq!(sigmet.fir_name.as_deref(), Some("EGTT LONDON"));
        assert_eq!(sigmet.base_ft, Some(25000));
    }
}
