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

//! Weather severity classification for METAR observations.
//!
//! Maps an observation onto one of three ordered levels using fixed
//! thresholds on present weather, visibility, wind, ceiling and flight
//! category. Classification is total: absent fields fall back to the
//! defaults documented on [`DecodedObservation`].

use std::fmt;

use serde::Serialize;

use crate::observation::DecodedObservation;

/// Label surfaced in place of a level when a station has no observations.
pub const NO_METAR_DATA: &str = "No METAR data available";

/// Present weather codes that always indicate severe weather.
const SEVERE_PHENOMENA: [&str; 5] = ["TS", "BLIZZARD", "SEVERE", "HAIL", "SQUALL"];

// Strict thresholds; values exactly at the limit take the milder branch.
const SEVERE_VISIBILITY_SM: f64 = 1.0;
const SEVERE_WIND_KT: f64 = 30.0;
const SEVERE_CEILING_FT: f64 = 1000.0;
const SIGNIFICANT_VISIBILITY_SM: f64 = 5.0;
const SIGNIFICANT_CEILING_FT: f64 = 3000.0;

/// Severity of the observed weather, ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SeverityLevel {
    Clear,
    SignificantWeather,
    SevereWeather,
}

impl SeverityLevel {
    /// All levels in ascending order of severity.
    pub const ALL: [SeverityLevel; 3] = [
        SeverityLevel::Clear,
        SeverityLevel::SignificantWeather,
        SeverityLevel::SevereWeather,
    ];

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::SignificantWeather => "Significant Weather",
            Self::SevereWeather => "Severe Weather",
        }
    }

    /// Look up a level by its label. Unknown labels yield `None`.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == label)
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a single observation.
#[must_use]
pub fn classify(observation: &DecodedObservation) -> SeverityLevel {
    let phenomena = observation.phenomena();
    let visibility = observation.visibility();
    let ceiling = observation.ceiling_feet();

    let severe = SEVERE_PHENOMENA.iter().any(|code| phenomena.contains(code))
        || visibility < SEVERE_VISIBILITY_SM
        || observation.wind_speed() > SEVERE_WIND_KT
        || ceiling < SEVERE_CEILING_FT
        || observation
            .flight_category
            .is_some_and(|category| category.is_instrument());
    if severe {
        return SeverityLevel::SevereWeather;
    }

    if !phenomena.is_empty()
        || visibility < SIGNIFICANT_VISIBILITY_SM
        || ceiling < SIGNIFICANT_CEILING_FT
    {
        return SeverityLevel::SignificantWeather;
    }

    SeverityLevel::Clear
}

/// Classify the most recent observation of a list, as returned by the METAR
/// endpoint (newest first). Returns `None` for an empty list.
#[must_use]
pub fn summarize_latest(observations: &[DecodedObservation]) -> Option<SeverityLevel> {
    observations.first().map(classify)
}

/// Label for an optional level, falling back to [`NO_METAR_DATA`].
#[must_use]
pub fn level_label(level: Option<SeverityLevel>) -> &'static str {
    level.map_or(NO_METAR_DATA, SeverityLevel::label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::{CloudLayer, FlightCategory};

    fn clear_vfr() -> DecodedObservation {
        DecodedObservation {
            station: "KTEST".to_string(),
            weather_phenomena: Some(String::new()),
            visibility_statute_miles: Some(10.0),
            wind_speed_knots: Some(5.0),
            cloud_layers: Vec::new(),
            flight_category: Some(FlightCategory::Vfr),
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_clear() {
        assert_eq!(classify(&clear_vfr()), SeverityLevel::Clear);
    }

    #[test]
    fn test_scenario_low_visibility_rain() {
        let obs = DecodedObservation {
            weather_phenomena: Some("RA".to_string()),
            visibility_statute_miles: Some(4.0),
            wind_speed_knots: Some(10.0),
            ..clear_vfr()
        };
        assert_eq!(classify(&obs), SeverityLevel::SignificantWeather);
    }

    #[test]
    fn test_scenario_thunderstorm() {
        let obs = DecodedObservation {
            weather_phenomena: Some("TSRA".to_string()),
            visibility_statute_miles: Some(3.0),
            wind_speed_knots: Some(20.0),
            cloud_layers: vec![CloudLayer::new("BKN", 2000.0)],
            flight_category: Some(FlightCategory::Mvfr),
            ..clear_vfr()
        };
        assert_eq!(classify(&obs), SeverityLevel::SevereWeather);
    }

    #[test]
    fn test_scenario_low_ceiling() {
        let obs = DecodedObservation {
            wind_speed_knots: Some(0.0),
            cloud_layers: vec![CloudLayer::new("OVC", 500.0)],
            ..clear_vfr()
        };
        assert_eq!(classify(&obs), SeverityLevel::SevereWeather);
    }

    #[test]
    fn test_empty_list_is_not_classified() {
        assert_eq!(summarize_latest(&[]), None);
        assert_eq!(level_label(summarize_latest(&[])), "No METAR data available");
    }

    #[test]
    fn test_latest_observation_wins() {
        let stormy = DecodedObservation {
            weather_phenomena: Some("+TSRA".to_string()),
            ..clear_vfr()
        };
        let observations = vec![clear_vfr(), stormy];
        assert_eq!(summarize_latest(&observations), Some(SeverityLevel::Clear));
    }

    #[test]
    fn test_absent_fields_are_clear() {
        assert_eq!(classify(&DecodedObservation::default()), SeverityLevel::Clear);
    }

    #[test]
    fn test_single_field_past_severe_threshold() {
        let variants = [
            DecodedObservation {
                weather_phenomena: Some("GR HAIL".to_string()),
                ..clear_vfr()
            },
            DecodedObservation {
                weather_phenomena: Some("SQUALL".to_string()),
                ..clear_vfr()
            },
            DecodedObservation {
                visibility_statute_miles: Some(0.5),
                ..clear_vfr()
            },
            DecodedObservation {
                wind_speed_knots: Some(31.0),
                ..clear_vfr()
            },
            DecodedObservation {
                cloud_layers: vec![CloudLayer::new("OVC", 999.0)],
                ..clear_vfr()
            },
            DecodedObservation {
                flight_category: Some(FlightCategory::Ifr),
                ..clear_vfr()
            },
            DecodedObservation {
                flight_category: Some(FlightCategory::Lifr),
                ..clear_vfr()
            },
        ];
        for obs in &variants {
            assert_eq!(classify(obs), SeverityLevel::SevereWeather, "{obs:?}");
        }
    }

    #[test]
    fn test_boundaries_take_milder_branch() {
        let vis = DecodedObservation {
            visibility_statute_miles: Some(1.0),
            ..clear_vfr()
        };
        assert_eq!(classify(&vis), SeverityLevel::SignificantWeather);

        let wind = DecodedObservation {
            wind_speed_knots: Some(30.0),
            ..clear_vfr()
        };
        assert_eq!(classify(&wind), SeverityLevel::Clear);

        let low = DecodedObservation {
            cloud_layers: vec![CloudLayer::new("BKN", 1000.0)],
            ..clear_vfr()
        };
        assert_eq!(classify(&low), SeverityLevel::SignificantWeather);

        let high = DecodedObservation {
            cloud_layers: vec![CloudLayer::new("BKN", 3000.0)],
            ..clear_vfr()
        };
        assert_eq!(classify(&high), SeverityLevel::Clear);

        let vis5 = DecodedObservation {
            visibility_statute_miles: Some(5.0),
            ..clear_vfr()
        };
        assert_eq!(classify(&vis5), SeverityLevel::Clear);
    }

    #[test]
    fn test_fractional_visibility_text_from_json() {
        let half: DecodedObservation =
            serde_json::from_str(r#"{"icaoId": "KSFO", "visib": "1/2"}"#).unwrap();
        assert_eq!(classify(&half), SeverityLevel::SevereWeather);

        let quarter: DecodedObservation =
            serde_json::from_str(r#"{"icaoId": "KSFO", "visib": "M1/4"}"#).unwrap();
        assert_eq!(classify(&quarter), SeverityLevel::SevereWeather);

        let mixed: DecodedObservation =
            serde_json::from_str(r#"{"icaoId": "KSFO", "visib": "1 1/2"}"#).unwrap();
        assert_eq!(classify(&mixed), SeverityLevel::SignificantWeather);
    }

    #[test]
    fn test_only_first_layer_sets_ceiling() {
        let obs = DecodedObservation {
            cloud_layers: vec![CloudLayer::new("FEW", 5000.0), CloudLayer::new("OVC", 400.0)],
            ..clear_vfr()
        };
        assert_eq!(classify(&obs), SeverityLevel::Clear);
    }

    #[test]
    fn test_phenomena_match_is_case_sensitive() {
        let obs = DecodedObservation {
            weather_phenomena: Some("tsra".to_string()),
            ..clear_vfr()
        };
        assert_eq!(classify(&obs), SeverityLevel::SignificantWeather);
    }

    #[test]
    fn test_label_round_trip_and_ordering() {
        for level in SeverityLevel::ALL {
            assert_eq!(SeverityLevel::from_label(level.label()), Some(level));
        }
        assert_eq!(SeverityLevel::from_label("Tornado"), None);
        assert!(SeverityLevel::Clear < SeverityLevel::SignificantWeather);
        assert!(SeverityLevel::SignificantWeather < SeverityLevel::SevereWeather);
    }
}
