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

//! Raw METAR text decoder.
//!
//! Decodes the station text files published by the NWS, which look like:
//! ```text
//! 2025/09/20 00:51
//! KEWR 200051Z 22008KT 10SM FEW250 24/14 A3002 RMK AO2 SLP165
//! ```
//! The first line is the observation time (UTC), the second the report.
//! Remarks after `RMK` are ignored.

use chrono::{DateTime, NaiveDateTime, Utc};

use super::{parse_visibility, CloudLayer, DecodedObservation, FlightCategory};
use crate::api::ApiError;

const METERS_PER_STATUTE_MILE: f64 = 1609.344;
const KNOTS_PER_MPS: f64 = 1.943_84;
const HPA_PER_INHG: f64 = 33.8639;
const CAVOK_VISIBILITY_SM: f64 = 10.0;

const WEATHER_CODES: [&str; 29] = [
    "MI", "PR", "BC", "DR", "BL", "SH", "TS", "FZ", // descriptors
    "DZ", "RA", "SN", "SG", "IC", "PL", "GR", "GS", "UP", // precipitation
    "BR", "FG", "FU", "VA", "DU", "SA", "HZ", "PY", // obscuration
    "PO", "SQ", "FC", "SS",
];

/// Header time and report line of a station text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFile {
    pub observed_at: Option<DateTime<Utc>>,
    pub report: String,
}

/// Split a station text file into its header time and report line.
///
/// Files with fewer than two lines carry no report and yield
/// [`ApiError::NoMetarReport`].
pub fn split_station_file(body: &str) -> Result<StationFile, ApiError> {
    let lines: Vec<&str> = body.trim().lines().collect();
    if lines.len() < 2 {
        return Err(ApiError::NoMetarReport);
    }

    let report = lines[1].trim();
    if report.is_empty() {
        return Err(ApiError::NoMetarReport);
    }

    let observed_at = NaiveDateTime::parse_from_str(lines[0].trim(), "%Y/%m/%d %H:%M")
        .ok()
        .map(|naive| naive.and_utc());

    Ok(StationFile {
        observed_at,
        report: report.to_string(),
    })
}

/// Decode a station text file into an observation.
pub fn decode_station_file(body: &str) -> Result<DecodedObservation, ApiError> {
    let file = split_station_file(body)?;
    let mut observation = decode_metar(&file.report);
    observation.observed_at = file.observed_at;
    Ok(observation)
}

/// Decode a single METAR report line.
///
/// Groups that are not recognized are skipped; decoding never fails.
#[must_use]
pub fn decode_metar(report: &str) -> DecodedObservation {
    let mut obs = DecodedObservation {
        raw_text: Some(report.trim().to_string()),
        ..Default::default()
    };

    let tokens: Vec<&str> = report
        .split_whitespace()
        .take_while(|token| *token != "RMK")
        .skip_while(|token| matches!(*token, "METAR" | "SPECI"))
        .collect();

    let Some((station, groups)) = tokens.split_first() else {
        return obs;
    };
    obs.station = (*station).to_string();

    let mut weather = Vec::new();
    let mut i = 0;
    while i < groups.len() {
        let token = groups[i];

        // Mixed-fraction visibility spans two groups: "1 1/2SM".
        if token.len() <= 2 && token.bytes().all(|b| b.is_ascii_digit()) {
            let next = groups.get(i + 1);
            if let Some(next) = next.filter(|n| n.ends_with("SM") && n.contains('/')) {
                obs.visibility_statute_miles = parse_visibility(&format!("{token} {next}"));
                i += 2;
                continue;
            }
        }

        if let Some((direction, speed, gust)) = parse_wind(token) {
            obs.wind_direction_degrees = direction;
            obs.wind_speed_knots = Some(speed);
            obs.wind_gust_knots = gust;
        } else if token.ends_with("SM") {
            obs.visibility_statute_miles = parse_visibility(token);
        } else if token == "CAVOK" {
            obs.visibility_statute_miles = Some(CAVOK_VISIBILITY_SM);
        } else if token.len() == 4 && token.bytes().all(|b| b.is_ascii_digit()) {
            obs.visibility_statute_miles = parse_meters_visibility(token);
        } else if let Some(layer) = parse_sky(token) {
            obs.cloud_layers.push(layer);
        } else if let Some((temp, dew)) = parse_temperatures(token) {
            obs.temperature_c = Some(temp);
            obs.dewpoint_c = dew;
        } else if let Some(pressure) = parse_altimeter(token) {
            obs.pressure_hpa = Some(pressure);
        } else if is_weather(token) {
            weather.push(token);
        }
        i += 1;
    }

    if !weather.is_empty() {
        obs.weather_phenomena = Some(weather.join(" "));
    }
    obs.flight_category = derive_category(&obs);
    obs
}

/// `dddffKT`, `dddffGggKT`, `VRBffKT` and the `MPS` variants.
fn parse_wind(token: &str) -> Option<(Option<f64>, f64, Option<f64>)> {
    let (body, factor) = if let Some(body) = token.strip_suffix("KT") {
        (body, 1.0)
    } else if let Some(body) = token.strip_suffix("MPS") {
        (body, KNOTS_PER_MPS)
    } else {
        return None;
    };
    if body.len() < 5 || !body.is_ascii() {
        return None;
    }

    let (direction, rest) = body.split_at(3);
    let direction = if direction == "VRB" {
        None
    } else {
        Some(direction.parse::<f64>().ok()?)
    };

    let (speed, gust) = match rest.split_once('G') {
        Some((speed, gust)) => (speed, Some(gust.parse::<f64>().ok()? * factor)),
        None => (rest, None),
    };
    Some((direction, speed.parse::<f64>().ok()? * factor, gust))
}

/// Four-digit metric visibility; `9999` means 10 km or more.
fn parse_meters_visibility(token: &str) -> Option<f64> {
    let meters: f64 = token.parse().ok()?;
    if meters >= 9999.0 {
        Some(CAVOK_VISIBILITY_SM)
    } else {
        Some(meters / METERS_PER_STATUTE_MILE)
    }
}

fn parse_sky(token: &str) -> Option<CloudLayer> {
    if matches!(token, "CLR" | "SKC" | "NSC" | "NCD") {
        return Some(CloudLayer {
            cover: Some(token.to_string()),
            base_height_feet: None,
        });
    }

    let cover = ["FEW", "SCT", "BKN", "OVC", "VV"]
        .into_iter()
        .find(|cover| token.starts_with(*cover))?;
    let height = token.get(cover.len()..cover.len() + 3)?;
    if !height.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hundreds: f64 = height.parse().ok()?;
    Some(CloudLayer::new(cover, hundreds * 100.0))
}

/// `TT/DD` with `M` marking negative values; the dewpoint may be missing.
fn parse_temperatures(token: &str) -> Option<(f64, Option<f64>)> {
    let (temp, dew) = token.split_once('/')?;
    let temp = parse_signed_celsius(temp)?;
    let dew = if dew.is_empty() {
        None
    } else {
        Some(parse_signed_celsius(dew)?)
    };
    Some((temp, dew))
}

fn parse_signed_celsius(text: &str) -> Option<f64> {
    let (sign, digits) = match text.strip_prefix('M') {
        Some(digits) => (-1.0, digits),
        None => (1.0, text),
    };
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(sign * digits.parse::<f64>().ok()?)
}

/// `Annnn` (hundredths of inHg) or `Qnnnn` (hPa), returned in hPa.
fn parse_altimeter(token: &str) -> Option<f64> {
    let digits = token.get(1..)?;
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: f64 = digits.parse().ok()?;
    match token.as_bytes()[0] {
        b'A' => Some(value / 100.0 * HPA_PER_INHG),
        b'Q' => Some(value),
        _ => None,
    }
}

fn is_weather(token: &str) -> bool {
    let codes = token.trim_start_matches(['+', '-']);
    let codes = codes.strip_prefix("VC").unwrap_or(codes);
    !codes.is_empty()
        && codes.len() % 2 == 0
        && codes.is_ascii()
        && (0..codes.len())
            .step_by(2)
            .all(|i| WEATHER_CODES.contains(&&codes[i..i + 2]))
}

/// Flight rules category from visibility and the lowest broken, overcast
/// or obscured layer.
fn derive_category(obs: &DecodedObservation) -> Option<FlightCategory> {
    let visibility = obs.visibility_statute_miles?;
    let ceiling = obs
        .cloud_layers
        .iter()
        .filter(|layer| matches!(layer.cover.as_deref(), Some("BKN" | "OVC" | "VV")))
        .filter_map(|layer| layer.base_height_feet)
        .fold(f64::INFINITY, f64::min);

    let category = if ceiling < 500.0 || visibility < 1.0 {
        FlightCategory::Lifr
    } else if ceiling < 1000.0 || visibility < 3.0 {
        FlightCategory::Ifr
    } else if ceiling <= 3000.0 || visibility <= 5.0 {
        FlightCategory::Mvfr
    } else {
        FlightCategory::Vfr
    };
    Some(category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::{classify, SeverityLevel};

    const KEWR_FILE: &str = "2025/09/20 00:51\n\
        KEWR 200051Z 22008KT 10SM FEW250 24/14 A3002 RMK AO2 SLP165 T02390139\n";

    #[test]
    fn test_empty_station_file() {
        assert!(matches!(split_station_file(""), Err(ApiError::NoMetarReport)));
    }

    #[test]
    fn test_header_only_station_file() {
        assert!(matches!(
            split_station_file("2025/09/20 00:51\n"),
            Err(ApiError::NoMetarReport)
        ));
        assert_eq!(
            ApiError::NoMetarReport.to_string(),
            "No METAR report available"
        );
    }

    #[test]
    fn test_two_line_station_file() {
        let file = split_station_file(KEWR_FILE).unwrap();
        assert!(file.report.starts_with("KEWR 200051Z"));
        assert_eq!(
            file.observed_at.map(|t| t.to_rfc3339()),
            Some("2025-09-20T00:51:00+00:00".to_string())
        );
    }

    #[test]
    fn test_decode_station_file() {
        let obs = decode_station_file(KEWR_FILE).unwrap();
        assert_eq!(obs.station, "KEWR");
        assert_eq!(obs.wind_direction_degrees, Some(220.0));
        assert_eq!(obs.wind_speed_knots, Some(8.0));
        assert_eq!(obs.visibility_statute_miles, Some(10.0));
        assert_eq!(obs.cloud_layers, vec![CloudLayer::new("FEW", 25000.0)]);
        assert_eq!(obs.temperature_c, Some(24.0));
        assert_eq!(obs.dewpoint_c, Some(14.0));
        assert!((obs.pressure_hpa.unwrap() - 1016.6).abs() < 0.1);
        assert_eq!(obs.weather_phenomena, None);
        assert_eq!(obs.flight_category, Some(FlightCategory::Vfr));
        assert!(obs.observed_at.is_some());
        assert_eq!(classify(&obs), SeverityLevel::Clear);
    }

    #[test]
    fn test_decode_low_visibility_thunderstorm() {
        let obs = decode_metar(
            "METAR KMCI 201553Z 27035G48KT 1 1/2SM +TSRA BR BKN008CB OVC015 M02/M05 A2975",
        );
        assert_eq!(obs.station, "KMCI");
        assert_eq!(obs.wind_gust_knots, Some(48.0));
        assert_eq!(obs.visibility_statute_miles, Some(1.5));
        assert_eq!(obs.weather_phenomena.as_deref(), Some("+TSRA BR"));
        assert_eq!(obs.cloud_layers[0], CloudLayer::new("BKN", 800.0));
        assert_eq!(obs.temperature_c, Some(-2.0));
        assert_eq!(obs.dewpoint_c, Some(-5.0));
        assert_eq!(obs.flight_category, Some(FlightCategory::Ifr));
        assert_eq!(classify(&obs), SeverityLevel::SevereWeather);
    }

    #[test]
    fn test_decode_metric_report() {
        let obs = decode_metar("EGLL 200050Z 24005MPS 9999 VCSH SCT030 15/11 Q1013 NOSIG");
        assert!((obs.wind_speed() - 9.7).abs() < 0.1);
        assert_eq!(obs.visibility_statute_miles, Some(10.0));
        assert_eq!(obs.weather_phenomena.as_deref(), Some("VCSH"));
        assert_eq!(obs.pressure_hpa, Some(1013.0));
        assert_eq!(obs.flight_category, Some(FlightCategory::Vfr));
    }

    #[test]
    fn test_decode_variable_wind_and_fractional_visibility() {
        let obs = decode_metar("KSFO 200056Z VRB03KT M1/4SM FG VV001 12/12 A2990");
        assert_eq!(obs.wind_direction_degrees, None);
        assert_eq!(obs.visibility_statute_miles, Some(0.25));
        assert_eq!(obs.cloud_layers[0], CloudLayer::new("VV", 100.0));
        assert_eq!(obs.flight_category, Some(FlightCategory::Lifr));
        assert_eq!(classify(&obs), SeverityLevel::SevereWeather);
    }

    #[test]
    fn test_clear_sky_has_no_ceiling() {
        let obs = decode_metar("KLAX 200053Z 25012KT 10SM CLR 21/16 A2992");
        assert_eq!(obs.cloud_layers[0].base_height_feet, None);
        assert!(!obs.has_ceiling());
    }
}
