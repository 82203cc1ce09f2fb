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

//! Async HTTP transport for the weather data API.
//!
//! Executes [`Request`] values against a configurable base URL, checks the
//! response status and decodes the JSON body.

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;

use crate::api::{ApiError, Request};

/// Public aviation weather data API.
pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/api/data";

/// NWS directory of per-station METAR text files.
pub const DEFAULT_STATION_TEXT_URL: &str =
    "https://tgftp.nws.noaa.gov/data/observations/metar/stations";

/// Configuration for the HTTP client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Total request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Directory holding one `<ICAO>.TXT` METAR file per station.
    pub station_text_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(15),
            user_agent: concat!("avwx-client/", env!("CARGO_PKG_VERSION")).to_string(),
            station_text_url: DEFAULT_STATION_TEXT_URL.to_string(),
        }
    }
}

/// HTTP client bound to one API base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    station_text_url: String,
}

impl HttpClient {
    /// Build a client from the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            station_text_url: config.station_text_url.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the GET request for an endpoint without sending it.
    pub fn build_request<R: Request>(&self, request: &R) -> Result<reqwest::Request, ApiError> {
        let url = format!("{}{}", self.base_url, request.path());
        let mut query = vec![("format", "json".to_string())];
        query.extend(request.query());

        Ok(self.inner.get(url).query(&query).build()?)
    }

    /// Execute a request and decode its response.
    ///
    /// A `204 No Content` reply or an empty body decodes to an empty response.
    pub async fn fetch<R: Request>(&self, request: &R) -> Result<R::Response, ApiError> {
        let http_request = self.build_request(request)?;
        let url = http_request.url().to_string();
        debug!("GET {}", url);

        let response = self.inner.execute(http_request).await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            debug!("No content from {}", url);
            return Ok(R::Response::default());
        }

        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        decode_body(&body)
    }

    /// URL of a station's METAR text file.
    #[must_use]
    pub fn station_file_url(&self, station: &str) -> String {
        format!("{}/{}.TXT", self.station_text_url, station)
    }

    /// Download a station's METAR text file.
    ///
    /// A missing file is reported as [`ApiError::NoMetarReport`].
    pub async fn fetch_station_file(&self, station: &str) -> Result<String, ApiError> {
        let url = self.station_file_url(station);
        debug!("GET {}", url);

        let response = self.inner.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            debug!("No station file at {}", url);
            return Err(ApiError::NoMetarReport);
        }

        if !status.is_success() {
            warn!("HTTP {} from {}", status, url);
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(response.text().await?)
    }
}

/// Decode a JSON response body, treating a blank body as empty.
pub fn decode_body<T>(body: &[u8]) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AirSigmetRequest, MetarRequest, PirepRequest};
    use crate::observation::DecodedObservation;

    fn client(base_url: &str) -> HttpClient {
        HttpClient::new(&ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_build_metar_url() {
        let client = client("https://example.test/api/data/");
        let request = client.build_request(&MetarRequest::new("klax")).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://example.test/api/data/metar?format=json&ids=KLAX&hours=1.5"
        );
    }

    #[test]
    fn test_build_pirep_url() {
        let client = client(DEFAULT_BASE_URL);
        let request = client
            .build_request(&PirepRequest::new("KMCI").with_hours(4.0))
            .unwrap();
        assert_eq!(
            request.url().query(),
            Some("format=json&hours=4&center=KMCI&distance=100")
        );
    }

    #[test]
    fn test_build_airsigmet_url() {
        let client = client(DEFAULT_BASE_URL);
        let request = client.build_request(&AirSigmetRequest).unwrap();
        assert_eq!(request.url().path(), "/api/data/airsigmet");
        assert_eq!(request.url().query(), Some("format=json"));
    }

    #[test]
    fn test_station_file_url() {
        let local = HttpClient::new(&ClientConfig {
            station_text_url: "http://localhost:9000/stations/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            local.station_file_url("KEWR"),
            "http://localhost:9000/stations/KEWR.TXT"
        );
        assert_eq!(
            client(DEFAULT_BASE_URL).station_file_url("KLAX"),
            "https://tgftp.nws.noaa.gov/data/observations/metar/stations/KLAX.TXT"
        );
    }

    #[test]
    fn test_decode_empty_body() {
        let decoded: Vec<DecodedObservation> = decode_body(b"  \n").unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_decode_malformed_body() {
        let result: Result<Vec<DecodedObservation>, _> = decode_body(b"<html>oops</html>");
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_decode_observation_list() {
        let decoded: Vec<DecodedObservation> =
            decode_body(br#"[{"icaoId": "KJFK", "visib": 6}]"#).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].station, "KJFK");
    }
}
