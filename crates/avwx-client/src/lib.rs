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

//! Aviation weather client library.
//!
//! This library fetches METAR, TAF, PIREP and AIR/SIGMET products from an
//! aviation weather data API and turns them into briefings. It is organised
//! in layers that can be used independently or composed together:
//!
//! - **Observation layer**: decoded METAR records with defaulting accessors,
//!   read from the JSON product or decoded from raw station report text
//! - **Severity layer**: classification of an observation into
//!   Clear / Significant Weather / Severe Weather
//! - **Request layer**: typed endpoint definitions
//! - **HTTP layer**: async transport with status and body handling
//! - **Briefing layer**: station summaries, route briefings, hazard counts
//!
//! # Quick Start
//!
//! Use the [`Client`] type for full-stack operation:
//!
//! ```no_run
//! use avwx_client::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), avwx_client::ApiError> {
//!     let client = Client::new(&ClientConfig::default())?;
//!     let briefing = client.route_briefing("KLAX", "KJFK").await?;
//!
//!     println!("{}", briefing.departure.summary_text);
//!     println!("{}", briefing.arrival.summary_text);
//!     Ok(())
//! }
//! ```
//!
//! # Classifying Observations Directly
//!
//! ```
//! use avwx_client::observation::{CloudLayer, DecodedObservation};
//! use avwx_client::severity::{classify, SeverityLevel};
//!
//! let obs = DecodedObservation {
//!     cloud_layers: vec![CloudLayer::new("OVC", 500.0)],
//!     ..Default::default()
//! };
//! assert_eq!(classify(&obs), SeverityLevel::SevereWeather);
//! ```

pub mod api;
pub mod briefing;
pub mod http;
pub mod observation;
pub mod products;
pub mod severity;

use log::info;

pub use api::{
    normalize_icao, AirSigmetRequest, ApiError, InternationalSigmetRequest, MetarRequest,
    PirepRequest, Request, TafRequest,
};
pub use briefing::{count_by_hazard, normalize_route, HazardCount, RouteBriefing, StationSummary};
pub use http::{ClientConfig, HttpClient, DEFAULT_BASE_URL, DEFAULT_STATION_TEXT_URL};
pub use observation::{decode_metar, CloudLayer, DecodedObservation, FlightCategory};
pub use products::{AirSigmet, InternationalSigmet, Pirep, Taf};
pub use severity::{classify, summarize_latest, SeverityLevel, NO_METAR_DATA};

/// Full-stack weather client that wires the request, HTTP and briefing
/// layers together.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    metar_hours: f64,
}

impl Client {
    /// Create a client with the given transport configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(config)?,
            metar_hours: MetarRequest::DEFAULT_HOURS,
        })
    }

    /// Set the look-back window used for METAR queries.
    #[must_use]
    pub fn with_metar_hours(mut self, hours: f64) -> Self {
        self.metar_hours = hours;
        self
    }

    /// Access the underlying transport for custom requests.
    #[must_use]
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Recent METARs for a station, newest first.
    pub async fn metars(&self, station: &str) -> Result<Vec<DecodedObservation>, ApiError> {
        let station = normalize_icao(station).ok_or(ApiError::MissingStation("station"))?;
        let request = MetarRequest::new(&station).with_hours(self.metar_hours);
        self.http.fetch(&request).await
    }

    /// Summary of a station's latest METAR.
    pub async fn station_summary(&self, station: &str) -> Result<StationSummary, ApiError> {
        let observations = self.metars(station).await?;
        Ok(StationSummary::from_observations(
            &station.trim().to_ascii_uppercase(),
            &observations,
        ))
    }

    /// Latest METAR for a station, decoded from the NWS station text file.
    pub async fn decoded_metar(&self, station: &str) -> Result<DecodedObservation, ApiError> {
        let station = normalize_icao(station).ok_or(ApiError::MissingStation("station"))?;
        let body = self.http.fetch_station_file(&station).await?;
        observation::decode_station_file(&body)
    }

    /// Terminal forecasts for a station.
    pub async fn tafs(&self, station: &str) -> Result<Vec<Taf>, ApiError> {
        let station = normalize_icao(station).ok_or(ApiError::MissingStation("station"))?;
        self.http.fetch(&TafRequest::new(&station)).await
    }

    /// Pilot reports around a station.
    pub async fn pireps(&self, request: &PirepRequest) -> Result<Vec<Pirep>, ApiError> {
        if normalize_icao(&request.center).is_none() {
            return Err(ApiError::MissingStation("station"));
        }
        self.http.fetch(request).await
    }

    /// International SIGMETs.
    pub async fn international_sigmets(
        &self,
        request: &InternationalSigmetRequest,
    ) -> Result<Vec<InternationalSigmet>, ApiError> {
        self.http.fetch(request).await
    }

    /// Domestic AIRMETs and SIGMETs.
    pub async fn air_sigmets(&self) -> Result<Vec<AirSigmet>, ApiError> {
        self.http.fetch(&AirSigmetRequest).await
    }

    /// Brief a route: both METAR lists are fetched concurrently.
    pub async fn route_briefing(
        &self,
        departure: &str,
        arrival: &str,
    ) -> Result<RouteBriefing, ApiError> {
        let (departure, arrival) = normalize_route(departure, arrival)?;
        info!("Fetching route weather {} -> {}", departure, arrival);

        let dep_request = MetarRequest::new(&departure).with_hours(self.metar_hours);
        let arr_request = MetarRequest::new(&arrival).with_hours(self.metar_hours);
        let (dep_obs, arr_obs) =
            tokio::try_join!(self.http.fetch(&dep_request), self.http.fetch(&arr_request))?;

        Ok(RouteBriefing::new(&departure, &dep_obs, &arrival, &arr_obs))
    }
}
