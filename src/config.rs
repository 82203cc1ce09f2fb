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

//! Application configuration management.
//!
//! Persistent settings are stored in TOML format via `confy`. Every field has
//! a serde default so older or hand-edited files keep loading.

use std::time::Duration;

use avwx_client::{ClientConfig, InternationalSigmetRequest, MetarRequest, PirepRequest};
use log::info;
use serde::{Deserialize, Serialize};

const APP_NAME: &str = "wx-briefing";
const CONFIG_NAME: &str = "config";
const CURRENT_CONFIG_VERSION: u32 = 1;

/// Last route briefed, remembered between runs.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct RouteConfig {
    pub departure: String,
    pub arrival: String,
}

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Weather data API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// METAR look-back window in hours
    #[serde(default = "default_metar_hours")]
    pub metar_hours: f64,

    /// PIREP look-back window in hours
    #[serde(default = "default_pirep_hours")]
    pub pirep_hours: f64,

    /// PIREP search radius in nautical miles
    #[serde(default = "default_pirep_distance_nm")]
    pub pirep_distance_nm: u32,

    /// Default hazard for international SIGMET queries
    #[serde(default = "default_sigmet_hazard")]
    pub sigmet_hazard: String,

    /// Default altitude in feet for international SIGMET queries
    #[serde(default = "default_sigmet_level")]
    pub sigmet_level: u32,

    /// Use ANSI colors in terminal output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Most recently briefed route
    #[serde(default)]
    pub last_route: Option<RouteConfig>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_base_url() -> String {
    avwx_client::DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_metar_hours() -> f64 {
    MetarRequest::DEFAULT_HOURS
}

fn default_pirep_hours() -> f64 {
    PirepRequest::DEFAULT_HOURS
}

fn default_pirep_distance_nm() -> u32 {
    PirepRequest::DEFAULT_DISTANCE_NM
}

fn default_sigmet_hazard() -> String {
    InternationalSigmetRequest::default().hazard
}

fn default_sigmet_level() -> u32 {
    InternationalSigmetRequest::default().level
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            metar_hours: default_metar_hours(),
            pirep_hours: default_pirep_hours(),
            pirep_distance_nm: default_pirep_distance_nm(),
            sigmet_hazard: default_sigmet_hazard(),
            sigmet_level: default_sigmet_level(),
            color: true,
            last_route: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from disk, upgrading the schema version if needed
    pub fn load() -> Result<Self, confy::ConfyError> {
        let mut config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;

        if config.config_version < CURRENT_CONFIG_VERSION {
            info!(
                "Upgrading configuration from version {} to {}",
                config.config_version, CURRENT_CONFIG_VERSION
            );
            config.config_version = CURRENT_CONFIG_VERSION;
            config.save()?;
        }

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), confy::ConfyError> {
        confy::store(APP_NAME, CONFIG_NAME, self)
    }

    /// Get the config file path for display to user
    pub fn get_config_path() -> Result<std::path::PathBuf, confy::ConfyError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME)
    }

    /// Transport settings for the weather client
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            ..Default::default()
        }
    }

    /// Remember a route; returns true when it differs from the stored one
    pub fn remember_route(&mut self, departure: &str, arrival: &str) -> bool {
        let route = RouteConfig {
            departure: departure.to_string(),
            arrival: arrival.to_string(),
        };
        if self.last_route.as_ref() == Some(&route) {
            return false;
        }
        self.last_route = Some(route);
        true
    }
}
