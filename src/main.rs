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

mod config;
mod render;

use std::process::ExitCode;

use avwx_client::{
    count_by_hazard, normalize_route, Client, InternationalSigmetRequest, PirepRequest,
    StationSummary,
};
use clap::{Parser, Subcommand};
use config::AppConfig;
use log::{error, warn};
use render::Renderer;
use serde::Serialize;

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(name = "wx-briefing", version, about = "Flight route weather briefing")]
struct Cli {
    /// Weather data API base URL (overrides config)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Print decoded records as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Departure and arrival weather with severity bars
    Brief {
        /// Departure ICAO code (defaults to the last briefed route)
        departure: Option<String>,
        /// Arrival ICAO code (defaults to the last briefed route)
        arrival: Option<String>,
    },
    /// Latest METAR summary for a station
    Metar {
        station: String,
        /// Look-back window in hours
        #[arg(long)]
        hours: Option<f64>,
        /// Decode the latest report from the NWS station text file
        #[arg(long, conflicts_with = "hours")]
        decoded: bool,
    },
    /// Terminal aerodrome forecast for a station
    Taf { station: String },
    /// Pilot reports near a station
    Pirep {
        station: String,
        #[arg(long)]
        hours: Option<f64>,
        /// Search radius in nautical miles
        #[arg(long)]
        distance: Option<u32>,
    },
    /// International SIGMETs
    Sigmet {
        #[arg(long)]
        hazard: Option<String>,
        /// Altitude in feet
        #[arg(long)]
        level: Option<u32>,
        /// Issue date, ISO 8601 (e.g. 2025-09-20T00:00:00Z)
        #[arg(long)]
        date: Option<String>,
    },
    /// Domestic AIRMETs and SIGMETs
    Airsigmet {
        /// Show a per-hazard bar chart instead of the raw advisories
        #[arg(long)]
        chart: bool,
    },
    /// Inspect or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the configuration file path
    Path,
    /// Restore default settings
    Reset,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BoxError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_config(action: ConfigAction, config: &AppConfig) -> Result<(), BoxError> {
    match action {
        ConfigAction::Show => print_json(config)?,
        ConfigAction::Path => println!("{}", AppConfig::get_config_path()?.display()),
        ConfigAction::Reset => {
            AppConfig::default().save()?;
            println!("Configuration reset to defaults");
        }
    }
    Ok(())
}

async fn run(cli: Cli, mut config: AppConfig) -> Result<(), BoxError> {
    if let Command::Config { action } = cli.command {
        return run_config(action, &config);
    }

    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    let renderer = Renderer::new(config.color && !cli.no_color);

    match cli.command {
        Command::Brief { departure, arrival } => {
            let last = config.last_route.clone().unwrap_or_default();
            let departure = departure.unwrap_or(last.departure);
            let arrival = arrival.unwrap_or(last.arrival);
            let (departure, arrival) = normalize_route(&departure, &arrival)?;

            let client =
                Client::new(&config.client_config())?.with_metar_hours(config.metar_hours);
            let briefing = client.route_briefing(&departure, &arrival).await?;

            if cli.json {
                print_json(&briefing)?;
            } else {
                print!("{}", renderer.route_briefing(&briefing));
            }

            if config.remember_route(&departure, &arrival) {
                if let Err(e) = config.save() {
                    warn!("Failed to save last route: {}", e);
                }
            }
        }
        Command::Metar {
            station,
            decoded: true,
            ..
        } => {
            let client = Client::new(&config.client_config())?;
            let observation = client.decoded_metar(&station).await?;

            if cli.json {
                print_json(&observation)?;
            } else {
                let summary = StationSummary::from_observations(
                    &observation.station,
                    std::slice::from_ref(&observation),
                );
                print!("{}", renderer.summary_card("Decoded METAR", &summary));
                if let Some(raw) = &observation.raw_text {
                    println!("{raw}");
                }
            }
        }
        Command::Metar { station, hours, .. } => {
            let client = Client::new(&config.client_config())?
                .with_metar_hours(hours.unwrap_or(config.metar_hours));
            let observations = client.metars(&station).await?;

            if cli.json {
                print_json(&observations)?;
            } else {
                let summary = StationSummary::from_observations(
                    &station.trim().to_ascii_uppercase(),
                    &observations,
                );
                print!("{}", renderer.summary_card("Current Weather", &summary));
            }
        }
        Command::Taf { station } => {
            let client = Client::new(&config.client_config())?;
            let tafs = client.tafs(&station).await?;
            if cli.json {
                print_json(&tafs)?;
            } else if tafs.is_empty() {
                println!("No TAF available for {}", station.to_ascii_uppercase());
            } else {
                print!("{}", render::taf_lines(&tafs));
            }
        }
        Command::Pirep {
            station,
            hours,
            distance,
        } => {
            let client = Client::new(&config.client_config())?;
            let request = PirepRequest::new(&station)
                .with_hours(hours.unwrap_or(config.pirep_hours))
                .with_distance(distance.unwrap_or(config.pirep_distance_nm));
            let pireps = client.pireps(&request).await?;
            if cli.json {
                print_json(&pireps)?;
            } else if pireps.is_empty() {
                println!(
                    "No PIREPs within {} nm of {}",
                    request.distance_nm, request.center
                );
            } else {
                print!("{}", render::pirep_lines(&pireps));
            }
        }
        Command::Sigmet {
            hazard,
            level,
            date,
        } => {
            let client = Client::new(&config.client_config())?;
            let request = InternationalSigmetRequest {
                hazard: hazard.unwrap_or_else(|| config.sigmet_hazard.clone()),
                level: level.unwrap_or(config.sigmet_level),
                date,
            };
            let sigmets = client.international_sigmets(&request).await?;
            if cli.json {
                print_json(&sigmets)?;
            } else if sigmets.is_empty() {
                println!("No international SIGMETs for {}", request.hazard);
            } else {
                print!("{}", render::sigmet_lines(&sigmets));
            }
        }
        Command::Airsigmet { chart } => {
            let client = Client::new(&config.client_config())?;
            let advisories = client.air_sigmets().await?;
            let counts = count_by_hazard(&advisories);
            match (cli.json, chart) {
                (true, true) => print_json(&counts)?,
                (true, false) => print_json(&advisories)?,
                (false, true) => print!("{}", renderer.hazard_chart(&counts)),
                (false, false) => {
                    for advisory in &advisories {
                        if let Some(raw) = &advisory.raw_text {
                            println!("{raw}\n");
                        }
                    }
                    print!("{}", renderer.hazard_chart(&counts));
                }
            }
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration, using defaults: {}", e);
            AppConfig::default()
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_brief() {
        let cli = Cli::parse_from(["wx-briefing", "--no-color", "brief", "klax", "kjfk"]);
        assert!(cli.no_color);
        assert!(matches!(
            cli.command,
            Command::Brief {
                departure: Some(ref d),
                arrival: Some(ref a),
            } if d == "klax" && a == "kjfk"
        ));
    }

    #[test]
    fn test_cli_parses_pirep_options() {
        let cli = Cli::parse_from([
            "wx-briefing",
            "pirep",
            "KMCI",
            "--hours",
            "4",
            "--distance",
            "50",
            "-vv",
        ]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Command::Pirep {
                hours: Some(h),
                distance: Some(50),
                ..
            } if (h - 4.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_cli_parses_decoded_metar() {
        let cli = Cli::parse_from(["wx-briefing", "--json", "metar", "kewr", "--decoded"]);
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Metar {
                ref station,
                decoded: true,
                hours: None,
            } if station == "kewr"
        ));
        let conflicting = ["wx-briefing", "metar", "KEWR", "--decoded", "--hours", "2"];
        assert!(Cli::try_parse_from(conflicting).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
