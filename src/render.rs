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

//! Terminal rendering for briefings and products.
//!
//! Severity levels are drawn as a colored bar using 24-bit ANSI escapes.
//! Labels that are missing or unknown render as "Unavailable" in gray.

use std::fmt::Write as _;

use avwx_client::{
    HazardCount, InternationalSigmet, Pirep, RouteBriefing, SeverityLevel, StationSummary, Taf,
};

/// Text shown when no severity label is available.
pub const UNAVAILABLE: &str = "Unavailable";

const CLEAR_COLOR: (u8, u8, u8) = (0x4c, 0xaf, 0x50);
const SIGNIFICANT_COLOR: (u8, u8, u8) = (0xff, 0x98, 0x00);
const SEVERE_COLOR: (u8, u8, u8) = (0xf4, 0x43, 0x36);
const UNAVAILABLE_COLOR: (u8, u8, u8) = (0xdd, 0xdd, 0xdd);
const CHART_COLOR: (u8, u8, u8) = (0x00, 0x4a, 0xad);

const BAR_WIDTH: usize = 40;
const CHART_WIDTH: usize = 30;

/// Display color for a severity label, gray for anything unrecognized.
pub fn label_color(label: Option<&str>) -> (u8, u8, u8) {
    match label.and_then(SeverityLevel::from_label) {
        Some(SeverityLevel::Clear) => CLEAR_COLOR,
        Some(SeverityLevel::SignificantWeather) => SIGNIFICANT_COLOR,
        Some(SeverityLevel::SevereWeather) => SEVERE_COLOR,
        None => UNAVAILABLE_COLOR,
    }
}

/// Display text for a severity label.
pub fn label_text(label: Option<&str>) -> &str {
    match label {
        Some(label) if SeverityLevel::from_label(label).is_some() => label,
        _ => UNAVAILABLE,
    }
}

/// Renders briefings as plain or ANSI-colored text.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint_background(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.color {
            format!("\x1b[1;97;48;2;{r};{g};{b}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn paint_foreground(&self, text: &str, (r, g, b): (u8, u8, u8)) -> String {
        if self.color {
            format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    /// A full-width bar with the label centred in it.
    pub fn severity_bar(&self, level: Option<SeverityLevel>) -> String {
        let label = level.map(SeverityLevel::label);
        let text = label_text(label);
        let bar = format!("{text:^BAR_WIDTH$}");
        if self.color {
            self.paint_background(&bar, label_color(label))
        } else {
            format!("[{}]", bar.trim_end())
        }
    }

    /// Titled summary card: summary text followed by the severity bar.
    pub fn summary_card(&self, title: &str, summary: &StationSummary) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.paint_foreground(title, CHART_COLOR));
        let _ = writeln!(out, "  {}", summary.summary_text);
        if let Some(raw) = summary.latest.as_ref().and_then(|obs| obs.raw_text.as_deref()) {
            let _ = writeln!(out, "  {raw}");
        }
        let _ = writeln!(out, "  {}", self.severity_bar(summary.level));
        out
    }

    /// Departure and arrival cards plus route totals.
    pub fn route_briefing(&self, briefing: &RouteBriefing) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Flight Route Weather Briefing: {} -> {}",
            briefing.departure.station, briefing.arrival.station
        );
        if let Some(distance) = briefing.distance_nm {
            let _ = writeln!(out, "Great-circle distance: {distance:.0} nm");
        }
        out.push('\n');
        out.push_str(&self.summary_card("Departure Weather", &briefing.departure));
        out.push('\n');
        out.push_str(&self.summary_card("Arrival Weather", &briefing.arrival));
        out.push('\n');
        let _ = writeln!(out, "Route overall: {}", self.severity_bar(briefing.overall()));
        out
    }

    /// Horizontal bar chart of advisory counts per hazard.
    pub fn hazard_chart(&self, counts: &[HazardCount]) -> String {
        let Some(max) = counts.iter().map(|c| c.count).max() else {
            return "No AIR/SIGMET advisories in effect\n".to_string();
        };
        let label_width = counts.iter().map(|c| c.hazard.len()).max().unwrap_or(0);

        let mut out = String::new();
        for entry in counts {
            let len = (entry.count * CHART_WIDTH).div_ceil(max);
            let bar = "\u{2588}".repeat(len);
            let _ = writeln!(
                out,
                "{:>label_width$} | {} {}",
                entry.hazard,
                self.paint_foreground(&bar, CHART_COLOR),
                entry.count
            );
        }
        out
    }
}

/// One line per TAF: station, validity and raw text.
pub fn taf_lines(tafs: &[Taf]) -> String {
    let mut out = String::new();
    for taf in tafs {
        let validity = match (taf.valid_from, taf.valid_to) {
            (Some(from), Some(to)) => {
                format!(" valid {} to {}", from.format("%d/%H%MZ"), to.format("%d/%H%MZ"))
            }
            _ => String::new(),
        };
        let _ = writeln!(out, "{}{}", taf.station, validity);
        if let Some(raw) = &taf.raw_text {
            let _ = writeln!(out, "  {raw}");
        }
    }
    out
}

/// One line per PIREP.
pub fn pirep_lines(pireps: &[Pirep]) -> String {
    let mut out = String::new();
    for pirep in pireps {
        let kind = pirep.report_type.as_deref().unwrap_or("PIREP");
        let aircraft = pirep.aircraft_type.as_deref().unwrap_or("UNKN");
        let level = pirep
            .flight_level_text()
            .map_or_else(String::new, |fl| format!(" FL{fl}"));
        let _ = writeln!(
            out,
            "{kind} {aircraft}{level}: {}",
            pirep.raw_text.as_deref().unwrap_or("")
        );
    }
    out
}

/// One line per international SIGMET.
pub fn sigmet_lines(sigmets: &[InternationalSigmet]) -> String {
    let mut out = String::new();
    for sigmet in sigmets {
        let fir = sigmet
            .fir_name
            .as_deref()
            .or(sigmet.station.as_deref())
            .unwrap_or("Unknown FIR");
        let hazard = match (&sigmet.qualifier, &sigmet.hazard) {
            (Some(q), Some(h)) => format!("{q} {h}"),
            (None, Some(h)) => h.clone(),
            _ => "Unknown".to_string(),
        };
        let band = match (sigmet.base_ft, sigmet.top_ft) {
            (Some(base), Some(top)) => format!(" {base}-{top} ft"),
            (None, Some(top)) => format!(" up to {top} ft"),
            _ => String::new(),
        };
        let _ = writeln!(out, "{fir}: {hazard}{band}");
    }
    out
}
