//! DX-cluster and Reverse Beacon Network spot-line parsing.
//!
//! Both parsers are line scanners over noisy telnet text: a line that does not fit yields
//! `None`. Frequencies arrive in kHz and are stored in MHz. An impossible `HHMMZ` token only
//! clears the spot's time.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::{
    band::band_for_frequency,
    geo::{self, GeoError},
    types::Band,
};

// DX de W3LPL:     7003.0  JA1ABC       CW up 2                        0430Z
static DX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)DX de ([A-Z0-9/\-]+):\s+(\d+\.\d+)\s+([A-Z0-9/\-]+)\s+(.*?)\s+(\d{4})Z")
        .expect("static DX cluster pattern")
});

// DX de DL8LAS-#:  14040.0  DF2RG        CW    24 dB  28 WPM  CQ      1150Z
static RBN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)DX de ([A-Z0-9/\-#]+):\s+(\d+\.\d+)\s+([A-Z0-9/\-]+)\s+CW\s+(-?\d+)\s+dB\s+(\d+)\s+WPM(?:\s+([A-Z]+))?(?:\s+(\d{4})Z)?",
    )
    .expect("static RBN pattern")
});

/// Spot relayed by a DX cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DxSpot {
    /// Reporting station.
    pub spotter: String,
    /// MHz.
    pub frequency: f64,
    /// Spotted station.
    pub call: String,
    /// Free text between the call and the time.
    pub comment: String,
    /// UTC time of the spot; `None` when the `HHMMZ` token is not a real time.
    pub time: Option<NaiveTime>,
    /// Derived from `frequency`.
    pub band: Option<Band>,
    /// Spotted station latitude, when its locator is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Spotted station longitude, when its locator is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Km from the operator, when both locators are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<u32>,
    /// Degrees from the operator, when both locators are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearing: Option<u16>,
}

impl DxSpot {
    /// Fills position, distance, and bearing from the operator's and the spotted station's
    /// locators. Leaves the spot untouched on error.
    pub fn locate(&mut self, my_grid: &str, their_grid: &str) -> Result<(), GeoError> {
        let pos = geo::grid_to_lat_lon(their_grid)?;
        let distance = geo::distance_km(my_grid, their_grid)?;
        let bearing = geo::bearing_degrees(my_grid, their_grid)?;

        self.latitude = Some(pos.lat);
        self.longitude = Some(pos.lon);
        self.distance = Some(distance);
        self.bearing = Some(bearing);
        Ok(())
    }
}

/// Spot from a Reverse Beacon Network skimmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RbnSpot {
    /// Skimmer call, usually with a `-#` suffix.
    pub spotter: String,
    /// MHz.
    pub frequency: f64,
    /// Spotted station.
    pub call: String,
    /// Signal-to-noise ratio in dB.
    pub snr: i32,
    /// Keying speed in WPM.
    pub speed: u32,
    /// `CQ`, `BEACON`, ... when the line carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_type: Option<String>,
    /// UTC time, when the line carries a valid one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    /// Derived from `frequency`.
    pub band: Option<Band>,
    /// Spotted station latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Spotted station longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl RbnSpot {
    /// Fills position from the spotted station's locator.
    pub fn locate(&mut self, their_grid: &str) -> Result<(), GeoError> {
        let pos = geo::grid_to_lat_lon(their_grid)?;
        self.latitude = Some(pos.lat);
        self.longitude = Some(pos.lon);
        Ok(())
    }
}

/// Either kind of parsed spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Spot {
    /// DX-cluster spot.
    Dx(DxSpot),
    /// Skimmer spot.
    Rbn(RbnSpot),
}

/// Parses a DX-cluster announcement.
pub fn parse_dx_line(line: &str) -> Option<DxSpot> {
    let cap = DX_RE.captures(line)?;
    let frequency = khz_to_mhz(&cap, 2)?;
    let time = hhmm(&cap[5]);

    Some(DxSpot {
        spotter: cap[1].to_string(),
        frequency,
        call: cap[3].to_string(),
        comment: cap[4].trim().to_string(),
        time,
        band: band_for_frequency(frequency),
        latitude: None,
        longitude: None,
        distance: None,
        bearing: None,
    })
}

/// Parses an RBN skimmer line.
pub fn parse_rbn_line(line: &str) -> Option<RbnSpot> {
    let cap = RBN_RE.captures(line)?;
    let frequency = khz_to_mhz(&cap, 2)?;
    let time = cap.get(7).and_then(|m| hhmm(m.as_str()));

    Some(RbnSpot {
        spotter: cap[1].to_string(),
        frequency,
        call: cap[3].to_string(),
        snr: cap[4].parse().ok()?,
        speed: cap[5].parse().ok()?,
        spot_type: cap.get(6).map(|m| m.as_str().to_ascii_uppercase()),
        time,
        band: band_for_frequency(frequency),
        latitude: None,
        longitude: None,
    })
}

/// Tries the RBN form first, since RBN lines also start with `DX de`.
pub fn parse_spot_line(line: &str) -> Option<Spot> {
    parse_rbn_line(line)
        .map(Spot::Rbn)
        .or_else(|| parse_dx_line(line).map(Spot::Dx))
}

fn khz_to_mhz(cap: &Captures<'_>, group: usize) -> Option<f64> {
    cap[group].parse::<f64>().ok().map(|khz| khz / 1000.0)
}

fn hhmm(token: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(token, "%H%M").ok()
}
