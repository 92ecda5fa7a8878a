//! Shared primitive IDs and contest-related enums.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Opaque QSO identifier, unique within one log.
pub type QsoId = String;

/// Amateur band from the fixed allocation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Band {
    /// 160 meters.
    #[serde(rename = "160m")]
    B160m,
    /// 80 meters.
    #[serde(rename = "80m")]
    B80m,
    /// 40 meters.
    #[serde(rename = "40m")]
    B40m,
    /// 30 meters.
    #[serde(rename = "30m")]
    B30m,
    /// 20 meters.
    #[serde(rename = "20m")]
    B20m,
    /// 17 meters.
    #[serde(rename = "17m")]
    B17m,
    /// 15 meters.
    #[serde(rename = "15m")]
    B15m,
    /// 12 meters.
    #[serde(rename = "12m")]
    B12m,
    /// 10 meters.
    #[serde(rename = "10m")]
    B10m,
    /// 6 meters.
    #[serde(rename = "6m")]
    B6m,
    /// 2 meters.
    #[serde(rename = "2m")]
    B2m,
}

impl Band {
    /// Every band, lowest frequency first.
    pub const ALL: [Band; 11] = [
        Band::B160m,
        Band::B80m,
        Band::B40m,
        Band::B30m,
        Band::B20m,
        Band::B17m,
        Band::B15m,
        Band::B12m,
        Band::B10m,
        Band::B6m,
        Band::B2m,
    ];

    /// Band name as stored on a QSO, e.g. `"20m"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Band::B160m => "160m",
            Band::B80m => "80m",
            Band::B40m => "40m",
            Band::B30m => "30m",
            Band::B20m => "20m",
            Band::B17m => "17m",
            Band::B15m => "15m",
            Band::B12m => "12m",
            Band::B10m => "10m",
            Band::B6m => "6m",
            Band::B2m => "2m",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a band name is not in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown band: {0}")]
pub struct UnknownBand(pub String);

impl FromStr for Band {
    type Err = UnknownBand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Band::ALL
            .into_iter()
            .find(|b| b.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownBand(s.to_string()))
    }
}

/// Default mode for new QSOs; the logger is CW-contest oriented.
pub const DEFAULT_MODE: &str = "CW";
/// Default signal report for both directions.
pub const DEFAULT_RST: &str = "599";
