use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::qso::Qso;

use super::log::QsoLog;

/// Hourly QSO rates shown during a contest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
    /// Rate over the last 10 minutes, per hour.
    pub last10: u32,
    /// Rate over the last 60 minutes, per hour.
    pub last60: u32,
    /// Average rate since the contest started, per hour.
    pub total: u32,
}

impl Rates {
    /// Rates at `now`; `total` is 0 without a start time or before it.
    pub fn compute(log: &QsoLog, now: NaiveDateTime, started: Option<NaiveDateTime>) -> Self {
        let total = started
            .map(|start| {
                let hours = (now - start).num_milliseconds() as f64 / 3_600_000.0;
                if hours <= 0.0 {
                    return 0;
                }
                let count = log
                    .iter()
                    .filter_map(qso_timestamp)
                    .filter(|ts| *ts >= start)
                    .count();
                (count as f64 / hours).round() as u32
            })
            .unwrap_or(0);

        Self {
            last10: rate_per_hour(log, now, 10),
            last60: rate_per_hour(log, now, 60),
            total,
        }
    }
}

/// QSOs logged at or after `now - minutes`, scaled to an hourly rate and rounded.
pub fn rate_per_hour(log: &QsoLog, now: NaiveDateTime, minutes: u32) -> u32 {
    if minutes == 0 {
        return 0;
    }
    let cutoff = now - Duration::minutes(i64::from(minutes));
    let recent = log
        .iter()
        .filter_map(qso_timestamp)
        .filter(|ts| *ts >= cutoff)
        .count();
    (recent as f64 / f64::from(minutes) * 60.0).round() as u32
}

/// QSO count per band name.
pub fn band_counts(log: &QsoLog) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for qso in log.iter() {
        *counts.entry(qso.band.clone()).or_insert(0) += 1;
    }
    counts
}

/// `date` + `time` as a naive UTC timestamp; `None` when either is malformed.
pub fn qso_timestamp(qso: &Qso) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{} {}", qso.date, qso.time), "%Y-%m-%d %H:%M").ok()
}
