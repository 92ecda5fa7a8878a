//! QSO domain record, draft, and patch types.

use serde::{Deserialize, Serialize};

use crate::types::{DEFAULT_MODE, DEFAULT_RST, QsoId};

/// One logged contact.
///
/// Field names serialize in camelCase (`rstSent`, `myGridSquare`, ...) for UI collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qso {
    /// Unique within one log.
    pub id: QsoId,
    /// Station worked, upper case by convention.
    pub call: String,
    /// `YYYY-MM-DD`, UTC.
    pub date: String,
    /// `HH:MM`, 24-hour UTC.
    pub time: String,
    /// Band name such as `"20m"`.
    pub band: String,
    /// Frequency in MHz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,
    /// Emission mode.
    pub mode: String,
    /// Report sent.
    pub rst_sent: String,
    /// Report received.
    pub rst_rcvd: String,
    /// Serial number sent; assigned by the contest engine while a contest runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_sent: Option<String>,
    /// Serial number received, kept as text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_rcvd: Option<String>,
    /// Own locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_grid_square: Option<String>,
    /// Worked station's locator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_square: Option<String>,
    /// DXCC entity number, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dxcc: Option<u32>,
    /// CQ zone, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cq_zone: Option<u8>,
    /// ITU zone, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itu_zone: Option<u8>,
    /// Free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Points computed at log time.
    pub points: u32,
    /// True when this QSO was a new multiplier at log time.
    pub multiplier: bool,
}

impl Qso {
    /// Builds a QSO with the logger defaults (`CW`, `599`/`599`, one point).
    pub fn new(
        id: impl Into<QsoId>,
        call: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
        band: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            call: call.into(),
            date: date.into(),
            time: time.into(),
            band: band.into(),
            frequency: None,
            mode: DEFAULT_MODE.to_string(),
            rst_sent: DEFAULT_RST.to_string(),
            rst_rcvd: DEFAULT_RST.to_string(),
            serial_sent: None,
            serial_rcvd: None,
            my_grid_square: None,
            grid_square: None,
            dxcc: None,
            cq_zone: None,
            itu_zone: None,
            comment: None,
            points: 1,
            multiplier: false,
        }
    }

    /// Name of the first required field (`call`, `date`, `time`, `band`) that is blank.
    pub fn missing_required_field(&self) -> Option<&'static str> {
        [
            ("call", &self.call),
            ("date", &self.date),
            ("time", &self.time),
            ("band", &self.band),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// Entry-form content for a QSO that has not been logged yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QsoDraft {
    /// Station worked.
    pub call: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    /// Band name.
    pub band: String,
    /// Frequency in MHz.
    #[serde(default)]
    pub frequency: Option<f64>,
    /// Emission mode.
    pub mode: String,
    /// Report sent.
    pub rst_sent: String,
    /// Report received.
    pub rst_rcvd: String,
    /// Serial number received.
    #[serde(default)]
    pub serial_rcvd: Option<String>,
    /// Own locator.
    #[serde(default)]
    pub my_grid_square: Option<String>,
    /// Worked station's locator.
    #[serde(default)]
    pub grid_square: Option<String>,
    /// DXCC entity number.
    #[serde(default)]
    pub dxcc: Option<u32>,
    /// CQ zone.
    #[serde(default)]
    pub cq_zone: Option<u8>,
    /// Free text.
    #[serde(default)]
    pub comment: Option<String>,
}

impl Default for QsoDraft {
    fn default() -> Self {
        Self {
            call: String::new(),
            date: String::new(),
            time: String::new(),
            band: String::new(),
            frequency: None,
            mode: DEFAULT_MODE.to_string(),
            rst_sent: DEFAULT_RST.to_string(),
            rst_rcvd: DEFAULT_RST.to_string(),
            serial_rcvd: None,
            my_grid_square: None,
            grid_square: None,
            dxcc: None,
            cq_zone: None,
            comment: None,
        }
    }
}

impl QsoDraft {
    /// Draft for `call` on `band` stamped with the current UTC date and minute.
    pub fn now(call: impl Into<String>, band: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            call: call.into(),
            band: band.into(),
            date: now.format("%Y-%m-%d").to_string(),
            time: now.format("%H:%M").to_string(),
            ..Self::default()
        }
    }

    /// Materializes the draft with `id` and `points`; `multiplier` starts false.
    pub fn into_qso(self, id: QsoId, points: u32) -> Qso {
        Qso {
            id,
            call: self.call,
            date: self.date,
            time: self.time,
            band: self.band,
            frequency: self.frequency,
            mode: self.mode,
            rst_sent: self.rst_sent,
            rst_rcvd: self.rst_rcvd,
            serial_sent: None,
            serial_rcvd: self.serial_rcvd,
            my_grid_square: self.my_grid_square,
            grid_square: self.grid_square,
            dxcc: self.dxcc,
            cq_zone: self.cq_zone,
            itu_zone: None,
            comment: self.comment,
            points,
            multiplier: false,
        }
    }
}

/// Sparse patch where each `Some` field overwrites the record value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QsoPatch {
    /// Replacement call.
    pub call: Option<String>,
    /// Replacement date.
    pub date: Option<String>,
    /// Replacement time.
    pub time: Option<String>,
    /// Replacement band.
    pub band: Option<String>,
    /// Replacement frequency.
    pub frequency: Option<f64>,
    /// Replacement mode.
    pub mode: Option<String>,
    /// Replacement report sent.
    pub rst_sent: Option<String>,
    /// Replacement report received.
    pub rst_rcvd: Option<String>,
    /// Replacement serial received.
    pub serial_rcvd: Option<String>,
    /// Replacement remote locator.
    pub grid_square: Option<String>,
    /// Replacement comment.
    pub comment: Option<String>,
    /// Replacement points.
    pub points: Option<u32>,
}

impl QsoPatch {
    /// Returns true when no fields are set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut Qso) {
        if let Some(v) = &self.call {
            rec.call = v.clone();
        }
        if let Some(v) = &self.date {
            rec.date = v.clone();
        }
        if let Some(v) = &self.time {
            rec.time = v.clone();
        }
        if let Some(v) = &self.band {
            rec.band = v.clone();
        }
        if let Some(v) = self.frequency {
            rec.frequency = Some(v);
        }
        if let Some(v) = &self.mode {
            rec.mode = v.clone();
        }
        if let Some(v) = &self.rst_sent {
            rec.rst_sent = v.clone();
        }
        if let Some(v) = &self.rst_rcvd {
            rec.rst_rcvd = v.clone();
        }
        if let Some(v) = &self.serial_rcvd {
            rec.serial_rcvd = Some(v.clone());
        }
        if let Some(v) = &self.grid_square {
            rec.grid_square = Some(v.clone());
        }
        if let Some(v) = &self.comment {
            rec.comment = Some(v.clone());
        }
        if let Some(v) = self.points {
            rec.points = v;
        }
    }
}
