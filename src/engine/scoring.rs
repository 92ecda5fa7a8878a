use std::{str::FromStr, sync::LazyLock};

use hashbrown::HashSet;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::qso::Qso;

use super::{session::Score, traits::ScoringRules};

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z0-9]+[0-9])").expect("static prefix pattern"));

static CALLSIGN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{1,3}[0-9][A-Z0-9]{0,3}[A-Z]$").expect("static callsign pattern")
});

/// WPX-style prefix: the longest leading alphanumeric run ending in a digit, else the call.
///
/// Portable designators and other special cases are not handled.
pub fn extract_prefix(call: &str) -> String {
    let upper = call.to_ascii_uppercase();
    match PREFIX_RE.captures(&upper) {
        Some(cap) => cap[1].to_string(),
        None => upper,
    }
}

/// Loose structural callsign check (case-insensitive).
pub fn is_valid_callsign(call: &str) -> bool {
    CALLSIGN_RE.is_match(&call.to_ascii_uppercase())
}

/// Multiplier count supplied by the operator via
/// [`ContestSessionEngine::set_multipliers`](super::session::ContestSessionEngine::set_multipliers).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualMultipliers;

impl ScoringRules for ManualMultipliers {
    fn claim_multipliers(&mut self, _qso: &Qso) -> u32 {
        0
    }

    fn reset(&mut self) {}
}

/// CQ WPX: every distinct prefix is a multiplier.
#[derive(Debug, Clone, Default)]
pub struct PrefixMultipliers {
    seen: HashSet<String>,
}

impl PrefixMultipliers {
    /// Number of prefixes claimed so far.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True before the first claim.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl ScoringRules for PrefixMultipliers {
    fn claim_multipliers(&mut self, qso: &Qso) -> u32 {
        u32::from(self.seen.insert(extract_prefix(&qso.call)))
    }

    fn reset(&mut self) {
        self.seen.clear();
    }
}

/// CQ WW: distinct DXCC entities plus distinct CQ zones, from the fields carried on the QSO.
#[derive(Debug, Clone, Default)]
pub struct ZoneCountryMultipliers {
    entities: HashSet<u32>,
    zones: HashSet<u8>,
}

impl ScoringRules for ZoneCountryMultipliers {
    fn claim_multipliers(&mut self, qso: &Qso) -> u32 {
        let entity = qso.dxcc.is_some_and(|d| self.entities.insert(d));
        let zone = qso.cq_zone.is_some_and(|z| self.zones.insert(z));
        u32::from(entity) + u32::from(zone)
    }

    fn reset(&mut self) {
        self.entities.clear();
        self.zones.clear();
    }
}

/// Contest families with known multiplier rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContestKind {
    /// CQ World Wide: DXCC entities and CQ zones.
    CqWw,
    /// CQ WPX: prefixes.
    CqWpx,
    /// Anything else: multipliers tracked by hand.
    Generic,
}

impl ContestKind {
    /// Fresh rules for this contest family.
    pub fn rules(self) -> Box<dyn ScoringRules> {
        match self {
            ContestKind::CqWw => Box::new(ZoneCountryMultipliers::default()),
            ContestKind::CqWpx => Box::new(PrefixMultipliers::default()),
            ContestKind::Generic => Box::new(ManualMultipliers),
        }
    }
}

impl FromStr for ContestKind {
    type Err = std::convert::Infallible;

    /// `"CQ WW"` and `"CQ WPX"` (any case, any spacing); everything else is generic.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        Ok(match compact.as_str() {
            "CQWW" => ContestKind::CqWw,
            "CQWPX" => ContestKind::CqWpx,
            _ => ContestKind::Generic,
        })
    }
}

/// Scores a whole log from scratch. Zero-point QSOs count as one point.
pub fn calculate_score(qsos: &[Qso], kind: ContestKind) -> Score {
    let mut rules = kind.rules();
    let mut score = Score {
        qsos: u32::try_from(qsos.len()).unwrap_or(u32::MAX),
        ..Score::default()
    };

    for qso in qsos {
        score.points = score.points.saturating_add(qso.points.max(1));
        score.multipliers = score.multipliers.saturating_add(rules.claim_multipliers(qso));
    }

    score.recompute_total();
    score
}
