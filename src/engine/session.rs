use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::qso::Qso;

use super::{
    scoring::ManualMultipliers,
    traits::{DupeKey, ScoringRules},
};

/// Contest state-machine misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `start` while a contest is running.
    #[error("a contest is already active")]
    AlreadyActive,
    /// `end` while no contest is running.
    #[error("no contest is active")]
    NotActive,
}

/// Running score. `total` is always `points × multipliers`; every counter saturates at `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Contacts logged while active.
    pub qsos: u32,
    /// Sum of contact points.
    pub points: u32,
    /// Multiplier count.
    pub multipliers: u32,
    /// `points × multipliers`.
    pub total: u32,
}

impl Score {
    pub(crate) fn recompute_total(&mut self) {
        self.total = self.points.saturating_mul(self.multipliers);
    }
}

/// Contest state shown to the operator. Values survive `end` until the next `start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSession {
    /// True between `start` and `end`.
    pub is_active: bool,
    /// Empty until the first `start`.
    pub contest_name: String,
    /// Set by `start`.
    pub start_time: Option<DateTime<Utc>>,
    /// Set by `end`; cleared by the next `start`.
    pub end_time: Option<DateTime<Utc>>,
    /// Expected exchange, free text (e.g. `599 + Serial`).
    pub exchange: String,
    /// Next serial to send.
    pub serial_number: u32,
    /// Running score.
    pub score: Score,
}

impl Default for ContestSession {
    fn default() -> Self {
        Self {
            is_active: false,
            contest_name: String::new(),
            start_time: None,
            end_time: None,
            exchange: "599".to_string(),
            serial_number: 1,
            score: Score::default(),
        }
    }
}

/// Owns the contest session: serial numbers, score, and the multiplier rules.
///
/// Not internally synchronized. Hosts that share it across tasks go through
/// [`crate::runtime::handle::ContestLogHandle`] or wrap the whole engine in one lock, since
/// serial assignment and score accumulation form one transaction per QSO.
#[derive(Debug)]
pub struct ContestSessionEngine<R: ScoringRules = ManualMultipliers> {
    session: ContestSession,
    rules: R,
}

impl ContestSessionEngine<ManualMultipliers> {
    /// Inactive engine whose multiplier count is maintained by the caller.
    pub fn new() -> Self {
        Self::with_rules(ManualMultipliers)
    }
}

impl Default for ContestSessionEngine<ManualMultipliers> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ScoringRules> ContestSessionEngine<R> {
    /// Inactive engine using `rules` for points and multipliers.
    pub fn with_rules(rules: R) -> Self {
        Self {
            session: ContestSession::default(),
            rules,
        }
    }

    /// Starts a contest now.
    pub fn start(&mut self, name: &str, exchange: &str) -> Result<(), SessionError> {
        self.start_at(name, exchange, Utc::now())
    }

    /// Starts a contest with an explicit start time.
    pub fn start_at(&mut self, name: &str, exchange: &str, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.session.is_active {
            return Err(SessionError::AlreadyActive);
        }

        self.session = ContestSession {
            is_active: true,
            contest_name: name.to_string(),
            start_time: Some(now),
            end_time: None,
            exchange: exchange.to_string(),
            serial_number: 1,
            score: Score::default(),
        };
        self.rules.reset();

        info!(contest = name, exchange, "contest started");
        Ok(())
    }

    /// Ends the running contest now.
    pub fn end(&mut self) -> Result<(), SessionError> {
        self.end_at(Utc::now())
    }

    /// Ends the running contest; serial and score stay frozen for display.
    pub fn end_at(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if !self.session.is_active {
            return Err(SessionError::NotActive);
        }

        self.session.is_active = false;
        self.session.end_time = Some(now);

        info!(
            contest = %self.session.contest_name,
            qsos = self.session.score.qsos,
            total = self.session.score.total,
            "contest ended"
        );
        Ok(())
    }

    /// Stamps and scores a QSO about to be stored.
    ///
    /// While active: assigns `serial_sent`, advances the serial, adds the QSO's points, and lets
    /// the rules flag new multipliers. While inactive the QSO passes through unchanged.
    pub fn record_qso(&mut self, qso: &mut Qso) {
        if !self.session.is_active {
            return;
        }

        let serial = self.session.serial_number;
        qso.serial_sent = Some(serial.to_string());
        self.session.serial_number = serial.saturating_add(1);

        let new_mults = self.rules.claim_multipliers(qso);
        if new_mults > 0 {
            qso.multiplier = true;
        }

        let score = &mut self.session.score;
        score.qsos = score.qsos.saturating_add(1);
        score.points = score.points.saturating_add(qso.points);
        score.multipliers = score.multipliers.saturating_add(new_mults);
        score.recompute_total();

        debug!(call = %qso.call, serial, new_mults, total = score.total, "qso scored");
    }

    /// Points the rules award to `qso`.
    pub fn points_for(&self, qso: &Qso) -> u32 {
        self.rules.points(qso)
    }

    /// Overrides the multiplier count and recomputes the total.
    pub fn set_multipliers(&mut self, multipliers: u32) {
        self.session.score.multipliers = multipliers;
        self.session.score.recompute_total();
    }

    /// Replaces the exchange description.
    pub fn set_exchange(&mut self, exchange: impl Into<String>) {
        self.session.exchange = exchange.into();
    }

    /// Current session state.
    pub fn session(&self) -> &ContestSession {
        &self.session
    }

    /// True while a contest runs.
    pub fn is_active(&self) -> bool {
        self.session.is_active
    }

    /// Next serial to send.
    pub fn serial_number(&self) -> u32 {
        self.session.serial_number
    }

    /// Current score.
    pub fn score(&self) -> Score {
        self.session.score
    }

    /// Active multiplier rules.
    pub fn rules(&self) -> &R {
        &self.rules
    }
}

/// True when `existing` holds a QSO with the same `call`, `band`, and `mode` as `candidate`.
pub fn is_duplicate<'a>(candidate: &Qso, existing: impl IntoIterator<Item = &'a Qso>) -> bool {
    let key = DupeKey::of(candidate);
    existing.into_iter().any(|q| key.matches(q))
}
