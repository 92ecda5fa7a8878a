use crate::qso::Qso;

/// Identity of a contact for duplicate checking: exact `call`, `band`, and `mode` strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DupeKey {
    /// Call as stored.
    pub call: String,
    /// Band name as stored.
    pub band: String,
    /// Mode as stored.
    pub mode: String,
}

impl DupeKey {
    /// Key from loose parts.
    pub fn new(call: impl Into<String>, band: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            call: call.into(),
            band: band.into(),
            mode: mode.into(),
        }
    }

    /// Key of a logged QSO.
    pub fn of(qso: &Qso) -> Self {
        Self::new(qso.call.as_str(), qso.band.as_str(), qso.mode.as_str())
    }

    /// True when `qso` has this identity.
    pub fn matches(&self, qso: &Qso) -> bool {
        self.call == qso.call && self.band == qso.band && self.mode == qso.mode
    }
}

/// Contest-specific scoring policy consulted by the session engine.
///
/// The engine owns score arithmetic (`total = points × multipliers`); rules only decide how many
/// points a contact is worth and whether it opens new multipliers.
pub trait ScoringRules: Send + 'static {
    /// Points for a contact about to be logged.
    fn points(&self, _qso: &Qso) -> u32 {
        1
    }

    /// Records `qso` and returns how many multipliers it opened.
    fn claim_multipliers(&mut self, qso: &Qso) -> u32;

    /// Forgets every claimed multiplier; called when a contest starts.
    fn reset(&mut self);
}

impl<R: ScoringRules + ?Sized> ScoringRules for Box<R> {
    fn points(&self, qso: &Qso) -> u32 {
        (**self).points(qso)
    }

    fn claim_multipliers(&mut self, qso: &Qso) -> u32 {
        (**self).claim_multipliers(qso)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
