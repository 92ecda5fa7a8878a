//! Runtime event stream payloads.

use crate::{engine::Score, types::QsoId};

/// Events emitted from the single-writer runtime loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    /// A new QSO was logged.
    Logged {
        /// Logged QSO id.
        id: QsoId,
        /// Serial sent, when a contest was running.
        serial_sent: Option<String>,
        /// True when the call/band/mode was already in the log.
        duplicate: bool,
    },
    /// An existing QSO was replaced or patched.
    Updated {
        /// Updated QSO id.
        id: QsoId,
    },
    /// A QSO was deleted.
    Removed {
        /// Removed QSO id.
        id: QsoId,
    },
    /// The log was emptied.
    Cleared,
    /// The log was replaced wholesale.
    Loaded {
        /// Records now in the log.
        count: usize,
    },
    /// QSOs were appended from ADIF text.
    Imported {
        /// Records added.
        count: usize,
    },
    /// A contest started.
    ContestStarted {
        /// Contest name.
        name: String,
    },
    /// The running contest ended.
    ContestEnded {
        /// Frozen final score.
        score: Score,
    },
    /// Score changed outside of logging (manual multiplier count).
    ScoreChanged {
        /// New score.
        score: Score,
    },
}
