//! Contest session engine and scoring rules.

/// Contest families, multiplier rules, and full-log scoring.
pub mod scoring;
/// Session state machine, score, and duplicate check.
pub mod session;
/// Scoring-rules trait and duplicate key.
pub mod traits;

pub use scoring::{ContestKind, ManualMultipliers, PrefixMultipliers, ZoneCountryMultipliers, calculate_score};
pub use session::{ContestSession, ContestSessionEngine, Score, SessionError, is_duplicate};
pub use traits::{DupeKey, ScoringRules};
