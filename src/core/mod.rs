//! In-memory QSO log, index helpers, and log statistics.

/// Helper index aliases.
pub mod indices;
/// Ordered QSO log with call and duplicate indices.
pub mod log;
/// Band counts and QSO rates.
pub mod stats;
