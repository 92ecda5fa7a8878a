//! Single-writer runtime owning the log and the contest engine.

/// Runtime event types.
pub mod events;
/// Runtime handle and command loop.
pub mod handle;
