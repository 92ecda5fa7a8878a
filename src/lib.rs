//! Contest log domain core: QSO records, ADIF import/export, DX-cluster and RBN spot parsing,
//! Maidenhead geodesy, and contest scoring with duplicate detection.
//!
//! Everything here works on strings and records already in memory. Sockets, files, settings,
//! and rendering belong to the host application.
//!
//! # Examples
//!
//! Scoring a short contest with [`engine::ContestSessionEngine`]:
//! ```
//! use contestlog::{
//!     adif::{decode_adif, encode_adif},
//!     engine::ContestSessionEngine,
//!     qso::Qso,
//! };
//!
//! let mut engine = ContestSessionEngine::new();
//! engine.start("CQ WPX", "599 + Serial").expect("start");
//! engine.set_multipliers(1);
//!
//! let mut qso = Qso::new("1", "K1ABC", "2024-06-15", "14:30", "20m");
//! engine.record_qso(&mut qso);
//! assert_eq!(qso.serial_sent.as_deref(), Some("1"));
//! assert_eq!(engine.score().total, 1);
//!
//! let text = encode_adif(&[qso]);
//! assert!(text.contains("<QSO_DATE:8>20240615<TIME_ON:4>1430"));
//! assert_eq!(decode_adif(&text)[0].call, "K1ABC");
//! ```
//!
//! Runtime usage, where one task owns the log and the engine:
//! ```no_run
//! use contestlog::{
//!     core::log::QsoLog,
//!     engine::ContestSessionEngine,
//!     qso::QsoDraft,
//!     runtime::handle::{spawn_contest_log, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_contest_log(QsoLog::new(), ContestSessionEngine::new(), RuntimeConfig::default());
//! handle.start_contest("CQ WW", "599 + Zone").await.expect("start");
//! let out = handle.log_qso(QsoDraft::now("JA1ABC", "20m")).await.expect("log");
//! assert!(!out.duplicate);
//! let adi = handle.export_adif().await.expect("export");
//! # let _ = adi;
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![warn(missing_docs)]

/// ADIF encode/decode.
pub mod adif;
/// Frequency to band lookup.
pub mod band;
/// In-memory QSO log and statistics.
pub mod core;
/// Contest session engine and scoring rules.
pub mod engine;
/// Maidenhead locator geodesy.
pub mod geo;
/// QSO domain records and patches.
pub mod qso;
/// Single-writer runtime handle and events.
pub mod runtime;
/// DX-cluster and RBN spot parsing.
pub mod spot;
/// Shared primitive types and enums.
pub mod types;

pub use adif::{decode_adif, encode_adif};
pub use band::band_for_frequency;
pub use geo::{GeoError, LatLon, bearing_degrees, distance_km, great_circle_path, grid_to_lat_lon};
pub use spot::{DxSpot, RbnSpot, parse_dx_line, parse_rbn_line};
