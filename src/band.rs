//! Frequency to band lookup.

use crate::types::Band;

/// Inclusive `(band, min_mhz, max_mhz)` ranges. Declaration order is the tie-break when a
/// frequency sits on a shared boundary.
pub const BAND_TABLE: [(Band, f64, f64); 11] = [
    (Band::B160m, 1.8, 2.0),
    (Band::B80m, 3.5, 4.0),
    (Band::B40m, 7.0, 7.3),
    (Band::B30m, 10.1, 10.15),
    (Band::B20m, 14.0, 14.35),
    (Band::B17m, 18.068, 18.168),
    (Band::B15m, 21.0, 21.45),
    (Band::B12m, 24.89, 24.99),
    (Band::B10m, 28.0, 29.7),
    (Band::B6m, 50.0, 54.0),
    (Band::B2m, 144.0, 148.0),
];

const CW_SEGMENTS: [(f64, f64); 9] = [
    (1.8, 1.84),
    (3.5, 3.6),
    (7.0, 7.04),
    (10.1, 10.15),
    (14.0, 14.07),
    (18.068, 18.095),
    (21.0, 21.07),
    (24.89, 24.915),
    (28.0, 28.07),
];

/// Maps a frequency in MHz to its band, first match in [`BAND_TABLE`] order.
///
/// Returns `None` outside every allocation (including NaN).
pub fn band_for_frequency(freq_mhz: f64) -> Option<Band> {
    BAND_TABLE
        .iter()
        .find(|(_, min, max)| freq_mhz >= *min && freq_mhz <= *max)
        .map(|(band, _, _)| *band)
}

/// Guesses the mode from the CW sub-band segments: `"CW"` inside one, `"SSB"` elsewhere.
pub fn mode_for_frequency(freq_mhz: f64) -> &'static str {
    if CW_SEGMENTS
        .iter()
        .any(|(min, max)| freq_mhz >= *min && freq_mhz <= *max)
    {
        "CW"
    } else {
        "SSB"
    }
}

/// Formats MHz with three decimals (kHz resolution).
pub fn format_frequency(freq_mhz: f64) -> String {
    format!("{freq_mhz:.3}")
}
