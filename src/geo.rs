//! Maidenhead locator geodesy.
//!
//! A locator decodes to the centre of its 2°×1° square (`+1` longitude, `+0.5` latitude from
//! the south-west corner). Subsquare letters are validated but do not move the point, so a
//! 6-character locator resolves to the same coordinate as its 4-character prefix.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Point count used by map renderers for [`great_circle_path`].
pub const DEFAULT_PATH_STEPS: usize = 50;

/// Geodesy failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    /// Locator is not `[A-R]{2}[0-9]{2}([A-X]{2})?`.
    #[error("invalid grid locator: {0:?}")]
    InvalidLocator(String),
}

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude, north positive.
    pub lat: f64,
    /// Longitude, east positive.
    pub lon: f64,
}

/// True when `locator` is a 4- or 6-character Maidenhead locator (case-insensitive).
pub fn is_valid_grid_square(locator: &str) -> bool {
    let b = locator.as_bytes();
    if b.len() != 4 && b.len() != 6 {
        return false;
    }
    let field = |c: u8| matches!(c.to_ascii_uppercase(), b'A'..=b'R');
    let subsquare = |c: u8| matches!(c.to_ascii_uppercase(), b'A'..=b'X');

    field(b[0])
        && field(b[1])
        && b[2].is_ascii_digit()
        && b[3].is_ascii_digit()
        && (b.len() == 4 || (subsquare(b[4]) && subsquare(b[5])))
}

/// Decodes a locator to the centre of its square.
pub fn grid_to_lat_lon(locator: &str) -> Result<LatLon, GeoError> {
    if !is_valid_grid_square(locator) {
        return Err(GeoError::InvalidLocator(locator.to_string()));
    }
    let b = locator.as_bytes();
    let lon_field = f64::from(b[0].to_ascii_uppercase() - b'A');
    let lat_field = f64::from(b[1].to_ascii_uppercase() - b'A');
    let lon_square = f64::from(b[2] - b'0');
    let lat_square = f64::from(b[3] - b'0');

    Ok(LatLon {
        lat: lat_field * 10.0 + lat_square - 90.0 + 0.5,
        lon: lon_field * 20.0 + lon_square * 2.0 - 180.0 + 1.0,
    })
}

/// Haversine distance between two locators, rounded to whole km.
pub fn distance_km(a: &str, b: &str) -> Result<u32, GeoError> {
    let p1 = grid_to_lat_lon(a)?;
    let p2 = grid_to_lat_lon(b)?;
    Ok(haversine_km(p1, p2).round() as u32)
}

/// Haversine distance between two points in km, unrounded.
pub fn haversine_km(p1: LatLon, p2: LatLon) -> f64 {
    let d_lat = (p2.lat - p1.lat).to_radians();
    let d_lon = (p2.lon - p1.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Initial bearing from `a` to `b` in whole degrees, `0..360`.
pub fn bearing_degrees(a: &str, b: &str) -> Result<u16, GeoError> {
    let p1 = grid_to_lat_lon(a)?;
    let p2 = grid_to_lat_lon(b)?;
    // 359.6 rounds up to 360, which wraps back to north.
    Ok((initial_bearing(p1, p2).round() as u16) % 360)
}

/// Initial bearing between two points in degrees, `[0, 360)`, unrounded.
pub fn initial_bearing(p1: LatLon, p2: LatLon) -> f64 {
    let d_lon = (p2.lon - p1.lon).to_radians();
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Path between two locators for map rendering.
///
/// Interpolates linearly in lat/lon space, not along the sphere. Renderers and saved paths
/// depend on this exact shape.
pub fn great_circle_path(a: &str, b: &str, steps: usize) -> Result<Vec<LatLon>, GeoError> {
    let start = grid_to_lat_lon(a)?;
    let end = grid_to_lat_lon(b)?;
    Ok(interpolate_path(start, end, steps))
}

/// `steps + 1` points from `start` to `end` inclusive. `steps == 0` yields only `start`.
pub fn interpolate_path(start: LatLon, end: LatLon, steps: usize) -> Vec<LatLon> {
    if steps == 0 {
        return vec![start];
    }
    (0..=steps)
        .map(|i| {
            let f = i as f64 / steps as f64;
            LatLon {
                lat: start.lat + (end.lat - start.lat) * f,
                lon: start.lon + (end.lon - start.lon) * f,
            }
        })
        .collect()
}

/// Rough CQ zone guess for a handful of regions. Not a zone database; `None` when unsure.
pub fn approximate_cq_zone(locator: &str) -> Option<u8> {
    let LatLon { lat, lon } = grid_to_lat_lon(locator).ok()?;

    if lat > 50.0 && lon > -20.0 && lon < 40.0 {
        Some(14)
    } else if lat > 25.0 && lat < 50.0 && lon > -130.0 && lon < -65.0 {
        Some(4)
    } else if lat > 25.0 && lat < 50.0 && lon > -160.0 && lon < -130.0 {
        Some(3)
    } else {
        None
    }
}
