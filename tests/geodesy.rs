use proptest::prelude::*;

use contestlog::geo::{
    DEFAULT_PATH_STEPS, GeoError, LatLon, approximate_cq_zone, bearing_degrees, distance_km,
    great_circle_path, grid_to_lat_lon, interpolate_path, is_valid_grid_square,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fn20_decodes_to_square_centre() {
    let p = grid_to_lat_lon("FN20").expect("valid");
    assert!(close(p.lat, 40.5), "lat {}", p.lat);
    assert!(close(p.lon, -79.0), "lon {}", p.lon);
}

#[test]
fn decoding_ignores_case_and_subsquare() {
    let base = grid_to_lat_lon("FN20").expect("valid");
    assert_eq!(grid_to_lat_lon("fn20").expect("lower"), base);
    assert_eq!(grid_to_lat_lon("FN20xr").expect("six"), base);
}

#[test]
fn corner_locators_decode() {
    let aa = grid_to_lat_lon("AA00").expect("valid");
    assert!(close(aa.lat, -89.5) && close(aa.lon, -179.0));

    let rr = grid_to_lat_lon("RR99").expect("valid");
    assert!(close(rr.lat, 89.5) && close(rr.lon, 179.0));
}

#[test]
fn malformed_locators_are_rejected() {
    for bad in ["", "FN2", "FN200", "SN20", "FS20", "FNAB", "FN20YA", "FN20A1", "FN20xrx", "F-20"] {
        assert!(!is_valid_grid_square(bad), "{bad:?} accepted");
        assert_eq!(
            grid_to_lat_lon(bad),
            Err(GeoError::InvalidLocator(bad.to_string()))
        );
    }
}

#[test]
fn errors_propagate_from_either_endpoint() {
    assert!(distance_km("FN20", "ZZ99").is_err());
    assert!(bearing_degrees("??", "FN20").is_err());
    assert!(great_circle_path("FN20", "", 10).is_err());
}

#[test]
fn distance_and_bearing_new_york_to_london() {
    // FN20 centre (40.5, -79) to IO91 centre (51.5, -1).
    let d = distance_km("FN20", "IO91").expect("distance");
    assert!((5_500..6_300).contains(&d), "distance {d}");

    let b = bearing_degrees("FN20", "IO91").expect("bearing");
    assert!((35..65).contains(&b), "bearing {b}");
}

#[test]
fn same_square_is_zero_distance() {
    assert_eq!(distance_km("JO01", "jo01ab").expect("distance"), 0);
}

#[test]
fn due_north_and_south_along_a_meridian() {
    assert_eq!(bearing_degrees("FN20", "FN25").expect("north"), 0);
    assert_eq!(bearing_degrees("FN25", "FN20").expect("south"), 180);
    assert_eq!(distance_km("FN20", "FN25").expect("distance"), 556);
}

#[test]
fn path_is_linear_and_inclusive() {
    let path = great_circle_path("FN20", "IO91", DEFAULT_PATH_STEPS).expect("path");
    assert_eq!(path.len(), DEFAULT_PATH_STEPS + 1);

    let start = grid_to_lat_lon("FN20").expect("a");
    let end = grid_to_lat_lon("IO91").expect("b");
    assert!(close(path[0].lat, start.lat) && close(path[0].lon, start.lon));
    assert!(close(path[50].lat, end.lat) && close(path[50].lon, end.lon));

    let mid = path[25];
    assert!(close(mid.lat, (start.lat + end.lat) / 2.0));
    assert!(close(mid.lon, (start.lon + end.lon) / 2.0));
}

#[test]
fn zero_step_path_is_just_the_start() {
    let a = LatLon { lat: 1.0, lon: 2.0 };
    let b = LatLon { lat: 3.0, lon: 4.0 };
    assert_eq!(interpolate_path(a, b, 0), vec![a]);
    assert_eq!(interpolate_path(a, b, 1), vec![a, b]);
}

#[test]
fn rough_cq_zones() {
    assert_eq!(approximate_cq_zone("IO91"), Some(14));
    assert_eq!(approximate_cq_zone("FN20"), Some(4));
    assert_eq!(approximate_cq_zone("PM95"), None);
    assert_eq!(approximate_cq_zone("bogus"), None);
}

fn locator() -> impl Strategy<Value = String> {
    (0u8..18, 0u8..18, 0u8..10, 0u8..10).prop_map(|(a, b, c, d)| {
        format!(
            "{}{}{}{}",
            (b'A' + a) as char,
            (b'A' + b) as char,
            (b'0' + c) as char,
            (b'0' + d) as char
        )
    })
}

proptest! {
    #[test]
    fn distance_is_symmetric(a in locator(), b in locator()) {
        prop_assert_eq!(distance_km(&a, &b).unwrap(), distance_km(&b, &a).unwrap());
    }

    #[test]
    fn bearing_stays_in_range(a in locator(), b in locator()) {
        prop_assert!(bearing_degrees(&a, &b).unwrap() < 360);
    }

    #[test]
    fn meridian_bearings_are_reciprocal(field in 0u8..18, square in 0u8..10, lat_a in 0u8..180, lat_b in 0u8..180) {
        prop_assume!(lat_a != lat_b);
        let loc = |lat: u8| format!(
            "{}{}{}{}",
            (b'A' + field) as char,
            (b'A' + lat / 10) as char,
            (b'0' + square) as char,
            (b'0' + lat % 10) as char
        );
        let (a, b) = (loc(lat_a), loc(lat_b));
        let forward = i32::from(bearing_degrees(&a, &b).unwrap());
        let back = i32::from(bearing_degrees(&b, &a).unwrap());
        let diff = (forward - back).rem_euclid(360);
        prop_assert!((179..=181).contains(&diff), "{} -> {}: {} vs {}", a, b, forward, back);
    }
}
