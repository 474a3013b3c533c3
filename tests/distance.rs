#[macro_use]
extern crate assert_float_eq;

use rand::{rngs::StdRng, Rng, SeedableRng};
use route_playback::distance;

#[test]
fn same_point_is_zero() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let lat = rng.random_range(-90.0..90.0);
        let lng = rng.random_range(-180.0..180.0);
        assert_eq!(distance::distance_meters(lat, lng, lat, lng), 0.0);
    }
}

#[test]
fn symmetric() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let (lat1, lng1) = (rng.random_range(-90.0..90.0), rng.random_range(-180.0..180.0));
        let (lat2, lng2) = (rng.random_range(-90.0..90.0), rng.random_range(-180.0..180.0));
        assert_float_absolute_eq!(
            distance::distance_meters(lat1, lng1, lat2, lng2),
            distance::distance_meters(lat2, lng2, lat1, lng1),
            1e-6
        );
    }
}

#[test]
fn known_distances() {
    // Shanghai People's Square -> Hongqiao airport, roughly 13.6 km
    let d = distance::distance_meters(31.2304, 121.4737, 31.1979, 121.3363);
    assert!((d - 13_557.0).abs() < 10.0, "got {d}");

    // half way around the globe
    let d = distance::distance_meters(0.0, 0.0, 0.0, 180.0);
    assert_float_absolute_eq!(d, std::f64::consts::PI * 6_371_000.0, 1e-3);
}

#[test]
fn crossing_the_antimeridian_takes_the_short_way() {
    let d = distance::distance_meters(0.0, 179.9995, 0.0, -179.9995);
    assert!(d < 120.0, "got {d}");
}
