const EARTH_RADIUS: f64 = 6371000.0; // unit: meter

const MS_TO_KMH: f64 = 3.6;

// https://en.wikipedia.org/wiki/Haversine_formula
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS * c
}

/// `delta_seconds` is not checked here, a zero or negative value gives a
/// non-finite or negative result and it is up to the caller to deal with it.
pub fn speed_kmh(distance_m: f64, delta_seconds: f64) -> f64 {
    distance_m / delta_seconds * MS_TO_KMH
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = f64::powi(10.0, decimals);
    (value * factor).round() / factor
}

/// Nearest integer, halves towards positive infinity (-0.5 gives 0, not -1).
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use crate::distance::{distance_meters, round_half_up, round_to, speed_kmh};

    #[test]
    fn one_degree_on_equator() {
        let d = distance_meters(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn nan_propagates() {
        assert!(distance_meters(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }

    #[test]
    fn speed() {
        // 100 m in 10 s is 36 km/h
        assert_eq!(speed_kmh(100.0, 10.0), 36.0);
        assert!(speed_kmh(100.0, 0.0).is_infinite());
        assert!(speed_kmh(0.0, 0.0).is_nan());
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(12.344, 2), 12.34);
        assert_eq!(round_to(-1.005, 0), -1.0);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(2.4), 2.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-1.6), -2.0);
    }
}
