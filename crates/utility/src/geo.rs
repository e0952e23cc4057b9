use std::fmt;

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees of latitude (and, loosely, longitude) covered by one meter.
pub const DEGREES_PER_METER: f64 = 0.00900900900901 / 1000.0;

/// Number of distinct displacement directions understood by [`displace`].
pub const VARIANT_COUNT: u8 = 7;

fn to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

pub fn haversine_distance(
    latitude_1: f64,
    longitude_1: f64,
    latitude2: f64,
    longitude_2: f64,
) -> f64 {
    let lat1_rad = to_radians(latitude_1);
    let lon1_rad = to_radians(longitude_1);
    let lat2_rad = to_radians(latitude2);
    let lon2_rad = to_radians(longitude_2);

    let dlat = lat2_rad - lat1_rad;
    let dlon = lon2_rad - lon1_rad;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Moves `origin` by `meters` in one of a fixed set of directions.
///
/// | variant | latitude | longitude |
/// |---------|----------|-----------|
/// | 0       | +        | +         |
/// | 1       | -        | -         |
/// | 2       | +        | -         |
/// | 3       | 0        | +         |
/// | 4       | 0        | -         |
/// | 5       | -        | 0         |
/// | other   | -        | 0         |
///
/// Meters are converted with the flat [`DEGREES_PER_METER`] factor on both
/// axes, so the scatter is not corrected for latitude.
pub fn displace(origin: Coordinate, variant: u8, meters: f64) -> Coordinate {
    let delta = meters * DEGREES_PER_METER;
    let (lat, lon) = match variant {
        0 => (delta, delta),
        1 => (-delta, -delta),
        2 => (delta, -delta),
        3 => (0.0, delta),
        4 => (0.0, -delta),
        _ => (-delta, 0.0),
    };
    Coordinate::new(origin.latitude + lat, origin.longitude + lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNION_SQUARE: Coordinate = Coordinate {
        latitude: 37.785834,
        longitude: -122.406417,
    };

    #[test]
    fn displace_follows_direction_table() {
        let delta = 200.0 * DEGREES_PER_METER;
        let signs = [
            (1.0, 1.0),
            (-1.0, -1.0),
            (1.0, -1.0),
            (0.0, 1.0),
            (0.0, -1.0),
            (-1.0, 0.0),
            (-1.0, 0.0),
        ];
        for (variant, (lat_sign, lon_sign)) in signs.iter().enumerate() {
            let moved = displace(UNION_SQUARE, variant as u8, 200.0);
            let dlat = moved.latitude - UNION_SQUARE.latitude;
            let dlon = moved.longitude - UNION_SQUARE.longitude;
            assert!((dlat - lat_sign * delta).abs() < 1e-12, "variant {variant}");
            assert!((dlon - lon_sign * delta).abs() < 1e-12, "variant {variant}");
        }
    }

    #[test]
    fn displace_never_stays_in_place() {
        for variant in 0..VARIANT_COUNT {
            let moved = displace(UNION_SQUARE, variant, 100.0);
            assert_ne!(moved, UNION_SQUARE);
        }
    }

    #[test]
    fn out_of_range_variant_uses_fallback() {
        assert_eq!(
            displace(UNION_SQUARE, 42, 150.0),
            displace(UNION_SQUARE, 5, 150.0)
        );
    }

    #[test]
    fn haversine_of_one_degree_latitude() {
        let north = Coordinate::new(UNION_SQUARE.latitude + 1.0, UNION_SQUARE.longitude);
        let km = UNION_SQUARE.distance_km(&north);
        assert!((km - 111.19).abs() < 0.1, "got {km}");
    }

    #[test]
    fn coordinate_uses_camel_case_fields() {
        let json = serde_json::to_string(&Coordinate::new(1.5, -2.25)).unwrap();
        assert_eq!(json, r#"{"latitude":1.5,"longitude":-2.25}"#);
    }
}
