//! Great-circle distance between geographic coordinates.

/// Earth radius in kilometers, as used by the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometers between two `(latitude, longitude)`
/// pairs given in degrees.
///
/// Identical points yield 0.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1) = (lat1.to_radians(), lon1.to_radians());
    let (lat2, lon2) = (lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero() {
        assert_eq!(haversine_km(52.52, 13.405, 52.52, 13.405), 0.0);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111km() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.1, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let a = haversine_km(52.52, 13.405, 48.137, 11.575);
        let b = haversine_km(48.137, 11.575, 52.52, 13.405);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn berlin_to_munich_is_about_504km() {
        let d = haversine_km(52.52, 13.405, 48.137, 11.575);
        assert!((d - 504.0).abs() < 2.0, "got {d}");
    }
}
