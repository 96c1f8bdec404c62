//! Shared geometry helpers: UK bounding-box validation and great-circle
//! distance, used by the geocoder and by venue distance recomputation.

const EARTH_RADIUS_MILES: f64 = 3958.7613;

/// UK mainland and surrounding islands, generously bounded. Coordinates
/// outside this box are treated as a bad geocode and dropped rather than
/// stored.
pub fn in_uk_bounding_box(latitude: f64, longitude: f64) -> bool {
    (49.0..=61.0).contains(&latitude) && (-11.0..=2.0).contains(&longitude)
}

/// Great-circle distance between two lat/lon points, in miles.
pub fn great_circle_distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_MILES * c
}
