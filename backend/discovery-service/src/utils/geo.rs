// Geographic helpers: Haversine distance and coordinate validation.

use crate::models::GeoPoint;

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude().to_radians();
    let lat2 = b.latitude().to_radians();
    let delta_lat = (b.latitude() - a.latitude()).to_radians();
    let delta_lng = (b.longitude() - a.longitude()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push h slightly above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// True when both values are finite and inside the WGS84 degree ranges.
pub fn is_valid_coordinates(latitude: f64, longitude: f64) -> bool {
    latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude)
}

/// Lenient parse of a raw query-string coordinate.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Builds a point from raw latitude/longitude strings.
///
/// Any missing, non-numeric or out-of-range input yields `None`, which callers
/// treat as "no location" rather than as a failure.
pub fn parse_geo_point(latitude: Option<&str>, longitude: Option<&str>) -> Option<GeoPoint> {
    let latitude = parse_coordinate(latitude?)?;
    let longitude = parse_coordinate(longitude?)?;
    GeoPoint::new(latitude, longitude)
}
