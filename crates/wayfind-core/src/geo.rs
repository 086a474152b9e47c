//! Great-circle distance and its spoken form.

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Haversine distance in meters between two WGS84 points.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Human-readable distance: meters rounded to 10 below one kilometer,
/// kilometers with one decimal above. Anything that rounds to zero is
/// "less than 10 m".
pub fn format_distance(meters: f64) -> String {
    if meters < 995.0 {
        let rounded = (meters / 10.0).round() * 10.0;
        if rounded < 10.0 {
            return "less than 10 m".to_string();
        }
        format!("{} m", rounded as u64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}
