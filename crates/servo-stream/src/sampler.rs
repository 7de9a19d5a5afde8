use tracing::warn;

/// Decode one record into an angle in degrees.
///
/// The record is trimmed of surrounding whitespace and parsed as a base-10
/// float. Malformed records are logged at warning severity and yield `None`
/// so the caller can keep scanning.
pub fn parse_angle(record: &str) -> Option<f64> {
    match record.trim().parse::<f64>() {
        Ok(angle) => Some(angle),
        Err(_) => {
            warn!("Invalid angle value received: {}", record);
            None
        }
    }
}

/// Degrees to radians.
pub fn degrees_to_radians(angle_deg: f64) -> f64 {
    angle_deg * std::f64::consts::PI / 180.0
}
