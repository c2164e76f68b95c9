/// Rounds `value` to `places` decimals, ties away from zero.
pub fn round_half_up(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

pub fn cap(value: f64, max: f64) -> f64 {
    value.min(max)
}

/// Callers guard against a zero denominator.
pub fn ratio(numerator: f64, denominator: f64, places: u32) -> f64 {
    round_half_up(numerator / denominator, places)
}

/// `value` rounded half-up to `places` decimals, as an integer count of units
/// in the last place.
pub fn to_scaled(value: f64, places: u32) -> i64 {
    (value * 10f64.powi(places as i32)).round() as i64
}

pub fn from_scaled(units: i64, places: u32) -> f64 {
    units as f64 / 10f64.powi(places as i32)
}

/// Integer division rounding ties away from zero. `denominator` must be non-zero.
pub fn div_half_up(numerator: i64, denominator: i64) -> i64 {
    let magnitude = (2 * numerator.abs() + denominator.abs()) / (2 * denominator.abs());
    if (numerator < 0) != (denominator < 0) {
        -magnitude
    } else {
        magnitude
    }
}
