/// Placeholder rendered wherever a metric has no meaningful value.
pub const SENTINEL: &str = "-";

/// Round to one decimal place, half away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid rendering "-0.0".
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Round to the nearest integer with ties going toward positive infinity,
/// so `-2.5` becomes `-2` and `2.5` becomes `3`.
#[allow(clippy::cast_possible_truncation)]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// Ratings are scored on a 0 to 5 scale; fractional values are allowed.
pub fn is_valid_rating(rating: f64) -> bool {
    rating.is_finite() && (0.0..=5.0).contains(&rating)
}

/// Format a rating for display, dropping a trailing `.0`.
pub fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.0}/5")
    } else {
        format!("{rating}/5")
    }
}

/// Format a one-decimal average, e.g. `2.5` or `0`.
pub fn format_tenths(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}

/// Format a year-over-year change. A missing baseline is never shown as 0%.
pub fn format_delta(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d > 0 => format!("+{d}%"),
        Some(d) => format!("{d}%"),
        None => "no comparison available".to_string(),
    }
}
