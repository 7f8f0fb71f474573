//! Tolerant numeric extraction from dirty text cells.

/// Strips every character other than digits, `-` and `.` and parses the rest.
///
/// Returns `None` for anything that is not a finite float after stripping,
/// e.g. `"Not Available"`, `""`, `"1.2.3"` or `"--5"`.
pub fn coerce(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
