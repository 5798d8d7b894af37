use crate::error::{LoadSkipError, Result};

/// Parse a timecode string "HH:MM:SS.mmm" or "MM:SS.mmm" into total seconds.
///
/// Hours and minutes are non-negative integers, seconds is a non-negative real
/// number (fractional part optional). Any other field count is rejected.
pub fn parse(text: &str) -> Result<f64> {
    let invalid = || LoadSkipError::InvalidTimecode {
        value: text.to_string(),
    };

    let parts: Vec<&str> = text.split(':').collect();
    let (hours, minutes, seconds) = match parts.as_slice() {
        [h, m, s] => (
            h.parse::<u64>().map_err(|_| invalid())?,
            m.parse::<u64>().map_err(|_| invalid())?,
            s.parse::<f64>().map_err(|_| invalid())?,
        ),
        [m, s] => (
            0,
            m.parse::<u64>().map_err(|_| invalid())?,
            s.parse::<f64>().map_err(|_| invalid())?,
        ),
        _ => return Err(invalid()),
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }

    Ok(hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds)
}

/// Format a non-negative seconds value as "HH:MM:SS.mmm".
///
/// The value is rounded to the nearest millisecond first, half away from zero,
/// then decomposed by integer division. Negative input is out of contract.
pub fn format(seconds: f64) -> String {
    let mut total_ms = (seconds * 1000.0).round() as u64;
    let hrs = total_ms / 3_600_000;
    total_ms %= 3_600_000;
    let mins = total_ms / 60_000;
    total_ms %= 60_000;
    let secs = total_ms / 1000;
    let ms = total_ms % 1000;
    format!("{hrs:02}:{mins:02}:{secs:02}.{ms:03}")
}
