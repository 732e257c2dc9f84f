//! ASS timecodes, `HH:MM:SS.cc`.
//!
//! Seconds are rounded to whole milliseconds first, then to centiseconds with
//! halves rounding up. Negative and non-finite input clamps to zero.

/// Seconds to whole centiseconds.
pub fn to_centis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    let millis = (seconds * 1000.0).round() as u64;
    (millis + 5) / 10
}

pub fn format_timecode(seconds: f64) -> String {
    format_centis(to_centis(seconds))
}

pub fn format_centis(centis: u64) -> String {
    let total_secs = centis / 100;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!(
        "{:02}:{:02}:{:02}.{:02}",
        hours,
        minutes,
        seconds,
        centis % 100
    )
}

/// Length of `[start, end]` in centiseconds, measured between the rounded
/// endpoints so consecutive durations add up to the rounded timeline.
pub fn span_centis(start: f64, end: f64) -> u64 {
    to_centis(end).saturating_sub(to_centis(start))
}
