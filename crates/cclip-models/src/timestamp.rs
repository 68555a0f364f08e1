//! Timestamp formatting for logs and reports.

/// Format seconds as `HH:MM:SS` or `HH:MM:SS.mmm`.
///
/// Negative inputs are clamped to zero.
///
/// # Examples
/// ```
/// use cclip_models::timestamp::format_seconds;
/// assert_eq!(format_seconds(90.0), "00:01:30");
/// assert_eq!(format_seconds(3661.5), "01:01:01.500");
/// ```
pub fn format_seconds(total_secs: f64) -> String {
    let total_secs = total_secs.max(0.0);
    let whole_ms = (total_secs * 1000.0).round() as u64;
    let hours = whole_ms / 3_600_000;
    let mins = (whole_ms % 3_600_000) / 60_000;
    let secs = (whole_ms % 60_000) / 1000;
    let millis = whole_ms % 1000;

    if millis > 0 {
        format!("{:02}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}
