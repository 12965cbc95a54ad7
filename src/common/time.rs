use time::Duration;

/// Formats a signed offset from now as a short relative string.
///
/// Positive durations lie in the future (`"in 5m"`), negative ones in the
/// past (`"3h ago"`). Values are rounded to whole units, and a rounded
/// value that fills its unit moves up to the next one (59.6s is `"1m"`).
pub fn format_relative_duration(duration: Duration) -> String {
    let (prefix, suffix) = if duration.is_positive() {
        ("in ", "")
    } else if duration.is_negative() {
        ("", " ago")
    } else {
        ("", "")
    };

    let abs = duration.abs();
    let secs = abs.as_seconds_f64();

    // Round within a unit before deciding whether it overflows into the next.
    let mut value = secs.round();
    let mut unit = "s";
    for (next, size, limit) in [("m", 60.0, 60.0), ("h", 3_600.0, 60.0), ("d", 86_400.0, 24.0)] {
        if value < limit {
            break;
        }
        value = (secs / size).round();
        unit = next;
    }

    format!("{prefix}{}{unit}{suffix}", value as u64)
}
