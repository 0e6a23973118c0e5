/// Renders seconds as `H:MM:SS`, rounded to the nearest whole second with
/// ties going to the even second (`2.5` → `0:00:02`, `3.5` → `0:00:04`).
///
/// Hours are not zero-padded and grow past two digits instead of wrapping
/// into days, so `3725.4` becomes `1:02:05` and `36000.0` becomes `10:00:00`.
/// Negative input is a caller error; release builds clamp it to zero.
pub fn format_timestamp(seconds: f64) -> String {
    debug_assert!(seconds >= 0.0, "negative timestamp: {seconds}");
    let total = seconds.max(0.0).round_ties_even() as u64;
    let hours = total / 3600;
    let minutes = total / 60 % 60;
    let secs = total % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

/// Parses a timestamp produced by [`format_timestamp`] back into seconds.
pub fn parse_timestamp(text: &str) -> Option<f64> {
    let mut parts = text.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes = parse_sexagesimal(parts.next()?)?;
    let secs = parse_sexagesimal(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    let total = hours.checked_mul(3600)?.checked_add(minutes * 60 + secs)?;
    Some(total as f64)
}

fn parse_sexagesimal(part: &str) -> Option<u64> {
    if part.len() != 2 {
        return None;
    }
    part.parse().ok().filter(|v| *v < 60)
}

/// Length of the intersection of `[a_start, a_end]` and `[b_start, b_end]`.
///
/// Intervals that only touch at an endpoint overlap by exactly `0.0`.
pub fn overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}
