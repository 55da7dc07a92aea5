//! `M:SS` time parsing/formatting and unit conversions for the timed stations.
//!
//! Parsing is strict: 1–2 minute digits, a colon, exactly two second digits
//! below 60. Anything else is `None` (the caller decides whether that skips a row).

/// Parse `M:SS` or `MM:SS` into whole seconds.
pub fn parse_mmss(s: &str) -> Option<u32> {
    let (m, sec) = s.trim().split_once(':')?;
    if m.is_empty() || m.len() > 2 || !m.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if sec.len() != 2 || !sec.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let minutes: u32 = m.parse().ok()?;
    let seconds: u32 = sec.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    Some(minutes * 60 + seconds)
}

/// Format whole seconds as `M:SS` (minutes unpadded).
pub fn format_mmss(total_seconds: u32) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Run input arrives in minutes; the table is indexed by whole seconds.
/// Rounds half away from zero. `None` for negative or non-finite input.
pub fn minutes_to_seconds(minutes: f64) -> Option<u32> {
    if !minutes.is_finite() || minutes < 0.0 {
        return None;
    }
    let secs = (minutes * 60.0).round();
    if secs > u32::MAX as f64 {
        return None;
    }
    Some(secs as u32)
}

/// One-decimal rounding used when displaying shuttle times.
pub fn round_tenths(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
