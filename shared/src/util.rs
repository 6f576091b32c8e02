//! Time helpers for "HH:MM" schedule strings

use chrono::NaiveTime;

/// Parse a 24-hour "HH:MM" string, `None` when malformed
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    let (hours, minutes) = value.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    let h: u32 = hours.parse().ok()?;
    let m: u32 = minutes.parse().ok()?;
    NaiveTime::from_hms_opt(h, m, 0)
}

/// Render as zero-padded "HH:MM"
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
