//! Time-of-day values as they appear in the timetable sheet.
//!
//! Spreadsheet upkeep is manual, so a departure cell may hold a proper
//! time value or whatever text somebody typed. Both are kept as-is; the
//! display and ordering rules below are deliberately lenient about text.

use chrono::{NaiveTime, Timelike};
use std::fmt;

/// Sort key for times that can't be read as `HH:MM`.
///
/// Larger than any real minute-of-day, so such rows sort to the end.
pub const UNPARSEABLE_MINUTES: u32 = 99_999;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Error returned when a value can't be turned into a clock time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A departure or arrival time from the schedule sheet.
///
/// # Examples
///
/// ```
/// use timetable_server::domain::TimeOfDay;
/// use chrono::NaiveTime;
///
/// let clock = TimeOfDay::Clock(NaiveTime::from_hms_opt(9, 5, 0).unwrap());
/// assert_eq!(clock.to_string(), "09:05");
/// assert_eq!(clock.minutes_since_midnight(), 545);
///
/// let text = TimeOfDay::Text("08:05:30".to_string());
/// assert_eq!(text.to_string(), "08:05");
/// assert_eq!(text.minutes_since_midnight(), 485);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    /// A real time value (a time-formatted spreadsheet cell).
    Clock(NaiveTime),
    /// Free text, shown truncated and never reformatted.
    Text(String),
}

impl TimeOfDay {
    /// Interpret a raw cell.
    ///
    /// Spreadsheets export time-formatted cells as a fraction of a day, so a
    /// decimal such as `0.375` in `[0, 1)` becomes a [`TimeOfDay::Clock`].
    /// Bare integers and other shapes (`"0"`, `".5"`) stay typed text, as does
    /// anything else, kept verbatim as [`TimeOfDay::Text`].
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_decimal(trimmed) {
            if let Ok(time) = parse_day_fraction(trimmed) {
                return TimeOfDay::Clock(time);
            }
        }
        TimeOfDay::Text(raw.to_string())
    }

    /// Minutes since midnight, or [`UNPARSEABLE_MINUTES`].
    ///
    /// Text is read from its first five characters as `H:M`, so `"08:05:30"`
    /// and `"8:05"` both work while `"--:--"` does not.
    pub fn minutes_since_midnight(&self) -> u32 {
        match self {
            TimeOfDay::Clock(t) => t.hour() * 60 + t.minute(),
            TimeOfDay::Text(s) => text_minutes(s).unwrap_or(UNPARSEABLE_MINUTES),
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeOfDay::Clock(t) => write!(f, "{:02}:{:02}", t.hour(), t.minute()),
            TimeOfDay::Text(s) => f.write_str(first_chars(s, 5)),
        }
    }
}

/// Render a time for display: `HH:MM` for clock values, first five
/// characters for text.
pub fn format_time(time: &TimeOfDay) -> String {
    time.to_string()
}

/// Parse a spreadsheet day fraction (e.g. `0.375` for 09:00).
pub fn parse_day_fraction(s: &str) -> Result<NaiveTime, TimeError> {
    let fraction: f64 = s
        .parse()
        .map_err(|_| TimeError::new("not a number"))?;
    if !fraction.is_finite() || !(0.0..1.0).contains(&fraction) {
        return Err(TimeError::new("day fraction must be in [0, 1)"));
    }

    // Round to the nearest second; spreadsheet fractions are rarely exact.
    let secs = (fraction * SECONDS_PER_DAY).round() as u32;
    let secs = secs.min(86_399);
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .ok_or_else(|| TimeError::new("seconds out of range"))
}

/// Digits, one `.`, digits: the shape a spreadsheet writes a day fraction in.
fn is_decimal(s: &str) -> bool {
    s.split_once('.').is_some_and(|(whole, frac)| {
        !whole.is_empty()
            && !frac.is_empty()
            && whole.bytes().all(|b| b.is_ascii_digit())
            && frac.bytes().all(|b| b.is_ascii_digit())
    })
}

fn text_minutes(s: &str) -> Option<u32> {
    let head = first_chars(s, 5);
    let mut parts = head.split(':');
    let hours: i64 = parts.next()?.trim().parse().ok()?;
    let minutes: i64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    u32::try_from(hours * 60 + minutes).ok()
}

/// The first `n` characters of `s` (not bytes; stop names are Hangul).
fn first_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Zero-padded HH:MM text parses to h*60+m
        #[test]
        fn hhmm_text_minutes(h in 0u32..24, m in 0u32..60) {
            let t = TimeOfDay::Text(format!("{h:02}:{m:02}"));
            prop_assert_eq!(t.minutes_since_midnight(), h * 60 + m);
        }

        /// Clock times display as zero-padded HH:MM
        #[test]
        fn clock_display(h in 0u32..24, m in 0u32..60) {
            let t = TimeOfDay::Clock(NaiveTime::from_hms_opt(h, m, 0).unwrap());
            prop_assert_eq!(t.to_string(), format!("{h:02}:{m:02}"));
        }

        /// Text display never exceeds five characters
        #[test]
        fn text_display_at_most_five_chars(s in ".{0,20}") {
            let t = TimeOfDay::Text(s.clone());
            prop_assert!(t.to_string().chars().count() <= 5);
            prop_assert!(s.starts_with(&t.to_string()));
        }

        /// Whole-minute day fractions round-trip to the same clock time
        #[test]
        fn day_fraction_minutes(mins in 0u32..1440) {
            let fraction = mins as f64 * 60.0 / SECONDS_PER_DAY;
            let t = TimeOfDay::from_cell(&format!("{fraction:.10}"));
            prop_assert_eq!(t.minutes_since_midnight(), mins);
        }
    }
}
