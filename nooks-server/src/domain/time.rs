//! Clock time handling for itineraries.
//!
//! Itinerary times travel as zero-padded "HH:MM" strings. `ClockTime` is the
//! validated form; the free functions below are the fail-soft layer used by
//! re-timing and response shaping, which degrade to a default value and log a
//! warning instead of returning an error.
//!
//! Minute arithmetic wraps modulo one day and never carries a date.

use std::fmt;

use tracing::warn;

/// Minutes in one day.
pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// Error returned when parsing an invalid time string.
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

/// A time of day with minute precision.
///
/// # Examples
///
/// ```
/// use nooks_server::domain::ClockTime;
///
/// let t = ClockTime::parse("09:05").unwrap();
/// assert_eq!(t.minutes(), 545);
/// assert_eq!(t.to_string(), "09:05");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Parse a time from "HH:MM" format.
    ///
    /// ```
    /// use nooks_server::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse("00:00").is_ok());
    /// assert!(ClockTime::parse("23:59").is_ok());
    ///
    /// assert!(ClockTime::parse("1430").is_err());
    /// assert!(ClockTime::parse("9:30").is_err());
    /// assert!(ClockTime::parse("24:00").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Ok(Self(hour * 60 + minute))
    }

    /// Build from a minute count, wrapping into a single day.
    pub fn from_minutes_wrapping(minutes: i32) -> Self {
        Self(minutes.rem_euclid(MINUTES_PER_DAY) as u16)
    }

    /// Minutes since midnight (0-1439).
    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    /// Add a signed number of minutes, wrapping past midnight.
    ///
    /// ```
    /// use nooks_server::domain::ClockTime;
    ///
    /// let t = ClockTime::parse("23:30").unwrap();
    /// assert_eq!(t.add_minutes(45).to_string(), "00:15");
    /// assert_eq!(t.add_minutes(-90).to_string(), "22:00");
    /// ```
    pub fn add_minutes(&self, delta: i32) -> Self {
        let minutes = (self.0 as i64 + delta as i64).rem_euclid(MINUTES_PER_DAY as i64);
        Self(minutes as u16)
    }

    /// Minutes from `self` forward to `later`, wrapping past midnight.
    pub fn minutes_until(&self, later: ClockTime) -> u16 {
        (later.0 as i32 - self.0 as i32).rem_euclid(MINUTES_PER_DAY) as u16
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digit bytes into a u16.
fn parse_two_digits(bytes: &[u8]) -> Option<u16> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some((d1 * 10 + d2) as u16)
}

/// Convert "HH:MM" to minutes since midnight. Malformed input yields 0.
pub fn time_to_minutes(time: &str) -> u16 {
    match ClockTime::parse(time) {
        Ok(t) => t.minutes(),
        Err(e) => {
            warn!(time, error = %e, "time_to_minutes: falling back to 0");
            0
        }
    }
}

/// Convert a minute count to "HH:MM", wrapping into a single day.
pub fn minutes_to_time(minutes: i32) -> String {
    ClockTime::from_minutes_wrapping(minutes).to_string()
}

/// Shift an "HH:MM" time by `delta` minutes.
///
/// Malformed input is returned unchanged.
pub fn add_minutes_to_time(time: &str, delta: i32) -> String {
    match ClockTime::parse(time) {
        Ok(t) => t.add_minutes(delta).to_string(),
        Err(e) => {
            warn!(time, delta, error = %e, "add_minutes_to_time: leaving time unchanged");
            time.to_string()
        }
    }
}

/// Minutes from `start` to `end`, treating an earlier `end` as the next day.
///
/// ```
/// use nooks_server::domain::time_difference;
///
/// assert_eq!(time_difference("10:00", "11:30"), 90);
/// assert_eq!(time_difference("23:00", "01:00"), 120);
/// ```
pub fn time_difference(start: &str, end: &str) -> u16 {
    match (ClockTime::parse(start), ClockTime::parse(end)) {
        (Ok(s), Ok(e)) => s.minutes_until(e),
        (Err(e), _) | (_, Err(e)) => {
            warn!(start, end, error = %e, "time_difference: falling back to 0");
            0
        }
    }
}

/// Format a minute count as "Xh Ym", dropping a zero component.
///
/// ```
/// use nooks_server::domain::format_duration;
///
/// assert_eq!(format_duration(0), "0m");
/// assert_eq!(format_duration(45), "45m");
/// assert_eq!(format_duration(120), "2h");
/// assert_eq!(format_duration(125), "2h 5m");
/// ```
pub fn format_duration(minutes: i32) -> String {
    if minutes < 0 {
        warn!(minutes, "format_duration: negative duration");
        return "0m".to_string();
    }

    let hours = minutes / 60;
    let mins = minutes % 60;

    match (hours, mins) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}

/// Opening hours of a place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpeningHours {
    AlwaysOpen,
    Closed,
    /// Open/close pairs. A close time before its open time spans midnight.
    Ranges(Vec<(ClockTime, ClockTime)>),
}

impl OpeningHours {
    /// Parse an opening-hours string.
    ///
    /// Accepts "Open 24 hours", "Closed", or one or more comma separated
    /// "HH:MM-HH:MM" ranges (an en dash and surrounding spaces are allowed).
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();

        if lower.contains("24 hours") || lower == "24/7" {
            return Ok(OpeningHours::AlwaysOpen);
        }
        if lower == "closed" {
            return Ok(OpeningHours::Closed);
        }

        let mut ranges = Vec::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            let (open, close) = part
                .split_once('-')
                .or_else(|| part.split_once('\u{2013}'))
                .ok_or_else(|| TimeError::new("expected HH:MM-HH:MM range"))?;
            ranges.push((ClockTime::parse(open.trim())?, ClockTime::parse(close.trim())?));
        }

        if ranges.is_empty() {
            return Err(TimeError::new("no opening ranges"));
        }
        Ok(OpeningHours::Ranges(ranges))
    }

    /// Whether the place is open at `time`. Close times are exclusive.
    pub fn is_open_at(&self, time: ClockTime) -> bool {
        match self {
            OpeningHours::AlwaysOpen => true,
            OpeningHours::Closed => false,
            OpeningHours::Ranges(ranges) => ranges.iter().any(|&(open, close)| {
                if open == close {
                    true
                } else if open < close {
                    open <= time && time < close
                } else {
                    time >= open || time < close
                }
            }),
        }
    }
}

/// Check an "HH:MM" time against an opening-hours string.
///
/// Unparseable input is treated as open.
pub fn is_open_at(hours: &str, time: &str) -> bool {
    let parsed = OpeningHours::parse(hours).and_then(|h| Ok((h, ClockTime::parse(time)?)));
    match parsed {
        Ok((hours, time)) => hours.is_open_at(time),
        Err(e) => {
            warn!(hours, time, error = %e, "is_open_at: assuming open");
            true
        }
    }
}
