//! Recording length value object for timed recordings

use std::fmt;
use std::str::FromStr;
use std::time::Duration as StdDuration;

use crate::domain::error::DurationParseError;

/// Default length of a timed recording (30 seconds)
pub const DEFAULT_DURATION_SECS: u64 = 30;

/// Length of a timed recording. Always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Duration {
    seconds: u64,
}

impl Duration {
    /// Create a Duration from whole seconds
    pub const fn from_secs(seconds: u64) -> Self {
        Self { seconds }
    }

    pub const fn default_duration() -> Self {
        Self::from_secs(DEFAULT_DURATION_SECS)
    }

    pub const fn as_secs(&self) -> u64 {
        self.seconds
    }

    pub const fn as_std(&self) -> StdDuration {
        StdDuration::from_secs(self.seconds)
    }
}

impl FromStr for Duration {
    type Err = DurationParseError;

    /// Accepts "45s", "2m", "1m30s"; minutes must come before seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError { input: s.to_string() };
        let input = s.trim().to_ascii_lowercase();

        let (minutes_part, seconds_part) = match input.split_once('m') {
            Some((minutes, rest)) => (Some(minutes), rest),
            None => (None, input.as_str()),
        };

        let minutes = match minutes_part {
            Some(digits) => parse_component(digits).ok_or_else(invalid)?,
            None => 0,
        };

        let seconds = if seconds_part.is_empty() {
            if minutes_part.is_none() {
                return Err(invalid());
            }
            0
        } else {
            let digits = seconds_part.strip_suffix('s').ok_or_else(invalid)?;
            parse_component(digits).ok_or_else(invalid)?
        };

        let total = minutes
            .checked_mul(60)
            .and_then(|m| m.checked_add(seconds))
            .ok_or_else(invalid)?;
        if total == 0 {
            return Err(invalid());
        }

        Ok(Self::from_secs(total))
    }
}

fn parse_component(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let minutes = self.seconds / 60;
        let seconds = self.seconds % 60;
        match (minutes, seconds) {
            (0, s) => write!(f, "{}s", s),
            (m, 0) => write!(f, "{}m", m),
            (m, s) => write!(f, "{}m{}s", m, s),
        }
    }
}

impl Default for Duration {
    fn default() -> Self {
        Self::default_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_seconds_only() {
        let d: Duration = "45s".parse().unwrap();
        assert_eq!(d.as_secs(), 45);
    }

    #[test]
    fn parse_minutes_only() {
        let d: Duration = "2m".parse().unwrap();
        assert_eq!(d.as_secs(), 120);
    }

    #[test]
    fn parse_minutes_and_seconds() {
        let d: Duration = "1m30s".parse().unwrap();
        assert_eq!(d.as_secs(), 90);
    }

    #[test]
    fn parse_ignores_case_and_whitespace() {
        assert_eq!(" 1M5S ".parse::<Duration>().unwrap().as_secs(), 65);
    }

    #[test]
    fn parse_rejects_garbage() {
        for input in ["", "30", "abc", "30x", "s", "m", "1s30m", "1m1m", "-5s", "0s", "0m0s"] {
            assert!(input.parse::<Duration>().is_err(), "accepted {:?}", input);
        }
    }

    #[test]
    fn display_round_trips_common_values() {
        assert_eq!(Duration::from_secs(30).to_string(), "30s");
        assert_eq!(Duration::from_secs(120).to_string(), "2m");
        assert_eq!(Duration::from_secs(150).to_string(), "2m30s");
    }

    #[test]
    fn as_std_duration() {
        assert_eq!(Duration::from_secs(7).as_std(), StdDuration::from_secs(7));
    }

    #[test]
    fn default_is_thirty_seconds() {
        assert_eq!(Duration::default().as_secs(), 30);
    }
}
