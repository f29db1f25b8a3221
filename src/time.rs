//! Minute-of-day arithmetic, time filters and timestamp parsing.

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Number of minute slots in a day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Slider value that means "no filter".
pub const ANY_TIME: i32 = -1;

const ANY_TIME_LABEL: &str = "(any time)";

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Returns `hour * 60 + minute` for a timestamp, dropping seconds.
pub fn minute_of_day(ts: &NaiveDateTime) -> u16 {
    (ts.hour() * 60 + ts.minute()) as u16
}

/// Parses a trip timestamp into its wall-clock date and time.
///
/// Timestamps carrying an offset keep the wall clock of that offset.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();

    for format in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts);
        }
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.naive_local())
        .map_err(|_| anyhow!("unrecognised timestamp '{raw}'"))
}

/// Formats a minute-of-day the way the slider label shows it, e.g. `8:05 AM`.
pub fn format_time(minutes: u16) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    let hour = minutes / 60;
    let minute = minutes % 60;
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{hour12}:{minute:02} {meridiem}")
}

/// Time-of-day filter selected on the slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    /// Every trip, regardless of time.
    #[default]
    Any,
    /// Trips around the given minute-of-day.
    At(u16),
}

impl TimeFilter {
    /// Builds a filter from a raw slider value, where `-1` means any time.
    pub fn from_slider(value: i32) -> Result<Self> {
        match value {
            ANY_TIME => Ok(TimeFilter::Any),
            v if (0..MINUTES_PER_DAY as i32).contains(&v) => Ok(TimeFilter::At(v as u16)),
            v => bail!("slider value {v} is outside -1..=1439"),
        }
    }

    pub fn slider_value(&self) -> i32 {
        match self {
            TimeFilter::Any => ANY_TIME,
            TimeFilter::At(m) => *m as i32,
        }
    }

    pub fn is_filtered(&self) -> bool {
        matches!(self, TimeFilter::At(_))
    }

    /// Text shown next to the slider.
    pub fn label(&self) -> String {
        match self {
            TimeFilter::Any => ANY_TIME_LABEL.to_string(),
            TimeFilter::At(m) => format_time(*m),
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Accepts `any`, a slider value (`-1`, `0`..`1439`) or a clock time `HH:MM`.
impl FromStr for TimeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("any") {
            return Ok(TimeFilter::Any);
        }

        if let Some((h, m)) = s.split_once(':') {
            let hour: u16 = h.parse().map_err(|_| anyhow!("invalid hour in '{s}'"))?;
            let minute: u16 = m.parse().map_err(|_| anyhow!("invalid minute in '{s}'"))?;
            if hour >= 24 || minute >= 60 {
                bail!("time '{s}' is not a valid time of day");
            }
            return Ok(TimeFilter::At(hour * 60 + minute));
        }

        let value: i32 = s
            .parse()
            .map_err(|_| anyhow!("expected 'any', HH:MM or a minute value, got '{s}'"))?;
        TimeFilter::from_slider(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minute_of_day_drops_seconds() {
        let ts = parse_timestamp("2024-03-01 08:05:59.999").unwrap();
        assert_eq!(minute_of_day(&ts), 485);
    }

    #[test]
    fn test_minute_of_day_bounds() {
        let midnight = parse_timestamp("2024-03-01 00:00:00").unwrap();
        let last = parse_timestamp("2024-03-01 23:59:30").unwrap();
        assert_eq!(minute_of_day(&midnight), 0);
        assert_eq!(minute_of_day(&last), 1439);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T08:05:00").is_ok());
        assert!(parse_timestamp("2024-03-01 08:05").is_ok());
        assert!(parse_timestamp("not a date").is_err());
    }

    #[test]
    fn test_parse_timestamp_keeps_offset_wall_clock() {
        let ts = parse_timestamp("2024-03-01T08:05:00-05:00").unwrap();
        assert_eq!(minute_of_day(&ts), 485);
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "12:00 AM");
        assert_eq!(format_time(485), "8:05 AM");
        assert_eq!(format_time(720), "12:00 PM");
        assert_eq!(format_time(1439), "11:59 PM");
    }

    #[test]
    fn test_filter_from_str() {
        assert_eq!("any".parse::<TimeFilter>().unwrap(), TimeFilter::Any);
        assert_eq!("-1".parse::<TimeFilter>().unwrap(), TimeFilter::Any);
        assert_eq!("485".parse::<TimeFilter>().unwrap(), TimeFilter::At(485));
        assert_eq!("20:00".parse::<TimeFilter>().unwrap(), TimeFilter::At(1200));
        assert!("1440".parse::<TimeFilter>().is_err());
        assert!("24:00".parse::<TimeFilter>().is_err());
        assert!("-2".parse::<TimeFilter>().is_err());
    }

    #[test]
    fn test_filter_label() {
        assert_eq!(TimeFilter::Any.label(), "(any time)");
        assert_eq!(TimeFilter::At(1200).label(), "8:00 PM");
        assert_eq!(TimeFilter::At(1200).slider_value(), 1200);
        assert_eq!(TimeFilter::Any.slider_value(), -1);
    }
}
