//! Time handling: look-ahead windows and timetable clock times.
//!
//! TfL reports live predictions as absolute instants but timetables as
//! clock times on a "service day" that runs past midnight (a journey at
//! 00:30 is listed as hour 24). This module provides types for both.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Error returned when a window expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid window format: {reason}")]
pub struct InvalidWindowFormat {
    reason: &'static str,
}

impl InvalidWindowFormat {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Parse a window expression such as `"1h30m"` into a duration.
///
/// The expression is one or more `<integer><unit>` segments where the unit
/// is `h` or `m`. Segments may appear in any order but each unit at most
/// once. Case and surrounding whitespace are ignored.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use tube_timing::domain::parse_window;
///
/// assert_eq!(parse_window("1h30m").unwrap(), Duration::minutes(90));
/// assert_eq!(parse_window("30m1h").unwrap(), Duration::minutes(90));
/// assert!(parse_window("").is_err());
/// assert!(parse_window("1h1h").is_err());
/// ```
pub fn parse_window(s: &str) -> Result<Duration, InvalidWindowFormat> {
    let text: String = s
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if text.is_empty() {
        return Err(InvalidWindowFormat::new("window is empty"));
    }

    let mut seen_hours = false;
    let mut seen_minutes = false;
    let mut total_minutes: i64 = 0;
    let mut digits = String::new();

    for c in text.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }

        if digits.is_empty() {
            return Err(InvalidWindowFormat::new("expected a number before each unit"));
        }
        let amount: i64 = digits
            .parse()
            .map_err(|_| InvalidWindowFormat::new("number is too large"))?;
        if amount <= 0 {
            return Err(InvalidWindowFormat::new("each segment must be positive"));
        }
        digits.clear();

        let minutes = match c {
            'h' => {
                if seen_hours {
                    return Err(InvalidWindowFormat::new("unit 'h' is repeated"));
                }
                seen_hours = true;
                amount.checked_mul(60)
            }
            'm' => {
                if seen_minutes {
                    return Err(InvalidWindowFormat::new("unit 'm' is repeated"));
                }
                seen_minutes = true;
                Some(amount)
            }
            _ => return Err(InvalidWindowFormat::new("unit must be 'h' or 'm'")),
        };

        total_minutes = minutes
            .and_then(|m| total_minutes.checked_add(m))
            .ok_or_else(|| InvalidWindowFormat::new("number is too large"))?;
    }

    if !digits.is_empty() {
        return Err(InvalidWindowFormat::new("number is missing a unit"));
    }

    Duration::try_minutes(total_minutes).ok_or_else(|| InvalidWindowFormat::new("number is too large"))
}

/// Parse a window expression and anchor it at `now`.
pub fn build_window(s: &str, now: DateTime<Tz>) -> Result<TimeWindow, InvalidWindowFormat> {
    let horizon = parse_window(s)?;
    if now.checked_add_signed(horizon).is_none() {
        return Err(InvalidWindowFormat::new("window reaches past the supported date range"));
    }
    Ok(TimeWindow::new(now, horizon))
}

/// A forward-looking span of time, starting at a reference instant.
///
/// Both ends are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    reference: DateTime<Tz>,
    horizon: Duration,
}

impl TimeWindow {
    /// Create a window. Negative horizons are clamped to zero.
    pub fn new(reference: DateTime<Tz>, horizon: Duration) -> Self {
        Self {
            reference,
            horizon: horizon.max(Duration::zero()),
        }
    }

    /// The instant the window starts at ("now").
    pub fn reference(&self) -> DateTime<Tz> {
        self.reference
    }

    /// How far the window reaches past the reference instant.
    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    /// The last instant inside the window.
    pub fn end(&self) -> DateTime<Tz> {
        self.reference + self.horizon
    }

    /// Returns true if `instant` falls within `[reference, end]`.
    pub fn contains(&self, instant: DateTime<Tz>) -> bool {
        instant >= self.reference && instant <= self.end()
    }

    /// Time zone the window was built in.
    pub fn timezone(&self) -> Tz {
        self.reference.timezone()
    }
}

/// A clock time on a timetable service day.
///
/// Unlike [`NaiveTime`], the hour may exceed 23: TfL lists a 00:30 journey
/// belonging to the previous day's timetable as `24:30`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u32,
}

impl ClockTime {
    /// Build a clock time from hour and minute. Minutes must be below 60.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        Some(Self {
            minutes: hour.checked_mul(60)?.checked_add(minute)?,
        })
    }

    /// Minutes since midnight at the start of the service day.
    pub fn minutes_after_midnight(&self) -> u32 {
        self.minutes
    }

    /// Resolve this clock time on a given service day.
    ///
    /// Returns `None` when the local time does not exist (the spring-forward
    /// gap). Ambiguous local times resolve to the earlier instant.
    pub fn on(&self, service_day: NaiveDate, tz: Tz) -> Option<DateTime<Tz>> {
        let day = service_day.checked_add_days(chrono::Days::new(u64::from(self.minutes / 1440)))?;
        let minutes_of_day = self.minutes % 1440;
        let time = NaiveTime::from_hms_opt(minutes_of_day / 60, minutes_of_day % 60, 0)?;
        tz.from_local_datetime(&day.and_time(time)).earliest()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}
