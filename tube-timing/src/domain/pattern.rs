//! Timetable patterns.
//!
//! A timetable does not list concrete instants. It lists clock times on a
//! service day ("known journeys") or recurring periods ("every 3 minutes
//! from 07:00 to 09:30"), tagged with the days of the week they run.
//! [`crate::merger::project`] turns these into concrete departures.

use chrono::{Duration, Weekday};

use super::{Bound, ClockTime, LineId};

/// The set of weekdays a schedule runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServiceDays(u8);

impl ServiceDays {
    /// Every day of the week.
    pub const EVERY_DAY: ServiceDays = ServiceDays(0b111_1111);
    /// Monday to Friday.
    pub const WEEKDAYS: ServiceDays = ServiceDays(0b001_1111);
    /// Saturday and Sunday.
    pub const WEEKEND: ServiceDays = ServiceDays(0b110_0000);

    /// No days.
    pub const fn empty() -> Self {
        ServiceDays(0)
    }

    /// A single day.
    pub fn only(day: Weekday) -> Self {
        ServiceDays(1 << day.num_days_from_monday())
    }

    /// Monday..=Sunday ordered range, wrapping past Sunday if `to` is earlier.
    pub fn range(from: Weekday, to: Weekday) -> Self {
        let mut days = ServiceDays::empty();
        let mut day = from;
        loop {
            days = days.union(ServiceDays::only(day));
            if day == to {
                return days;
            }
            day = day.succ();
        }
    }

    pub fn union(self, other: ServiceDays) -> Self {
        ServiceDays(self.0 | other.0)
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Interpret a TfL schedule name such as `"Monday - Friday"`,
    /// `"Saturday"`, or `"Saturday and Sunday"`.
    ///
    /// Names that mention no day at all (`"Special"`) are treated as
    /// running every day.
    pub fn from_schedule_name(name: &str) -> Self {
        let text = name.to_ascii_lowercase();

        if text.contains("daily") || text.contains("every day") {
            return ServiceDays::EVERY_DAY;
        }

        let mut days = ServiceDays::empty();
        if text.contains("weekday") {
            days = days.union(ServiceDays::WEEKDAYS);
        }
        if text.contains("weekend") {
            days = days.union(ServiceDays::WEEKEND);
        }

        // Weekday names in the order they appear, so "X - Y" reads as a range.
        let mut mentioned: Vec<(usize, Weekday)> = WEEKDAY_NAMES
            .iter()
            .filter_map(|(label, day)| text.find(label).map(|pos| (pos, *day)))
            .collect();
        mentioned.sort_by_key(|(pos, _)| *pos);

        let mut i = 0;
        while i < mentioned.len() {
            let (pos, day) = mentioned[i];
            if let Some(&(next_pos, next_day)) = mentioned.get(i + 1) {
                let between = &text[pos..next_pos];
                if between.contains('-') || between.contains(" to ") {
                    days = days.union(ServiceDays::range(day, next_day));
                    i += 2;
                    continue;
                }
            }
            days = days.union(ServiceDays::only(day));
            i += 1;
        }

        if days.is_empty() {
            ServiceDays::EVERY_DAY
        } else {
            days
        }
    }
}

impl Default for ServiceDays {
    fn default() -> Self {
        ServiceDays::EVERY_DAY
    }
}

const WEEKDAY_NAMES: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

/// When a pattern runs on a service day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timing {
    /// Individually listed departures.
    Known(Vec<ClockTime>),
    /// A departure every `headway` from `from` to `to`, inclusive.
    /// `to` earlier than `from` means the period runs past midnight.
    Every {
        from: ClockTime,
        to: ClockTime,
        headway: Duration,
    },
}

/// A repeating timetable entry for one route from the board station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetablePattern {
    pub line_id: LineId,
    pub direction: Option<Bound>,
    pub destination_name: String,
    pub via_stops: Vec<String>,
    pub calling_points: Vec<String>,
    pub days: ServiceDays,
    pub timing: Timing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_range() {
        let days = ServiceDays::from_schedule_name("Monday - Friday");
        assert_eq!(days, ServiceDays::WEEKDAYS);
        assert!(days.contains(Weekday::Wed));
        assert!(!days.contains(Weekday::Sat));
    }

    #[test]
    fn partial_range() {
        let days = ServiceDays::from_schedule_name("Monday - Thursday");
        assert!(days.contains(Weekday::Mon));
        assert!(days.contains(Weekday::Thu));
        assert!(!days.contains(Weekday::Fri));
    }

    #[test]
    fn single_days_and_lists() {
        assert_eq!(
            ServiceDays::from_schedule_name("Saturday"),
            ServiceDays::only(Weekday::Sat)
        );
        assert_eq!(
            ServiceDays::from_schedule_name("Saturday and Sunday"),
            ServiceDays::WEEKEND
        );
        let fri_sat = ServiceDays::from_schedule_name("Friday (also Saturday)");
        assert!(fri_sat.contains(Weekday::Fri));
        assert!(fri_sat.contains(Weekday::Sat));
        assert!(!fri_sat.contains(Weekday::Sun));
    }

    #[test]
    fn wrapping_range() {
        let days = ServiceDays::range(Weekday::Sat, Weekday::Mon);
        assert!(days.contains(Weekday::Sat));
        assert!(days.contains(Weekday::Sun));
        assert!(days.contains(Weekday::Mon));
        assert!(!days.contains(Weekday::Tue));
    }

    #[test]
    fn unnamed_schedule_runs_every_day() {
        assert_eq!(ServiceDays::from_schedule_name("Special"), ServiceDays::EVERY_DAY);
        assert_eq!(ServiceDays::from_schedule_name("Daily"), ServiceDays::EVERY_DAY);
        assert_eq!(ServiceDays::default(), ServiceDays::EVERY_DAY);
    }
}
