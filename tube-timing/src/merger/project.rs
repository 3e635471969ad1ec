//! Timetable projection.
//!
//! Turns a [`TimetablePattern`] into the concrete instants it produces
//! inside a window. Pure: no clock, no provider.

use chrono::{DateTime, Datelike, Duration, NaiveDate};
use chrono_tz::Tz;

use crate::domain::{ClockTime, TimeWindow, TimetablePattern, Timing};

/// Concrete departure instants of `pattern` within `window`, ascending
/// and without duplicates.
///
/// Service days from the day before the window's reference date up to the
/// window's last date are considered, so a `24:30` journey listed on
/// yesterday's timetable still shows up shortly after midnight.
pub fn project(pattern: &TimetablePattern, window: &TimeWindow) -> Vec<DateTime<Tz>> {
    let tz = window.timezone();
    let last_day = window.end().date_naive();
    let first_day = window
        .reference()
        .date_naive()
        .pred_opt()
        .unwrap_or(NaiveDate::MIN);

    let mut instants = Vec::new();
    for day in first_day.iter_days().take_while(|d| *d <= last_day) {
        if !pattern.days.contains(day.weekday()) {
            continue;
        }
        match &pattern.timing {
            Timing::Known(times) => {
                instants.extend(
                    times
                        .iter()
                        .filter_map(|t| t.on(day, tz))
                        .filter(|i| window.contains(*i)),
                );
            }
            Timing::Every { from, to, headway } => {
                project_period(*from, *to, *headway, day, window, &mut instants);
            }
        }
    }

    instants.sort();
    instants.dedup();
    instants
}

/// Walk a recurring period on one service day, pushing instants in the window.
fn project_period(
    from: ClockTime,
    to: ClockTime,
    headway: Duration,
    day: NaiveDate,
    window: &TimeWindow,
    out: &mut Vec<DateTime<Tz>>,
) {
    let step = headway.num_seconds();
    if step <= 0 {
        return;
    }

    let tz = window.timezone();
    let mut end_minutes = to.minutes_after_midnight();
    if end_minutes < from.minutes_after_midnight() {
        end_minutes += 24 * 60;
    }
    let (Some(start), Some(end)) = (
        from.on(day, tz),
        ClockTime::from_hm(end_minutes / 60, end_minutes % 60).and_then(|t| t.on(day, tz)),
    ) else {
        return;
    };

    let mut current = start;
    if current < window.reference() {
        let behind = (window.reference() - current).num_seconds();
        let steps = (behind + step - 1) / step;
        current += Duration::seconds(steps * step);
    }

    while current <= end && current <= window.end() {
        if window.contains(current) {
            out.push(current);
        }
        current += headway;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineId, ServiceDays};
    use chrono::{TimeZone, Weekday};
    use chrono_tz::Europe::London;

    // 2026-02-07 is a Saturday.
    fn at(d: u32, h: u32, m: u32) -> DateTime<Tz> {
        London.with_ymd_and_hms(2026, 2, d, h, m, 0).unwrap()
    }

    fn clock(h: u32, m: u32) -> ClockTime {
        ClockTime::from_hm(h, m).unwrap()
    }

    fn pattern(timing: Timing) -> TimetablePattern {
        TimetablePattern {
            line_id: LineId::parse("northern").unwrap(),
            direction: None,
            destination_name: "Morden".into(),
            via_stops: vec![],
            calling_points: vec![],
            days: ServiceDays::EVERY_DAY,
            timing,
        }
    }

    #[test]
    fn known_times_inside_window() {
        let p = pattern(Timing::Known(vec![clock(19, 5), clock(19, 12), clock(19, 40)]));
        let window = TimeWindow::new(at(7, 19, 9), Duration::minutes(20));

        assert_eq!(project(&p, &window), vec![at(7, 19, 12)]);
    }

    #[test]
    fn window_edges_inclusive() {
        let p = pattern(Timing::Known(vec![clock(19, 0), clock(19, 30)]));
        let window = TimeWindow::new(at(7, 19, 0), Duration::minutes(30));

        assert_eq!(project(&p, &window), vec![at(7, 19, 0), at(7, 19, 30)]);
    }

    #[test]
    fn period_aligns_to_first_step_after_reference() {
        let p = pattern(Timing::Every {
            from: clock(7, 0),
            to: clock(22, 0),
            headway: Duration::minutes(4),
        });
        // 19:09 is 12h09m after 07:00; next step is 19:12.
        let window = TimeWindow::new(at(7, 19, 9), Duration::minutes(10));

        assert_eq!(
            project(&p, &window),
            vec![at(7, 19, 12), at(7, 19, 16)]
        );
    }

    #[test]
    fn period_stops_at_its_end() {
        let p = pattern(Timing::Every {
            from: clock(19, 0),
            to: clock(19, 10),
            headway: Duration::minutes(5),
        });
        let window = TimeWindow::new(at(7, 18, 50), Duration::hours(1));

        assert_eq!(
            project(&p, &window),
            vec![at(7, 19, 0), at(7, 19, 5), at(7, 19, 10)]
        );
    }

    #[test]
    fn period_past_midnight() {
        let p = pattern(Timing::Every {
            from: clock(23, 50),
            to: clock(0, 10),
            headway: Duration::minutes(10),
        });
        let window = TimeWindow::new(at(7, 23, 55), Duration::minutes(30));

        assert_eq!(project(&p, &window), vec![at(8, 0, 0), at(8, 0, 10)]);
    }

    #[test]
    fn overflow_hour_from_previous_service_day() {
        let p = pattern(Timing::Known(vec![clock(24, 20)]));
        let window = TimeWindow::new(at(8, 0, 5), Duration::minutes(30));

        assert_eq!(project(&p, &window), vec![at(8, 0, 20)]);
    }

    #[test]
    fn respects_service_days() {
        let mut p = pattern(Timing::Known(vec![clock(19, 12)]));
        p.days = ServiceDays::WEEKDAYS;
        let window = TimeWindow::new(at(7, 19, 0), Duration::minutes(30));
        assert!(project(&p, &window).is_empty());

        p.days = ServiceDays::only(Weekday::Sat);
        assert_eq!(project(&p, &window), vec![at(7, 19, 12)]);
    }

    #[test]
    fn long_window_spans_days() {
        let p = pattern(Timing::Known(vec![clock(8, 0)]));
        let window = TimeWindow::new(at(7, 7, 0), Duration::hours(26));

        assert_eq!(project(&p, &window), vec![at(7, 8, 0), at(8, 8, 0)]);
    }

    #[test]
    fn zero_headway_yields_nothing() {
        let p = pattern(Timing::Every {
            from: clock(7, 0),
            to: clock(22, 0),
            headway: Duration::zero(),
        });
        let window = TimeWindow::new(at(7, 19, 0), Duration::minutes(30));
        assert!(project(&p, &window).is_empty());
    }
}
