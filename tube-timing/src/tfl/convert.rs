//! Conversion from TfL DTOs to domain types.
//!
//! Malformed records are skipped with a log line rather than failing the
//! whole response: one bad prediction should not hide the rest of the board.

use std::collections::HashMap;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::aliases::split_via;
use crate::domain::{
    Bound, ClockTime, LineId, LiveArrival, ServiceDays, Station, TimetablePattern, Timing,
};

use super::types::{
    ClockValue, Prediction, SearchResponse, StationInterval, StopPoint, TimetableResponse,
    TimetableRoute,
};

/// Stops whose presence in a calling pattern marks the route it takes,
/// with the name shown as "via".
pub const VIA_STOP_IDS: &[(&str, &str)] = &[
    ("940GZZLUBNK", "Bank"),
    ("940GZZLUCHX", "Charing Cross"),
];

/// Convert a search response into candidate stations, keeping TfL's ranking.
pub fn convert_search(response: &SearchResponse) -> Vec<Station> {
    response
        .matches
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter(|m| !m.id.is_empty())
        .map(|m| Station::new(m.id.clone(), m.name.clone()))
        .collect()
}

/// Convert a stop point into a station with its lines.
///
/// `requested_id` is used when the response does not echo an id back.
pub fn convert_stop_point(stop: &StopPoint, requested_id: &str) -> Station {
    let id = stop
        .naptan_id
        .clone()
        .or_else(|| stop.id.clone())
        .unwrap_or_else(|| requested_id.to_string());
    let name = stop.common_name.clone().unwrap_or_else(|| id.clone());
    let lines = stop
        .lines
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|line| match LineId::parse(&line.id) {
            Ok(id) => Some(id),
            Err(e) => {
                debug!(line = %line.id, error = %e, "skipping line on stop point");
                None
            }
        });
    Station::new(id, name).with_lines(lines)
}

/// Convert arrival predictions.
///
/// Predictions without an absolute `expectedArrival` are placed
/// `timeToStation` seconds after `now`.
pub fn convert_predictions(predictions: &[Prediction], now: DateTime<Tz>) -> Vec<LiveArrival> {
    predictions
        .iter()
        .filter_map(|p| convert_prediction(p, now))
        .collect()
}

fn convert_prediction(p: &Prediction, now: DateTime<Tz>) -> Option<LiveArrival> {
    let line_id = match p.line_id.as_deref().map(LineId::parse) {
        Some(Ok(id)) => id,
        _ => {
            debug!(line = ?p.line_id, "skipping prediction without usable line id");
            return None;
        }
    };

    let tz = now.timezone();
    let expected = p
        .expected_arrival
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|instant| instant.with_timezone(&tz))
        .or_else(|| {
            p.time_to_station
                .and_then(Duration::try_seconds)
                .and_then(|offset| now.checked_add_signed(offset))
        });
    let Some(expected_instant) = expected else {
        debug!(line = %line_id, "skipping prediction without arrival time");
        return None;
    };

    let (towards_destination, via) = match p.towards.as_deref() {
        Some(towards) => split_via(towards),
        None => ("", None),
    };
    let destination_name = p
        .destination_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(Some(towards_destination).filter(|s| !s.is_empty()))
        .or(p.line_name.as_deref())
        .unwrap_or(line_id.as_str())
        .to_string();

    Some(LiveArrival {
        direction: p.direction.as_deref().and_then(Bound::from_tag),
        destination_name,
        platform_name: p.platform_name.clone().unwrap_or_default(),
        expected_instant,
        via: via.map(str::to_string),
        line_id,
    })
}

/// Where one journey variant goes, and what it passes on the way.
#[derive(Debug, Clone)]
struct IntervalRoute {
    destination: String,
    via_stops: Vec<String>,
    calling_points: Vec<String>,
}

/// Convert a timetable response into patterns.
///
/// `line` and `direction` describe the request that produced the response;
/// they fill in whatever the response itself leaves out.
pub fn convert_timetable(
    response: &TimetableResponse,
    line: Option<&LineId>,
    direction: Option<Bound>,
) -> Vec<TimetablePattern> {
    let mut patterns = Vec::new();

    for nested in response.timetables.as_deref().unwrap_or(&[]) {
        patterns.extend(convert_timetable(nested, line, direction));
    }

    let Some(timetable) = &response.timetable else {
        return patterns;
    };

    let line_id = match response.line_id.as_deref().map(LineId::parse) {
        Some(Ok(id)) => id,
        _ => match line {
            Some(id) => id.clone(),
            None => {
                warn!(line = ?response.line_id, "timetable without usable line id, skipping");
                return patterns;
            }
        },
    };
    let direction = direction.or_else(|| response.direction.as_deref().and_then(Bound::from_tag));

    let stop_names: HashMap<&str, &str> = response
        .stops
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|s| Some((s.id.as_str(), s.name.as_deref()?)))
        .collect();

    for route in timetable.routes.as_deref().unwrap_or(&[]) {
        let fallback = route
            .name
            .clone()
            .or_else(|| response.line_name.clone())
            .unwrap_or_else(|| line_id.as_str().to_string());
        patterns.extend(convert_route(route, &line_id, direction, &stop_names, fallback));
    }

    patterns
}

fn convert_route(
    route: &TimetableRoute,
    line_id: &LineId,
    direction: Option<Bound>,
    stop_names: &HashMap<&str, &str>,
    fallback_destination: String,
) -> Vec<TimetablePattern> {
    let intervals: Vec<(String, IntervalRoute)> = route
        .station_intervals
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|interval| interval_route(interval, stop_names))
        .collect();

    let default_route = match intervals.as_slice() {
        [(_, only)] => only.clone(),
        [(_, first), ..] => IntervalRoute {
            destination: first.destination.clone(),
            via_stops: vec![],
            calling_points: vec![],
        },
        [] => IntervalRoute {
            destination: fallback_destination,
            via_stops: vec![],
            calling_points: vec![],
        },
    };
    let lookup: HashMap<&str, &IntervalRoute> =
        intervals.iter().map(|(k, r)| (k.as_str(), r)).collect();

    let pattern = |route: &IntervalRoute, days: ServiceDays, timing: Timing| TimetablePattern {
        line_id: line_id.clone(),
        direction,
        destination_name: route.destination.clone(),
        via_stops: route.via_stops.clone(),
        calling_points: route.calling_points.clone(),
        days,
        timing,
    };

    let mut patterns = Vec::new();
    for schedule in route.schedules.as_deref().unwrap_or(&[]) {
        let days = ServiceDays::from_schedule_name(schedule.name.as_deref().unwrap_or(""));

        // Known journeys grouped by the route variant they run.
        let mut by_interval: Vec<(Option<String>, Vec<ClockTime>)> = Vec::new();
        for journey in schedule.known_journeys.as_deref().unwrap_or(&[]) {
            let Some(time) = clock(journey.hour.value(), journey.minute.value()) else {
                debug!(hour = ?journey.hour, minute = ?journey.minute, "skipping journey with bad time");
                continue;
            };
            let variant = journey
                .interval_id
                .as_ref()
                .map(|id| id.key())
                .filter(|key| lookup.contains_key(key.as_str()));
            match by_interval.iter_mut().find(|(v, _)| *v == variant) {
                Some((_, times)) => times.push(time),
                None => by_interval.push((variant, vec![time])),
            }
        }

        if !by_interval.is_empty() {
            for (variant, times) in by_interval {
                let route = variant
                    .and_then(|key| lookup.get(key.as_str()).copied())
                    .unwrap_or(&default_route);
                patterns.push(pattern(route, days, Timing::Known(times)));
            }
            continue;
        }

        for period in schedule.periods.as_deref().unwrap_or(&[]) {
            let (Some(from), Some(to), Some(headway)) = (
                period.from_time.as_ref().and_then(clock_value),
                period.to_time.as_ref().and_then(clock_value),
                period.frequency.as_ref().and_then(|f| f.headway_minutes()),
            ) else {
                debug!(?period, "skipping incomplete period");
                continue;
            };
            let Some(headway) = headway_duration(headway) else {
                debug!(?period, "skipping period with out-of-range frequency");
                continue;
            };
            patterns.push(pattern(
                &default_route,
                days,
                Timing::Every { from, to, headway },
            ));
        }
    }
    patterns
}

fn headway_duration(minutes: f64) -> Option<Duration> {
    let seconds = (minutes * 60.0).round();
    if !(1.0..=86_400.0).contains(&seconds) {
        return None;
    }
    Duration::try_seconds(seconds as i64)
}

fn interval_route(
    interval: &StationInterval,
    stop_names: &HashMap<&str, &str>,
) -> Option<(String, IntervalRoute)> {
    let key = interval.id.as_ref()?.key();
    let stop_ids: Vec<&str> = interval
        .intervals
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .filter_map(|i| i.stop_id.as_deref())
        .collect();
    let (last, intermediate) = stop_ids.split_last()?;
    let name = |id: &str| stop_names.get(id).copied().unwrap_or(id).to_string();

    let mut via_stops: Vec<String> = Vec::new();
    for id in intermediate {
        if let Some((_, label)) = VIA_STOP_IDS.iter().find(|(via_id, _)| via_id == id)
            && !via_stops.iter().any(|v| v == label)
        {
            via_stops.push((*label).to_string());
        }
    }

    Some((
        key,
        IntervalRoute {
            destination: name(last),
            via_stops,
            calling_points: intermediate.iter().map(|id| name(id)).collect(),
        },
    ))
}

fn clock(hour: Option<u32>, minute: Option<u32>) -> Option<ClockTime> {
    ClockTime::from_hm(hour?, minute?)
}

fn clock_value(value: &ClockValue) -> Option<ClockTime> {
    clock(value.hour.value(), value.minute.value())
}
