//! Merging live predictions with projected timetables.
//!
//! Live predictions are accurate but only look a few minutes ahead;
//! timetables cover the rest of the window. The merger windows both,
//! drops scheduled records that a live prediction already covers,
//! applies the rider's filters and orders the result.

use std::collections::HashSet;

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::aliases::AliasTable;
use crate::domain::{
    Bound, Departure, FilterError, LineId, LineTopology, LiveArrival, ScheduledDeparture,
    TimeWindow, TimetablePattern,
};

use super::config::MergeConfig;
use super::filter::{Filter, matches_towards};
use super::project::project;

/// Merge with the default configuration.
///
/// See [`Merger::merge`].
pub fn merge(
    live: Vec<LiveArrival>,
    patterns: &[TimetablePattern],
    window: &TimeWindow,
    filter: &Filter,
    aliases: &AliasTable,
    topology: &LineTopology,
) -> Result<Vec<Departure>, FilterError> {
    Merger::new(aliases, MergeConfig::default()).merge(live, patterns, window, filter, topology)
}

/// Departure merger.
pub struct Merger<'a> {
    aliases: &'a AliasTable,
    config: MergeConfig,
}

/// A live record reduced to what duplicate detection compares.
struct LiveKey<'a> {
    line_id: &'a LineId,
    direction: Option<Bound>,
    destination: String,
    instant: DateTime<Tz>,
}

impl<'a> Merger<'a> {
    pub fn new(aliases: &'a AliasTable, config: MergeConfig) -> Self {
        Self { aliases, config }
    }

    /// Produce the ordered, deduplicated, filtered departure list.
    ///
    /// The filter is checked before any data is looked at, so an
    /// inconsistent filter fails even when there is nothing to show.
    /// Empty inputs give an empty list.
    pub fn merge(
        &self,
        live: Vec<LiveArrival>,
        patterns: &[TimetablePattern],
        window: &TimeWindow,
        filter: &Filter,
        topology: &LineTopology,
    ) -> Result<Vec<Departure>, FilterError> {
        let wanted_bound = filter.resolve_direction(topology)?;

        let live_total = live.len();
        let live: Vec<LiveArrival> = live
            .into_iter()
            .filter(|arrival| window.contains(arrival.expected_instant))
            .collect();

        let scheduled = self.project_all(patterns, window);
        let scheduled_total = scheduled.len();
        let scheduled = self.drop_covered(scheduled, &live);

        debug!(
            live_in_window = live.len(),
            live_outside = live_total - live.len(),
            scheduled = scheduled_total,
            duplicates = scheduled_total - scheduled.len(),
            "merging departures"
        );

        let wanted_towards = filter
            .towards
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(|t| self.aliases.canonical_key(t));

        let mut departures: Vec<Departure> = live
            .into_iter()
            .map(Departure::Live)
            .chain(scheduled.into_iter().map(Departure::Scheduled))
            .filter(|d| filter.lines.is_empty() || filter.lines.contains(d.line_id()))
            .filter(|d| wanted_bound.is_none_or(|bound| d.direction() == Some(bound)))
            .filter(|d| {
                wanted_towards
                    .as_deref()
                    .is_none_or(|wanted| matches_towards(d, wanted, self.aliases))
            })
            .collect();

        order_departures(&mut departures);
        Ok(departures)
    }

    /// Project every pattern into concrete departures, collapsing exact
    /// repeats (the same train listed by two overlapping timetables).
    fn project_all(
        &self,
        patterns: &[TimetablePattern],
        window: &TimeWindow,
    ) -> Vec<ScheduledDeparture> {
        let mut seen: HashSet<(LineId, Option<Bound>, String, DateTime<Tz>)> = HashSet::new();
        let mut out = Vec::new();

        for pattern in patterns {
            let destination = self.aliases.canonical_key(&pattern.destination_name);
            for instant in project(pattern, window) {
                let key = (
                    pattern.line_id.clone(),
                    pattern.direction,
                    destination.clone(),
                    instant,
                );
                if !seen.insert(key) {
                    continue;
                }
                out.push(ScheduledDeparture {
                    line_id: pattern.line_id.clone(),
                    direction: pattern.direction,
                    destination_name: pattern.destination_name.clone(),
                    via_stops: pattern.via_stops.clone(),
                    calling_points: pattern.calling_points.clone(),
                    expected_instant: instant,
                });
            }
        }
        out
    }

    /// Remove scheduled departures that a live prediction already covers.
    fn drop_covered(
        &self,
        scheduled: Vec<ScheduledDeparture>,
        live: &[LiveArrival],
    ) -> Vec<ScheduledDeparture> {
        if live.is_empty() {
            return scheduled;
        }

        let keys: Vec<LiveKey<'_>> = live
            .iter()
            .map(|arrival| LiveKey {
                line_id: &arrival.line_id,
                direction: arrival.direction,
                destination: self.aliases.canonical_key(&arrival.destination_name),
                instant: arrival.expected_instant,
            })
            .collect();
        let tolerance = self.config.duplicate_tolerance();

        scheduled
            .into_iter()
            .filter(|departure| {
                let destination = self.aliases.canonical_key(&departure.destination_name);
                let covered = keys.iter().any(|key| {
                    key.line_id == &departure.line_id
                        && directions_compatible(key.direction, departure.direction)
                        && key.destination == destination
                        && (key.instant - departure.expected_instant).abs() <= tolerance
                });
                if covered {
                    trace!(
                        line = %departure.line_id,
                        destination = %departure.destination_name,
                        at = %departure.expected_instant,
                        "scheduled departure covered by live prediction"
                    );
                }
                !covered
            })
            .collect()
    }
}

/// Unknown directions are compatible with anything.
fn directions_compatible(a: Option<Bound>, b: Option<Bound>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Sort departures by instant, then line, then destination, with live
/// records ahead of scheduled ones at the same instant. Stable.
pub fn order_departures(departures: &mut [Departure]) {
    departures.sort_by(|a, b| {
        a.expected_instant()
            .cmp(&b.expected_instant())
            .then_with(|| a.line_id().cmp(b.line_id()))
            .then_with(|| a.destination_name().cmp(b.destination_name()))
            .then_with(|| a.source().cmp(&b.source()))
    });
}
