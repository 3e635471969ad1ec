//! User filters applied to merged departures.

use std::collections::BTreeSet;

use crate::aliases::AliasTable;
use crate::domain::{Bound, Departure, DirectionFilter, FilterError, LineId, LineTopology};

/// What the rider asked to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub direction: Option<DirectionFilter>,
    /// Destination (or, for scheduled departures, intermediate stop) text.
    pub towards: Option<String>,
    /// Lines to keep. Empty keeps every line.
    pub lines: BTreeSet<LineId>,
}

impl Filter {
    /// A filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines(mut self, lines: impl IntoIterator<Item = LineId>) -> Self {
        self.lines.extend(lines);
        self
    }

    pub fn with_direction(mut self, direction: DirectionFilter) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_towards(mut self, towards: impl Into<String>) -> Self {
        self.towards = Some(towards.into());
        self
    }

    /// Check the filter is self-consistent: a compass direction needs
    /// exactly one line to be resolved against.
    pub fn validate(&self) -> Result<(), FilterError> {
        if let Some(DirectionFilter::Compass(direction)) = self.direction
            && self.lines.len() != 1
        {
            return Err(FilterError::AmbiguousDirectionFilter {
                direction,
                line_count: self.lines.len(),
            });
        }
        Ok(())
    }

    /// The bound the direction filter selects, resolving compass
    /// directions through `topology`.
    pub fn resolve_direction(&self, topology: &LineTopology) -> Result<Option<Bound>, FilterError> {
        self.validate()?;
        match self.direction {
            None => Ok(None),
            Some(DirectionFilter::Bound(bound)) => Ok(Some(bound)),
            Some(DirectionFilter::Compass(direction)) => {
                // validate() guarantees exactly one line.
                let Some(line) = self.lines.first() else {
                    return Err(FilterError::AmbiguousDirectionFilter {
                        direction,
                        line_count: 0,
                    });
                };
                topology
                    .bound_for(line, direction)
                    .map(Some)
                    .ok_or_else(|| FilterError::DirectionNotResolvable {
                        direction,
                        line: line.clone(),
                    })
            }
        }
    }
}

/// Whether `departure` passes the towards filter.
///
/// Matches when the canonical destination equals the canonical query.
/// Scheduled departures may also match on any via stop or calling point.
pub(crate) fn matches_towards(departure: &Departure, wanted: &str, aliases: &AliasTable) -> bool {
    if aliases.canonical_key(departure.destination_name()) == wanted {
        return true;
    }
    departure
        .intermediate_stops()
        .any(|stop| aliases.canonical_key(stop) == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Compass, LiveArrival, ScheduledDeparture};
    use chrono::TimeZone;
    use chrono_tz::Europe::London;

    fn line(s: &str) -> LineId {
        LineId::parse(s).unwrap()
    }

    #[test]
    fn compass_needs_single_line() {
        let filter = Filter::new()
            .with_lines([line("jubilee"), line("northern")])
            .with_direction(DirectionFilter::Compass(Compass::North));

        assert_eq!(
            filter.validate(),
            Err(FilterError::AmbiguousDirectionFilter {
                direction: Compass::North,
                line_count: 2
            })
        );
    }

    #[test]
    fn compass_without_lines_is_ambiguous() {
        let filter = Filter::new().with_direction(DirectionFilter::Compass(Compass::South));
        assert!(matches!(
            filter.resolve_direction(&LineTopology::new()),
            Err(FilterError::AmbiguousDirectionFilter { line_count: 0, .. })
        ));
    }

    #[test]
    fn bound_needs_no_lines() {
        let filter = Filter::new().with_direction(DirectionFilter::Bound(Bound::Inbound));
        assert_eq!(
            filter.resolve_direction(&LineTopology::new()),
            Ok(Some(Bound::Inbound))
        );
    }

    #[test]
    fn compass_resolves_through_topology() {
        let mut topology = LineTopology::new();
        topology.insert(line("northern"), Compass::North, Bound::Outbound);

        let filter = Filter::new()
            .with_lines([line("northern")])
            .with_direction(DirectionFilter::Compass(Compass::North));
        assert_eq!(filter.resolve_direction(&topology), Ok(Some(Bound::Outbound)));

        let filter = Filter::new()
            .with_lines([line("northern")])
            .with_direction(DirectionFilter::Compass(Compass::East));
        assert_eq!(
            filter.resolve_direction(&topology),
            Err(FilterError::DirectionNotResolvable {
                direction: Compass::East,
                line: line("northern"),
            })
        );
    }

    #[test]
    fn towards_live_matches_destination_only() {
        let aliases = AliasTable::build(None);
        let live = Departure::Live(LiveArrival {
            line_id: line("northern"),
            direction: None,
            destination_name: "Edgware".into(),
            platform_name: String::new(),
            expected_instant: London.with_ymd_and_hms(2026, 2, 7, 19, 0, 0).unwrap(),
            via: Some("Charing Cross".into()),
        });

        assert!(matches_towards(&live, &aliases.canonical_key("edgware"), &aliases));
        assert!(!matches_towards(&live, &aliases.canonical_key("CX"), &aliases));
    }

    #[test]
    fn towards_scheduled_matches_calling_point() {
        let aliases = AliasTable::build(None);
        let scheduled = Departure::Scheduled(ScheduledDeparture {
            line_id: line("northern"),
            direction: None,
            destination_name: "Edgware".into(),
            via_stops: vec![],
            calling_points: vec!["Charing Cross Underground Station".into()],
            expected_instant: London.with_ymd_and_hms(2026, 2, 7, 19, 0, 0).unwrap(),
        });

        assert!(matches_towards(&scheduled, &aliases.canonical_key("CX"), &aliases));
        assert!(!matches_towards(&scheduled, &aliases.canonical_key("Bank"), &aliases));
    }
}
