//! Per-line mapping from compass directions to inbound/outbound.

use std::collections::{BTreeMap, HashMap};

use super::{Bound, Compass, LineId, LiveArrival};

/// Which bound each compass direction corresponds to on one line.
pub type CompassMap = BTreeMap<Compass, Bound>;

/// Compass topology for the lines at a station.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTopology {
    lines: HashMap<LineId, CompassMap>,
}

impl LineTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `compass` means `bound` on `line`.
    pub fn insert(&mut self, line: LineId, compass: Compass, bound: Bound) {
        self.lines.entry(line).or_default().insert(compass, bound);
    }

    /// Add (or replace) the whole mapping for one line.
    pub fn insert_line(&mut self, line: LineId, map: CompassMap) {
        self.lines.insert(line, map);
    }

    /// The bound `compass` corresponds to on `line`, if known.
    pub fn bound_for(&self, line: &LineId, compass: Compass) -> Option<Bound> {
        self.lines.get(line)?.get(&compass).copied()
    }

    /// The full mapping for one line, if any direction is known.
    pub fn for_line(&self, line: &LineId) -> Option<&CompassMap> {
        self.lines.get(line)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Infer the topology from live predictions.
    ///
    /// Each prediction with both a bound tag and a compass word in its
    /// platform name (`"Northbound - Platform 1"`) is one vote. The bound
    /// with most votes wins; ties go to inbound.
    pub fn infer(live: &[LiveArrival]) -> Self {
        let mut votes: HashMap<(&LineId, Compass), (usize, usize)> = HashMap::new();
        for arrival in live {
            let (Some(bound), Some(compass)) = (
                arrival.direction,
                Compass::from_platform_name(&arrival.platform_name),
            ) else {
                continue;
            };
            let entry = votes.entry((&arrival.line_id, compass)).or_default();
            match bound {
                Bound::Inbound => entry.0 += 1,
                Bound::Outbound => entry.1 += 1,
            }
        }

        let mut topology = Self::new();
        for ((line, compass), (inbound, outbound)) in votes {
            let bound = if outbound > inbound {
                Bound::Outbound
            } else {
                Bound::Inbound
            };
            topology.insert(line.clone(), compass, bound);
        }
        topology
    }
}
