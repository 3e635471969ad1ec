//! Departure records from the two data sources, and the merged view.

use std::fmt;

use chrono::DateTime;
use chrono_tz::Tz;

use super::{Bound, LineId};

/// Where a departure record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Source {
    /// Real-time prediction.
    Live,
    /// Projected from a timetable.
    Scheduled,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Live => "LIVE",
            Source::Scheduled => "SCHEDULED",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live arrival prediction at the board station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveArrival {
    pub line_id: LineId,
    /// Inbound/outbound tag, when the provider supplies one.
    pub direction: Option<Bound>,
    pub destination_name: String,
    /// E.g. `"Northbound - Platform 1"`.
    pub platform_name: String,
    pub expected_instant: DateTime<Tz>,
    /// Route hint from the provider's "towards" text (`"Edgware via CX"`).
    pub via: Option<String>,
}

/// A concrete departure projected from a timetable pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledDeparture {
    pub line_id: LineId,
    pub direction: Option<Bound>,
    pub destination_name: String,
    /// Advertised "via" stops distinguishing this route from others
    /// to the same destination, in calling order.
    pub via_stops: Vec<String>,
    /// Every intermediate stop, in calling order.
    pub calling_points: Vec<String>,
    pub expected_instant: DateTime<Tz>,
}

/// A departure from either source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Departure {
    Live(LiveArrival),
    Scheduled(ScheduledDeparture),
}

impl Departure {
    pub fn line_id(&self) -> &LineId {
        match self {
            Departure::Live(d) => &d.line_id,
            Departure::Scheduled(d) => &d.line_id,
        }
    }

    pub fn direction(&self) -> Option<Bound> {
        match self {
            Departure::Live(d) => d.direction,
            Departure::Scheduled(d) => d.direction,
        }
    }

    pub fn destination_name(&self) -> &str {
        match self {
            Departure::Live(d) => &d.destination_name,
            Departure::Scheduled(d) => &d.destination_name,
        }
    }

    pub fn expected_instant(&self) -> DateTime<Tz> {
        match self {
            Departure::Live(d) => d.expected_instant,
            Departure::Scheduled(d) => d.expected_instant,
        }
    }

    pub fn source(&self) -> Source {
        match self {
            Departure::Live(_) => Source::Live,
            Departure::Scheduled(_) => Source::Scheduled,
        }
    }

    /// The first "via" stop to show next to the destination, if any.
    pub fn first_via_stop(&self) -> Option<&str> {
        match self {
            Departure::Live(d) => d.via.as_deref(),
            Departure::Scheduled(d) => d.via_stops.first().map(String::as_str),
        }
    }

    /// Intermediate stops a "towards" filter may match on.
    ///
    /// Live predictions carry no calling pattern, so this is empty for them.
    pub fn intermediate_stops(&self) -> impl Iterator<Item = &str> {
        let stops: &[String] = match self {
            Departure::Live(_) => &[],
            Departure::Scheduled(d) => &d.calling_points,
        };
        let via: &[String] = match self {
            Departure::Live(_) => &[],
            Departure::Scheduled(d) => &d.via_stops,
        };
        via.iter().chain(stops.iter()).map(String::as_str)
    }
}

impl From<LiveArrival> for Departure {
    fn from(value: LiveArrival) -> Self {
        Departure::Live(value)
    }
}

impl From<ScheduledDeparture> for Departure {
    fn from(value: ScheduledDeparture) -> Self {
        Departure::Scheduled(value)
    }
}
