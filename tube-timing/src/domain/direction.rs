//! Travel directions.
//!
//! TfL tags each prediction and timetable with `inbound` or `outbound`.
//! Riders think in compass terms ("northbound"), which only map to
//! inbound/outbound per line, so a compass request must be resolved
//! against a line's topology before it can filter anything.

use std::fmt;
use std::str::FromStr;

/// Error returned when a direction string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid direction '{0}': expected inbound/outbound or a cardinal like northbound")]
pub struct InvalidDirection(pub String);

/// TfL's per-line travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bound {
    Inbound,
    Outbound,
}

impl Bound {
    pub const ALL: [Bound; 2] = [Bound::Inbound, Bound::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bound::Inbound => "inbound",
            Bound::Outbound => "outbound",
        }
    }

    /// Parse the provider's direction tag. Unknown or empty tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "inbound" => Some(Bound::Inbound),
            "outbound" => Some(Bound::Outbound),
            _ => None,
        }
    }
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cardinal direction, as printed on platform signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Compass {
    North,
    South,
    East,
    West,
}

impl Compass {
    pub const ALL: [Compass; 4] = [Compass::North, Compass::South, Compass::East, Compass::West];

    /// The platform-sign spelling, e.g. `northbound`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Compass::North => "northbound",
            Compass::South => "southbound",
            Compass::East => "eastbound",
            Compass::West => "westbound",
        }
    }

    /// Find the compass direction mentioned in a platform name
    /// such as `"Northbound - Platform 1"`.
    pub fn from_platform_name(platform: &str) -> Option<Self> {
        let platform = platform.to_ascii_lowercase();
        Compass::ALL
            .into_iter()
            .find(|c| platform.contains(c.as_str()))
    }
}

impl fmt::Display for Compass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A direction requested by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectionFilter {
    Bound(Bound),
    Compass(Compass),
}

impl FromStr for DirectionFilter {
    type Err = InvalidDirection;

    /// Accepts `in`/`out`, `inbound`/`outbound`, `nb`/`sb`/`eb`/`wb`,
    /// `north`..`west` and `northbound`..`westbound`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let direction = match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inbound" => DirectionFilter::Bound(Bound::Inbound),
            "out" | "outbound" => DirectionFilter::Bound(Bound::Outbound),
            "n" | "nb" | "north" | "northbound" => DirectionFilter::Compass(Compass::North),
            "s" | "sb" | "south" | "southbound" => DirectionFilter::Compass(Compass::South),
            "e" | "eb" | "east" | "eastbound" => DirectionFilter::Compass(Compass::East),
            "w" | "wb" | "west" | "westbound" => DirectionFilter::Compass(Compass::West),
            _ => return Err(InvalidDirection(s.to_string())),
        };
        Ok(direction)
    }
}

impl fmt::Display for DirectionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionFilter::Bound(b) => b.fmt(f),
            DirectionFilter::Compass(c) => c.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bound_aliases() {
        assert_eq!("in".parse(), Ok(DirectionFilter::Bound(Bound::Inbound)));
        assert_eq!("Outbound".parse(), Ok(DirectionFilter::Bound(Bound::Outbound)));
    }

    #[test]
    fn parse_compass_aliases() {
        for text in ["nb", "north", "Northbound", " NORTHBOUND "] {
            assert_eq!(text.parse(), Ok(DirectionFilter::Compass(Compass::North)));
        }
        assert_eq!("wb".parse(), Ok(DirectionFilter::Compass(Compass::West)));
    }

    #[test]
    fn reject_unknown_direction() {
        let err = "upwards".parse::<DirectionFilter>().unwrap_err();
        assert!(err.to_string().contains("upwards"));
        assert!("".parse::<DirectionFilter>().is_err());
    }

    #[test]
    fn compass_from_platform_name() {
        assert_eq!(
            Compass::from_platform_name("Northbound - Platform 1"),
            Some(Compass::North)
        );
        assert_eq!(
            Compass::from_platform_name("Westbound - Platform 4"),
            Some(Compass::West)
        );
        assert_eq!(Compass::from_platform_name("Platform 2"), None);
    }

    #[test]
    fn bound_from_tag() {
        assert_eq!(Bound::from_tag("inbound"), Some(Bound::Inbound));
        assert_eq!(Bound::from_tag(" Outbound"), Some(Bound::Outbound));
        assert_eq!(Bound::from_tag(""), None);
    }

    #[test]
    fn display() {
        assert_eq!(DirectionFilter::Compass(Compass::South).to_string(), "southbound");
        assert_eq!(DirectionFilter::Bound(Bound::Inbound).to_string(), "inbound");
    }
}
