//! Station and line identifier types.

use std::collections::BTreeSet;
use std::fmt;

/// Error returned when parsing an invalid line id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid line id: {reason}")]
pub struct InvalidLineId {
    reason: &'static str,
}

/// A TfL line id, such as `northern` or `hammersmith-city`.
///
/// Line ids are lowercase ASCII slugs. Construction lowercases and trims the
/// input, so `LineId::parse("Northern")` and `LineId::parse("northern")`
/// compare equal.
///
/// # Examples
///
/// ```
/// use tube_timing::domain::LineId;
///
/// let line = LineId::parse("Northern").unwrap();
/// assert_eq!(line.as_str(), "northern");
///
/// assert!(LineId::parse("").is_err());
/// assert!(LineId::parse("north ern").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(String);

impl LineId {
    /// Parse a line id. Allowed characters: ASCII letters, digits, `-`.
    pub fn parse(s: &str) -> Result<Self, InvalidLineId> {
        let id = s.trim().to_ascii_lowercase();

        if id.is_empty() {
            return Err(InvalidLineId {
                reason: "must not be empty",
            });
        }

        if !id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        {
            return Err(InvalidLineId {
                reason: "must contain only letters, digits and '-'",
            });
        }

        Ok(Self(id))
    }

    /// Returns the line id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LineId({})", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provider stop id (TfL NaPTAN id, e.g. `940GZZLUTAW`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stop as returned by the provider's station search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Station {
    /// Provider stop id.
    pub id: StationId,
    /// Display name, as the provider spells it.
    pub canonical_name: String,
    /// Lines serving this stop. Empty if the provider did not say.
    pub lines: BTreeSet<LineId>,
}

impl Station {
    /// Create a station with no known lines.
    pub fn new(id: impl Into<String>, canonical_name: impl Into<String>) -> Self {
        Self {
            id: StationId::new(id),
            canonical_name: canonical_name.into(),
            lines: BTreeSet::new(),
        }
    }

    /// Add the lines serving this station.
    pub fn with_lines(mut self, lines: impl IntoIterator<Item = LineId>) -> Self {
        self.lines.extend(lines);
        self
    }
}
