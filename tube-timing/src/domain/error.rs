//! Domain error types.
//!
//! These errors represent validation failures in user input or in the
//! combination of input and provider data. They are distinct from
//! API/IO errors, which belong to the provider.

use super::{Compass, InvalidDirection, InvalidWindowFormat, LineId};

/// The provider returned no candidate stops for a station query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no station found matching '{query}'")]
pub struct NoStationFound {
    pub query: String,
}

/// A direction filter that cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// A compass direction was requested without exactly one line selected.
    #[error("{direction} needs exactly one line selected (got {line_count}); use inbound/outbound or pick one line")]
    AmbiguousDirectionFilter { direction: Compass, line_count: usize },

    /// The selected line's topology does not say which way the compass direction runs.
    #[error("could not work out whether {direction} is inbound or outbound on the {line} line")]
    DirectionNotResolvable { direction: Compass, line: LineId },
}

/// Any error the core can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    InvalidWindowFormat(#[from] InvalidWindowFormat),

    #[error(transparent)]
    InvalidDirection(#[from] InvalidDirection),

    #[error(transparent)]
    NoStationFound(#[from] NoStationFound),

    #[error(transparent)]
    Filter(#[from] FilterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = NoStationFound {
            query: "Nowhere".into(),
        };
        assert_eq!(err.to_string(), "no station found matching 'Nowhere'");

        let err = FilterError::AmbiguousDirectionFilter {
            direction: Compass::North,
            line_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "northbound needs exactly one line selected (got 2); use inbound/outbound or pick one line"
        );

        let err = FilterError::DirectionNotResolvable {
            direction: Compass::East,
            line: LineId::parse("central").unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "could not work out whether eastbound is inbound or outbound on the central line"
        );
    }

    #[test]
    fn core_error_is_transparent() {
        let err: CoreError = NoStationFound {
            query: "X".into(),
        }
        .into();
        assert_eq!(err.to_string(), "no station found matching 'X'");
    }
}
