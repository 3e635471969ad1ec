//! Errors reported by the command-line front end.

use std::path::PathBuf;

use crate::domain::CoreError;
use crate::tfl::TflError;

/// Anything that stops a command. Every variant exits with status 2.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Provider(#[from] TflError),

    #[error("window {window} is longer than 24 hours")]
    WindowTooLong { window: String },

    #[error("unknown line(s): {}.{}", .unknown.join(", "), available_hint(.available))]
    UnknownLines {
        unknown: Vec<String>,
        available: Vec<String>,
    },

    #[error("could not write debug output to {}: {source}", .path.display())]
    DebugOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn available_hint(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!(" Available lines: {}", available.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NoStationFound;

    #[test]
    fn unknown_lines_lists_available() {
        let err = CliError::UnknownLines {
            unknown: vec!["purple".into()],
            available: vec!["northern".into(), "victoria".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown line(s): purple. Available lines: northern, victoria"
        );

        let err = CliError::UnknownLines {
            unknown: vec!["purple".into(), "pink".into()],
            available: vec![],
        };
        assert_eq!(err.to_string(), "unknown line(s): purple, pink.");
    }

    #[test]
    fn core_errors_pass_through() {
        let err = CliError::from(CoreError::from(NoStationFound {
            query: "Nowhere".into(),
        }));
        assert_eq!(err.to_string(), "no station found matching 'Nowhere'");
    }
}
