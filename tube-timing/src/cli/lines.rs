//! `--line` parsing and the per-line timetable policy.

use std::collections::BTreeSet;

use crate::domain::LineId;

use super::CliError;

/// Stations with at least this many lines get the station-level timetable
/// unless the rider narrows things down.
pub const LINE_TIMETABLE_LINE_THRESHOLD: usize = 2;

/// Shorthands accepted for `--line`, keyed by lowercase alphanumerics.
const LINE_ALIASES: &[(&str, &str)] = &[
    ("bakerloo", "bakerloo"),
    ("central", "central"),
    ("circle", "circle"),
    ("district", "district"),
    ("dlr", "dlr"),
    ("elizabeth", "elizabeth"),
    ("elizabethline", "elizabeth"),
    ("hammersmithandcity", "hammersmith-city"),
    ("hammersmithcity", "hammersmith-city"),
    ("hmc", "hammersmith-city"),
    ("jub", "jubilee"),
    ("jubilee", "jubilee"),
    ("met", "metropolitan"),
    ("metropolitan", "metropolitan"),
    ("northern", "northern"),
    ("overground", "london-overground"),
    ("picc", "piccadilly"),
    ("piccadilly", "piccadilly"),
    ("victoria", "victoria"),
    ("waterlooandcity", "waterloo-city"),
    ("waterloocity", "waterloo-city"),
    ("wac", "waterloo-city"),
];

fn line_token(value: &str) -> String {
    value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve `--line` values against the lines serving the station.
///
/// Each value may hold several comma-separated tokens. A token matches a
/// station line id ignoring case and punctuation, or one of the built-in
/// shorthands. When the station's lines are unknown, tokens that look
/// like line ids are taken as given.
pub fn resolve_line_filters(
    requested: &[String],
    available: &BTreeSet<LineId>,
) -> Result<BTreeSet<LineId>, CliError> {
    let mut resolved = BTreeSet::new();
    let mut unknown = Vec::new();

    let tokens = requested
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    for token in tokens {
        let wanted = line_token(token);
        if wanted.is_empty() {
            unknown.push(token.to_string());
            continue;
        }

        let line = available
            .iter()
            .find(|line| line_token(line.as_str()) == wanted)
            .cloned()
            .or_else(|| {
                LINE_ALIASES
                    .iter()
                    .find(|(alias, _)| *alias == wanted)
                    .and_then(|(_, id)| LineId::parse(id).ok())
            })
            .or_else(|| {
                available
                    .is_empty()
                    .then(|| LineId::parse(&token.replace(' ', "-")).ok())
                    .flatten()
            });

        match line {
            Some(line) if available.is_empty() || available.contains(&line) => {
                resolved.insert(line);
            }
            _ => unknown.push(token.to_string()),
        }
    }

    if !unknown.is_empty() {
        return Err(CliError::UnknownLines {
            unknown,
            available: available.iter().map(ToString::to_string).collect(),
        });
    }
    Ok(resolved)
}

/// Whether to fetch timetables line by line rather than for the whole station.
pub fn should_fetch_line_timetables(
    lines_selected: bool,
    station_line_count: usize,
    full_timetable: bool,
    towards_given: bool,
) -> bool {
    lines_selected
        || full_timetable
        || towards_given
        || station_line_count < LINE_TIMETABLE_LINE_THRESHOLD
}
