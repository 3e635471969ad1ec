//! The `now`, `list` and `env` commands.

use std::collections::BTreeSet;
use std::io::Write;

use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::aliases::{AliasTable, compact_destination};
use crate::domain::{
    Bound, CoreError, DirectionFilter, LineId, LineTopology, LiveArrival, Station,
    TimetablePattern, build_window,
};
use crate::format::{Formatter, destination_label};
use crate::merger::{Filter, merge};
use crate::provider::TransitProvider;
use crate::stations::resolve_station;
use crate::tfl::TflError;

use super::lines::{resolve_line_filters, should_fetch_line_timetables};
use super::{BoardOptions, CliError, ListArgs, NowArgs};

/// Longest window `now` accepts.
const MAX_WINDOW_HOURS: i64 = 24;

/// What `now` showed, for the debug report.
#[derive(Debug, Clone)]
pub struct NowSummary {
    pub station: Station,
    pub departure_count: usize,
}

/// The station and filter a board is drawn for.
struct Board {
    station: Station,
    filter: Filter,
    /// Whether the rider named lines, as opposed to them being implied.
    lines_selected: bool,
}

/// Print the merged departure board for a station.
pub async fn now<P>(
    provider: &P,
    args: &NowArgs,
    reference: DateTime<Tz>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<NowSummary, CliError>
where
    P: TransitProvider<Error = TflError>,
{
    let window = build_window(&args.window, reference).map_err(CoreError::from)?;
    if window.horizon() > Duration::hours(MAX_WINDOW_HOURS) {
        return Err(CliError::WindowTooLong {
            window: args.window.trim().to_string(),
        });
    }
    let direction = parse_direction(&args.options)?;
    let aliases = AliasTable::build(args.options.aliases.as_deref());

    let station = locate_station(provider, &args.station, &aliases, err).await?;
    let mut board = board_for(station, &args.options, direction)?;
    let towards = args
        .towards
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(towards) = towards {
        board.filter = board.filter.with_towards(towards);
    }
    let station_name = compact_destination(&board.station.canonical_name);

    let per_line = should_fetch_line_timetables(
        board.lines_selected,
        board.station.lines.len(),
        args.options.full_timetable,
        towards.is_some(),
    );
    if !per_line {
        warn_station_level(&station_name, board.station.lines.len(), err)?;
    } else if towards.is_some()
        && !board.lines_selected
        && !args.options.full_timetable
        && board.station.lines.len() > 1
    {
        writeln!(
            err,
            "Note: --towards enabled per-line timetables for this multi-line station. \
             Use --line to limit requests."
        )?;
    }
    let timetable_lines = if per_line {
        lines_to_fetch(&board)
    } else {
        BTreeSet::new()
    };

    let compass_line = match board.filter.direction {
        Some(DirectionFilter::Compass(_)) => board.filter.lines.first().cloned(),
        _ => None,
    };
    debug!(
        station = %board.station.id,
        lines = ?timetable_lines,
        per_line,
        "fetching departures"
    );

    let station_id = &board.station.id;
    let (live, patterns) = tokio::join!(
        provider.fetch_live_arrivals(station_id),
        provider.fetch_timetable(station_id, &timetable_lines),
    );
    let live = live?;
    let patterns = timetable_or_warn(patterns, err)?;

    let mut topology = LineTopology::new();
    if let Some(line) = compass_line
        && let Some(map) = provider.line_topology(station_id, &line, &live).await?
    {
        topology.insert_line(line, map);
    }

    let live_labels = live_destinations(&live, None, &aliases);
    let departures = merge(
        live,
        &patterns,
        &window,
        &board.filter,
        &aliases,
        &topology,
    )
    .map_err(CoreError::from)?;

    if departures.is_empty()
        && let Some(towards) = towards
        && !live_labels.is_empty()
    {
        let sample: Vec<&str> = live_labels.iter().take(5).map(String::as_str).collect();
        writeln!(
            err,
            "Note: --towards '{towards}' filtered out all departures. Live destinations include: {}",
            sample.join(", ")
        )?;
    }

    let direction_label = board
        .filter
        .direction
        .map(|d| format!(", direction: {d}"))
        .unwrap_or_default();
    writeln!(
        out,
        "Expected departures at {station_name} (next {}{direction_label}):",
        args.window.trim()
    )?;
    if departures.is_empty() {
        writeln!(out, "No departures found in this window.")?;
    }
    let formatter = Formatter::new(&aliases, reference);
    for departure in &departures {
        writeln!(out, "{}", formatter.format(departure))?;
    }

    Ok(NowSummary {
        departure_count: departures.len(),
        station: board.station,
    })
}

/// Print the directions and destinations a station offers.
pub async fn list<P>(
    provider: &P,
    args: &ListArgs,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<(), CliError>
where
    P: TransitProvider<Error = TflError>,
{
    let direction = parse_direction(&args.options)?;
    let aliases = AliasTable::build(args.options.aliases.as_deref());

    let station = locate_station(provider, &args.station, &aliases, err).await?;
    let board = board_for(station, &args.options, direction)?;
    let station_name = compact_destination(&board.station.canonical_name);

    let per_line = should_fetch_line_timetables(
        board.lines_selected,
        board.station.lines.len(),
        args.options.full_timetable,
        false,
    );
    if !per_line {
        warn_station_level(&station_name, board.station.lines.len(), err)?;
    }
    let timetable_lines = lines_to_fetch(&board);

    let station_id = &board.station.id;
    let (live, patterns) = tokio::join!(provider.fetch_live_arrivals(station_id), async {
        if per_line {
            provider.fetch_timetable(station_id, &timetable_lines).await
        } else {
            Ok(Vec::new())
        }
    });
    let live: Vec<LiveArrival> = live?
        .into_iter()
        .filter(|a| board.filter.lines.is_empty() || board.filter.lines.contains(&a.line_id))
        .collect();
    let patterns = timetable_or_warn(patterns, err)?;

    writeln!(out, "Available options for {station_name}:")?;
    let topology = LineTopology::infer(&live);
    print_directions(&live, &topology, out)?;

    let bound = board
        .filter
        .resolve_direction(&topology)
        .map_err(CoreError::from)?;

    let live_labels = live_destinations(&live, bound, &aliases);
    if !live_labels.is_empty() {
        writeln!(out, "Live destinations:")?;
        for label in &live_labels {
            writeln!(out, "{label}")?;
        }
    }

    let timetable_labels: BTreeSet<String> = patterns
        .iter()
        .filter(|p| board.filter.lines.is_empty() || board.filter.lines.contains(&p.line_id))
        .filter(|p| bound.is_none_or(|b| p.direction == Some(b)))
        .map(|p| pattern_label(p, &aliases))
        .collect();
    if !timetable_labels.is_empty() {
        writeln!(out, "Timetable destinations:")?;
        for label in &timetable_labels {
            writeln!(out, "{label}")?;
        }
    }

    if live_labels.is_empty() && timetable_labels.is_empty() {
        if per_line {
            writeln!(out, "No destinations available right now.")?;
        } else {
            writeln!(
                out,
                "No live destinations right now. \
                 Timetable destinations skipped; use --line or --full-timetable."
            )?;
        }
    }
    Ok(())
}

/// Report whether the API key is set, masking all but its ends.
///
/// Returns exit status 1 when it is missing.
pub fn env_report(api_key: Option<&str>, out: &mut impl Write) -> std::io::Result<i32> {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        Some(key) => {
            let chars: Vec<char> = key.chars().collect();
            let masked = if chars.len() > 8 {
                let head: String = chars[..4].iter().collect();
                let tail: String = chars[chars.len() - 4..].iter().collect();
                format!("{head}...{tail}")
            } else {
                "set".to_string()
            };
            writeln!(out, "TFL_API_KEY is set ({masked}).")?;
            Ok(0)
        }
        None => {
            writeln!(out, "TFL_API_KEY is not set.")?;
            writeln!(out, "Run: export TFL_API_KEY=\"your_key_here\"")?;
            Ok(1)
        }
    }
}

fn parse_direction(options: &BoardOptions) -> Result<Option<DirectionFilter>, CliError> {
    let direction = options
        .direction
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::parse::<DirectionFilter>)
        .transpose()
        .map_err(CoreError::from)?;
    Ok(direction)
}

/// Search for the station and fetch its details.
async fn locate_station<P>(
    provider: &P,
    query: &str,
    aliases: &AliasTable,
    err: &mut impl Write,
) -> Result<Station, CliError>
where
    P: TransitProvider<Error = TflError>,
{
    let expanded = aliases.resolve_to_canonical(query);
    let search = if expanded == query {
        query.trim().to_string()
    } else {
        writeln!(err, "Note: interpreting station '{query}' as '{expanded}'.")?;
        expanded
    };

    let candidates = provider.find_stations(&search).await?;
    let found = resolve_station(&search, &candidates, aliases).map_err(CoreError::from)?;
    if !found.matched_exactly {
        writeln!(
            err,
            "Note: using station match '{}' for query '{search}'.",
            found.station.canonical_name
        )?;
    }

    match provider.station_details(&found.station.id).await {
        Ok(station) => Ok(station),
        Err(e) => {
            warn!(station = %found.station.id, error = %e, "stop point details unavailable");
            Ok(found.station)
        }
    }
}

/// Resolve `--line` and `--direction` into a filter for `station`.
///
/// A compass direction with no lines named applies to every line at the
/// station, so a single-line station needs no `--line`.
fn board_for(
    station: Station,
    options: &BoardOptions,
    direction: Option<DirectionFilter>,
) -> Result<Board, CliError> {
    let selected = resolve_line_filters(&options.lines, &station.lines)?;
    let lines_selected = !selected.is_empty();

    let mut filter = Filter::new().with_lines(selected);
    if let Some(direction) = direction {
        if matches!(direction, DirectionFilter::Compass(_)) && filter.lines.is_empty() {
            filter.lines = station.lines.clone();
        }
        filter = filter.with_direction(direction);
    }
    filter.validate().map_err(CoreError::from)?;

    Ok(Board {
        station,
        filter,
        lines_selected,
    })
}

/// Lines to request timetables for: the named ones, else all at the station.
fn lines_to_fetch(board: &Board) -> BTreeSet<LineId> {
    if board.filter.lines.is_empty() {
        board.station.lines.clone()
    } else {
        board.filter.lines.clone()
    }
}

fn warn_station_level(
    station_name: &str,
    line_count: usize,
    err: &mut impl Write,
) -> Result<(), CliError> {
    writeln!(
        err,
        "Warning: {station_name} has {line_count} lines; skipping per-line timetables. \
         Use --line or --full-timetable."
    )?;
    Ok(())
}

/// A failed timetable leaves the live board usable, so it only warns.
fn timetable_or_warn(
    patterns: Result<Vec<TimetablePattern>, TflError>,
    err: &mut impl Write,
) -> Result<Vec<TimetablePattern>, CliError> {
    match patterns {
        Ok(patterns) => Ok(patterns),
        Err(e) => {
            warn!(error = %e, "timetable unavailable");
            writeln!(err, "Warning: timetable unavailable ({e}); showing live departures only.")?;
            Ok(Vec::new())
        }
    }
}

/// Distinct live destination labels, optionally for one bound only.
fn live_destinations(
    live: &[LiveArrival],
    bound: Option<Bound>,
    aliases: &AliasTable,
) -> BTreeSet<String> {
    live.iter()
        .filter(|a| bound.is_none_or(|b| a.direction == Some(b)))
        .map(|a| destination_label(aliases, &a.destination_name, a.via.as_deref()))
        .collect()
}

fn pattern_label(pattern: &TimetablePattern, aliases: &AliasTable) -> String {
    destination_label(
        aliases,
        &pattern.destination_name,
        pattern.via_stops.first().map(String::as_str),
    )
}

fn print_directions(
    live: &[LiveArrival],
    topology: &LineTopology,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let lines: BTreeSet<&LineId> = live.iter().map(|a| &a.line_id).collect();
    let bounds: BTreeSet<Bound> = live.iter().filter_map(|a| a.direction).collect();
    if topology.is_empty() && bounds.is_empty() {
        writeln!(out, "Directions: no live arrivals to infer.")?;
        return Ok(());
    }

    writeln!(out, "Directions:")?;
    for line in &lines {
        let Some(map) = topology.for_line(line) else {
            continue;
        };
        for (compass, bound) in map {
            if lines.len() > 1 {
                writeln!(out, "{line}: {compass} ({bound})")?;
            } else {
                writeln!(out, "{compass} ({bound})")?;
            }
        }
    }
    for bound in bounds {
        writeln!(out, "{bound}")?;
    }
    Ok(())
}
