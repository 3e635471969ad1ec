//! Command-line front end.
//!
//! `now` prints the merged departure board, `list` shows which directions
//! and destinations a station offers, and `env` checks credentials.

mod commands;
mod debug;
mod error;
mod lines;

use std::io::Write;
use std::path::PathBuf;

use chrono::DateTime;
use chrono_tz::Tz;
use clap::{Args, Parser, Subcommand};

pub use commands::{NowSummary, env_report, list, now};
pub use debug::{DEFAULT_DEBUG_PATH, DebugReport, redact, write_debug_file};
pub use error::CliError;
pub use lines::{LINE_TIMETABLE_LINE_THRESHOLD, resolve_line_filters, should_fetch_line_timetables};

use crate::tfl::{MockTflClient, TflClient, TflConfig};

const EXAMPLES: &str = "\
Examples:
  tube-timing env
  tube-timing now \"Regent's Park\" 10m
  tube-timing now \"Waterloo\" 30m --line jubilee --direction southbound
  tube-timing list \"Oxford Circus\" --line victoria";

#[derive(Parser, Debug)]
#[command(
    name = "tube-timing",
    version,
    about = "Check upcoming TfL departures for a station.",
    after_help = EXAMPLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show live and scheduled departures in a future window
    Now(NowArgs),
    /// List available directions and destinations for a station
    List(ListArgs),
    /// Check API environment variables
    Env,
}

#[derive(Args, Debug, Clone)]
pub struct NowArgs {
    /// Station name, e.g. "Totteridge & Whetstone"
    pub station: String,

    /// Time window, e.g. 30m or 1h30m
    pub window: String,

    /// Filter by destination, or by a stop timetabled trains call at
    #[arg(long)]
    pub towards: Option<String>,

    /// Write raw API payloads to JSON
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = DEFAULT_DEBUG_PATH
    )]
    pub debug: Option<PathBuf>,

    #[command(flatten)]
    pub options: BoardOptions,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Station name, e.g. "Oxford Circus"
    pub station: String,

    #[command(flatten)]
    pub options: BoardOptions,
}

/// Options shared by `now` and `list`.
#[derive(Args, Debug, Clone, Default)]
pub struct BoardOptions {
    /// TfL mode used to narrow station search
    #[arg(long, default_value = "tube")]
    pub mode: String,

    /// Filter by line name or id (repeatable or comma-separated)
    #[arg(long = "line", short = 'l', value_name = "LINE")]
    pub lines: Vec<String>,

    /// Filter by direction (inbound/outbound or northbound/southbound/etc)
    #[arg(long)]
    pub direction: Option<String>,

    /// Allow per-line timetables on stations with many lines (may be slow)
    #[arg(long)]
    pub full_timetable: bool,

    /// Extra place-name abbreviations, e.g. "Morden=MDN;Edgware=EDG"
    #[arg(long, env = "TUBE_TIMING_TOWARDS_ALIASES")]
    pub aliases: Option<String>,

    /// Serve fixture data from this directory instead of calling TfL
    #[arg(long, value_name = "DIR")]
    pub mock_dir: Option<PathBuf>,

    /// TfL application key
    #[arg(long, env = "TFL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// TfL application id
    #[arg(long, env = "TFL_APP_ID", hide_env_values = true)]
    pub app_id: Option<String>,
}

impl BoardOptions {
    fn tfl_config(&self, capture: bool) -> TflConfig {
        let mut config = TflConfig::new(self.api_key.clone().unwrap_or_default())
            .with_modes([self.mode.clone()])
            .with_payload_capture(capture);
        if let Some(app_id) = &self.app_id {
            config = config.with_app_id(app_id.clone());
        }
        config
    }
}

/// Run a parsed command, writing the board to `out` and notes to `err`.
///
/// Returns the process exit status for commands that finish normally.
pub async fn run(
    cli: Cli,
    now_instant: DateTime<Tz>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32, CliError> {
    match cli.command {
        Command::Env => {
            let key = std::env::var("TFL_API_KEY").ok();
            Ok(env_report(key.as_deref(), out)?)
        }
        Command::Now(args) => {
            if let Some(dir) = &args.options.mock_dir {
                let provider = MockTflClient::new(dir)?.with_now(now_instant);
                if args.debug.is_some() {
                    writeln!(err, "Note: --debug records nothing with --mock-dir.")?;
                }
                now(&provider, &args, now_instant, out, err).await?;
                return Ok(0);
            }

            let client = TflClient::new(args.options.tfl_config(args.debug.is_some()))?;
            if args.debug.is_some() {
                writeln!(
                    err,
                    "Warning: debug output may include sensitive data; app_key will be redacted."
                )?;
            }
            let result = now(&client, &args, now_instant, out, err).await;

            if let Some(path) = &args.debug {
                let (stop_id, station_name, departure_count) = match &result {
                    Ok(summary) => (
                        summary.station.id.to_string(),
                        summary.station.canonical_name.clone(),
                        summary.departure_count,
                    ),
                    Err(_) => (String::new(), String::new(), 0),
                };
                let report = DebugReport {
                    query: args.station.clone(),
                    stop_id,
                    station_name,
                    departure_count,
                    payloads: client.take_captured(),
                };
                let secrets: Vec<&str> = [Some(client.api_key()), client.app_id()]
                    .into_iter()
                    .flatten()
                    .collect();
                write_debug_file(path, &report, &secrets)?;
                writeln!(err, "Wrote debug payloads to {}", path.display())?;
            }

            result.map(|_| 0)
        }
        Command::List(args) => {
            match &args.options.mock_dir {
                Some(dir) => {
                    let provider = MockTflClient::new(dir)?.with_now(now_instant);
                    list(&provider, &args, out, err).await?;
                }
                None => {
                    let client = TflClient::new(args.options.tfl_config(false))?;
                    list(&client, &args, out, err).await?;
                }
            }
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::London;

    const MOCK_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/mock");

    fn monday_evening() -> DateTime<Tz> {
        London.with_ymd_and_hms(2026, 2, 9, 19, 9, 0).unwrap()
    }

    async fn run_args(args: &[&str]) -> (Result<i32, CliError>, String, String) {
        let argv = std::iter::once("tube-timing")
            .chain(args.iter().copied())
            .chain(["--mock-dir", MOCK_DIR]);
        let cli = Cli::try_parse_from(argv).unwrap();
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = run(cli, monday_evening(), &mut out, &mut err).await;
        (
            result,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn parses_now_arguments() {
        let cli = Cli::try_parse_from([
            "tube-timing",
            "now",
            "Waterloo",
            "30m",
            "--line",
            "jubilee,northern",
            "-l",
            "bakerloo",
            "--direction",
            "sb",
            "--debug",
        ])
        .unwrap();
        let Command::Now(args) = cli.command else {
            panic!("expected now");
        };
        assert_eq!(args.station, "Waterloo");
        assert_eq!(args.window, "30m");
        assert_eq!(args.options.lines, vec!["jubilee,northern", "bakerloo"]);
        assert_eq!(args.options.direction.as_deref(), Some("sb"));
        assert_eq!(args.options.mode, "tube");
        assert_eq!(args.debug, Some(PathBuf::from(DEFAULT_DEBUG_PATH)));
    }

    #[test]
    fn debug_takes_optional_path() {
        let cli =
            Cli::try_parse_from(["tube-timing", "now", "Bank", "10m", "--debug", "out.json"])
                .unwrap();
        let Command::Now(args) = cli.command else {
            panic!("expected now");
        };
        assert_eq!(args.debug, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn now_requires_window() {
        assert!(Cli::try_parse_from(["tube-timing", "now", "Bank"]).is_err());
    }

    #[tokio::test]
    async fn now_prints_merged_board() {
        let (result, out, _err) = run_args(&["now", "Totteridge & Whetstone", "30m"]).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(
            out,
            "Expected departures at Totteridge & Whetstone (next 30m):\n\
             High Barnet 19:12 (in 3m) LIVE\n\
             Morden via Bank 19:13 (in 4m) LIVE\n\
             Kennington via CX 19:19 (in 10m) LIVE\n\
             High Barnet 19:24 (in 15m) LIVE\n\
             Morden via Bank 19:26 (in 17m) SCHEDULED\n\
             Kennington via CX 19:33 (in 24m) SCHEDULED\n\
             High Barnet 19:36 (in 27m) SCHEDULED\n"
        );
    }

    #[tokio::test]
    async fn now_with_compass_direction_on_single_line_station() {
        let (result, out, _err) =
            run_args(&["now", "Totteridge & Whetstone", "30m", "--direction", "northbound"]).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(
            out,
            "Expected departures at Totteridge & Whetstone (next 30m, direction: northbound):\n\
             High Barnet 19:12 (in 3m) LIVE\n\
             High Barnet 19:36 (in 27m) SCHEDULED\n"
        );
    }

    #[tokio::test]
    async fn now_towards_charing_cross_branch() {
        let (result, out, _err) =
            run_args(&["now", "Totteridge & Whetstone", "30m", "--towards", "CX"]).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(
            out,
            "Expected departures at Totteridge & Whetstone (next 30m):\n\
             Kennington via CX 19:33 (in 24m) SCHEDULED\n"
        );
    }

    #[tokio::test]
    async fn inexact_station_match_is_noted() {
        let (result, out, err) = run_args(&["now", "Totteridge", "5m"]).await;
        assert_eq!(result.unwrap(), 0);
        assert!(err.contains("using station match 'Totteridge & Whetstone Underground Station'"));
        assert!(out.starts_with("Expected departures at Totteridge & Whetstone (next 5m):\n"));
    }

    #[tokio::test]
    async fn empty_board_says_so() {
        let (result, out, _err) = run_args(&["now", "Oxford Circus", "10m", "--line", "victoria"]).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(
            out,
            "Expected departures at Oxford Circus (next 10m):\nNo departures found in this window.\n"
        );
    }

    #[tokio::test]
    async fn bad_window_is_an_error() {
        let (result, out, _err) = run_args(&["now", "Totteridge & Whetstone", "10x"]).await;
        assert!(matches!(result, Err(CliError::Core(_))));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn window_over_a_day_is_rejected() {
        let (result, _out, _err) = run_args(&["now", "Totteridge & Whetstone", "25h"]).await;
        assert!(matches!(result, Err(CliError::WindowTooLong { .. })));
    }

    #[tokio::test]
    async fn unknown_station_is_an_error() {
        let (result, _out, _err) = run_args(&["now", "Atlantis", "10m"]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "no station found matching 'Atlantis'"
        );
    }

    #[tokio::test]
    async fn unknown_line_lists_station_lines() {
        let (result, _out, _err) =
            run_args(&["now", "Totteridge & Whetstone", "10m", "--line", "jubilee"]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "unknown line(s): jubilee. Available lines: northern"
        );
    }

    #[tokio::test]
    async fn compass_direction_needs_one_line() {
        let (result, _out, _err) = run_args(&[
            "now",
            "Oxford Circus",
            "10m",
            "--direction",
            "southbound",
        ])
        .await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "southbound needs exactly one line selected (got 3); use inbound/outbound or pick one line"
        );
    }

    #[tokio::test]
    async fn multi_line_station_skips_line_timetables() {
        let (result, _out, err) = run_args(&["now", "Oxford Circus", "10m"]).await;
        assert_eq!(result.unwrap(), 0);
        assert!(err.contains(
            "Warning: Oxford Circus has 3 lines; skipping per-line timetables."
        ));
    }

    #[tokio::test]
    async fn list_shows_directions_and_destinations() {
        let (result, out, _err) = run_args(&["list", "Totteridge & Whetstone"]).await;
        assert_eq!(result.unwrap(), 0);
        assert_eq!(
            out,
            "Available options for Totteridge & Whetstone:\n\
             Directions:\n\
             northbound (outbound)\n\
             southbound (inbound)\n\
             inbound\n\
             outbound\n\
             Live destinations:\n\
             High Barnet\n\
             Kennington via CX\n\
             Morden via Bank\n\
             Timetable destinations:\n\
             High Barnet\n\
             Kennington via CX\n\
             Morden via Bank\n"
        );
    }

    #[tokio::test]
    async fn list_filtered_by_bound() {
        let (result, out, _err) =
            run_args(&["list", "Totteridge & Whetstone", "--direction", "in"]).await;
        assert_eq!(result.unwrap(), 0);
        assert!(out.contains("Live destinations:\nKennington via CX\nMorden via Bank\n"));
        assert!(!out.contains("High Barnet"));
    }

    #[tokio::test]
    async fn list_with_nothing_available() {
        let (result, out, err) = run_args(&["list", "Oxford Circus"]).await;
        assert_eq!(result.unwrap(), 0);
        assert!(err.contains("skipping per-line timetables"));
        assert_eq!(
            out,
            "Available options for Oxford Circus:\n\
             Directions: no live arrivals to infer.\n\
             No live destinations right now. Timetable destinations skipped; use --line or --full-timetable.\n"
        );
    }
}
