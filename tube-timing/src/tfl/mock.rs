//! Mock TfL client for running without API access.
//!
//! Loads sample responses from JSON files and serves them through the
//! same conversion code as the real client.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Europe::London;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::aliases::normalize_name;
use crate::domain::{LineId, LiveArrival, Station, StationId, TimetablePattern};
use crate::provider::TransitProvider;

use super::convert::{convert_predictions, convert_search, convert_stop_point, convert_timetable};
use super::error::TflError;
use super::types::{Prediction, SearchResponse, StopPoint, TimetableResponse};

/// Fixture data for one stop.
#[derive(Debug, Default)]
struct StopFixture {
    stop_point: Option<StopPoint>,
    arrivals: Option<Vec<Prediction>>,
    timetable: Option<TimetableResponse>,
}

/// Mock TfL client that serves data from JSON files.
///
/// The directory holds `search.json` plus, per stop, any of `{id}.json`,
/// `{id}.arrivals.json` and `{id}.timetable.json`.
#[derive(Debug, Clone)]
pub struct MockTflClient {
    search: Arc<SearchResponse>,
    stops: Arc<HashMap<String, StopFixture>>,
    /// Fixed clock for relative predictions; wall clock when unset.
    now: Option<DateTime<Tz>>,
}

impl MockTflClient {
    /// Create a new mock client by loading JSON files from a directory.
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self, TflError> {
        let data_dir = data_dir.as_ref();
        let mut search = None;
        let mut stops: HashMap<String, StopFixture> = HashMap::new();

        let entries = std::fs::read_dir(data_dir).map_err(|e| fixture_error(data_dir, e))?;
        for entry in entries {
            let path = entry.map_err(|e| fixture_error(data_dir, e))?.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            if stem == "search" {
                search = Some(load(&path)?);
            } else if let Some(id) = stem.strip_suffix(".arrivals") {
                stops.entry(id.to_string()).or_default().arrivals = Some(load(&path)?);
            } else if let Some(id) = stem.strip_suffix(".timetable") {
                stops.entry(id.to_string()).or_default().timetable = Some(load(&path)?);
            } else {
                stops.entry(stem.to_string()).or_default().stop_point = Some(load(&path)?);
            }
        }

        if search.is_none() && stops.is_empty() {
            return Err(fixture_error(data_dir, "no fixture files found"));
        }
        debug!(dir = %data_dir.display(), stops = stops.len(), "loaded mock fixtures");

        Ok(Self {
            search: Arc::new(search.unwrap_or_default()),
            stops: Arc::new(stops),
            now: None,
        })
    }

    /// Pin the clock used to place `timeToStation` predictions.
    pub fn with_now(mut self, now: DateTime<Tz>) -> Self {
        self.now = Some(now);
        self
    }

    fn now(&self) -> DateTime<Tz> {
        self.now
            .unwrap_or_else(|| Utc::now().with_timezone(&London))
    }

    fn stop(&self, station: &StationId) -> Option<&StopFixture> {
        self.stops.get(station.as_str())
    }
}

impl TransitProvider for MockTflClient {
    type Error = TflError;

    /// Search results whose name contains the query, in fixture order.
    async fn find_stations(&self, query: &str) -> Result<Vec<Station>, TflError> {
        let wanted = normalize_name(query);
        Ok(convert_search(&self.search)
            .into_iter()
            .filter(|s| normalize_name(&s.canonical_name).contains(&wanted))
            .collect())
    }

    async fn station_details(&self, station: &StationId) -> Result<Station, TflError> {
        let stop = self
            .stop(station)
            .and_then(|s| s.stop_point.as_ref())
            .ok_or_else(|| TflError::Api {
                status: 404,
                message: format!(
                    "No mock data for stop point {}. Available: {:?}",
                    station,
                    self.stops.keys().collect::<Vec<_>>()
                ),
            })?;
        Ok(convert_stop_point(stop, station.as_str()))
    }

    async fn fetch_live_arrivals(&self, station: &StationId) -> Result<Vec<LiveArrival>, TflError> {
        let predictions = self
            .stop(station)
            .and_then(|s| s.arrivals.as_deref())
            .unwrap_or(&[]);
        Ok(convert_predictions(predictions, self.now()))
    }

    async fn fetch_timetable(
        &self,
        station: &StationId,
        lines: &BTreeSet<LineId>,
    ) -> Result<Vec<TimetablePattern>, TflError> {
        let Some(response) = self.stop(station).and_then(|s| s.timetable.as_ref()) else {
            return Ok(vec![]);
        };
        Ok(convert_timetable(response, None, None)
            .into_iter()
            .filter(|p| lines.is_empty() || lines.contains(&p.line_id))
            .collect())
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, TflError> {
    let json = std::fs::read_to_string(path).map_err(|e| fixture_error(path, e))?;
    serde_json::from_str(&json).map_err(|e| fixture_error(path, e))
}

fn fixture_error(path: &Path, err: impl std::fmt::Display) -> TflError {
    TflError::Fixture {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
