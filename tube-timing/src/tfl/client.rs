//! TfL Unified API HTTP client.
//!
//! Provides async methods for the StopPoint and Line endpoints the
//! departure board needs. Handles credentials, concurrency limiting,
//! optional payload capture, and conversion to domain types.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use chrono_tz::Europe::London;
use futures::future::join_all;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, trace, warn};

use crate::domain::{Bound, LineId, LiveArrival, Station, StationId, TimetablePattern};
use crate::provider::TransitProvider;

use super::convert::{convert_predictions, convert_search, convert_stop_point, convert_timetable};
use super::error::TflError;
use super::types::{Prediction, SearchResponse, StopPoint, TimetableResponse};

/// Default base URL for the TfL Unified API.
const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the TfL client.
#[derive(Debug, Clone)]
pub struct TflConfig {
    /// Application key, sent as `app_key`
    pub api_key: String,
    /// Optional application id, sent as `app_id`
    pub app_id: Option<String>,
    /// Base URL for the API (defaults to production TfL)
    pub base_url: String,
    /// Transport modes used to narrow station search
    pub modes: Vec<String>,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Keep every raw response for later inspection
    pub capture_payloads: bool,
}

impl TflConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            app_id: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            modes: vec!["tube".to_string()],
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            capture_payloads: false,
        }
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_modes(mut self, modes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.modes = modes.into_iter().map(Into::into).collect();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_payload_capture(mut self, enabled: bool) -> Self {
        self.capture_payloads = enabled;
        self
    }
}

/// One raw API exchange, kept for `--debug` output.
#[derive(Debug, Clone, Serialize)]
pub struct CapturedPayload {
    /// What the request was for, e.g. `line_timetable_northern_inbound`.
    pub label: String,
    /// Full request URL, credentials included.
    pub url: String,
    pub status: u16,
    /// Parsed JSON body, or the raw text if it was not JSON.
    pub body: serde_json::Value,
}

/// TfL Unified API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct TflClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    api_key: String,
    app_id: Option<String>,
    modes: Vec<String>,
    semaphore: Arc<Semaphore>,
    captured: Option<Arc<Mutex<Vec<CapturedPayload>>>>,
}

impl TflClient {
    /// Create a new TfL client with the given configuration.
    pub fn new(config: TflConfig) -> Result<Self, TflError> {
        if config.api_key.trim().is_empty() {
            return Err(TflError::NotConfigured(
                "TFL_API_KEY is not set. Run `tube-timing env` for help.".to_string(),
            ));
        }

        let base_url = reqwest::Url::parse(&config.base_url).map_err(|e| {
            TflError::NotConfigured(format!("invalid base URL {}: {e}", config.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(TflError::NotConfigured(format!(
                "invalid base URL {}",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("tube-timing/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key: config.api_key.trim().to_string(),
            app_id: config
                .app_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty()),
            modes: config.modes,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            captured: config
                .capture_payloads
                .then(|| Arc::new(Mutex::new(Vec::new()))),
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn app_id(&self) -> Option<&str> {
        self.app_id.as_deref()
    }

    /// Drain the payloads captured so far. Empty when capture is off.
    pub fn take_captured(&self) -> Vec<CapturedPayload> {
        match &self.captured {
            Some(captured) => match captured.lock() {
                Ok(mut guard) => std::mem::take(&mut *guard),
                Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
            },
            None => Vec::new(),
        }
    }

    /// `GET /StopPoint/Search/{query}`.
    pub async fn search_stop_points(&self, query: &str) -> Result<SearchResponse, TflError> {
        let mut params = Vec::new();
        if !self.modes.is_empty() {
            params.push(("modes", self.modes.join(",")));
        }
        self.get_json("search", &["StopPoint", "Search", query], &params)
            .await
    }

    /// `GET /StopPoint/{id}`.
    pub async fn stop_point(&self, stop_id: &str) -> Result<StopPoint, TflError> {
        self.get_json("stop_point", &["StopPoint", stop_id], &[]).await
    }

    /// `GET /StopPoint/{id}/Arrivals`.
    pub async fn arrivals(&self, stop_id: &str) -> Result<Vec<Prediction>, TflError> {
        self.get_json("arrivals", &["StopPoint", stop_id, "Arrivals"], &[])
            .await
    }

    /// `GET /StopPoint/{id}/Timetable`.
    pub async fn station_timetable(&self, stop_id: &str) -> Result<TimetableResponse, TflError> {
        self.get_json(
            "stop_point_timetable",
            &["StopPoint", stop_id, "Timetable"],
            &[],
        )
        .await
    }

    /// `GET /Line/{line}/Timetable/{id}?direction=`.
    pub async fn line_timetable(
        &self,
        line: &LineId,
        stop_id: &str,
        direction: Bound,
    ) -> Result<TimetableResponse, TflError> {
        let label = format!("line_timetable_{line}_{direction}");
        self.get_json(
            &label,
            &["Line", line.as_str(), "Timetable", stop_id],
            &[("direction", direction.as_str().to_string())],
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        label: &str,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, TflError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TflError::NotConfigured("request limiter closed".to_string()))?;

        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let mut query: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        query.push(("app_key", &self.api_key));
        if let Some(app_id) = &self.app_id {
            query.push(("app_id", app_id));
        }

        trace!(label, path = url.path(), "TfL request");
        let response = self.http.get(url).query(&query).send().await?;

        let status = response.status();
        let request_url = response.url().to_string();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(TflError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(TflError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.capture(label, request_url, status.as_u16(), &body);
            return Err(TflError::Api {
                status: status.as_u16(),
                message: body.trim().to_string(),
            });
        }

        let body = response.text().await?;
        debug!(label, bytes = body.len(), "TfL response");
        self.capture(label, request_url, status.as_u16(), &body);

        serde_json::from_str(&body).map_err(|e| TflError::json(e, &body))
    }

    fn capture(&self, label: &str, url: String, status: u16, body: &str) {
        let Some(captured) = &self.captured else {
            return;
        };
        let body = serde_json::from_str(body)
            .unwrap_or_else(|_| serde_json::Value::String(body.to_string()));
        let payload = CapturedPayload {
            label: label.to_string(),
            url,
            status,
            body,
        };
        match captured.lock() {
            Ok(mut guard) => guard.push(payload),
            Err(poisoned) => poisoned.into_inner().push(payload),
        }
    }
}

impl TransitProvider for TflClient {
    type Error = TflError;

    async fn find_stations(&self, query: &str) -> Result<Vec<Station>, TflError> {
        Ok(convert_search(&self.search_stop_points(query).await?))
    }

    async fn station_details(&self, station: &StationId) -> Result<Station, TflError> {
        let stop = self.stop_point(station.as_str()).await?;
        Ok(convert_stop_point(&stop, station.as_str()))
    }

    async fn fetch_live_arrivals(&self, station: &StationId) -> Result<Vec<LiveArrival>, TflError> {
        let predictions = self.arrivals(station.as_str()).await?;
        let now = Utc::now().with_timezone(&London);
        Ok(convert_predictions(&predictions, now))
    }

    /// Per-line requests that fail are logged and skipped as long as at
    /// least one succeeds; if every one fails the first error is returned.
    async fn fetch_timetable(
        &self,
        station: &StationId,
        lines: &BTreeSet<LineId>,
    ) -> Result<Vec<TimetablePattern>, TflError> {
        if lines.is_empty() {
            let response = self.station_timetable(station.as_str()).await?;
            return Ok(convert_timetable(&response, None, None));
        }

        let requests = lines
            .iter()
            .flat_map(|line| Bound::ALL.into_iter().map(move |bound| (line, bound)))
            .map(|(line, bound)| async move {
                let result = self.line_timetable(line, station.as_str(), bound).await;
                (line, bound, result)
            });
        let results = join_all(requests).await;

        let mut patterns = Vec::new();
        let mut first_error = None;
        let mut succeeded = 0;
        for (line, bound, result) in results {
            match result {
                Ok(response) => {
                    succeeded += 1;
                    patterns.extend(convert_timetable(&response, Some(line), Some(bound)));
                }
                Err(e) => {
                    warn!(line = %line, direction = %bound, error = %e, "line timetable unavailable");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(patterns),
        }
    }
}
