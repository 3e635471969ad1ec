//! TfL Unified API client.
//!
//! This module provides an HTTP client for the Transport for London API,
//! which serves live arrival predictions and working timetables.
//!
//! Key characteristics of the API:
//! - Stops are identified by NaPTAN ids (`940GZZLUTAW`)
//! - Predictions carry an absolute `expectedArrival`, a relative
//!   `timeToStation`, or both
//! - Timetables list clock times per service day; hours past midnight
//!   are written as 24, 25, ...
//! - Fields are omitted rather than nulled, and numbers sometimes
//!   arrive as strings

mod client;
mod convert;
mod error;
mod mock;
mod types;

pub use client::{CapturedPayload, TflClient, TflConfig};
pub use convert::{
    VIA_STOP_IDS, convert_predictions, convert_search, convert_stop_point, convert_timetable,
};
pub use error::TflError;
pub use mock::MockTflClient;
pub use types::{
    Frequency, KnownJourney, LenientNumber, Period, Prediction, Schedule, SearchMatch,
    SearchResponse, StationInterval, StopPoint, Timetable, TimetableResponse, TimetableRoute,
};
