//! Departure merger.
//!
//! Combines live predictions and timetable patterns into one ordered
//! list of departures for a time window:
//!
//! 1. project timetable patterns onto concrete instants in the window
//! 2. drop scheduled departures a live prediction already covers
//! 3. apply line, direction and destination filters
//! 4. order by instant

mod config;
mod filter;
mod merge;
mod project;

pub use config::MergeConfig;
pub use filter::Filter;
pub use merge::{Merger, merge, order_departures};
pub use project::project;
