//! TfL departure board.
//!
//! Answers "what leaves my station in the next N minutes?" by merging
//! live arrival predictions with the working timetable, so the board
//! reaches past the few minutes live data covers.

pub mod aliases;
pub mod cli;
pub mod domain;
pub mod format;
pub mod merger;
pub mod provider;
pub mod stations;
pub mod tfl;
