//! Domain types for the departure board.
//!
//! This module contains the core model types shared by the provider,
//! the merger and the formatter. Types validate their invariants at
//! construction time, so code that receives them can trust them.

mod departure;
mod direction;
mod error;
mod pattern;
mod station;
mod time;
mod topology;

pub use departure::{Departure, LiveArrival, ScheduledDeparture, Source};
pub use direction::{Bound, Compass, DirectionFilter, InvalidDirection};
pub use error::{CoreError, FilterError, NoStationFound};
pub use pattern::{ServiceDays, TimetablePattern, Timing};
pub use station::{InvalidLineId, LineId, Station, StationId};
pub use time::{ClockTime, InvalidWindowFormat, TimeWindow, build_window, parse_window};
pub use topology::{CompassMap, LineTopology};
