//! Station lookup.
//!
//! Turns what the rider typed into one of the provider's stops.

mod resolver;

pub use resolver::{StationMatch, resolve_station};
