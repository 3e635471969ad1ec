//! One-line rendering of a departure.

use chrono::DateTime;
use chrono_tz::Tz;

use crate::aliases::{AliasTable, compact_destination};
use crate::domain::Departure;

/// Renders departures relative to a reference instant.
///
/// Output looks like `High Barnet via CX 19:12 (in 3m) LIVE`.
pub struct Formatter<'a> {
    aliases: &'a AliasTable,
    reference: DateTime<Tz>,
}

impl<'a> Formatter<'a> {
    pub fn new(aliases: &'a AliasTable, reference: DateTime<Tz>) -> Self {
        Self { aliases, reference }
    }

    pub fn format(&self, departure: &Departure) -> String {
        let label = destination_label(
            self.aliases,
            departure.destination_name(),
            departure.first_via_stop(),
        );

        let local = departure
            .expected_instant()
            .with_timezone(&self.reference.timezone());
        let minutes = (departure.expected_instant() - self.reference)
            .num_minutes()
            .max(0);

        format!(
            "{label} {} (in {minutes}m) {}",
            local.format("%H:%M"),
            departure.source()
        )
    }
}

/// `"Edgware via CX"`: the destination and optional via stop, shortened
/// for display.
pub fn destination_label(aliases: &AliasTable, destination: &str, via: Option<&str>) -> String {
    let display_name = |name: &str| aliases.expand_for_display(&compact_destination(name));
    match via {
        Some(via) => format!("{} via {}", display_name(destination), display_name(via)),
        None => display_name(destination),
    }
}
