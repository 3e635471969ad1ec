//! The transit data source the CLI reads from.
//!
//! This abstraction allows the departure board to be driven by the live
//! TfL API or by fixture data.

use std::collections::BTreeSet;

use crate::domain::{
    CompassMap, LineId, LineTopology, LiveArrival, Station, StationId, TimetablePattern,
};

/// Source of stations, live predictions and timetables.
///
/// A failed fetch is an error, never an empty list.
#[allow(async_fn_in_trait)]
pub trait TransitProvider {
    type Error: std::error::Error;

    /// Stations matching `query`, most relevant first.
    async fn find_stations(&self, query: &str) -> Result<Vec<Station>, Self::Error>;

    /// Full details for one station, including the lines serving it.
    async fn station_details(&self, station: &StationId) -> Result<Station, Self::Error>;

    async fn fetch_live_arrivals(
        &self,
        station: &StationId,
    ) -> Result<Vec<LiveArrival>, Self::Error>;

    /// Timetable patterns departing `station`.
    ///
    /// With no `lines` the station-level timetable is used; otherwise each
    /// line is fetched in both directions.
    async fn fetch_timetable(
        &self,
        station: &StationId,
        lines: &BTreeSet<LineId>,
    ) -> Result<Vec<TimetablePattern>, Self::Error>;

    /// Which bound each compass direction means for `line` at `station`.
    ///
    /// `live` is the snapshot the board is built from. The default infers
    /// the mapping from its platform names without fetching anything.
    async fn line_topology(
        &self,
        _station: &StationId,
        line: &LineId,
        live: &[LiveArrival],
    ) -> Result<Option<CompassMap>, Self::Error> {
        Ok(LineTopology::infer(live).for_line(line).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bound, Compass};
    use chrono::TimeZone;
    use chrono_tz::Europe::London;
    use std::sync::Mutex;

    #[derive(Debug, thiserror::Error)]
    #[error("offline")]
    struct Offline;

    /// Provider serving a fixed board, counting arrival fetches.
    struct FixedProvider {
        live: Vec<LiveArrival>,
        fail: bool,
        arrival_calls: Mutex<usize>,
    }

    impl TransitProvider for FixedProvider {
        type Error = Offline;

        async fn find_stations(&self, _query: &str) -> Result<Vec<Station>, Offline> {
            Ok(vec![])
        }

        async fn station_details(&self, station: &StationId) -> Result<Station, Offline> {
            Ok(Station::new(station.as_str(), "Somewhere"))
        }

        async fn fetch_live_arrivals(&self, _station: &StationId) -> Result<Vec<LiveArrival>, Offline> {
            *self.arrival_calls.lock().unwrap() += 1;
            if self.fail {
                return Err(Offline);
            }
            Ok(self.live.clone())
        }

        async fn fetch_timetable(
            &self,
            _station: &StationId,
            _lines: &BTreeSet<LineId>,
        ) -> Result<Vec<TimetablePattern>, Offline> {
            Ok(vec![])
        }
    }

    fn arrival(line: &str, platform: &str, direction: Bound) -> LiveArrival {
        LiveArrival {
            line_id: LineId::parse(line).unwrap(),
            direction: Some(direction),
            destination_name: "Somewhere".into(),
            platform_name: platform.into(),
            expected_instant: London.with_ymd_and_hms(2026, 2, 7, 19, 0, 0).unwrap(),
            via: None,
        }
    }

    #[tokio::test]
    async fn default_topology_infers_from_live() {
        let provider = FixedProvider {
            live: vec![],
            fail: false,
            arrival_calls: Mutex::new(0),
        };
        let live = vec![
            arrival("northern", "Northbound - Platform 1", Bound::Outbound),
            arrival("northern", "Southbound - Platform 2", Bound::Inbound),
            arrival("jubilee", "Eastbound - Platform 3", Bound::Outbound),
        ];
        let station = StationId::new("940GZZLUTAW");

        let map = provider
            .line_topology(&station, &LineId::parse("northern").unwrap(), &live)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(map.get(&Compass::North), Some(&Bound::Outbound));
        assert_eq!(map.get(&Compass::South), Some(&Bound::Inbound));
        assert_eq!(map.get(&Compass::East), None);
    }

    #[tokio::test]
    async fn default_topology_unknown_line() {
        let provider = FixedProvider {
            live: vec![],
            fail: false,
            arrival_calls: Mutex::new(0),
        };
        let live = vec![arrival("northern", "Northbound - Platform 1", Bound::Outbound)];
        let topology = provider
            .line_topology(&StationId::new("x"), &LineId::parse("victoria").unwrap(), &live)
            .await
            .unwrap();
        assert!(topology.is_none());
    }

    #[tokio::test]
    async fn default_topology_uses_given_snapshot() {
        let provider = FixedProvider {
            live: vec![],
            fail: true,
            arrival_calls: Mutex::new(0),
        };
        let live = vec![arrival("northern", "Northbound - Platform 1", Bound::Outbound)];
        let map = provider
            .line_topology(&StationId::new("x"), &LineId::parse("northern").unwrap(), &live)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(map.get(&Compass::North), Some(&Bound::Outbound));
        assert_eq!(*provider.arrival_calls.lock().unwrap(), 0);
    }
}
