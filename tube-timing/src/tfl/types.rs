//! TfL Unified API response DTOs.
//!
//! These types map directly to the JSON the API returns. Fields are
//! `Option` almost everywhere because TfL omits rather than nulls, and
//! timetable hours and minutes arrive as strings or numbers depending
//! on the endpoint.

use serde::{Deserialize, Serialize};

/// Response from `/StopPoint/Search/{query}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: Option<String>,
    pub total: Option<u32>,
    pub matches: Option<Vec<SearchMatch>>,
}

/// One stop point in a search result.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    /// NaPTAN id, e.g. `940GZZLUTAW`.
    pub id: String,
    pub name: String,
    pub modes: Option<Vec<String>>,
}

/// Response from `/StopPoint/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopPoint {
    pub naptan_id: Option<String>,
    pub id: Option<String>,
    pub common_name: Option<String>,
    pub lines: Option<Vec<Identifier>>,
}

/// A named reference to another entity (usually a line).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub id: String,
    pub name: Option<String>,
}

/// One element of `/StopPoint/{id}/Arrivals`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub line_id: Option<String>,
    pub line_name: Option<String>,

    /// E.g. `"Northbound - Platform 1"`.
    pub platform_name: Option<String>,

    /// `"inbound"` or `"outbound"`. Often missing.
    pub direction: Option<String>,

    /// E.g. `"High Barnet Underground Station"`.
    pub destination_name: Option<String>,

    /// Free text, e.g. `"Edgware via CX"`.
    pub towards: Option<String>,

    /// ISO 8601 instant.
    pub expected_arrival: Option<String>,

    /// Seconds until arrival, relative to when the prediction was made.
    pub time_to_station: Option<i64>,
}

/// Response from `/Line/{line}/Timetable/{id}` and `/StopPoint/{id}/Timetable`.
///
/// The station-level endpoint may wrap several line timetables in
/// `timetables`; each element has the same shape as the per-line response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableResponse {
    pub line_id: Option<String>,
    pub line_name: Option<String>,
    pub direction: Option<String>,
    pub stops: Option<Vec<TimetableStop>>,
    pub timetable: Option<Timetable>,
    pub timetables: Option<Vec<TimetableResponse>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableStop {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timetable {
    pub departure_stop_id: Option<String>,
    pub routes: Option<Vec<TimetableRoute>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRoute {
    pub name: Option<String>,
    pub station_intervals: Option<Vec<StationInterval>>,
    pub schedules: Option<Vec<Schedule>>,
}

/// The stops one journey variant calls at after the departure stop.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StationInterval {
    pub id: Option<LenientNumber>,
    pub intervals: Option<Vec<Interval>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub stop_id: Option<String>,
    pub time_to_arrival: Option<f64>,
}

/// A named timetable such as `"Monday - Friday"` or `"Saturday"`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub name: Option<String>,
    pub known_journeys: Option<Vec<KnownJourney>>,
    pub periods: Option<Vec<Period>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnownJourney {
    pub hour: LenientNumber,
    pub minute: LenientNumber,
    pub interval_id: Option<LenientNumber>,
}

/// A span of the day served at a regular frequency.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_time: Option<ClockValue>,
    pub to_time: Option<ClockValue>,
    pub frequency: Option<Frequency>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockValue {
    pub hour: LenientNumber,
    pub minute: LenientNumber,
}

/// Minutes between trains: a plain number, or TfL's range object.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Frequency {
    Minutes(f64),
    #[serde(rename_all = "camelCase")]
    Range {
        lowest_frequency: Option<f64>,
        highest_frequency: Option<f64>,
    },
}

impl Frequency {
    /// The headway to project with, in minutes. For a range the longer
    /// gap is used so a period never shows more trains than run.
    pub fn headway_minutes(&self) -> Option<f64> {
        let minutes = match self {
            Frequency::Minutes(m) => Some(*m),
            Frequency::Range {
                lowest_frequency,
                highest_frequency,
            } => match (lowest_frequency, highest_frequency) {
                (Some(a), Some(b)) => Some(a.max(*b)),
                (Some(a), None) | (None, Some(a)) => Some(*a),
                (None, None) => None,
            },
        };
        minutes.filter(|m| m.is_finite() && *m > 0.0)
    }
}

/// A number TfL sometimes sends as a JSON string (`"05"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LenientNumber {
    Number(u32),
    Text(String),
}

impl LenientNumber {
    pub fn value(&self) -> Option<u32> {
        match self {
            LenientNumber::Number(n) => Some(*n),
            LenientNumber::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Lookup key for matching interval ids across the response.
    pub fn key(&self) -> String {
        match self {
            LenientNumber::Number(n) => n.to_string(),
            LenientNumber::Text(s) => s.trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_search() {
        let json = r#"{
            "query": "totteridge",
            "total": 1,
            "matches": [
                {"id": "940GZZLUTAW", "name": "Totteridge & Whetstone Underground Station", "modes": ["tube"]}
            ]
        }"#;
        let response: SearchResponse = serde_json::from_str(json).unwrap();
        let matches = response.matches.unwrap();
        assert_eq!(matches[0].id, "940GZZLUTAW");
        assert_eq!(matches[0].modes.as_deref(), Some(&["tube".to_string()][..]));
    }

    #[test]
    fn deserialize_prediction_with_missing_fields() {
        let json = r#"{
            "lineId": "northern",
            "platformName": "Northbound - Platform 1",
            "destinationName": "High Barnet Underground Station",
            "timeToStation": 180
        }"#;
        let p: Prediction = serde_json::from_str(json).unwrap();
        assert_eq!(p.line_id.as_deref(), Some("northern"));
        assert!(p.direction.is_none());
        assert!(p.expected_arrival.is_none());
        assert_eq!(p.time_to_station, Some(180));
    }

    #[test]
    fn deserialize_timetable() {
        let json = r#"{
            "lineId": "northern",
            "direction": "outbound",
            "stops": [{"id": "940GZZLUHBT", "name": "High Barnet Underground Station"}],
            "timetable": {
                "departureStopId": "940GZZLUTAW",
                "routes": [{
                    "stationIntervals": [
                        {"id": "0", "intervals": [{"stopId": "940GZZLUHBT", "timeToArrival": 3.0}]}
                    ],
                    "schedules": [{
                        "name": "Saturday",
                        "knownJourneys": [{"hour": "19", "minute": "12", "intervalId": 0}],
                        "periods": [{
                            "type": "Normal",
                            "fromTime": {"hour": 5, "minute": 30},
                            "toTime": {"hour": "24", "minute": "30"},
                            "frequency": {"lowestFrequency": 4.0, "highestFrequency": 8.0}
                        }]
                    }]
                }]
            }
        }"#;
        let response: TimetableResponse = serde_json::from_str(json).unwrap();
        let route = &response.timetable.unwrap().routes.unwrap()[0];
        let schedule = &route.schedules.as_ref().unwrap()[0];
        let journey = &schedule.known_journeys.as_ref().unwrap()[0];

        assert_eq!(journey.hour.value(), Some(19));
        assert_eq!(journey.interval_id.as_ref().map(LenientNumber::key).as_deref(), Some("0"));

        let period = &schedule.periods.as_ref().unwrap()[0];
        assert_eq!(period.to_time.as_ref().unwrap().hour.value(), Some(24));
        assert_eq!(
            period.frequency.as_ref().and_then(Frequency::headway_minutes),
            Some(8.0)
        );
    }

    #[test]
    fn frequency_forms() {
        let plain: Frequency = serde_json::from_str("5").unwrap();
        assert_eq!(plain.headway_minutes(), Some(5.0));

        let partial: Frequency = serde_json::from_str(r#"{"lowestFrequency": 3}"#).unwrap();
        assert_eq!(partial.headway_minutes(), Some(3.0));

        let zero: Frequency = serde_json::from_str("0").unwrap();
        assert_eq!(zero.headway_minutes(), None);
    }

    #[test]
    fn lenient_number_text() {
        let n: LenientNumber = serde_json::from_str(r#"" 07 ""#).unwrap();
        assert_eq!(n.value(), Some(7));
        assert_eq!(n.key(), "07");
    }
}
