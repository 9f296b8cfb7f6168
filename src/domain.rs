//! Core record types shared by the parser, the pipeline and the analyzers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// External identifier of a stop as understood by the board endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How the operator produced a departure's real-time estimate (`dProgType`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgType {
    /// Forecast confirmed by the operator.
    Prognosed,
    /// Any other marker (`CALCULATED`, `REPORTED`, ...), kept verbatim.
    Other(String),
}

impl ProgType {
    pub fn as_str(&self) -> &str {
        match self {
            ProgType::Prognosed => "PROGNOSED",
            ProgType::Other(s) => s,
        }
    }

    pub fn is_prognosed(&self) -> bool {
        matches!(self, ProgType::Prognosed)
    }
}

impl From<&str> for ProgType {
    fn from(raw: &str) -> Self {
        match raw {
            "PROGNOSED" => ProgType::Prognosed,
            other => ProgType::Other(other.to_string()),
        }
    }
}

impl Serialize for ProgType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One departure of one journey from one stop, as seen at `query_time`.
///
/// Column names follow the departures CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartureRecord {
    pub stop: String,
    pub line: String,
    pub direction: String,
    pub departure_real: Option<DateTime<Utc>>,
    pub departure_scheduled: Option<DateTime<Utc>>,
    pub query_time: DateTime<Utc>,
    #[serde(rename = "departure_prog_type")]
    pub prog_type: Option<ProgType>,
    #[serde(rename = "delay")]
    delay_minutes: Option<f64>,
}

impl DepartureRecord {
    /// Builds a record, deriving the delay from the two departure instants.
    pub fn new(
        stop: String,
        line: String,
        direction: String,
        departure_real: Option<DateTime<Utc>>,
        departure_scheduled: Option<DateTime<Utc>>,
        query_time: DateTime<Utc>,
        prog_type: Option<ProgType>,
    ) -> Self {
        let delay_minutes = match (departure_real, departure_scheduled) {
            (Some(real), Some(scheduled)) => {
                Some((real - scheduled).num_seconds() as f64 / 60.0)
            }
            _ => None,
        };

        Self {
            stop,
            line,
            direction,
            departure_real,
            departure_scheduled,
            query_time,
            prog_type,
            delay_minutes,
        }
    }

    /// Real minus scheduled departure in minutes, present iff both instants are.
    pub fn delay_minutes(&self) -> Option<f64> {
        self.delay_minutes
    }

    pub fn is_prognosed(&self) -> bool {
        self.prog_type.as_ref().is_some_and(ProgType::is_prognosed)
    }
}

/// Departures of a single station board, in journey order.
pub type DepartureTable = Vec<DepartureRecord>;
