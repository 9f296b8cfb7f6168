//! Traits for talking to a departure-board service.

use anyhow::Result;
use serde_json::Value;

use crate::domain::StationId;
use crate::fetch::FetchError;
use crate::parser::StationLocation;

/// Source of raw station boards.
#[async_trait::async_trait]
pub trait BoardApi: Send + Sync {
    /// Fetches the upcoming-departures board for one stop as untyped JSON.
    async fn station_board(&self, station: &StationId) -> Result<Value, FetchError>;
}

/// Parameters of a stop search by name.
#[derive(Debug, Clone)]
pub struct StationQuery {
    /// Name fragment; matched as a prefix by the service.
    pub name: String,
    /// Search radius in metres.
    pub dist: u32,
    /// Maximum number of matches returned.
    pub max_loc: u32,
}

/// Lookup of stops by name.
#[async_trait::async_trait]
pub trait StationSearchApi {
    async fn search_stations(&self, query: &StationQuery) -> Result<Vec<StationLocation>>;
}
