use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

use super::profile::HafasProfile;
use super::request::{self, DEFAULT_DURATION_MINUTES};
use crate::domain::StationId;
use crate::fetch::{BasicClient, BrowserHeaders, FetchError, HttpClient, post_json};
use crate::parser::{StationLocation, parse_locations};
use crate::services::board_api::{BoardApi, StationQuery, StationSearchApi};

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one planner deployment's `mgate` endpoint.
///
/// Safe to share between tasks: it only holds the connection pool and
/// immutable request settings.
pub struct HafasClient<C> {
    http: C,
    endpoint: Url,
    profile: HafasProfile,
    duration: u32,
}

impl HafasClient<BrowserHeaders<BasicClient>> {
    /// Opens a connection pool for `profile` with the given request deadline.
    pub fn new(profile: HafasProfile, timeout: Duration) -> Result<Self> {
        let basic = BasicClient::new(timeout).context("failed to build HTTP client")?;
        let http = BrowserHeaders::new(basic, &profile.origin, &profile.referer)
            .context("invalid origin or referer in profile")?;
        Self::with_http(http, profile)
    }
}

impl<C: HttpClient> HafasClient<C> {
    /// Wraps an existing transport.
    pub fn with_http(http: C, profile: HafasProfile) -> Result<Self> {
        let endpoint = profile
            .endpoint
            .parse()
            .with_context(|| format!("invalid endpoint URL '{}'", profile.endpoint))?;

        Ok(Self {
            http,
            endpoint,
            profile,
            duration: DEFAULT_DURATION_MINUTES,
        })
    }

    /// Sets the board lookahead window in minutes.
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }
}

#[async_trait]
impl<C: HttpClient> BoardApi for HafasClient<C> {
    async fn station_board(&self, station: &StationId) -> Result<Value, FetchError> {
        let body = request::station_board(&self.profile, station.as_str(), self.duration);
        post_json(&self.http, &self.endpoint, &body).await
    }
}

#[async_trait]
impl<C: HttpClient> StationSearchApi for HafasClient<C> {
    async fn search_stations(&self, query: &StationQuery) -> Result<Vec<StationLocation>> {
        let body = request::loc_match(&self.profile, &query.name, query.dist, query.max_loc);
        let response: Value = post_json(&self.http, &self.endpoint, &body)
            .await
            .with_context(|| format!("station search for '{}' failed", query.name))?;

        Ok(parse_locations(&response))
    }
}
