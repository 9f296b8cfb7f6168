//! Concurrent fetch-and-parse of many station boards.
//!
//! Every station gets its own task up front; a semaphore caps how many of
//! them are inside a board request at once. Each task parses its own board
//! and hands the table back through its join handle, so nothing is shared
//! mutably while the batch runs.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{Instrument, debug, error, info, warn};

use crate::analyzers::aggregate::AggregatedTable;
use crate::domain::{DepartureTable, StationId};
use crate::parser::parse_board;
use crate::services::board_api::BoardApi;

/// Default cap on concurrently outstanding board requests.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Fetches and parses the boards of all `stations`, at most `concurrency`
/// requests in flight.
///
/// Stations that fail to fetch or have no departures contribute nothing.
/// Tables are merged in completion order.
#[tracing::instrument(skip(api, stations), fields(stations = stations.len()))]
pub async fn process_stations<A>(
    api: Arc<A>,
    stations: &[StationId],
    concurrency: usize,
) -> AggregatedTable
where
    A: BoardApi + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    for station in stations {
        let api = api.clone();
        let sem = semaphore.clone();
        let station = station.clone();
        let span = tracing::info_span!("station", ext_id = %station);

        tasks.spawn(
            async move { process_station(api.as_ref(), &station, &sem).await }.instrument(span),
        );
    }

    let mut aggregate = AggregatedTable::default();
    let mut boards = 0usize;
    let mut failed = 0usize;

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Some(table)) => {
                boards += 1;
                aggregate.push_table(table);
            }
            Ok(None) => failed += 1,
            Err(e) => {
                failed += 1;
                error!(error = %e, "Station task aborted");
            }
        }
    }

    info!(
        boards,
        without_data = failed,
        departures = aggregate.len(),
        "Finished processing stations"
    );
    aggregate
}

/// One unit of work: fetch under the admission gate, then parse inline.
async fn process_station<A>(api: &A, station: &StationId, gate: &Semaphore) -> Option<DepartureTable>
where
    A: BoardApi + ?Sized,
{
    let response = {
        let _permit = gate.acquire().await.ok()?;
        api.station_board(station).await
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Station board fetch failed");
            return None;
        }
    };

    let table = parse_board(&response, station);
    if table.is_none() {
        debug!("No departures on board");
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchError;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn board(lines: &[&str]) -> Value {
        let journeys: Vec<Value> = lines
            .iter()
            .map(|line| {
                json!({
                    "jid": format!("1|1|0|80|1#ZE#{line}#ZB#"),
                    "dirTxt": "Nord",
                    "date": "20240715",
                    "stbStop": { "dTimeR": "083100", "dTimeS": "083000", "dProgType": "PROGNOSED" }
                })
            })
            .collect();
        json!({ "svcResL": [{ "res": { "common": { "locL": [{ "name": "Stop" }] }, "jnyL": journeys } }] })
    }

    /// Serves canned boards and records how many requests overlap.
    #[derive(Default)]
    struct FakeBoards {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl BoardApi for FakeBoards {
        async fn station_board(&self, station: &StationId) -> Result<Value, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match station.as_str() {
                "fail" => Err(FetchError::Status { status: 500 }),
                "empty" => Ok(json!({ "svcResL": [{ "res": { "common": { "locL": [] } } }] })),
                "garbage" => Ok(json!({ "unexpected": true })),
                _ => Ok(board(&["1", "2"])),
            }
        }
    }

    fn ids(raw: &[&str]) -> Vec<StationId> {
        raw.iter().map(|s| StationId::new(*s)).collect()
    }

    #[tokio::test]
    async fn failures_and_empty_boards_contribute_nothing() {
        let api = Arc::new(FakeBoards::default());
        let aggregate =
            process_stations(api.clone(), &ids(&["ok", "empty", "fail", "garbage"]), 4).await;

        assert_eq!(aggregate.len(), 2);
        assert_eq!(api.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn no_successful_station_gives_empty_aggregate() {
        let api = Arc::new(FakeBoards::default());
        let aggregate = process_stations(api, &ids(&["fail", "empty"]), 2).await;
        assert!(aggregate.is_empty());
    }

    #[tokio::test]
    async fn no_stations_gives_empty_aggregate() {
        let aggregate = process_stations(Arc::new(FakeBoards::default()), &[], 5).await;
        assert!(aggregate.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrency_never_exceeds_ceiling() {
        let api = Arc::new(FakeBoards::default());
        let stations: Vec<StationId> = (0..60).map(|i| StationId::new(i.to_string())).collect();

        let aggregate = process_stations(api.clone(), &stations, 7).await;

        assert_eq!(api.calls.load(Ordering::SeqCst), 60);
        assert!(api.peak.load(Ordering::SeqCst) <= 7);
        assert_eq!(aggregate.len(), 120);
    }

    #[tokio::test]
    async fn zero_ceiling_still_makes_progress() {
        let api = Arc::new(FakeBoards::default());
        let aggregate = process_stations(api.clone(), &ids(&["a", "b"]), 0).await;
        assert_eq!(aggregate.len(), 4);
        assert_eq!(api.peak.load(Ordering::SeqCst), 1);
    }
}
