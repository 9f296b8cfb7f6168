//! Parsers for raw board and location-search responses.
//!
//! Responses arrive as untyped JSON. The envelope is decoded leniently and
//! each journey is decoded on its own, so one odd journey never costs the
//! rest of the board.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::domain::{DepartureRecord, DepartureTable, ProgType, StationId};
use crate::time::{self, REGION_TZ};

const LINE_START: &str = "#ZE#";
const LINE_END: &str = "#ZB#";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "svcResL", default)]
    svc_res_l: Vec<ServiceResult>,
}

#[derive(Debug, Deserialize)]
struct ServiceResult {
    res: Option<Value>,
}

/// Pulls the first service result out of a raw response envelope.
fn first_result(response: &Value) -> Option<Value> {
    let envelope = Envelope::deserialize(response).ok()?;
    envelope.svc_res_l.into_iter().next()?.res
}

/// Extracts the line name embedded between `#ZE#` and `#ZB#` in a journey id.
pub fn line_from_jid(jid: &str) -> Option<&str> {
    let start = jid.find(LINE_START)? + LINE_START.len();
    let len = jid[start..].find(LINE_END)?;
    Some(&jid[start..start + len])
}

/// Turns one station board response into departure records.
///
/// Returns `None` when the response has no result envelope or no journey
/// list; both mean "no departures" rather than failure. `station` names the
/// stop when the board carries no location list.
pub fn parse_board(response: &Value, station: &StationId) -> Option<DepartureTable> {
    let query_time = Utc::now();
    let result = first_result(response)?;
    let journeys = result.get("jnyL")?.as_array()?;

    let stop = result
        .pointer("/common/locL/0/name")
        .and_then(Value::as_str)
        .map_or_else(|| station.to_string(), str::to_string);

    let table: DepartureTable = journeys
        .iter()
        .filter_map(|raw| parse_journey(raw, &stop, query_time))
        .collect();

    debug!(
        stop = %stop,
        journeys = journeys.len(),
        departures = table.len(),
        "Board parsed"
    );

    Some(table)
}

/// Builds one record from a raw journey.
///
/// Only the journey id decides whether the row survives; every other field
/// of the wrong type or missing reads as absent.
fn parse_journey(raw: &Value, stop: &str, query_time: DateTime<Utc>) -> Option<DepartureRecord> {
    let text = |pointer: &str| raw.pointer(pointer).and_then(Value::as_str);

    let Some(jid) = text("/jid") else {
        debug!("Dropping journey without id");
        return None;
    };

    let Some(line) = line_from_jid(jid) else {
        debug!(jid, "Dropping journey without line marker");
        return None;
    };

    let date = text("/date").and_then(time::parse_journey_date);
    let at = |pointer: &str| date.and_then(|d| time::normalize(d, text(pointer), REGION_TZ));

    Some(DepartureRecord::new(
        stop.to_string(),
        line.to_string(),
        text("/dirTxt").unwrap_or_default().to_string(),
        at("/stbStop/dTimeR"),
        at("/stbStop/dTimeS"),
        query_time,
        text("/stbStop/dProgType").map(ProgType::from),
    ))
}

/// A stop returned by a location search.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StationLocation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "extId")]
    pub ext_id: String,
    /// Longitude in decimal degrees.
    pub x: f64,
    /// Latitude in decimal degrees.
    pub y: f64,
}

#[derive(Debug, Deserialize)]
struct MatchResult {
    #[serde(rename = "match")]
    matched: LocationList,
}

#[derive(Debug, Deserialize)]
struct LocationList {
    #[serde(rename = "locL", default)]
    loc_l: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawLocation {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "extId")]
    ext_id: String,
    crd: Coordinate,
}

#[derive(Debug, Deserialize)]
struct Coordinate {
    x: i64,
    y: i64,
}

/// Turns a location-search response into stops.
///
/// Coordinates arrive as micro-degree integers. Entries missing a name,
/// external id or coordinate are skipped.
pub fn parse_locations(response: &Value) -> Vec<StationLocation> {
    let Some(list) = first_result(response)
        .and_then(|res| serde_json::from_value::<MatchResult>(res).ok())
    else {
        return Vec::new();
    };

    list.matched
        .loc_l
        .iter()
        .filter_map(|raw| RawLocation::deserialize(raw).ok())
        .map(|loc| StationLocation {
            name: loc.name,
            kind: loc.kind,
            ext_id: loc.ext_id,
            x: loc.crd.x as f64 / 1_000_000.0,
            y: loc.crd.y as f64 / 1_000_000.0,
        })
        .collect()
}
