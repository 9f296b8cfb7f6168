//! Station list input.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::Read;

use crate::domain::StationId;

#[derive(Debug, Deserialize)]
struct StationRow {
    #[serde(rename = "extId")]
    ext_id: String,
}

/// Reads station ids from the `extId` column of a CSV file.
///
/// Other columns are ignored. Blank ids are skipped.
pub fn load_station_ids(path: &str) -> Result<Vec<StationId>> {
    let file =
        std::fs::File::open(path).with_context(|| format!("failed to open station list '{path}'"))?;
    read_station_ids(file).with_context(|| format!("invalid station list '{path}'"))
}

/// Reads station ids from CSV data with an `extId` header.
pub fn read_station_ids<R: Read>(reader: R) -> Result<Vec<StationId>> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut ids = Vec::new();

    for result in rdr.deserialize() {
        let row: StationRow = result?;
        let id = row.ext_id.trim();
        if !id.is_empty() {
            ids.push(StationId::new(id));
        }
    }

    Ok(ids)
}
