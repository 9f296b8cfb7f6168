//! Flat CSV exports of departures, delay summaries and station searches.
//!
//! Files are overwritten and start with a UTF-8 byte-order mark so that
//! spreadsheet tools pick the right encoding for stop names.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::aggregate::AggregatedTable;
use crate::analyzers::delays::DelaySummary;
use crate::parser::StationLocation;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes `rows` as a CSV file at `path`, headers first. Returns the number
/// of data rows written.
pub fn write_csv<T, I>(path: &str, rows: I) -> Result<usize>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }

    let mut file = File::create(path).with_context(|| format!("failed to create '{path}'"))?;
    file.write_all(UTF8_BOM)
        .with_context(|| format!("failed to write '{path}'"))?;

    let mut writer = WriterBuilder::new().has_headers(true).from_writer(file);
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    debug!(path, rows = count, "CSV written");
    Ok(count)
}

/// Exports every departure row of the aggregate.
pub fn write_departures(path: &str, table: &AggregatedTable) -> Result<usize> {
    write_csv(path, table.records())
}

/// Exports the delay summary, one row per line and direction.
pub fn write_delays(path: &str, summary: &DelaySummary) -> Result<usize> {
    write_csv(path, summary.rows())
}

/// Exports station search results in the layout the station list reader accepts.
pub fn write_stations(path: &str, stations: &[StationLocation]) -> Result<usize> {
    write_csv(path, stations)
}

/// Logs the delay summary, one event per group.
pub fn print_summary(summary: &DelaySummary) {
    for row in summary.rows() {
        info!(
            line = row.line,
            direction = row.direction,
            delay_minutes = row.delay,
            samples = row.samples,
            "Mean delay"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DepartureRecord, ProgType};
    use crate::stations::read_station_ids;
    use chrono::{TimeZone, Utc};
    use std::fs;

    fn sample_table() -> AggregatedTable {
        let scheduled = Utc.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap();
        let real = Utc.with_ymd_and_hms(2024, 7, 15, 6, 33, 0).unwrap();
        AggregatedTable::from_tables([vec![
            DepartureRecord::new(
                "Leipzig, Hbf".into(),
                "16".into(),
                "Messegelände".into(),
                Some(real),
                Some(scheduled),
                scheduled,
                Some(ProgType::Prognosed),
            ),
            DepartureRecord::new(
                "Leipzig, Hbf".into(),
                "11".into(),
                "Schkeuditz".into(),
                None,
                Some(scheduled),
                scheduled,
                None,
            ),
        ]])
    }

    fn read_without_bom(path: &Path) -> String {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));
        String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap()
    }

    #[test]
    fn departures_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("departures.csv");

        let rows = write_departures(path.to_str().unwrap(), &sample_table()).unwrap();
        assert_eq!(rows, 2);

        let content = read_without_bom(&path);
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "stop,line,direction,departure_real,departure_scheduled,query_time,departure_prog_type,delay"
        );
        assert!(lines[1].contains("PROGNOSED"));
        assert!(lines[1].ends_with(",3.0"));
        // absent values are empty cells
        assert!(lines[2].ends_with(",,"));
    }

    #[test]
    fn delays_csv_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delays.csv");
        let summary = DelaySummary::from_table(&sample_table());

        let rows = write_delays(path.to_str().unwrap(), &summary).unwrap();
        assert_eq!(rows, 1);

        let content = read_without_bom(&path);
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, ["line,direction,delay,samples", "16,Messegelände,3.0,1"]);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("delays.csv");
        let path_str = path.to_str().unwrap();
        let summary = DelaySummary::from_table(&sample_table());

        write_delays(path_str, &summary).unwrap();
        write_delays(path_str, &summary).unwrap();

        let content = read_without_bom(&path);
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn stations_csv_reads_back_as_station_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("stations.csv");
        let stations = vec![StationLocation {
            name: "Leipzig, Henriettenstr.".into(),
            kind: "S".into(),
            ext_id: "12316".into(),
            x: 12.32458,
            y: 51.333737,
        }];

        write_stations(path.to_str().unwrap(), &stations).unwrap();

        let content = read_without_bom(&path);
        assert!(content.starts_with("name,type,extId,x,y\n"));
        let ids = read_station_ids(content.as_bytes()).unwrap();
        assert_eq!(ids[0].as_str(), "12316");
    }

    #[test]
    fn unwritable_path_is_named_in_error() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as a file
        let path = dir.path().to_str().unwrap();

        let err = write_delays(path, &DelaySummary::from_table(&sample_table())).unwrap_err();
        assert!(format!("{err:#}").contains(path));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_is_named_in_error() {
        // opens fine, every write fails with ENOSPC
        let err = write_delays("/dev/full", &DelaySummary::from_table(&sample_table())).unwrap_err();
        assert!(err.to_string().contains("failed to write '/dev/full'"));
    }

    #[test]
    fn print_summary_does_not_panic() {
        print_summary(&DelaySummary::from_table(&sample_table()));
    }
}
