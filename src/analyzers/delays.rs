use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::aggregate::AggregatedTable;
use crate::analyzers::utility::mean;

/// Grouping key of the delay summary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineDirection {
    pub line: String,
    pub direction: String,
}

/// One row of the delay CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayRow<'a> {
    pub line: &'a str,
    pub direction: &'a str,
    pub delay: f64,
    pub samples: usize,
}

/// Mean forecast delay per (line, direction), in minutes.
///
/// Only rows with a `PROGNOSED` marker and a known delay count. A group
/// with no such row is not present at all.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DelaySummary {
    groups: BTreeMap<LineDirection, Vec<f64>>,
}

impl DelaySummary {
    pub fn from_table(table: &AggregatedTable) -> Self {
        let mut groups: BTreeMap<LineDirection, Vec<f64>> = BTreeMap::new();

        for record in table.records().iter().filter(|r| r.is_prognosed()) {
            let Some(delay) = record.delay_minutes() else {
                continue;
            };
            groups
                .entry(LineDirection {
                    line: record.line.clone(),
                    direction: record.direction.clone(),
                })
                .or_default()
                .push(delay);
        }

        Self { groups }
    }

    /// Mean delay of one group, if it has any qualifying rows.
    pub fn get(&self, line: &str, direction: &str) -> Option<f64> {
        let key = LineDirection {
            line: line.to_string(),
            direction: direction.to_string(),
        };
        self.groups.get(&key).map(|delays| mean(delays))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Rows sorted by line, then direction.
    pub fn rows(&self) -> impl Iterator<Item = DelayRow<'_>> {
        self.groups.iter().map(|(key, delays)| DelayRow {
            line: &key.line,
            direction: &key.direction,
            delay: mean(delays),
            samples: delays.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DepartureRecord, ProgType};
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn scheduled() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, 6, 30, 0).unwrap()
    }

    fn row(line: &str, dir: &str, delay: Option<f64>, prog: Option<&str>) -> DepartureRecord {
        let real = delay.map(|d| scheduled() + Duration::seconds((d * 60.0) as i64));
        DepartureRecord::new(
            "Stop".into(),
            line.into(),
            dir.into(),
            real,
            Some(scheduled()),
            Utc::now(),
            prog.map(ProgType::from),
        )
    }

    fn aggregate(rows: Vec<DepartureRecord>) -> AggregatedTable {
        AggregatedTable::from_tables([rows])
    }

    #[test]
    fn mean_per_line_and_direction() {
        let summary = DelaySummary::from_table(&aggregate(vec![
            row("L1", "N", Some(2.0), Some("PROGNOSED")),
            row("L1", "N", Some(4.0), Some("PROGNOSED")),
            row("L2", "S", Some(1.0), Some("PROGNOSED")),
        ]));

        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get("L1", "N"), Some(3.0));
        assert_eq!(summary.get("L2", "S"), Some(1.0));
    }

    #[test]
    fn non_prognosed_and_missing_delays_are_ignored() {
        let summary = DelaySummary::from_table(&aggregate(vec![
            row("L1", "N", Some(2.0), Some("PROGNOSED")),
            row("L1", "N", Some(10.0), Some("CALCULATED")),
            row("L1", "N", None, Some("PROGNOSED")),
            row("L1", "N", Some(8.0), None),
        ]));
        assert_eq!(summary.get("L1", "N"), Some(2.0));
    }

    #[test]
    fn groups_without_qualifying_rows_are_absent() {
        let summary = DelaySummary::from_table(&aggregate(vec![
            row("L1", "N", Some(2.0), Some("PROGNOSED")),
            row("L3", "W", Some(5.0), Some("REPORTED")),
            row("L4", "E", None, Some("PROGNOSED")),
        ]));

        assert_eq!(summary.len(), 1);
        assert_eq!(summary.get("L3", "W"), None);
        assert_eq!(summary.get("L4", "E"), None);
    }

    #[test]
    fn same_line_other_direction_is_separate_group() {
        let summary = DelaySummary::from_table(&aggregate(vec![
            row("L1", "N", Some(2.0), Some("PROGNOSED")),
            row("L1", "S", Some(-1.0), Some("PROGNOSED")),
        ]));
        assert_eq!(summary.get("L1", "N"), Some(2.0));
        assert_eq!(summary.get("L1", "S"), Some(-1.0));
    }

    #[test]
    fn rows_are_sorted_with_sample_counts() {
        let summary = DelaySummary::from_table(&aggregate(vec![
            row("L2", "S", Some(1.0), Some("PROGNOSED")),
            row("L1", "N", Some(2.0), Some("PROGNOSED")),
            row("L1", "N", Some(4.0), Some("PROGNOSED")),
        ]));

        let rows: Vec<_> = summary.rows().collect();
        assert_eq!(rows[0].line, "L1");
        assert_eq!(rows[0].samples, 2);
        assert_eq!(rows[0].delay, 3.0);
        assert_eq!(rows[1].line, "L2");
        assert_eq!(rows[1].samples, 1);
    }

    #[test]
    fn empty_table_gives_empty_summary() {
        assert!(DelaySummary::from_table(&AggregatedTable::default()).is_empty());
    }
}
