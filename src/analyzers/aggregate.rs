use crate::domain::{DepartureRecord, DepartureTable};

/// Departures of every station that returned a board, merged into one table.
///
/// Row order follows the order tables were merged in; no station grouping
/// survives the merge.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AggregatedTable {
    records: Vec<DepartureRecord>,
}

impl AggregatedTable {
    /// Concatenates the tables in the order given.
    pub fn from_tables<I>(tables: I) -> Self
    where
        I: IntoIterator<Item = DepartureTable>,
    {
        let mut aggregate = Self::default();
        for table in tables {
            aggregate.push_table(table);
        }
        aggregate
    }

    pub fn push_table(&mut self, table: DepartureTable) {
        self.records.extend(table);
    }

    pub fn records(&self) -> &[DepartureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// An empty aggregate means no station produced data.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
