use std::io;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Medium, SalesRecord};
use crate::error::DashResult;

/// Source tables store sales figures in millions.
pub const SOURCE_VALUE_SCALE: f64 = 1_000_000.0;

const FORMAT_COLUMNS: [&str; 2] = ["format", "formatName"];
const MEDIUM_COLUMNS: [&str; 2] = ["medium", "formatType"];
const YEAR_COLUMNS: std::ops::RangeInclusive<i32> = 1000..=9999;

/// One untyped input row: header name to raw cell text, in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRow {
    cells: IndexMap<String, String>,
}

impl RawRow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_cell(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.cells.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Returns the trimmed format name when present and non-empty.
    #[must_use]
    pub fn format(&self) -> Option<&str> {
        self.first_of(&FORMAT_COLUMNS)
            .map(str::trim)
            .filter(|format| !format.is_empty())
    }

    #[must_use]
    pub fn medium(&self) -> Option<Medium> {
        self.first_of(&MEDIUM_COLUMNS).and_then(Medium::parse)
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Parses wide sales rows into one record per non-zero year cell.
///
/// Lossy by contract: rows without a format or a medium are dropped,
/// and blank, zero, negative or non-numeric year cells produce no record.
/// Nothing here is reported as an error.
#[must_use]
pub fn parse_rows(rows: &[RawRow]) -> Vec<SalesRecord> {
    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    let mut skipped_cells = 0usize;

    for row in rows {
        let (Some(format), Some(medium)) = (row.format(), row.medium()) else {
            skipped_rows += 1;
            continue;
        };

        for (key, cell) in row.cells() {
            let Some(year) = parse_year_key(key) else {
                continue;
            };
            match parse_sales_cell(cell) {
                Some(value) => records.push(SalesRecord::new(
                    format,
                    medium,
                    year,
                    value * SOURCE_VALUE_SCALE,
                )),
                None => skipped_cells += 1,
            }
        }
    }

    debug!(
        rows = rows.len(),
        records = records.len(),
        skipped_rows,
        skipped_cells,
        "parsed sales rows"
    );
    records
}

/// Reads a headered CSV table into raw rows, trimming every cell.
pub fn read_raw_rows<R: io::Read>(reader: R) -> DashResult<Vec<RawRow>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut rows: Vec<RawRow> = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(headers.iter().zip(record.iter()).collect());
    }
    Ok(rows)
}

/// Reads and parses a sales CSV table in one step.
pub fn parse_csv<R: io::Read>(reader: R) -> DashResult<Vec<SalesRecord>> {
    let rows = read_raw_rows(reader)?;
    Ok(parse_rows(&rows))
}

/// True for the descriptive columns every table shares (format and medium).
pub(crate) fn is_identity_column(key: &str) -> bool {
    FORMAT_COLUMNS.contains(&key) || MEDIUM_COLUMNS.contains(&key)
}

/// Year columns are four-digit calendar years; other headers are ignored.
fn parse_year_key(key: &str) -> Option<i32> {
    key.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| YEAR_COLUMNS.contains(year))
}

fn parse_sales_cell(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value > 0.0)
}
