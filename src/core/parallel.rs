use std::io;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::parse::{RawRow, is_identity_column, read_raw_rows};
use crate::error::{DashError, DashResult};

const YEAR_COLUMN: &str = "year";

/// One polyline of the parallel-coordinates explorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaRow {
    pub format: String,
    pub year: i32,
    pub values: Vec<f64>,
}

/// Wide table keyed by format and year with one numeric column per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParaTable {
    dimensions: Vec<String>,
    rows: Vec<ParaRow>,
}

impl ParaTable {
    pub fn new(dimensions: Vec<String>, rows: Vec<ParaRow>) -> DashResult<Self> {
        if let Some(row) = rows.iter().find(|row| row.values.len() != dimensions.len()) {
            return Err(DashError::InvalidData(format!(
                "parallel row `{}`/{} has {} values for {} dimensions",
                row.format,
                row.year,
                row.values.len(),
                dimensions.len()
            )));
        }
        Ok(Self { dimensions, rows })
    }

    /// Builds the table from raw rows; every column except format, medium and
    /// year is a numeric dimension.
    ///
    /// Rows with a blank format, a bad year or any non-numeric metric cell are
    /// dropped, matching the sales loader policy.
    #[must_use]
    pub fn from_raw_rows(raw: &[RawRow]) -> Self {
        let dimensions: Vec<String> = raw
            .first()
            .map(|row| {
                row.cells()
                    .map(|(key, _)| key)
                    .filter(|key| *key != YEAR_COLUMN && !is_identity_column(key))
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let rows: Vec<ParaRow> = raw
            .iter()
            .filter_map(|row| parse_para_row(row, &dimensions))
            .collect();
        debug!(
            dimensions = dimensions.len(),
            rows = rows.len(),
            dropped = raw.len() - rows.len(),
            "parsed parallel-coordinates table"
        );

        Self { dimensions, rows }
    }

    pub fn from_csv<R: io::Read>(reader: R) -> DashResult<Self> {
        let raw = read_raw_rows(reader)?;
        Ok(Self::from_raw_rows(&raw))
    }

    #[must_use]
    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    #[must_use]
    pub fn rows(&self) -> &[ParaRow] {
        &self.rows
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_para_row(row: &RawRow, dimensions: &[String]) -> Option<ParaRow> {
    let format = row.format()?.to_owned();
    let year = row.get(YEAR_COLUMN)?.trim().parse::<i32>().ok()?;
    let values = dimensions
        .iter()
        .map(|dimension| {
            row.get(dimension)?
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
        })
        .collect::<Option<Vec<f64>>>()?;
    Some(ParaRow {
        format,
        year,
        values,
    })
}
