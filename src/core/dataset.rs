use std::io;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::derive::{derive_prices_data, derive_value_change_data};
use crate::core::parse::{RawRow, parse_csv, parse_rows};
use crate::core::{ColorMap, DerivedRecord, SalesRecord, YearRange};
use crate::error::{DashError, DashResult};

/// The five metric series a dashboard can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    Units,
    Dollars,
    DollarsInflated,
    PricePerUnit,
    PricePerUnitInflated,
}

impl MetricKind {
    pub const ALL: [Self; 5] = [
        Self::Units,
        Self::Dollars,
        Self::DollarsInflated,
        Self::PricePerUnit,
        Self::PricePerUnitInflated,
    ];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Units => "Units",
            Self::Dollars => "Dollars",
            Self::DollarsInflated => "Dollars (inflated)",
            Self::PricePerUnit => "Price Per Unit",
            Self::PricePerUnitInflated => "Price Per Unit (inflated)",
        }
    }

    #[must_use]
    pub fn from_display_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.display_name() == name)
    }
}

/// Named, ordered metric series shared read-only between views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    name: String,
    records: Vec<DerivedRecord>,
}

impl MetricSeries {
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<DerivedRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn records(&self) -> &[DerivedRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest range covering every record year, `None` for an empty series.
    #[must_use]
    pub fn year_domain(&self) -> Option<YearRange> {
        let start = self.records.iter().map(|r| r.year).min()?;
        let end = self.records.iter().map(|r| r.year).max()?;
        YearRange::new(start, end).ok()
    }
}

/// Parsed base tables plus the color map built over their formats.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTables {
    pub units: Vec<SalesRecord>,
    pub dollars: Vec<SalesRecord>,
    pub dollars_inflated: Vec<SalesRecord>,
    pub color_map: ColorMap,
}

impl SalesTables {
    /// Bundles parsed series; colors are assigned over the units formats.
    #[must_use]
    pub fn from_records(
        units: Vec<SalesRecord>,
        dollars: Vec<SalesRecord>,
        dollars_inflated: Vec<SalesRecord>,
    ) -> Self {
        let color_map = ColorMap::from_formats(units.iter().map(|r| r.format.as_str()));
        Self {
            units,
            dollars,
            dollars_inflated,
            color_map,
        }
    }

    #[must_use]
    pub fn from_raw(units: &[RawRow], dollars: &[RawRow], dollars_inflated: &[RawRow]) -> Self {
        Self::from_records(
            parse_rows(units),
            parse_rows(dollars),
            parse_rows(dollars_inflated),
        )
    }

    pub fn from_csv<U, D, I>(units: U, dollars: D, dollars_inflated: I) -> DashResult<Self>
    where
        U: io::Read,
        D: io::Read,
        I: io::Read,
    {
        Ok(Self::from_records(
            parse_csv(units)?,
            parse_csv(dollars)?,
            parse_csv(dollars_inflated)?,
        ))
    }
}

/// All metric series keyed by kind, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    series: IndexMap<MetricKind, Rc<MetricSeries>>,
}

impl Dataset {
    /// Derives the five display series from the base tables.
    #[must_use]
    pub fn from_tables(tables: &SalesTables) -> Self {
        let units: Vec<DerivedRecord> = tables.units.iter().map(DerivedRecord::from).collect();
        let dollars: Vec<DerivedRecord> = tables.dollars.iter().map(DerivedRecord::from).collect();
        let inflated: Vec<DerivedRecord> = tables
            .dollars_inflated
            .iter()
            .map(DerivedRecord::from)
            .collect();

        let derived = derive_all(&units, &dollars, &inflated);
        let series: IndexMap<_, _> = MetricKind::ALL
            .into_iter()
            .zip(derived)
            .map(|(kind, records)| {
                (
                    kind,
                    Rc::new(MetricSeries::new(kind.display_name(), records)),
                )
            })
            .collect();

        debug!(
            units = series[&MetricKind::Units].len(),
            prices = series[&MetricKind::PricePerUnit].len(),
            "derived metric series"
        );
        Self { series }
    }

    #[must_use]
    pub fn get(&self, kind: MetricKind) -> Option<&Rc<MetricSeries>> {
        self.series.get(&kind)
    }

    pub fn require(&self, kind: MetricKind) -> DashResult<Rc<MetricSeries>> {
        self.get(kind)
            .cloned()
            .ok_or_else(|| DashError::UnknownMetric(kind.display_name().to_owned()))
    }

    /// Looks a series up by its display name.
    pub fn by_name(&self, name: &str) -> DashResult<Rc<MetricSeries>> {
        self.series
            .values()
            .find(|series| series.name() == name)
            .cloned()
            .ok_or_else(|| DashError::UnknownMetric(name.to_owned()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (MetricKind, &Rc<MetricSeries>)> {
        self.series.iter().map(|(kind, series)| (*kind, series))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.series.values().map(|series| series.name()).collect()
    }
}

#[cfg(not(feature = "parallel-derive"))]
fn derive_all(
    units: &[DerivedRecord],
    dollars: &[DerivedRecord],
    inflated: &[DerivedRecord],
) -> [Vec<DerivedRecord>; 5] {
    [
        derive_value_change_data(units),
        derive_value_change_data(dollars),
        derive_value_change_data(inflated),
        derive_value_change_data(&derive_prices_data(units, dollars)),
        derive_value_change_data(&derive_prices_data(units, inflated)),
    ]
}

#[cfg(feature = "parallel-derive")]
fn derive_all(
    units: &[DerivedRecord],
    dollars: &[DerivedRecord],
    inflated: &[DerivedRecord],
) -> [Vec<DerivedRecord>; 5] {
    let ((units_out, dollars_out), (inflated_out, (prices, prices_inflated))) = rayon::join(
        || {
            rayon::join(
                || derive_value_change_data(units),
                || derive_value_change_data(dollars),
            )
        },
        || {
            rayon::join(
                || derive_value_change_data(inflated),
                || {
                    rayon::join(
                        || derive_value_change_data(&derive_prices_data(units, dollars)),
                        || derive_value_change_data(&derive_prices_data(units, inflated)),
                    )
                },
            )
        },
    );
    [
        units_out,
        dollars_out,
        inflated_out,
        prices,
        prices_inflated,
    ]
}
