//! Derived metric series: price per unit and year-over-year change.
//!
//! Every function here is pure and keeps the iteration order of its primary
//! input. Lookups are linear scans, which is fine at the size of the source
//! tables (a few dozen formats over a few decades).

use crate::core::DerivedRecord;

/// Format whose dollar figure is an annual subscription fee.
pub const PAID_SUBSCRIPTIONS_FORMAT: &str = "Paid Subscriptions";

const MONTHS_PER_YEAR: f64 = 12.0;

/// Divides dollars by units for every (format, year) present in both series.
///
/// Units records without a dollar counterpart, or with a zero unit count,
/// produce no output. Paid subscriptions are reported as a monthly price.
///
/// Filtering commutes with this derivation only when the same filter is
/// applied to both inputs before the call.
#[must_use]
pub fn derive_prices_data(units: &[DerivedRecord], dollars: &[DerivedRecord]) -> Vec<DerivedRecord> {
    units
        .iter()
        .filter_map(|unit| {
            let dollar = dollars
                .iter()
                .find(|dollar| dollar.same_slot(&unit.format, unit.year))?;
            if unit.value == 0.0 {
                return None;
            }

            let mut price = dollar.value / unit.value;
            if unit.format == PAID_SUBSCRIPTIONS_FORMAT {
                price /= MONTHS_PER_YEAR;
            }
            if !price.is_finite() {
                return None;
            }

            let mut record =
                DerivedRecord::new(unit.format.clone(), unit.medium, unit.year, price);
            record.price_per_unit = Some(price);
            Some(record)
        })
        .collect()
}

/// Fills `value_change` and `value_change_norm` against the previous year of
/// the same format.
///
/// A missing previous year yields a change of zero; a missing or zero previous
/// value yields a normalized change of zero.
#[must_use]
pub fn derive_value_change_data(series: &[DerivedRecord]) -> Vec<DerivedRecord> {
    series
        .iter()
        .map(|record| {
            let prior = record.year.checked_sub(1).and_then(|previous| {
                series
                    .iter()
                    .find(|candidate| candidate.same_slot(&record.format, previous))
                    .map(|candidate| candidate.value)
            });

            let change = prior.map_or(0.0, |prior| record.value - prior);
            let change_norm = match prior {
                Some(prior) if prior != 0.0 => change / prior,
                _ => 0.0,
            };

            let mut derived = record.clone();
            derived.value_change = Some(change);
            derived.value_change_norm = Some(change_norm);
            derived
        })
        .collect()
}
