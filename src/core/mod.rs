pub mod color;
pub mod dataset;
pub mod derive;
pub mod parallel;
pub mod parse;
pub mod scale;
pub mod types;

pub use color::{CATEGORY20, Color, ColorMap};
pub use dataset::{Dataset, MetricKind, MetricSeries, SalesTables};
pub use derive::{PAID_SUBSCRIPTIONS_FORMAT, derive_prices_data, derive_value_change_data};
pub use parallel::{ParaRow, ParaTable};
pub use parse::{RawRow, SOURCE_VALUE_SCALE, parse_csv, parse_rows, read_raw_rows};
pub use scale::{ExponentSlider, LinearScale, MAX_EXPONENT, MIN_EXPONENT, PowerScale};
pub use types::{DerivedRecord, Medium, SalesRecord, YearRange};
