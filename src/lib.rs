//! sales-lens: linked-view dashboard core for historical music-sales data.
//!
//! The crate loads per-format sales tables, derives price and year-over-year
//! series, and keeps a set of linked views (overview timeline, detail lines,
//! ranking, parallel coordinates, milestone guide) in sync through one
//! coordinator-owned selection state. Drawing is delegated to a `Renderer`.

pub mod api;
pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod telemetry;
pub mod views;

pub use api::{Dashboard, DashboardConfig, DashEvent, SelectionState};
pub use error::{DashError, DashResult};
