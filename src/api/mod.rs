mod dashboard;
mod dashboard_config;
mod dispatch;
mod event_bus;
mod events;
mod selection;
mod snapshot;
mod view_registry;

pub use dashboard::Dashboard;
pub use dashboard_config::DashboardConfig;
pub use dispatch::DispatchReport;
pub use event_bus::{EventBus, SubscriptionId};
pub use events::{DashEvent, EventInterests, EventKind};
pub use selection::{FilterScope, RecordFilter, SelectionState, center_on_milestone};
pub use snapshot::{
    DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1, DashboardSnapshot, DashboardSnapshotJsonContractV1,
};
