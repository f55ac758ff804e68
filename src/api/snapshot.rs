use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};
use crate::render::Renderer;
use crate::views::{ViewId, ViewSnapshot};

use super::{Dashboard, SelectionState};

pub const DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable dashboard state used by regression tests and debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub selection: SelectionState,
    pub series: Vec<String>,
    pub views: Vec<ViewSnapshot>,
    pub subscriber_count: usize,
    pub pending_events: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: DashboardSnapshot,
}

impl DashboardSnapshot {
    #[must_use]
    pub fn view(&self, id: ViewId) -> Option<&ViewSnapshot> {
        self.views.iter().find(|view| view.id == id)
    }

    pub fn to_json_contract_v1_pretty(&self) -> DashResult<String> {
        let payload = DashboardSnapshotJsonContractV1 {
            schema_version: DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            DashError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts either a bare snapshot or a versioned v1 payload.
    pub fn from_json_compat_str(input: &str) -> DashResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<DashboardSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: DashboardSnapshotJsonContractV1 =
            serde_json::from_str(input).map_err(|e| {
                DashError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
            })?;
        if payload.schema_version != DASHBOARD_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(DashError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R: Renderer> Dashboard<R> {
    #[must_use]
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            selection: self.selection.clone(),
            series: self
                .dataset
                .names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
            views: self.views.iter().map(|view| view.snapshot()).collect(),
            subscriber_count: self.bus.subscriber_count(),
            pending_events: self.pending.len(),
        }
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> DashResult<String> {
        self.snapshot().to_json_contract_v1_pretty()
    }
}
