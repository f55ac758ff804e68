use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};
use crate::interaction::CoalescePolicy;

/// Public dashboard bootstrap configuration.
///
/// Serializable so hosts can persist and reload the setup; every field has a
/// default, so an empty JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub coalesce_policy: CoalescePolicy,
    #[serde(default = "default_max_cascade_events")]
    pub max_cascade_events: usize,
    #[serde(default = "default_slider_height_px")]
    pub slider_height_px: f64,
    #[serde(default = "default_milestone_image_dir")]
    pub milestone_image_dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            coalesce_policy: CoalescePolicy::default(),
            max_cascade_events: default_max_cascade_events(),
            slider_height_px: default_slider_height_px(),
            milestone_image_dir: default_milestone_image_dir(),
        }
    }
}

impl DashboardConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_coalesce_policy(mut self, policy: CoalescePolicy) -> Self {
        self.coalesce_policy = policy;
        self
    }

    #[must_use]
    pub fn with_max_cascade_events(mut self, limit: usize) -> Self {
        self.max_cascade_events = limit;
        self
    }

    #[must_use]
    pub fn with_slider_height_px(mut self, height: f64) -> Self {
        self.slider_height_px = height;
        self
    }

    #[must_use]
    pub fn with_milestone_image_dir(mut self, dir: impl Into<String>) -> Self {
        self.milestone_image_dir = dir.into();
        self
    }

    pub fn validate(&self) -> DashResult<()> {
        if self.max_cascade_events == 0 {
            return Err(DashError::InvalidData(
                "max_cascade_events must be > 0".to_owned(),
            ));
        }
        if !self.slider_height_px.is_finite() || self.slider_height_px <= 0.0 {
            return Err(DashError::InvalidData(
                "slider_height_px must be finite and > 0".to_owned(),
            ));
        }
        if let CoalescePolicy::MinInterval { seconds } = self.coalesce_policy {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DashError::InvalidData(
                    "coalesce interval must be finite and >= 0".to_owned(),
                ));
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> DashResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            DashError::InvalidData(format!("failed to serialize dashboard config: {e}"))
        })
    }

    /// Parses and validates a config.
    pub fn from_json_str(input: &str) -> DashResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            DashError::InvalidData(format!("failed to parse dashboard config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}

fn default_max_cascade_events() -> usize {
    64
}

fn default_slider_height_px() -> f64 {
    200.0
}

fn default_milestone_image_dir() -> String {
    "img".to_owned()
}
