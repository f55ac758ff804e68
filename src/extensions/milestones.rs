use std::io;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::parse::read_raw_rows;
use crate::core::{LinearScale, YearRange};
use crate::error::{DashError, DashResult};

/// Dated historical annotation shown on the timeline and in the guide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub year: i32,
    pub description: String,
    pub image_ref: String,
}

impl Milestone {
    #[must_use]
    pub fn new(year: i32, description: impl Into<String>) -> Self {
        Self {
            year,
            description: description.into(),
            image_ref: String::new(),
        }
    }

    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }
}

/// Reads the milestones table (`year`, `milestone`, `image` columns).
///
/// Rows with a non-integer year or a blank description are skipped.
pub fn read_milestones_csv<R: io::Read>(reader: R) -> DashResult<Vec<Milestone>> {
    let rows = read_raw_rows(reader)?;
    let milestones: Vec<Milestone> = rows
        .iter()
        .filter_map(|row| {
            let year = row.get("year")?.parse::<i32>().ok()?;
            let description = row
                .get("milestone")
                .or_else(|| row.get("description"))
                .filter(|text| !text.is_empty())?;
            let image = row.get("image").or_else(|| row.get("imageRef")).unwrap_or("");
            Some(Milestone::new(year, description).with_image(image))
        })
        .collect();
    debug!(
        rows = rows.len(),
        milestones = milestones.len(),
        "parsed milestones"
    );
    Ok(milestones)
}

/// Milestone marker in year space for one frame of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneMarker {
    pub year: i32,
    /// Year the marker is drawn at; differs from `year` when clamped.
    pub anchor_year: i32,
    pub selected: bool,
}

/// Anchors milestones inside `domain`, clamping out-of-domain years to the
/// nearest bound instead of dropping them.
#[must_use]
pub fn mark_milestones(
    milestones: &[Milestone],
    domain: YearRange,
    active_year: Option<i32>,
) -> Vec<MilestoneMarker> {
    milestones
        .iter()
        .map(|milestone| MilestoneMarker {
            year: milestone.year,
            anchor_year: milestone.year.clamp(domain.start(), domain.end()),
            selected: active_year == Some(milestone.year),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MilestonePlacementConfig {
    pub marker_radius_px: f64,
    pub min_horizontal_gap_px: f64,
}

impl Default for MilestonePlacementConfig {
    fn default() -> Self {
        Self {
            marker_radius_px: 5.0,
            min_horizontal_gap_px: 2.0,
        }
    }
}

impl MilestonePlacementConfig {
    fn validate(self) -> DashResult<Self> {
        for (value, name) in [
            (self.marker_radius_px, "marker_radius_px"),
            (self.min_horizontal_gap_px, "min_horizontal_gap_px"),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DashError::InvalidData(format!(
                    "milestone config `{name}` must be finite and >= 0"
                )));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedMilestone {
    pub year: i32,
    pub x: f64,
    pub lane: usize,
    pub selected: bool,
}

/// Projects markers through a year → pixel scale and stacks colliding markers
/// into lanes.
///
/// Placement order is stable by x, then year, then input order.
pub fn place_milestones(
    markers: &[MilestoneMarker],
    year_scale: LinearScale,
    config: MilestonePlacementConfig,
) -> DashResult<Vec<PlacedMilestone>> {
    let config = config.validate()?;

    let mut prepared = Vec::with_capacity(markers.len());
    for (index, marker) in markers.iter().enumerate() {
        let x = year_scale.map(f64::from(marker.anchor_year))?;
        prepared.push((index, marker, x));
    }
    prepared.sort_by(|a, b| {
        OrderedFloat(a.2)
            .cmp(&OrderedFloat(b.2))
            .then_with(|| a.1.year.cmp(&b.1.year))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut lane_last_right = Vec::<f64>::new();
    let placed = prepared
        .into_iter()
        .map(|(_, marker, x)| {
            let lane = allocate_lane(
                &mut lane_last_right,
                x - config.marker_radius_px,
                x + config.marker_radius_px,
                config.min_horizontal_gap_px,
            );
            PlacedMilestone {
                year: marker.year,
                x,
                lane,
                selected: marker.selected,
            }
        })
        .collect();
    Ok(placed)
}

fn allocate_lane(last_right: &mut Vec<f64>, left: f64, right: f64, min_gap: f64) -> usize {
    for (lane, lane_last_right) in last_right.iter_mut().enumerate() {
        if left >= *lane_last_right + min_gap {
            *lane_last_right = right;
            return lane;
        }
    }
    last_right.push(right);
    last_right.len() - 1
}
