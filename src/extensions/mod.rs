//! Annotation overlays that sit on top of the sales timeline.

pub mod milestones;

pub use milestones::{
    Milestone, MilestoneMarker, MilestonePlacementConfig, PlacedMilestone, mark_milestones,
    place_milestones, read_milestones_csv,
};
