use serde::{Deserialize, Serialize};

use crate::core::{Color, YearRange};
use crate::error::{DashError, DashResult};
use crate::extensions::MilestoneMarker;
use crate::views::ViewId;

/// Visual weight of one format's marks under the current highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Emphasis {
    #[default]
    Normal,
    Highlighted,
    Faded,
}

impl Emphasis {
    #[must_use]
    pub fn for_key(highlight: Option<&str>, key: &str) -> Self {
        match highlight {
            None => Self::Normal,
            Some(highlight) if highlight == key => Self::Highlighted,
            Some(_) => Self::Faded,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameLine {
    pub format: String,
    pub color: Option<Color>,
    pub emphasis: Emphasis,
    pub points: Vec<YearValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameBar {
    pub key: String,
    pub value: f64,
    pub color: Option<Color>,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FramePolyline {
    pub format: String,
    pub year: i32,
    pub values: Vec<f64>,
    pub color: Option<Color>,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneCard {
    pub year: i32,
    pub description: String,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FrameContent {
    Area {
        points: Vec<YearValue>,
        brush: Option<YearRange>,
        markers: Vec<MilestoneMarker>,
    },
    Lines(Vec<FrameLine>),
    Bars(Vec<FrameBar>),
    Polylines {
        dimensions: Vec<String>,
        extents: Vec<Option<(f64, f64)>>,
        lines: Vec<FramePolyline>,
    },
    Milestone(Option<MilestoneCard>),
}

impl FrameContent {
    /// Number of data marks (points, lines, bars, polylines or cards).
    #[must_use]
    pub fn mark_count(&self) -> usize {
        match self {
            Self::Area { points, .. } => points.len(),
            Self::Lines(lines) => lines.len(),
            Self::Bars(bars) => bars.len(),
            Self::Polylines { lines, .. } => lines.len(),
            Self::Milestone(card) => usize::from(card.is_some()),
        }
    }
}

/// Backend-agnostic scene for one view redraw.
///
/// Domains are recomputed from the displayed data for every frame and are
/// `None` when nothing is displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewFrame {
    pub view: ViewId,
    pub title: Option<String>,
    pub x_domain: Option<(f64, f64)>,
    pub y_domain: Option<(f64, f64)>,
    pub y_exponent: f64,
    pub content: FrameContent,
}

impl ViewFrame {
    #[must_use]
    pub fn new(view: ViewId, content: FrameContent) -> Self {
        Self {
            view,
            title: None,
            x_domain: None,
            y_domain: None,
            y_exponent: 1.0,
            content,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_domains(mut self, x: Option<(f64, f64)>, y: Option<(f64, f64)>) -> Self {
        self.x_domain = x;
        self.y_domain = y;
        self
    }

    #[must_use]
    pub fn with_y_exponent(mut self, exponent: f64) -> Self {
        self.y_exponent = exponent;
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.mark_count() == 0
    }

    pub fn validate(&self) -> DashResult<()> {
        for (name, domain) in [("x", self.x_domain), ("y", self.y_domain)] {
            if let Some((lo, hi)) = domain {
                if !lo.is_finite() || !hi.is_finite() || lo > hi {
                    return Err(DashError::InvalidData(format!(
                        "{name} domain must be finite and ordered"
                    )));
                }
            }
        }
        if !self.y_exponent.is_finite() || self.y_exponent <= 0.0 {
            return Err(DashError::InvalidData(
                "y exponent must be finite and > 0".to_owned(),
            ));
        }

        match &self.content {
            FrameContent::Area { points, .. } => validate_values(points.iter().map(|p| p.value)),
            FrameContent::Lines(lines) => {
                for line in lines {
                    validate_color(line.color)?;
                    validate_values(line.points.iter().map(|p| p.value))?;
                }
                Ok(())
            }
            FrameContent::Bars(bars) => {
                for bar in bars {
                    validate_color(bar.color)?;
                }
                validate_values(bars.iter().map(|bar| bar.value))
            }
            FrameContent::Polylines { lines, .. } => {
                for line in lines {
                    validate_color(line.color)?;
                    validate_values(line.values.iter().copied())?;
                }
                Ok(())
            }
            FrameContent::Milestone(_) => Ok(()),
        }
    }
}

fn validate_values(values: impl Iterator<Item = f64>) -> DashResult<()> {
    for value in values {
        if !value.is_finite() {
            return Err(DashError::InvalidData(
                "frame values must be finite".to_owned(),
            ));
        }
    }
    Ok(())
}

fn validate_color(color: Option<Color>) -> DashResult<()> {
    color.map_or(Ok(()), Color::validate)
}
