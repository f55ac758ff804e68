use serde::{Deserialize, Serialize};

use crate::error::{DashError, DashResult};

pub const MIN_EXPONENT: f64 = 0.1;
pub const MAX_EXPONENT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> DashResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
            return Err(DashError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(DashError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn map(self, value: f64) -> DashResult<f64> {
        if !value.is_finite() {
            return Err(DashError::InvalidData("value must be finite".to_owned()));
        }
        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(self.range_start + normalized * (self.range_end - self.range_start))
    }

    pub fn invert(self, output: f64) -> DashResult<f64> {
        if !output.is_finite() {
            return Err(DashError::InvalidData("output must be finite".to_owned()));
        }
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return Ok(self.domain_start);
        }
        let normalized = (output - self.range_start) / range_span;
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }
}

/// Sign-preserving power scale used for the detail chart's y axis.
///
/// Values are transformed with `sign(v) * |v|^exponent` before linear
/// interpolation, so negative year-over-year changes stay below zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerScale {
    domain: (f64, f64),
    range: (f64, f64),
    exponent: f64,
}

impl Default for PowerScale {
    fn default() -> Self {
        Self {
            domain: (0.0, 1.0),
            range: (1.0, 0.0),
            exponent: MAX_EXPONENT,
        }
    }
}

impl PowerScale {
    pub fn new(domain: (f64, f64), range: (f64, f64), exponent: f64) -> DashResult<Self> {
        Self::default()
            .with_range(range)?
            .with_domain(domain)?
            .with_exponent(exponent)
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> DashResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(DashError::InvalidData(
                "power scale domain must be finite".to_owned(),
            ));
        }
        self.domain = domain;
        Ok(self)
    }

    pub fn with_range(mut self, range: (f64, f64)) -> DashResult<Self> {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(DashError::InvalidData(
                "power scale range must be finite".to_owned(),
            ));
        }
        self.range = range;
        Ok(self)
    }

    pub fn with_exponent(mut self, exponent: f64) -> DashResult<Self> {
        self.exponent = validate_exponent(exponent)?;
        Ok(self)
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.range
    }

    #[must_use]
    pub fn exponent(self) -> f64 {
        self.exponent
    }

    pub fn map(self, value: f64) -> DashResult<f64> {
        if !value.is_finite() {
            return Err(DashError::InvalidData("value must be finite".to_owned()));
        }
        let start = self.transform(self.domain.0);
        let span = self.transform(self.domain.1) - start;
        if span == 0.0 {
            return Ok(self.range.0);
        }
        let normalized = (self.transform(value) - start) / span;
        Ok(self.range.0 + normalized * (self.range.1 - self.range.0))
    }

    pub fn invert(self, output: f64) -> DashResult<f64> {
        if !output.is_finite() {
            return Err(DashError::InvalidData("output must be finite".to_owned()));
        }
        let range_span = self.range.1 - self.range.0;
        if range_span == 0.0 {
            return Ok(self.domain.0);
        }
        let start = self.transform(self.domain.0);
        let span = self.transform(self.domain.1) - start;
        let transformed = start + (output - self.range.0) / range_span * span;
        Ok(self.untransform(transformed))
    }

    fn transform(self, value: f64) -> f64 {
        value.signum() * value.abs().powf(self.exponent)
    }

    fn untransform(self, value: f64) -> f64 {
        value.signum() * value.abs().powf(self.exponent.recip())
    }
}

/// Vertical slider mapping a handle position to a power-scale exponent.
///
/// The top of the track is `MIN_EXPONENT`, the bottom `MAX_EXPONENT`; the
/// handle starts at the bottom so charts open with a linear axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExponentSlider {
    track: LinearScale,
    height_px: f64,
    handle_px: f64,
}

impl ExponentSlider {
    pub fn new(height_px: f64) -> DashResult<Self> {
        if !height_px.is_finite() || height_px <= 0.0 {
            return Err(DashError::InvalidData(
                "slider height must be finite and > 0".to_owned(),
            ));
        }
        Ok(Self {
            track: LinearScale::new((MIN_EXPONENT, MAX_EXPONENT), (0.0, height_px))?,
            height_px,
            handle_px: height_px,
        })
    }

    #[must_use]
    pub fn handle_px(self) -> f64 {
        self.handle_px
    }

    pub fn exponent(self) -> DashResult<f64> {
        self.track.invert(self.handle_px)
    }

    /// Moves the handle, clamped to the track, and returns the new exponent.
    pub fn drag_to(&mut self, pixel_y: f64) -> DashResult<f64> {
        if !pixel_y.is_finite() {
            return Err(DashError::InvalidData(
                "slider position must be finite".to_owned(),
            ));
        }
        self.handle_px = pixel_y.clamp(0.0, self.height_px);
        self.exponent()
    }
}

pub fn validate_exponent(exponent: f64) -> DashResult<f64> {
    if !exponent.is_finite() || exponent <= 0.0 {
        return Err(DashError::InvalidData(
            "power scale exponent must be finite and > 0".to_owned(),
        ));
    }
    Ok(exponent)
}
