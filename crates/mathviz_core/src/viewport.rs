//! Affine mapping between a logical math rectangle and a pixel rectangle.
//!
//! Screen Y grows downwards while math Y grows upwards, so the vertical axis
//! is flipped. The mapping is stateless and recomputed on every call.

use crate::traits::Vec2;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl Viewport {
    pub fn new(
        x_range: (f64, f64),
        y_range: (f64, f64),
        width: f64,
        height: f64,
        padding: f64,
    ) -> Result<Self> {
        let viewport = Self {
            x_min: x_range.0,
            x_max: x_range.1,
            y_min: y_range.0,
            y_max: y_range.1,
            width,
            height,
            padding,
        };
        viewport.validate()?;
        Ok(viewport)
    }

    /// Origin-centred mapping with a fixed number of pixels per math unit,
    /// as used by the grid-transform pages.
    pub fn centered(width: f64, height: f64, pixels_per_unit: f64) -> Result<Self> {
        if !(pixels_per_unit > 0.0) {
            bail!("pixels_per_unit must be positive.");
        }
        let half_w = width / (2.0 * pixels_per_unit);
        let half_h = height / (2.0 * pixels_per_unit);
        Self::new((-half_w, half_w), (-half_h, half_h), width, height, 0.0)
    }

    pub fn validate(&self) -> Result<()> {
        let bounds = [self.x_min, self.x_max, self.y_min, self.y_max];
        if bounds.iter().any(|v| !v.is_finite()) {
            bail!("Viewport bounds must be finite.");
        }
        if self.x_max <= self.x_min {
            bail!("Viewport x range must satisfy x_max > x_min.");
        }
        if self.y_max <= self.y_min {
            bail!("Viewport y range must satisfy y_max > y_min.");
        }
        if self.padding < 0.0 {
            bail!("Viewport padding must be non-negative.");
        }
        if !(self.width - 2.0 * self.padding > 0.0) || !(self.height - 2.0 * self.padding > 0.0) {
            bail!(
                "Viewport drawable area is empty ({}x{} with padding {}).",
                self.width,
                self.height,
                self.padding
            );
        }
        Ok(())
    }

    /// Pixels per math unit along x.
    pub fn scale_x(&self) -> f64 {
        (self.width - 2.0 * self.padding) / (self.x_max - self.x_min)
    }

    /// Pixels per math unit along y.
    pub fn scale_y(&self) -> f64 {
        (self.height - 2.0 * self.padding) / (self.y_max - self.y_min)
    }

    pub fn to_screen(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.padding + (p.x - self.x_min) * self.scale_x(),
            (self.height - self.padding) - (p.y - self.y_min) * self.scale_y(),
        )
    }

    pub fn to_math(&self, s: Vec2) -> Vec2 {
        Vec2::new(
            self.x_min + (s.x - self.padding) / self.scale_x(),
            self.y_min + ((self.height - self.padding) - s.y) / self.scale_y(),
        )
    }

    /// Maps a math-space direction (no translation) to pixels.
    pub fn to_screen_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(v.x * self.scale_x(), -v.y * self.scale_y())
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            0.5 * (self.x_min + self.x_max),
            0.5 * (self.y_min + self.y_max),
        )
    }

    pub fn with_ranges(&self, x_range: (f64, f64), y_range: (f64, f64)) -> Result<Self> {
        Self::new(x_range, y_range, self.width, self.height, self.padding)
    }
}

/// Zoom and pan applied on top of a base viewport (newton page controls).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub zoom: f64,
    /// Pan offset in math units. Positive x moves the view left.
    pub offset: Vec2,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::zeros(),
        }
    }
}

impl ViewState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn zoom_by(&mut self, factor: f64, min_zoom: f64, max_zoom: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.zoom = (self.zoom * factor).clamp(min_zoom, max_zoom);
        }
    }

    /// Drags the view by a pixel delta measured on the already-zoomed viewport.
    pub fn pan_pixels(&mut self, dx: f64, dy: f64, base: &Viewport) {
        let Ok(current) = self.apply(base) else {
            return;
        };
        self.offset.x += dx / current.scale_x();
        self.offset.y += dy / current.scale_y();
    }

    pub fn apply(&self, base: &Viewport) -> Result<Viewport> {
        if !(self.zoom > 0.0) {
            bail!("Zoom must be positive.");
        }
        let half_w = 0.5 * (base.x_max - base.x_min) / self.zoom;
        let half_h = 0.5 * (base.y_max - base.y_min) / self.zoom;
        let center = base.center();
        let cx = center.x - self.offset.x;
        let cy = center.y + self.offset.y;
        base.with_ranges((cx - half_w, cx + half_w), (cy - half_h, cy + half_h))
    }
}

/// Most ticks [`ticks`] returns for one axis.
pub const MAX_TICKS: usize = 1000;

/// Multiples of `step` inside `[min, max]`, for grid lines and axis ticks.
/// When that would exceed [`MAX_TICKS`], the step grows by factors of ten
/// until it does not.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(step > 0.0) || !step.is_finite() || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }
    let span = max - min;
    if !span.is_finite() {
        return Vec::new();
    }
    let mut step = step;
    while span / step > MAX_TICKS as f64 - 1.0 {
        step *= 10.0;
    }
    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}
