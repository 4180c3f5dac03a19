//! Tunable constants shared by the samplers, differentiators and renderer.
//!
//! Every field has a default matching the behaviour of the visualizer pages,
//! so hosts only override what they need (`#[serde(default)]`).

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Upper bound for every sample or step count a host can configure.
pub const MAX_SAMPLES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    /// Step `h` for central differences.
    pub derivative_step: f64,
    /// Magnitudes below this are treated as zero (straight line, no direction).
    pub degenerate_epsilon: f64,
    /// Polyline resolution for ordinary curves.
    pub curve_samples: usize,
    /// Polyline resolution for curves with fast-changing geometry.
    pub dense_curve_samples: usize,
    /// Left-rule steps used for the Fresnel integrals of the clothoid.
    pub fresnel_steps: usize,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            derivative_step: 1e-3,
            degenerate_epsilon: 1e-6,
            curve_samples: 200,
            dense_curve_samples: 400,
            fresnel_steps: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub show_grid: bool,
    pub show_axes: bool,
    /// Spacing of grid lines in math units.
    pub grid_step: f64,
    /// Pixel length of a unit tangent/normal arrow.
    pub vector_scale: f64,
    /// Draw de Casteljau construction lines on Bézier scenes.
    pub show_construction: bool,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            grid_step: 1.0,
            vector_scale: 60.0,
            show_construction: true,
            min_zoom: 0.1,
            max_zoom: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VizSettings {
    pub sampling: SamplingSettings,
    pub render: RenderSettings,
}

impl VizSettings {
    /// Parses settings from a JSON document. Missing fields take defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let settings: VizSettings =
            serde_json::from_str(source).context("Failed to parse visualizer settings.")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.sampling;
        if !(s.derivative_step > 0.0) || !s.derivative_step.is_finite() {
            bail!("derivative_step must be positive and finite.");
        }
        if !(s.degenerate_epsilon > 0.0) {
            bail!("degenerate_epsilon must be positive.");
        }
        let counts = [s.curve_samples, s.dense_curve_samples, s.fresnel_steps];
        if counts.iter().any(|&c| c == 0 || c > MAX_SAMPLES) {
            bail!(
                "Sample counts must be between 1 and {} (got {}, {}, {}).",
                MAX_SAMPLES,
                s.curve_samples,
                s.dense_curve_samples,
                s.fresnel_steps
            );
        }
        let r = &self.render;
        if !(r.grid_step > 0.0) || !r.grid_step.is_finite() {
            bail!("grid_step must be positive.");
        }
        if !(r.min_zoom > 0.0) || r.max_zoom < r.min_zoom {
            bail!("Zoom limits must satisfy 0 < min_zoom <= max_zoom.");
        }
        Ok(())
    }
}
