//! Closed set of named plane curves with their coefficients and domains.

use crate::settings::{SamplingSettings, MAX_SAMPLES};
use crate::traits::{ParametricCurve, Vec2};
use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Left-rule approximation of the Fresnel integrals
/// `(∫₀ᵗ cos u² du, ∫₀ᵗ sin u² du)`.
///
/// Negative `t` integrates backwards, giving the odd symmetry of the clothoid.
pub fn fresnel(t: f64, steps: usize) -> Vec2 {
    if steps == 0 {
        return Vec2::zeros();
    }
    let dt = t / steps as f64;
    let mut sum = Vec2::zeros();
    for i in 0..steps {
        let u = i as f64 * dt;
        let u2 = u * u;
        sum += Vec2::new(u2.cos(), u2.sin()) * dt;
    }
    sum
}

fn default_fresnel_steps() -> usize {
    SamplingSettings::default().fresnel_steps
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Curve {
    /// `(a cos ωt, a sin ωt)`
    Circle { a: f64, omega: f64 },
    /// `(a t, a t² / 2)`
    Parabola { a: f64 },
    /// `(1.5a cos t, 0.8a sin t)`
    Ellipse { a: f64 },
    /// Cycloid drawn at half scale: `(a/2)(t − sin t, 1 − cos t)`.
    Cycloid { a: f64 },
    /// Euler spiral `2a (C(t), S(t))` built on [`fresnel`].
    Clothoid {
        a: f64,
        #[serde(default = "default_fresnel_steps")]
        steps: usize,
    },
    /// Cissoid of Diocles `3a (t², t³) / (1 + t²)`.
    Cissoid { a: f64 },
    /// `(a sin pt, a sin qt)`
    Lissajous { a: f64, p: f64, q: f64 },
    /// Graph of `A sin(Bt + C) + D` traced as `(t, y)`.
    SineWave {
        amplitude: f64,
        frequency: f64,
        phase: f64,
        offset: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveId {
    Circle,
    Parabola,
    Ellipse,
    Cycloid,
    Clothoid,
    Cissoid,
    Lissajous,
    SineWave,
}

impl CurveId {
    pub const ALL: [CurveId; 8] = [
        CurveId::Circle,
        CurveId::Parabola,
        CurveId::Ellipse,
        CurveId::Cycloid,
        CurveId::Clothoid,
        CurveId::Cissoid,
        CurveId::Lissajous,
        CurveId::SineWave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurveId::Circle => "circle",
            CurveId::Parabola => "parabola",
            CurveId::Ellipse => "ellipse",
            CurveId::Cycloid => "cycloid",
            CurveId::Clothoid => "clothoid",
            CurveId::Cissoid => "cissoid",
            CurveId::Lissajous => "lissajous",
            CurveId::SineWave => "sine_wave",
        }
    }

    /// Curves whose geometry changes quickly enough to need the dense
    /// sampling resolution.
    pub fn needs_dense_sampling(&self) -> bool {
        matches!(self, CurveId::Cycloid | CurveId::Clothoid)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurveId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CurveId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown curve '{}'.", s))
    }
}

impl Curve {
    /// The curve with the coefficients the visualizer starts from.
    pub fn default_for(id: CurveId) -> Self {
        match id {
            CurveId::Circle => Curve::Circle { a: 1.0, omega: 1.0 },
            CurveId::Parabola => Curve::Parabola { a: 1.0 },
            CurveId::Ellipse => Curve::Ellipse { a: 1.0 },
            CurveId::Cycloid => Curve::Cycloid { a: 1.0 },
            CurveId::Clothoid => Curve::Clothoid {
                a: 1.0,
                steps: default_fresnel_steps(),
            },
            CurveId::Cissoid => Curve::Cissoid { a: 1.0 },
            CurveId::Lissajous => Curve::Lissajous {
                a: 1.0,
                p: 3.0,
                q: 2.0,
            },
            CurveId::SineWave => Curve::SineWave {
                amplitude: 1.0,
                frequency: 1.0,
                phase: 0.0,
                offset: 0.0,
            },
        }
    }

    pub fn id(&self) -> CurveId {
        match self {
            Curve::Circle { .. } => CurveId::Circle,
            Curve::Parabola { .. } => CurveId::Parabola,
            Curve::Ellipse { .. } => CurveId::Ellipse,
            Curve::Cycloid { .. } => CurveId::Cycloid,
            Curve::Clothoid { .. } => CurveId::Clothoid,
            Curve::Cissoid { .. } => CurveId::Cissoid,
            Curve::Lissajous { .. } => CurveId::Lissajous,
            Curve::SineWave { .. } => CurveId::SineWave,
        }
    }

    /// Human-readable parametric formula (LaTeX), shown next to the plot.
    pub fn formula(&self) -> &'static str {
        match self {
            Curve::Circle { .. } => r"x = a\cos(\omega t),\ y = a\sin(\omega t)",
            Curve::Parabola { .. } => r"x = at,\ y = \tfrac{1}{2}at^2",
            Curve::Ellipse { .. } => r"x = 1.5a\cos t,\ y = 0.8a\sin t",
            Curve::Cycloid { .. } => r"x = \tfrac{a}{2}(t - \sin t),\ y = \tfrac{a}{2}(1 - \cos t)",
            Curve::Clothoid { .. } => r"x = 2a\int_0^t \cos(u^2)\,du,\ y = 2a\int_0^t \sin(u^2)\,du",
            Curve::Cissoid { .. } => r"x = \frac{3at^2}{1+t^2},\ y = \frac{3at^3}{1+t^2}",
            Curve::Lissajous { .. } => r"x = a\sin(pt),\ y = a\sin(qt)",
            Curve::SineWave { .. } => r"y = A\sin(Bt + C) + D",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Curve::Clothoid { steps, .. } = self {
            if *steps == 0 || *steps > MAX_SAMPLES {
                bail!("Clothoid steps must be between 1 and {}, got {}.", MAX_SAMPLES, steps);
            }
        }
        Ok(())
    }
}

impl ParametricCurve for Curve {
    fn domain(&self) -> (f64, f64) {
        match self {
            Curve::Circle { .. } | Curve::Ellipse { .. } | Curve::Lissajous { .. } => (0.0, TAU),
            Curve::Parabola { .. } => (-2.0, 2.0),
            Curve::Cycloid { .. } | Curve::SineWave { .. } => (-TAU, TAU),
            Curve::Clothoid { .. } => (-5.0, 5.0),
            Curve::Cissoid { .. } => (-1.5, 1.5),
        }
    }

    fn evaluate(&self, t: f64) -> Vec2 {
        match *self {
            Curve::Circle { a, omega } => Vec2::new(a * (omega * t).cos(), a * (omega * t).sin()),
            Curve::Parabola { a } => Vec2::new(a * t, 0.5 * a * t * t),
            Curve::Ellipse { a } => Vec2::new(1.5 * a * t.cos(), 0.8 * a * t.sin()),
            Curve::Cycloid { a } => {
                let scale = 0.5 * a;
                Vec2::new(scale * (t - t.sin()), scale * (1.0 - t.cos()))
            }
            Curve::Clothoid { a, steps } => fresnel(t, steps) * (2.0 * a),
            Curve::Cissoid { a } => {
                let denom = 1.0 + t * t;
                Vec2::new(3.0 * a * t * t / denom, 3.0 * a * t * t * t / denom)
            }
            Curve::Lissajous { a, p, q } => Vec2::new(a * (p * t).sin(), a * (q * t).sin()),
            Curve::SineWave {
                amplitude,
                frequency,
                phase,
                offset,
            } => Vec2::new(t, amplitude * (frequency * t + phase).sin() + offset),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledPoint {
    pub t: f64,
    pub x: f64,
    pub y: f64,
}

/// Evaluates `curve` at `steps + 1` evenly spaced parameters covering its
/// whole domain, endpoints included.
pub fn sample(curve: &impl ParametricCurve, steps: usize) -> Vec<SampledPoint> {
    let (t_min, t_max) = curve.domain();
    let steps = steps.max(1);
    let dt = (t_max - t_min) / steps as f64;
    (0..=steps)
        .map(|i| {
            let t = if i == steps { t_max } else { t_min + i as f64 * dt };
            let p = curve.evaluate(t);
            SampledPoint { t, x: p.x, y: p.y }
        })
        .collect()
}

/// Samples a named curve at the resolution the settings prescribe for it.
pub fn sample_curve(curve: &Curve, settings: &SamplingSettings) -> Vec<SampledPoint> {
    let steps = if curve.id().needs_dense_sampling() {
        settings.dense_curve_samples
    } else {
        settings.curve_samples
    };
    sample(curve, steps)
}

/// Wraps `t` into `[t_min, t_max]` so animations can loop over the domain.
pub fn wrap_parameter(curve: &impl ParametricCurve, t: f64) -> f64 {
    let (t_min, t_max) = curve.domain();
    let span = t_max - t_min;
    if !(span > 0.0) || !t.is_finite() {
        return t_min;
    }
    t_min + (t - t_min).rem_euclid(span)
}

/// Evaluates `y = A sin(Bx + C)` over `[x_min, x_max]` at a fixed spacing.
pub fn sine_points(
    amplitude: f64,
    frequency: f64,
    phase: f64,
    x_range: (f64, f64),
    dx: f64,
) -> Vec<Vec2> {
    if !(dx > 0.0) || x_range.1 < x_range.0 {
        return Vec::new();
    }
    let count = ((x_range.1 - x_range.0) / dx).floor() as usize;
    (0..=count)
        .map(|i| {
            let x = x_range.0 + i as f64 * dx;
            Vec2::new(x, amplitude * (frequency * x + phase).sin())
        })
        .collect()
}

/// Period `2π / |B|` of `A sin(Bx + C)`, or `None` for a constant wave.
pub fn sine_period(frequency: f64) -> Option<f64> {
    if frequency.abs() < 1e-12 {
        None
    } else {
        Some(2.0 * PI / frequency.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::differentiate::frenet_frame;

    #[test]
    fn formulas_show_applied_scales() {
        assert!(Curve::default_for(CurveId::Cycloid).formula().contains(r"\tfrac{a}{2}"));
        assert!(Curve::default_for(CurveId::Clothoid).formula().starts_with("x = 2a"));
        let p = Curve::Cycloid { a: 2.0 }.evaluate(PI);
        assert!((p.x - PI).abs() < 1e-12 && (p.y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn clothoid_step_count_is_bounded() {
        assert!(Curve::default_for(CurveId::Clothoid).validate().is_ok());
        let huge = Curve::Clothoid {
            a: 1.0,
            steps: 4_000_000_000,
        };
        let err = huge.validate().expect_err("too many steps");
        assert!(format!("{err}").contains("between 1 and"));
        assert!(Curve::Clothoid { a: 1.0, steps: 0 }.validate().is_err());
    }

    #[test]
    fn ids_round_trip_through_strings() {
        for id in CurveId::ALL {
            let parsed: CurveId = id.as_str().parse().expect("known id");
            assert_eq!(parsed, id);
            assert_eq!(Curve::default_for(id).id(), id);
        }
        let err = "spiral".parse::<CurveId>().expect_err("unknown id");
        assert!(format!("{err}").contains("Unknown curve"));
    }

    #[test]
    fn sampling_covers_domain_endpoints() {
        let curve = Curve::default_for(CurveId::Parabola);
        let points = sample(&curve, 200);
        assert_eq!(points.len(), 201);
        assert_eq!(points[0].t, -2.0);
        assert_eq!(points[200].t, 2.0);
        assert!((points[200].y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn dense_resolution_for_cycloid_and_clothoid() {
        let settings = SamplingSettings::default();
        assert_eq!(
            sample_curve(&Curve::default_for(CurveId::Cycloid), &settings).len(),
            401
        );
        assert_eq!(
            sample_curve(&Curve::default_for(CurveId::Ellipse), &settings).len(),
            201
        );
    }

    #[test]
    fn fresnel_limits_and_symmetry() {
        let small = fresnel(0.1, 1000);
        assert!((small.x - 0.1).abs() < 1e-4);
        assert!(small.y.abs() < 1e-3);
        let pos = fresnel(1.3, 100);
        let neg = fresnel(-1.3, 100);
        assert!((pos + neg).norm() < 1e-12);
        assert_eq!(fresnel(2.0, 0), Vec2::zeros());
    }

    #[test]
    fn circle_curvature_matches_inverse_radius() {
        let curve = Curve::Circle { a: 2.5, omega: 1.0 };
        let frame = frenet_frame(&curve, 1.0, &SamplingSettings::default());
        assert!((frame.curvature - 0.4).abs() < 1e-4);
    }

    #[test]
    fn cissoid_passes_through_origin() {
        let curve = Curve::default_for(CurveId::Cissoid);
        assert_eq!(curve.evaluate(0.0), Vec2::zeros());
        let p = curve.evaluate(1.0);
        assert!((p.x - 1.5).abs() < 1e-12 && (p.y - 1.5).abs() < 1e-12);
    }

    #[test]
    fn curve_serializes_with_kind_tag() {
        let json = serde_json::to_string(&Curve::Lissajous {
            a: 1.0,
            p: 3.0,
            q: 2.0,
        })
        .expect("serialize");
        assert!(json.contains(r#""kind":"lissajous""#));
        let clothoid: Curve =
            serde_json::from_str(r#"{ "kind": "clothoid", "a": 1.0 }"#).expect("deserialize");
        assert_eq!(clothoid, Curve::default_for(CurveId::Clothoid));
    }

    #[test]
    fn wrap_parameter_loops_domain() {
        let curve = Curve::default_for(CurveId::Circle);
        assert!((wrap_parameter(&curve, TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_parameter(&curve, -0.5) - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn sine_helpers() {
        let points = sine_points(2.0, 1.0, 0.0, (0.0, PI), PI / 2.0);
        assert_eq!(points.len(), 3);
        assert!((points[1].y - 2.0).abs() < 1e-12);
        assert!((sine_period(2.0).expect("period") - PI).abs() < 1e-12);
        assert!(sine_period(0.0).is_none());
    }
}
