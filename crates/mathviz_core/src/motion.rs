//! Projectile motion and one-dimensional motion models with their
//! analytic velocities.

use crate::traits::Vec2;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

pub const STANDARD_GRAVITY: f64 = 9.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedUnit {
    #[default]
    MetersPerSecond,
    KilometersPerHour,
}

impl SpeedUnit {
    pub fn to_meters_per_second(&self, speed: f64) -> f64 {
        match self {
            SpeedUnit::MetersPerSecond => speed,
            SpeedUnit::KilometersPerHour => speed * 1000.0 / 3600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Launch speed in m/s.
    pub v0: f64,
    /// Launch angle in degrees, within `[0, 90]`.
    pub theta_deg: f64,
    pub g: f64,
}

impl Default for Projectile {
    fn default() -> Self {
        Self {
            v0: 20.0,
            theta_deg: 45.0,
            g: STANDARD_GRAVITY,
        }
    }
}

/// Derived quantities of a launch, plus the fixed plot scales that depend
/// on the launch speed only (so changing the angle does not rescale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSummary {
    pub v0x: f64,
    pub v0y: f64,
    pub t_peak: f64,
    pub h_max: f64,
    pub t_land: f64,
    pub range: f64,
    /// Range at 45°, `v0² / g`.
    pub max_possible_x: f64,
    /// Height at 90°, `v0² / 2g`.
    pub max_possible_y: f64,
    /// Flight time at 90°, `2 v0 / g`.
    pub max_possible_t: f64,
    /// Upper bound for the time slider: a little past landing.
    pub time_slider_max: f64,
}

impl Projectile {
    pub fn from_input(speed: f64, unit: SpeedUnit, theta_deg: f64, g: f64) -> Result<Self> {
        if !speed.is_finite() || speed < 0.0 {
            bail!("Launch speed must be a non-negative number.");
        }
        if !(g > 0.0) || !g.is_finite() {
            bail!("Gravity must be positive.");
        }
        let theta_deg = if theta_deg.is_finite() { theta_deg.clamp(0.0, 90.0) } else { 0.0 };
        Ok(Self {
            v0: unit.to_meters_per_second(speed),
            theta_deg,
            g,
        })
    }

    pub fn initial_velocity(&self) -> Vec2 {
        let (s, c) = self.theta_deg.to_radians().sin_cos();
        Vec2::new(self.v0 * c, self.v0 * s)
    }

    pub fn summary(&self) -> ProjectileSummary {
        let v = self.initial_velocity();
        let g = self.g;
        let t_land = if v.y <= 0.001 && self.theta_deg <= 0.0 {
            0.0
        } else {
            2.0 * v.y / g
        };
        let fallback = |value: f64, replacement: f64| if value < 1.0 { replacement } else { value };
        ProjectileSummary {
            v0x: v.x,
            v0y: v.y,
            t_peak: v.y / g,
            h_max: v.y * v.y / (2.0 * g),
            t_land,
            range: v.x * t_land,
            max_possible_x: fallback(self.v0 * self.v0 / g, 10.0),
            max_possible_y: fallback(self.v0 * self.v0 / (2.0 * g), 10.0),
            max_possible_t: fallback(2.0 * self.v0 / g, 1.0),
            time_slider_max: (t_land * 1.2).max(1.0),
        }
    }

    pub fn position(&self, t: f64) -> Vec2 {
        let v = self.initial_velocity();
        Vec2::new(v.x * t, v.y * t - 0.5 * self.g * t * t)
    }

    pub fn velocity(&self, t: f64) -> Vec2 {
        let v = self.initial_velocity();
        Vec2::new(v.x, v.y - self.g * t)
    }

    /// Flight path from launch to landing, `steps + 1` points. A flat launch
    /// still draws a short stub so the start is visible.
    pub fn trajectory(&self, steps: usize) -> Vec<Vec2> {
        let t_end = self.summary().t_land.max(0.1);
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.position(t_end * i as f64 / steps as f64))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MotionModel {
    /// `x(t) = ½at² + v₀t + x₀`
    ConstantAcceleration { a: f64, v0: f64, x0: f64 },
    /// `x(t) = A sin(ωt + φ) + x₀`
    Harmonic {
        amplitude: f64,
        omega: f64,
        phase: f64,
        x0: f64,
    },
}

impl Default for MotionModel {
    fn default() -> Self {
        MotionModel::ConstantAcceleration {
            a: 2.0,
            v0: 0.0,
            x0: 0.0,
        }
    }
}

impl MotionModel {
    pub fn default_harmonic() -> Self {
        MotionModel::Harmonic {
            amplitude: 30.0,
            omega: 1.0,
            phase: 0.0,
            x0: 0.0,
        }
    }

    pub fn position(&self, t: f64) -> f64 {
        match *self {
            MotionModel::ConstantAcceleration { a, v0, x0 } => 0.5 * a * t * t + v0 * t + x0,
            MotionModel::Harmonic {
                amplitude,
                omega,
                phase,
                x0,
            } => amplitude * (omega * t + phase).sin() + x0,
        }
    }

    pub fn velocity(&self, t: f64) -> f64 {
        match *self {
            MotionModel::ConstantAcceleration { a, v0, .. } => a * t + v0,
            MotionModel::Harmonic {
                amplitude,
                omega,
                phase,
                ..
            } => amplitude * omega * (omega * t + phase).cos(),
        }
    }

    /// `Δx / Δt` over `[t, t + dt]`, or `None` for `dt == 0`.
    pub fn average_velocity(&self, t: f64, dt: f64) -> Option<f64> {
        crate::differentiate::average_rate(|s| self.position(s), t, dt)
    }

    pub fn t_range(&self) -> (f64, f64) {
        (0.0, 10.0)
    }

    pub fn x_range(&self) -> (f64, f64) {
        match self {
            MotionModel::ConstantAcceleration { .. } => (-10.0, 100.0),
            MotionModel::Harmonic { .. } => (-50.0, 50.0),
        }
    }

    /// `(t, x(t))` over the model's time range at a fixed spacing.
    pub fn graph(&self, dt: f64) -> Vec<Vec2> {
        let (t_min, t_max) = self.t_range();
        if !(dt > 0.0) {
            return Vec::new();
        }
        let count = ((t_max - t_min) / dt).round() as usize;
        (0..=count)
            .map(|i| {
                let t = t_min + i as f64 * dt;
                Vec2::new(t, self.position(t))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symmetric_launch_summary() {
        let summary = Projectile::default().summary();
        let v0y = 20.0 * 45_f64.to_radians().sin();
        assert!((summary.t_peak - v0y / 9.8).abs() < 1e-12);
        assert!((summary.t_land - 2.0 * summary.t_peak).abs() < 1e-12);
        assert!((summary.range - 400.0 / 9.8).abs() < 1e-9);
        assert!((summary.h_max - v0y * v0y / 19.6).abs() < 1e-12);
        assert!((summary.max_possible_x - 400.0 / 9.8).abs() < 1e-12);
    }

    #[test]
    fn kmh_input_is_converted_and_angle_clamped() {
        let p = Projectile::from_input(72.0, SpeedUnit::KilometersPerHour, 120.0, 9.8).expect("input");
        assert!((p.v0 - 20.0).abs() < 1e-12);
        assert_eq!(p.theta_deg, 90.0);
        let flat = Projectile::from_input(10.0, SpeedUnit::MetersPerSecond, -5.0, 9.8).expect("input");
        assert_eq!(flat.theta_deg, 0.0);
        assert_eq!(flat.summary().t_land, 0.0);
        assert_eq!(flat.summary().range, 0.0);
        assert!(Projectile::from_input(-1.0, SpeedUnit::MetersPerSecond, 30.0, 9.8).is_err());
        assert!(Projectile::from_input(1.0, SpeedUnit::MetersPerSecond, 30.0, 0.0).is_err());
    }

    #[test]
    fn slow_launch_uses_fallback_scales() {
        let summary = Projectile {
            v0: 0.5,
            theta_deg: 30.0,
            g: 9.8,
        }
        .summary();
        assert_eq!(summary.max_possible_x, 10.0);
        assert_eq!(summary.max_possible_y, 10.0);
        assert_eq!(summary.max_possible_t, 1.0);
    }

    #[test]
    fn trajectory_lands_on_ground() {
        let p = Projectile::default();
        let path = p.trajectory(100);
        assert_eq!(path.len(), 101);
        assert_eq!(path[0], Vec2::zeros());
        assert!(path[100].y.abs() < 1e-9);
        assert!((p.velocity(p.summary().t_peak).y).abs() < 1e-12);
        assert!(p.summary().time_slider_max > p.summary().t_land);
    }

    #[test]
    fn analytic_velocity_matches_difference_quotient() {
        for model in [MotionModel::default(), MotionModel::default_harmonic()] {
            let t = 3.3;
            let numeric = crate::differentiate::central_difference(|s: f64| model.position(s), t, 1e-4);
            assert!((numeric - model.velocity(t)).abs() < 1e-5, "{model:?}");
        }
    }

    #[test]
    fn average_velocity_of_constant_acceleration() {
        let model = MotionModel::ConstantAcceleration {
            a: 2.0,
            v0: 1.0,
            x0: 0.0,
        };
        let avg = model.average_velocity(1.0, 2.0).expect("dt > 0");
        assert!((avg - model.velocity(2.0)).abs() < 1e-12);
        assert!(model.average_velocity(1.0, 0.0).is_none());
    }

    #[test]
    fn graph_spans_time_range() {
        let points = MotionModel::default_harmonic().graph(0.05);
        assert_eq!(points.len(), 201);
        assert!((points[200].x - 10.0).abs() < 1e-9);
    }
}
