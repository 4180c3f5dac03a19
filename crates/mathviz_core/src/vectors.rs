//! Dot-product applications: mirror reflection in 3D, and the view-cone and
//! back-attack checks used by games.

use crate::differentiate::clamped_acos;
use crate::traits::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reflection {
    /// Incoming ray direction.
    pub incident: Vec3,
    /// Surface normal actually used (a zero input becomes `(0, 1, 0)`).
    pub normal: Vec3,
    /// Projection of `-u` onto the normal.
    pub projection: Vec3,
    /// Outgoing direction `u + 2v`.
    pub reflected: Vec3,
    /// Angle between `-u` and the normal, in degrees.
    pub incidence_deg: f64,
}

/// Reflects `u` in the plane with normal `h`. The normal need not be unit
/// length.
pub fn reflect(u: Vec3, h: Vec3) -> Reflection {
    let normal = if h.norm_squared() == 0.0 {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        h
    };
    let minus_u = -u;
    let dot = minus_u.dot(&normal);
    let projection = normal * (dot / normal.norm_squared());
    let reflected = u + projection * 2.0;

    let denom = minus_u.norm() * normal.norm();
    let incidence_deg = if denom > 0.0 {
        clamped_acos(dot / denom).to_degrees()
    } else {
        0.0
    };

    Reflection {
        incident: u,
        normal,
        projection,
        reflected,
        incidence_deg,
    }
}

/// Unit vector at `degrees` from the +x axis.
pub fn from_angle(degrees: f64) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(c, s)
}

/// Cosine of the angle between `facing` (unit) and `offset`, taken as 0 when
/// the two points coincide.
fn cos_to(facing: Vec2, offset: Vec2) -> f64 {
    let dist = offset.norm();
    if dist > 0.0 {
        facing.dot(&offset) / dist
    } else {
        0.0
    }
}

/// Outcome of a dot-product test, with the numbers shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeCheck {
    pub cos_alpha: f64,
    pub threshold: f64,
    pub distance: f64,
    pub within_angle: bool,
    pub within_distance: bool,
    pub hit: bool,
}

/// A guard's view cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub facing_deg: f64,
    /// Full opening angle of the cone.
    pub fov_deg: f64,
    pub radius: f64,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            facing_deg: 0.0,
            fov_deg: 60.0,
            radius: 180.0,
        }
    }
}

impl FieldOfView {
    /// Seen when `cos α >= cos(fov / 2)` and within the view radius.
    pub fn detect(&self, observer: Vec2, target: Vec2) -> ConeCheck {
        let offset = target - observer;
        let distance = offset.norm();
        let cos_alpha = cos_to(from_angle(self.facing_deg), offset);
        let threshold = (self.fov_deg / 2.0).to_radians().cos();
        let within_angle = cos_alpha >= threshold;
        let within_distance = distance <= self.radius;
        ConeCheck {
            cos_alpha,
            threshold,
            distance,
            within_angle,
            within_distance,
            hit: within_angle && within_distance,
        }
    }
}

/// The arc behind an enemy from which an attack counts as a back attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackArc {
    pub facing_deg: f64,
    /// Full opening angle of the arc behind the enemy.
    pub arc_deg: f64,
    /// Attack distance including hit tolerance.
    pub reach: f64,
}

impl Default for BackArc {
    fn default() -> Self {
        Self {
            facing_deg: 90.0,
            arc_deg: 120.0,
            reach: 80.0,
        }
    }
}

impl BackArc {
    /// Hit when `cos α <= cos(180° − arc / 2)` and within reach.
    pub fn check(&self, enemy: Vec2, attacker: Vec2) -> ConeCheck {
        let offset = attacker - enemy;
        let distance = offset.norm();
        let cos_alpha = cos_to(from_angle(self.facing_deg), offset);
        let threshold = (180.0 - self.arc_deg / 2.0).to_radians().cos();
        let within_angle = cos_alpha <= threshold;
        let within_distance = distance <= self.reach;
        ConeCheck {
            cos_alpha,
            threshold,
            distance,
            within_angle,
            within_distance,
            hit: within_angle && within_distance,
        }
    }
}
