//! Finite-difference derivatives and the moving frame of a plane curve.

use crate::integrate::SliceAxis;
use crate::settings::SamplingSettings;
use crate::traits::{ParametricCurve, Sample, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Central-difference first derivative `(f(t+h) - f(t-h)) / 2h`.
pub fn central_difference<V, F>(f: F, t: f64, h: f64) -> V
where
    V: Sample,
    F: Fn(f64) -> V,
{
    (f(t + h) - f(t - h)) * (1.0 / (2.0 * h))
}

/// Three-point second derivative `(f(t+h) - 2f(t) + f(t-h)) / h²`.
pub fn second_difference<V, F>(f: F, t: f64, h: f64) -> V
where
    V: Sample,
    F: Fn(f64) -> V,
{
    let center = f(t);
    (f(t + h) - center * 2.0 + f(t - h)) * (1.0 / (h * h))
}

pub fn partial_x(f: impl Fn(f64, f64) -> f64, x: f64, y: f64, h: f64) -> f64 {
    (f(x + h, y) - f(x - h, y)) / (2.0 * h)
}

pub fn partial_y(f: impl Fn(f64, f64) -> f64, x: f64, y: f64, h: f64) -> f64 {
    (f(x, y + h) - f(x, y - h)) / (2.0 * h)
}

pub fn gradient(f: impl Fn(f64, f64) -> f64, x: f64, y: f64, h: f64) -> Vec2 {
    Vec2::new(partial_x(&f, x, y, h), partial_y(&f, x, y, h))
}

/// Difference quotient `(f(t+dt) - f(t)) / dt`, i.e. the average rate over
/// `[t, t+dt]`.
pub fn average_rate(f: impl Fn(f64) -> f64, t: f64, dt: f64) -> Option<f64> {
    if dt == 0.0 {
        return None;
    }
    Some((f(t + dt) - f(t)) / dt)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentLine {
    pub x0: f64,
    pub y0: f64,
    pub slope: f64,
}

impl TangentLine {
    pub fn at(&self, x: f64) -> f64 {
        self.y0 + self.slope * (x - self.x0)
    }

    /// Where the tangent crosses `y = 0`, if it is not flat.
    pub fn root(&self, epsilon: f64) -> Option<f64> {
        if self.slope.abs() < epsilon {
            return None;
        }
        Some(self.x0 - self.y0 / self.slope)
    }
}

pub fn tangent_line(f: impl Fn(f64) -> f64, x0: f64, h: f64) -> TangentLine {
    TangentLine {
        x0,
        y0: f(x0),
        slope: central_difference(&f, x0, h),
    }
}

/// Surfaces offered on the partial-derivative page, each plotted over
/// `[-RANGE, RANGE]²`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialSurface {
    /// `sin x + cos y`
    #[default]
    Wave,
    /// `(x² + y²) / 4 − 2`
    Parabola,
    /// `(x² − y²) / 4`
    Saddle,
    /// `2 sin x cos y`
    Hills,
}

impl PartialSurface {
    pub const ALL: [PartialSurface; 4] = [
        PartialSurface::Wave,
        PartialSurface::Parabola,
        PartialSurface::Saddle,
        PartialSurface::Hills,
    ];
    pub const RANGE: f64 = 4.0;

    pub fn eval(&self, x: f64, y: f64) -> f64 {
        match self {
            PartialSurface::Wave => x.sin() + y.cos(),
            PartialSurface::Parabola => (x * x + y * y) / 4.0 - 2.0,
            PartialSurface::Saddle => (x * x - y * y) / 4.0,
            PartialSurface::Hills => 2.0 * x.sin() * y.cos(),
        }
    }

    /// Vertical exaggeration applied when the surface is drawn.
    pub fn z_scale(&self) -> f64 {
        match self {
            PartialSurface::Wave => 1.5,
            _ => 1.0,
        }
    }
}

/// `z = f(a, b) + f_x (x − a) + f_y (y − b)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentPlane {
    pub a: f64,
    pub b: f64,
    pub value: f64,
    pub fx: f64,
    pub fy: f64,
}

impl TangentPlane {
    pub fn at(&self, x: f64, y: f64) -> f64 {
        self.value + self.fx * (x - self.a) + self.fy * (y - self.b)
    }

    /// Corners of the patch `[a ± half] × [b ± half]`, counter-clockwise from
    /// the lower left.
    pub fn corners(&self, half: f64) -> [Vec3; 4] {
        [(-half, -half), (half, -half), (half, half), (-half, half)].map(|(dx, dy)| {
            let (x, y) = (self.a + dx, self.b + dy);
            Vec3::new(x, y, self.at(x, y))
        })
    }

    /// The plane cut along `axis`: the tangent to `z = f(x, b)` for
    /// [`SliceAxis::FixedY`], to `z = f(a, y)` for [`SliceAxis::FixedX`].
    pub fn slice(&self, axis: SliceAxis) -> TangentLine {
        match axis {
            SliceAxis::FixedY => TangentLine {
                x0: self.a,
                y0: self.value,
                slope: self.fx,
            },
            SliceAxis::FixedX => TangentLine {
                x0: self.b,
                y0: self.value,
                slope: self.fy,
            },
        }
    }
}

pub fn tangent_plane(f: impl Fn(f64, f64) -> f64, a: f64, b: f64, h: f64) -> TangentPlane {
    let g = gradient(&f, a, b, h);
    TangentPlane {
        a,
        b,
        value: f(a, b),
        fx: g.x,
        fy: g.y,
    }
}

/// Normalizes `v`, or returns the zero vector when `|v| < epsilon`.
pub fn unit_or_zero(v: Vec2, epsilon: f64) -> Vec2 {
    let norm = v.norm();
    if norm < epsilon {
        Vec2::zeros()
    } else {
        v / norm
    }
}

/// `acos` with the argument clamped into `[-1, 1]`.
pub fn clamped_acos(cosine: f64) -> f64 {
    cosine.clamp(-1.0, 1.0).acos()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Radius {
    Finite(f64),
    /// Curvature is effectively zero: the curve is locally a straight line.
    Infinite,
}

impl Radius {
    pub fn finite(&self) -> Option<f64> {
        match self {
            Radius::Finite(r) => Some(*r),
            Radius::Infinite => None,
        }
    }
}

/// Position, derivatives and curvature data of a curve at one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrenetFrame {
    pub t: f64,
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub tangent: Vec2,
    /// Tangent rotated counter-clockwise by 90 degrees.
    pub normal: Vec2,
    /// Signed curvature; positive when the curve turns left.
    pub curvature: f64,
    pub radius: Radius,
    /// Centre of the osculating circle, absent for straight segments.
    pub center: Option<Vec2>,
}

pub fn frenet_frame(
    curve: &impl ParametricCurve,
    t: f64,
    settings: &SamplingSettings,
) -> FrenetFrame {
    let h = settings.derivative_step;
    let eps = settings.degenerate_epsilon;
    let eval = |s: f64| curve.evaluate(s);

    let position = curve.evaluate(t);
    let velocity: Vec2 = central_difference(eval, t, h);
    let acceleration: Vec2 = second_difference(eval, t, h);

    let speed = velocity.norm();
    let tangent = unit_or_zero(velocity, eps);
    let normal = Vec2::new(-tangent.y, tangent.x);

    let cross = velocity.x * acceleration.y - acceleration.x * velocity.y;
    let denominator = speed.powi(3);
    let curvature = if denominator < eps {
        0.0
    } else {
        cross / denominator
    };

    let (radius, center) = if curvature.abs() > eps {
        let rho = 1.0 / curvature;
        (Radius::Finite(rho.abs()), Some(position + normal * rho))
    } else {
        (Radius::Infinite, None)
    };

    FrenetFrame {
        t,
        position,
        velocity,
        acceleration,
        tangent,
        normal,
        curvature,
        radius,
        center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangent_plane_matches_analytic_partials() {
        let (a, b) = (0.7, -1.2);
        for surface in PartialSurface::ALL {
            let plane = tangent_plane(|x, y| surface.eval(x, y), a, b, 1e-3);
            let (fx, fy) = match surface {
                PartialSurface::Wave => (a.cos(), -b.sin()),
                PartialSurface::Parabola => (a / 2.0, b / 2.0),
                PartialSurface::Saddle => (a / 2.0, -b / 2.0),
                PartialSurface::Hills => (2.0 * a.cos() * b.cos(), -2.0 * a.sin() * b.sin()),
            };
            assert!((plane.fx - fx).abs() < 1e-6, "{surface:?}");
            assert!((plane.fy - fy).abs() < 1e-6, "{surface:?}");
            assert!((plane.at(a, b) - surface.eval(a, b)).abs() < 1e-15);
        }
    }

    #[test]
    fn tangent_plane_corners_and_slices() {
        let plane = tangent_plane(|x, y| PartialSurface::Saddle.eval(x, y), 2.0, 0.0, 1e-3);
        assert!((plane.value - 1.0).abs() < 1e-12);
        assert!((plane.fx - 1.0).abs() < 1e-9 && plane.fy.abs() < 1e-9);
        let corners = plane.corners(2.0);
        assert_eq!((corners[0].x, corners[0].y), (0.0, -2.0));
        assert!((corners[0].z + 1.0).abs() < 1e-9);
        assert!((corners[2].z - 3.0).abs() < 1e-9);

        let along_x = plane.slice(SliceAxis::FixedY);
        assert_eq!(along_x.x0, 2.0);
        assert!((along_x.root(1e-12).expect("sloped") - 1.0).abs() < 1e-9);
        assert!(plane.slice(SliceAxis::FixedX).root(1e-6).is_none());
    }

    struct Circle {
        r: f64,
    }

    impl ParametricCurve for Circle {
        fn domain(&self) -> (f64, f64) {
            (0.0, std::f64::consts::TAU)
        }
        fn evaluate(&self, t: f64) -> Vec2 {
            Vec2::new(self.r * t.cos(), self.r * t.sin())
        }
    }

    struct Line;

    impl ParametricCurve for Line {
        fn domain(&self) -> (f64, f64) {
            (-1.0, 1.0)
        }
        fn evaluate(&self, t: f64) -> Vec2 {
            Vec2::new(2.0 * t, t)
        }
    }

    struct Stationary;

    impl ParametricCurve for Stationary {
        fn domain(&self) -> (f64, f64) {
            (0.0, 1.0)
        }
        fn evaluate(&self, _t: f64) -> Vec2 {
            Vec2::new(1.0, 1.0)
        }
    }

    #[test]
    fn first_derivative_of_square() {
        let d = central_difference(|t: f64| t * t, 3.0, 1e-3);
        assert!((d - 6.0).abs() < 1e-3);
    }

    #[test]
    fn second_derivative_of_sine_at_zero() {
        let d = second_difference(|t: f64| t.sin(), 0.0, 1e-3);
        assert!(d.abs() < 1e-3);
    }

    #[test]
    fn vector_valued_derivative() {
        let v: Vec2 = central_difference(|t: f64| Vec2::new(t.cos(), t.sin()), 0.0, 1e-3);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn partials_of_saddle() {
        let f = |x: f64, y: f64| (x * x - y * y) / 4.0;
        let g = gradient(f, 1.0, 2.0, 1e-3);
        assert!((g.x - 0.5).abs() < 1e-6);
        assert!((g.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn tangent_line_root_and_flat_slope() {
        let line = tangent_line(|x: f64| x * x - 2.0, 2.0, 1e-3);
        assert!((line.slope - 4.0).abs() < 1e-6);
        assert!((line.root(1e-12).expect("root") - 1.5).abs() < 1e-6);
        assert!((line.at(3.0) - 6.0).abs() < 1e-6);
        let flat = tangent_line(|_| 1.0, 0.0, 1e-3);
        assert!(flat.root(1e-12).is_none());
    }

    #[test]
    fn average_rate_matches_secant() {
        let rate = average_rate(|t| t * t, 1.0, 2.0).expect("rate");
        assert!((rate - 4.0).abs() < 1e-12);
        assert!(average_rate(|t| t, 1.0, 0.0).is_none());
    }

    #[test]
    fn circle_frame_has_constant_curvature() {
        let settings = SamplingSettings::default();
        let frame = frenet_frame(&Circle { r: 2.0 }, 0.7, &settings);
        assert!((frame.curvature - 0.5).abs() < 1e-4);
        let radius = frame.radius.finite().expect("finite radius");
        assert!((radius - 2.0).abs() < 1e-3);
        let center = frame.center.expect("center");
        assert!(center.norm() < 1e-3);
        assert!((frame.tangent.norm() - 1.0).abs() < 1e-12);
        assert!(frame.tangent.dot(&frame.normal).abs() < 1e-12);
    }

    #[test]
    fn straight_line_has_infinite_radius() {
        let frame = frenet_frame(&Line, 0.3, &SamplingSettings::default());
        assert_eq!(frame.radius, Radius::Infinite);
        assert!(frame.center.is_none());
        assert!(frame.curvature.abs() < 1e-6);
    }

    #[test]
    fn stationary_point_degrades_to_zero_vectors() {
        let frame = frenet_frame(&Stationary, 0.5, &SamplingSettings::default());
        assert_eq!(frame.tangent, Vec2::zeros());
        assert_eq!(frame.curvature, 0.0);
        assert_eq!(frame.radius, Radius::Infinite);
        assert!(frame.curvature.is_finite());
    }

    #[test]
    fn clamped_acos_tolerates_overshoot() {
        assert_eq!(clamped_acos(1.0000000002), 0.0);
        assert!((clamped_acos(-1.5) - std::f64::consts::PI).abs() < 1e-15);
    }
}
