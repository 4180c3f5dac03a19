use nalgebra::{Vector2, Vector3};
use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

/// A point or direction in the math plane.
pub type Vec2 = Vector2<f64>;

/// A point or direction in 3D space (reflection page).
pub type Vec3 = Vector3<f64>;

/// A trait for types that can be used as scalars by the expression VM.
/// Must support basic arithmetic, debug printing, and conversion from f64.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// Values a finite-difference stencil can be applied to: scalars and
/// fixed-size vectors alike.
pub trait Sample: Copy + Add<Output = Self> + Sub<Output = Self> + Mul<f64, Output = Self> {}

impl<T> Sample for T where T: Copy + Add<Output = T> + Sub<Output = T> + Mul<f64, Output = T> {}

/// A plane curve `t -> (x(t), y(t))` defined over a closed parameter domain.
pub trait ParametricCurve {
    /// Returns `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Evaluates the curve at parameter `t`.
    /// Evaluation is pure; values outside the domain are allowed but may be
    /// meaningless.
    fn evaluate(&self, t: f64) -> Vec2;
}
