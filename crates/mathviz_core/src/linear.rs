//! 2×2 linear maps: application to vectors and grids, rotation matrices,
//! and the eigen-decomposition shown on the linear transformation page.

use crate::differentiate::clamped_acos;
use crate::traits::Vec2;
use anyhow::{bail, Result};
use nalgebra::Matrix2;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Rows of `A − λI` shorter than this are treated as zero when picking an
/// eigenvector direction.
const EIGEN_EPS: f64 = 1e-6;

/// Largest `range` a transformed grid is drawn over.
pub const MAX_GRID_RANGE: i32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearMap {
    pub matrix: Matrix2<f64>,
}

impl Default for LinearMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl LinearMap {
    /// `[[a, b], [c, d]]`, row-major.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            matrix: Matrix2::new(a, b, c, d),
        }
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix2::identity(),
        }
    }

    /// Counter-clockwise rotation by `degrees`.
    pub fn rotation(degrees: f64) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new(c, -s, s, c)
    }

    pub fn entries(&self) -> [f64; 4] {
        let m = &self.matrix;
        [m[(0, 0)], m[(0, 1)], m[(1, 0)], m[(1, 1)]]
    }

    pub fn apply(&self, v: Vec2) -> Vec2 {
        self.matrix * v
    }

    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    pub fn trace(&self) -> f64 {
        self.matrix.trace()
    }

    pub fn inverse(&self) -> Result<Self> {
        match self.matrix.try_inverse() {
            Some(matrix) => Ok(Self { matrix }),
            None => bail!("Matrix is singular (determinant {}).", self.determinant()),
        }
    }

    /// Matrix whose columns are the images of the basis vectors, as dragged
    /// by the user on the output plot.
    pub fn from_basis_images(e1: Vec2, e2: Vec2) -> Self {
        Self::new(e1.x, e2.x, e1.y, e2.y)
    }

    pub fn basis_images(&self) -> (Vec2, Vec2) {
        (
            self.matrix.column(0).into_owned(),
            self.matrix.column(1).into_owned(),
        )
    }

    pub fn eigen(&self) -> Eigen2 {
        let [a, b, c, d] = self.entries();
        let tr = a + d;
        let det = a * d - b * c;
        let disc = tr * tr - 4.0 * det;

        if disc < 0.0 {
            let re = 0.5 * tr;
            let im = 0.5 * (-disc).sqrt();
            return Eigen2::Complex {
                values: [Complex::new(re, im), Complex::new(re, -im)],
            };
        }

        let root = disc.sqrt();
        let l1 = 0.5 * (tr + root);
        let l2 = 0.5 * (tr - root);
        let direction = |lambda: f64| {
            let (m11, m12, m21, m22) = (a - lambda, b, c, d - lambda);
            let v = if m12.abs() > EIGEN_EPS || m11.abs() > EIGEN_EPS {
                Vec2::new(m12, -m11)
            } else if m22.abs() > EIGEN_EPS || m21.abs() > EIGEN_EPS {
                Vec2::new(m22, -m21)
            } else {
                Vec2::new(1.0, 0.0)
            };
            let len = v.norm();
            if len > 0.0 {
                v / len
            } else {
                v
            }
        };
        Eigen2::Real {
            values: [l1, l2],
            vectors: [direction(l1), direction(l2)],
        }
    }

    /// Images of the integer grid lines `x = i` and `y = i` for
    /// `i ∈ [-range, range]`, as segment endpoints.
    pub fn grid_lines(&self, range: i32) -> Vec<(Vec2, Vec2)> {
        let r = range as f64;
        let mut lines = Vec::with_capacity(2 * (2 * range.max(0) as usize + 1));
        for i in -range..=range {
            let i = i as f64;
            lines.push((self.apply(Vec2::new(i, -r)), self.apply(Vec2::new(i, r))));
        }
        for i in -range..=range {
            let i = i as f64;
            lines.push((self.apply(Vec2::new(-r, i)), self.apply(Vec2::new(r, i))));
        }
        lines
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Eigen2 {
    /// `values[0] >= values[1]`; vectors are unit length.
    Real { values: [f64; 2], vectors: [Vec2; 2] },
    /// Conjugate pair; there is no real eigen-direction to draw.
    Complex { values: [Complex<f64>; 2] },
}

impl Eigen2 {
    /// Lines of the skew grid spanned by the eigenvectors, optionally scaled
    /// by their eigenvalues (the transformed view).
    pub fn grid_lines(&self, range: i32, scaled: bool) -> Vec<(Vec2, Vec2)> {
        let Eigen2::Real { values, vectors } = self else {
            return Vec::new();
        };
        let (mut v1, mut v2) = (vectors[0], vectors[1]);
        if scaled {
            v1 *= values[0];
            v2 *= values[1];
        }
        let r = range as f64;
        let mut lines = Vec::new();
        for i in -range..=range {
            let i = i as f64;
            lines.push((v1 * -r + v2 * i, v1 * r + v2 * i));
            lines.push((v1 * i - v2 * r, v1 * i + v2 * r));
        }
        lines
    }
}

/// Unsigned angle between two vectors in radians, `0` if either is zero.
pub fn angle_between(u: Vec2, v: Vec2) -> f64 {
    let denom = u.norm() * v.norm();
    if denom == 0.0 {
        return 0.0;
    }
    clamped_acos(u.dot(&v) / denom)
}

/// Polar angle of `v` in degrees, normalised to `[0, 360)`.
pub fn polar_degrees(v: Vec2) -> f64 {
    v.y.atan2(v.x).to_degrees().rem_euclid(360.0)
}
