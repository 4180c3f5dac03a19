//! Bézier curves of arbitrary order, evaluated both by repeated linear
//! interpolation (de Casteljau) and by the Bernstein closed form.

use crate::traits::Vec2;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Fewest control points the N-order editor allows (a straight segment).
pub const MIN_CONTROL_POINTS: usize = 2;
/// Most control points the N-order editor allows.
pub const MAX_CONTROL_POINTS: usize = 15;

pub fn lerp(a: Vec2, b: Vec2, t: f64) -> Vec2 {
    a * (1.0 - t) + b * t
}

/// Binomial coefficient `nCr`, computed multiplicatively in floating point.
pub fn binomial(n: usize, r: usize) -> f64 {
    if r > n {
        return 0.0;
    }
    let r = r.min(n - r);
    let mut result = 1.0;
    for i in 1..=r {
        result = result * (n - i + 1) as f64 / i as f64;
    }
    result
}

/// `C(n, i) (1 − t)^(n − i) t^i`
pub fn bernstein_basis(n: usize, i: usize, t: f64) -> f64 {
    binomial(n, i) * (1.0 - t).powi((n - i.min(n)) as i32) * t.powi(i as i32)
}

/// Cubic Bézier in its expanded form. Exact at both endpoints.
pub fn cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f64) -> Vec2 {
    let s = 1.0 - t;
    p0 * (s * s * s) + p1 * (3.0 * s * s * t) + p2 * (3.0 * s * t * t) + p3 * (t * t * t)
}

/// Control polygon of a Bézier curve. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct BezierCurve {
    points: Vec<Vec2>,
}

impl TryFrom<Vec<Vec2>> for BezierCurve {
    type Error = anyhow::Error;

    fn try_from(points: Vec<Vec2>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<BezierCurve> for Vec<Vec2> {
    fn from(curve: BezierCurve) -> Self {
        curve.points
    }
}

impl BezierCurve {
    pub fn new(points: Vec<Vec2>) -> Result<Self> {
        if points.is_empty() {
            bail!("A Bézier curve needs at least one control point.");
        }
        Ok(Self { points })
    }

    /// The five-point quartic the N-order editor starts from.
    pub fn default_quartic() -> Self {
        Self {
            points: vec![
                Vec2::new(-2.5, -1.5),
                Vec2::new(-2.0, 1.0),
                Vec2::new(0.0, 1.5),
                Vec2::new(2.0, 1.0),
                Vec2::new(2.5, -1.5),
            ],
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn degree(&self) -> usize {
        self.points.len() - 1
    }

    pub fn set_point(&mut self, index: usize, p: Vec2) -> Result<()> {
        let len = self.points.len();
        match self.points.get_mut(index) {
            Some(slot) => {
                *slot = p;
                Ok(())
            }
            None => bail!("Control point index {} out of range (len={}).", index, len),
        }
    }

    /// Appends a point offset diagonally from the last one. Returns `false`
    /// at the upper limit.
    pub fn push_point(&mut self, offset: Vec2) -> bool {
        if self.points.len() >= MAX_CONTROL_POINTS {
            return false;
        }
        let last = self.points[self.points.len() - 1];
        self.points.push(last + offset);
        true
    }

    /// Removes the last point. Returns `false` at the lower limit.
    pub fn pop_point(&mut self) -> bool {
        if self.points.len() <= MIN_CONTROL_POINTS {
            return false;
        }
        self.points.pop();
        true
    }

    /// Index of the control point within `radius` of `p`, nearest first.
    pub fn hit_test(&self, p: Vec2, radius: f64) -> Option<usize> {
        self.points
            .iter()
            .enumerate()
            .map(|(i, q)| (i, (*q - p).norm()))
            .filter(|&(_, d)| d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    pub fn de_casteljau(&self, t: f64) -> Vec2 {
        fn reduce(points: &[Vec2], t: f64) -> Vec2 {
            if points.len() == 1 {
                return points[0];
            }
            let next: Vec<Vec2> = points.windows(2).map(|w| lerp(w[0], w[1], t)).collect();
            reduce(&next, t)
        }
        reduce(&self.points, t)
    }

    /// Every interpolation level of de Casteljau at `t`, starting with the
    /// control polygon and ending with the single point on the curve.
    pub fn construction(&self, t: f64) -> Vec<Vec<Vec2>> {
        let mut levels = vec![self.points.clone()];
        while let Some(level) = levels.last() {
            if level.len() <= 1 {
                break;
            }
            let next = level.windows(2).map(|w| lerp(w[0], w[1], t)).collect();
            levels.push(next);
        }
        levels
    }

    pub fn bernstein(&self, t: f64) -> Vec2 {
        let n = self.degree();
        self.points
            .iter()
            .enumerate()
            .fold(Vec2::zeros(), |acc, (i, p)| acc + *p * bernstein_basis(n, i, t))
    }

    /// Polyline through `steps + 1` points of the curve.
    pub fn sample(&self, steps: usize) -> Vec<Vec2> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.bernstein(i as f64 / steps as f64))
            .collect()
    }
}

/// Triangle wave `0 → 1 → 0` over one `period_ms`.
pub fn ping_pong(elapsed_ms: f64, period_ms: f64) -> f64 {
    let phase = loop_parameter(elapsed_ms, period_ms);
    if phase <= 0.5 {
        2.0 * phase
    } else {
        2.0 * (1.0 - phase)
    }
}

/// Sawtooth `0 → 1` over one `period_ms`.
pub fn loop_parameter(elapsed_ms: f64, period_ms: f64) -> f64 {
    if !(period_ms > 0.0) || !elapsed_ms.is_finite() {
        return 0.0;
    }
    elapsed_ms.rem_euclid(period_ms) / period_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cubic_hits_endpoints_exactly() {
        let p0 = Vec2::new(0.3, -1.7);
        let p1 = Vec2::new(2.0, 5.0);
        let p2 = Vec2::new(-4.0, 0.5);
        let p3 = Vec2::new(9.1, 2.2);
        assert_eq!(cubic(p0, p1, p2, p3, 0.0), p0);
        assert_eq!(cubic(p0, p1, p2, p3, 1.0), p3);
    }

    #[test]
    fn binomial_values() {
        assert_eq!(binomial(4, 2), 6.0);
        assert_eq!(binomial(10, 0), 1.0);
        assert_eq!(binomial(10, 10), 1.0);
        assert_eq!(binomial(3, 5), 0.0);
        assert!((binomial(14, 7) - 3432.0).abs() < 1e-9);
    }

    #[test]
    fn construction_levels_shrink_to_curve_point() {
        let curve = BezierCurve::default_quartic();
        let levels = curve.construction(0.3);
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].len(), 5);
        assert_eq!(levels[4].len(), 1);
        assert!((levels[4][0] - curve.de_casteljau(0.3)).norm() < 1e-12);
    }

    #[test]
    fn point_count_stays_within_limits() {
        let mut curve = BezierCurve::new(vec![Vec2::zeros(), Vec2::new(1.0, 0.0)]).expect("curve");
        assert!(!curve.pop_point());
        while curve.push_point(Vec2::new(0.5, 0.5)) {}
        assert_eq!(curve.points().len(), MAX_CONTROL_POINTS);
        assert!(curve.pop_point());
        assert_eq!(curve.degree(), MAX_CONTROL_POINTS - 2);
        assert!(BezierCurve::new(Vec::new()).is_err());
    }

    #[test]
    fn hit_test_picks_nearest() {
        let curve = BezierCurve::default_quartic();
        assert_eq!(curve.hit_test(Vec2::new(-2.4, -1.4), 0.3), Some(0));
        assert_eq!(curve.hit_test(Vec2::new(10.0, 10.0), 0.3), None);
    }

    #[test]
    fn set_point_rejects_bad_index() {
        let mut curve = BezierCurve::default_quartic();
        curve.set_point(1, Vec2::new(7.0, 7.0)).expect("in range");
        assert_eq!(curve.points()[1], Vec2::new(7.0, 7.0));
        let err = curve.set_point(9, Vec2::zeros()).expect_err("out of range");
        assert!(format!("{err}").contains("out of range"));
    }

    #[test]
    fn ping_pong_returns_to_zero() {
        assert_eq!(ping_pong(0.0, 4000.0), 0.0);
        assert!((ping_pong(1000.0, 4000.0) - 0.5).abs() < 1e-12);
        assert!((ping_pong(2000.0, 4000.0) - 1.0).abs() < 1e-12);
        assert!((ping_pong(3000.0, 4000.0) - 0.5).abs() < 1e-12);
        assert!((loop_parameter(9000.0, 8000.0) - 0.125).abs() < 1e-12);
        assert_eq!(loop_parameter(5.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        fn de_casteljau_matches_bernstein(
            coords in proptest::collection::vec(-100.0f64..100.0, 4..30),
            t in 0.0f64..=1.0,
        ) {
            let points: Vec<Vec2> = coords.chunks_exact(2).map(|c| Vec2::new(c[0], c[1])).collect();
            let curve = BezierCurve::new(points).expect("curve");
            let a = curve.de_casteljau(t);
            let b = curve.bernstein(t);
            prop_assert!((a - b).norm() < 1e-6);
        }
    }
}
