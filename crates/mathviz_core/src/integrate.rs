//! Riemann sums in one and two dimensions, with the closed-form integrals
//! they are compared against.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::trace;

use crate::traits::Vec2;

pub const MAX_RECTANGLES: usize = 10_000;
/// Per-axis cap for double-integral grids.
pub const MAX_GRID_DIVISIONS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiemannRule {
    #[default]
    Left,
    Right,
    #[serde(rename = "mid")]
    Midpoint,
}

impl RiemannRule {
    /// Sample position inside `[left, left + dx]`.
    pub fn sample_point(&self, left: f64, dx: f64) -> f64 {
        match self {
            RiemannRule::Left => left,
            RiemannRule::Right => left + dx,
            RiemannRule::Midpoint => left + 0.5 * dx,
        }
    }
}

/// One rectangle of a Riemann sum. `height` may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub left: f64,
    pub width: f64,
    pub sample_x: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiemannSum {
    pub area: f64,
    pub dx: f64,
    pub rectangles: Vec<Rectangle>,
}

/// Sums `n` rectangles over `[a, b]`. A reversed interval gives a negative
/// `dx` and so a signed area. Samples where `f` is not finite are kept as
/// zero-height rectangles and add nothing.
pub fn riemann_sum(
    f: impl Fn(f64) -> f64,
    a: f64,
    b: f64,
    n: usize,
    rule: RiemannRule,
) -> Result<RiemannSum> {
    if n == 0 {
        bail!("Number of rectangles must be greater than zero.");
    }
    if n > MAX_RECTANGLES {
        bail!("Number of rectangles {} exceeds the maximum of {}.", n, MAX_RECTANGLES);
    }
    if !a.is_finite() || !b.is_finite() {
        bail!("Integration bounds must be finite.");
    }
    let dx = (b - a) / n as f64;
    let mut area = 0.0;
    let mut rectangles = Vec::with_capacity(n);
    for i in 0..n {
        let left = a + i as f64 * dx;
        let sample_x = rule.sample_point(left, dx);
        let mut height = f(sample_x);
        if !height.is_finite() {
            trace!(x = sample_x, "Skipping non-finite Riemann sample");
            height = 0.0;
        }
        area += height * dx;
        rectangles.push(Rectangle {
            left,
            width: dx,
            sample_x,
            height,
        });
    }
    Ok(RiemannSum {
        area,
        dx,
        rectangles,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Integrand {
    /// `x² − kx`
    PolyK { k: f64 },
    /// Upper half of the circle of radius `r`, zero outside `[-r, r]`.
    Semicircle { r: f64 },
    Sin,
    Exp,
}

impl Default for Integrand {
    fn default() -> Self {
        Integrand::PolyK { k: 2.0 }
    }
}

impl Integrand {
    pub fn eval(&self, x: f64) -> f64 {
        match *self {
            Integrand::PolyK { k } => x * x - k * x,
            Integrand::Semicircle { r } => {
                let val = r * r - x * x;
                if val >= 0.0 {
                    val.sqrt()
                } else {
                    0.0
                }
            }
            Integrand::Sin => x.sin(),
            Integrand::Exp => x.exp(),
        }
    }

    fn antiderivative(&self, x: f64) -> f64 {
        match *self {
            Integrand::PolyK { k } => x * x * x / 3.0 - k * x * x / 2.0,
            Integrand::Semicircle { r } => {
                let quarter = 0.25 * PI * r * r;
                if x <= -r {
                    -quarter
                } else if x >= r {
                    quarter
                } else {
                    0.5 * (x * (r * r - x * x).sqrt() + r * r * (x / r).asin())
                }
            }
            Integrand::Sin => -x.cos(),
            Integrand::Exp => x.exp(),
        }
    }

    pub fn exact(&self, a: f64, b: f64) -> f64 {
        self.antiderivative(b) - self.antiderivative(a)
    }

    /// Interval the page resets to when this integrand is picked.
    pub fn default_bounds(&self) -> (f64, f64) {
        match *self {
            Integrand::PolyK { k } => (0.0, k),
            Integrand::Semicircle { r } => (-r, r),
            Integrand::Sin => (0.0, PI),
            Integrand::Exp => (0.0, 2.0),
        }
    }

    pub fn x_range(&self) -> (f64, f64) {
        match *self {
            Integrand::Semicircle { r } => (-r - 1.0, r + 1.0),
            _ => (-5.0, 5.0),
        }
    }

    /// Vertical plot range, widened so the graph over `[a, b]` stays visible.
    pub fn y_range(&self, a: f64, b: f64) -> (f64, f64) {
        match *self {
            Integrand::PolyK { k } => {
                let vertex = -(k * k) / 4.0;
                ((-2.0_f64).min(vertex - 1.0), 5.0_f64.max(vertex + 10.0))
            }
            Integrand::Semicircle { r } => (-1.0, r + 1.0),
            Integrand::Sin => (-1.5, 1.5),
            Integrand::Exp => (-1.0, 5.0_f64.max(a.max(b).exp() + 1.0)),
        }
    }
}

/// Recovers π from the area under a semicircle of radius `r`.
pub fn pi_estimate(area: f64, r: f64) -> f64 {
    2.0 * area / (r * r)
}

/// Traffic-light grading of an absolute integration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorGrade {
    Good,
    Fair,
    Poor,
}

impl ErrorGrade {
    pub fn of(error: f64) -> Self {
        if error < 0.01 {
            ErrorGrade::Good
        } else if error < 0.1 {
            ErrorGrade::Fair
        } else {
            ErrorGrade::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiemannReport {
    pub approx: f64,
    pub exact: f64,
    pub error: f64,
    pub grade: ErrorGrade,
    /// Only for the semicircle.
    pub pi_estimate: Option<f64>,
    pub sum: RiemannSum,
}

pub fn report(
    integrand: &Integrand,
    a: f64,
    b: f64,
    n: usize,
    rule: RiemannRule,
) -> Result<RiemannReport> {
    let sum = riemann_sum(|x| integrand.eval(x), a, b, n, rule)?;
    let exact = integrand.exact(a, b);
    let error = (sum.area - exact).abs();
    let pi_estimate = match *integrand {
        Integrand::Semicircle { r } if r != 0.0 => Some(pi_estimate(sum.area, r)),
        _ => None,
    };
    Ok(RiemannReport {
        approx: sum.area,
        exact,
        error,
        grade: ErrorGrade::of(error),
        pi_estimate,
        sum,
    })
}

// --- Double integrals ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// `x² + y²`
    #[default]
    Parabola,
    /// `sin x + cos y + 2`
    SinCos,
    /// `0.5x + 0.5y + 1`
    Plane,
    /// `sqrt(16 − x² − y²)`, zero outside the disc.
    Dome,
}

/// Resolution of the midpoint grid used when a surface has no closed-form
/// antiderivative.
pub const REFERENCE_GRID: usize = 100;

impl Surface {
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        match self {
            Surface::Parabola => x * x + y * y,
            Surface::SinCos => x.sin() + y.cos() + 2.0,
            Surface::Plane => 0.5 * x + 0.5 * y + 1.0,
            Surface::Dome => {
                let val = 16.0 - x * x - y * y;
                if val > 0.0 {
                    val.sqrt()
                } else {
                    0.0
                }
            }
        }
    }

    /// `F` with `∂²F/∂x∂y = f`, where one exists in closed form.
    pub fn antiderivative(&self, x: f64, y: f64) -> Option<f64> {
        match self {
            Surface::Parabola => Some(x * y * (x * x + y * y) / 3.0),
            Surface::SinCos => Some(-y * x.cos() + x * y.sin() + 2.0 * x * y),
            Surface::Plane => Some(0.25 * x * x * y + 0.25 * x * y * y + x * y),
            Surface::Dome => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for Region {
    fn default() -> Self {
        Self {
            x_min: -2.0,
            x_max: 2.0,
            y_min: -2.0,
            y_max: 2.0,
        }
    }
}

impl Region {
    pub fn validate(&self) -> Result<()> {
        if !(self.x_max > self.x_min) || !(self.y_max > self.y_min) {
            bail!("Integration region must satisfy x_max > x_min and y_max > y_min.");
        }
        Ok(())
    }
}

/// One box of the double Riemann sum, sampled at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub height: f64,
}

pub fn double_riemann_columns(
    f: impl Fn(f64, f64) -> f64,
    region: &Region,
    nx: usize,
    ny: usize,
) -> Result<Vec<Column>> {
    region.validate()?;
    if nx == 0 || ny == 0 {
        bail!("Grid divisions must be greater than zero.");
    }
    if nx > MAX_GRID_DIVISIONS || ny > MAX_GRID_DIVISIONS {
        bail!("Grid divisions are limited to {} per axis.", MAX_GRID_DIVISIONS);
    }
    let dx = (region.x_max - region.x_min) / nx as f64;
    let dy = (region.y_max - region.y_min) / ny as f64;
    let mut columns = Vec::with_capacity(nx * ny);
    for i in 0..nx {
        for j in 0..ny {
            let x = region.x_min + i as f64 * dx;
            let y = region.y_min + j as f64 * dy;
            let height = f(x, y);
            columns.push(Column {
                x,
                y,
                dx,
                dy,
                height: if height.is_finite() { height } else { 0.0 },
            });
        }
    }
    Ok(columns)
}

/// Lower-left rule volume over an `nx × ny` grid.
pub fn double_riemann(
    f: impl Fn(f64, f64) -> f64,
    region: &Region,
    nx: usize,
    ny: usize,
) -> Result<f64> {
    let columns = double_riemann_columns(f, region, nx, ny)?;
    Ok(columns.iter().map(|c| c.height * c.dx * c.dy).sum())
}

fn midpoint_volume(f: impl Fn(f64, f64) -> f64, region: &Region, n: usize) -> f64 {
    let dx = (region.x_max - region.x_min) / n as f64;
    let dy = (region.y_max - region.y_min) / n as f64;
    let mut sum = 0.0;
    for i in 0..n {
        for j in 0..n {
            let x = region.x_min + (i as f64 + 0.5) * dx;
            let y = region.y_min + (j as f64 + 0.5) * dy;
            sum += f(x, y) * dx * dy;
        }
    }
    sum
}

/// Exact volume by the corner formula
/// `F(x₂,y₂) − F(x₁,y₂) − F(x₂,y₁) + F(x₁,y₁)`, or a fine midpoint
/// reference when the surface has no antiderivative.
pub fn exact_volume(surface: Surface, region: &Region) -> f64 {
    let corners = [
        surface.antiderivative(region.x_max, region.y_max),
        surface.antiderivative(region.x_min, region.y_max),
        surface.antiderivative(region.x_max, region.y_min),
        surface.antiderivative(region.x_min, region.y_min),
    ];
    match corners {
        [Some(f22), Some(f12), Some(f21), Some(f11)] => f22 - f12 - f21 + f11,
        _ => midpoint_volume(|x, y| surface.eval(x, y), region, REFERENCE_GRID),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceAxis {
    /// Integrate along x first: the cut holds y fixed.
    #[default]
    FixedY,
    /// Integrate along y first: the cut holds x fixed.
    FixedX,
}

impl SliceAxis {
    /// Coordinate of the cut for a slider fraction in `[0, 1]`.
    pub fn position(&self, region: &Region, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self {
            SliceAxis::FixedY => region.y_min + fraction * (region.y_max - region.y_min),
            SliceAxis::FixedX => region.x_min + fraction * (region.x_max - region.x_min),
        }
    }
}

/// Closed profile of the surface along a cut: `(s, z)` pairs where `s` runs
/// along the free axis, bracketed by the two ground points.
pub fn cross_section(
    surface: Surface,
    region: &Region,
    axis: SliceAxis,
    position: f64,
    steps: usize,
) -> Vec<Vec2> {
    let (s_min, s_max) = match axis {
        SliceAxis::FixedY => (region.x_min, region.x_max),
        SliceAxis::FixedX => (region.y_min, region.y_max),
    };
    let steps = steps.max(1);
    let ds = (s_max - s_min) / steps as f64;
    let mut profile = Vec::with_capacity(steps + 3);
    profile.push(Vec2::new(s_min, 0.0));
    for i in 0..=steps {
        let s = s_min + i as f64 * ds;
        let z = match axis {
            SliceAxis::FixedY => surface.eval(s, position),
            SliceAxis::FixedX => surface.eval(position, s),
        };
        profile.push(Vec2::new(s, z));
    }
    profile.push(Vec2::new(s_max, 0.0));
    profile
}

/// Area of the cross-section at `position`, by the midpoint rule.
pub fn slice_area(surface: Surface, region: &Region, axis: SliceAxis, position: f64) -> f64 {
    let (s_min, s_max) = match axis {
        SliceAxis::FixedY => (region.x_min, region.x_max),
        SliceAxis::FixedX => (region.y_min, region.y_max),
    };
    let n = REFERENCE_GRID;
    let ds = (s_max - s_min) / n as f64;
    (0..n)
        .map(|i| {
            let s = s_min + (i as f64 + 0.5) * ds;
            match axis {
                SliceAxis::FixedY => surface.eval(s, position),
                SliceAxis::FixedX => surface.eval(position, s),
            }
        })
        .sum::<f64>()
        * ds
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeReport {
    pub approx: f64,
    pub exact: f64,
    pub error: f64,
}

pub fn volume_report(surface: Surface, region: &Region, nx: usize, ny: usize) -> Result<VolumeReport> {
    let approx = double_riemann(|x, y| surface.eval(x, y), region, nx, ny)?;
    let exact = exact_volume(surface, region);
    Ok(VolumeReport {
        approx,
        exact,
        error: (approx - exact).abs(),
    })
}
