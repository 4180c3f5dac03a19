//! Truncated Fourier and Taylor series.

use anyhow::{bail, Result};
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

// --- Fourier ---

/// Most harmonics a partial sum or spectrum may use.
pub const MAX_TERMS: usize = 1000;
pub const MAX_SPECTRUM_SAMPLES: usize = 1 << 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Square,
    /// `x / 2` on `(-π, π)`
    Sawtooth,
    /// `x² / 4` on `[-π, π]`
    Parabola,
    /// `|x|` on `[-π, π]`
    AbsX,
    /// `x³ / 10` on `(-π, π)`
    Cubic,
}

/// Maps `x` into `[-π, π)`.
pub fn wrap_phase(x: f64) -> f64 {
    (x + PI).rem_euclid(TAU) - PI
}

impl Waveform {
    pub const ALL: [Waveform; 5] = [
        Waveform::Square,
        Waveform::Sawtooth,
        Waveform::Parabola,
        Waveform::AbsX,
        Waveform::Cubic,
    ];

    /// The 2π-periodic function the partial sums approximate.
    pub fn target(&self, x: f64) -> f64 {
        let phase = wrap_phase(x);
        match self {
            Waveform::Square => {
                if x.sin() >= 0.0 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Sawtooth => phase / 2.0,
            Waveform::Parabola => phase * phase / 4.0,
            Waveform::AbsX => phase.abs(),
            Waveform::Cubic => phase * phase * phase / 10.0,
        }
    }

    /// Sum of the first `n` terms of the series. For the square and `|x|`
    /// waves only odd harmonics appear, so term `i` is harmonic `2i − 1`.
    pub fn partial_sum(&self, x: f64, n: usize) -> f64 {
        match self {
            Waveform::Square => {
                let sum: f64 = (1..=n)
                    .map(|i| {
                        let k = (2 * i - 1) as f64;
                        (k * x).sin() / k
                    })
                    .sum();
                sum * 4.0 / PI
            }
            Waveform::Sawtooth => (1..=n)
                .map(|i| {
                    let k = i as f64;
                    alternating(i + 1) * (k * x).sin() / k
                })
                .sum(),
            Waveform::Parabola => {
                PI * PI / 12.0
                    + (1..=n)
                        .map(|i| {
                            let k = i as f64;
                            alternating(i) * (k * x).cos() / (k * k)
                        })
                        .sum::<f64>()
            }
            Waveform::AbsX => {
                PI / 2.0
                    - (1..=n)
                        .map(|i| {
                            let k = (2 * i - 1) as f64;
                            4.0 / PI * (k * x).cos() / (k * k)
                        })
                        .sum::<f64>()
            }
            Waveform::Cubic => {
                let sum: f64 = (1..=n)
                    .map(|i| {
                        let k = i as f64;
                        let coeff = alternating(i) * 2.0 * (6.0 / k.powi(3) - PI * PI / k);
                        coeff * (k * x).sin()
                    })
                    .sum();
                sum / 10.0
            }
        }
    }

    /// `(x, target, partial sum)` triples over `[x_min, x_max]`.
    pub fn sample(&self, n: usize, x_range: (f64, f64), steps: usize) -> Vec<(f64, f64, f64)> {
        let steps = steps.max(1);
        let dx = (x_range.1 - x_range.0) / steps as f64;
        (0..=steps)
            .map(|i| {
                let x = x_range.0 + i as f64 * dx;
                (x, self.target(x), self.partial_sum(x, n))
            })
            .collect()
    }
}

/// `(-1)^n`
fn alternating(n: usize) -> f64 {
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Amplitudes of harmonics `0..=n` of the target wave, measured with an FFT
/// of `samples` points over one period. Index 0 is the mean.
pub fn harmonic_amplitudes(waveform: Waveform, n: usize, samples: usize) -> Result<Vec<f64>> {
    if n > MAX_TERMS || samples > MAX_SPECTRUM_SAMPLES {
        bail!(
            "Spectrum is limited to {} harmonics and {} samples.",
            MAX_TERMS,
            MAX_SPECTRUM_SAMPLES
        );
    }
    if samples < 2 * n + 1 {
        bail!(
            "Need at least {} samples to resolve {} harmonics, got {}.",
            2 * n + 1,
            n,
            samples
        );
    }
    let mut buffer: Vec<Complex<f64>> = (0..samples)
        .map(|i| {
            let x = -PI + TAU * i as f64 / samples as f64;
            Complex::new(waveform.target(x), 0.0)
        })
        .collect();
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(samples);
    fft.process(&mut buffer);

    let scale = 1.0 / samples as f64;
    Ok(buffer
        .iter()
        .take(n + 1)
        .enumerate()
        .map(|(k, c)| if k == 0 { c.norm() * scale } else { 2.0 * c.norm() * scale })
        .collect())
}

// --- Taylor ---

/// Highest polynomial order the expansion page plots.
pub const MAX_ORDER: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaylorFunction {
    /// `e^{bx}`
    #[default]
    Exp,
    /// `sin(bx)`
    Sin,
    /// `cos(bx)`
    Cos,
    /// `ln(1 + x)`; ignores `b` and only expands about 0.
    Log1p,
}

impl TaylorFunction {
    pub fn eval(&self, x: f64, b: f64) -> f64 {
        match self {
            TaylorFunction::Exp => (b * x).exp(),
            TaylorFunction::Sin => (b * x).sin(),
            TaylorFunction::Cos => (b * x).cos(),
            TaylorFunction::Log1p => {
                if x > -1.0 {
                    x.ln_1p()
                } else {
                    f64::NAN
                }
            }
        }
    }

    /// `f⁽ᵏ⁾(a)`. `None` where the closed form is not available
    /// (`ln(1 + x)` away from 0).
    pub fn derivative_at(&self, k: usize, a: f64, b: f64) -> Option<f64> {
        let power_b = b.powi(k as i32);
        match self {
            TaylorFunction::Exp => Some(power_b * (b * a).exp()),
            TaylorFunction::Sin => Some(match k % 4 {
                0 => power_b * (b * a).sin(),
                1 => power_b * (b * a).cos(),
                2 => -power_b * (b * a).sin(),
                _ => -power_b * (b * a).cos(),
            }),
            TaylorFunction::Cos => Some(match k % 4 {
                0 => power_b * (b * a).cos(),
                1 => -power_b * (b * a).sin(),
                2 => -power_b * (b * a).cos(),
                _ => power_b * (b * a).sin(),
            }),
            TaylorFunction::Log1p => {
                if a != 0.0 {
                    None
                } else if k == 0 {
                    Some(0.0)
                } else {
                    Some(alternating(k - 1) * factorial(k - 1))
                }
            }
        }
    }

    pub fn x_range(&self) -> (f64, f64) {
        match self {
            TaylorFunction::Exp => (-5.0, 5.0),
            TaylorFunction::Sin | TaylorFunction::Cos => (-TAU, TAU),
            TaylorFunction::Log1p => (-0.9, 5.0),
        }
    }

    pub fn y_range(&self) -> (f64, f64) {
        match self {
            TaylorFunction::Exp => (-2.0, 16.0),
            TaylorFunction::Sin | TaylorFunction::Cos => (-2.0, 2.0),
            TaylorFunction::Log1p => (-3.0, 3.0),
        }
    }
}

pub fn factorial(n: usize) -> f64 {
    (1..=n).fold(1.0, |acc, i| acc * i as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaylorPolynomial {
    pub function: TaylorFunction,
    pub center: f64,
    pub b: f64,
    /// `f⁽ᵏ⁾(a) / k!` for `k = 0..=order`.
    pub coefficients: Vec<f64>,
}

impl TaylorPolynomial {
    pub fn new(function: TaylorFunction, center: f64, b: f64, order: usize) -> Result<Self> {
        if order > MAX_ORDER {
            bail!("Order {} exceeds the maximum of {}.", order, MAX_ORDER);
        }
        if !center.is_finite() || !b.is_finite() {
            bail!("Expansion centre and coefficient b must be finite.");
        }
        let coefficients = (0..=order)
            .map(|k| {
                function
                    .derivative_at(k, center, b)
                    .map(|d| d / factorial(k))
                    .ok_or_else(|| {
                        anyhow::anyhow!("log(1+x) can only be expanded about a = 0 (got a = {}).", center)
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            function,
            center,
            b,
            coefficients,
        })
    }

    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Horner evaluation in powers of `x − a`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let dx = x - self.center;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * dx + c)
    }

    /// Coefficients as exact fractions where one is close enough (`1/6`),
    /// otherwise as decimals.
    pub fn coefficient_labels(&self) -> Vec<String> {
        self.coefficients
            .iter()
            .map(|&c| match to_fraction(c, 1e-9, 1_000_000) {
                Some((p, 1)) => p.to_string(),
                Some((p, q)) => format!("{p}/{q}"),
                None => format!("{c:.4}"),
            })
            .collect()
    }

    /// Values of the partial polynomials of every order `0..=order` at `x`.
    pub fn partial_values(&self, x: f64) -> Vec<f64> {
        let dx = x - self.center;
        let mut power = 1.0;
        let mut sum = 0.0;
        self.coefficients
            .iter()
            .map(|c| {
                sum += c * power;
                power *= dx;
                sum
            })
            .collect()
    }
}

/// Best rational `p/q` within `tolerance` of `value`, with `q <= max_denominator`,
/// by continued fractions. Used to show coefficients like `1/6` exactly.
pub fn to_fraction(value: f64, tolerance: f64, max_denominator: i64) -> Option<(i64, i64)> {
    if !value.is_finite() {
        return None;
    }
    let sign = if value < 0.0 { -1 } else { 1 };
    let target = value.abs();
    if target.fract() < tolerance {
        return Some((sign * target.trunc() as i64, 1));
    }

    let (mut h1, mut h2, mut k1, mut k2) = (1_i64, 0_i64, 0_i64, 1_i64);
    let mut rest = target;
    loop {
        let whole = rest.floor();
        let a = whole as i64;
        (h1, h2) = (a * h1 + h2, h1);
        (k1, k2) = (a * k1 + k2, k1);
        if (rest - whole).abs() < tolerance || k1 > max_denominator {
            break;
        }
        rest = 1.0 / (rest - whole);
    }
    if k1 > max_denominator || k1 == 0 {
        return None;
    }
    if (target - h1 as f64 / k1 as f64).abs() > tolerance * target {
        return None;
    }
    Some((sign * h1, k1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_are_labelled_as_fractions() {
        let exp = TaylorPolynomial::new(TaylorFunction::Exp, 0.0, 1.0, 4).expect("exp");
        assert_eq!(exp.coefficient_labels(), vec!["1", "1", "1/2", "1/6", "1/24"]);
        let shifted = TaylorPolynomial::new(TaylorFunction::Exp, 1.0, 1.0, 0).expect("exp");
        assert_eq!(shifted.coefficient_labels(), vec!["2.7183"]);
    }

    #[test]
    fn spectrum_size_is_bounded() {
        assert!(harmonic_amplitudes(Waveform::Square, MAX_TERMS + 1, 4096).is_err());
        assert!(harmonic_amplitudes(Waveform::Square, 3, usize::MAX).is_err());
    }

    #[test]
    fn phase_wraps_into_principal_interval() {
        assert!((wrap_phase(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((wrap_phase(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
        assert!((wrap_phase(0.3) - 0.3).abs() < 1e-15);
    }

    #[test]
    fn partial_sums_approach_targets() {
        let x = 1.0;
        for waveform in Waveform::ALL {
            let approx = waveform.partial_sum(x, 2000);
            let target = waveform.target(x);
            assert!(
                (approx - target).abs() < 1e-2,
                "{waveform:?}: {approx} vs {target}"
            );
        }
    }

    #[test]
    fn first_square_term() {
        assert!((Waveform::Square.partial_sum(PI / 2.0, 1) - 4.0 / PI).abs() < 1e-12);
        assert_eq!(Waveform::Square.partial_sum(0.7, 0), 0.0);
    }

    #[test]
    fn square_spectrum_has_odd_harmonics() {
        let amps = harmonic_amplitudes(Waveform::Square, 5, 1024).expect("fft");
        assert_eq!(amps.len(), 6);
        assert!((amps[1] - 4.0 / PI).abs() < 1e-2);
        assert!((amps[3] - 4.0 / (3.0 * PI)).abs() < 1e-2);
        assert!(amps[2] < 1e-2 && amps[4] < 1e-2);
        assert!(harmonic_amplitudes(Waveform::Square, 10, 8).is_err());
    }

    #[test]
    fn sampled_triples_cover_range() {
        let points = Waveform::AbsX.sample(3, (-PI, PI), 100);
        assert_eq!(points.len(), 101);
        assert!((points[0].1 - PI).abs() < 1e-12);
    }

    #[test]
    fn derivative_cycles() {
        let a = 0.4;
        let b = 2.0;
        let d3 = TaylorFunction::Sin.derivative_at(3, a, b).expect("sin");
        assert!((d3 + 8.0 * (b * a).cos()).abs() < 1e-12);
        let d1 = TaylorFunction::Cos.derivative_at(1, a, b).expect("cos");
        assert!((d1 + 2.0 * (b * a).sin()).abs() < 1e-12);
        assert_eq!(TaylorFunction::Log1p.derivative_at(4, 0.0, 1.0), Some(-6.0));
        assert!(TaylorFunction::Log1p.derivative_at(1, 0.5, 1.0).is_none());
    }

    #[test]
    fn exp_polynomial_converges() {
        let poly = TaylorPolynomial::new(TaylorFunction::Exp, 0.0, 1.0, MAX_ORDER).expect("poly");
        assert!((poly.evaluate(1.0) - 1.0_f64.exp()).abs() < 1e-10);
        assert!((poly.coefficients[3] - 1.0 / 6.0).abs() < 1e-15);
        let values = poly.partial_values(1.0);
        assert_eq!(values.len(), MAX_ORDER + 1);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[1], 2.0);
        assert!((values[MAX_ORDER] - poly.evaluate(1.0)).abs() < 1e-12);
    }

    #[test]
    fn off_centre_expansion() {
        let poly = TaylorPolynomial::new(TaylorFunction::Sin, 1.0, 1.0, 9).expect("poly");
        assert!((poly.evaluate(1.3) - 1.3_f64.sin()).abs() < 1e-10);
        assert_eq!(poly.order(), 9);
    }

    #[test]
    fn rejects_bad_requests() {
        let err = TaylorPolynomial::new(TaylorFunction::Exp, 0.0, 1.0, 16).expect_err("too high");
        assert!(format!("{err}").contains("maximum"));
        let err = TaylorPolynomial::new(TaylorFunction::Log1p, 1.0, 1.0, 3).expect_err("off centre");
        assert!(format!("{err}").contains("a = 0"));
        assert!(TaylorFunction::Log1p.eval(-2.0, 1.0).is_nan());
    }

    #[test]
    fn fractions() {
        assert_eq!(to_fraction(1.0 / 6.0, 1e-9, 100), Some((1, 6)));
        assert_eq!(to_fraction(-0.5, 1e-9, 100), Some((-1, 2)));
        assert_eq!(to_fraction(3.0, 1e-9, 100), Some((3, 1)));
        assert_eq!(to_fraction(1.0 / 5040.0, 1e-9, 100), None);
        assert_eq!(to_fraction(f64::NAN, 1e-9, 100), None);
    }

    #[test]
    fn factorial_values() {
        assert_eq!(factorial(0), 1.0);
        assert_eq!(factorial(5), 120.0);
    }
}
