//! Step-by-step Newton's method with an append-only iteration log.

use crate::equation_engine::{Expression, ExpressionError};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NewtonError {
    #[error("Slope is too close to zero at x = {x} (f'(x) = {slope}); cannot continue.")]
    FlatSlope { x: f64, slope: f64 },
    #[error("Iteration produced a non-finite value at x = {x}.")]
    NonFinite { x: f64 },
    #[error("Iteration log is full ({limit} steps); reset to continue.")]
    HistoryFull { limit: usize },
}

/// A function whose root Newton's method is looking for.
pub trait RootTarget {
    fn value(&self, x: f64) -> f64;
    fn slope(&self, x: f64) -> f64;

    /// Known root, shown next to the iterates for comparison.
    fn true_root(&self) -> Option<f64> {
        None
    }
}

impl<T: RootTarget + ?Sized> RootTarget for Box<T> {
    fn value(&self, x: f64) -> f64 {
        (**self).value(x)
    }

    fn slope(&self, x: f64) -> f64 {
        (**self).slope(x)
    }

    fn true_root(&self) -> Option<f64> {
        (**self).true_root()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// `x² − 2`
    #[default]
    Sqrt2,
    /// `x² − 3`
    Sqrt3,
    /// `sin x`, converging to π from the default start.
    Sin,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Sqrt2, Preset::Sqrt3, Preset::Sin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Sqrt2 => "sqrt2",
            Preset::Sqrt3 => "sqrt3",
            Preset::Sin => "sin",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Preset::Sqrt2 => "f(x) = x^2 - 2",
            Preset::Sqrt3 => "f(x) = x^2 - 3",
            Preset::Sin => "f(x) = sin(x)",
        }
    }

    pub fn default_start(&self) -> f64 {
        2.0
    }

    pub fn x_range(&self) -> (f64, f64) {
        match self {
            Preset::Sqrt2 => (-0.5, 3.5),
            Preset::Sqrt3 => (-0.5, 4.0),
            Preset::Sin => (0.0, 7.0),
        }
    }

    pub fn y_range(&self) -> (f64, f64) {
        match self {
            Preset::Sqrt2 => (-3.0, 8.0),
            Preset::Sqrt3 => (-4.0, 10.0),
            Preset::Sin => (-2.0, 2.0),
        }
    }
}

impl FromStr for Preset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| anyhow!("Unknown Newton preset '{}'.", s))
    }
}

impl RootTarget for Preset {
    fn value(&self, x: f64) -> f64 {
        match self {
            Preset::Sqrt2 => x * x - 2.0,
            Preset::Sqrt3 => x * x - 3.0,
            Preset::Sin => x.sin(),
        }
    }

    fn slope(&self, x: f64) -> f64 {
        match self {
            Preset::Sqrt2 | Preset::Sqrt3 => 2.0 * x,
            Preset::Sin => x.cos(),
        }
    }

    fn true_root(&self) -> Option<f64> {
        Some(match self {
            Preset::Sqrt2 => 2.0_f64.sqrt(),
            Preset::Sqrt3 => 3.0_f64.sqrt(),
            Preset::Sin => PI,
        })
    }
}

/// A user-typed formula in `x`, differentiated exactly with dual numbers.
#[derive(Debug)]
pub struct ExpressionTarget {
    expression: Expression,
}

impl ExpressionTarget {
    pub fn new(source: &str) -> Result<Self, ExpressionError> {
        Ok(Self {
            expression: Expression::univariate(source, "x")?,
        })
    }

    pub fn source(&self) -> &str {
        &self.expression.source
    }
}

impl RootTarget for ExpressionTarget {
    fn value(&self, x: f64) -> f64 {
        self.expression.eval1(x)
    }

    fn slope(&self, x: f64) -> f64 {
        self.expression.derivative(x)
    }
}

/// Default length of the iteration log.
pub const MAX_STEPS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonSettings {
    /// `|f'(x)|` below this stops the iteration.
    pub flat_slope_epsilon: f64,
    /// Longest iteration log a session keeps before refusing to step.
    pub max_history: usize,
}

impl Default for NewtonSettings {
    fn default() -> Self {
        Self {
            flat_slope_epsilon: 1e-12,
            max_history: MAX_STEPS,
        }
    }
}

/// One row of the iteration log: the point visited and where its tangent
/// meets the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewtonStep {
    pub n: usize,
    pub x: f64,
    pub y: f64,
    pub slope: f64,
    pub next_x: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub steps: usize,
    pub converged: bool,
    pub x: f64,
}

pub struct NewtonSession<T: RootTarget> {
    target: T,
    settings: NewtonSettings,
    start: f64,
    current: f64,
    history: Vec<NewtonStep>,
}

impl<T: RootTarget> NewtonSession<T> {
    pub fn new(target: T, start: f64) -> Self {
        Self::with_settings(target, start, NewtonSettings::default())
    }

    pub fn with_settings(target: T, start: f64, settings: NewtonSettings) -> Self {
        Self {
            target,
            settings,
            start,
            current: start,
            history: Vec::new(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn current_value(&self) -> f64 {
        self.target.value(self.current)
    }

    pub fn step_count(&self) -> usize {
        self.history.len()
    }

    pub fn history(&self) -> &[NewtonStep] {
        &self.history
    }

    /// Where the next step would land, without taking it.
    pub fn preview_next(&self) -> Option<f64> {
        let slope = self.target.slope(self.current);
        if !(slope.abs() > self.settings.flat_slope_epsilon) {
            return None;
        }
        let next = self.current - self.target.value(self.current) / slope;
        next.is_finite().then_some(next)
    }

    /// `x_{n+1} = x_n − f(x_n) / f'(x_n)`. On error the session is unchanged.
    pub fn step(&mut self) -> Result<NewtonStep, NewtonError> {
        if self.history.len() >= self.settings.max_history {
            return Err(NewtonError::HistoryFull {
                limit: self.settings.max_history,
            });
        }
        let x = self.current;
        let y = self.target.value(x);
        let slope = self.target.slope(x);

        if !y.is_finite() || !slope.is_finite() {
            return Err(NewtonError::NonFinite { x });
        }
        if slope.abs() < self.settings.flat_slope_epsilon {
            return Err(NewtonError::FlatSlope { x, slope });
        }
        let next_x = x - y / slope;
        if !next_x.is_finite() {
            return Err(NewtonError::NonFinite { x });
        }

        let step = NewtonStep {
            n: self.history.len(),
            x,
            y,
            slope,
            next_x,
        };
        debug!(n = step.n, x, y, slope, next_x, "Newton step");
        self.history.push(step);
        self.current = next_x;
        Ok(step)
    }

    /// Clears the log and restarts from `start`.
    pub fn reset(&mut self, start: f64) {
        self.start = start;
        self.current = start;
        self.history.clear();
    }

    /// Steps until `|f(x)| < tolerance` or `max_steps` steps were taken.
    pub fn run(&mut self, max_steps: usize, tolerance: f64) -> Result<RunOutcome, NewtonError> {
        let mut taken = 0;
        while taken < max_steps {
            if self.current_value().abs() < tolerance {
                break;
            }
            self.step()?;
            taken += 1;
        }
        Ok(RunOutcome {
            steps: taken,
            converged: self.current_value().abs() < tolerance,
            x: self.current,
        })
    }

    /// Distance of the current iterate from the known root, if any.
    pub fn error(&self) -> Option<f64> {
        self.target.true_root().map(|root| (self.current - root).abs())
    }
}
