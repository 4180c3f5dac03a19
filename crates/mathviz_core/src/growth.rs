//! Exponential growth in money and in toys: simple against compound
//! interest, revolving credit repayment, a self-doubling snack and a sheet
//! of paper folded until it reaches the Moon.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const MAX_YEARS: u32 = 1000;
/// Longest repayment a plan simulates, whatever `max_months` asks for.
pub const MAX_MONTHS: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterestRow {
    pub year: u32,
    pub simple_total: f64,
    pub compound_total: f64,
    /// Interest earned during this year.
    pub simple_interest: f64,
    pub compound_interest: f64,
}

/// Year-by-year balances for simple interest and for interest compounded
/// `frequency` times a year. `rate` is a fraction (`0.01` for 1%). Row 0 is
/// the deposit itself.
pub fn interest_schedule(principal: f64, rate: f64, years: u32, frequency: u32) -> Result<Vec<InterestRow>> {
    if frequency == 0 {
        bail!("Compounding frequency must be at least once a year.");
    }
    if years > MAX_YEARS {
        bail!("Schedules are limited to {} years, got {}.", MAX_YEARS, years);
    }
    if !principal.is_finite() || !rate.is_finite() {
        bail!("Principal and rate must be finite numbers.");
    }

    let mut rows = Vec::with_capacity(years as usize + 1);
    rows.push(InterestRow {
        year: 0,
        simple_total: principal,
        compound_total: principal,
        simple_interest: 0.0,
        compound_interest: 0.0,
    });

    let simple_interest = principal * rate;
    let yearly_factor = (1.0 + rate / frequency as f64).powi(frequency as i32);
    let (mut simple_total, mut compound_total) = (principal, principal);
    for year in 1..=years {
        simple_total += simple_interest;
        let previous = compound_total;
        compound_total = previous * yearly_factor;
        rows.push(InterestRow {
            year,
            simple_total,
            compound_total,
            simple_interest,
            compound_interest: compound_total - previous,
        });
    }
    Ok(rows)
}

/// One year of growth at rate `r` for increasingly frequent compounding,
/// with the continuous limit `a0 e^r`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContinuousComparison {
    pub yearly: f64,
    pub monthly: f64,
    pub daily: f64,
    pub continuous: f64,
}

pub fn continuous_compounding(a0: f64, r: f64) -> ContinuousComparison {
    let after = |n: f64| a0 * (1.0 + r / n).powf(n);
    ContinuousComparison {
        yearly: after(1.0),
        monthly: after(12.0),
        daily: after(365.0),
        continuous: a0 * r.exp(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoublingTime {
    pub rule_of_72: f64,
    pub rule_of_70: f64,
    /// `ln 2 / ln(1 + r/100)`.
    pub exact: f64,
}

/// Years for a deposit to double at `rate_percent` per year.
pub fn rule_of_72(rate_percent: f64) -> Result<DoublingTime> {
    if !(rate_percent > 0.0) || !rate_percent.is_finite() {
        bail!("Doubling time needs a positive interest rate.");
    }
    Ok(DoublingTime {
        rule_of_72: 72.0 / rate_percent,
        rule_of_70: 70.0 / rate_percent,
        exact: std::f64::consts::LN_2 / (1.0 + rate_percent / 100.0).ln(),
    })
}

/// Revolving credit: a fixed monthly payment against a balance that accrues
/// monthly interest and keeps growing by new spending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevolvingPlan {
    pub debt: f64,
    /// Annual percentage rate, as a fraction.
    pub apr: f64,
    pub payment: f64,
    /// New purchases added at the end of every month.
    pub additional_spending: f64,
    pub max_months: u32,
}

impl Default for RevolvingPlan {
    fn default() -> Self {
        Self {
            debt: 500_000.0,
            apr: 0.15,
            payment: 10_000.0,
            additional_spending: 0.0,
            max_months: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepaymentRow {
    pub month: u32,
    pub payment: f64,
    pub interest: f64,
    /// `payment - interest`; negative when the payment does not even cover
    /// the interest.
    pub principal: f64,
    pub additional: f64,
    pub balance: f64,
    /// The principal repaid does not outpace new spending.
    pub danger: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentOutcome {
    pub rows: Vec<RepaymentRow>,
    pub months: u32,
    pub total_interest: f64,
    pub final_balance: f64,
    pub completed: bool,
}

impl RevolvingPlan {
    pub fn simulate(&self) -> RepaymentOutcome {
        let mut rows = Vec::new();
        let mut balance = self.debt;
        let mut total_interest = 0.0;
        let mut month = 0;
        let mut completed = false;
        let max_months = self.max_months.min(MAX_MONTHS);

        while month < max_months && balance > 0.0 {
            month += 1;
            let interest = balance * self.apr / 12.0;
            total_interest += interest;
            let principal = self.payment - interest;
            balance = balance - principal + self.additional_spending;
            let danger = principal <= self.additional_spending;
            if balance <= 0.0 {
                balance = 0.0;
                completed = true;
            }
            rows.push(RepaymentRow {
                month,
                payment: self.payment,
                interest,
                principal,
                additional: self.additional_spending,
                balance,
                danger: danger && !completed,
            });
        }

        debug!(months = month, completed, total_interest, "revolving plan simulated");
        RepaymentOutcome {
            rows,
            months: month,
            total_interest,
            final_balance: balance,
            completed,
        }
    }
}

/// A named landmark that a growing quantity is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Landmark {
    pub name: &'static str,
    /// Volume in m³ or distance in m, depending on the table.
    pub size: f64,
}

pub const VOLUME_LANDMARKS: [Landmark; 7] = [
    Landmark { name: "Tokyo Dome", size: 1.24e9 },
    Landmark { name: "Lake Biwa", size: 2.75e13 },
    Landmark { name: "Earth", size: 1.08e21 },
    Landmark { name: "Sun", size: 1.41e27 },
    Landmark { name: "Solar system (to the Oort cloud)", size: 3.3e45 },
    Landmark { name: "Milky Way", size: 1e63 },
    Landmark { name: "Observable universe", size: 4e80 },
];

pub const PAPER_THICKNESS: f64 = 1e-4;
pub const DISTANCE_TO_MOON: f64 = 3.8e8;

pub const HEIGHT_LANDMARKS: [Landmark; 5] = [
    Landmark { name: "One sheet of paper", size: 0.0 },
    Landmark { name: "Top of Tokyo Skytree", size: 634.0 },
    Landmark { name: "Summit of Everest", size: 8848.0 },
    Landmark { name: "Stratosphere", size: 50_000.0 },
    Landmark { name: "Moon", size: DISTANCE_TO_MOON },
];

/// Largest landmark not exceeding `size`, if any.
pub fn landmark_reached(table: &[Landmark], size: f64) -> Option<&Landmark> {
    table.iter().rev().find(|l| size >= l.size)
}

/// A snack that doubles every five minutes, starting from one piece of
/// 1e-4 m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoublingSeries {
    pub doublings: u32,
}

impl DoublingSeries {
    pub const INITIAL_VOLUME: f64 = 1e-4;
    pub const MINUTES_PER_DOUBLING: u32 = 5;
    /// Doublings after which the pile outgrows the observable universe.
    pub const FINAL_DOUBLINGS: u32 = 282;

    pub fn new() -> Self {
        Self { doublings: 0 }
    }

    pub fn minutes(&self) -> u32 {
        self.doublings * Self::MINUTES_PER_DOUBLING
    }

    /// Number of pieces, `2^n`, as a float (exact for every reachable `n`).
    pub fn count(&self) -> f64 {
        2f64.powi(self.doublings as i32)
    }

    pub fn volume(&self) -> f64 {
        Self::INITIAL_VOLUME * self.count()
    }

    pub fn is_finished(&self) -> bool {
        self.doublings >= Self::FINAL_DOUBLINGS
    }

    /// Advances one doubling; returns `false` once the series has finished.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.doublings += 1;
        true
    }

    pub fn landmark(&self) -> Option<&'static Landmark> {
        landmark_reached(&VOLUME_LANDMARKS, self.volume())
    }
}

impl Default for DoublingSeries {
    fn default() -> Self {
        Self::new()
    }
}

/// Thickness after folding a sheet of paper `folds` times.
pub fn folded_thickness(folds: u32) -> f64 {
    PAPER_THICKNESS * 2f64.powi(folds as i32)
}

/// Fewest folds for the stack to reach `distance` metres.
pub fn folds_to_reach(distance: f64) -> Result<u32> {
    if !distance.is_finite() {
        bail!("Distance must be finite.");
    }
    let mut folds = 0;
    let mut thickness = PAPER_THICKNESS;
    while thickness < distance {
        folds += 1;
        thickness *= 2.0;
    }
    Ok(folds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_horizons_are_bounded() {
        assert!(interest_schedule(100.0, 0.01, u32::MAX, 1).is_err());
        let outcome = RevolvingPlan {
            payment: 0.0,
            max_months: u32::MAX,
            ..RevolvingPlan::default()
        }
        .simulate();
        assert_eq!(outcome.months, MAX_MONTHS);
        assert_eq!(outcome.rows.len(), MAX_MONTHS as usize);
        assert!(!outcome.completed);
    }

    #[test]
    fn one_percent_for_twenty_years() {
        let rows = interest_schedule(100.0, 0.01, 20, 1).expect("schedule");
        assert_eq!(rows.len(), 21);
        assert_eq!(rows[0].compound_interest, 0.0);
        let last = rows[20];
        assert!((last.simple_total - 120.0).abs() < 1e-9);
        assert!((last.compound_total - 100.0 * 1.01_f64.powi(20)).abs() < 1e-9);
        assert!(last.compound_interest > last.simple_interest);
    }

    #[test]
    fn more_frequent_compounding_grows_faster() {
        let yearly = interest_schedule(100.0, 0.05, 10, 1).expect("yearly");
        let monthly = interest_schedule(100.0, 0.05, 10, 12).expect("monthly");
        assert!(monthly[10].compound_total > yearly[10].compound_total);
        assert_eq!(monthly[10].simple_total, yearly[10].simple_total);
        assert!(interest_schedule(100.0, 0.05, 10, 0).is_err());
    }

    #[test]
    fn continuous_limit_bounds_discrete_compounding() {
        let c = continuous_compounding(1.0, 1.0);
        assert_eq!(c.yearly, 2.0);
        assert!(c.yearly < c.monthly && c.monthly < c.daily && c.daily < c.continuous);
        assert!((c.continuous - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn doubling_time_rules() {
        let d = rule_of_72(1.0).expect("positive rate");
        assert_eq!(d.rule_of_72, 72.0);
        assert_eq!(d.rule_of_70, 70.0);
        assert!((d.exact - 69.66).abs() < 0.01);
        assert!(rule_of_72(0.0).is_err());
    }

    #[test]
    fn revolving_plan_pays_off() {
        let outcome = RevolvingPlan {
            debt: 100_000.0,
            apr: 0.12,
            payment: 10_000.0,
            additional_spending: 0.0,
            max_months: 120,
        }
        .simulate();
        assert!(outcome.completed);
        assert_eq!(outcome.final_balance, 0.0);
        assert_eq!(outcome.rows.len() as u32, outcome.months);
        assert!((outcome.rows[0].interest - 1000.0).abs() < 1e-9);
        assert!((outcome.rows[0].principal - 9000.0).abs() < 1e-9);
        assert!(outcome.rows.iter().all(|r| !r.danger));
    }

    #[test]
    fn revolving_plan_flags_danger_when_spending_outpaces_repayment() {
        let outcome = RevolvingPlan {
            debt: 500_000.0,
            apr: 0.15,
            payment: 10_000.0,
            additional_spending: 5_000.0,
            max_months: 24,
        }
        .simulate();
        assert!(!outcome.completed);
        assert_eq!(outcome.months, 24);
        assert!(outcome.rows[0].danger);
        assert!(outcome.final_balance > 500_000.0);
    }

    #[test]
    fn zero_debt_needs_no_months() {
        let outcome = RevolvingPlan {
            debt: 0.0,
            ..RevolvingPlan::default()
        }
        .simulate();
        assert_eq!(outcome.months, 0);
        assert!(outcome.rows.is_empty());
        assert!(!outcome.completed);
    }

    #[test]
    fn doubling_series_stops_past_the_universe() {
        let mut series = DoublingSeries::new();
        assert!(series.landmark().is_none());
        while series.step() {}
        assert_eq!(series.doublings, DoublingSeries::FINAL_DOUBLINGS);
        assert_eq!(series.minutes(), 1410);
        assert_eq!(series.landmark().map(|l| l.name), Some("Observable universe"));
        assert!(!series.step());
    }

    #[test]
    fn paper_reaches_the_moon_in_42_folds() {
        assert_eq!(folds_to_reach(DISTANCE_TO_MOON).expect("finite"), 42);
        assert_eq!(folds_to_reach(0.0).expect("finite"), 0);
        assert!(folded_thickness(42) >= DISTANCE_TO_MOON);
        assert!(folded_thickness(41) < DISTANCE_TO_MOON);
        assert_eq!(landmark_reached(&HEIGHT_LANDMARKS, 1000.0).map(|l| l.name), Some("Top of Tokyo Skytree"));
    }
}
