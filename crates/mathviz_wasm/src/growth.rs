//! Money and doubling pages: interest tables, repayment plans and the
//! exponential-growth toys.

use crate::{js_error, to_js};
use mathviz_core::growth::{
    self, folded_thickness, landmark_reached, DoublingSeries, Landmark, RevolvingPlan,
    HEIGHT_LANDMARKS,
};
use serde::Serialize;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

/// `rate` is a fraction (`0.01` for 1%).
#[wasm_bindgen]
pub fn interest_schedule(principal: f64, rate: f64, years: u32, frequency: u32) -> Result<JsValue, JsValue> {
    let rows = growth::interest_schedule(principal, rate, years, frequency).map_err(js_error)?;
    to_js(&rows)
}

#[wasm_bindgen]
pub fn revolving_plan(plan_val: JsValue) -> Result<JsValue, JsValue> {
    let plan: RevolvingPlan = from_value(plan_val)
        .map_err(|e| JsValue::from_str(&format!("Invalid repayment plan: {}", e)))?;
    to_js(&plan.simulate())
}

/// Yearly, monthly, daily and continuous compounding of `a0` at rate `r`.
#[wasm_bindgen]
pub fn continuous_compounding(a0: f64, r: f64) -> Result<JsValue, JsValue> {
    to_js(&growth::continuous_compounding(a0, r))
}

/// `rate_percent` is in percent (`7` for 7%).
#[wasm_bindgen]
pub fn doubling_time(rate_percent: f64) -> Result<JsValue, JsValue> {
    let time = growth::rule_of_72(rate_percent).map_err(js_error)?;
    to_js(&time)
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FoldingReport {
    pub folds: u32,
    pub thickness: f64,
    pub landmark: Option<Landmark>,
}

pub(crate) fn folding_report(folds: u32) -> FoldingReport {
    let thickness = folded_thickness(folds);
    FoldingReport {
        folds,
        thickness,
        landmark: landmark_reached(&HEIGHT_LANDMARKS, thickness).copied(),
    }
}

/// Stack height after `folds` folds and the tallest landmark it passes.
#[wasm_bindgen]
pub fn paper_folding(folds: u32) -> Result<JsValue, JsValue> {
    to_js(&folding_report(folds))
}

/// Fewest folds to reach `distance` metres (42 for the Moon).
#[wasm_bindgen]
pub fn folds_to_reach(distance: f64) -> Result<u32, JsValue> {
    growth::folds_to_reach(distance).map_err(js_error)
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct DoublingSnapshot {
    pub doublings: u32,
    pub minutes: u32,
    pub count: f64,
    pub volume: f64,
    pub finished: bool,
    pub landmark: Option<Landmark>,
}

/// The self-doubling snack, advanced one doubling per tick.
#[wasm_bindgen]
pub struct WasmDoublingSeries {
    series: DoublingSeries,
}

#[wasm_bindgen]
impl WasmDoublingSeries {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmDoublingSeries {
        console_error_panic_hook::set_once();
        WasmDoublingSeries {
            series: DoublingSeries::new(),
        }
    }

    /// Returns `false` once the pile has outgrown the observable universe.
    pub fn step(&mut self) -> bool {
        self.series.step()
    }

    pub fn reset(&mut self) {
        self.series = DoublingSeries::new();
    }

    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js(&self.current())
    }
}

impl Default for WasmDoublingSeries {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmDoublingSeries {
    pub(crate) fn current(&self) -> DoublingSnapshot {
        let s = &self.series;
        DoublingSnapshot {
            doublings: s.doublings,
            minutes: s.minutes(),
            count: s.count(),
            volume: s.volume(),
            finished: s.is_finished(),
            landmark: s.landmark().copied(),
        }
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn rejects_zero_compounding_frequency() {
        let message = interest_schedule(100.0, 0.01, 20, 0)
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("at least once a year"));
    }

    #[wasm_bindgen_test]
    fn doubling_time_needs_positive_rate() {
        assert!(doubling_time(0.0).is_err());
        assert_eq!(folds_to_reach(3.8e8).ok(), Some(42));
    }
}
