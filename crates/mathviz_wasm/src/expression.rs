//! User-typed formulas for the pages with a free-form function input.

use crate::js_error;
use js_sys::Float64Array;
use mathviz_core::equation_engine::Expression;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmExpression {
    expression: Expression,
}

#[wasm_bindgen]
impl WasmExpression {
    /// Compiles `source` as a function of the single variable `var`.
    #[wasm_bindgen(constructor)]
    pub fn new(source: &str, var: &str) -> Result<WasmExpression, JsValue> {
        console_error_panic_hook::set_once();

        let expression = Expression::univariate(source, var)
            .map_err(|e| JsValue::from_str(&format!("Invalid formula: {}", e)))?;
        Ok(WasmExpression { expression })
    }

    /// A formula with named parameters that sliders can change later.
    pub fn with_params(
        source: &str,
        var: &str,
        param_names: Vec<String>,
        params: Vec<f64>,
    ) -> Result<WasmExpression, JsValue> {
        let expression = Expression::compile(source, &[var.to_string()], &param_names, params)
            .map_err(|e| JsValue::from_str(&format!("Invalid formula: {}", e)))?;
        Ok(WasmExpression { expression })
    }

    pub fn set_param(&mut self, name: &str, value: f64) -> Result<(), JsValue> {
        self.expression.set_param(name, value).map_err(js_error)
    }

    pub fn source(&self) -> String {
        self.expression.source.clone()
    }

    pub fn eval(&self, x: f64) -> f64 {
        self.expression.eval1(x)
    }

    /// Exact derivative by forward-mode automatic differentiation.
    pub fn derivative(&self, x: f64) -> f64 {
        self.expression.derivative(x)
    }

    /// `steps + 1` points over `[x_min, x_max]`, flattened as
    /// `[x0, y0, x1, y1, ...]`. Points where the formula is undefined come
    /// back as `NaN`.
    pub fn sample(&self, x_min: f64, x_max: f64, steps: u32) -> Float64Array {
        Float64Array::from(self.sample_points(x_min, x_max, steps).as_slice())
    }
}

impl WasmExpression {
    pub(crate) fn sample_points(&self, x_min: f64, x_max: f64, steps: u32) -> Vec<f64> {
        let steps = steps.max(1);
        let dx = (x_max - x_min) / steps as f64;
        (0..=steps)
            .flat_map(|i| {
                let x = x_min + i as f64 * dx;
                [x, self.expression.eval1(x)]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_and_differentiates() {
        let expr = WasmExpression::new("sin(x) * x", "x").expect("formula");
        let x = 1.3;
        assert!((expr.eval(x) - x.sin() * x).abs() < 1e-12);
        assert!((expr.derivative(x) - (x.cos() * x + x.sin())).abs() < 1e-12);
        assert_eq!(expr.source(), "sin(x) * x");
    }

    #[test]
    fn sample_is_flattened_and_keeps_gaps() {
        let expr = WasmExpression::new("sqrt(x)", "x").expect("formula");
        let samples = expr.sample_points(-1.0, 1.0, 4);
        assert_eq!(samples.len(), 10);
        assert_eq!(samples[0], -1.0);
        assert!(samples[1].is_nan());
        assert_eq!(samples[8], 1.0);
        assert!((samples[9] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn parameters_can_be_updated() {
        let mut expr = WasmExpression::with_params("a * x^2", "x", vec!["a".to_string()], vec![2.0])
            .expect("formula");
        assert!((expr.eval(3.0) - 18.0).abs() < 1e-12);
        expr.set_param("a", 0.5).expect("known parameter");
        assert!((expr.derivative(2.0) - 2.0).abs() < 1e-12);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn rejects_unknown_function() {
        let message = WasmExpression::new("foo(x)", "x")
            .err()
            .and_then(|err| err.as_string())
            .unwrap_or_default();
        assert!(message.contains("Invalid formula"), "{message}");
    }

    #[wasm_bindgen_test]
    fn sample_fills_a_typed_array() {
        let expr = WasmExpression::new("x^2", "x").expect("formula");
        let samples = expr.sample(0.0, 2.0, 2).to_vec();
        assert_eq!(samples, vec![0.0, 0.0, 1.0, 1.0, 2.0, 4.0]);
    }
}
