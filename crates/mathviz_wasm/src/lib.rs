//! WASM bridge exposing the mathviz core to the visualizer pages.
//!
//! Scenes, viewports and settings cross the boundary as plain JS objects
//! (serde-wasm-bindgen); every error reaches JS as a message string.

use std::fmt::Display;
use wasm_bindgen::prelude::*;

mod analysis;
mod expression;
mod growth;
mod newton;
mod sketch;
mod vectors;

pub use analysis::{
    basis_matrix, curve_catalog, eigen, frenet_frame, harmonic_spectrum, projectile_summary,
    riemann, tangent_plane, taylor,
};
pub use expression::WasmExpression;
pub use growth::{
    continuous_compounding, doubling_time, folds_to_reach, interest_schedule, paper_folding,
    revolving_plan, WasmDoublingSeries,
};
pub use newton::WasmNewtonSession;
pub use sketch::WasmSketch;
pub use vectors::{back_attack, reflect_ray, view_cone};

pub(crate) fn js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

pub(crate) fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
