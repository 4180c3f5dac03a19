//! Stateful Newton iteration driven one click (or timer tick) at a time.

use crate::{js_error, to_js};
use mathviz_core::newton::{NewtonError, NewtonSession, NewtonStep, Preset, RootTarget};
use mathviz_core::render::NewtonTarget;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmNewtonSession {
    session: NewtonSession<Box<dyn RootTarget>>,
}

#[wasm_bindgen]
impl WasmNewtonSession {
    /// `target_val` is `{ kind: "preset", preset }` or `{ kind: "formula", source }`.
    #[wasm_bindgen(constructor)]
    pub fn new(target_val: JsValue, start: f64) -> Result<WasmNewtonSession, JsValue> {
        console_error_panic_hook::set_once();

        let target: NewtonTarget = from_value(target_val)
            .map_err(|e| JsValue::from_str(&format!("Invalid Newton target: {}", e)))?;
        Self::build(&target, start).map_err(js_error)
    }

    pub fn preset(name: &str, start: f64) -> Result<WasmNewtonSession, JsValue> {
        let preset: Preset = name.parse().map_err(js_error)?;
        Self::build(&NewtonTarget::Preset { preset }, start).map_err(js_error)
    }

    pub fn formula(source: &str, start: f64) -> Result<WasmNewtonSession, JsValue> {
        let target = NewtonTarget::Formula {
            source: source.to_string(),
        };
        Self::build(&target, start).map_err(js_error)
    }

    /// Takes one step and returns its log row.
    pub fn step(&mut self) -> Result<JsValue, JsValue> {
        let step = self.advance().map_err(js_error)?;
        to_js(&step)
    }

    pub fn history(&self) -> Result<JsValue, JsValue> {
        to_js(&self.session.history())
    }

    pub fn reset(&mut self, start: f64) {
        self.session.reset(start);
    }

    pub fn run(&mut self, max_steps: u32, tolerance: f64) -> Result<JsValue, JsValue> {
        let outcome = self
            .session
            .run(max_steps as usize, tolerance)
            .map_err(js_error)?;
        to_js(&outcome)
    }

    pub fn current(&self) -> f64 {
        self.session.current()
    }

    pub fn step_count(&self) -> u32 {
        self.session.step_count() as u32
    }

    pub fn preview_next(&self) -> Option<f64> {
        self.session.preview_next()
    }

    /// Distance to the known root, for presets only.
    pub fn error(&self) -> Option<f64> {
        self.session.error()
    }
}

impl WasmNewtonSession {
    pub(crate) fn build(target: &NewtonTarget, start: f64) -> anyhow::Result<Self> {
        Ok(Self {
            session: NewtonSession::new(target.build()?, start),
        })
    }

    pub(crate) fn advance(&mut self) -> Result<NewtonStep, NewtonError> {
        self.session.step()
    }
}
