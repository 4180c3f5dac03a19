//! Canvas state for one visualizer page.

use crate::{js_error, to_js};
use mathviz_core::render::{DrawCommand, Scene, Sketch};
use mathviz_core::settings::VizSettings;
use mathviz_core::traits::Vec2;
use mathviz_core::viewport::Viewport;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmSketch {
    sketch: Sketch,
}

fn parse_scene(scene_val: JsValue) -> Result<Scene, JsValue> {
    from_value(scene_val).map_err(|e| JsValue::from_str(&format!("Invalid scene: {}", e)))
}

fn parse_viewport(viewport_val: JsValue) -> Result<Viewport, JsValue> {
    from_value(viewport_val).map_err(|e| JsValue::from_str(&format!("Invalid viewport: {}", e)))
}

/// Missing settings mean defaults.
pub(crate) fn parse_settings(settings_val: JsValue) -> Result<VizSettings, JsValue> {
    if settings_val.is_undefined() || settings_val.is_null() {
        return Ok(VizSettings::default());
    }
    let settings: VizSettings = from_value(settings_val)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {}", e)))?;
    settings.validate().map_err(js_error)?;
    Ok(settings)
}

#[wasm_bindgen]
impl WasmSketch {
    #[wasm_bindgen(constructor)]
    pub fn new(
        scene_val: JsValue,
        viewport_val: JsValue,
        settings_val: JsValue,
    ) -> Result<WasmSketch, JsValue> {
        console_error_panic_hook::set_once();

        let scene = parse_scene(scene_val)?;
        let viewport = parse_viewport(viewport_val)?;
        let settings = parse_settings(settings_val)?;
        Self::from_parts(scene, viewport, settings).map_err(js_error)
    }

    pub fn set_scene(&mut self, scene_val: JsValue) -> Result<(), JsValue> {
        self.sketch.set_scene(parse_scene(scene_val)?);
        Ok(())
    }

    pub fn set_viewport(&mut self, viewport_val: JsValue) -> Result<(), JsValue> {
        let viewport = parse_viewport(viewport_val)?;
        self.sketch.set_viewport(viewport).map_err(js_error)
    }

    pub fn set_settings(&mut self, settings_val: JsValue) -> Result<(), JsValue> {
        let settings = parse_settings(settings_val)?;
        self.sketch.set_settings(settings).map_err(js_error)
    }

    /// Multiplies the zoom by `factor`, clamped to the configured limits.
    pub fn zoom(&mut self, factor: f64) {
        self.sketch.zoom(factor);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.sketch.pan(dx, dy);
    }

    pub fn reset_view(&mut self) {
        self.sketch.reset_view();
    }

    /// Draw commands for the current state, as an array of tagged objects.
    pub fn render(&self) -> Result<JsValue, JsValue> {
        let commands = self.commands().map_err(js_error)?;
        to_js(&commands)
    }

    /// `[x, y]` in math units for a pixel position.
    pub fn to_math(&self, sx: f64, sy: f64) -> Result<Vec<f64>, JsValue> {
        let p = self.sketch.to_math(Vec2::new(sx, sy)).map_err(js_error)?;
        Ok(vec![p.x, p.y])
    }

    pub fn to_screen(&self, x: f64, y: f64) -> Result<Vec<f64>, JsValue> {
        let s = self.sketch.to_screen(Vec2::new(x, y)).map_err(js_error)?;
        Ok(vec![s.x, s.y])
    }

    /// Index of the Bézier control point under the pointer, if any.
    pub fn hit_control_point(&self, sx: f64, sy: f64, radius_px: f64) -> Result<Option<u32>, JsValue> {
        let hit = self
            .sketch
            .hit_control_point(Vec2::new(sx, sy), radius_px)
            .map_err(js_error)?;
        Ok(hit.map(|i| i as u32))
    }

    pub fn move_control_point(&mut self, index: u32, sx: f64, sy: f64) -> Result<(), JsValue> {
        self.sketch
            .move_control_point(index as usize, Vec2::new(sx, sy))
            .map_err(js_error)
    }
}

impl WasmSketch {
    pub(crate) fn from_parts(
        scene: Scene,
        viewport: Viewport,
        settings: VizSettings,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            sketch: Sketch::new(scene, viewport, settings)?,
        })
    }

    pub(crate) fn commands(&self) -> anyhow::Result<Vec<DrawCommand>> {
        self.sketch.frame()
    }
}
