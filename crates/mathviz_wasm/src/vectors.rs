//! Dot-product demos: mirror reflection, a guard's view cone and the
//! back-attack arc.

use crate::to_js;
use mathviz_core::traits::{Vec2, Vec3};
use mathviz_core::vectors::{reflect, BackArc, FieldOfView};
use serde::de::DeserializeOwned;
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

/// Missing shapes mean the page defaults.
fn parse_or_default<T: DeserializeOwned + Default>(value: JsValue, what: &str) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

/// Reflects the ray `u` in the plane with normal `h`.
#[wasm_bindgen]
pub fn reflect_ray(u: Vec<f64>, h: Vec<f64>) -> Result<JsValue, JsValue> {
    let (u, h) = (vec3(&u, "u")?, vec3(&h, "h")?);
    to_js(&reflect(u, h))
}

fn vec3(values: &[f64], name: &str) -> Result<Vec3, JsValue> {
    match values {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(JsValue::from_str(&format!(
            "Invalid {}: expected 3 components, got {}.",
            name,
            values.len()
        ))),
    }
}

#[wasm_bindgen]
pub fn view_cone(fov_val: JsValue, observer_x: f64, observer_y: f64, target_x: f64, target_y: f64) -> Result<JsValue, JsValue> {
    let fov: FieldOfView = parse_or_default(fov_val, "view cone")?;
    to_js(&fov.detect(
        Vec2::new(observer_x, observer_y),
        Vec2::new(target_x, target_y),
    ))
}

#[wasm_bindgen]
pub fn back_attack(arc_val: JsValue, enemy_x: f64, enemy_y: f64, attacker_x: f64, attacker_y: f64) -> Result<JsValue, JsValue> {
    let arc: BackArc = parse_or_default(arc_val, "back arc")?;
    to_js(&arc.check(
        Vec2::new(enemy_x, enemy_y),
        Vec2::new(attacker_x, attacker_y),
    ))
}
