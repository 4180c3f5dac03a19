//! Stateless computations behind the pages' numeric readouts and tables.

use crate::sketch::parse_settings;
use crate::{js_error, to_js};
use mathviz_core::curves::{Curve, CurveId};
use mathviz_core::differentiate::{self, PartialSurface, TangentPlane};
use mathviz_core::integrate::{self, Integrand, RiemannRule};
use mathviz_core::linear::LinearMap;
use mathviz_core::motion::{Projectile, SpeedUnit};
use mathviz_core::series::{self, TaylorFunction, TaylorPolynomial, Waveform};
use mathviz_core::traits::{ParametricCurve, Vec2, Vec3};
use serde::{de::DeserializeOwned, Serialize};
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(value: JsValue, what: &str) -> Result<T, JsValue> {
    from_value(value).map_err(|e| JsValue::from_str(&format!("Invalid {}: {}", what, e)))
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CurveInfo {
    pub id: &'static str,
    pub formula: &'static str,
    pub domain: (f64, f64),
    pub defaults: Curve,
}

pub(crate) fn catalog() -> Vec<CurveInfo> {
    CurveId::ALL
        .iter()
        .map(|&id| {
            let curve = Curve::default_for(id);
            CurveInfo {
                id: id.as_str(),
                formula: curve.formula(),
                domain: curve.domain(),
                defaults: curve,
            }
        })
        .collect()
}

/// Every named curve with its formula, domain and default coefficients.
#[wasm_bindgen]
pub fn curve_catalog() -> Result<JsValue, JsValue> {
    to_js(&catalog())
}

#[wasm_bindgen]
pub fn frenet_frame(curve_val: JsValue, t: f64, settings_val: JsValue) -> Result<JsValue, JsValue> {
    let curve: Curve = parse(curve_val, "curve")?;
    curve.validate().map_err(js_error)?;
    let settings = parse_settings(settings_val)?;
    to_js(&differentiate::frenet_frame(&curve, t, &settings.sampling))
}

/// `rule` is `"left"`, `"right"` or `"mid"`.
#[wasm_bindgen]
pub fn riemann(integrand_val: JsValue, a: f64, b: f64, n: u32, rule_val: JsValue) -> Result<JsValue, JsValue> {
    let integrand: Integrand = parse(integrand_val, "integrand")?;
    let rule: RiemannRule = parse(rule_val, "rule")?;
    let report = integrate::report(&integrand, a, b, n as usize, rule).map_err(js_error)?;
    to_js(&report)
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PlaneReport {
    pub plane: TangentPlane,
    /// Patch drawn around the point, counter-clockwise.
    pub corners: [Vec3; 4],
    pub z_scale: f64,
}

/// Half-width of the drawn tangent patch.
const PATCH_HALF_WIDTH: f64 = 1.5;

pub(crate) fn plane_report(surface: PartialSurface, a: f64, b: f64, h: f64) -> PlaneReport {
    let plane = differentiate::tangent_plane(|x, y| surface.eval(x, y), a, b, h);
    PlaneReport {
        plane,
        corners: plane.corners(PATCH_HALF_WIDTH),
        z_scale: surface.z_scale(),
    }
}

/// Value, partial derivatives and tangent patch of a surface at `(a, b)`.
#[wasm_bindgen]
pub fn tangent_plane(surface_val: JsValue, a: f64, b: f64, settings_val: JsValue) -> Result<JsValue, JsValue> {
    let surface: PartialSurface = parse(surface_val, "surface")?;
    let settings = parse_settings(settings_val)?;
    to_js(&plane_report(surface, a, b, settings.sampling.derivative_step))
}

#[wasm_bindgen]
pub fn eigen(a: f64, b: f64, c: f64, d: f64) -> Result<JsValue, JsValue> {
    to_js(&LinearMap::new(a, b, c, d).eigen())
}

/// Matrix entries `[a, b, c, d]` whose columns are the dragged images of
/// the basis vectors.
#[wasm_bindgen]
pub fn basis_matrix(e1x: f64, e1y: f64, e2x: f64, e2y: f64) -> Vec<f64> {
    LinearMap::from_basis_images(Vec2::new(e1x, e1y), Vec2::new(e2x, e2y))
        .entries()
        .to_vec()
}

#[wasm_bindgen]
pub fn taylor(function_val: JsValue, center: f64, b: f64, order: u32) -> Result<JsValue, JsValue> {
    let function: TaylorFunction = parse(function_val, "function")?;
    let poly = TaylorPolynomial::new(function, center, b, order as usize).map_err(js_error)?;
    to_js(&poly)
}

#[wasm_bindgen]
pub fn harmonic_spectrum(waveform_val: JsValue, n: u32, samples: u32) -> Result<JsValue, JsValue> {
    let waveform: Waveform = parse(waveform_val, "waveform")?;
    let amplitudes =
        series::harmonic_amplitudes(waveform, n as usize, samples as usize).map_err(js_error)?;
    to_js(&amplitudes)
}

#[wasm_bindgen]
pub fn projectile_summary(speed: f64, unit_val: JsValue, theta_deg: f64, g: f64) -> Result<JsValue, JsValue> {
    let unit: SpeedUnit = if unit_val.is_undefined() {
        SpeedUnit::default()
    } else {
        parse(unit_val, "speed unit")?
    };
    let projectile = Projectile::from_input(speed, unit, theta_deg, g).map_err(js_error)?;
    to_js(&projectile.summary())
}
