//! Pure frame rendering: a [`Scene`] (the immutable parameters of one demo
//! page) plus a [`Viewport`] become an ordered list of [`DrawCommand`]s in
//! screen pixels. Painting them is the host's job.

use crate::bezier::BezierCurve;
use crate::curves::{sample_curve, sine_period, sine_points, wrap_parameter, Curve};
use crate::differentiate::{frenet_frame, tangent_plane, PartialSurface};
use crate::integrate::{
    cross_section, riemann_sum, slice_area, Integrand, Region, RiemannRule, SliceAxis, Surface,
    MAX_RECTANGLES,
};
use crate::linear::{polar_degrees, Eigen2, LinearMap, MAX_GRID_RANGE};
use crate::motion::{MotionModel, Projectile};
use crate::newton::{self, ExpressionTarget, NewtonSession, Preset, RootTarget};
use crate::series::{self, TaylorFunction, TaylorPolynomial, Waveform};
use crate::settings::VizSettings;
use crate::traits::Vec2;
use crate::viewport::{ticks, ViewState, Viewport};
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(150, 150, 150);
    pub const LIGHT_GRAY: Color = Color::rgb(225, 225, 225);
    pub const RED: Color = Color::rgb(229, 57, 53);
    pub const BLUE: Color = Color::rgb(30, 136, 229);
    pub const GREEN: Color = Color::rgb(67, 160, 71);
    pub const ORANGE: Color = Color::rgb(251, 140, 0);
    pub const PURPLE: Color = Color::rgb(142, 36, 170);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub weight: f64,
}

impl Style {
    pub const fn stroke(color: Color, weight: f64) -> Self {
        Self {
            stroke: Some(color),
            fill: None,
            weight,
        }
    }

    pub const fn fill(color: Color) -> Self {
        Self {
            stroke: None,
            fill: Some(color),
            weight: 0.0,
        }
    }

    pub const fn with_fill(self, color: Color) -> Self {
        Self {
            fill: Some(color),
            ..self
        }
    }
}

/// One immediate-mode primitive. Coordinates and radii are in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Line { from: Vec2, to: Vec2, style: Style },
    Polyline { points: Vec<Vec2>, style: Style },
    Circle { center: Vec2, radius: f64, style: Style },
    Polygon { points: Vec<Vec2>, style: Style },
    /// Line with a head at `to`.
    Arrow { from: Vec2, to: Vec2, style: Style },
    Text { position: Vec2, text: String, style: Style },
}

/// Target of a Newton's-method scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NewtonTarget {
    Preset { preset: Preset },
    Formula { source: String },
}

impl Default for NewtonTarget {
    fn default() -> Self {
        NewtonTarget::Preset {
            preset: Preset::default(),
        }
    }
}

impl NewtonTarget {
    pub fn build(&self) -> Result<Box<dyn RootTarget>> {
        let target: Box<dyn RootTarget> = match self {
            NewtonTarget::Preset { preset } => Box::new(*preset),
            NewtonTarget::Formula { source } => Box::new(ExpressionTarget::new(source)?),
        };
        Ok(target)
    }
}

/// The parameters of one demo page for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scene {
    /// A named curve with its tangent, normal and osculating circle at `t`.
    CurveFrame { curve: Curve, t: f64 },
    Bezier { curve: BezierCurve, t: f64 },
    Riemann {
        integrand: Integrand,
        a: f64,
        b: f64,
        n: usize,
        rule: RiemannRule,
    },
    /// Cross-section of a surface over a region, drawn in the `(s, z)` plane.
    DoubleIntegralSlice {
        surface: Surface,
        region: Region,
        axis: SliceAxis,
        /// Position of the cut as a fraction of the region, in `[0, 1]`.
        fraction: f64,
    },
    /// Cut of a surface through `(a, b)` with the partial-derivative tangent.
    /// [`SliceAxis::FixedY`] plots `z = f(x, b)`, [`SliceAxis::FixedX`]
    /// plots `z = f(a, y)`.
    PartialSlice {
        surface: PartialSurface,
        a: f64,
        b: f64,
        axis: SliceAxis,
    },
    Fourier { waveform: Waveform, terms: usize },
    Taylor {
        function: TaylorFunction,
        center: f64,
        b: f64,
        order: usize,
    },
    LinearMap {
        map: LinearMap,
        show_eigen: bool,
        /// Grid lines run over `[-range, range]`.
        range: i32,
    },
    Rotation { degrees: f64, vector: Vec2 },
    /// Replays `steps` iterations from `start`.
    Newton {
        target: NewtonTarget,
        start: f64,
        steps: usize,
    },
    Projectile { projectile: Projectile, t: f64 },
    /// Position graph with the tangent at `t` and the secant over `[t, t + dt]`.
    Motion { model: MotionModel, t: f64, dt: f64 },
    /// `A sin(Bx + C)` against the reference `sin x`.
    Trig {
        amplitude: f64,
        frequency: f64,
        phase: f64,
    },
}

impl Default for Scene {
    fn default() -> Self {
        Scene::CurveFrame {
            curve: Curve::default_for(crate::curves::CurveId::Circle),
            t: 0.0,
        }
    }
}

impl Scene {
    pub fn name(&self) -> &'static str {
        match self {
            Scene::CurveFrame { .. } => "curve_frame",
            Scene::Bezier { .. } => "bezier",
            Scene::Riemann { .. } => "riemann",
            Scene::DoubleIntegralSlice { .. } => "double_integral_slice",
            Scene::PartialSlice { .. } => "partial_slice",
            Scene::Fourier { .. } => "fourier",
            Scene::Taylor { .. } => "taylor",
            Scene::LinearMap { .. } => "linear_map",
            Scene::Rotation { .. } => "rotation",
            Scene::Newton { .. } => "newton",
            Scene::Projectile { .. } => "projectile",
            Scene::Motion { .. } => "motion",
            Scene::Trig { .. } => "trig",
        }
    }

    /// Rejects counts too large to draw in one frame.
    pub fn validate(&self) -> Result<()> {
        match self {
            Scene::CurveFrame { curve, .. } => curve.validate()?,
            Scene::Riemann { n, .. } if *n == 0 || *n > MAX_RECTANGLES => {
                bail!("Number of rectangles must be between 1 and {}, got {}.", MAX_RECTANGLES, n)
            }
            Scene::Fourier { terms, .. } if *terms > series::MAX_TERMS => {
                bail!("Fourier terms are limited to {}, got {}.", series::MAX_TERMS, terms)
            }
            Scene::LinearMap { range, .. } if !(0..=MAX_GRID_RANGE).contains(range) => {
                bail!("Grid range must be between 0 and {}, got {}.", MAX_GRID_RANGE, range)
            }
            Scene::Newton { steps, .. } if *steps > newton::MAX_STEPS => {
                bail!("Newton replay is limited to {} steps, got {}.", newton::MAX_STEPS, steps)
            }
            _ => {}
        }
        Ok(())
    }
}

/// Maximal runs of finite points, each at least two long.
pub fn finite_runs(points: impl IntoIterator<Item = Vec2>) -> Vec<Vec<Vec2>> {
    let mut runs = Vec::new();
    let mut current: Vec<Vec2> = Vec::new();
    for p in points {
        if p.x.is_finite() && p.y.is_finite() {
            current.push(p);
        } else if !current.is_empty() {
            let run = std::mem::take(&mut current);
            if run.len() >= 2 {
                runs.push(run);
            }
        }
    }
    if current.len() >= 2 {
        runs.push(current);
    }
    runs
}

fn is_finite(p: Vec2) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Collects commands for one frame, converting math coordinates to pixels
/// and dropping anything that would land on a non-finite pixel.
struct Canvas<'a> {
    viewport: &'a Viewport,
    vector_scale: f64,
    commands: Vec<DrawCommand>,
    dropped: usize,
}

impl<'a> Canvas<'a> {
    fn new(viewport: &'a Viewport, settings: &VizSettings) -> Self {
        Self {
            viewport,
            vector_scale: settings.render.vector_scale,
            commands: Vec::new(),
            dropped: 0,
        }
    }

    fn screen(&self, p: Vec2) -> Option<Vec2> {
        let s = self.viewport.to_screen(p);
        is_finite(s).then_some(s)
    }

    fn line(&mut self, from: Vec2, to: Vec2, style: Style) {
        match (self.screen(from), self.screen(to)) {
            (Some(from), Some(to)) => self.commands.push(DrawCommand::Line { from, to, style }),
            _ => self.dropped += 1,
        }
    }

    fn polyline(&mut self, points: impl IntoIterator<Item = Vec2>, style: Style) {
        let mapped: Vec<Vec2> = points
            .into_iter()
            .map(|p| self.viewport.to_screen(p))
            .collect();
        let total = mapped.len();
        let runs = finite_runs(mapped);
        let kept: usize = runs.iter().map(Vec::len).sum();
        self.dropped += total - kept;
        for points in runs {
            self.commands.push(DrawCommand::Polyline { points, style });
        }
    }

    fn polygon(&mut self, points: &[Vec2], style: Style) {
        let mapped: Option<Vec<Vec2>> = points.iter().map(|p| self.screen(*p)).collect();
        match mapped {
            Some(points) if points.len() >= 3 => {
                self.commands.push(DrawCommand::Polygon { points, style })
            }
            _ => self.dropped += 1,
        }
    }

    /// A marker with a fixed pixel radius.
    fn dot(&mut self, center: Vec2, radius: f64, color: Color) {
        match self.screen(center) {
            Some(center) => self.commands.push(DrawCommand::Circle {
                center,
                radius,
                style: Style::fill(color),
            }),
            None => self.dropped += 1,
        }
    }

    /// A circle of math radius `r`, traced so it stays correct on
    /// viewports with unequal axis scales.
    fn math_circle(&mut self, center: Vec2, r: f64, style: Style) {
        let segments = 72;
        let points = (0..=segments).map(|i| {
            let (s, c) = (TAU * i as f64 / segments as f64).sin_cos();
            center + Vec2::new(c, s) * r
        });
        self.polyline(points, style);
    }

    fn arrow(&mut self, from: Vec2, to: Vec2, style: Style) {
        match (self.screen(from), self.screen(to)) {
            (Some(from), Some(to)) => self.commands.push(DrawCommand::Arrow { from, to, style }),
            _ => self.dropped += 1,
        }
    }

    /// Arrow from `from` along the math direction `direction`, drawn
    /// `factor * vector_scale` pixels long whatever the zoom.
    fn unit_arrow(&mut self, from: Vec2, direction: Vec2, factor: f64, style: Style) {
        let Some(start) = self.screen(from) else {
            self.dropped += 1;
            return;
        };
        let on_screen = self.viewport.to_screen_vector(direction);
        let len = on_screen.norm();
        if !(len > 0.0) || !len.is_finite() {
            return;
        }
        let to = start + on_screen * (factor * self.vector_scale / len);
        self.commands.push(DrawCommand::Arrow {
            from: start,
            to,
            style,
        });
    }

    fn text(&mut self, at: Vec2, text: impl Into<String>, color: Color) {
        match self.screen(at) {
            Some(position) => self.commands.push(DrawCommand::Text {
                position,
                text: text.into(),
                style: Style::fill(color),
            }),
            None => self.dropped += 1,
        }
    }

    /// Text at a fixed pixel position, for readouts.
    fn label(&mut self, position: Vec2, text: impl Into<String>) {
        self.commands.push(DrawCommand::Text {
            position,
            text: text.into(),
            style: Style::fill(Color::BLACK),
        });
    }

    fn readout(&mut self, line: usize, text: impl Into<String>) {
        let pad = self.viewport.padding.max(10.0);
        self.label(Vec2::new(pad, pad + 16.0 * line as f64), text);
    }

    fn graph(&mut self, f: impl Fn(f64) -> f64, steps: usize, style: Style) {
        let vp = self.viewport;
        let steps = steps.max(1);
        let dx = (vp.x_max - vp.x_min) / steps as f64;
        let points: Vec<Vec2> = (0..=steps)
            .map(|i| {
                let x = vp.x_min + i as f64 * dx;
                Vec2::new(x, f(x))
            })
            .collect();
        self.polyline(points, style);
    }

    fn background(&mut self, settings: &VizSettings) {
        let vp = self.viewport;
        let r = &settings.render;
        if r.show_grid {
            let style = Style::stroke(Color::LIGHT_GRAY, 1.0);
            for x in ticks(vp.x_min, vp.x_max, r.grid_step) {
                self.line(Vec2::new(x, vp.y_min), Vec2::new(x, vp.y_max), style);
            }
            for y in ticks(vp.y_min, vp.y_max, r.grid_step) {
                self.line(Vec2::new(vp.x_min, y), Vec2::new(vp.x_max, y), style);
            }
        }
        if r.show_axes {
            let style = Style::stroke(Color::BLACK, 1.5);
            if vp.y_min <= 0.0 && vp.y_max >= 0.0 {
                self.line(Vec2::new(vp.x_min, 0.0), Vec2::new(vp.x_max, 0.0), style);
            }
            if vp.x_min <= 0.0 && vp.x_max >= 0.0 {
                self.line(Vec2::new(0.0, vp.y_min), Vec2::new(0.0, vp.y_max), style);
            }
        }
    }
}

/// Draws one frame of `scene`. Fails only when the scene's parameters are
/// invalid (zero rectangles, an unparsable formula, ...).
pub fn render(scene: &Scene, viewport: &Viewport, settings: &VizSettings) -> Result<Vec<DrawCommand>> {
    viewport.validate()?;
    settings.validate()?;
    scene.validate()?;
    let mut canvas = Canvas::new(viewport, settings);
    canvas.background(settings);

    match scene {
        Scene::CurveFrame { curve, t } => draw_curve_frame(&mut canvas, curve, *t, settings),
        Scene::Bezier { curve, t } => draw_bezier(&mut canvas, curve, *t, settings),
        Scene::Riemann {
            integrand,
            a,
            b,
            n,
            rule,
        } => draw_riemann(&mut canvas, integrand, *a, *b, *n, *rule, settings)?,
        Scene::DoubleIntegralSlice {
            surface,
            region,
            axis,
            fraction,
        } => draw_slice(&mut canvas, *surface, region, *axis, *fraction, settings)?,
        Scene::PartialSlice { surface, a, b, axis } => {
            draw_partial_slice(&mut canvas, *surface, *a, *b, *axis, settings)
        }
        Scene::Fourier { waveform, terms } => draw_fourier(&mut canvas, *waveform, *terms, settings),
        Scene::Taylor {
            function,
            center,
            b,
            order,
        } => draw_taylor(&mut canvas, *function, *center, *b, *order, settings)?,
        Scene::LinearMap {
            map,
            show_eigen,
            range,
        } => draw_linear_map(&mut canvas, map, *show_eigen, *range),
        Scene::Rotation { degrees, vector } => draw_rotation(&mut canvas, *degrees, *vector),
        Scene::Newton {
            target,
            start,
            steps,
        } => draw_newton(&mut canvas, target, *start, *steps, settings)?,
        Scene::Projectile { projectile, t } => draw_projectile(&mut canvas, projectile, *t, settings),
        Scene::Motion { model, t, dt } => draw_motion(&mut canvas, model, *t, *dt, settings),
        Scene::Trig {
            amplitude,
            frequency,
            phase,
        } => draw_trig(&mut canvas, *amplitude, *frequency, *phase, settings),
    }

    debug!(
        scene = scene.name(),
        commands = canvas.commands.len(),
        dropped = canvas.dropped,
        "rendered frame"
    );
    Ok(canvas.commands)
}

fn draw_curve_frame(canvas: &mut Canvas, curve: &Curve, t: f64, settings: &VizSettings) {
    let points = sample_curve(curve, &settings.sampling);
    canvas.polyline(
        points.iter().map(|p| Vec2::new(p.x, p.y)),
        Style::stroke(Color::BLUE, 2.0),
    );

    let t = wrap_parameter(curve, t);
    let frame = frenet_frame(curve, t, &settings.sampling);
    if let (Some(center), Some(r)) = (frame.center, frame.radius.finite()) {
        canvas.math_circle(center, r, Style::stroke(Color::ORANGE.with_alpha(160), 1.0));
        canvas.dot(center, 3.0, Color::ORANGE);
    }
    canvas.unit_arrow(frame.position, frame.tangent, 1.0, Style::stroke(Color::GREEN, 2.0));
    canvas.unit_arrow(frame.position, frame.normal, 1.0, Style::stroke(Color::PURPLE, 2.0));
    canvas.dot(frame.position, 5.0, Color::RED);

    let radius = match frame.radius.finite() {
        Some(r) => format!("ρ = {r:.3}"),
        None => "ρ = ∞".to_string(),
    };
    canvas.readout(1, format!("t = {t:.2}   κ = {:.3}   {radius}", frame.curvature));
}

fn draw_bezier(canvas: &mut Canvas, curve: &BezierCurve, t: f64, settings: &VizSettings) {
    let t = t.clamp(0.0, 1.0);
    canvas.polyline(
        curve.points().iter().copied(),
        Style::stroke(Color::GRAY, 1.0),
    );

    if settings.render.show_construction {
        let levels = curve.construction(t);
        let inner = levels.len().saturating_sub(1);
        for (depth, level) in levels.iter().enumerate().skip(1).take(inner.saturating_sub(1)) {
            let color = if depth % 2 == 0 { Color::GREEN } else { Color::ORANGE };
            canvas.polyline(level.iter().copied(), Style::stroke(color, 1.0));
            for p in level {
                canvas.dot(*p, 3.0, color);
            }
        }
    }

    canvas.polyline(
        curve.sample(settings.sampling.curve_samples),
        Style::stroke(Color::BLUE, 2.5),
    );
    for p in curve.points() {
        canvas.dot(*p, 6.0, Color::BLACK);
    }
    canvas.dot(curve.de_casteljau(t), 6.0, Color::RED);
    canvas.readout(1, format!("degree {}   t = {t:.2}", curve.degree()));
}

fn draw_riemann(
    canvas: &mut Canvas,
    integrand: &Integrand,
    a: f64,
    b: f64,
    n: usize,
    rule: RiemannRule,
    settings: &VizSettings,
) -> Result<()> {
    let sum = riemann_sum(|x| integrand.eval(x), a, b, n, rule)?;
    let style = Style::stroke(Color::BLUE, 1.0).with_fill(Color::BLUE.with_alpha(60));
    for rect in &sum.rectangles {
        let right = rect.left + rect.width;
        canvas.polygon(
            &[
                Vec2::new(rect.left, 0.0),
                Vec2::new(right, 0.0),
                Vec2::new(right, rect.height),
                Vec2::new(rect.left, rect.height),
            ],
            style,
        );
    }
    canvas.graph(|x| integrand.eval(x), settings.sampling.curve_samples, Style::stroke(Color::RED, 2.0));
    let exact = integrand.exact(a, b);
    canvas.readout(1, format!("approx = {:.5}   exact = {exact:.5}", sum.area));
    Ok(())
}

fn draw_slice(
    canvas: &mut Canvas,
    surface: Surface,
    region: &Region,
    axis: SliceAxis,
    fraction: f64,
    settings: &VizSettings,
) -> Result<()> {
    region.validate()?;
    let position = axis.position(region, fraction);
    let profile = cross_section(surface, region, axis, position, settings.sampling.curve_samples);
    canvas.polygon(
        &profile,
        Style::stroke(Color::BLUE, 2.0).with_fill(Color::BLUE.with_alpha(80)),
    );
    let fixed = match axis {
        SliceAxis::FixedY => "y",
        SliceAxis::FixedX => "x",
    };
    let area = slice_area(surface, region, axis, position);
    canvas.readout(1, format!("{fixed} = {position:.2}   A = {area:.4}"));
    Ok(())
}

fn draw_partial_slice(
    canvas: &mut Canvas,
    surface: PartialSurface,
    a: f64,
    b: f64,
    axis: SliceAxis,
    settings: &VizSettings,
) {
    let plane = tangent_plane(|x, y| surface.eval(x, y), a, b, settings.sampling.derivative_step);
    let tangent = plane.slice(axis);
    let (color, name) = match axis {
        SliceAxis::FixedY => (Color::BLUE, "∂f/∂x"),
        SliceAxis::FixedX => (Color::RED, "∂f/∂y"),
    };
    canvas.graph(
        |s| match axis {
            SliceAxis::FixedY => surface.eval(s, b),
            SliceAxis::FixedX => surface.eval(a, s),
        },
        settings.sampling.curve_samples,
        Style::stroke(color, 2.0),
    );
    let s0 = tangent.x0;
    canvas.line(
        Vec2::new(s0 - 1.5, tangent.at(s0 - 1.5)),
        Vec2::new(s0 + 1.5, tangent.at(s0 + 1.5)),
        Style::stroke(Color::BLACK, 1.0),
    );
    canvas.dot(Vec2::new(s0, tangent.y0), 4.0, Color::BLACK);
    canvas.readout(1, format!("f(a, b) = {:.3}", plane.value));
    canvas.readout(2, format!("{name} = {:.3}", tangent.slope));
}

fn draw_fourier(canvas: &mut Canvas, waveform: Waveform, terms: usize, settings: &VizSettings) {
    let vp = canvas.viewport;
    let samples = waveform.sample(terms, (vp.x_min, vp.x_max), settings.sampling.dense_curve_samples);
    canvas.polyline(
        samples.iter().map(|&(x, target, _)| Vec2::new(x, target)),
        Style::stroke(Color::GRAY, 1.5),
    );
    canvas.polyline(
        samples.iter().map(|&(x, _, sum)| Vec2::new(x, sum)),
        Style::stroke(Color::RED, 2.0),
    );
    canvas.readout(1, format!("N = {terms}"));
}

fn draw_taylor(
    canvas: &mut Canvas,
    function: TaylorFunction,
    center: f64,
    b: f64,
    order: usize,
    settings: &VizSettings,
) -> Result<()> {
    let poly = TaylorPolynomial::new(function, center, b, order)?;
    let steps = settings.sampling.dense_curve_samples;
    canvas.graph(|x| function.eval(x, b), steps, Style::stroke(Color::GRAY, 2.0));
    canvas.graph(|x| poly.evaluate(x), steps, Style::stroke(Color::RED, 2.0));
    canvas.dot(Vec2::new(center, function.eval(center, b)), 5.0, Color::BLUE);
    canvas.readout(1, format!("order {order}   a = {center:.2}"));
    canvas.readout(2, format!("c = [{}]", poly.coefficient_labels().join(", ")));
    Ok(())
}

fn draw_linear_map(canvas: &mut Canvas, map: &LinearMap, show_eigen: bool, range: i32) {
    for (from, to) in map.grid_lines(range) {
        canvas.line(from, to, Style::stroke(Color::BLUE.with_alpha(90), 1.0));
    }

    if show_eigen {
        let eigen = map.eigen();
        for (from, to) in eigen.grid_lines(range, true) {
            canvas.line(from, to, Style::stroke(Color::GREEN.with_alpha(70), 1.0));
        }
        if let Eigen2::Real { values, vectors } = eigen {
            for (lambda, v) in values.iter().zip(vectors.iter()) {
                canvas.arrow(Vec2::zeros(), v * *lambda, Style::stroke(Color::GREEN, 2.5));
            }
        }
    }

    let (e1, e2) = map.basis_images();
    canvas.arrow(Vec2::zeros(), e1, Style::stroke(Color::RED, 3.0));
    canvas.arrow(Vec2::zeros(), e2, Style::stroke(Color::BLUE, 3.0));
    canvas.text(e1, "Ae₁", Color::RED);
    canvas.text(e2, "Ae₂", Color::BLUE);
    canvas.readout(1, format!("det = {:.3}", map.determinant()));
}

fn draw_rotation(canvas: &mut Canvas, degrees: f64, vector: Vec2) {
    let rotated = LinearMap::rotation(degrees).apply(vector);
    canvas.math_circle(Vec2::zeros(), vector.norm(), Style::stroke(Color::GRAY, 1.0));
    canvas.arrow(Vec2::zeros(), vector, Style::stroke(Color::GRAY, 2.5));
    canvas.arrow(Vec2::zeros(), rotated, Style::stroke(Color::RED, 2.5));
    canvas.readout(
        1,
        format!(
            "θ = {degrees:.1}°   ({:.3}, {:.3})   arg = {:.1}°",
            rotated.x,
            rotated.y,
            polar_degrees(rotated)
        ),
    );
}

fn draw_newton(
    canvas: &mut Canvas,
    target: &NewtonTarget,
    start: f64,
    steps: usize,
    settings: &VizSettings,
) -> Result<()> {
    let mut session = NewtonSession::new(target.build()?, start);
    for _ in 0..steps {
        if let Err(err) = session.step() {
            trace!(%err, "newton replay stopped early");
            break;
        }
    }

    let f = session.target();
    canvas.graph(|x| f.value(x), settings.sampling.dense_curve_samples, Style::stroke(Color::BLUE, 2.0));
    if let Some(root) = f.true_root() {
        canvas.dot(Vec2::new(root, 0.0), 4.0, Color::GREEN);
    }
    for step in session.history() {
        canvas.line(
            Vec2::new(step.x, 0.0),
            Vec2::new(step.x, step.y),
            Style::stroke(Color::GRAY, 1.0),
        );
        canvas.line(
            Vec2::new(step.x, step.y),
            Vec2::new(step.next_x, 0.0),
            Style::stroke(Color::ORANGE, 1.5),
        );
        canvas.dot(Vec2::new(step.x, step.y), 4.0, Color::ORANGE);
    }
    canvas.dot(Vec2::new(session.current(), 0.0), 5.0, Color::RED);
    canvas.readout(
        1,
        format!("n = {}   x = {:.10}", session.step_count(), session.current()),
    );
    Ok(())
}

fn draw_projectile(canvas: &mut Canvas, projectile: &Projectile, t: f64, settings: &VizSettings) {
    let summary = projectile.summary();
    canvas.polyline(
        projectile.trajectory(settings.sampling.curve_samples),
        Style::stroke(Color::BLUE, 2.0),
    );
    let t = t.clamp(0.0, summary.t_land.max(0.0));
    let position = projectile.position(t);
    let velocity = projectile.velocity(t);
    if projectile.v0 > 0.0 {
        canvas.unit_arrow(
            position,
            velocity,
            velocity.norm() / projectile.v0,
            Style::stroke(Color::RED, 2.0),
        );
    }
    canvas.dot(Vec2::new(summary.t_peak * summary.v0x, summary.h_max), 3.0, Color::GRAY);
    canvas.dot(position, 6.0, Color::BLACK);
    canvas.readout(
        1,
        format!("range = {:.2} m   max height = {:.2} m", summary.range, summary.h_max),
    );
}

fn draw_motion(canvas: &mut Canvas, model: &MotionModel, t: f64, dt: f64, settings: &VizSettings) {
    let (t_min, t_max) = model.t_range();
    let spacing = (t_max - t_min) / settings.sampling.curve_samples as f64;
    canvas.polyline(model.graph(spacing), Style::stroke(Color::BLUE, 2.0));

    let x = model.position(t);
    let v = model.velocity(t);
    canvas.line(
        Vec2::new(t - 1.0, x - v),
        Vec2::new(t + 1.0, x + v),
        Style::stroke(Color::RED, 1.5),
    );
    if let Some(avg) = model.average_velocity(t, dt) {
        canvas.line(
            Vec2::new(t, x),
            Vec2::new(t + dt, model.position(t + dt)),
            Style::stroke(Color::ORANGE, 1.5),
        );
        canvas.readout(2, format!("Δx/Δt = {avg:.3}"));
    }
    canvas.dot(Vec2::new(t, x), 5.0, Color::RED);
    canvas.readout(1, format!("t = {t:.2}   x = {x:.3}   v = {v:.3}"));
}

fn draw_trig(canvas: &mut Canvas, amplitude: f64, frequency: f64, phase: f64, settings: &VizSettings) {
    let vp = canvas.viewport;
    let dx = (vp.x_max - vp.x_min) / settings.sampling.curve_samples as f64;
    let range = (vp.x_min, vp.x_max);
    canvas.polyline(sine_points(1.0, 1.0, 0.0, range, dx), Style::stroke(Color::GRAY, 1.5));
    canvas.polyline(
        sine_points(amplitude, frequency, phase, range, dx),
        Style::stroke(Color::RED, 2.0),
    );
    canvas.readout(1, format!("y = {amplitude:.2} sin({frequency:.2}x + {phase:.2})"));
    let period = match sine_period(frequency) {
        Some(p) => format!("period = {p:.3}"),
        None => "period = ∞".to_string(),
    };
    canvas.readout(2, period);
}

/// Host-owned state of one canvas: the current scene, the base viewport and
/// zoom/pan applied on top of it. Every frame is re-rendered from scratch.
#[derive(Debug, Clone)]
pub struct Sketch {
    scene: Scene,
    base: Viewport,
    view: ViewState,
    settings: VizSettings,
}

impl Sketch {
    pub fn new(scene: Scene, viewport: Viewport, settings: VizSettings) -> Result<Self> {
        viewport.validate()?;
        settings.validate()?;
        Ok(Self {
            scene,
            base: viewport,
            view: ViewState::default(),
            settings,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn settings(&self) -> &VizSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: VizSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Replaces the base viewport and resets zoom and pan.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        viewport.validate()?;
        self.base = viewport;
        self.view.reset();
        Ok(())
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The viewport after zoom and pan.
    pub fn viewport(&self) -> Result<Viewport> {
        self.view.apply(&self.base)
    }

    pub fn zoom(&mut self, factor: f64) {
        let r = &self.settings.render;
        self.view.zoom_by(factor, r.min_zoom, r.max_zoom);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.view.pan_pixels(dx, dy, &self.base);
    }

    pub fn reset_view(&mut self) {
        self.view.reset();
    }

    pub fn to_math(&self, screen: Vec2) -> Result<Vec2> {
        Ok(self.viewport()?.to_math(screen))
    }

    pub fn to_screen(&self, p: Vec2) -> Result<Vec2> {
        Ok(self.viewport()?.to_screen(p))
    }

    /// Bézier control point within `radius_px` pixels of `screen`, nearest
    /// first. Other scenes have nothing to grab.
    pub fn hit_control_point(&self, screen: Vec2, radius_px: f64) -> Result<Option<usize>> {
        let Scene::Bezier { curve, .. } = &self.scene else {
            return Ok(None);
        };
        let vp = self.viewport()?;
        let radius = radius_px / vp.scale_x().max(vp.scale_y());
        Ok(curve.hit_test(vp.to_math(screen), radius))
    }

    /// Drags Bézier control point `index` to a screen position.
    pub fn move_control_point(&mut self, index: usize, screen: Vec2) -> Result<()> {
        let p = self.to_math(screen)?;
        match &mut self.scene {
            Scene::Bezier { curve, .. } => curve.set_point(index, p),
            other => bail!("Scene '{}' has no control points.", other.name()),
        }
    }

    pub fn frame(&self) -> Result<Vec<DrawCommand>> {
        render(&self.scene, &self.viewport()?, &self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::CurveId;

    fn viewport() -> Viewport {
        Viewport::new((-5.0, 5.0), (-4.0, 4.0), 800.0, 640.0, 20.0).expect("viewport")
    }

    fn assert_err_contains<T: std::fmt::Debug>(result: anyhow::Result<T>, needle: &str) {
        let err = result.expect_err("expected error");
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    fn points_of(command: &DrawCommand) -> Vec<Vec2> {
        match command {
            DrawCommand::Line { from, to, .. } | DrawCommand::Arrow { from, to, .. } => vec![*from, *to],
            DrawCommand::Polyline { points, .. } | DrawCommand::Polygon { points, .. } => points.clone(),
            DrawCommand::Circle { center, .. } => vec![*center],
            DrawCommand::Text { position, .. } => vec![*position],
        }
    }

    fn all_scenes() -> Vec<Scene> {
        vec![
            Scene::default(),
            Scene::CurveFrame {
                curve: Curve::default_for(CurveId::Cissoid),
                t: 0.5,
            },
            Scene::Bezier {
                curve: BezierCurve::default_quartic(),
                t: 0.3,
            },
            Scene::Riemann {
                integrand: Integrand::default(),
                a: 0.0,
                b: 2.0,
                n: 8,
                rule: RiemannRule::Midpoint,
            },
            Scene::DoubleIntegralSlice {
                surface: Surface::Dome,
                region: Region::default(),
                axis: SliceAxis::FixedX,
                fraction: 0.5,
            },
            Scene::PartialSlice {
                surface: PartialSurface::Hills,
                a: 0.5,
                b: -1.0,
                axis: SliceAxis::FixedX,
            },
            Scene::Fourier {
                waveform: Waveform::Square,
                terms: 5,
            },
            Scene::Taylor {
                function: TaylorFunction::Log1p,
                center: 0.0,
                b: 1.0,
                order: 6,
            },
            Scene::LinearMap {
                map: LinearMap::new(2.0, 1.0, 1.0, 2.0),
                show_eigen: true,
                range: 5,
            },
            Scene::Rotation {
                degrees: 30.0,
                vector: Vec2::new(2.0, 1.0),
            },
            Scene::Newton {
                target: NewtonTarget::default(),
                start: 2.0,
                steps: 3,
            },
            Scene::Projectile {
                projectile: Projectile::default(),
                t: 1.0,
            },
            Scene::Motion {
                model: MotionModel::default(),
                t: 2.0,
                dt: 1.0,
            },
            Scene::Trig {
                amplitude: 2.0,
                frequency: 0.5,
                phase: 1.0,
            },
        ]
    }

    #[test]
    fn every_scene_renders_finite_commands() {
        let settings = VizSettings::default();
        for scene in all_scenes() {
            let commands = render(&scene, &viewport(), &settings).expect(scene.name());
            assert!(!commands.is_empty(), "{}", scene.name());
            for command in &commands {
                assert!(
                    points_of(command).iter().all(|p| is_finite(*p)),
                    "{} produced {command:?}",
                    scene.name()
                );
            }
        }
    }

    #[test]
    fn runs_split_at_non_finite_points() {
        let runs = finite_runs(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(2.0, f64::NAN),
            Vec2::new(3.0, 3.0),
            Vec2::new(4.0, f64::INFINITY),
            Vec2::new(5.0, 5.0),
            Vec2::new(6.0, 6.0),
        ]);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1], vec![Vec2::new(5.0, 5.0), Vec2::new(6.0, 6.0)]);
    }

    #[test]
    fn log_graph_breaks_below_minus_one() {
        let scene = Scene::Taylor {
            function: TaylorFunction::Log1p,
            center: 0.0,
            b: 1.0,
            order: 3,
        };
        let mut settings = VizSettings::default();
        settings.render.show_grid = false;
        settings.render.show_axes = false;
        let commands = render(&scene, &viewport(), &settings).expect("render");
        let polylines = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polyline { .. }))
            .count();
        assert_eq!(polylines, 2);
    }

    #[test]
    fn riemann_draws_one_polygon_per_rectangle() {
        let scene = Scene::Riemann {
            integrand: Integrand::Sin,
            a: 0.0,
            b: 3.0,
            n: 12,
            rule: RiemannRule::Left,
        };
        let commands = render(&scene, &viewport(), &VizSettings::default()).expect("render");
        let polygons = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 12);

        let empty = Scene::Riemann {
            integrand: Integrand::Sin,
            a: 0.0,
            b: 3.0,
            n: 0,
            rule: RiemannRule::Left,
        };
        assert_err_contains(render(&empty, &viewport(), &VizSettings::default()), "between 1 and");
    }

    #[test]
    fn wide_viewport_renders_a_bounded_grid() {
        let wide = Viewport::new((-1e13, 1e13), (-1.0, 1.0), 800.0, 600.0, 20.0).expect("viewport");
        let commands = render(&Scene::default(), &wide, &VizSettings::default()).expect("render");
        let lines = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        assert!(lines < 2 * crate::viewport::MAX_TICKS + 10);
    }

    #[test]
    fn partial_slice_reports_slope() {
        let scene = Scene::PartialSlice {
            surface: PartialSurface::Saddle,
            a: 2.0,
            b: 1.0,
            axis: SliceAxis::FixedY,
        };
        let commands = render(&scene, &viewport(), &VizSettings::default()).expect("render");
        let texts: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"f(a, b) = 0.750"), "{texts:?}");
        assert!(texts.contains(&"∂f/∂x = 1.000"), "{texts:?}");
    }

    #[test]
    fn oversized_scenes_are_rejected() {
        let settings = VizSettings::default();
        let riemann = Scene::Riemann {
            integrand: Integrand::Sin,
            a: 0.0,
            b: 1.0,
            n: 4_000_000_000,
            rule: RiemannRule::Left,
        };
        assert_err_contains(render(&riemann, &viewport(), &settings), "between 1 and");
        let fourier = Scene::Fourier {
            waveform: Waveform::Square,
            terms: usize::MAX,
        };
        assert_err_contains(render(&fourier, &viewport(), &settings), "limited to");
        let newton = Scene::Newton {
            target: NewtonTarget::default(),
            start: 2.0,
            steps: usize::MAX,
        };
        assert_err_contains(render(&newton, &viewport(), &settings), "limited to");
        let grid = Scene::LinearMap {
            map: LinearMap::new(1.0, 0.0, 0.0, 1.0),
            show_eigen: false,
            range: i32::MAX,
        };
        assert_err_contains(render(&grid, &viewport(), &settings), "Grid range");
        let clothoid = Scene::CurveFrame {
            curve: Curve::Clothoid {
                a: 1.0,
                steps: usize::MAX,
            },
            t: 0.0,
        };
        assert_err_contains(render(&clothoid, &viewport(), &settings), "Clothoid steps");

        let mut huge = VizSettings::default();
        huge.sampling.dense_curve_samples = usize::MAX;
        assert_err_contains(render(&Scene::default(), &viewport(), &huge), "Sample counts");
    }

    #[test]
    fn grid_and_axes_follow_settings() {
        let scene = Scene::Rotation {
            degrees: 0.0,
            vector: Vec2::new(1.0, 0.0),
        };
        let mut settings = VizSettings::default();
        let with_grid = render(&scene, &viewport(), &settings).expect("render");
        settings.render.show_grid = false;
        let without_grid = render(&scene, &viewport(), &settings).expect("render");
        // 11 vertical + 9 horizontal grid lines at unit spacing
        assert_eq!(with_grid.len() - without_grid.len(), 20);
        settings.render.show_axes = false;
        let bare = render(&scene, &viewport(), &settings).expect("render");
        assert_eq!(without_grid.len() - bare.len(), 2);
    }

    #[test]
    fn construction_lines_are_optional() {
        let scene = Scene::Bezier {
            curve: BezierCurve::default_quartic(),
            t: 0.5,
        };
        let mut settings = VizSettings::default();
        let full = render(&scene, &viewport(), &settings).expect("render");
        settings.render.show_construction = false;
        let plain = render(&scene, &viewport(), &settings).expect("render");
        // quartic: three intermediate levels of 4, 3 and 2 points
        assert_eq!(full.len() - plain.len(), 3 + 4 + 3 + 2);
    }

    #[test]
    fn bad_formula_is_reported() {
        let scene = Scene::Newton {
            target: NewtonTarget::Formula {
                source: "x^2 - ".to_string(),
            },
            start: 1.0,
            steps: 2,
        };
        assert!(render(&scene, &viewport(), &VizSettings::default()).is_err());
    }

    #[test]
    fn newton_replay_stops_on_flat_slope() {
        let scene = Scene::Newton {
            target: NewtonTarget::Formula {
                source: "x^2 + 1".to_string(),
            },
            start: 0.0,
            steps: 5,
        };
        let commands = render(&scene, &viewport(), &VizSettings::default()).expect("render");
        let readout = commands.iter().find_map(|c| match c {
            DrawCommand::Text { text, .. } if text.starts_with("n = ") => Some(text.clone()),
            _ => None,
        });
        assert_eq!(readout.as_deref().map(|t| t.starts_with("n = 0")), Some(true));
    }

    #[test]
    fn scene_parses_from_json() {
        let scene: Scene = serde_json::from_str(
            r#"{ "kind": "curve_frame", "curve": { "kind": "lissajous", "a": 1, "p": 3, "q": 2 }, "t": 0.25 }"#,
        )
        .expect("parse");
        assert_eq!(scene.name(), "curve_frame");
        let newton: Scene = serde_json::from_str(
            r#"{ "kind": "newton", "target": { "kind": "preset", "preset": "sin" }, "start": 3.0, "steps": 4 }"#,
        )
        .expect("parse");
        assert!(matches!(newton, Scene::Newton { steps: 4, .. }));
    }

    #[test]
    fn sketch_zoom_is_clamped_and_frames_are_repeatable() {
        let mut sketch = Sketch::new(Scene::default(), viewport(), VizSettings::default()).expect("sketch");
        sketch.zoom(1000.0);
        assert_eq!(sketch.view().zoom, 20.0);
        let first = sketch.frame().expect("frame");
        let second = sketch.frame().expect("frame");
        assert_eq!(first, second);

        sketch.reset_view();
        let p = Vec2::new(1.5, -0.5);
        let back = sketch.to_math(sketch.to_screen(p).expect("screen")).expect("math");
        assert!((back - p).norm() < 1e-9);
    }

    #[test]
    fn sketch_drags_bezier_control_points() {
        let scene = Scene::Bezier {
            curve: BezierCurve::default_quartic(),
            t: 0.5,
        };
        let mut sketch = Sketch::new(scene, viewport(), VizSettings::default()).expect("sketch");
        let first = match sketch.scene() {
            Scene::Bezier { curve, .. } => curve.points()[0],
            _ => unreachable!(),
        };
        let screen = sketch.to_screen(first).expect("screen");
        let grabbed = sketch
            .hit_control_point(screen + Vec2::new(2.0, -2.0), 6.0)
            .expect("hit test");
        assert_eq!(grabbed, Some(0));
        assert_eq!(
            sketch.hit_control_point(screen + Vec2::new(40.0, 0.0), 6.0).expect("hit test"),
            None
        );

        let target = Vec2::new(-1.0, 2.0);
        let target_screen = sketch.to_screen(target).expect("screen");
        sketch.move_control_point(0, target_screen).expect("move");
        let Scene::Bezier { curve, .. } = sketch.scene() else {
            unreachable!()
        };
        assert!((curve.points()[0] - target).norm() < 1e-9);
        assert!(sketch.move_control_point(99, target_screen).is_err());

        sketch.set_scene(Scene::default());
        assert_eq!(sketch.hit_control_point(screen, 6.0).expect("hit test"), None);
        assert_err_contains(sketch.move_control_point(0, screen), "no control points");
    }

    #[test]
    fn sketch_rejects_invalid_viewport() {
        let mut sketch = Sketch::new(Scene::default(), viewport(), VizSettings::default()).expect("sketch");
        let mut bad = viewport();
        bad.x_max = bad.x_min;
        assert_err_contains(sketch.set_viewport(bad), "x_max > x_min");
        sketch.zoom(2.0);
        sketch.set_viewport(viewport()).expect("valid viewport");
        assert_eq!(sketch.view().zoom, 1.0);
    }
}
