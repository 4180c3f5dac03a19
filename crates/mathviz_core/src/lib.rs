pub mod autodiff;
pub mod bezier;
pub mod curves;
pub mod differentiate;
pub mod equation_engine;
pub mod growth;
pub mod integrate;
pub mod linear;
pub mod motion;
pub mod newton;
pub mod render;
pub mod series;
pub mod settings;
/// The `mathviz_core` crate holds the math behind the mathviz interactive
/// visualizers, kept free of any browser or canvas dependency.
///
/// Key components:
/// - **Traits**: `Scalar` (numeric type abstraction), `ParametricCurve` (plane curves).
/// - **Viewport**: affine math-to-pixel mapping with zoom and pan.
/// - **Differentiate / Autodiff**: central differences, Frenet frames and dual numbers.
/// - **Equation Engine**: a bytecode VM for user-typed formulas.
/// - **Demos**: curves, Bézier, integration, linear maps, Newton, series, motion, vectors, growth.
/// - **Render**: pure scene-to-draw-command rendering.
pub mod traits;
pub mod vectors;
pub mod viewport;
