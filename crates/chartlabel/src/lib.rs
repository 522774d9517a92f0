//! Collision-free chart annotation layout.
//!
//! Modules
//! - `geom`: points, segments, rects, polygons, polylines and their distances.
//! - `qp`: dense Goldfarb–Idnani QP solver.
//! - `spacing`: exact 1-D "space apart" on top of `qp`.
//! - `region`, `sampler`: polygon booleans and feasible-corner sampling.
//! - `minimize`, `placement`: annealed Nelder–Mead label placement.
//! - `align`: render-time pass over measured text boxes.
//!
//! Everything except `align` is pure and synchronous. Randomness is always
//! passed in as an `Rng` so results are reproducible from a seed.

pub mod align;
pub mod api;
pub mod cfg;
pub mod error;
pub mod geom;
pub mod minimize;
pub mod placement;
pub mod qp;
pub mod region;
pub mod sampler;
pub mod spacing;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::LayoutError;
pub use geom::{Curve, LabelBox, Point, Rect};

/// Common exports for chart-building callers.
pub mod prelude {
    pub use crate::geom::{Curve, LabelBox, Point, Rect};
    pub use crate::placement::{place_labels, PlacementCfg};
    pub use crate::spacing::{space_apart, IntervalSpec, SpacingBounds};
    pub use crate::LayoutError;
}
