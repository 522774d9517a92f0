//! Geometry kernel for label layout.
//!
//! Purpose
//! - Pure point/segment/rect/polygon/polyline predicates and distances used by
//!   the valid-region sampler and the placement loss.
//! - Every predicate takes an explicit `tol` (0 by default at call sites) so
//!   floating point noise is absorbed where the caller decides.
//!
//! Conventions
//! - `Rect` is stored as minimum corner plus size; the y direction is whatever
//!   the caller uses (SVG y-down works unchanged).
//! - Degenerate inputs (zero-length lines, zero-area polygons) return finite
//!   answers instead of NaN; coincident chart points are legitimate.

mod curve;
mod line;
mod polygon;
mod rect;
mod types;

pub use line::{
    distance, line_to_polygon, orientation, point_to_line_distance, points_equal,
    segments_intersect,
};
pub use rect::line_to_line_distance;
pub use types::{Curve, GeometryError, LabelBox, Line, LineCap, Point, Polygon, Rect};
