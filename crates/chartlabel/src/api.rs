//! Curated re-exports of the layout entry points.
//!
//! Prefer these over reaching into submodules; internal layout may change.

// Geometry
pub use crate::geom::{
    distance, line_to_line_distance, line_to_polygon, orientation, point_to_line_distance,
    points_equal, segments_intersect, Curve, GeometryError, LabelBox, Line, LineCap, Point,
    Polygon, Rect,
};
pub use crate::region::{Region, RegionPiece};
// Solvers
pub use crate::qp::{solve_qp, solve_qp_dense, QpError, QpProblem, QpSolution};
pub use crate::spacing::{space_apart, space_apart_offsets, IntervalSpec, SpacingBounds};
// Placement
pub use crate::minimize::{Minimizer, Minimum, NelderMead};
pub use crate::placement::{
    place_labels, place_labels_detailed, place_labels_with, refine_labels, refine_labels_detailed,
    LabelLoss, LossTerms, Placement, PlacementCfg,
};
pub use crate::sampler::ValidRegionSampler;
// Render-time pass
pub use crate::align::{
    align, AlignmentPlan, AlignmentReport, Axis, AxisLayout, AxisReport, RenderSurface,
    SeriesLabels,
};
pub use crate::error::LayoutError;
