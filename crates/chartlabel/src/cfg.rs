//! Tolerance defaults (internal).
//!
//! Policy
//! - Fixed constants; the tunable knobs live in the config structs
//!   (`PlacementCfg`, `NelderMead`, `SpacingBounds`).

/// Smallest magnitude treated as non-zero by the QP solver.
///
/// Ten ulps at 1.0; the dual method compares step lengths, multipliers and
/// direction norms against this value.
pub(crate) const VSMALL: f64 = 10.0 * f64::EPSILON;
/// Region pieces with area at or below this are dropped as slivers.
pub(crate) const MIN_REGION_AREA: f64 = 1e-9;
/// Rejection-sampling attempts per draw before falling back to a vertex.
pub(crate) const SAMPLE_ATTEMPTS: usize = 1000;
/// Feasibility slack when checking solved spacing rows.
pub const SPACING_EPS: f64 = 1e-7;
/// Squared-distance violation below which a start counts as annealed.
pub(crate) const SETTLED_VIOLATION: f64 = 1e-6;
/// Loss decrease a refine must reach before it replaces the start.
pub(crate) const REFINE_MIN_GAIN: f64 = 1e-4;
