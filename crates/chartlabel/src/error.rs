//! Error taxonomy for a single layout call.
//!
//! All failures are local and synchronous; nothing is retried inside the
//! crate. Callers decide whether to abort a render or fall back to an
//! unoptimized layout.

use std::fmt;

use crate::geom::GeometryError;
use crate::qp::QpError;

#[derive(Debug)]
pub enum LayoutError {
    /// The underlying QP solve failed (infeasible, indefinite, malformed).
    Qp(QpError),
    /// Malformed geometry (negative sizes, too few points, unknown caps).
    Geometry(GeometryError),
    /// Inputs violate a precondition of the layout routine.
    InvalidInput { reason: String },
}

impl LayoutError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Qp(e) => write!(f, "spacing solve failed: {e}"),
            LayoutError::Geometry(e) => write!(f, "invalid geometry: {e}"),
            LayoutError::InvalidInput { reason } => write!(f, "invalid layout input: {reason}"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LayoutError::Qp(e) => Some(e),
            LayoutError::Geometry(e) => Some(e),
            LayoutError::InvalidInput { .. } => None,
        }
    }
}

impl From<QpError> for LayoutError {
    fn from(e: QpError) -> Self {
        LayoutError::Qp(e)
    }
}

impl From<GeometryError> for LayoutError {
    fn from(e: GeometryError) -> Self {
        LayoutError::Geometry(e)
    }
}
