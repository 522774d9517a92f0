//! Dense convex quadratic programming (Goldfarb–Idnani dual active-set).
//!
//! Problem
//! - `min ½ xᵀQx − cᵀx` subject to `A x = b` for the first `meq` rows of `A`
//!   and `A x ≥ b` for the remaining rows. Rows of `A` are constraint normals.
//!
//! Contract
//! - Dimensions are validated eagerly; nothing is truncated or padded.
//! - `Q` must be symmetric positive definite (only its lower triangle is read
//!   by the factorization). Failure is `QpError::NotPositiveDefinite`.
//! - Inputs are borrowed; the solver never mutates caller data.
//!
//! Used by
//! - `spacing::space_apart` (1-D interval spacing) and, through it, the
//!   render-time alignment pass.

mod solver;

use std::fmt;

use nalgebra::{DMatrix, DVector};

pub use solver::solve_qp;

/// Errors surfaced by the QP solver.
#[derive(Debug, Clone, PartialEq)]
pub enum QpError {
    /// `Q` has no rows.
    EmptyProblem,
    /// Two inputs disagree on a dimension.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// `meq` exceeds the number of constraint rows.
    InvalidMeq { meq: usize, rows: usize },
    /// An input entry is NaN or infinite.
    NonFiniteInput { what: &'static str },
    /// Cholesky factorization of `Q` failed.
    NotPositiveDefinite,
    /// No step can satisfy the selected violated constraint.
    Infeasible,
    /// A constraint is linearly dependent on the active set.
    DependentConstraints { row: usize },
}

impl fmt::Display for QpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QpError::EmptyProblem => write!(f, "quadratic term has no rows"),
            QpError::DimensionMismatch {
                what,
                expected,
                got,
            } => write!(f, "dimension mismatch in {what}: expected {expected}, got {got}"),
            QpError::InvalidMeq { meq, rows } => {
                write!(f, "meq={meq} exceeds the {rows} constraint rows")
            }
            QpError::NonFiniteInput { what } => write!(f, "{what} contains NaN or infinity"),
            QpError::NotPositiveDefinite => {
                write!(f, "indefinite matrix: Q is not positive definite")
            }
            QpError::Infeasible => write!(f, "constraints are infeasible"),
            QpError::DependentConstraints { row } => {
                write!(f, "constraint row {row} is linearly dependent on the active set")
            }
        }
    }
}

impl std::error::Error for QpError {}

/// Dense QP instance. Rows `0..meq` of `a` are equalities.
#[derive(Clone, Debug)]
pub struct QpProblem {
    pub q: DMatrix<f64>,
    pub c: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
    pub meq: usize,
}

impl QpProblem {
    /// Build and validate.
    pub fn new(
        q: DMatrix<f64>,
        c: DVector<f64>,
        a: DMatrix<f64>,
        b: DVector<f64>,
        meq: usize,
    ) -> Result<Self, QpError> {
        let p = Self { q, c, a, b, meq };
        p.validate()?;
        Ok(p)
    }

    /// Instance without constraints.
    pub fn unconstrained(q: DMatrix<f64>, c: DVector<f64>) -> Self {
        let n = q.ncols();
        Self {
            q,
            c,
            a: DMatrix::zeros(0, n),
            b: DVector::zeros(0),
            meq: 0,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.q.nrows()
    }

    #[inline]
    pub fn num_constraints(&self) -> usize {
        self.a.nrows()
    }

    pub fn validate(&self) -> Result<(), QpError> {
        let n = self.q.nrows();
        if n == 0 {
            return Err(QpError::EmptyProblem);
        }
        if self.q.ncols() != n {
            return Err(QpError::DimensionMismatch {
                what: "Q columns",
                expected: n,
                got: self.q.ncols(),
            });
        }
        if self.c.len() != n {
            return Err(QpError::DimensionMismatch {
                what: "c length",
                expected: n,
                got: self.c.len(),
            });
        }
        if self.a.ncols() != n {
            return Err(QpError::DimensionMismatch {
                what: "A columns",
                expected: n,
                got: self.a.ncols(),
            });
        }
        if self.b.len() != self.a.nrows() {
            return Err(QpError::DimensionMismatch {
                what: "b length",
                expected: self.a.nrows(),
                got: self.b.len(),
            });
        }
        if self.meq > self.a.nrows() {
            return Err(QpError::InvalidMeq {
                meq: self.meq,
                rows: self.a.nrows(),
            });
        }
        let finite = |m: &[f64]| m.iter().all(|v| v.is_finite());
        if !finite(self.q.as_slice()) {
            return Err(QpError::NonFiniteInput { what: "Q" });
        }
        if !finite(self.c.as_slice()) {
            return Err(QpError::NonFiniteInput { what: "c" });
        }
        if !finite(self.a.as_slice()) {
            return Err(QpError::NonFiniteInput { what: "A" });
        }
        if !finite(self.b.as_slice()) {
            return Err(QpError::NonFiniteInput { what: "b" });
        }
        Ok(())
    }
}

/// Primal solution plus the dual bookkeeping of the active-set method.
#[derive(Clone, Debug)]
pub struct QpSolution {
    pub x: DVector<f64>,
    /// Objective `½ xᵀQx − cᵀx` at `x`.
    pub value: f64,
    /// Multipliers of the active constraints, aligned with `active`.
    pub multipliers: Vec<f64>,
    /// Active constraint rows (equalities first).
    pub active: Vec<usize>,
    pub iterations: usize,
}

/// Slice convenience: row-major `q` (n×n), `a` (rows×n).
///
/// Returns the primal solution only.
pub fn solve_qp_dense(
    q: &[Vec<f64>],
    c: &[f64],
    a: &[Vec<f64>],
    b: &[f64],
    meq: usize,
) -> Result<Vec<f64>, QpError> {
    let n = c.len();
    let q = rows_to_matrix(q, n, "Q columns")?;
    let a = rows_to_matrix(a, n, "A columns")?;
    let problem = QpProblem::new(q, DVector::from_column_slice(c), a, DVector::from_column_slice(b), meq)?;
    Ok(solve_qp(&problem)?.x.iter().copied().collect())
}

fn rows_to_matrix(rows: &[Vec<f64>], n: usize, what: &'static str) -> Result<DMatrix<f64>, QpError> {
    if let Some(bad) = rows.iter().find(|r| r.len() != n) {
        return Err(QpError::DimensionMismatch {
            what,
            expected: n,
            got: bad.len(),
        });
    }
    Ok(DMatrix::from_fn(rows.len(), n, |i, j| rows[i][j]))
}
