//! Exact 1-D "space apart" solver.
//!
//! Given intervals `(position, width)` (position = left edge), find new
//! positions minimizing `Σ (x_i − p_i)²` such that, in position-sorted order,
//! `x[i+1] − x[i] ≥ width[i] + clearance`, optionally with the whole
//! arrangement inside `[lower, upper]`.
//!
//! The ordering constraints only relate neighbours in sorted order, so the
//! QP is tiny and banded; it is solved by `qp::solve_qp`. This is the single
//! implementation shared by chart construction and the render-time pass.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::error::LayoutError;
use crate::qp::{solve_qp, QpProblem};

/// One interval along an axis; `position` is the left (lower) edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalSpec {
    pub position: f64,
    pub width: f64,
}

impl IntervalSpec {
    #[inline]
    pub fn new(position: f64, width: f64) -> Self {
        Self { position, width }
    }
}

impl From<(f64, f64)> for IntervalSpec {
    fn from((position, width): (f64, f64)) -> Self {
        Self { position, width }
    }
}

/// Optional hard bounds: first left edge `>= lower`, last right edge `<= upper`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpacingBounds {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl SpacingBounds {
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    pub fn between(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }
}

/// Solved positions (left edges), in input order.
///
/// Empty input returns `[]` without invoking the solver.
pub fn space_apart(
    intervals: &[IntervalSpec],
    clearance: f64,
    bounds: SpacingBounds,
) -> Result<Vec<f64>, LayoutError> {
    if intervals.is_empty() {
        return Ok(Vec::new());
    }
    validate(intervals, clearance, bounds)?;

    let order = sorted_order(intervals);
    let n = intervals.len();
    let mut rows: Vec<(Vec<(usize, f64)>, f64)> = Vec::with_capacity(n + 1);
    for k in 0..n.saturating_sub(1) {
        let lo = order[k];
        rows.push((vec![(k, -1.0), (k + 1, 1.0)], intervals[lo].width + clearance));
    }
    if let Some(lower) = bounds.lower {
        rows.push((vec![(0, 1.0)], lower));
    }
    if let Some(upper) = bounds.upper {
        let last = order[n - 1];
        rows.push((vec![(n - 1, -1.0)], intervals[last].width - upper));
    }

    let mut a = DMatrix::zeros(rows.len(), n);
    let mut b = DVector::zeros(rows.len());
    for (r, (coeffs, rhs)) in rows.iter().enumerate() {
        for &(col, v) in coeffs {
            a[(r, col)] = v;
        }
        b[r] = *rhs;
    }
    let c = DVector::from_iterator(n, order.iter().map(|&i| intervals[i].position));
    let problem = QpProblem::new(DMatrix::identity(n, n), c, a, b, 0)?;
    let sol = solve_qp(&problem)?;
    debug!(
        intervals = n,
        active = sol.active.len(),
        iterations = sol.iterations,
        "space_apart solved"
    );

    let mut out = vec![0.0; n];
    for (k, &i) in order.iter().enumerate() {
        out[i] = sol.x[k];
    }
    Ok(out)
}

/// `solved − original` per interval, in input order.
pub fn space_apart_offsets(
    intervals: &[IntervalSpec],
    clearance: f64,
    bounds: SpacingBounds,
) -> Result<Vec<f64>, LayoutError> {
    let solved = space_apart(intervals, clearance, bounds)?;
    Ok(solved
        .iter()
        .zip(intervals)
        .map(|(x, iv)| x - iv.position)
        .collect())
}

/// Indices sorted by position; ties keep input order.
fn sorted_order(intervals: &[IntervalSpec]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..intervals.len()).collect();
    order.sort_by(|&i, &j| {
        intervals[i]
            .position
            .partial_cmp(&intervals[j].position)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

fn validate(intervals: &[IntervalSpec], clearance: f64, bounds: SpacingBounds) -> Result<(), LayoutError> {
    if !clearance.is_finite() || clearance < 0.0 {
        return Err(LayoutError::invalid(format!(
            "clearance must be finite and >= 0 (got {clearance})"
        )));
    }
    for (i, iv) in intervals.iter().enumerate() {
        if !iv.position.is_finite() || !iv.width.is_finite() || iv.width < 0.0 {
            return Err(LayoutError::invalid(format!(
                "interval {i} needs a finite position and width >= 0 (got {:?})",
                iv
            )));
        }
    }
    if let (Some(lo), Some(hi)) = (bounds.lower, bounds.upper) {
        if lo > hi {
            return Err(LayoutError::invalid(format!(
                "lower bound {lo} exceeds upper bound {hi}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::SPACING_EPS;
    use proptest::prelude::*;

    fn ivs(raw: &[(f64, f64)]) -> Vec<IntervalSpec> {
        raw.iter().copied().map(IntervalSpec::from).collect()
    }

    fn assert_close(got: &[f64], expected: &[f64]) {
        assert_eq!(got.len(), expected.len());
        for (a, b) in got.iter().zip(expected) {
            assert!((a - b).abs() < 1e-9, "got {got:?}, expected {expected:?}");
        }
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(space_apart(&[], 1.0, SpacingBounds::default())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn separated_input_is_a_fixed_point() {
        let out = space_apart(&ivs(&[(0.0, 1.0), (1.0, 2.0)]), 0.0, SpacingBounds::default()).unwrap();
        assert_close(&out, &[0.0, 1.0]);
    }

    #[test]
    fn overlap_is_split_evenly() {
        let out = space_apart(&ivs(&[(0.0, 3.0), (1.0, 2.0)]), 0.0, SpacingBounds::default()).unwrap();
        assert_close(&out, &[-1.0, 2.0]);
    }

    #[test]
    fn result_follows_input_order() {
        let out = space_apart(&ivs(&[(1.0, 2.0), (0.0, 3.0)]), 0.0, SpacingBounds::default()).unwrap();
        assert_close(&out, &[2.0, -1.0]);
    }

    #[test]
    fn clearance_adds_to_the_gap() {
        let out = space_apart(&ivs(&[(0.0, 2.0), (2.0, 2.0)]), 2.0, SpacingBounds::default()).unwrap();
        assert_close(&out, &[-1.0, 3.0]);
    }

    #[test]
    fn bounds_push_the_whole_arrangement() {
        // Overlapping pair near the lower bound; the lower row is binding.
        let out = space_apart(
            &ivs(&[(0.0, 2.0), (1.0, 2.0)]),
            0.0,
            SpacingBounds::new(Some(0.0), None),
        )
        .unwrap();
        assert_close(&out, &[0.0, 2.0]);

        let out = space_apart(
            &ivs(&[(7.0, 2.0), (8.0, 2.0)]),
            0.0,
            SpacingBounds::new(None, Some(10.0)),
        )
        .unwrap();
        assert_close(&out, &[6.0, 8.0]);
    }

    #[test]
    fn impossible_bounds_are_a_solver_failure() {
        let err = space_apart(
            &ivs(&[(0.0, 5.0), (1.0, 5.0)]),
            0.0,
            SpacingBounds::between(0.0, 6.0),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::Qp(crate::qp::QpError::Infeasible)));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let one = ivs(&[(0.0, 1.0)]);
        assert!(space_apart(&one, -1.0, SpacingBounds::default()).is_err());
        assert!(space_apart(&ivs(&[(0.0, -1.0)]), 0.0, SpacingBounds::default()).is_err());
        assert!(space_apart(&one, 0.0, SpacingBounds::between(2.0, 1.0)).is_err());
    }

    #[test]
    fn offsets_are_relative_to_input() {
        let out = space_apart_offsets(&ivs(&[(0.0, 3.0), (1.0, 2.0)]), 0.0, SpacingBounds::default()).unwrap();
        assert_close(&out, &[-1.0, 1.0]);
    }

    fn interval_set() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-50.0f64..50.0, 0.0f64..10.0), 1..12)
    }

    proptest! {
        #[test]
        fn solved_neighbours_are_separated(raw in interval_set(), clearance in 0.0f64..3.0) {
            let input = ivs(&raw);
            let out = space_apart(&input, clearance, SpacingBounds::default()).unwrap();
            prop_assert_eq!(out.len(), input.len());
            let order = sorted_order(&input);
            for w in order.windows(2) {
                let (i, j) = (w[0], w[1]);
                prop_assert!(out[j] - out[i] >= input[i].width + clearance - SPACING_EPS);
            }
        }

        #[test]
        fn permuting_input_permutes_output(raw in interval_set()) {
            let input = ivs(&raw);
            let mut reversed = input.clone();
            reversed.reverse();
            let a = space_apart(&input, 0.5, SpacingBounds::default()).unwrap();
            let b = space_apart(&reversed, 0.5, SpacingBounds::default()).unwrap();
            // Ties in position may be ordered differently; compare only when unique.
            let mut positions: Vec<f64> = input.iter().map(|iv| iv.position).collect();
            positions.sort_by(|x, y| x.partial_cmp(y).unwrap());
            prop_assume!(positions.windows(2).all(|w| w[1] - w[0] > 1e-9));
            for (k, x) in a.iter().enumerate() {
                prop_assert!((x - b[input.len() - 1 - k]).abs() < 1e-6);
            }
        }

        #[test]
        fn feasible_input_is_unchanged(starts in prop::collection::vec(0.0f64..5.0, 1..8)) {
            // Lay intervals out with explicit gaps so the input already satisfies the rows.
            let mut pos = 0.0;
            let mut input = Vec::new();
            for gap in starts {
                input.push(IntervalSpec::new(pos, 1.0));
                pos += 1.0 + gap + 0.5;
            }
            let out = space_apart(&input, 0.5, SpacingBounds::default()).unwrap();
            for (x, iv) in out.iter().zip(&input) {
                prop_assert!((x - iv.position).abs() < 1e-9);
            }
        }
    }
}
