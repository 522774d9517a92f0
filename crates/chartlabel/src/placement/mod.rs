//! 2-D label placement: best of several annealed local searches.
//!
//! Each restart draws a start from `ValidRegionSampler`, then calls the
//! minimizer `penalty_incs` times on `LabelLoss`, doubling the penalty after
//! every round (1, 2, 4, ...). The restart with the lowest final loss wins.
//! No global optimality is claimed.
//!
//! Label `i` targets curve `i`; every other curve is avoided at lower
//! priority through `w_other` and the clearance penalty.

mod loss;

use rand::Rng;
use tracing::debug;

use crate::cfg::{REFINE_MIN_GAIN, SETTLED_VIOLATION};
use crate::error::LayoutError;
use crate::geom::{Curve, LabelBox, Point, Rect};
use crate::minimize::{Minimizer, NelderMead};
use crate::sampler::ValidRegionSampler;

pub use loss::{LabelLoss, LossTerms};

/// Tunables for `place_labels`. The weights are in chart units and are
/// defaults, not derived constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCfg {
    pub restarts: usize,
    pub penalty_incs: usize,
    pub line_buffer: f64,
    /// Weight on mean pairwise center distance; negative rewards spread.
    pub w_spread: f64,
    /// Weight on distance to non-target curves; negative rewards distance.
    pub w_other: f64,
}

impl Default for PlacementCfg {
    fn default() -> Self {
        Self {
            restarts: 10,
            penalty_incs: 14,
            line_buffer: 1.0,
            w_spread: -0.1,
            w_other: -0.2,
        }
    }
}

impl PlacementCfg {
    pub fn with_restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_penalty_incs(mut self, penalty_incs: usize) -> Self {
        self.penalty_incs = penalty_incs;
        self
    }

    pub fn with_line_buffer(mut self, line_buffer: f64) -> Self {
        self.line_buffer = line_buffer;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.restarts == 0 {
            return Err(LayoutError::invalid("restarts must be >= 1"));
        }
        if !self.line_buffer.is_finite() || self.line_buffer < 0.0 {
            return Err(LayoutError::invalid(format!(
                "line_buffer must be finite and >= 0 (got {})",
                self.line_buffer
            )));
        }
        if !self.w_spread.is_finite() || !self.w_other.is_finite() {
            return Err(LayoutError::invalid("loss weights must be finite"));
        }
        Ok(())
    }
}

/// Positions plus the final loss they scored.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    /// Lower-left corner per label box, in input order.
    pub positions: Vec<Point>,
    pub loss: f64,
}

pub fn place_labels<R: Rng + ?Sized>(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    rng: &mut R,
) -> Result<Vec<Point>, LayoutError> {
    place_labels_detailed(bbox, boxes, curves, cfg, rng).map(|p| p.positions)
}

pub fn place_labels_detailed<R: Rng + ?Sized>(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    rng: &mut R,
) -> Result<Placement, LayoutError> {
    restart_search(bbox, boxes, curves, cfg, rng, &NelderMead::default())
}

/// `place_labels` with a caller-supplied local minimizer.
pub fn place_labels_with<R: Rng + ?Sized>(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    rng: &mut R,
    minimizer: &dyn Minimizer,
) -> Result<Vec<Point>, LayoutError> {
    restart_search(bbox, boxes, curves, cfg, rng, minimizer).map(|p| p.positions)
}

/// One anneal chain from `initial` (no sampling, `restarts` is ignored).
///
/// A start that already meets the clearance and bbox constraints is only
/// re-minimized at the final penalty, and is returned unchanged unless that
/// lowers the loss noticeably. Refining a finished placement is a no-op.
pub fn refine_labels(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    initial: &[Point],
) -> Result<Vec<Point>, LayoutError> {
    refine_labels_detailed(bbox, boxes, curves, cfg, initial).map(|p| p.positions)
}

pub fn refine_labels_detailed(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    initial: &[Point],
) -> Result<Placement, LayoutError> {
    validate_inputs(bbox, boxes, curves)?;
    cfg.validate()?;
    if initial.len() != boxes.len() {
        return Err(LayoutError::invalid(format!(
            "{} initial positions for {} label boxes",
            initial.len(),
            boxes.len()
        )));
    }
    if boxes.is_empty() {
        return Ok(Placement {
            positions: Vec::new(),
            loss: 0.0,
        });
    }
    let loss = LabelLoss::new(bbox, boxes, curves, cfg);
    let start = flatten(initial);
    let last = final_penalty(cfg.penalty_incs);
    let scored = loss.with_penalty(last);
    let start_loss = scored.eval(&start);
    // Settled starts skip the low-penalty rounds.
    let candidate = if scored.terms(&start).violation <= SETTLED_VIOLATION {
        anneal(&loss, &NelderMead::default(), start, last, 1)
    } else {
        anneal(&loss, &NelderMead::default(), start, 1.0, cfg.penalty_incs)
    };
    if candidate.loss < start_loss - REFINE_MIN_GAIN {
        Ok(candidate)
    } else {
        debug!(loss = start_loss, "refine kept the initial placement");
        Ok(Placement {
            positions: initial.to_vec(),
            loss: start_loss,
        })
    }
}

fn restart_search<R: Rng + ?Sized>(
    bbox: &Rect,
    boxes: &[LabelBox],
    curves: &[Curve],
    cfg: &PlacementCfg,
    rng: &mut R,
    minimizer: &dyn Minimizer,
) -> Result<Placement, LayoutError> {
    validate_inputs(bbox, boxes, curves)?;
    cfg.validate()?;
    if boxes.is_empty() {
        return Ok(Placement {
            positions: Vec::new(),
            loss: 0.0,
        });
    }
    let sampler = ValidRegionSampler::new(bbox, boxes, curves, cfg.line_buffer);
    let loss = LabelLoss::new(bbox, boxes, curves, cfg);
    let mut best: Option<Placement> = None;
    for restart in 0..cfg.restarts {
        let start = flatten(&sampler.sample(rng));
        let candidate = anneal(&loss, minimizer, start, 1.0, cfg.penalty_incs);
        debug!(restart, loss = candidate.loss, "placement restart finished");
        if best.as_ref().map_or(true, |b| candidate.loss < b.loss) {
            best = Some(candidate);
        }
    }
    best.ok_or_else(|| LayoutError::invalid("no restart produced a placement"))
}

/// Penalty of the last round of a `rounds`-round schedule from 1.
fn final_penalty(rounds: usize) -> f64 {
    2f64.powi(rounds.saturating_sub(1) as i32)
}

/// Minimize with penalties `first`, `2 * first`, ... and score with the last one.
fn anneal(
    loss: &LabelLoss<'_>,
    minimizer: &dyn Minimizer,
    start: Vec<f64>,
    first: f64,
    rounds: usize,
) -> Placement {
    let mut x = start;
    let mut penalty = first;
    let mut last = penalty;
    for _ in 0..rounds {
        let stage = loss.with_penalty(penalty);
        x = minimizer.minimize(&|v: &[f64]| stage.eval(v), &x);
        last = penalty;
        penalty *= 2.0;
    }
    let value = loss.with_penalty(last).eval(&x);
    Placement {
        positions: x.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect(),
        loss: value,
    }
}

fn flatten(points: &[Point]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn validate_inputs(bbox: &Rect, boxes: &[LabelBox], curves: &[Curve]) -> Result<(), LayoutError> {
    if boxes.len() != curves.len() {
        return Err(LayoutError::invalid(format!(
            "{} label boxes but {} curves; label i targets curve i",
            boxes.len(),
            curves.len()
        )));
    }
    let finite = [bbox.x, bbox.y, bbox.width, bbox.height]
        .iter()
        .all(|v| v.is_finite());
    if !finite {
        return Err(LayoutError::invalid("bounding box must be finite"));
    }
    if let Some(i) = boxes
        .iter()
        .position(|b| !(b.width >= 0.0 && b.height >= 0.0) || !b.width.is_finite() || !b.height.is_finite())
    {
        return Err(LayoutError::invalid(format!(
            "label box {i} needs a finite non-negative size"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests;
