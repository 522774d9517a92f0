//! Composite placement loss.
//!
//! Decodes a flat vector `[x0, y0, x1, y1, ...]` of lower-left corners and
//! scores the arrangement:
//!
//! ```text
//! loss = mean(own-curve distance)
//!      + w_spread * mean(pairwise center distance)
//!      + w_other  * mean(min distance to other curves)   (0 with one curve)
//!      + penalty  * (Σ overflow² + Σ max(0, line_buffer − min curve distance)²)
//! ```

use crate::geom::{distance, Curve, LabelBox, Point, Rect};

use super::PlacementCfg;

/// Unweighted loss components of one arrangement.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LossTerms {
    pub own: f64,
    pub spread: f64,
    pub other: f64,
    /// Soft-constraint violation before scaling by the penalty.
    pub violation: f64,
}

impl LossTerms {
    pub fn total(&self, w_spread: f64, w_other: f64, penalty: f64) -> f64 {
        self.own + w_spread * self.spread + w_other * self.other + penalty * self.violation
    }
}

/// Loss for label `i` targeting curve `i`.
#[derive(Clone, Copy, Debug)]
pub struct LabelLoss<'a> {
    bbox: Rect,
    boxes: &'a [LabelBox],
    curves: &'a [Curve],
    line_buffer: f64,
    w_spread: f64,
    w_other: f64,
    penalty: f64,
}

impl<'a> LabelLoss<'a> {
    pub fn new(bbox: &Rect, boxes: &'a [LabelBox], curves: &'a [Curve], cfg: &PlacementCfg) -> Self {
        Self {
            bbox: *bbox,
            boxes,
            curves,
            line_buffer: cfg.line_buffer,
            w_spread: cfg.w_spread,
            w_other: cfg.w_other,
            penalty: 1.0,
        }
    }

    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    #[inline]
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    /// Label rects for the flat corner vector.
    pub fn rects(&self, x: &[f64]) -> Vec<Rect> {
        self.boxes
            .iter()
            .enumerate()
            .map(|(i, &b)| Rect::at(Point::new(x[2 * i], x[2 * i + 1]), b))
            .collect()
    }

    pub fn terms(&self, x: &[f64]) -> LossTerms {
        let n = self.boxes.len();
        if n == 0 {
            return LossTerms::default();
        }
        let rects = self.rects(x);
        let mut own = 0.0;
        let mut other = 0.0;
        let mut violation = 0.0;
        for (i, rect) in rects.iter().enumerate() {
            let mut nearest = f64::INFINITY;
            let mut nearest_other = f64::INFINITY;
            for (k, curve) in self.curves.iter().enumerate() {
                let d = curve.distance_to_rect(rect);
                nearest = nearest.min(d);
                if k == i {
                    own += d;
                } else {
                    nearest_other = nearest_other.min(d);
                }
            }
            if self.curves.len() > 1 {
                other += nearest_other;
            }
            let overflow = rect.overflow(&self.bbox);
            let clearance = (self.line_buffer - nearest).max(0.0);
            violation += overflow * overflow + clearance * clearance;
        }

        let centers: Vec<Point> = rects.iter().map(Rect::center).collect();
        let mut spread = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                spread += distance(centers[i], centers[j]);
                pairs += 1;
            }
        }
        if pairs > 0 {
            spread /= pairs as f64;
        }

        LossTerms {
            own: own / n as f64,
            spread,
            other: other / n as f64,
            violation,
        }
    }

    pub fn eval(&self, x: &[f64]) -> f64 {
        self.terms(x).total(self.w_spread, self.w_other, self.penalty)
    }
}
