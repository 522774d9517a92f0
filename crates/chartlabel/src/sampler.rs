//! Valid-region sampler: random lower-left corners that keep a label box
//! inside the bounding box and clear of every curve buffer.
//!
//! Construction
//! - Free region: `bbox` minus the square-capped buffer (width `2*buffer`) of
//!   every curve segment.
//! - Per box `(w, h)`: the free region intersected with its `(-w, 0)`,
//!   `(-w, -h)` and `(0, -h)` translates, so all four corners are free. A box
//!   taller or wider than a buffer could still straddle it with its corners
//!   on both sides, so the sweep of each buffer by the box is removed too.
//! - Pieces are weighted by area (`WeightedIndex`); a point is drawn by
//!   rejection inside the chosen piece's bounding rect.
//!
//! Boxes without any feasible position fall back to a uniform corner inside
//! `bbox` shrunk by the box size.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use tracing::debug;

use crate::cfg::SAMPLE_ATTEMPTS;
use crate::geom::{line_to_polygon, Curve, LabelBox, LineCap, Point, Polygon, Rect};
use crate::region::{Region, RegionPiece};

/// Per-box feasible region and its area-weighted piece index.
#[derive(Clone, Debug)]
struct Slot {
    size: LabelBox,
    region: Region,
    weights: Option<WeightedIndex<f64>>,
}

#[derive(Clone, Debug)]
pub struct ValidRegionSampler {
    bbox: Rect,
    free: Region,
    slots: Vec<Slot>,
}

impl ValidRegionSampler {
    pub fn new(bbox: &Rect, boxes: &[LabelBox], curves: &[Curve], buffer: f64) -> Self {
        let buffers = buffer_polygons(curves, buffer);
        let free = Region::from_rect(bbox).difference(&Region::union_of(&buffers));
        let slots = boxes
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let region = feasible_corners(&free, &buffers, size);
                let weights = WeightedIndex::new(region.pieces().iter().map(RegionPiece::area)).ok();
                if weights.is_none() {
                    debug!(
                        label = i,
                        width = size.width,
                        height = size.height,
                        "no feasible region for label; sampling falls back to bbox"
                    );
                }
                Slot {
                    size,
                    region,
                    weights,
                }
            })
            .collect();
        Self {
            bbox: *bbox,
            free,
            slots,
        }
    }

    /// One corner per label box, in box order.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Point> {
        self.slots
            .iter()
            .map(|slot| match &slot.weights {
                Some(index) => {
                    let piece = &slot.region.pieces()[index.sample(rng)];
                    sample_in_piece(piece, rng)
                }
                None => self.fallback(slot.size, rng),
            })
            .collect()
    }

    /// Bounding box minus all curve buffers.
    #[inline]
    pub fn free_region(&self) -> &Region {
        &self.free
    }

    /// Feasible lower-left corners for box `i`.
    pub fn feasible_region(&self, i: usize) -> Option<&Region> {
        self.slots.get(i).map(|s| &s.region)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn fallback<R: Rng + ?Sized>(&self, size: LabelBox, rng: &mut R) -> Point {
        let span_x = (self.bbox.width - size.width).max(0.0);
        let span_y = (self.bbox.height - size.height).max(0.0);
        Point::new(
            self.bbox.x + rng.gen::<f64>() * span_x,
            self.bbox.y + rng.gen::<f64>() * span_y,
        )
    }
}

/// Square-capped buffer of width `2*buffer` around every curve segment.
fn buffer_polygons(curves: &[Curve], buffer: f64) -> Vec<Polygon> {
    if buffer <= 0.0 {
        return Vec::new();
    }
    curves
        .iter()
        .flat_map(|c| c.lines())
        .map(|l| line_to_polygon(&l, LineCap::Square, 2.0 * buffer))
        .collect()
}

fn feasible_corners(free: &Region, buffers: &[Polygon], size: LabelBox) -> Region {
    let (w, h) = (size.width, size.height);
    let corners = free
        .intersection(&free.translate(-w, 0.0))
        .intersection(&free.translate(-w, -h))
        .intersection(&free.translate(0.0, -h));
    if corners.is_empty() || buffers.is_empty() {
        return corners;
    }
    let offsets = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];
    let sweeps: Vec<Polygon> = buffers
        .iter()
        .filter_map(|b| {
            let pts: Vec<Point> = b
                .pts
                .iter()
                .flat_map(|p| offsets.iter().map(move |o| p - o))
                .collect();
            Polygon::convex_hull(&pts)
        })
        .collect();
    corners.difference(&Region::union_of(&sweeps))
}

fn sample_in_piece<R: Rng + ?Sized>(piece: &RegionPiece, rng: &mut R) -> Point {
    let r = piece.bounding_rect();
    for _ in 0..SAMPLE_ATTEMPTS {
        let p = Point::new(
            rng.gen_range(r.x..=r.x + r.width),
            rng.gen_range(r.y..=r.y + r.height),
        );
        if piece.contains_point(p) {
            return p;
        }
    }
    piece.outer.pts[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene() -> (Rect, Vec<LabelBox>, Vec<Curve>) {
        let bbox = Rect::new(0.0, 0.0, 20.0, 20.0).unwrap();
        let boxes = vec![LabelBox::new(18.0, 8.0)];
        let curves = vec![Curve::from_xy(&[(0.0, 10.0), (20.0, 10.0)]).unwrap()];
        (bbox, boxes, curves)
    }

    #[test]
    fn feasible_region_excludes_straddling_boxes() {
        let (bbox, boxes, curves) = scene();
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &curves, 1.0);
        // Free: two 20x9 bands. Corners: x in [0, 2], y in [0, 1] or [11, 12].
        assert!((sampler.free_region().area() - 360.0).abs() < 1e-6);
        let region = sampler.feasible_region(0).unwrap();
        assert!((region.area() - 4.0).abs() < 1e-6);
        assert!(!region.contains_point(Point::new(1.0, 5.0)));
    }

    #[test]
    fn samples_keep_boxes_inside_and_clear() {
        let (bbox, boxes, curves) = scene();
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &curves, 1.0);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let pts = sampler.sample(&mut rng);
            assert_eq!(pts.len(), 1);
            let rect = Rect::at(pts[0], boxes[0]);
            assert!(bbox.contains_rect(&rect, 1e-6), "{rect:?}");
            // Boolean ops snap to an integer grid; allow for that.
            assert!(curves[0].distance_to_rect(&rect) >= 1.0 - 1e-6, "{rect:?}");
        }
    }

    #[test]
    fn larger_pieces_are_sampled_more_often() {
        let bbox = Rect::new(0.0, 0.0, 30.0, 10.0).unwrap();
        // Vertical line at x = 10 splits the box into 9-wide and 19-wide strips.
        let curves = vec![Curve::from_xy(&[(10.0, 0.0), (10.0, 10.0)]).unwrap()];
        let boxes = vec![LabelBox::new(1.0, 1.0)];
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &curves, 1.0);
        assert_eq!(sampler.feasible_region(0).unwrap().pieces().len(), 2);
        let mut rng = StdRng::seed_from_u64(11);
        let right = (0..1000)
            .filter(|_| sampler.sample(&mut rng)[0].x > 10.0)
            .count();
        // Area ratio 18:8, so roughly 69% land on the right.
        assert!(right > 600 && right < 780, "right = {right}");
    }

    #[test]
    fn oversized_box_falls_back_to_bbox_corner() {
        let bbox = Rect::new(5.0, 5.0, 20.0, 20.0).unwrap();
        let boxes = vec![LabelBox::new(30.0, 30.0)];
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &[], 1.0);
        assert!(sampler.feasible_region(0).unwrap().is_empty());
        let mut rng = StdRng::seed_from_u64(0);
        let p = sampler.sample(&mut rng)[0];
        assert_eq!(p, Point::new(5.0, 5.0));
    }

    #[test]
    fn no_curves_leaves_the_shrunk_bbox() {
        let bbox = Rect::new(0.0, 0.0, 20.0, 20.0).unwrap();
        let boxes = vec![LabelBox::new(18.0, 8.0), LabelBox::new(4.0, 4.0)];
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &[], 1.0);
        assert_eq!(sampler.len(), 2);
        assert!((sampler.feasible_region(0).unwrap().area() - 24.0).abs() < 1e-6);
        assert!((sampler.feasible_region(1).unwrap().area() - 256.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_seed_is_deterministic() {
        let (bbox, boxes, curves) = scene();
        let sampler = ValidRegionSampler::new(&bbox, &boxes, &curves, 1.0);
        let a = sampler.sample(&mut StdRng::seed_from_u64(42));
        let b = sampler.sample(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
