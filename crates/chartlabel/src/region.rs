//! Planar regions with boolean operations (backed by `i_overlay`).
//!
//! A `Region` is a possibly-disjoint union of pieces, each an outer polygon
//! with optional holes. Boolean results that degenerate (zero area, empty)
//! come back as an empty region rather than an error.
//!
//! Fill rules
//! - Unions of caller polygons use non-zero winding on counter-clockwise
//!   contours, so overlapping inputs merge.
//! - Operations between regions use even-odd on the flattened contours
//!   (outer + holes), which is winding-agnostic.

use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;

use crate::cfg::MIN_REGION_AREA;
use crate::geom::{Point, Polygon, Rect};

type Contour = Vec<[f64; 2]>;

/// Outer boundary plus holes.
#[derive(Clone, Debug)]
pub struct RegionPiece {
    pub outer: Polygon,
    pub holes: Vec<Polygon>,
}

impl RegionPiece {
    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes.iter().map(Polygon::area).sum();
        (self.outer.area() - holes).max(0.0)
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.outer.contains_point(p, 0.0) && !self.holes.iter().any(|h| h.contains_point(p, 0.0))
    }

    pub fn bounding_rect(&self) -> Rect {
        self.outer.bounding_rect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct Region {
    pieces: Vec<RegionPiece>,
}

impl Region {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_polygon(poly: &Polygon) -> Self {
        Self::union_of(std::slice::from_ref(poly))
    }

    pub fn from_rect(rect: &Rect) -> Self {
        Self::from_polygon(&rect.to_polygon())
    }

    /// Union of arbitrary simple polygons (any winding).
    pub fn union_of(polys: &[Polygon]) -> Self {
        let subj: Vec<Contour> = polys
            .iter()
            .filter(|p| p.pts.len() >= 3 && p.area() > MIN_REGION_AREA)
            .map(|p| to_contour(&p.to_ccw()))
            .collect();
        if subj.is_empty() {
            return Self::empty();
        }
        let clip: Vec<Contour> = Vec::new();
        let shapes: Vec<Vec<Contour>> = subj.overlay(&clip, OverlayRule::Union, FillRule::NonZero);
        Self::from_shapes(shapes)
    }

    pub fn union(&self, other: &Region) -> Region {
        self.boolean(other, OverlayRule::Union)
    }

    pub fn intersection(&self, other: &Region) -> Region {
        if self.is_empty() || other.is_empty() {
            return Self::empty();
        }
        self.boolean(other, OverlayRule::Intersect)
    }

    pub fn difference(&self, other: &Region) -> Region {
        if self.is_empty() {
            return Self::empty();
        }
        if other.is_empty() {
            return self.clone();
        }
        self.boolean(other, OverlayRule::Difference)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Region {
        Region {
            pieces: self
                .pieces
                .iter()
                .map(|piece| RegionPiece {
                    outer: piece.outer.translate(dx, dy),
                    holes: piece.holes.iter().map(|h| h.translate(dx, dy)).collect(),
                })
                .collect(),
        }
    }

    #[inline]
    pub fn pieces(&self) -> &[RegionPiece] {
        &self.pieces
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    pub fn area(&self) -> f64 {
        self.pieces.iter().map(RegionPiece::area).sum()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.pieces.iter().any(|piece| piece.contains_point(p))
    }

    fn contours(&self) -> Vec<Contour> {
        let mut out = Vec::new();
        for piece in &self.pieces {
            out.push(to_contour(&piece.outer));
            out.extend(piece.holes.iter().map(to_contour));
        }
        out
    }

    fn boolean(&self, other: &Region, rule: OverlayRule) -> Region {
        let subj = self.contours();
        let clip = other.contours();
        let shapes: Vec<Vec<Contour>> = subj.overlay(&clip, rule, FillRule::EvenOdd);
        Self::from_shapes(shapes)
    }

    fn from_shapes(shapes: Vec<Vec<Contour>>) -> Region {
        let mut pieces = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let mut contours = shape.into_iter().filter(|c| c.len() >= 3).map(from_contour);
            let Some(outer) = contours.next() else {
                continue;
            };
            let piece = RegionPiece {
                outer,
                holes: contours.collect(),
            };
            if piece.area() > MIN_REGION_AREA {
                pieces.push(piece);
            }
        }
        Region { pieces }
    }
}

fn to_contour(poly: &Polygon) -> Contour {
    poly.pts.iter().map(|p| [p.x, p.y]).collect()
}

fn from_contour(contour: Contour) -> Polygon {
    Polygon {
        pts: contour.into_iter().map(|[x, y]| Point::new(x, y)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn rect(x: f64, y: f64, w: f64, h: f64) -> Region {
        Region::from_rect(&Rect::new(x, y, w, h).unwrap())
    }

    #[test]
    fn difference_splits_into_pieces() {
        let bbox = rect(0.0, 0.0, 10.0, 10.0);
        let band = rect(-1.0, 4.0, 12.0, 2.0);
        let free = bbox.difference(&band);
        assert_eq!(free.pieces().len(), 2);
        assert!((free.area() - 80.0).abs() < 1e-6);
        assert!(free.contains_point(vector![5.0, 2.0]));
        assert!(!free.contains_point(vector![5.0, 5.0]));
    }

    #[test]
    fn difference_can_leave_a_hole() {
        let bbox = rect(0.0, 0.0, 10.0, 10.0);
        let island = rect(4.0, 4.0, 2.0, 2.0);
        let free = bbox.difference(&island);
        assert!((free.area() - 96.0).abs() < 1e-6);
        assert!(!free.contains_point(vector![5.0, 5.0]));
        assert!(free.contains_point(vector![1.0, 1.0]));
    }

    #[test]
    fn union_merges_overlaps_of_mixed_winding() {
        let a = Rect::new(0.0, 0.0, 2.0, 2.0).unwrap().to_polygon();
        let b = Rect::new(1.0, 0.0, 2.0, 2.0).unwrap().to_polygon();
        let b_cw = Polygon::new(b.pts.iter().rev().copied().collect()).unwrap();
        let u = Region::union_of(&[a, b_cw]);
        assert_eq!(u.pieces().len(), 1);
        assert!((u.area() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn empty_results_are_not_errors() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(5.0, 5.0, 1.0, 1.0);
        assert!(a.intersection(&b).is_empty());
        assert!(a.difference(&a).is_empty());
        assert!(Region::empty().intersection(&a).is_empty());
        assert!((a.union(&b).area() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn translate_then_intersect() {
        let a = rect(0.0, 0.0, 4.0, 4.0);
        let shifted = a.translate(-1.0, -1.0);
        let both = a.intersection(&shifted);
        assert!((both.area() - 9.0).abs() < 1e-6);
    }
}
