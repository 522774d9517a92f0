//! Rect containment and distances.
//!
//! Distances are 0 when the other shape touches or enters the rect, else the
//! minimum over the four boundary segments.

use super::line::{point_to_line_distance, segments_intersect};
use super::types::{Line, Point, Polygon, Rect};

/// Distance between two closed segments.
pub fn line_to_line_distance(l1: &Line, l2: &Line) -> f64 {
    if segments_intersect(l1, l2, 0.0) {
        return 0.0;
    }
    point_to_line_distance(l1, l2.a)
        .min(point_to_line_distance(l1, l2.b))
        .min(point_to_line_distance(l2, l1.a))
        .min(point_to_line_distance(l2, l1.b))
}

impl Rect {
    /// Corners in counter-clockwise order starting at the minimum corner.
    pub fn corners(&self) -> [Point; 4] {
        let (x0, y0) = (self.x, self.y);
        let (x1, y1) = (self.x + self.width, self.y + self.height);
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ]
    }

    pub fn boundary_lines(&self) -> [Line; 4] {
        let c = self.corners();
        [
            Line::new(c[0], c[1]),
            Line::new(c[1], c[2]),
            Line::new(c[2], c[3]),
            Line::new(c[3], c[0]),
        ]
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon {
            pts: self.corners().to_vec(),
        }
    }

    pub fn contains_point(&self, p: Point, tol: f64) -> bool {
        p.x >= self.x - tol
            && p.x <= self.x + self.width + tol
            && p.y >= self.y - tol
            && p.y <= self.y + self.height + tol
    }

    pub fn contains_line(&self, line: &Line, tol: f64) -> bool {
        self.contains_point(line.a, tol) && self.contains_point(line.b, tol)
    }

    pub fn contains_rect(&self, other: &Rect, tol: f64) -> bool {
        self.contains_point(other.min(), tol) && self.contains_point(other.max(), tol)
    }

    /// Closed-rect overlap (touching counts).
    pub fn intersects_rect(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// Segment enters, crosses or touches the rect.
    pub fn intersects_line(&self, line: &Line) -> bool {
        self.contains_point(line.a, 0.0)
            || self.contains_point(line.b, 0.0)
            || self
                .boundary_lines()
                .iter()
                .any(|edge| segments_intersect(edge, line, 0.0))
    }

    pub fn distance_to_point(&self, p: Point) -> f64 {
        if self.contains_point(p, 0.0) {
            return 0.0;
        }
        self.boundary_lines()
            .iter()
            .map(|edge| point_to_line_distance(edge, p))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance_to_line(&self, line: &Line) -> f64 {
        if self.intersects_line(line) {
            return 0.0;
        }
        self.boundary_lines()
            .iter()
            .map(|edge| line_to_line_distance(edge, line))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance_to_rect(&self, other: &Rect) -> f64 {
        if self.intersects_rect(other) {
            return 0.0;
        }
        self.boundary_lines()
            .iter()
            .map(|edge| other.distance_to_line(edge))
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest distance by which any corner of `self` lies outside `bounds`.
    pub fn overflow(&self, bounds: &Rect) -> f64 {
        self.corners()
            .iter()
            .map(|&c| bounds.distance_to_point(c))
            .fold(0.0, f64::max)
    }

    /// Smallest rect covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let lo = Point::new(self.x.min(other.x), self.y.min(other.y));
        let hi = Point::new(
            (self.x + self.width).max(other.x + other.width),
            (self.y + self.height).max(other.y + other.height),
        );
        Rect {
            x: lo.x,
            y: lo.y,
            width: hi.x - lo.x,
            height: hi.y - lo.y,
        }
    }
}
