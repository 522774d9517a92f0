//! Polygon measures and predicates (winding-agnostic).

use super::line::{cross, point_to_line_distance, points_equal};
use super::types::{Line, Point, Polygon, Rect};

impl Polygon {
    /// Shoelace area; positive for counter-clockwise winding.
    pub fn signed_area(&self) -> f64 {
        let n = self.pts.len();
        let mut acc = 0.0;
        for i in 0..n {
            let p = self.pts[i];
            let q = self.pts[(i + 1) % n];
            acc += p.x * q.y - q.x * p.y;
        }
        0.5 * acc
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    pub fn perimeter(&self) -> f64 {
        self.lines().iter().map(Line::length).sum()
    }

    /// Edges in vertex order, including the closing edge.
    pub fn lines(&self) -> Vec<Line> {
        let n = self.pts.len();
        (0..n)
            .map(|i| Line::new(self.pts[i], self.pts[(i + 1) % n]))
            .collect()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Polygon {
        let t = Point::new(dx, dy);
        Polygon {
            pts: self.pts.iter().map(|p| p + t).collect(),
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        let mut lo = Point::new(f64::INFINITY, f64::INFINITY);
        let mut hi = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.pts {
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
        }
        Rect {
            x: lo.x,
            y: lo.y,
            width: (hi.x - lo.x).max(0.0),
            height: (hi.y - lo.y).max(0.0),
        }
    }

    /// Same polygon with counter-clockwise winding.
    pub fn to_ccw(&self) -> Polygon {
        if self.signed_area() < 0.0 {
            Polygon {
                pts: self.pts.iter().rev().copied().collect(),
            }
        } else {
            self.clone()
        }
    }

    /// Ray-crossing parity; points within `tol` of an edge count as inside.
    pub fn contains_point(&self, p: Point, tol: f64) -> bool {
        let n = self.pts.len();
        if n == 0 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let a = self.pts[i];
            let b = self.pts[j];
            if (a.y > p.y) != (b.y > p.y) {
                let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
                if p.x < x_cross {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
            || self
                .lines()
                .iter()
                .any(|edge| point_to_line_distance(edge, p) <= tol)
    }

    /// Vertex-cycle equality up to start vertex and winding.
    pub fn equals(&self, other: &Polygon, tol: f64) -> bool {
        let n = self.pts.len();
        if n != other.pts.len() {
            return false;
        }
        let same_cycle = |reversed: bool| {
            (0..n).any(|shift| {
                (0..n).all(|i| {
                    let j = if reversed {
                        (shift + n - i) % n
                    } else {
                        (shift + i) % n
                    };
                    points_equal(self.pts[i], other.pts[j], tol)
                })
            })
        };
        same_cycle(false) || same_cycle(true)
    }

    /// Andrew's monotone chain hull in CCW order; `None` when the points span
    /// no area.
    pub fn convex_hull(points: &[Point]) -> Option<Polygon> {
        let mut pts = points.to_vec();
        pts.sort_by(|a, b| {
            a.x.partial_cmp(&b.x)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
        });
        pts.dedup_by(|a, b| points_equal(*a, *b, 1e-12));
        if pts.len() < 3 {
            return None;
        }
        let turn = |a: Point, b: Point, c: Point| cross(b - a, c - a);
        let mut lower: Vec<Point> = Vec::with_capacity(pts.len());
        for p in &pts {
            while lower.len() >= 2 && turn(lower[lower.len() - 2], lower[lower.len() - 1], *p) <= 0.0 {
                lower.pop();
            }
            lower.push(*p);
        }
        let mut upper: Vec<Point> = Vec::with_capacity(pts.len());
        for p in pts.iter().rev() {
            while upper.len() >= 2 && turn(upper[upper.len() - 2], upper[upper.len() - 1], *p) <= 0.0 {
                upper.pop();
            }
            upper.push(*p);
        }
        lower.pop();
        upper.pop();
        lower.extend(upper);
        (lower.len() >= 3).then_some(Polygon { pts: lower })
    }
}
