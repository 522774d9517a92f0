//! Polyline distances: minimum over the constituent segments.

use super::line::point_to_line_distance;
use super::types::{Curve, Line, Point, Rect};

impl Curve {
    pub fn lines(&self) -> Vec<Line> {
        self.pts
            .windows(2)
            .map(|w| Line::new(w[0], w[1]))
            .collect()
    }

    pub fn distance_to_point(&self, p: Point) -> f64 {
        self.lines()
            .iter()
            .map(|l| point_to_line_distance(l, p))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn distance_to_rect(&self, rect: &Rect) -> f64 {
        let mut best = f64::INFINITY;
        for l in self.lines() {
            let d = rect.distance_to_line(&l);
            if d <= 0.0 {
                return 0.0;
            }
            best = best.min(d);
        }
        best
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.lines().iter().any(|l| rect.intersects_line(l))
    }

    pub fn bounding_rect(&self) -> Rect {
        let (mut x0, mut y0) = (f64::INFINITY, f64::INFINITY);
        let (mut x1, mut y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in &self.pts {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}
