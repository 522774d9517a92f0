//! Point and segment predicates.

use super::types::{Line, LineCap, Point, Polygon};

#[inline]
pub fn distance(p: Point, q: Point) -> f64 {
    (p - q).norm()
}

#[inline]
pub fn points_equal(p: Point, q: Point, tol: f64) -> bool {
    (p.x - q.x).abs() <= tol && (p.y - q.y).abs() <= tol
}

#[inline]
pub(crate) fn cross(u: Point, v: Point) -> f64 {
    u.x * v.y - u.y * v.x
}

/// Distance from `p` to the closest point of the segment.
///
/// Zero-length segments collapse to point distance.
pub fn point_to_line_distance(line: &Line, p: Point) -> f64 {
    let d = line.direction();
    let len2 = d.norm_squared();
    if len2 <= 0.0 {
        return distance(line.a, p);
    }
    let t = ((p - line.a).dot(&d) / len2).clamp(0.0, 1.0);
    distance(line.a + d * t, p)
}

/// Side of `p` relative to the directed segment: sign of `(b - a) x (p - b)`,
/// zeroed within `tol`.
pub fn orientation(line: &Line, p: Point, tol: f64) -> i8 {
    let val = cross(line.direction(), p - line.b);
    if val.abs() <= tol {
        0
    } else if val > 0.0 {
        1
    } else {
        -1
    }
}

/// `p` lies in the bounding rectangle of the segment (inflated by `tol`).
fn in_segment_bounds(line: &Line, p: Point, tol: f64) -> bool {
    p.x <= line.a.x.max(line.b.x) + tol
        && p.x >= line.a.x.min(line.b.x) - tol
        && p.y <= line.a.y.max(line.b.y) + tol
        && p.y >= line.a.y.min(line.b.y) - tol
}

/// Closed-segment intersection test.
pub fn segments_intersect(l1: &Line, l2: &Line, tol: f64) -> bool {
    let o1 = orientation(l1, l2.a, tol);
    let o2 = orientation(l1, l2.b, tol);
    let o3 = orientation(l2, l1.a, tol);
    let o4 = orientation(l2, l1.b, tol);

    if o1 != o2 && o3 != o4 {
        return true;
    }
    // Colinear cases: an endpoint on the other segment's supporting line.
    (o1 == 0 && in_segment_bounds(l1, l2.a, tol))
        || (o2 == 0 && in_segment_bounds(l1, l2.b, tol))
        || (o3 == 0 && in_segment_bounds(l2, l1.a, tol))
        || (o4 == 0 && in_segment_bounds(l2, l1.b, tol))
}

/// Buffer polygon of total `width` around the segment.
///
/// Degenerate segments use the x axis as direction so the result is still a
/// proper polygon for `Square` and `Angle` caps.
pub fn line_to_polygon(line: &Line, cap: LineCap, width: f64) -> Polygon {
    let h = 0.5 * width.abs();
    let len = line.length();
    let u = if len > 0.0 {
        line.direction() / len
    } else {
        Point::new(1.0, 0.0)
    };
    let n = Point::new(-u.y, u.x) * h;
    let (a, b) = match cap {
        LineCap::Square => (line.a - u * h, line.b + u * h),
        LineCap::Butt | LineCap::Angle => (line.a, line.b),
    };
    let pts = match cap {
        LineCap::Butt | LineCap::Square => vec![a + n, b + n, b - n, a - n],
        LineCap::Angle => vec![a + n, b + n, b + u * h, b - n, a - n, a - u * h],
    };
    Polygon { pts }
}
