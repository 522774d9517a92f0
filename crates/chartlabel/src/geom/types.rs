//! Basic 2D value types shared by the kernel.
//!
//! - `Point`: alias of `nalgebra::Vector2<f64>`.
//! - `Line`, `Rect`, `Polygon`, `Curve`, `LabelBox`: transient per layout call.
//! - `LineCap`: end treatment for buffer polygons (`line_to_polygon`).

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector2;

/// 2D point in chart units.
pub type Point = Vector2<f64>;

/// Errors raised when constructing or parsing geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Rect with negative width or height.
    NegativeSize { width: f64, height: f64 },
    /// Polygon with fewer than 3 points or curve with fewer than 2.
    TooFewPoints { needed: usize, got: usize },
    /// Unknown line cap name.
    UnknownLineCap(String),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::NegativeSize { width, height } => {
                write!(f, "rect size must be non-negative (got {width}x{height})")
            }
            GeometryError::TooFewPoints { needed, got } => {
                write!(f, "need at least {needed} points, got {got}")
            }
            GeometryError::UnknownLineCap(name) => write!(
                f,
                "unknown line cap {name:?} (expected butt, square or angle)"
            ),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Segment between two points. Degenerate when `a == b`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub a: Point,
    pub b: Point,
}

impl Line {
    #[inline]
    pub fn new(a: Point, b: Point) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn direction(&self) -> Point {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

/// Axis-aligned rectangle; `(x, y)` is the minimum corner.
///
/// Invariants:
/// - `width >= 0`, `height >= 0` (zero collapses to a segment or point).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        if width < 0.0 || height < 0.0 || width.is_nan() || height.is_nan() {
            return Err(GeometryError::NegativeSize { width, height });
        }
        Ok(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Rect with minimum corner `corner` and the footprint of `size`.
    #[inline]
    pub fn at(corner: Point, size: LabelBox) -> Self {
        Self {
            x: corner.x,
            y: corner.y,
            width: size.width,
            height: size.height,
        }
    }

    #[inline]
    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + 0.5 * self.width, self.y + 0.5 * self.height)
    }
}

/// Simple polygon, implicitly closed. Winding is not fixed.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub pts: Vec<Point>,
}

impl Polygon {
    pub fn new(pts: Vec<Point>) -> Result<Self, GeometryError> {
        if pts.len() < 3 {
            return Err(GeometryError::TooFewPoints {
                needed: 3,
                got: pts.len(),
            });
        }
        Ok(Self { pts })
    }
}

/// Polyline an item is drawn along.
#[derive(Clone, Debug, PartialEq)]
pub struct Curve {
    pub pts: Vec<Point>,
}

impl Curve {
    pub fn new(pts: Vec<Point>) -> Result<Self, GeometryError> {
        if pts.len() < 2 {
            return Err(GeometryError::TooFewPoints {
                needed: 2,
                got: pts.len(),
            });
        }
        Ok(Self { pts })
    }

    /// Build from `(x, y)` pairs.
    pub fn from_xy(xy: &[(f64, f64)]) -> Result<Self, GeometryError> {
        Self::new(xy.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }
}

/// Label footprint; positioned only after solving.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelBox {
    pub width: f64,
    pub height: f64,
}

impl LabelBox {
    #[inline]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// End treatment for segment buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineCap {
    /// Flush with the segment ends.
    Butt,
    /// Extends past each end by half the width.
    Square,
    /// Adds a mitred tip point past each end.
    Angle,
}

impl FromStr for LineCap {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "butt" => Ok(LineCap::Butt),
            "square" => Ok(LineCap::Square),
            "angle" => Ok(LineCap::Angle),
            other => Err(GeometryError::UnknownLineCap(other.to_string())),
        }
    }
}
