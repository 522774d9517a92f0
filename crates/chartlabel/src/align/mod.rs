//! Render-time alignment of measured chart text.
//!
//! Once a renderer has laid out the chart, text boxes are exact and the
//! estimated spacing can be redone on real metrics. The pass only translates
//! elements; it never re-flows text.
//!
//! Order
//! 1. Reset every element's translation, settle.
//! 2. Ticks of every axis: space apart along the axis within its extent,
//!    settle, re-measure the tick band.
//! 3. Axis titles: center on the extent; shift across the axis when within
//!    `title_gap` of the tick band, settle.
//! 4. Series labels: space apart along their value axis, bounded by the tick
//!    band of that axis (or its extent when it has no ticks), settle.
//!
//! A measurement is never taken between a transform change and the next
//! `await_settle`. Re-running the pass on the same surface gives the same
//! result; it does not stack offsets.

use tracing::{debug, trace};

use crate::cfg::SPACING_EPS;
use crate::error::LayoutError;
use crate::geom::Rect;
use crate::qp::QpError;
use crate::spacing::{space_apart_offsets, IntervalSpec, SpacingBounds};

/// Rendering engine seen by the alignment pass. Calls block; `await_settle`
/// returns once pending transform changes are reflected in `bounding_box`.
pub trait RenderSurface {
    type Element;

    fn bounding_box(&self, el: &Self::Element) -> Rect;
    fn reset_transform(&mut self, el: &Self::Element);
    fn translate(&mut self, el: &Self::Element, dx: f64, dy: f64);
    fn await_settle(&mut self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Elements spread along x.
    Horizontal,
    /// Elements spread along y.
    Vertical,
}

impl Axis {
    fn interval(self, r: &Rect) -> IntervalSpec {
        match self {
            Axis::Horizontal => IntervalSpec::new(r.x, r.width),
            Axis::Vertical => IntervalSpec::new(r.y, r.height),
        }
    }

    fn along(self, r: &Rect) -> (f64, f64) {
        let iv = self.interval(r);
        (iv.position, iv.position + iv.width)
    }

    fn across(self, r: &Rect) -> (f64, f64) {
        match self {
            Axis::Horizontal => (r.y, r.y + r.height),
            Axis::Vertical => (r.x, r.x + r.width),
        }
    }

    fn offset(self, along: f64, across: f64) -> (f64, f64) {
        match self {
            Axis::Horizontal => (along, across),
            Axis::Vertical => (across, along),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AxisLayout<E> {
    pub axis: Axis,
    pub ticks: Vec<E>,
    pub title: Option<E>,
    /// Span of the axis line along `axis`.
    pub extent: (f64, f64),
    /// Minimum gap between neighbouring tick labels.
    pub clearance: f64,
    /// Minimum gap between the title and the tick band.
    pub title_gap: f64,
}

#[derive(Clone, Debug)]
pub struct SeriesLabels<E> {
    pub labels: Vec<E>,
    pub clearance: f64,
    /// Value axis the labels are spread along.
    pub axis: Axis,
}

#[derive(Clone, Debug)]
pub struct AlignmentPlan<E> {
    pub axes: Vec<AxisLayout<E>>,
    pub series: Vec<SeriesLabels<E>>,
}

impl<E> Default for AlignmentPlan<E> {
    fn default() -> Self {
        Self {
            axes: Vec::new(),
            series: Vec::new(),
        }
    }
}

impl<E> AlignmentPlan<E> {
    /// Every element the pass may move.
    pub fn elements(&self) -> impl Iterator<Item = &E> {
        let axes = self
            .axes
            .iter()
            .flat_map(|a| a.ticks.iter().chain(a.title.iter()));
        let series = self.series.iter().flat_map(|s| s.labels.iter());
        axes.chain(series)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AxisReport {
    /// Offset along the axis per tick, in tick order.
    pub tick_offsets: Vec<f64>,
    /// Measured cover of all ticks after spacing.
    pub tick_band: Option<Rect>,
    /// `(dx, dy)` applied to the title.
    pub title_offset: Option<(f64, f64)>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AlignmentReport {
    pub axes: Vec<AxisReport>,
    /// Offsets along the value axis per series label.
    pub series: Vec<Vec<f64>>,
}

pub fn align<S: RenderSurface>(
    surface: &mut S,
    plan: &AlignmentPlan<S::Element>,
) -> Result<AlignmentReport, LayoutError> {
    let mut resets = 0usize;
    for el in plan.elements() {
        surface.reset_transform(el);
        resets += 1;
    }
    surface.await_settle();
    debug!(elements = resets, "alignment reset");

    let mut axes = Vec::with_capacity(plan.axes.len());
    for (k, layout) in plan.axes.iter().enumerate() {
        let tick_offsets = space_along(
            surface,
            &layout.ticks,
            layout.axis,
            layout.clearance,
            Some(layout.extent),
        )?;
        surface.await_settle();
        let tick_band = measure_band(surface, &layout.ticks);
        debug!(axis = k, ticks = layout.ticks.len(), "ticks aligned");
        axes.push(AxisReport {
            tick_offsets,
            tick_band,
            title_offset: None,
        });
    }

    for (layout, report) in plan.axes.iter().zip(axes.iter_mut()) {
        let Some(title) = &layout.title else {
            continue;
        };
        report.title_offset = Some(place_title(surface, title, layout, report.tick_band));
        surface.await_settle();
    }

    let mut series = Vec::with_capacity(plan.series.len());
    for s in &plan.series {
        let bounds = plan
            .axes
            .iter()
            .zip(&axes)
            .find(|(layout, _)| layout.axis == s.axis)
            .map(|(layout, report)| match report.tick_band {
                Some(band) => s.axis.along(&band),
                None => layout.extent,
            });
        let offsets = space_along(surface, &s.labels, s.axis, s.clearance, bounds)?;
        surface.await_settle();
        debug!(labels = s.labels.len(), "series labels aligned");
        series.push(offsets);
    }

    Ok(AlignmentReport { axes, series })
}

/// Measure, solve and translate one group along `axis`. Bounds that cannot
/// hold the group are dropped.
fn space_along<S: RenderSurface>(
    surface: &mut S,
    els: &[S::Element],
    axis: Axis,
    clearance: f64,
    extent: Option<(f64, f64)>,
) -> Result<Vec<f64>, LayoutError> {
    if els.is_empty() {
        return Ok(Vec::new());
    }
    let intervals: Vec<IntervalSpec> = els
        .iter()
        .map(|el| axis.interval(&surface.bounding_box(el)))
        .collect();
    let bounds = match extent {
        Some((a, b)) => {
            let (lo, hi) = (a.min(b), a.max(b));
            let needed: f64 = intervals.iter().map(|iv| iv.width).sum::<f64>()
                + clearance.max(0.0) * (intervals.len() - 1) as f64;
            if needed <= hi - lo {
                SpacingBounds::between(lo, hi)
            } else {
                debug!(needed, available = hi - lo, "group does not fit its bounds; spacing unbounded");
                SpacingBounds::default()
            }
        }
        None => SpacingBounds::default(),
    };
    let offsets = match space_apart_offsets(&intervals, clearance, bounds) {
        // A fit within rounding of the span can still be infeasible.
        Err(LayoutError::Qp(QpError::Infeasible)) if bounds != SpacingBounds::default() => {
            debug!("bounded spacing infeasible; spacing unbounded");
            space_apart_offsets(&intervals, clearance, SpacingBounds::default())?
        }
        other => other?,
    };
    for (el, &off) in els.iter().zip(&offsets) {
        if off.abs() > SPACING_EPS {
            let (dx, dy) = axis.offset(off, 0.0);
            trace!(dx, dy, "translate");
            surface.translate(el, dx, dy);
        }
    }
    Ok(offsets)
}

fn measure_band<S: RenderSurface>(surface: &S, els: &[S::Element]) -> Option<Rect> {
    els.iter()
        .map(|el| surface.bounding_box(el))
        .reduce(|acc, r| acc.union(&r))
}

/// Center the title on the extent; clear the tick band by `title_gap`.
fn place_title<S: RenderSurface>(
    surface: &mut S,
    title: &S::Element,
    layout: &AxisLayout<S::Element>,
    band: Option<Rect>,
) -> (f64, f64) {
    let axis = layout.axis;
    let r = surface.bounding_box(title);
    let (a0, a1) = axis.along(&r);
    let mid = 0.5 * (layout.extent.0 + layout.extent.1);
    let shift_along = mid - 0.5 * (a0 + a1);

    let mut shift_across = 0.0;
    if let Some(band) = band {
        let (dx, dy) = axis.offset(shift_along, 0.0);
        let moved = Rect {
            x: r.x + dx,
            y: r.y + dy,
            ..r
        };
        if moved.distance_to_rect(&band) < layout.title_gap {
            let (b0, b1) = axis.across(&band);
            let (c0, c1) = axis.across(&r);
            shift_across = if c0 + c1 >= b0 + b1 {
                b1 + layout.title_gap - c0
            } else {
                b0 - layout.title_gap - c1
            };
        }
    }

    let (dx, dy) = axis.offset(shift_along, shift_across);
    if dx.abs() > SPACING_EPS || dy.abs() > SPACING_EPS {
        surface.translate(title, dx, dy);
    }
    (dx, dy)
}
