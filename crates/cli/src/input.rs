//! Problem files: JSON for every command, CSV (`position,width`) for spacing.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chartlabel::geom::{Curve, LabelBox, Rect};
use chartlabel::spacing::IntervalSpec;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// `{"intervals": [[position, width], ...]}`
#[derive(Debug, Deserialize)]
pub struct SpacingFile {
    pub intervals: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RectJson {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SizeJson {
    pub width: f64,
    pub height: f64,
}

/// `{"bbox": {...}, "labels": [{"width", "height"}], "curves": [[[x, y], ...]]}`
#[derive(Debug, Deserialize)]
pub struct PlacementFile {
    pub bbox: RectJson,
    pub labels: Vec<SizeJson>,
    pub curves: Vec<Vec<(f64, f64)>>,
}

/// Placement problem in library types.
pub struct PlacementProblem {
    pub bbox: Rect,
    pub boxes: Vec<LabelBox>,
    pub curves: Vec<Curve>,
}

pub fn read_intervals(path: &Path) -> Result<Vec<IntervalSpec>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => read_intervals_csv(path),
        _ => {
            let file: SpacingFile = read_json(path)?;
            Ok(file.intervals.into_iter().map(IntervalSpec::from).collect())
        }
    }
}

fn read_intervals_csv(path: &Path) -> Result<Vec<IntervalSpec>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([
            col("position").cast(DataType::Float64),
            col("width").cast(DataType::Float64),
        ])
        .collect()
        .with_context(|| format!("reading position,width columns from {}", path.display()))?;
    tracing::debug!(rows = df.height(), "intervals csv loaded");
    let position = df.column("position")?.f64()?;
    let width = df.column("width")?.f64()?;
    position
        .into_iter()
        .zip(width.into_iter())
        .enumerate()
        .map(|(i, row)| match row {
            (Some(p), Some(w)) => Ok(IntervalSpec::new(p, w)),
            _ => bail!("{}: row {i} has an empty position or width", path.display()),
        })
        .collect()
}

pub fn read_placement(path: &Path) -> Result<PlacementProblem> {
    let file: PlacementFile = read_json(path)?;
    let bbox = Rect::new(file.bbox.x, file.bbox.y, file.bbox.width, file.bbox.height)
        .context("bbox")?;
    let boxes = file
        .labels
        .iter()
        .map(|s| LabelBox::new(s.width, s.height))
        .collect();
    let curves = file
        .curves
        .iter()
        .enumerate()
        .map(|(i, xy)| Curve::from_xy(xy).with_context(|| format!("curve {i}")))
        .collect::<Result<Vec<_>>>()?;
    Ok(PlacementProblem {
        bbox,
        boxes,
        curves,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}
