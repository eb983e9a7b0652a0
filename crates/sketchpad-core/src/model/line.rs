//! Freehand stroke.

use super::StrokeColor;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a decoded stroke is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("stroke size must be a positive finite number, got {0}")]
    InvalidSize(f64),
    #[error("stroke contains a non-finite coordinate")]
    NonFinitePoint,
}

/// One committed freehand stroke: an ordered list of points with a fixed
/// color and width.
///
/// Lines are built point by point by the capture engine and are read-only
/// once they land in a [`SketchDocument`](super::SketchDocument).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LineRecord")]
pub struct Line {
    points: Vec<Point>,
    color: StrokeColor,
    size: f64,
}

/// Wire shape of a line before validation.
#[derive(Deserialize)]
struct LineRecord {
    points: Vec<Point>,
    color: StrokeColor,
    size: f64,
}

impl TryFrom<LineRecord> for Line {
    type Error = LineError;

    fn try_from(record: LineRecord) -> Result<Self, Self::Error> {
        Line::new(record.points, record.color, record.size)
    }
}

impl Line {
    /// Create a stroke, validating its width and coordinates.
    pub fn new(points: Vec<Point>, color: StrokeColor, size: f64) -> Result<Self, LineError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(LineError::InvalidSize(size));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(LineError::NonFinitePoint);
        }
        Ok(Self { points, color, size })
    }

    /// Start an empty stroke. The width must already be validated.
    pub(crate) fn started(color: StrokeColor, size: f64) -> Self {
        Self {
            points: Vec::new(),
            color,
            size,
        }
    }

    /// Append a point. Only the capture engine grows a line.
    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn color(&self) -> StrokeColor {
        self.color
    }

    /// Stroke width in pixels.
    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A stroke leaves ink only once it has at least one segment.
    pub fn is_visible(&self) -> bool {
        self.points.len() >= 2
    }

    /// Bounding box of the ink, including half the stroke width.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };

        let rect = self
            .points
            .iter()
            .skip(1)
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p));
        rect.inflate(self.size / 2.0, self.size / 2.0)
    }
}
