//! Sketch document: the ordered list of committed strokes.

use super::Line;
use kurbo::Rect;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All committed strokes of one sketch, earliest drawn first.
///
/// Insertion order is z-order. Strokes are only ever appended, or dropped
/// all at once by [`SketchDocument::clear`].
///
/// Deserializing is strict: one malformed stroke rejects the document. Stored
/// data that may be damaged goes through [`SketchDocument::from_value_lenient`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchDocument {
    lines: Vec<Line>,
}

/// Result of a tolerant decode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub document: SketchDocument,
    /// Number of stroke records that were dropped as malformed.
    pub skipped: usize,
}

impl SketchDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from already validated lines.
    pub fn from_lines(lines: Vec<Line>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append a committed stroke on top of the others.
    pub(crate) fn push_line(&mut self, line: Line) {
        self.lines.push(line);
    }

    /// Drop every stroke.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total number of points across all strokes.
    pub fn point_count(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }

    /// Union of all stroke bounds, or `None` for a document without ink.
    pub fn bounds(&self) -> Option<Rect> {
        self.lines
            .iter()
            .filter(|l| !l.is_empty())
            .map(Line::bounds)
            .reduce(|a, b| a.union(b))
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON, rejecting any malformed stroke.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Deserialize from JSON, skipping malformed strokes.
    pub fn from_json_lenient(json: &str) -> Result<Decoded, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value_lenient(&value)
    }

    /// Decode a document value, dropping stroke records that fail to parse
    /// instead of rejecting the whole document.
    ///
    /// The value must be an object; one without a `lines` array decodes as
    /// an empty document.
    pub fn from_value_lenient(value: &Value) -> Result<Decoded, serde_json::Error> {
        if !value.is_object() {
            return Err(serde_json::Error::custom("sketch data must be an object"));
        }
        let Some(records) = value.get("lines").and_then(Value::as_array) else {
            return Ok(Decoded::default());
        };

        let mut lines = Vec::with_capacity(records.len());
        let mut skipped = 0;
        for (index, record) in records.iter().enumerate() {
            match Line::deserialize(record) {
                Ok(line) => lines.push(line),
                Err(e) => {
                    log::debug!("Skipping malformed stroke {}: {}", index, e);
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            log::warn!("Sketch data contained {} malformed stroke(s); they were skipped", skipped);
        }

        Ok(Decoded {
            document: Self { lines },
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StrokeColor;
    use kurbo::Point;
    use serde_json::json;

    fn line(points: &[(f64, f64)], color: StrokeColor, size: f64) -> Line {
        Line::new(
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            color,
            size,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_preserves_order_and_style() {
        let doc = SketchDocument::from_lines(vec![
            line(&[(0.0, 0.0), (5.5, 6.25)], StrokeColor::BLACK, 2.0),
            line(&[(1.0, 1.0)], StrokeColor::new(0x12, 0x34, 0x56), 8.0),
            line(&[(3.0, 4.0), (5.0, 6.0), (7.0, 8.0)], StrokeColor::WHITE, 12.0),
        ]);

        let json = doc.to_json().unwrap();
        let back = SketchDocument::from_json(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_persisted_layout() {
        let doc = SketchDocument::from_lines(vec![line(
            &[(10.0, 10.0), (20.0, 10.0)],
            StrokeColor::BLACK,
            2.0,
        )]);

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "lines": [{
                    "points": [{"x": 10.0, "y": 10.0}, {"x": 20.0, "y": 10.0}],
                    "color": "#000000",
                    "size": 2.0
                }]
            })
        );
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let doc = SketchDocument::from_json(
            r##"{"lines":[{"points":[{"x":1,"y":2},{"x":3,"y":4}],"color":"#000000","size":2}]}"##,
        )
        .unwrap();
        assert_eq!(doc.lines()[0].points()[1], Point::new(3.0, 4.0));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let value = json!({
            "lines": [
                {"points": [{"x": 0, "y": 0}, {"x": 1, "y": 1}], "color": "#000000", "size": 2},
                {"color": "#000000", "size": 2},
                {"points": [{"x": "a", "y": 0}], "color": "#000000", "size": 2},
                {"points": [], "color": "not-a-color", "size": 2},
                {"points": [{"x": 4, "y": 4}, {"x": 5, "y": 5}], "color": "#FF0000", "size": 1}
            ]
        });

        assert!(serde_json::from_value::<SketchDocument>(value.clone()).is_err());

        let decoded = SketchDocument::from_value_lenient(&value).unwrap();
        assert_eq!(decoded.skipped, 3);
        assert_eq!(decoded.document.len(), 2);
        assert_eq!(decoded.document.lines()[1].color(), StrokeColor::new(255, 0, 0));
    }

    #[test]
    fn test_missing_lines_is_empty_when_lenient() {
        let decoded = SketchDocument::from_json_lenient("{}").unwrap();
        assert!(decoded.document.is_empty());
        assert_eq!(decoded.skipped, 0);
    }

    #[test]
    fn test_strict_rejects_bad_color() {
        let json =
            r#"{"lines":[{"points":[{"x":0,"y":0},{"x":1,"y":1}],"color":"black","size":2}]}"#;
        assert!(SketchDocument::from_json(json).is_err());

        let decoded = SketchDocument::from_json_lenient(json).unwrap();
        assert!(decoded.document.is_empty());
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_non_object_is_error() {
        assert!(SketchDocument::from_json("[1, 2]").is_err());
        assert!(SketchDocument::from_json("not json").is_err());
        assert!(SketchDocument::from_json_lenient("[1, 2]").is_err());
        assert!(SketchDocument::from_value_lenient(&json!("lines")).is_err());
    }

    #[test]
    fn test_bounds() {
        assert_eq!(SketchDocument::new().bounds(), None);

        let doc = SketchDocument::from_lines(vec![
            line(&[(0.0, 0.0), (10.0, 0.0)], StrokeColor::BLACK, 2.0),
            line(&[(20.0, 20.0), (30.0, 40.0)], StrokeColor::BLACK, 2.0),
        ]);
        assert_eq!(doc.bounds(), Some(Rect::new(-1.0, -1.0, 31.0, 41.0)));
        assert_eq!(doc.point_count(), 4);
    }
}
