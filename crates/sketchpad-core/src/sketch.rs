//! Persisted sketch entity.

use crate::model::SketchDocument;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for sketches.
pub type SketchId = Uuid;

/// Identifier of the owning appraisal report.
pub type ReportId = String;

/// Kind of drawing a sketch holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchType {
    #[default]
    FloorPlan,
    SitePlan,
    Elevation,
    Detail,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sketch type: {0:?}")]
pub struct UnknownSketchType(pub String);

impl SketchType {
    pub const ALL: [SketchType; 4] = [
        SketchType::FloorPlan,
        SketchType::SitePlan,
        SketchType::Elevation,
        SketchType::Detail,
    ];

    /// Wire name, as stored.
    pub fn as_str(self) -> &'static str {
        match self {
            SketchType::FloorPlan => "floor_plan",
            SketchType::SitePlan => "site_plan",
            SketchType::Elevation => "elevation",
            SketchType::Detail => "detail",
        }
    }

    /// Display name.
    pub fn label(self) -> &'static str {
        match self {
            SketchType::FloorPlan => "Floor Plan",
            SketchType::SitePlan => "Site Plan",
            SketchType::Elevation => "Elevation",
            SketchType::Detail => "Detail",
        }
    }
}

impl fmt::Display for SketchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SketchType {
    type Err = UnknownSketchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownSketchType(s.to_string()))
    }
}

/// A drawing owned by exactly one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sketch {
    pub id: SketchId,
    pub report_id: ReportId,
    pub sketch_type: SketchType,
    pub data: SketchDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sketch {
    /// Create a fresh sketch record with a new id.
    pub fn new(
        report_id: impl Into<ReportId>,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            report_id: report_id.into(),
            sketch_type,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the provided fields wholesale and bump `updated_at`.
    pub fn apply(&mut self, update: SketchUpdate) {
        if let Some(sketch_type) = update.sketch_type {
            self.sketch_type = sketch_type;
        }
        if let Some(data) = update.data {
            self.data = data;
        }
        self.updated_at = Utc::now();
    }

    /// Decode a stored sketch record, skipping malformed strokes in its
    /// drawing so a damaged sketch still opens.
    pub fn from_json_lenient(json: &str) -> Result<Self, serde_json::Error> {
        let record: StoredSketch = serde_json::from_str(json)?;
        let decoded = SketchDocument::from_value_lenient(&record.data)?;
        Ok(Self {
            id: record.id,
            report_id: record.report_id,
            sketch_type: record.sketch_type,
            data: decoded.document,
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }

    /// Human-readable name for listings, e.g. "Floor Plan (3 strokes)".
    pub fn label(&self) -> String {
        match self.data.len() {
            1 => format!("{} (1 stroke)", self.sketch_type.label()),
            n => format!("{} ({} strokes)", self.sketch_type.label(), n),
        }
    }
}

/// A sketch as read back from storage, before its drawing is decoded.
#[derive(Deserialize)]
struct StoredSketch {
    id: SketchId,
    report_id: ReportId,
    sketch_type: SketchType,
    data: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Partial update of a sketch. Absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SketchUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch_type: Option<SketchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SketchDocument>,
}

impl SketchUpdate {
    /// Update that only replaces the drawing.
    pub fn data(data: SketchDocument) -> Self {
        Self {
            sketch_type: None,
            data: Some(data),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sketch_type.is_none() && self.data.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Line, StrokeColor};
    use kurbo::Point;

    #[test]
    fn test_sketch_type_wire_names() {
        for t in SketchType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<SketchType>().unwrap(), t);
        }
    }

    #[test]
    fn test_sketch_type_rejects_free_text() {
        assert!("kitchen".parse::<SketchType>().is_err());
        assert!(serde_json::from_str::<SketchType>("\"Floor Plan\"").is_err());
    }

    #[test]
    fn test_apply_replaces_data_wholesale() {
        let line = Line::new(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            StrokeColor::BLACK,
            2.0,
        )
        .unwrap();
        let mut sketch = Sketch::new(
            "report-1",
            SketchType::FloorPlan,
            SketchDocument::from_lines(vec![line.clone(), line]),
        );
        let created = sketch.updated_at;

        sketch.apply(SketchUpdate::data(SketchDocument::new()));

        assert!(sketch.data.is_empty());
        assert_eq!(sketch.sketch_type, SketchType::FloorPlan);
        assert!(sketch.updated_at >= created);
    }

    #[test]
    fn test_apply_type_only() {
        let mut sketch = Sketch::new("r", SketchType::FloorPlan, SketchDocument::new());
        sketch.apply(SketchUpdate {
            sketch_type: Some(SketchType::Elevation),
            data: None,
        });
        assert_eq!(sketch.sketch_type, SketchType::Elevation);
    }

    #[test]
    fn test_sketch_json_round_trip() {
        let sketch = Sketch::new("report-7", SketchType::SitePlan, SketchDocument::new());
        let json = serde_json::to_string(&sketch).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sketch_type"], "site_plan");
        assert_eq!(value["data"], serde_json::json!({"lines": []}));

        let back: Sketch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sketch);
    }

    #[test]
    fn test_update_omits_absent_fields() {
        let json = serde_json::to_string(&SketchUpdate::default()).unwrap();
        assert_eq!(json, "{}");
        assert!(SketchUpdate::default().is_empty());
    }

    #[test]
    fn test_label() {
        let sketch = Sketch::new("r", SketchType::Detail, SketchDocument::new());
        assert_eq!(sketch.label(), "Detail (0 strokes)");
    }

    #[test]
    fn test_lenient_record_keeps_good_strokes() {
        let sketch = Sketch::new(
            "r-1",
            SketchType::Detail,
            SketchDocument::from_lines(vec![
                Line::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)], StrokeColor::BLACK, 2.0)
                    .unwrap(),
            ]),
        );
        let mut value = serde_json::to_value(&sketch).unwrap();
        value["data"]["lines"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"points": [], "color": "black", "size": 2}));
        let json = value.to_string();

        assert!(serde_json::from_str::<Sketch>(&json).is_err());
        assert_eq!(Sketch::from_json_lenient(&json).unwrap(), sketch);
    }
}
