//! Tool system for the sketch pad.

use crate::model::StrokeColor;
use serde::{Deserialize, Serialize};

/// Eraser strokes are this many times wider than the pen.
pub const ERASER_WIDTH_FACTOR: f64 = 3.0;

/// Available drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    #[default]
    Pen,
    /// Paints white over existing ink. Nothing is removed from the model.
    Eraser,
}

/// Named pen widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PenSize {
    Thin,
    #[default]
    Medium,
    Thick,
    VeryThick,
}

impl PenSize {
    pub const ALL: [PenSize; 4] = [
        PenSize::Thin,
        PenSize::Medium,
        PenSize::Thick,
        PenSize::VeryThick,
    ];

    /// Width in pixels.
    pub fn width(self) -> f64 {
        match self {
            PenSize::Thin => 1.0,
            PenSize::Medium => 2.0,
            PenSize::Thick => 4.0,
            PenSize::VeryThick => 8.0,
        }
    }

    /// Look up the named size for an exact pixel width.
    pub fn from_width(width: f64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.width() == width)
    }

    /// Display name for this size.
    pub fn name(self) -> &'static str {
        match self {
            PenSize::Thin => "Thin",
            PenSize::Medium => "Medium",
            PenSize::Thick => "Thick",
            PenSize::VeryThick => "Very Thick",
        }
    }

    /// Cycle to the next size.
    pub fn next(self) -> Self {
        match self {
            PenSize::Thin => PenSize::Medium,
            PenSize::Medium => PenSize::Thick,
            PenSize::Thick => PenSize::VeryThick,
            PenSize::VeryThick => PenSize::Thin,
        }
    }
}

/// Color and width applied to a stroke when it begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: StrokeColor,
    pub width: f64,
}

/// User-facing tool configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    pub tool: ToolKind,
    pub pen_color: StrokeColor,
    pub pen_size: PenSize,
}

impl ToolSettings {
    pub fn new(tool: ToolKind, pen_color: StrokeColor, pen_size: PenSize) -> Self {
        Self {
            tool,
            pen_color,
            pen_size,
        }
    }

    /// Style a stroke started right now would get.
    pub fn resolve(&self) -> StrokeStyle {
        match self.tool {
            ToolKind::Pen => StrokeStyle {
                color: self.pen_color,
                width: self.pen_size.width(),
            },
            ToolKind::Eraser => StrokeStyle {
                color: StrokeColor::WHITE,
                width: self.pen_size.width() * ERASER_WIDTH_FACTOR,
            },
        }
    }
}
