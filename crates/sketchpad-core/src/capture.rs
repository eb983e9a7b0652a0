//! Gesture capture: turns pointer drags into committed strokes.
//!
//! The engine owns the in-memory [`SketchDocument`] and the stroke being
//! drawn. Pointer moves paint a single new segment onto the surface; the full
//! document is only repainted when a different document is loaded or a redraw
//! is requested.

use crate::model::{Line, SketchDocument};
use crate::surface::{Surface, paint};
use crate::tools::ToolSettings;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer input delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up,
    Leave,
}

/// What happens to strokes that never left their first point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPolicy {
    /// Clicks without a drag are dropped at commit.
    #[default]
    DropTrivial,
    /// Clicks are committed as inert one-point strokes.
    KeepTrivial,
}

/// Per-gesture state.
#[derive(Debug, Clone, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    /// A stroke is being drawn. It is not part of the document yet.
    Drawing { line: Line },
}

/// Converts pointer gestures into strokes on a document.
#[derive(Debug, Clone, Default)]
pub struct CaptureEngine {
    /// Tool configuration applied to the next stroke.
    pub settings: ToolSettings,
    policy: CommitPolicy,
    document: SketchDocument,
    state: CaptureState,
}

impl CaptureEngine {
    /// Create an engine with an empty document.
    pub fn new(settings: ToolSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Set how trivial strokes are committed.
    pub fn with_policy(mut self, policy: CommitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> CommitPolicy {
        self.policy
    }

    /// The committed strokes.
    pub fn document(&self) -> &SketchDocument {
        &self.document
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// The stroke currently being drawn, if any.
    pub fn current_line(&self) -> Option<&Line> {
        match &self.state {
            CaptureState::Drawing { line } => Some(line),
            CaptureState::Idle => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, CaptureState::Drawing { .. })
    }

    /// Dispatch a pointer event.
    pub fn handle(&mut self, event: PointerEvent, surface: &mut dyn Surface) {
        match event {
            PointerEvent::Down { position } => self.pointer_down(position),
            PointerEvent::Move { position } => self.pointer_move(position, surface),
            PointerEvent::Up | PointerEvent::Leave => {
                self.commit();
            }
        }
    }

    /// Begin a stroke at `position` with the style of the current tool.
    ///
    /// A stroke still in progress (its pointer-up was lost) is committed first.
    /// Non-finite positions are ignored.
    pub fn pointer_down(&mut self, position: Point) {
        if !position.is_finite() {
            log::debug!("Ignoring non-finite pointer down at {:?}", position);
            return;
        }
        if self.is_drawing() {
            log::debug!("Pointer down while drawing; committing previous stroke");
            self.commit();
        }

        let style = self.settings.resolve();
        let mut line = Line::started(style.color, style.width);
        line.push(position);
        self.state = CaptureState::Drawing { line };
    }

    /// Extend the stroke and paint only the new segment.
    pub fn pointer_move(&mut self, position: Point, surface: &mut dyn Surface) {
        let CaptureState::Drawing { line } = &mut self.state else {
            return;
        };
        if !position.is_finite() {
            log::debug!("Ignoring non-finite pointer move to {:?}", position);
            return;
        }

        if let Some(&previous) = line.points().last() {
            surface.stroke_line(previous, position, line.color(), line.size());
        }
        line.push(position);
    }

    /// Finish the gesture on pointer-up.
    pub fn pointer_up(&mut self) -> bool {
        self.commit()
    }

    /// Finish the gesture when the pointer leaves the surface.
    pub fn pointer_leave(&mut self) -> bool {
        self.commit()
    }

    /// Fold the stroke in progress into the document and return to idle.
    ///
    /// Returns `true` if a stroke was appended.
    fn commit(&mut self) -> bool {
        let CaptureState::Drawing { line } = std::mem::take(&mut self.state) else {
            return false;
        };

        if !line.is_visible() && self.policy == CommitPolicy::DropTrivial {
            log::debug!("Dropping stroke with {} point(s)", line.len());
            return false;
        }

        log::debug!(
            "Committed stroke: {} points, {} {}px",
            line.len(),
            line.color(),
            line.size()
        );
        self.document.push_line(line);
        true
    }

    /// Replace the document (sketch switched) and repaint it from scratch.
    pub fn load_document(&mut self, document: SketchDocument, surface: &mut dyn Surface) {
        self.state = CaptureState::Idle;
        self.document = document;
        self.redraw(surface);
    }

    /// Repaint the whole document: clear, then every stroke in order.
    pub fn redraw(&self, surface: &mut dyn Surface) {
        paint(&self.document, surface);
    }

    /// Wipe the surface and forget every stroke, including one in progress.
    ///
    /// Nothing persisted is touched until the next save.
    pub fn clear_canvas(&mut self, surface: &mut dyn Surface) {
        surface.clear();
        self.document.clear();
        self.state = CaptureState::Idle;
    }
}
