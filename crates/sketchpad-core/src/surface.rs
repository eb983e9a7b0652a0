//! Drawing surface abstraction.

use crate::model::{Line, SketchDocument, StrokeColor};
use kurbo::Point;

/// A 2D raster target the capture engine paints onto.
///
/// Implementations stroke with round caps and joins so consecutive segments
/// of a polyline meet without gaps.
pub trait Surface {
    /// Wipe the whole surface.
    fn clear(&mut self);

    /// Stroke one straight segment.
    fn stroke_line(&mut self, from: Point, to: Point, color: StrokeColor, width: f64);

    /// Stroke a connected polyline. Fewer than two points draw nothing.
    fn stroke_polyline(&mut self, points: &[Point], color: StrokeColor, width: f64) {
        for pair in points.windows(2) {
            self.stroke_line(pair[0], pair[1], color, width);
        }
    }

    /// Stroke a committed line with its own color and width.
    fn stroke(&mut self, line: &Line) {
        self.stroke_polyline(line.points(), line.color(), line.size());
    }
}

/// Repaint a whole document: clear, then every stroke in z-order.
///
/// Always starts from a clear surface, so painting twice looks like painting
/// once.
pub fn paint(document: &SketchDocument, surface: &mut dyn Surface) {
    surface.clear();
    for line in document.lines() {
        surface.stroke(line);
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    Segment {
        from: Point,
        to: Point,
        color: StrokeColor,
        width: f64,
    },
}

/// Surface that records draw calls instead of rasterizing them.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command since creation.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands after the most recent clear: what is on screen now.
    pub fn visible_commands(&self) -> &[DrawCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| *c == DrawCommand::Clear)
            .map_or(0, |i| i + 1);
        &self.commands[start..]
    }

    /// Number of segments stroked since creation.
    pub fn segment_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Segment { .. }))
            .count()
    }

    /// Replay the recording onto another surface.
    pub fn replay(&self, target: &mut dyn Surface) {
        for command in &self.commands {
            match *command {
                DrawCommand::Clear => target.clear(),
                DrawCommand::Segment {
                    from,
                    to,
                    color,
                    width,
                } => target.stroke_line(from, to, color, width),
            }
        }
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: StrokeColor, width: f64) {
        self.commands.push(DrawCommand::Segment {
            from,
            to,
            color,
            width,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polyline_strokes_each_segment() {
        let mut surface = RecordingSurface::new();
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        surface.stroke_polyline(&points, StrokeColor::BLACK, 2.0);
        assert_eq!(surface.segment_count(), 2);
    }

    #[test]
    fn test_single_point_draws_nothing() {
        let mut surface = RecordingSurface::new();
        surface.stroke_polyline(&[Point::new(3.0, 3.0)], StrokeColor::BLACK, 2.0);
        assert!(surface.commands().is_empty());
    }

    #[test]
    fn test_visible_commands_start_after_clear() {
        let mut surface = RecordingSurface::new();
        surface.stroke_line(Point::ZERO, Point::new(1.0, 1.0), StrokeColor::BLACK, 1.0);
        surface.clear();
        surface.stroke_line(Point::ZERO, Point::new(2.0, 2.0), StrokeColor::BLACK, 1.0);

        assert_eq!(surface.commands().len(), 3);
        assert_eq!(surface.visible_commands().len(), 1);
    }

    #[test]
    fn test_replay() {
        let mut source = RecordingSurface::new();
        source.clear();
        source.stroke_line(Point::ZERO, Point::new(4.0, 0.0), StrokeColor::WHITE, 6.0);

        let mut copy = RecordingSurface::new();
        source.replay(&mut copy);
        assert_eq!(copy.commands(), source.commands());
    }
}
