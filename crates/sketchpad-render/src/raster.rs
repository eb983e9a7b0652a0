//! CPU raster surface.

use crate::renderer::{RenderContext, RenderResult};
use image::{Rgba, RgbaImage};
use kurbo::Point;
use peniko::Color;
use sketchpad_core::{StrokeColor, Surface};

/// Distance from `point` to the segment `a`-`b`.
fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    (pv - seg * t).hypot()
}

/// An RGBA pixel buffer implementing [`Surface`].
///
/// Segments are filled as capsules (round caps) with one pixel of
/// coverage anti-aliasing at the edge. Coordinates are multiplied by the
/// scale factor before rasterizing.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
    background: Rgba<u8>,
    scale: f64,
}

impl RasterSurface {
    /// Create a surface filled with the background color.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            background: Rgba([255, 255, 255, 255]),
            scale: 1.0,
        }
    }

    /// Create a surface sized and colored by a render context.
    pub fn from_context(ctx: &RenderContext) -> RenderResult<Self> {
        let (width, height) = ctx.pixel_size()?;
        let mut surface = Self::new(width, height);
        surface.scale = ctx.scale_factor;
        surface.set_background(ctx.background_color);
        Ok(surface)
    }

    /// Change the clear color and repaint with it.
    pub fn set_background(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        self.background = Rgba([rgba.r, rgba.g, rgba.b, rgba.a]);
        self.clear();
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Color at a pixel, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<StrokeColor> {
        self.image
            .get_pixel_checked(x, y)
            .map(|p| StrokeColor::new(p[0], p[1], p[2]))
    }

    fn blend(&mut self, x: u32, y: u32, color: StrokeColor, coverage: f64) {
        let pixel = self.image.get_pixel_mut(x, y);
        let mix = |dst: u8, src: u8| -> u8 {
            (dst as f64 + (src as f64 - dst as f64) * coverage).round() as u8
        };
        *pixel = Rgba([
            mix(pixel[0], color.r),
            mix(pixel[1], color.g),
            mix(pixel[2], color.b),
            mix(pixel[3], 255),
        ]);
    }
}

impl Surface for RasterSurface {
    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = self.background;
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: StrokeColor, width: f64) {
        let a = Point::new(from.x * self.scale, from.y * self.scale);
        let b = Point::new(to.x * self.scale, to.y * self.scale);
        let radius = (width * self.scale / 2.0).max(0.5);
        let reach = radius + 1.0;

        let (w, h) = (self.image.width() as f64, self.image.height() as f64);
        let x0 = (a.x.min(b.x) - reach).floor().clamp(0.0, w);
        let y0 = (a.y.min(b.y) - reach).floor().clamp(0.0, h);
        let x1 = (a.x.max(b.x) + reach).ceil().clamp(0.0, w);
        let y1 = (a.y.max(b.y) + reach).ceil().clamp(0.0, h);

        for y in y0 as u32..y1 as u32 {
            for x in x0 as u32..x1 as u32 {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let coverage = (radius + 0.5 - point_to_segment_dist(center, a, b)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use sketchpad_core::{
        CaptureEngine, Line, PenSize, SketchDocument, ToolKind, ToolSettings, paint,
    };

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(point_to_segment_dist(Point::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(point_to_segment_dist(Point::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(point_to_segment_dist(Point::new(3.0, 4.0), a, a), 5.0);
    }

    #[test]
    fn test_stroke_paints_along_segment_only() {
        let mut surface = RasterSurface::new(40, 40);
        surface.stroke_line(Point::new(5.0, 20.0), Point::new(35.0, 20.0), StrokeColor::BLACK, 4.0);

        assert_eq!(surface.pixel(20, 20), Some(StrokeColor::BLACK));
        assert_eq!(surface.pixel(20, 19), Some(StrokeColor::BLACK));
        assert_eq!(surface.pixel(20, 10), Some(StrokeColor::WHITE));
        assert_eq!(surface.pixel(39, 20), Some(StrokeColor::WHITE));
    }

    #[test]
    fn test_round_cap_extends_past_endpoint() {
        let mut surface = RasterSurface::new(40, 40);
        let (from, to) = (Point::new(10.0, 20.0), Point::new(30.0, 20.0));
        surface.stroke_line(from, to, StrokeColor::BLACK, 8.0);

        // Three pixels beyond the end point, inside the cap radius.
        assert_eq!(surface.pixel(32, 20), Some(StrokeColor::BLACK));
        // Corner of the square a butt cap would not reach either.
        assert_eq!(surface.pixel(33, 16), Some(StrokeColor::WHITE));
    }

    #[test]
    fn test_segment_outside_surface_is_clipped() {
        let mut surface = RasterSurface::new(10, 10);
        let (from, to) = (Point::new(-50.0, -50.0), Point::new(-20.0, -20.0));
        surface.stroke_line(from, to, StrokeColor::BLACK, 4.0);
        surface.stroke_line(Point::new(-5.0, 5.0), Point::new(50.0, 5.0), StrokeColor::BLACK, 2.0);
        assert_eq!(surface.pixel(0, 0), Some(StrokeColor::WHITE));
        assert_eq!(surface.pixel(9, 5), Some(StrokeColor::BLACK));
    }

    #[test]
    fn test_eraser_covers_pen_ink() {
        let settings = ToolSettings::new(ToolKind::Pen, StrokeColor::BLACK, PenSize::Medium);
        let mut engine = CaptureEngine::new(settings);
        let mut surface = RasterSurface::new(30, 30);

        engine.pointer_down(Point::new(5.0, 15.0));
        engine.pointer_move(Point::new(25.0, 15.0), &mut surface);
        engine.pointer_up();
        assert_eq!(surface.pixel(15, 15), Some(StrokeColor::BLACK));

        engine.settings.tool = ToolKind::Eraser;
        engine.pointer_down(Point::new(15.0, 5.0));
        engine.pointer_move(Point::new(15.0, 25.0), &mut surface);
        engine.pointer_up();

        assert_eq!(surface.pixel(15, 15), Some(StrokeColor::WHITE));
        assert_eq!(surface.pixel(6, 15), Some(StrokeColor::BLACK));
        assert_eq!(engine.document().len(), 2);
    }

    #[test]
    fn test_incremental_drawing_matches_redraw() {
        let mut engine = CaptureEngine::new(ToolSettings::new(
            ToolKind::Pen,
            StrokeColor::new(200, 30, 30),
            PenSize::Thick,
        ));
        let mut live = RasterSurface::new(50, 50);

        engine.pointer_down(Point::new(5.0, 5.0));
        for p in [(20.0, 8.0), (30.0, 30.0), (44.0, 40.0)] {
            engine.pointer_move(Point::new(p.0, p.1), &mut live);
        }
        engine.pointer_up();

        let mut redrawn = RasterSurface::new(50, 50);
        engine.redraw(&mut redrawn);
        assert_eq!(live.image().as_raw(), redrawn.image().as_raw());
    }

    #[test]
    fn test_paint_is_idempotent() {
        let doc = SketchDocument::from_lines(vec![
            Line::new(
                vec![Point::new(2.0, 2.0), Point::new(18.0, 18.0)],
                StrokeColor::new(0, 0, 255),
                2.0,
            )
            .unwrap(),
        ]);

        let mut once = RasterSurface::new(20, 20);
        paint(&doc, &mut once);
        let mut twice = RasterSurface::new(20, 20);
        paint(&doc, &mut twice);
        paint(&doc, &mut twice);

        assert_eq!(once.image().as_raw(), twice.image().as_raw());
    }

    #[test]
    fn test_scale_factor_scales_geometry() {
        let ctx = RenderContext::new(Size::new(10.0, 10.0)).with_scale_factor(2.0);
        let mut surface = RasterSurface::from_context(&ctx).unwrap();
        assert_eq!((surface.width(), surface.height()), (20, 20));

        surface.stroke_line(Point::new(0.0, 5.0), Point::new(10.0, 5.0), StrokeColor::BLACK, 1.0);
        assert_eq!(surface.pixel(15, 10), Some(StrokeColor::BLACK));
        assert_eq!(surface.pixel(15, 14), Some(StrokeColor::WHITE));
    }

    #[test]
    fn test_background_color() {
        let ctx = RenderContext::new(Size::new(4.0, 4.0))
            .with_background(Color::from_rgba8(10, 20, 30, 255));
        let surface = RasterSurface::from_context(&ctx).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(StrokeColor::new(10, 20, 30)));
    }
}
