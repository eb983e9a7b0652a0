//! Render configuration and errors.

use kurbo::{Rect, Size};
use peniko::Color;
use sketchpad_core::SketchDocument;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid render size: {0}x{1}")]
    InvalidSize(f64, f64),
    #[error("Encoding failed: {0}")]
    Encode(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Largest edge, in pixels, the renderer will allocate.
pub const MAX_DIMENSION: u32 = 16_384;

/// Parameters for rendering a document to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderContext {
    /// Logical size of the drawing area.
    pub size: Size,
    /// Device pixel ratio (for HiDPI and print export).
    pub scale_factor: f64,
    /// Background color painted on clear.
    pub background_color: Color,
}

impl RenderContext {
    /// Create a render context for a drawing area of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            scale_factor: 1.0,
            background_color: Color::WHITE,
        }
    }

    /// Size the drawing area so all ink of `document` fits, plus `margin` on
    /// the right and bottom. Coordinates stay surface-relative.
    pub fn fit(document: &SketchDocument, margin: f64) -> Self {
        let bounds = document.bounds().unwrap_or(Rect::ZERO);
        let width = bounds.x1.max(0.0) + margin;
        let height = bounds.y1.max(0.0) + margin;
        Self::new(Size::new(width.max(1.0), height.max(1.0)))
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Pixel dimensions after scaling.
    pub fn pixel_size(&self) -> RenderResult<(u32, u32)> {
        let width = (self.size.width * self.scale_factor).ceil();
        let height = (self.size.height * self.scale_factor).ceil();
        let valid = |v: f64| v.is_finite() && v >= 1.0 && v <= MAX_DIMENSION as f64;
        if !valid(width) || !valid(height) {
            return Err(RenderError::InvalidSize(width, height));
        }
        Ok((width as u32, height as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad_core::{Line, Point, StrokeColor};

    #[test]
    fn test_pixel_size_scales() {
        let ctx = RenderContext::new(Size::new(100.0, 50.5)).with_scale_factor(2.0);
        assert_eq!(ctx.pixel_size().unwrap(), (200, 101));
    }

    #[test]
    fn test_pixel_size_rejects_empty_and_huge() {
        assert!(RenderContext::new(Size::new(0.0, 10.0)).pixel_size().is_err());
        assert!(RenderContext::new(Size::new(10.0, 1e9)).pixel_size().is_err());
        assert!(RenderContext::new(Size::new(f64::NAN, 10.0)).pixel_size().is_err());
    }

    #[test]
    fn test_fit_covers_ink() {
        let doc = SketchDocument::from_lines(vec![
            Line::new(
                vec![Point::new(10.0, 10.0), Point::new(90.0, 40.0)],
                StrokeColor::BLACK,
                4.0,
            )
            .unwrap(),
        ]);
        let ctx = RenderContext::fit(&doc, 8.0);
        assert_eq!(ctx.size, Size::new(100.0, 50.0));
    }

    #[test]
    fn test_fit_empty_document() {
        let ctx = RenderContext::fit(&SketchDocument::new(), 0.0);
        assert_eq!(ctx.size, Size::new(1.0, 1.0));
    }
}
