//! Rendering documents to images for report attachments.

use crate::raster::RasterSurface;
use crate::renderer::{RenderContext, RenderResult};
use image::ImageFormat;
use sketchpad_core::{SketchDocument, paint};
use std::io::Cursor;
use std::path::Path;

/// Paint a document onto a fresh surface described by `ctx`.
pub fn render_document(
    ctx: &RenderContext,
    document: &SketchDocument,
) -> RenderResult<RasterSurface> {
    let mut surface = RasterSurface::from_context(ctx)?;
    paint(document, &mut surface);
    Ok(surface)
}

/// Render a document and encode it as PNG bytes.
pub fn encode_png(ctx: &RenderContext, document: &SketchDocument) -> RenderResult<Vec<u8>> {
    let surface = render_document(ctx, document)?;
    let mut bytes = Vec::new();
    surface
        .image()
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    log::debug!(
        "Encoded {}x{} sketch as {} PNG bytes",
        surface.width(),
        surface.height(),
        bytes.len()
    );
    Ok(bytes)
}

/// Render a document and write it to `path` as PNG.
pub fn export_png(ctx: &RenderContext, document: &SketchDocument, path: &Path) -> RenderResult<()> {
    let bytes = encode_png(ctx, document)?;
    std::fs::write(path, bytes)?;
    Ok(())
}
