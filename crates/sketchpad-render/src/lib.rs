//! Sketchpad Render Library
//!
//! Raster implementation of the sketch drawing surface and image export.

mod export;
mod raster;
mod renderer;

pub use export::{encode_png, export_png, render_document};
pub use raster::RasterSurface;
pub use renderer::{MAX_DIMENSION, RenderContext, RenderError, RenderResult};
