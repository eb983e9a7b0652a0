//! Sketchpad Core Library
//!
//! Platform-agnostic capture, model and persistence for appraisal sketches
//! (floor plans, site plans, elevations and details).

pub mod capture;
pub mod config;
pub mod model;
pub mod session;
pub mod sketch;
pub mod storage;
pub mod surface;
pub mod tools;

pub use capture::{CaptureEngine, CaptureState, CommitPolicy, PointerEvent};
pub use config::{ConfigError, SketchConfig};
pub use model::{Line, Point, SketchDocument, StrokeColor};
pub use session::{ReportContext, SaveError, SaveRequest, SketchSession};
pub use sketch::{ReportId, Sketch, SketchId, SketchType, SketchUpdate};
pub use storage::{CachedStore, FileStore, MemoryStore, SketchStore, StorageError, StorageResult};
pub use surface::{DrawCommand, RecordingSurface, Surface, paint};
pub use tools::{PenSize, ToolKind, ToolSettings};
