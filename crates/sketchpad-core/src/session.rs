//! Sketch editing session for one user.
//!
//! A session replaces the "current report" globals of a page-based UI with an
//! explicit object: it is created when the user starts working, switched when
//! another report is opened and closed on logout. It owns the capture engine,
//! the sketch list of the open report and the current selection.

use crate::capture::CaptureEngine;
use crate::config::SketchConfig;
use crate::model::SketchDocument;
use crate::sketch::{ReportId, Sketch, SketchId, SketchType, SketchUpdate};
use crate::storage::{SketchStore, StorageError};
use crate::surface::Surface;
use thiserror::Error;

/// Errors surfaced to the UI when persisting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    #[error("No report is open; a new sketch needs an owning report")]
    NoReport,
    #[error("No sketch is selected")]
    NothingSelected,
    #[error("Persistence failed: {0}")]
    PersistenceFailed(#[from] StorageError),
}

/// The report whose sketches are being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    pub report_id: ReportId,
}

impl ReportContext {
    pub fn new(report_id: impl Into<ReportId>) -> Self {
        Self {
            report_id: report_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SaveTarget {
    Create {
        report_id: ReportId,
        sketch_type: SketchType,
    },
    Update {
        id: SketchId,
    },
}

/// A snapshot of the document ready to be written.
///
/// Taken with [`SketchSession::prepare_save`], it owns its data so drawing can
/// continue while [`SaveRequest::execute`] is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    target: SaveTarget,
    data: SketchDocument,
    /// Session generation the snapshot was taken in.
    generation: u64,
}

impl SaveRequest {
    /// The document that will be written.
    pub fn data(&self) -> &SketchDocument {
        &self.data
    }

    /// Whether this save creates a new sketch.
    pub fn creates(&self) -> bool {
        matches!(self.target, SaveTarget::Create { .. })
    }

    /// Write the snapshot: create a sketch, or replace the selected sketch's
    /// data wholesale.
    pub async fn execute<S: SketchStore + ?Sized>(&self, store: &S) -> Result<Sketch, SaveError> {
        let result = match &self.target {
            SaveTarget::Create {
                report_id,
                sketch_type,
            } => {
                store
                    .create_sketch(report_id, *sketch_type, self.data.clone())
                    .await
            }
            SaveTarget::Update { id } => {
                store
                    .update_sketch(*id, SketchUpdate::data(self.data.clone()))
                    .await
            }
        };
        result.map_err(|e| {
            log::error!("Saving sketch failed: {}", e);
            SaveError::PersistenceFailed(e)
        })
    }
}

/// Editing state for the sketches of one report.
pub struct SketchSession<S> {
    store: S,
    report: Option<ReportContext>,
    sketches: Vec<Sketch>,
    selected: Option<SketchId>,
    new_sketch_type: SketchType,
    engine: CaptureEngine,
    /// Bumped whenever the document on screen stops being the one a pending
    /// save was taken from.
    generation: u64,
}

impl<S: SketchStore> SketchSession<S> {
    /// Start a session with no report open.
    pub fn new(store: S, config: &SketchConfig) -> Self {
        Self {
            store,
            report: None,
            sketches: Vec::new(),
            selected: None,
            new_sketch_type: SketchType::default(),
            engine: CaptureEngine::new(config.tool_settings()).with_policy(config.commit_policy),
            generation: 0,
        }
    }

    /// The store. Clone it (e.g. an `Arc`) to run a save off the session.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn report(&self) -> Option<&ReportContext> {
        self.report.as_ref()
    }

    /// Sketches of the open report, oldest first.
    pub fn sketches(&self) -> &[Sketch] {
        &self.sketches
    }

    pub fn selected(&self) -> Option<SketchId> {
        self.selected
    }

    pub fn selected_sketch(&self) -> Option<&Sketch> {
        let id = self.selected?;
        self.sketches.iter().find(|s| s.id == id)
    }

    pub fn engine(&self) -> &CaptureEngine {
        &self.engine
    }

    /// The engine, for pointer events and tool changes.
    pub fn engine_mut(&mut self) -> &mut CaptureEngine {
        &mut self.engine
    }

    /// Type given to the sketch created by the next save without a selection.
    pub fn new_sketch_type(&self) -> SketchType {
        self.new_sketch_type
    }

    /// Open a report, replacing any open one, and load its sketch list.
    pub async fn open_report(&mut self, report: ReportContext, surface: &mut dyn Surface) {
        log::info!("Opening report {}", report.report_id);
        self.generation += 1;
        self.report = Some(report);
        self.selected = None;
        self.sketches.clear();
        self.engine.load_document(SketchDocument::new(), surface);
        self.refresh().await;
    }

    /// Close the open report (logout or leaving the report).
    pub fn close_report(&mut self, surface: &mut dyn Surface) {
        self.generation += 1;
        self.report = None;
        self.selected = None;
        self.sketches.clear();
        self.engine.clear_canvas(surface);
    }

    /// Reload the sketch list of the open report.
    ///
    /// A failed load is logged and leaves the list empty.
    pub async fn refresh(&mut self) -> &[Sketch] {
        let Some(report) = &self.report else {
            self.sketches.clear();
            return &self.sketches;
        };

        self.sketches = match self.store.list_sketches(&report.report_id).await {
            Ok(list) => list,
            Err(e) => {
                log::warn!("Sketch list for report {} unavailable: {}", report.report_id, e);
                Vec::new()
            }
        };
        &self.sketches
    }

    /// Select a listed sketch and repaint the surface with it.
    ///
    /// An unknown id shows an empty new document instead.
    pub fn select_sketch(&mut self, id: SketchId, surface: &mut dyn Surface) -> bool {
        self.generation += 1;
        match self.sketches.iter().find(|s| s.id == id) {
            Some(sketch) => {
                self.selected = Some(id);
                self.new_sketch_type = sketch.sketch_type;
                self.engine.load_document(sketch.data.clone(), surface);
                true
            }
            None => {
                log::warn!("Sketch {} is not available; showing an empty document", id);
                self.selected = None;
                self.engine.load_document(SketchDocument::new(), surface);
                false
            }
        }
    }

    /// Fetch the selected sketch from the store and repaint it.
    ///
    /// A failed fetch is logged and shows an empty document.
    pub async fn reload_selected(&mut self, surface: &mut dyn Surface) {
        let Some(id) = self.selected else {
            return;
        };

        let document = match self.store.get_sketch(id).await {
            Ok(sketch) => {
                let document = sketch.data.clone();
                self.upsert(sketch);
                document
            }
            Err(e) => {
                log::warn!("Sketch {} could not be loaded: {}", id, e);
                SketchDocument::new()
            }
        };
        self.engine.load_document(document, surface);
    }

    /// Start a new, unsaved drawing of the given type.
    pub fn new_sketch(&mut self, sketch_type: SketchType, surface: &mut dyn Surface) {
        self.generation += 1;
        self.selected = None;
        self.new_sketch_type = sketch_type;
        self.engine.load_document(SketchDocument::new(), surface);
    }

    /// Wipe the drawing. Persisted data changes only on the next save.
    pub fn clear_canvas(&mut self, surface: &mut dyn Surface) {
        self.engine.clear_canvas(surface);
    }

    /// Snapshot the current document for saving.
    pub fn prepare_save(&self) -> Result<SaveRequest, SaveError> {
        let target = match (self.selected, &self.report) {
            (Some(id), _) => SaveTarget::Update { id },
            (None, Some(report)) => SaveTarget::Create {
                report_id: report.report_id.clone(),
                sketch_type: self.new_sketch_type,
            },
            (None, None) => return Err(SaveError::NoReport),
        };

        Ok(SaveRequest {
            target,
            data: self.engine.document().clone(),
            generation: self.generation,
        })
    }

    /// Record the outcome of `request`.
    ///
    /// A created sketch becomes the selection only if the document on screen
    /// is still the one the request was taken from; after a switch or a new
    /// sketch it is just added to the list. On failure nothing changes, so
    /// retrying saves the same document.
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: Result<Sketch, SaveError>,
    ) -> Result<SketchId, SaveError> {
        let sketch = result?;
        let id = sketch.id;
        let belongs_here = self
            .report
            .as_ref()
            .is_some_and(|r| r.report_id == sketch.report_id);

        if belongs_here {
            self.upsert(sketch);
            if self.selected.is_none() && request.generation == self.generation {
                self.selected = Some(id);
            }
        }
        log::info!("Saved sketch {}", id);
        Ok(id)
    }

    /// Save the current document and wait for the result.
    pub async fn save(&mut self) -> Result<SketchId, SaveError> {
        let request = self.prepare_save()?;
        let result = request.execute(&self.store).await;
        self.finish_save(&request, result)
    }

    /// Delete the selected sketch and start an empty document of the same type.
    pub async fn delete_selected(&mut self, surface: &mut dyn Surface) -> Result<(), SaveError> {
        let id = self.selected.ok_or(SaveError::NothingSelected)?;
        self.store.delete_sketch(id).await?;

        self.sketches.retain(|s| s.id != id);
        let sketch_type = self.new_sketch_type;
        self.new_sketch(sketch_type, surface);
        log::info!("Deleted sketch {}", id);
        Ok(())
    }

    fn upsert(&mut self, sketch: Sketch) {
        match self.sketches.iter_mut().find(|s| s.id == sketch.id) {
            Some(existing) => *existing = sketch,
            None => self.sketches.push(sketch),
        }
    }
}
