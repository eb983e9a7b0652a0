//! In-memory storage implementation.

use super::{
    BoxFuture, SketchStore, StorageError, StorageResult, sort_by_creation, validate_report_id,
};
use crate::model::SketchDocument;
use crate::sketch::{Sketch, SketchId, SketchType, SketchUpdate};
use std::collections::HashMap;
use std::future::ready;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStore {
    sketches: RwLock<HashMap<SketchId, Sketch>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_write<T>(
        &self,
        f: impl FnOnce(&mut HashMap<SketchId, Sketch>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut sketches = self
            .sketches
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        f(&mut sketches)
    }

    fn with_read<T>(
        &self,
        f: impl FnOnce(&HashMap<SketchId, Sketch>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let sketches = self
            .sketches
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))?;
        f(&sketches)
    }
}

impl SketchStore for MemoryStore {
    fn create_sketch(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        let result = validate_report_id(report_id).and_then(|_| {
            let sketch = Sketch::new(report_id, sketch_type, data);
            self.with_write(|sketches| {
                sketches.insert(sketch.id, sketch.clone());
                Ok(sketch)
            })
        });
        Box::pin(ready(result))
    }

    fn update_sketch(
        &self,
        id: SketchId,
        update: SketchUpdate,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        let result = self.with_write(|sketches| {
            let sketch = sketches.get_mut(&id).ok_or(StorageError::NotFound(id))?;
            sketch.apply(update);
            Ok(sketch.clone())
        });
        Box::pin(ready(result))
    }

    fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>> {
        let result = self.with_write(|sketches| {
            sketches
                .remove(&id)
                .map(|_| ())
                .ok_or(StorageError::NotFound(id))
        });
        Box::pin(ready(result))
    }

    fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>> {
        let result = self.with_read(|sketches| {
            sketches.get(&id).cloned().ok_or(StorageError::NotFound(id))
        });
        Box::pin(ready(result))
    }

    fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>> {
        let result = self.with_read(|sketches| {
            let mut list: Vec<Sketch> = sketches
                .values()
                .filter(|s| s.report_id == report_id)
                .cloned()
                .collect();
            sort_by_creation(&mut list);
            Ok(list)
        });
        Box::pin(ready(result))
    }
}
