//! Sketch persistence: the report-data collaborator.

mod cache;
mod file;
mod memory;

pub use cache::{CacheKey, CachedStore, CachedValue, QueryCache};
pub use file::FileStore;
pub use memory::MemoryStore;

use crate::model::SketchDocument;
use crate::sketch::{Sketch, SketchId, SketchType, SketchUpdate};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Sketch not found: {0}")]
    NotFound(SketchId),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async store operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Backend that owns the persisted sketches of every report.
///
/// Implementations may live in memory, on disk, or behind a network service.
/// Updates replace fields wholesale; the last writer wins.
pub trait SketchStore: Send + Sync {
    /// Create a sketch for a report. The report id must not be empty.
    fn create_sketch(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> BoxFuture<'_, StorageResult<Sketch>>;

    /// Replace the given fields of an existing sketch.
    fn update_sketch(
        &self,
        id: SketchId,
        update: SketchUpdate,
    ) -> BoxFuture<'_, StorageResult<Sketch>>;

    /// Delete a sketch.
    fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>>;

    /// Load one sketch.
    fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>>;

    /// All sketches of a report, oldest first.
    fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>>;
}

impl<S: SketchStore + ?Sized> SketchStore for Arc<S> {
    fn create_sketch(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        (**self).create_sketch(report_id, sketch_type, data)
    }

    fn update_sketch(
        &self,
        id: SketchId,
        update: SketchUpdate,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        (**self).update_sketch(id, update)
    }

    fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>> {
        (**self).delete_sketch(id)
    }

    fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>> {
        (**self).get_sketch(id)
    }

    fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>> {
        (**self).list_sketches(report_id)
    }
}

/// Reject sketches without an owning report.
pub(crate) fn validate_report_id(report_id: &str) -> StorageResult<()> {
    if report_id.trim().is_empty() {
        return Err(StorageError::InvalidInput(
            "a sketch must belong to a report".to_string(),
        ));
    }
    Ok(())
}

/// Oldest first; ids break ties so listings are stable.
pub(crate) fn sort_by_creation(sketches: &mut [Sketch]) {
    sketches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
