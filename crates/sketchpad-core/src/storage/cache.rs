//! Read-through cache with keyed invalidation.

use super::{BoxFuture, SketchStore, StorageError, StorageResult};
use crate::model::SketchDocument;
use crate::sketch::{ReportId, Sketch, SketchId, SketchType, SketchUpdate};
use std::collections::HashMap;
use std::sync::Mutex;

/// Cache entry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The sketch list of one report.
    ReportSketches(ReportId),
    /// A single sketch.
    Sketch(SketchId),
}

/// Cached query result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedValue {
    List(Vec<Sketch>),
    One(Sketch),
}

/// Keyed query cache.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: Mutex<HashMap<CacheKey, CachedValue>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> StorageResult<std::sync::MutexGuard<'_, HashMap<CacheKey, CachedValue>>> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        self.entries().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: CacheKey, value: CachedValue) {
        if let Ok(mut entries) = self.entries() {
            entries.insert(key, value);
        }
    }

    pub fn invalidate(&self, key: &CacheKey) {
        if let Ok(mut entries) = self.entries() {
            if entries.remove(key).is_some() {
                log::debug!("Cache invalidated: {:?}", key);
            }
        }
    }

    /// Invalidate everything a mutation of `sketch` makes stale: its report's
    /// sketch list and its own entry.
    pub fn invalidate_sketch(&self, report_id: &str, id: SketchId) {
        self.invalidate(&CacheKey::ReportSketches(report_id.to_string()));
        self.invalidate(&CacheKey::Sketch(id));
    }

    /// Report owning `id`, as far as the cache knows.
    pub fn report_of(&self, id: SketchId) -> Option<ReportId> {
        let entries = self.entries().ok()?;
        entries.iter().find_map(|(key, value)| match (key, value) {
            (CacheKey::Sketch(cached), CachedValue::One(sketch)) if *cached == id => {
                Some(sketch.report_id.clone())
            }
            (CacheKey::ReportSketches(report), CachedValue::List(list))
                if list.iter().any(|s| s.id == id) =>
            {
                Some(report.clone())
            }
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries() {
            entries.clear();
        }
    }
}

/// A [`SketchStore`] that caches reads of another store.
///
/// Successful mutations invalidate the affected report list and sketch
/// entry; failed mutations leave the cache alone.
pub struct CachedStore<S> {
    inner: S,
    cache: QueryCache,
}

impl<S: SketchStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: QueryCache::new(),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: SketchStore> SketchStore for CachedStore<S> {
    fn create_sketch(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        let pending = self.inner.create_sketch(report_id, sketch_type, data);
        Box::pin(async move {
            let sketch = pending.await?;
            self.cache.invalidate_sketch(&sketch.report_id, sketch.id);
            Ok(sketch)
        })
    }

    fn update_sketch(
        &self,
        id: SketchId,
        update: SketchUpdate,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        let pending = self.inner.update_sketch(id, update);
        Box::pin(async move {
            let sketch = pending.await?;
            self.cache.invalidate_sketch(&sketch.report_id, sketch.id);
            Ok(sketch)
        })
    }

    fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>> {
        // Lists that never contained the sketch stay valid.
        let report = self.cache.report_of(id);
        let pending = self.inner.delete_sketch(id);
        Box::pin(async move {
            pending.await?;
            match report {
                Some(report_id) => self.cache.invalidate_sketch(&report_id, id),
                None => self.cache.invalidate(&CacheKey::Sketch(id)),
            }
            Ok(())
        })
    }

    fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>> {
        let key = CacheKey::Sketch(id);
        if let Some(CachedValue::One(sketch)) = self.cache.get(&key) {
            return Box::pin(std::future::ready(Ok(sketch)));
        }

        let pending = self.inner.get_sketch(id);
        Box::pin(async move {
            let sketch = pending.await?;
            self.cache.insert(key, CachedValue::One(sketch.clone()));
            Ok(sketch)
        })
    }

    fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>> {
        let key = CacheKey::ReportSketches(report_id.to_string());
        if let Some(CachedValue::List(list)) = self.cache.get(&key) {
            return Box::pin(std::future::ready(Ok(list)));
        }

        let pending = self.inner.list_sketches(report_id);
        Box::pin(async move {
            let list = pending.await?;
            self.cache.insert(key, CachedValue::List(list.clone()));
            Ok(list)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, block_on};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts reads that reach the backing store.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryStore,
        reads: AtomicUsize,
    }

    impl SketchStore for CountingStore {
        fn create_sketch(
            &self,
            report_id: &str,
            sketch_type: SketchType,
            data: SketchDocument,
        ) -> BoxFuture<'_, StorageResult<Sketch>> {
            self.inner.create_sketch(report_id, sketch_type, data)
        }

        fn update_sketch(
            &self,
            id: SketchId,
            update: SketchUpdate,
        ) -> BoxFuture<'_, StorageResult<Sketch>> {
            self.inner.update_sketch(id, update)
        }

        fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>> {
            self.inner.delete_sketch(id)
        }

        fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get_sketch(id)
        }

        fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.list_sketches(report_id)
        }
    }

    fn store() -> (Arc<CountingStore>, CachedStore<Arc<CountingStore>>) {
        let counting = Arc::new(CountingStore::default());
        (counting.clone(), CachedStore::new(counting))
    }

    #[test]
    fn test_list_is_served_from_cache() {
        let (counting, cached) = store();
        block_on(cached.create_sketch("r1", SketchType::FloorPlan, SketchDocument::new())).unwrap();

        block_on(cached.list_sketches("r1")).unwrap();
        block_on(cached.list_sketches("r1")).unwrap();
        assert_eq!(counting.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_invalidates_report_list() {
        let (counting, cached) = store();
        assert!(block_on(cached.list_sketches("r1")).unwrap().is_empty());

        block_on(cached.create_sketch("r1", SketchType::FloorPlan, SketchDocument::new())).unwrap();

        assert_eq!(block_on(cached.list_sketches("r1")).unwrap().len(), 1);
        assert_eq!(counting.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_update_invalidates_list_and_entry() {
        let (_, cached) = store();
        let sketch = block_on(cached.create_sketch(
            "r1",
            SketchType::FloorPlan,
            SketchDocument::new(),
        ))
        .unwrap();
        block_on(cached.list_sketches("r1")).unwrap();
        block_on(cached.get_sketch(sketch.id)).unwrap();
        assert_eq!(cached.cache().len(), 2);

        let update = SketchUpdate {
            sketch_type: Some(SketchType::Detail),
            data: None,
        };
        block_on(cached.update_sketch(sketch.id, update)).unwrap();

        assert!(cached.cache().is_empty());
        assert_eq!(
            block_on(cached.get_sketch(sketch.id)).unwrap().sketch_type,
            SketchType::Detail
        );
    }

    #[test]
    fn test_mutation_leaves_other_reports_cached() {
        let (_, cached) = store();
        block_on(cached.list_sketches("r2")).unwrap();
        block_on(cached.create_sketch("r1", SketchType::FloorPlan, SketchDocument::new())).unwrap();

        assert!(
            cached
                .cache()
                .get(&CacheKey::ReportSketches("r2".to_string()))
                .is_some()
        );
    }

    #[test]
    fn test_delete_invalidates_owning_list() {
        let (_, cached) = store();
        let sketch = block_on(cached.create_sketch(
            "r1",
            SketchType::FloorPlan,
            SketchDocument::new(),
        ))
        .unwrap();
        block_on(cached.list_sketches("r1")).unwrap();

        block_on(cached.delete_sketch(sketch.id)).unwrap();

        assert!(block_on(cached.list_sketches("r1")).unwrap().is_empty());
    }

    #[test]
    fn test_failed_mutation_keeps_cache() {
        let (_, cached) = store();
        block_on(cached.list_sketches("r1")).unwrap();

        let missing = uuid::Uuid::new_v4();
        assert!(block_on(cached.update_sketch(missing, SketchUpdate::default())).is_err());
        assert!(block_on(cached.delete_sketch(missing)).is_err());

        assert_eq!(cached.cache().len(), 1);
    }
}
