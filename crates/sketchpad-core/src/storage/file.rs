//! File-based storage implementation.

use super::{
    BoxFuture, SketchStore, StorageError, StorageResult, sort_by_creation, validate_report_id,
};
use crate::config::SketchConfig;
use crate::model::SketchDocument;
use crate::sketch::{Sketch, SketchId, SketchType, SketchUpdate};
use std::fs;
use std::io;
use std::future::ready;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-based storage.
///
/// Stores each sketch as `<id>.json` in a single directory. Writes are
/// serialized through a lock so read-modify-write updates do not interleave,
/// and each file is replaced atomically so readers never see a partial write.
pub struct FileStore {
    /// Base directory for sketch files.
    base_path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a new file store with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Unix: `~/.local/share/sketchpad/sketches/`
    /// On Windows: `%LOCALAPPDATA%\sketchpad\sketches\`
    pub fn default_location() -> StorageResult<Self> {
        Self::new(Self::default_path()?)
    }

    /// Open the directory named by the config, or the default location.
    pub fn from_config(config: &SketchConfig) -> StorageResult<Self> {
        match &config.storage_dir {
            Some(dir) => Self::new(dir.clone()),
            None => Self::default_location(),
        }
    }

    /// Directory used by [`FileStore::default_location`].
    pub fn default_path() -> StorageResult<PathBuf> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;
        Ok(base.join("sketchpad").join("sketches"))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn sketch_path(&self, id: SketchId) -> PathBuf {
        self.base_path.join(format!("{}.json", id))
    }

    fn read(&self, id: SketchId) -> StorageResult<Sketch> {
        let path = self.sketch_path(id);
        match fs::read_to_string(&path) {
            Ok(json) => parse_sketch(&path, &json),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
            Err(e) => Err(read_error(&path, e)),
        }
    }

    /// Write to `<id>.json.tmp`, then rename over `<id>.json`.
    fn write(&self, sketch: &Sketch) -> StorageResult<()> {
        let path = self.sketch_path(sketch.id);
        let tmp_path = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(sketch)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&tmp_path, json).map_err(|e| {
            StorageError::Io(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn create(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> StorageResult<Sketch> {
        validate_report_id(report_id)?;
        let sketch = Sketch::new(report_id, sketch_type, data);
        let _guard = self.lock()?;
        self.write(&sketch)?;
        Ok(sketch)
    }

    fn update(&self, id: SketchId, update: SketchUpdate) -> StorageResult<Sketch> {
        let _guard = self.lock()?;
        let mut sketch = self.read(id)?;
        sketch.apply(update);
        self.write(&sketch)?;
        Ok(sketch)
    }

    fn delete(&self, id: SketchId) -> StorageResult<()> {
        let _guard = self.lock()?;
        let path = self.sketch_path(id);
        if !path.exists() {
            return Err(StorageError::NotFound(id));
        }
        fs::remove_file(&path)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
    }

    fn list(&self, report_id: &str) -> StorageResult<Vec<Sketch>> {
        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut sketches = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_none_or(|e| e != "json") {
                continue;
            }
            match read_sketch(&path) {
                Ok(sketch) if sketch.report_id == report_id => sketches.push(sketch),
                Ok(_) => {}
                Err(e) => log::warn!("Skipping unreadable sketch file: {}", e),
            }
        }
        sort_by_creation(&mut sketches);
        Ok(sketches)
    }
}

fn read_sketch(path: &Path) -> StorageResult<Sketch> {
    let json = fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    parse_sketch(path, &json)
}

fn read_error(path: &Path, e: io::Error) -> StorageError {
    StorageError::Io(format!("Failed to read {}: {}", path.display(), e))
}

fn parse_sketch(path: &Path, json: &str) -> StorageResult<Sketch> {
    Sketch::from_json_lenient(json).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

impl SketchStore for FileStore {
    fn create_sketch(
        &self,
        report_id: &str,
        sketch_type: SketchType,
        data: SketchDocument,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        Box::pin(ready(self.create(report_id, sketch_type, data)))
    }

    fn update_sketch(
        &self,
        id: SketchId,
        update: SketchUpdate,
    ) -> BoxFuture<'_, StorageResult<Sketch>> {
        Box::pin(ready(self.update(id, update)))
    }

    fn delete_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(ready(self.delete(id)))
    }

    fn get_sketch(&self, id: SketchId) -> BoxFuture<'_, StorageResult<Sketch>> {
        Box::pin(ready(self.read(id)))
    }

    fn list_sketches(&self, report_id: &str) -> BoxFuture<'_, StorageResult<Vec<Sketch>>> {
        Box::pin(ready(self.list(report_id)))
    }
}
