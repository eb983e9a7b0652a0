//! Server configuration from environment variables.

use sketchpad_core::{CachedStore, FileStore, MemoryStore, SketchStore, StorageResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3030";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid SKETCHPAD_ADDR {0:?}")]
    InvalidAddr(String),
    #[error("Unknown SKETCHPAD_STORAGE {0:?} (expected \"memory\" or \"file\")")]
    UnknownStorage(String),
}

/// Which backend holds the sketches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub storage: StorageKind,
    /// Directory for the file backend; the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr_str = lookup("SKETCHPAD_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_str
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr_str.clone()))?;

        let storage = match lookup("SKETCHPAD_STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("file") => StorageKind::File,
            Some("memory") => StorageKind::Memory,
            Some(other) => return Err(ConfigError::UnknownStorage(other.to_string())),
        };

        let data_dir = lookup("SKETCHPAD_DATA_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            addr,
            storage,
            data_dir,
        })
    }

    /// Open the configured backend behind a read cache.
    pub fn open_store(&self) -> StorageResult<Arc<dyn SketchStore>> {
        Ok(match self.storage {
            StorageKind::Memory => Arc::new(MemoryStore::new()),
            StorageKind::File => {
                let path = match &self.data_dir {
                    Some(dir) => dir.clone(),
                    None => FileStore::default_path()?,
                };
                Arc::new(CachedStore::new(FileStore::new(path)?))
            }
        })
    }
}
