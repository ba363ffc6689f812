//! File resolution - mapping logical asset names to readable locations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{AssetError, AssetResult};

/// A resolved asset location that loaders read bytes from.
///
/// Handles are cheap to clone so loading jobs can own one on the worker
/// thread.
#[derive(Debug, Clone)]
pub enum FileHandle {
    /// A file on disk.
    Disk {
        /// The resolved filesystem path.
        path: PathBuf,
    },

    /// Bytes held in memory (embedded or test data).
    Memory {
        /// The logical name the bytes were registered under.
        name: String,
        /// The raw bytes.
        data: Arc<[u8]>,
    },

    /// The resolver found nothing for this name.
    Absent {
        /// The logical name that failed to resolve.
        name: String,
    },
}

impl FileHandle {
    /// Whether the resolved location exists.
    pub fn exists(&self) -> bool {
        match self {
            FileHandle::Disk { path } => path.exists(),
            FileHandle::Memory { .. } => true,
            FileHandle::Absent { .. } => false,
        }
    }

    /// Read the full contents of the location.
    pub fn read(&self) -> AssetResult<Vec<u8>> {
        match self {
            FileHandle::Disk { path } => std::fs::read(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AssetError::FileNotFound {
                        path: path.display().to_string(),
                    }
                } else {
                    AssetError::Io {
                        path: path.clone(),
                        source: e,
                    }
                }
            }),
            FileHandle::Memory { data, .. } => Ok(data.to_vec()),
            FileHandle::Absent { name } => Err(AssetError::FileNotFound { path: name.clone() }),
        }
    }

    /// A string form of the location for logging.
    pub fn display_name(&self) -> String {
        match self {
            FileHandle::Disk { path } => path.display().to_string(),
            FileHandle::Memory { name, .. } => format!("memory://{}", name),
            FileHandle::Absent { name } => name.clone(),
        }
    }
}

/// Maps a logical asset name to a concrete location.
///
/// The manager validates existence through the handle this returns, so a
/// resolver backed by something other than the filesystem (memory, archives,
/// the network) defines its own notion of existence.
pub trait FileHandleResolver: Send + Sync {
    /// Resolve a normalized asset name to a handle.
    fn resolve(&self, name: &str) -> FileHandle;
}

/// Resolver that joins names onto a base directory.
pub struct FileSystemResolver {
    base_path: PathBuf,
}

impl FileSystemResolver {
    /// Create a resolver rooted at `base_path`.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }
}

impl FileHandleResolver for FileSystemResolver {
    fn resolve(&self, name: &str) -> FileHandle {
        let path = Path::new(name);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        };
        FileHandle::Disk { path }
    }
}

/// Resolver serving bytes registered in memory.
///
/// Clones share the same underlying table, so bytes can be added after the
/// resolver has been handed to a manager.
#[derive(Default, Clone)]
pub struct MemoryResolver {
    files: Arc<Mutex<HashMap<String, Arc<[u8]>>>>,
}

impl MemoryResolver {
    /// Create an empty memory resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bytes under a name.
    pub fn insert(&self, name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.files
            .lock()
            .expect("memory resolver table poisoned")
            .insert(name.into(), bytes.into());
    }

    /// Remove the bytes registered under a name.
    pub fn remove(&self, name: &str) -> Option<Arc<[u8]>> {
        self.files
            .lock()
            .expect("memory resolver table poisoned")
            .remove(name)
    }
}

impl FileHandleResolver for MemoryResolver {
    fn resolve(&self, name: &str) -> FileHandle {
        let files = self.files.lock().expect("memory resolver table poisoned");
        match files.get(name) {
            Some(data) => FileHandle::Memory {
                name: name.to_string(),
                data: Arc::clone(data),
            },
            None => FileHandle::Absent {
                name: name.to_string(),
            },
        }
    }
}
