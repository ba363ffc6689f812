//! Error types for the asset system.

use std::fmt;
use std::path::PathBuf;

use crate::descriptor::AssetDescriptor;

/// Errors that can occur during asset operations.
#[derive(Debug)]
pub enum AssetError {
    /// No loader registered for the requested asset type and file name.
    NoLoader {
        /// The asset name that was requested.
        name: String,
        /// Human-readable name of the requested asset type.
        type_name: &'static str,
    },

    /// The same name was requested or loaded under two different types.
    TypeConflict {
        /// The conflicting asset name.
        name: String,
        /// The type the name is already associated with.
        loaded: &'static str,
        /// The type that was requested.
        requested: &'static str,
    },

    /// A query or unload referenced a name the manager does not know.
    NotLoaded {
        /// The unknown asset name.
        name: String,
    },

    /// Preload validation found the target file absent.
    FileNotFound {
        /// The resolved location that does not exist.
        path: String,
    },

    /// Failed to read asset data from its resolved location.
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// A loading task failed while being advanced.
    LoadFailed {
        /// The asset name being loaded.
        name: String,
        /// Description of the failure.
        message: String,
    },

    /// Loader parameters did not match the loader's parameter type.
    InvalidParameters {
        /// The asset name being loaded.
        name: String,
        /// The parameter type the loader expected.
        expected: &'static str,
    },

    /// An asset was requested as a type other than the one it is stored as.
    TypeMismatch {
        /// The asset name.
        name: String,
        /// The type that was requested.
        expected: &'static str,
    },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::NoLoader { name, type_name } => {
                write!(f, "No loader registered for '{}' as {}", name, type_name)
            }
            AssetError::TypeConflict {
                name,
                loaded,
                requested,
            } => {
                write!(
                    f,
                    "Asset '{}' already in use as {}, requested as {}",
                    name, loaded, requested
                )
            }
            AssetError::NotLoaded { name } => {
                write!(f, "Asset not loaded: {}", name)
            }
            AssetError::FileNotFound { path } => {
                write!(f, "File not found: {}", path)
            }
            AssetError::Io { path, source } => {
                write!(f, "IO error reading '{}': {}", path.display(), source)
            }
            AssetError::LoadFailed { name, message } => {
                write!(f, "Failed to load '{}': {}", name, message)
            }
            AssetError::InvalidParameters { name, expected } => {
                write!(
                    f,
                    "Parameters for '{}' are not of the expected type {}",
                    name, expected
                )
            }
            AssetError::TypeMismatch { name, expected } => {
                write!(f, "Asset '{}' is not of type {}", name, expected)
            }
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;

/// Listener for errors raised while tasks are advanced during `update()`.
///
/// When a listener is registered the manager hands failed loads to it and
/// keeps going; without one, `update()` returns the error to its caller.
///
/// The listener is invoked while the manager's internal lock is held, so it
/// must not call back into the manager.
pub trait AssetErrorListener: Send + Sync {
    /// Called once per failed load, with the descriptor that failed.
    fn error(&self, descriptor: &AssetDescriptor, error: &AssetError);
}
