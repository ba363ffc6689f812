//! Load request descriptors.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::Asset;

/// Type-erased loader parameters attached to a descriptor.
pub type LoaderParams = Arc<dyn Any + Send + Sync>;

/// Callback fired once a descriptor has been resolved.
///
/// Fired on normal task completion, on the short-circuit "already loaded"
/// path, and when a still-queued descriptor is removed by `unload`, so every
/// accepted load request gets exactly one notification.
///
/// The callback runs while the manager's internal lock is held; it must not
/// call back into the manager.
pub trait LoadedCallback: Send + Sync {
    /// Called with the asset name and the type it was requested as.
    fn finished_loading(&self, name: &str, type_id: TypeId);
}

impl<F> LoadedCallback for F
where
    F: Fn(&str, TypeId) + Send + Sync,
{
    fn finished_loading(&self, name: &str, type_id: TypeId) {
        self(name, type_id)
    }
}

/// An immutable description of a single load request.
///
/// Names are normalized (backslashes become forward slashes) so the same
/// logical asset always maps to the same key.
#[derive(Clone)]
pub struct AssetDescriptor {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    params: Option<LoaderParams>,
    callback: Option<Arc<dyn LoadedCallback>>,
}

impl AssetDescriptor {
    /// Create a descriptor for loading `name` as asset type `T`.
    pub fn new<T: Asset>(name: impl Into<String>) -> Self {
        Self {
            name: normalize_name(&name.into()),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            params: None,
            callback: None,
        }
    }

    /// Attach loader parameters. The type must match the loader's
    /// `Params` associated type, checked when the loader runs.
    pub fn with_params<P: Send + Sync + 'static>(mut self, params: P) -> Self {
        self.params = Some(Arc::new(params));
        self
    }

    /// Attach a completion callback.
    pub fn with_callback(mut self, callback: impl LoadedCallback + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// The normalized asset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `TypeId` of the requested asset type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable name of the requested asset type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The attached loader parameters, if any.
    pub fn params(&self) -> Option<&LoaderParams> {
        self.params.as_ref()
    }

    /// Fire the completion callback, if one is attached.
    pub(crate) fn fire_callback(&self) {
        if let Some(callback) = &self.callback {
            callback.finished_loading(&self.name, self.type_id);
        }
    }
}

impl fmt::Debug for AssetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDescriptor")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("has_params", &self.params.is_some())
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

/// Normalize a logical asset name for use as a table key.
pub(crate) fn normalize_name(name: &str) -> String {
    name.replace('\\', "/")
}
