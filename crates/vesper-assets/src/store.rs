//! Reference-counted storage for loaded assets.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AssetError, AssetResult};
use crate::Asset;

/// A loaded asset together with its reference count.
pub(crate) struct RefCountedContainer {
    asset: Arc<dyn Asset>,
    ref_count: usize,
}

impl RefCountedContainer {
    fn new(asset: Arc<dyn Asset>) -> Self {
        Self {
            asset,
            ref_count: 1,
        }
    }
}

/// Name-keyed table of loaded assets.
///
/// Each name is bound to exactly one asset type for as long as it is
/// resident. The count tracks how many load requests (direct or as a
/// dependency) are outstanding against the name.
#[derive(Default)]
pub(crate) struct AssetStore {
    containers: HashMap<String, RefCountedContainer>,
    types: HashMap<String, (TypeId, &'static str)>,
}

impl AssetStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly loaded asset with a reference count of 1.
    pub(crate) fn insert(
        &mut self,
        name: &str,
        type_id: TypeId,
        type_name: &'static str,
        asset: Arc<dyn Asset>,
    ) {
        self.containers
            .insert(name.to_string(), RefCountedContainer::new(asset));
        self.types.insert(name.to_string(), (type_id, type_name));
    }

    /// Whether an asset is resident under this name.
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    /// The type an asset is resident as, if loaded.
    pub(crate) fn type_of(&self, name: &str) -> Option<(TypeId, &'static str)> {
        self.types.get(name).copied()
    }

    /// The stored asset downcast to `T`.
    ///
    /// Fails with `NotLoaded` when the name is unknown and `TypeMismatch`
    /// when it is resident as a different type.
    pub(crate) fn get<T: Asset>(&self, name: &str) -> AssetResult<Arc<T>> {
        let container = self
            .containers
            .get(name)
            .ok_or_else(|| AssetError::NotLoaded {
                name: name.to_string(),
            })?;
        crate::downcast_arc::<T>(Arc::clone(&container.asset)).ok_or_else(|| {
            AssetError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            }
        })
    }

    /// The current reference count of an asset.
    pub(crate) fn ref_count(&self, name: &str) -> Option<usize> {
        self.containers.get(name).map(|c| c.ref_count)
    }

    /// Overwrite the reference count of a resident asset.
    pub(crate) fn set_ref_count(&mut self, name: &str, count: usize) -> AssetResult<()> {
        let container = self
            .containers
            .get_mut(name)
            .ok_or_else(|| AssetError::NotLoaded {
                name: name.to_string(),
            })?;
        container.ref_count = count;
        Ok(())
    }

    /// Increment the reference count of a resident asset.
    pub(crate) fn add_ref(&mut self, name: &str) {
        if let Some(container) = self.containers.get_mut(name) {
            container.ref_count += 1;
        }
    }

    /// Decrement the reference count.
    ///
    /// Returns true when the count reached zero, in which case the asset was
    /// disposed and removed from the store. The count never goes negative: a
    /// count already forced to zero via `set_ref_count` disposes here.
    pub(crate) fn release(&mut self, name: &str) -> AssetResult<bool> {
        let container = self
            .containers
            .get_mut(name)
            .ok_or_else(|| AssetError::NotLoaded {
                name: name.to_string(),
            })?;

        container.ref_count = container.ref_count.saturating_sub(1);
        if container.ref_count > 0 {
            return Ok(false);
        }

        let container = self
            .containers
            .remove(name)
            .expect("container present above");
        self.types.remove(name);
        container.asset.dispose();
        Ok(true)
    }

    /// Names of all resident assets.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.containers.keys().map(String::as_str)
    }

    /// Number of resident assets.
    pub(crate) fn len(&self) -> usize {
        self.containers.len()
    }
}
