//! Asset loader traits and the suffix-keyed loader registry.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::{AssetDescriptor, LoaderParams};
use crate::error::{AssetError, AssetResult};
use crate::resolver::FileHandle;
use crate::Asset;

/// Trait for loading assets from a resolved file.
///
/// Implement this to add support for a specific asset type. Loaders may
/// declare dependencies, which the manager completes before calling `load`.
///
/// # Example
///
/// ```ignore
/// struct TextureLoader;
///
/// impl AssetLoader for TextureLoader {
///     type Asset = Texture;
///     type Params = TextureParams;
///
///     fn load(
///         &self,
///         name: &str,
///         file: &FileHandle,
///         params: Option<&TextureParams>,
///     ) -> AssetResult<Texture> {
///         let bytes = file.read()?;
///         // Decode bytes into a Texture...
///     }
/// }
/// ```
pub trait AssetLoader: Send + Sync + 'static {
    /// The asset type this loader produces.
    type Asset: Asset;

    /// The loader-configuration type accepted via `AssetDescriptor::with_params`.
    /// Use `()` for loaders that take no parameters.
    type Params: Send + Sync + 'static;

    /// Declare the assets this asset depends on.
    ///
    /// Called once per load, before `load`. Dependencies are guaranteed to be
    /// loaded before `load` runs.
    fn dependencies(
        &self,
        _name: &str,
        _file: &FileHandle,
        _params: Option<&Self::Params>,
    ) -> Vec<AssetDescriptor> {
        Vec::new()
    }

    /// Produce the asset.
    ///
    /// Runs on the manager's background worker when `asynchronous` is true,
    /// otherwise inline during `update()`.
    fn load(
        &self,
        name: &str,
        file: &FileHandle,
        params: Option<&Self::Params>,
    ) -> AssetResult<Self::Asset>;

    /// Whether `load` should run on the background worker. Defaults to true.
    fn asynchronous(&self) -> bool {
        true
    }
}

/// Type-erased asset loader for dynamic dispatch.
pub trait ErasedAssetLoader: Send + Sync {
    /// The type ID of the asset this loader produces.
    fn asset_type_id(&self) -> TypeId;

    /// Whether loading runs on the background worker.
    fn asynchronous(&self) -> bool;

    /// Declare dependencies, downcasting the erased parameters.
    fn dependencies(
        &self,
        name: &str,
        file: &FileHandle,
        params: Option<&LoaderParams>,
    ) -> AssetResult<Vec<AssetDescriptor>>;

    /// Load the asset, downcasting the erased parameters.
    fn load_erased(
        &self,
        name: &str,
        file: &FileHandle,
        params: Option<&LoaderParams>,
    ) -> AssetResult<Arc<dyn Asset>>;
}

fn downcast_params<'a, L: AssetLoader>(
    name: &str,
    params: Option<&'a LoaderParams>,
) -> AssetResult<Option<&'a L::Params>> {
    match params {
        None => Ok(None),
        Some(params) => params
            .downcast_ref::<L::Params>()
            .map(Some)
            .ok_or_else(|| AssetError::InvalidParameters {
                name: name.to_string(),
                expected: std::any::type_name::<L::Params>(),
            }),
    }
}

impl<L: AssetLoader> ErasedAssetLoader for L {
    fn asset_type_id(&self) -> TypeId {
        TypeId::of::<L::Asset>()
    }

    fn asynchronous(&self) -> bool {
        AssetLoader::asynchronous(self)
    }

    fn dependencies(
        &self,
        name: &str,
        file: &FileHandle,
        params: Option<&LoaderParams>,
    ) -> AssetResult<Vec<AssetDescriptor>> {
        let params = downcast_params::<L>(name, params)?;
        Ok(AssetLoader::dependencies(self, name, file, params))
    }

    fn load_erased(
        &self,
        name: &str,
        file: &FileHandle,
        params: Option<&LoaderParams>,
    ) -> AssetResult<Arc<dyn Asset>> {
        let params = downcast_params::<L>(name, params)?;
        let asset = self.load(name, file, params)?;
        Ok(Arc::new(asset))
    }
}

/// Registry of asset loaders, keyed by asset type and filename suffix.
///
/// When loading an asset of type `T` named `foo.atlas`, the registry picks,
/// among all suffixes registered for `T`, the longest one that is a suffix of
/// the name. The empty suffix acts as the default fallback. A type with no
/// registered loaders yields `None`.
#[derive(Default)]
pub struct LoaderRegistry {
    /// (asset type, suffix) -> loader.
    by_type: HashMap<TypeId, Vec<(String, Arc<dyn ErasedAssetLoader>)>>,
}

impl LoaderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader as the default (empty suffix) for its asset type.
    pub fn register<L: AssetLoader>(&mut self, loader: L) {
        self.register_for_suffix(loader, "");
    }

    /// Register a loader for a specific filename suffix.
    ///
    /// Re-registering the same (type, suffix) pair replaces the previous
    /// loader.
    pub fn register_for_suffix<L: AssetLoader>(&mut self, loader: L, suffix: impl Into<String>) {
        let suffix = suffix.into();
        let loader: Arc<dyn ErasedAssetLoader> = Arc::new(loader);
        let entries = self.by_type.entry(loader.asset_type_id()).or_default();

        if let Some(entry) = entries.iter_mut().find(|(s, _)| *s == suffix) {
            entry.1 = loader;
        } else {
            entries.push((suffix, loader));
        }
    }

    /// Select the loader for a type and asset name, longest suffix wins.
    pub fn get(&self, type_id: TypeId, name: &str) -> Option<Arc<dyn ErasedAssetLoader>> {
        let entries = self.by_type.get(&type_id)?;

        entries
            .iter()
            .filter(|(suffix, _)| name.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, loader)| Arc::clone(loader))
    }

    /// Whether any loader is registered for a type.
    pub fn has_loader_for_type(&self, type_id: TypeId) -> bool {
        self.by_type.contains_key(&type_id)
    }
}

/// A loader producing UTF-8 strings.
pub struct TextLoader;

impl AssetLoader for TextLoader {
    type Asset = String;
    type Params = ();

    fn load(&self, name: &str, file: &FileHandle, _params: Option<&()>) -> AssetResult<String> {
        let bytes = file.read()?;
        String::from_utf8(bytes).map_err(|e| AssetError::LoadFailed {
            name: name.to_string(),
            message: format!("invalid UTF-8: {}", e),
        })
    }

    fn asynchronous(&self) -> bool {
        false
    }
}

/// A loader producing raw bytes.
pub struct BytesLoader;

impl AssetLoader for BytesLoader {
    type Asset = Vec<u8>;
    type Params = ();

    fn load(&self, _name: &str, file: &FileHandle, _params: Option<&()>) -> AssetResult<Vec<u8>> {
        file.read()
    }

    fn asynchronous(&self) -> bool {
        false
    }
}
