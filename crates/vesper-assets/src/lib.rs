//! Reference-counted, dependency-aware asset loading.
//!
//! The [`AssetManager`] queues load requests, resolves them through a
//! pluggable [`FileHandleResolver`], and hands the bytes to registered
//! [`AssetLoader`]s, which may run inline or on a background worker. Loaders
//! can declare dependencies, which are always completed before their
//! dependent. Assets are shared via `Arc`, reference-counted per logical
//! name, and disposed exactly once when the last reference is unloaded.
//!
//! Progress is driven cooperatively: the owning thread calls
//! [`AssetManager::update`] (or one of the blocking conveniences) until
//! loading finishes.
//!
//! # Example
//!
//! ```no_run
//! use vesper_assets::{AssetManager, TextLoader};
//!
//! let manager = AssetManager::from_path("assets");
//! manager.set_loader(TextLoader);
//!
//! manager.load::<String>("dialogue/intro.txt")?;
//! while !manager.update()? {
//!     // Render a loading screen using manager.progress()...
//! }
//!
//! let intro = manager.get::<String>("dialogue/intro.txt")?;
//! println!("{}", intro);
//! manager.unload("dialogue/intro.txt")?;
//! # Ok::<(), vesper_assets::AssetError>(())
//! ```

use std::any::Any;
use std::sync::Arc;

mod descriptor;
mod error;
mod executor;
mod graph;
mod loader;
mod manager;
mod resolver;
mod store;
mod task;

pub use descriptor::{AssetDescriptor, LoadedCallback, LoaderParams};
pub use error::{AssetError, AssetErrorListener, AssetResult};
pub use loader::{AssetLoader, BytesLoader, ErasedAssetLoader, LoaderRegistry, TextLoader};
pub use manager::AssetManager;
pub use resolver::{FileHandle, FileHandleResolver, FileSystemResolver, MemoryResolver};

/// A loadable asset.
///
/// Implemented by any `Send + Sync` type. Assets owning external resources
/// override [`dispose`](Self::dispose), which the manager calls exactly once
/// when the asset's reference count reaches zero.
pub trait Asset: Any + Send + Sync {
    /// Release resources the asset owns outside of Rust's memory model.
    fn dispose(&self) {}
}

impl Asset for String {}
impl Asset for Vec<u8> {}

/// Downcast a stored asset to its concrete type.
pub(crate) fn downcast_arc<T: Asset>(asset: Arc<dyn Asset>) -> Option<Arc<T>> {
    let any: Arc<dyn Any + Send + Sync> = asset;
    any.downcast::<T>().ok()
}
