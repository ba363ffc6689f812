//! State for a single in-flight load.

use std::sync::Arc;

use async_executor::Task;
use futures_lite::future;

use crate::descriptor::AssetDescriptor;
use crate::error::AssetResult;
use crate::executor::{AsyncExecutor, LoadNotifier};
use crate::loader::ErasedAssetLoader;
use crate::resolver::FileHandle;
use crate::Asset;

/// One entry on the manager's task stack.
///
/// A task moves through three phases as `update()` advances it: dependency
/// declaration, waiting for dependencies, and running the loader. Dependency
/// tasks are pushed above their dependent, so the top of the stack is always
/// the next task allowed to make progress.
pub(crate) struct AssetLoadingTask {
    pub(crate) descriptor: AssetDescriptor,
    pub(crate) loader: Arc<dyn ErasedAssetLoader>,
    pub(crate) file: FileHandle,

    /// Whether `dependencies` has run for this task.
    pub(crate) deps_declared: bool,
    /// Dependency names this task holds a reference against, for rollback.
    pub(crate) resolved_deps: Vec<String>,

    /// Dropping the task before completion drops the job, cancelling it.
    job: Option<Task<AssetResult<Arc<dyn Asset>>>>,
    result: Option<AssetResult<Arc<dyn Asset>>>,
}

impl AssetLoadingTask {
    pub(crate) fn new(
        descriptor: AssetDescriptor,
        loader: Arc<dyn ErasedAssetLoader>,
        file: FileHandle,
    ) -> Self {
        Self {
            descriptor,
            loader,
            file,
            deps_declared: false,
            resolved_deps: Vec::new(),
            job: None,
            result: None,
        }
    }

    /// Whether the loader has been started (or already finished).
    pub(crate) fn started(&self) -> bool {
        self.job.is_some() || self.result.is_some()
    }

    /// Start the loader.
    ///
    /// Asynchronous loaders are handed to the worker, which signals the
    /// notifier when the job settles; synchronous loaders run inline and
    /// complete immediately.
    pub(crate) fn start(&mut self, executor: &AsyncExecutor, notifier: &Arc<LoadNotifier>) {
        debug_assert!(!self.started());

        if self.loader.asynchronous() {
            let loader = Arc::clone(&self.loader);
            let file = self.file.clone();
            let name = self.descriptor.name().to_string();
            let params = self.descriptor.params().cloned();
            let notifier = Arc::clone(notifier);

            self.job = Some(executor.spawn(async move {
                let result = loader.load_erased(&name, &file, params.as_ref());
                notifier.notify();
                result
            }));
        } else {
            self.result = Some(self.loader.load_erased(
                self.descriptor.name(),
                &self.file,
                self.descriptor.params(),
            ));
        }
    }

    /// Poll the running job without blocking.
    ///
    /// Returns the outcome once available. Dropping the task before this
    /// returns `Some` cancels the job.
    pub(crate) fn try_complete(&mut self) -> Option<AssetResult<Arc<dyn Asset>>> {
        if self.result.is_none() {
            let job = self.job.as_mut()?;
            let outcome = future::block_on(future::poll_once(job));
            match outcome {
                Some(result) => {
                    self.job = None;
                    self.result = Some(result);
                }
                None => return None,
            }
        }
        self.result.take()
    }
}
