//! The asset manager facade.

use std::any::TypeId;
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::descriptor::{normalize_name, AssetDescriptor};
use crate::error::{AssetError, AssetErrorListener, AssetResult};
use crate::executor::{AsyncExecutor, LoadNotifier};
use crate::graph::DependencyGraph;
use crate::loader::{AssetLoader, LoaderRegistry};
use crate::resolver::{FileHandleResolver, FileSystemResolver};
use crate::store::AssetStore;
use crate::task::AssetLoadingTask;
use crate::Asset;

/// How long blocking waits sleep before re-polling, in case a worker
/// notification is missed.
const WAIT_SLICE: Duration = Duration::from_millis(1);

struct ManagerState {
    store: AssetStore,
    graph: DependencyGraph,
    loaders: LoaderRegistry,
    queue: VecDeque<AssetDescriptor>,
    tasks: Vec<AssetLoadingTask>,
    listener: Option<Arc<dyn AssetErrorListener>>,

    /// Completed top-level load requests, cumulative until `clear`.
    loaded: usize,
    /// Accepted top-level load requests, cumulative until `clear`.
    to_load: usize,
    /// High-water mark of the current task chain, for partial progress.
    peak_tasks: usize,
}

impl ManagerState {
    fn new() -> Self {
        Self {
            store: AssetStore::new(),
            graph: DependencyGraph::new(),
            loaders: LoaderRegistry::new(),
            queue: VecDeque::new(),
            tasks: Vec::new(),
            listener: None,
            loaded: 0,
            to_load: 0,
            peak_tasks: 0,
        }
    }

    /// Whether a name is queued or on the task stack.
    fn is_pending(&self, name: &str) -> bool {
        self.queue.iter().any(|d| d.name() == name)
            || self.tasks.iter().any(|t| t.descriptor.name() == name)
    }

    /// The type a name is currently bound to, across loaded, queued and
    /// in-flight entries.
    fn bound_type(&self, name: &str) -> Option<(TypeId, &'static str)> {
        self.store
            .type_of(name)
            .or_else(|| {
                self.queue
                    .iter()
                    .find(|d| d.name() == name)
                    .map(|d| (d.type_id(), d.type_name()))
            })
            .or_else(|| {
                self.tasks
                    .iter()
                    .find(|t| t.descriptor.name() == name)
                    .map(|t| (t.descriptor.type_id(), t.descriptor.type_name()))
            })
    }

    fn validate_request(&self, descriptor: &AssetDescriptor) -> AssetResult<()> {
        if self
            .loaders
            .get(descriptor.type_id(), descriptor.name())
            .is_none()
        {
            return Err(AssetError::NoLoader {
                name: descriptor.name().to_string(),
                type_name: descriptor.type_name(),
            });
        }
        if let Some((bound_id, bound_name)) = self.bound_type(descriptor.name()) {
            if bound_id != descriptor.type_id() {
                return Err(AssetError::TypeConflict {
                    name: descriptor.name().to_string(),
                    loaded: bound_name,
                    requested: descriptor.type_name(),
                });
            }
        }
        Ok(())
    }

    /// Bump the refcount of every dependency transitively reachable from
    /// `name`, each visited once per call.
    fn increment_ref_counted_dependencies(&mut self, name: &str) {
        for dep in self.graph.transitive_dependencies(name) {
            self.store.add_ref(&dep);
        }
    }

    /// Release one reference against `name`; assets reaching zero are
    /// disposed and their direct dependencies released in turn.
    fn release_cascade(&mut self, name: &str) {
        let mut worklist = vec![name.to_string()];
        while let Some(current) = worklist.pop() {
            if !self.store.contains(&current) {
                continue;
            }
            if let Ok(true) = self.store.release(&current) {
                tracing::debug!(name = %current, "Unloaded asset");
                let deps = self.graph.dependencies_of(&current).to_vec();
                self.graph.remove(&current);
                worklist.extend(deps);
            }
        }
    }

    /// Drop references an abandoned task already held.
    fn rollback_task(&mut self, task: &AssetLoadingTask) {
        self.graph.remove(task.descriptor.name());
        for dep in &task.resolved_deps {
            if self.store.contains(dep) {
                self.release_cascade(dep);
            }
        }
    }

    /// Route a failed load to the error listener, or surface it to the
    /// caller when none is registered.
    fn report_failure(
        &mut self,
        descriptor: &AssetDescriptor,
        error: AssetError,
    ) -> AssetResult<()> {
        self.to_load = self.to_load.saturating_sub(1);
        tracing::error!(name = descriptor.name(), %error, "Asset load failed");
        match &self.listener {
            Some(listener) => {
                listener.error(descriptor, &error);
                Ok(())
            }
            None => Err(error),
        }
    }
}

/// Reference-counted, dependency-aware asset loader.
///
/// Load requests are queued by [`load`](Self::load) and advanced by repeated
/// calls to [`update`](Self::update) on the owning thread; actual decoding
/// runs on a background worker for asynchronous loaders. Assets are shared
/// via `Arc` and disposed when their last reference is
/// [`unload`](Self::unload)ed.
///
/// All methods take `&self`; state lives behind one internal lock, so the
/// manager can be shared across threads.
pub struct AssetManager {
    state: Mutex<ManagerState>,
    executor: AsyncExecutor,
    notifier: Arc<LoadNotifier>,
    resolver: Box<dyn FileHandleResolver>,
}

impl AssetManager {
    /// Create a manager resolving names through `resolver`.
    pub fn new(resolver: impl FileHandleResolver + 'static) -> Self {
        Self {
            state: Mutex::new(ManagerState::new()),
            executor: AsyncExecutor::new(),
            notifier: Arc::new(LoadNotifier::new()),
            resolver: Box::new(resolver),
        }
    }

    /// Create a manager resolving names relative to `base_path` on disk.
    pub fn from_path(base_path: impl AsRef<Path>) -> Self {
        Self::new(FileSystemResolver::new(base_path))
    }

    fn lock(&self) -> MutexGuard<'_, ManagerState> {
        self.state.lock().expect("asset manager state poisoned")
    }

    /// Register a loader as the default for its asset type.
    pub fn set_loader<L: AssetLoader>(&self, loader: L) {
        self.lock().loaders.register(loader);
    }

    /// Register a loader for asset names ending in `suffix`.
    pub fn set_loader_for_suffix<L: AssetLoader>(&self, loader: L, suffix: impl Into<String>) {
        self.lock().loaders.register_for_suffix(loader, suffix);
    }

    /// Register a listener that absorbs load failures during `update`.
    pub fn set_error_listener(&self, listener: impl AssetErrorListener + 'static) {
        self.lock().listener = Some(Arc::new(listener));
    }

    /// Queue `name` for loading as asset type `T`.
    pub fn load<T: Asset>(&self, name: &str) -> AssetResult<()> {
        self.load_descriptor(AssetDescriptor::new::<T>(name))
    }

    /// Queue `name` for loading as asset type `T` with loader parameters.
    pub fn load_with<T: Asset, P: Send + Sync + 'static>(
        &self,
        name: &str,
        params: P,
    ) -> AssetResult<()> {
        self.load_descriptor(AssetDescriptor::new::<T>(name).with_params(params))
    }

    /// Queue a load request.
    ///
    /// Fails fast when no loader is registered for the descriptor's type and
    /// name, when the name is already bound to a different type, or when the
    /// resolver cannot find the file. Loading the same (name, type) pair
    /// again is fine and bumps the reference count once processed.
    pub fn load_descriptor(&self, descriptor: AssetDescriptor) -> AssetResult<()> {
        let mut state = self.lock();
        state.validate_request(&descriptor)?;

        // Only hit the resolver for names not already known to the manager.
        if !state.store.contains(descriptor.name()) && !state.is_pending(descriptor.name()) {
            let file = self.resolver.resolve(descriptor.name());
            if !file.exists() {
                return Err(AssetError::FileNotFound {
                    path: file.display_name(),
                });
            }
        }

        tracing::debug!(
            name = descriptor.name(),
            type_name = descriptor.type_name(),
            "Queued asset load"
        );
        state.to_load += 1;
        state.queue.push_back(descriptor);
        Ok(())
    }

    /// Advance loading by one step.
    ///
    /// Non-blocking. Pops queued requests while no task chain is active
    /// (requests for already-loaded names complete immediately), then
    /// advances the top task of the active chain. Returns `Ok(true)` once
    /// the queue and the task stack are both empty.
    ///
    /// A failed load tears down its whole task chain; the error goes to the
    /// registered listener, or is returned here when there is none.
    pub fn update(&self) -> AssetResult<bool> {
        let mut guard = self.lock();
        let state = &mut *guard;

        while state.tasks.is_empty() {
            let Some(descriptor) = state.queue.pop_front() else {
                break;
            };
            if state.store.contains(descriptor.name()) {
                tracing::debug!(
                    name = descriptor.name(),
                    "Asset already loaded, bumping reference count"
                );
                state.store.add_ref(descriptor.name());
                descriptor.fire_callback();
                state.loaded += 1;
            } else {
                self.push_task(state, descriptor)?;
            }
        }

        if !state.tasks.is_empty() {
            self.advance_top_task(state)?;
        }
        Ok(state.queue.is_empty() && state.tasks.is_empty())
    }

    /// Call [`update`](Self::update) until loading finishes or the
    /// wall-clock budget runs out. Waits on the worker between passes
    /// instead of spinning.
    pub fn update_for(&self, millis: u64) -> AssetResult<bool> {
        let deadline = Instant::now() + Duration::from_millis(millis);
        loop {
            let seen = self.notifier.generation();
            if self.update()? {
                return Ok(true);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            self.notifier.wait_past(seen, (deadline - now).min(WAIT_SLICE));
        }
    }

    /// Block until every queued asset has loaded (or failed into the
    /// listener).
    pub fn finish_loading(&self) -> AssetResult<()> {
        loop {
            let seen = self.notifier.generation();
            if self.update()? {
                return Ok(());
            }
            self.notifier.wait_past(seen, WAIT_SLICE);
        }
    }

    /// Block until `name` is loaded and return it.
    ///
    /// Fails with `NotLoaded` if loading drains without producing the asset
    /// (it was never requested, was unloaded, or failed into the listener).
    pub fn finish_loading_asset<T: Asset>(&self, name: &str) -> AssetResult<Arc<T>> {
        let name = normalize_name(name);
        loop {
            let seen = self.notifier.generation();
            let idle = self.update()?;
            {
                let state = self.lock();
                if state.store.contains(&name) {
                    return state.store.get::<T>(&name);
                }
                if idle {
                    return Err(AssetError::NotLoaded { name });
                }
            }
            self.notifier.wait_past(seen, WAIT_SLICE);
        }
    }

    /// Release one reference against `name`.
    ///
    /// An active load is cancelled (nothing is ever committed for it and the
    /// whole in-flight chain is abandoned); a queued request is removed, its
    /// callback fired for symmetry. For a loaded asset the reference count
    /// drops by one, and at zero the asset is disposed and its dependencies
    /// released in cascade. Unknown names fail with `NotLoaded`.
    pub fn unload(&self, name: &str) -> AssetResult<()> {
        let name = normalize_name(name);
        let mut guard = self.lock();
        let state = &mut *guard;

        // Only the top-of-stack task can be cancelled; dropping it abandons
        // the chain below, which can no longer complete.
        if state
            .tasks
            .last()
            .is_some_and(|t| t.descriptor.name() == name)
        {
            tracing::debug!(name = %name, "Cancelling active load");
            let chain = std::mem::take(&mut state.tasks);
            for task in &chain {
                state.rollback_task(task);
            }
            drop(chain);
            state.to_load = state.to_load.saturating_sub(1);
            state.peak_tasks = 0;
            self.notifier.notify();
            return Ok(());
        }

        if let Some(pos) = state.queue.iter().position(|d| d.name() == name) {
            let descriptor = state.queue.remove(pos).expect("position just found");
            state.to_load = state.to_load.saturating_sub(1);
            tracing::debug!(name = %name, "Removed queued load");
            descriptor.fire_callback();
            self.notifier.notify();
            return Ok(());
        }

        if state.store.contains(&name) {
            state.release_cascade(&name);
            self.notifier.notify();
            return Ok(());
        }

        Err(AssetError::NotLoaded { name })
    }

    /// Whether an asset is fully loaded under this name.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.lock().store.contains(&normalize_name(name))
    }

    /// Whether an asset is fully loaded under this name as type `T`.
    pub fn is_loaded_as<T: Asset>(&self, name: &str) -> bool {
        self.lock()
            .store
            .type_of(&normalize_name(name))
            .is_some_and(|(id, _)| id == TypeId::of::<T>())
    }

    /// Whether the name is loaded, queued, or in flight.
    pub fn contains(&self, name: &str) -> bool {
        let name = normalize_name(name);
        let state = self.lock();
        state.store.contains(&name) || state.is_pending(&name)
    }

    /// Get a loaded asset.
    pub fn get<T: Asset>(&self, name: &str) -> AssetResult<Arc<T>> {
        self.lock().store.get::<T>(&normalize_name(name))
    }

    /// Get a loaded asset, or `None` if absent or of another type.
    pub fn try_get<T: Asset>(&self, name: &str) -> Option<Arc<T>> {
        self.get::<T>(name).ok()
    }

    /// All loaded assets of type `T`.
    pub fn get_all<T: Asset>(&self) -> Vec<Arc<T>> {
        let state = self.lock();
        let names: Vec<String> = state
            .store
            .names()
            .filter(|n| {
                state
                    .store
                    .type_of(n)
                    .is_some_and(|(id, _)| id == TypeId::of::<T>())
            })
            .map(|n| n.to_string())
            .collect();
        names
            .iter()
            .filter_map(|n| state.store.get::<T>(n).ok())
            .collect()
    }

    /// Names of all loaded assets.
    pub fn asset_names(&self) -> Vec<String> {
        self.lock().store.names().map(|n| n.to_string()).collect()
    }

    /// The direct dependencies recorded for a loaded asset.
    pub fn dependencies_of(&self, name: &str) -> Vec<String> {
        self.lock()
            .graph
            .dependencies_of(&normalize_name(name))
            .to_vec()
    }

    /// The reference count of a loaded asset.
    pub fn reference_count(&self, name: &str) -> AssetResult<usize> {
        let name = normalize_name(name);
        self.lock()
            .store
            .ref_count(&name)
            .ok_or(AssetError::NotLoaded { name })
    }

    /// Overwrite the reference count of a loaded asset.
    ///
    /// Escape hatch for callers that hand out references outside the
    /// manager's own accounting.
    pub fn set_reference_count(&self, name: &str, count: usize) -> AssetResult<()> {
        let name = normalize_name(name);
        self.lock().store.set_ref_count(&name, count)
    }

    /// Number of loaded assets.
    pub fn loaded_count(&self) -> usize {
        self.lock().store.len()
    }

    /// Number of queued plus in-flight load requests.
    pub fn queued_count(&self) -> usize {
        let state = self.lock();
        state.queue.len() + state.tasks.len()
    }

    /// Whether no loads are queued or in flight.
    pub fn is_finished(&self) -> bool {
        let state = self.lock();
        state.queue.is_empty() && state.tasks.is_empty()
    }

    /// Loading progress in `[0, 1]`.
    ///
    /// Completed requests over accepted requests, with partial credit for
    /// the drained fraction of the active task chain. Exactly 1.0 when
    /// nothing is pending.
    pub fn progress(&self) -> f32 {
        let state = self.lock();
        if state.to_load == 0 {
            return 1.0;
        }
        let mut completed = state.loaded as f32;
        if state.peak_tasks > 0 {
            completed +=
                (state.peak_tasks - state.tasks.len().min(state.peak_tasks)) as f32
                    / state.peak_tasks as f32;
        }
        (completed / state.to_load as f32).min(1.0)
    }

    /// Unload everything: drain the queue, finish in-flight work, then
    /// release all assets leaf-last and reset the progress counters.
    pub fn clear(&self) -> AssetResult<()> {
        {
            let mut state = self.lock();
            while let Some(descriptor) = state.queue.pop_front() {
                state.to_load = state.to_load.saturating_sub(1);
                descriptor.fire_callback();
            }
        }
        self.finish_loading()?;

        let mut guard = self.lock();
        let state = &mut *guard;
        loop {
            let roots: Vec<String> = state
                .store
                .names()
                .filter(|n| state.graph.inbound_count(n) == 0)
                .map(|n| n.to_string())
                .collect();
            if roots.is_empty() {
                break;
            }
            for root in roots {
                if state.store.contains(&root) {
                    state.release_cascade(&root);
                }
            }
        }

        if state.store.len() > 0 {
            // Only reachable with cyclic dependency records.
            tracing::warn!(
                remaining = state.store.len(),
                "Cyclic asset dependencies while clearing, forcing disposal"
            );
            let names: Vec<String> = state.store.names().map(|n| n.to_string()).collect();
            for name in names {
                while state.store.contains(&name) {
                    state.release_cascade(&name);
                }
            }
        }

        state.graph = DependencyGraph::new();
        state.loaded = 0;
        state.to_load = 0;
        state.peak_tasks = 0;
        Ok(())
    }

    /// Unload everything and stop the background worker.
    pub fn dispose(&mut self) -> AssetResult<()> {
        self.clear()?;
        self.executor.shutdown();
        Ok(())
    }

    /// One line per loaded asset: type, reference count and dependencies.
    pub fn diagnostics(&self) -> String {
        let state = self.lock();
        let mut names: Vec<&str> = state.store.names().collect();
        names.sort_unstable();

        let mut out = String::new();
        for name in names {
            let type_name = state
                .store
                .type_of(name)
                .map(|(_, n)| n)
                .unwrap_or("<unknown>");
            let refs = state.store.ref_count(name).unwrap_or(0);
            let deps = state.graph.dependencies_of(name);
            let _ = writeln!(
                out,
                "{}, {}, refs: {}, deps: [{}]",
                name,
                type_name,
                refs,
                deps.join(", ")
            );
        }
        out
    }

    fn push_task(&self, state: &mut ManagerState, descriptor: AssetDescriptor) -> AssetResult<()> {
        // Validated when queued, but loaders may have been swapped since.
        let Some(loader) = state.loaders.get(descriptor.type_id(), descriptor.name()) else {
            let error = AssetError::NoLoader {
                name: descriptor.name().to_string(),
                type_name: descriptor.type_name(),
            };
            return state.report_failure(&descriptor, error);
        };
        let file = self.resolver.resolve(descriptor.name());
        tracing::debug!(name = descriptor.name(), "Starting load task");
        state.tasks.push(AssetLoadingTask::new(descriptor, loader, file));
        state.peak_tasks += 1;
        Ok(())
    }

    /// Advance the top-of-stack task by one step: declare dependencies,
    /// start the loader, or poll for its result.
    fn advance_top_task(&self, state: &mut ManagerState) -> AssetResult<()> {
        let top = state.tasks.len() - 1;

        if !state.tasks[top].deps_declared {
            state.tasks[top].deps_declared = true;
            let parent = state.tasks[top].descriptor.name().to_string();
            let declared = {
                let task = &state.tasks[top];
                task.loader
                    .dependencies(task.descriptor.name(), &task.file, task.descriptor.params())
            };

            let mut failure = None;
            match declared {
                Ok(deps) => {
                    for dep in deps {
                        if let Err(error) = self.inject_dependency(state, top, &parent, dep) {
                            failure = Some(error);
                            break;
                        }
                    }
                }
                Err(error) => failure = Some(error),
            }
            if let Some(error) = failure {
                let failing = state.tasks.remove(top);
                return self.handle_task_error(state, failing, error);
            }
            // Dependency tasks were pushed above this one; they get the
            // following passes.
            return Ok(());
        }

        if !state.tasks[top].started() {
            state.tasks[top].start(&self.executor, &self.notifier);
        }

        if let Some(result) = state.tasks[top].try_complete() {
            let task = state.tasks.pop().expect("top task present");
            match result {
                Ok(asset) => {
                    state.store.insert(
                        task.descriptor.name(),
                        task.descriptor.type_id(),
                        task.descriptor.type_name(),
                        asset,
                    );
                    tracing::debug!(name = task.descriptor.name(), "Asset loaded");
                    task.descriptor.fire_callback();
                    if state.tasks.is_empty() {
                        state.loaded += 1;
                        state.peak_tasks = 0;
                    }
                    self.notifier.notify();
                }
                Err(error) => return self.handle_task_error(state, task, error),
            }
        }
        Ok(())
    }

    /// Record and satisfy one dependency of the task at `parent_index`.
    ///
    /// Already-loaded dependencies get their reference count bumped, along
    /// with every dependency transitively below them; anything else becomes
    /// a task pushed above the dependent.
    fn inject_dependency(
        &self,
        state: &mut ManagerState,
        parent_index: usize,
        parent: &str,
        dep: AssetDescriptor,
    ) -> AssetResult<()> {
        if state.tasks.iter().any(|t| t.descriptor.name() == dep.name()) {
            return Err(AssetError::LoadFailed {
                name: parent.to_string(),
                message: format!("circular dependency on '{}'", dep.name()),
            });
        }
        if let Some((bound_id, bound_name)) = state.bound_type(dep.name()) {
            if bound_id != dep.type_id() {
                return Err(AssetError::TypeConflict {
                    name: dep.name().to_string(),
                    loaded: bound_name,
                    requested: dep.type_name(),
                });
            }
        }

        state.graph.record(parent, dep.name());
        state.tasks[parent_index]
            .resolved_deps
            .push(dep.name().to_string());

        if state.store.contains(dep.name()) {
            tracing::debug!(dependent = parent, dependency = dep.name(), "Dependency already loaded");
            state.store.add_ref(dep.name());
            state.increment_ref_counted_dependencies(dep.name());
            return Ok(());
        }

        let loader = state
            .loaders
            .get(dep.type_id(), dep.name())
            .ok_or_else(|| AssetError::NoLoader {
                name: dep.name().to_string(),
                type_name: dep.type_name(),
            })?;
        let file = self.resolver.resolve(dep.name());
        if !file.exists() {
            return Err(AssetError::FileNotFound {
                path: file.display_name(),
            });
        }

        tracing::debug!(dependent = parent, dependency = dep.name(), "Injected dependency task");
        state.tasks.push(AssetLoadingTask::new(dep, loader, file));
        state.peak_tasks += 1;
        Ok(())
    }

    /// Tear down a failed load: the failing task's references are rolled
    /// back and the rest of the chain is abandoned, since its dependents can
    /// no longer complete.
    fn handle_task_error(
        &self,
        state: &mut ManagerState,
        failing: AssetLoadingTask,
        error: AssetError,
    ) -> AssetResult<()> {
        state.rollback_task(&failing);
        let abandoned = std::mem::take(&mut state.tasks);
        for task in &abandoned {
            state.rollback_task(task);
        }
        drop(abandoned);
        state.peak_tasks = 0;
        self.notifier.notify();
        state.report_failure(&failing.descriptor, error)
    }
}

impl Drop for AssetManager {
    fn drop(&mut self) {
        if let Err(error) = self.clear() {
            tracing::error!(%error, "Error clearing assets on drop");
        }
    }
}
