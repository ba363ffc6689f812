//! Background execution for asynchronous loading tasks.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use async_executor::{Executor, Task};

/// A single background worker running asynchronous load jobs.
///
/// Loading work is IO-bound and the manager advances at most one task at a
/// time, so one worker thread is enough.
pub(crate) struct AsyncExecutor {
    executor: Arc<Executor<'static>>,
    worker: Option<thread::JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl AsyncExecutor {
    pub(crate) fn new() -> Self {
        let executor = Arc::new(Executor::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let exec = executor.clone();
        let shutdown_flag = shutdown.clone();
        let worker = thread::Builder::new()
            .name("vesper-asset-loader".to_string())
            .spawn(move || {
                while !shutdown_flag.load(Ordering::Relaxed) {
                    if !exec.try_tick() {
                        // No jobs ready, sleep briefly
                        thread::sleep(Duration::from_millis(1));
                    }
                }
            })
            .expect("Failed to spawn asset loader thread");

        tracing::debug!("Asset loader worker started");

        Self {
            executor,
            worker: Some(worker),
            shutdown,
        }
    }

    /// Spawn a load job on the worker.
    ///
    /// Dropping the returned `Task` cancels the job.
    pub(crate) fn spawn<T>(&self, future: impl Future<Output = T> + Send + 'static) -> Task<T>
    where
        T: Send + 'static,
    {
        self.executor.spawn(future)
    }

    /// Stop the worker and wait for it to finish its current job.
    pub(crate) fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.join() {
                tracing::error!("Asset loader thread panicked: {:?}", e);
            }
        }
    }
}

impl Drop for AsyncExecutor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Wakes threads blocked in `finish_loading` when loading state may have
/// changed.
///
/// A generation counter under a mutex paired with a condvar. Waiters sleep on
/// the condvar instead of spinning; the worker notifies after each completed
/// job.
#[derive(Default)]
pub(crate) struct LoadNotifier {
    generation: Mutex<u64>,
    condvar: Condvar,
}

impl LoadNotifier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The current generation, for use with `wait_past`.
    pub(crate) fn generation(&self) -> u64 {
        *self.generation.lock().expect("load notifier poisoned")
    }

    /// Signal that loading state changed.
    pub(crate) fn notify(&self) {
        let mut generation = self.generation.lock().expect("load notifier poisoned");
        *generation += 1;
        drop(generation);
        self.condvar.notify_all();
    }

    /// Block until the generation advances past `seen`, or the timeout
    /// elapses. The timeout keeps waiters live even if a notification is
    /// missed.
    pub(crate) fn wait_past(&self, seen: u64, timeout: Duration) {
        let generation = self.generation.lock().expect("load notifier poisoned");
        let _unused = self
            .condvar
            .wait_timeout_while(generation, timeout, |generation| *generation <= seen)
            .expect("load notifier poisoned");
    }
}
