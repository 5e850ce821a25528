use std::{
    any::Any,
    future::Future,
    panic::AssertUnwindSafe,
    pin::Pin,
    sync::{
        Arc, LazyLock, OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    task::{Context, Poll},
};

use common_error::{DdfError, DdfResult};
use futures::FutureExt;
use tokio::{runtime::Handle, task::JoinSet};

static NUM_CPUS: LazyLock<usize> = LazyLock::new(|| {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
});
static COMPUTE_RUNTIME_NUM_WORKER_THREADS: OnceLock<usize> = OnceLock::new();
static COMPUTE_RUNTIME: OnceLock<RuntimeRef> = OnceLock::new();

const COMPUTE_THREAD_PREFIX: &str = "DDFCPU";

pub type RuntimeRef = Arc<Runtime>;

/// Worker count of the shared compute runtime; the number of CPUs unless set beforehand.
pub fn get_or_init_compute_runtime_num_worker_threads() -> usize {
    *COMPUTE_RUNTIME_NUM_WORKER_THREADS.get_or_init(|| *NUM_CPUS)
}

/// Sets the worker count of the shared compute runtime. Only the first call before the runtime
/// is created takes effect; later calls fail.
pub fn set_compute_runtime_num_worker_threads(num_threads: usize) -> DdfResult<()> {
    if num_threads == 0 {
        return Err(DdfError::ValueError(
            "Compute runtime needs at least one worker thread".to_string(),
        ));
    }
    COMPUTE_RUNTIME_NUM_WORKER_THREADS
        .set(num_threads)
        .map_err(|existing| {
            DdfError::InternalError(format!(
                "Compute runtime already sized to {} worker threads",
                COMPUTE_RUNTIME_NUM_WORKER_THREADS.get().copied().unwrap_or(existing)
            ))
        })
}

/// Handle to a task spawned on a [`Runtime`]. Awaiting it yields the task's output; dropping it
/// aborts the task.
pub struct RuntimeTask<T> {
    joinset: JoinSet<T>,
}

impl<T: Send + 'static> RuntimeTask<T> {
    fn new<F>(handle: &Handle, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let mut joinset = JoinSet::new();
        joinset.spawn_on(future, handle);
        Self { joinset }
    }
}

impl<T: Send + 'static> Future for RuntimeTask<T> {
    type Output = DdfResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Poll::Ready(joined) = self.joinset.poll_join_next(cx) else {
            return Poll::Pending;
        };
        Poll::Ready(match joined {
            Some(Ok(output)) => Ok(output),
            Some(Err(e)) if e.is_panic() => Err(DdfError::ComputeError(format!(
                "Task panicked: {}",
                panic_message(e.into_panic().as_ref())
            ))),
            Some(Err(e)) => Err(DdfError::External(e.into())),
            None => Err(DdfError::InternalError(
                "Runtime task polled after completion".to_string(),
            )),
        })
    }
}

impl<T> std::fmt::Debug for RuntimeTask<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RuntimeTask(running={})", !self.joinset.is_empty())
    }
}

/// Text of a panic payload, for payloads raised with a string message.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown internal error".to_string()
    }
}

/// A named multi-threaded tokio runtime that partition tasks are spawned on.
#[derive(Debug)]
pub struct Runtime {
    runtime: tokio::runtime::Runtime,
    name: String,
}

impl Runtime {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn num_workers(&self) -> usize {
        self.runtime.metrics().num_workers()
    }

    pub fn spawn<F>(&self, future: F) -> RuntimeTask<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        RuntimeTask::new(self.runtime.handle(), future)
    }

    /// Runs `future` on this runtime and blocks the calling thread until it completes.
    ///
    /// Unlike tokio's `block_on` this may be called from inside another tokio runtime, as long
    /// as the caller is not a worker of this one. A panic in `future` becomes a
    /// [`DdfError::ComputeError`].
    pub fn block_within_async_context<F>(&self, future: F) -> DdfResult<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let name = self.name.clone();
        let _task = self.spawn(async move {
            let output = AssertUnwindSafe(future).catch_unwind().await.map_err(|e| {
                DdfError::ComputeError(format!(
                    "Caught panic in the {name} runtime: {}",
                    panic_message(e.as_ref())
                ))
            });
            if tx.send(output).is_err() {
                log::warn!("Runtime task output dropped: the caller stopped waiting");
            }
        });
        rx.recv()
            .map_err(|_| DdfError::InternalError("Runtime task ended without output".to_string()))?
    }

    /// Spawns every future and blocks until all of them finish, returning their outputs in
    /// the order given.
    pub fn run_all<F>(&self, jobs: Vec<F>) -> DdfResult<Vec<DdfResult<F::Output>>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let tasks = jobs.into_iter().map(|f| self.spawn(f)).collect::<Vec<_>>();
        self.block_within_async_context(futures::future::join_all(tasks))
    }
}

/// Builds a multi-threaded runtime whose worker threads are named `{name}-{id}`.
///
/// The runtime is built on a scratch thread so this works from inside another runtime.
pub fn build_compute_runtime(num_worker_threads: usize, name: &str) -> DdfResult<RuntimeRef> {
    static THREAD_ID: AtomicUsize = AtomicUsize::new(0);

    let name = name.to_string();
    std::thread::spawn(move || {
        let prefix = name.clone();
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(num_worker_threads.max(1))
            .max_blocking_threads(1)
            .enable_all()
            .thread_name_fn(move || {
                format!("{prefix}-{}", THREAD_ID.fetch_add(1, Ordering::SeqCst))
            })
            .build()
            .map(|runtime| Arc::new(Runtime { runtime, name }))
            .map_err(|e| DdfError::External(e.into()))
    })
    .join()
    .map_err(|_| DdfError::InternalError("Runtime builder thread panicked".to_string()))?
}

/// The process-wide compute runtime, created on first use.
pub fn get_compute_runtime() -> RuntimeRef {
    COMPUTE_RUNTIME
        .get_or_init(|| {
            let num_threads = get_or_init_compute_runtime_num_worker_threads();
            log::debug!("Starting compute runtime with {num_threads} worker threads");
            build_compute_runtime(num_threads, COMPUTE_THREAD_PREFIX)
                .expect("Failed to build compute runtime")
        })
        .clone()
}
