use common_error::{DdfError, DdfResult};
use common_runtime::{RuntimeRef, build_compute_runtime, get_compute_runtime};
use ddf_micropartition::PartitionRef;
use tracing::Instrument;

use crate::executor::{PartitionExecutor, PartitionTask, TaskOutput};

/// Runs one task per partition on a tokio compute runtime.
///
/// By default tasks share the process-wide compute runtime. `execute` blocks the calling thread,
/// so it must not be called from a worker thread of the same runtime.
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    runtime: RuntimeRef,
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalExecutor {
    pub fn new() -> Self {
        Self {
            runtime: get_compute_runtime(),
        }
    }

    pub fn with_runtime(runtime: RuntimeRef) -> Self {
        Self { runtime }
    }

    /// An executor with its own runtime of `num_threads` workers.
    pub fn with_num_threads(num_threads: usize) -> DdfResult<Self> {
        Ok(Self::with_runtime(build_compute_runtime(
            num_threads,
            "DDFLocal",
        )?))
    }

    pub fn num_workers(&self) -> usize {
        self.runtime.num_workers()
    }
}

impl PartitionExecutor for LocalExecutor {
    fn name(&self) -> &str {
        "LocalExecutor"
    }

    fn execute(
        &self,
        partitions: &[PartitionRef],
        task: PartitionTask,
    ) -> DdfResult<Vec<TaskOutput>> {
        let span = tracing::info_span!("LocalExecutor::execute", num_partitions = partitions.len());
        let _guard = span.enter();

        let jobs = partitions
            .iter()
            .cloned()
            .enumerate()
            .map(|(idx, partition)| {
                let task = task.clone();
                let task_span =
                    tracing::debug_span!("partition_task", partition = idx, rows = partition.len());
                async move { task(idx, &partition) }.instrument(task_span)
            })
            .collect::<Vec<_>>();

        let results = self.runtime.run_all(jobs)?;
        log::debug!("Finished {} partition tasks", results.len());

        results
            .into_iter()
            .enumerate()
            .map(|(idx, res)| {
                res.and_then(|out| out)
                    .map_err(|e| DdfError::partition_failure(idx, e))
            })
            .collect()
    }
}
