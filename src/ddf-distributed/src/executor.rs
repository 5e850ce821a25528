use std::{any::Any, fmt::Debug, sync::Arc};

use common_error::{DdfError, DdfResult};
use ddf_micropartition::{MicroPartition, PartitionRef};

/// Type-erased result of one partition task.
pub type TaskOutput = Box<dyn Any + Send>;

/// A task run once per partition. It receives the partition's index in the frame and a
/// read-only view of its rows.
pub type PartitionTask =
    Arc<dyn Fn(usize, &MicroPartition) -> DdfResult<TaskOutput> + Send + Sync>;

/// Runs a task over every partition of a frame and hands back the outputs in partition order.
///
/// Calling `execute` is a barrier: it returns only once every partition has finished. If any
/// partition fails, the whole call fails with [`DdfError::PartitionFailure`] naming the lowest
/// failing partition, and no partial outputs are returned.
pub trait PartitionExecutor: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn execute(
        &self,
        partitions: &[PartitionRef],
        task: PartitionTask,
    ) -> DdfResult<Vec<TaskOutput>>;
}

/// Typed front end to [`PartitionExecutor::execute`].
pub fn map_partitions<T, F>(
    executor: &dyn PartitionExecutor,
    partitions: &[PartitionRef],
    f: F,
) -> DdfResult<Vec<T>>
where
    T: Send + 'static,
    F: Fn(usize, &MicroPartition) -> DdfResult<T> + Send + Sync + 'static,
{
    let task: PartitionTask =
        Arc::new(move |idx, partition| f(idx, partition).map(|out| Box::new(out) as TaskOutput));
    let outputs = executor.execute(partitions, task)?;
    if outputs.len() != partitions.len() {
        return Err(DdfError::InternalError(format!(
            "Executor {} returned {} outputs for {} partitions",
            executor.name(),
            outputs.len(),
            partitions.len()
        )));
    }
    outputs
        .into_iter()
        .enumerate()
        .map(|(idx, out)| {
            out.downcast::<T>().map(|out| *out).map_err(|_| {
                DdfError::InternalError(format!(
                    "Output of partition {idx} is not a {}",
                    std::any::type_name::<T>()
                ))
            })
        })
        .collect()
}
