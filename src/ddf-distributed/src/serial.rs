use std::panic::{AssertUnwindSafe, catch_unwind};

use common_error::{DdfError, DdfResult};
use common_runtime::panic_message;
use ddf_micropartition::PartitionRef;

use crate::executor::{PartitionExecutor, PartitionTask, TaskOutput};

/// Runs partition tasks one after another on the calling thread.
///
/// Stops at the first failing partition.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialExecutor;

impl PartitionExecutor for SerialExecutor {
    fn name(&self) -> &str {
        "SerialExecutor"
    }

    fn execute(
        &self,
        partitions: &[PartitionRef],
        task: PartitionTask,
    ) -> DdfResult<Vec<TaskOutput>> {
        let _span = tracing::info_span!("SerialExecutor::execute", num_partitions = partitions.len())
            .entered();
        partitions
            .iter()
            .enumerate()
            .map(|(idx, partition)| {
                catch_unwind(AssertUnwindSafe(|| task(idx, partition)))
                    .unwrap_or_else(|payload| {
                        Err(DdfError::ComputeError(format!(
                            "Task panicked: {}",
                            panic_message(payload.as_ref())
                        )))
                    })
                    .map_err(|e| DdfError::partition_failure(idx, e))
            })
            .collect()
    }
}
