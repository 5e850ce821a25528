//! Distributed data frames: a table split row-wise into partitions, with sampling, missing-value
//! handling and descriptive statistics computed partition-locally and merged on the caller.
//!
//! ```ignore
//! use ddf::{DistributedDataFrame, Table};
//!
//! let ddf = DistributedDataFrame::from_table(&table, 4)?;
//! let clean = ddf.drop_na("row")?;
//! let (mean, variance) = clean.var("distance")?;
//! ```

pub use common_ddf_config::DdfExecutionConfig;
pub use common_error::{DdfError, DdfResult};
pub use common_tracing::{finish_chrome_trace, start_chrome_trace};
pub use ddf_core::prelude::*;
pub use ddf_dataframe::{Axis, DistributedDataFrame, DropNaOptions, How, SampleSpec};
pub use ddf_distributed::{
    ExecutorRef, LocalExecutor, PartitionExecutor, PartitionTask, SerialExecutor, TaskOutput,
};
pub use ddf_micropartition::{MicroPartition, PartitionRef};
pub use ddf_stats::{AggregateRequest, ColumnAggregate, FiveNumberSummary};
pub use ddf_table::Table;

/// Installs the global tracing subscriber, filtered by `DDF_LOG`. A chrome trace layer is added
/// when `DDF_DEV_ENABLE_CHROME_TRACE` is set.
pub fn init_tracing_from_env() -> DdfResult<()> {
    common_tracing::init_tracing(common_tracing::should_enable_chrome_trace())
}

/// Sizes the shared compute runtime used by [`LocalExecutor::new`]. Fails once the runtime has
/// been created.
pub fn set_compute_threads(num_threads: usize) -> DdfResult<()> {
    common_runtime::set_compute_runtime_num_worker_threads(num_threads)
}
