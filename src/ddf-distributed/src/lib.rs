mod executor;
mod local;
mod serial;

pub use executor::{PartitionExecutor, PartitionTask, TaskOutput, map_partitions};
pub use local::LocalExecutor;
pub use serial::SerialExecutor;

pub type ExecutorRef = std::sync::Arc<dyn PartitionExecutor>;
