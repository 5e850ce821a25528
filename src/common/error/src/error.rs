use thiserror::Error;

pub type DdfResult<T> = std::result::Result<T, DdfError>;
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum DdfError {
    #[error("Invalid sample size {size}: {reason}")]
    InvalidSampleSize { size: usize, reason: String },
    #[error("Invalid sampling fraction {0}: expected a value in [0, 1]")]
    InvalidFraction(f64),
    #[error("Invalid axis {0:?}: expected \"row\" or \"column\"")]
    InvalidAxis(String),
    #[error("Column {name:?} not found. Available columns: {available:?}")]
    ColumnNotFound {
        name: String,
        available: Vec<String>,
    },
    #[error("Column index {index} out of range for {num_columns} columns")]
    IndexOutOfRange { index: usize, num_columns: usize },
    #[error("Insufficient data for {statistic} on column {column:?}: {count} non-null values")]
    InsufficientData {
        statistic: &'static str,
        column: String,
        count: u64,
    },
    #[error("Partition {partition} failed: {message}")]
    PartitionFailure { partition: usize, message: String },
    #[error("{0}")]
    SchemaMismatch(String),
    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),
    #[error("{0}")]
    TypeError(String),
    #[error("{0}")]
    ValueError(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    ComputeError(String),
    #[error("{0}")]
    InternalError(String),
    #[error("{0:?}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0:?}")]
    External(GenericError),
}

impl DdfError {
    /// Wraps any error raised while running a task on `partition`.
    ///
    /// Errors that already carry a partition index are passed through untouched.
    pub fn partition_failure(partition: usize, err: Self) -> Self {
        if err.is_partition_failure() {
            return err;
        }
        Self::PartitionFailure {
            partition,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn is_partition_failure(&self) -> bool {
        matches!(self, Self::PartitionFailure { .. })
    }
}
