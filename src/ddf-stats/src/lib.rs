use common_error::DdfError;
use ddf_core::DataType;
use snafu::Snafu;

pub mod aggregator;
mod column_stats;
pub mod kernel;
mod quantiles;
mod reservoir;

pub use aggregator::{merge_column_aggregates, merge_null_counts, merge_null_flags, merge_reservoirs};
pub use column_stats::ColumnAggregate;
pub use kernel::{
    AggregateRequest, column_null_counts, column_null_flags, compute_local_aggregates,
    sample_row_offsets,
};
pub use quantiles::{FiveNumberSummary, quantile_sorted};
pub use reservoir::Reservoir;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("DdfCoreComputeError: {}", source))]
    DdfCoreCompute { source: DdfError },

    #[snafu(display(
        "Insufficient data to compute {} of column {}: {} non-null values",
        statistic,
        column,
        count
    ))]
    InsufficientData {
        statistic: &'static str,
        column: String,
        count: u64,
    },

    #[snafu(display("Cannot compute {} of non-numeric column {} of type {}", statistic, column, dtype))]
    NonNumericColumn {
        statistic: &'static str,
        column: String,
        dtype: DataType,
    },

    #[snafu(display("Cannot merge statistics of column {} into column {}", found, expected))]
    MismatchedColumns { expected: String, found: String },

    #[snafu(display(
        "Expected statistics for {} columns from every partition, but partition {} returned {}",
        expected,
        partition,
        found
    ))]
    MismatchedColumnCount {
        expected: usize,
        partition: usize,
        found: usize,
    },

    #[snafu(display("No reservoir sample was collected for column {}", column))]
    MissingReservoir { column: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for DdfError {
    fn from(value: Error) -> Self {
        match value {
            Error::DdfCoreCompute { source } => source,
            Error::InsufficientData {
                statistic,
                column,
                count,
            } => Self::InsufficientData {
                statistic,
                column,
                count,
            },
            Error::NonNumericColumn { .. } => Self::TypeError(value.to_string()),
            _ => Self::External(value.into()),
        }
    }
}
