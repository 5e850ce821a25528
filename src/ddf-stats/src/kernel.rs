//! Per-partition statistics. Everything here runs inside a partition task and only sees the
//! rows of one [`MicroPartition`].

use common_error::DdfResult;
use ddf_micropartition::MicroPartition;
use rand::Rng;
use snafu::ResultExt;

use crate::{DdfCoreComputeSnafu, column_stats::ColumnAggregate, reservoir::Reservoir};

/// What [`compute_local_aggregates`] should collect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateRequest {
    /// Column positions to aggregate, all columns when `None`.
    pub columns: Option<Vec<usize>>,
    /// Size of the per-column value reservoir, no reservoir when `None`.
    pub reservoir_size: Option<usize>,
    pub include_nulls_in_reservoir: bool,
}

impl AggregateRequest {
    pub fn all_columns() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_columns(mut self, columns: Vec<usize>) -> Self {
        self.columns = Some(columns);
        self
    }

    #[must_use]
    pub fn with_reservoir(mut self, size: usize) -> Self {
        self.reservoir_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_nulls_in_reservoir(mut self, include: bool) -> Self {
        self.include_nulls_in_reservoir = include;
        self
    }

    /// The column positions this request covers, in output order.
    pub fn column_indices(&self, num_columns: usize) -> Vec<usize> {
        self.columns
            .clone()
            .unwrap_or_else(|| (0..num_columns).collect())
    }
}

fn aggregate_column<R: Rng + ?Sized>(
    partition: &MicroPartition,
    idx: usize,
    request: &AggregateRequest,
    rng: &mut R,
) -> crate::Result<ColumnAggregate> {
    let field = partition
        .schema()
        .field_at(idx)
        .context(DdfCoreComputeSnafu)?
        .clone();
    let mut agg = ColumnAggregate::new(field, request.reservoir_size);
    for value in partition.column_values(idx).context(DdfCoreComputeSnafu)? {
        agg.update(value, request.include_nulls_in_reservoir, rng);
    }
    Ok(agg)
}

/// Computes one [`ColumnAggregate`] per requested column of `partition`, in request order.
pub fn compute_local_aggregates<R: Rng + ?Sized>(
    partition: &MicroPartition,
    request: &AggregateRequest,
    rng: &mut R,
) -> DdfResult<Vec<ColumnAggregate>> {
    let aggs = request
        .column_indices(partition.num_columns())
        .into_iter()
        .map(|idx| aggregate_column(partition, idx, request, rng))
        .collect::<crate::Result<Vec<_>>>()?;
    log::trace!(
        "Aggregated {} columns over {} rows",
        aggs.len(),
        partition.len()
    );
    Ok(aggs)
}

/// Whether each column of `partition` holds at least one missing cell.
pub fn column_null_flags(partition: &MicroPartition) -> DdfResult<Vec<bool>> {
    (0..partition.num_columns())
        .map(|idx| Ok(partition.column_values(idx)?.any(ddf_core::Value::is_missing)))
        .collect()
}

/// Number of missing cells in each column of `partition`.
pub fn column_null_counts(partition: &MicroPartition) -> DdfResult<Vec<u64>> {
    (0..partition.num_columns())
        .map(|idx| {
            Ok(partition
                .column_values(idx)?
                .filter(|v| v.is_missing())
                .count() as u64)
        })
        .collect()
}

/// A uniform sample of at most `k` row offsets out of `0..row_count`.
pub fn sample_row_offsets<R: Rng + ?Sized>(
    row_count: usize,
    k: usize,
    rng: &mut R,
) -> Reservoir<usize> {
    let mut reservoir = Reservoir::new(k);
    for offset in 0..row_count {
        reservoir.offer(offset, rng);
    }
    reservoir
}
