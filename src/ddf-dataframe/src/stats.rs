use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;
use ddf_stats::{
    AggregateRequest, ColumnAggregate, FiveNumberSummary, compute_local_aggregates,
    merge_column_aggregates,
};
use ddf_table::Table;
use itertools::Itertools;

use crate::dataframe::{DistributedDataFrame, coordinator_rng, partition_rng};

/// Seed of aggregations without a reservoir, whose result does not depend on it.
const UNSAMPLED_SEED: u64 = 0;

const FIVE_NUMS_LABEL_COLUMN: &str = "stat";

/// `stat`, suffixed with underscores until it names no column of `schema`.
fn label_column_name(schema: &Schema) -> String {
    let mut name = FIVE_NUMS_LABEL_COLUMN.to_string();
    while schema.has_field(&name) {
        name.push('_');
    }
    name
}

impl DistributedDataFrame {
    /// Aggregates the requested columns over every partition: one local pass per partition,
    /// then a merge on the caller's thread.
    pub fn aggregate(&self, request: AggregateRequest, seed: u64) -> DdfResult<Vec<ColumnAggregate>> {
        let init = request
            .column_indices(self.ncol())
            .into_iter()
            .map(|idx| {
                let field = self.schema().field_at(idx)?.clone();
                Ok(ColumnAggregate::new(field, request.reservoir_size))
            })
            .collect::<DdfResult<Vec<_>>>()?;
        let locals = self.map_partitions(move |idx, partition| {
            compute_local_aggregates(partition, &request, &mut partition_rng(seed, idx))
        })?;
        merge_column_aggregates(init, locals, &mut coordinator_rng(seed))
    }

    fn numeric_aggregate(&self, column: &ColumnRef, statistic: &str) -> DdfResult<ColumnAggregate> {
        let idx = self.resolve_column(column)?;
        let field = self.schema().field_at(idx)?;
        if !field.dtype.is_numeric() {
            return Err(DdfError::TypeError(format!(
                "Cannot compute {statistic} of non-numeric column {field}"
            )));
        }
        let mut aggs = self.aggregate(
            AggregateRequest::all_columns().with_columns(vec![idx]),
            UNSAMPLED_SEED,
        )?;
        aggs.pop()
            .ok_or_else(|| DdfError::InternalError(format!("No aggregate for column {field}")))
    }

    /// Mean and unbiased sample variance of a numeric column, ignoring missing cells.
    #[tracing::instrument(skip(self))]
    pub fn var<C: Into<ColumnRef> + std::fmt::Debug>(&self, column: C) -> DdfResult<(f64, f64)> {
        let agg = self.numeric_aggregate(&column.into(), "variance")?;
        let variance = agg.variance()?;
        Ok((agg.mean()?, variance))
    }

    pub fn mean<C: Into<ColumnRef>>(&self, column: C) -> DdfResult<f64> {
        Ok(self.numeric_aggregate(&column.into(), "mean")?.mean()?)
    }

    pub fn std<C: Into<ColumnRef>>(&self, column: C) -> DdfResult<f64> {
        Ok(self.numeric_aggregate(&column.into(), "std")?.std()?)
    }

    /// Descriptive statistics with one row per column: `column`, `count`, `null_count`, `mean`,
    /// `std`, `min` and `max`.
    ///
    /// The numeric statistics are null for non-numeric columns and when a column has too few
    /// values.
    #[tracing::instrument(skip(self))]
    pub fn summary(&self) -> DdfResult<Table> {
        let aggs = self.aggregate(AggregateRequest::all_columns(), UNSAMPLED_SEED)?;
        let numeric = |agg: &ColumnAggregate, f: fn(&ColumnAggregate) -> Option<f64>| {
            if agg.dtype().is_numeric() {
                f(agg)
            } else {
                None
            }
        };
        Table::from_nonempty_columns(vec![
            Series::from_strs("column", aggs.iter().map(|a| Some(a.name()))),
            Series::from_i64("count", aggs.iter().map(|a| Some(a.count as i64))),
            Series::from_i64("null_count", aggs.iter().map(|a| Some(a.null_count as i64))),
            Series::from_f64("mean", aggs.iter().map(|a| numeric(a, |a| a.mean().ok()))),
            Series::from_f64("std", aggs.iter().map(|a| numeric(a, |a| a.std().ok()))),
            Series::from_f64("min", aggs.iter().map(|a| numeric(a, ColumnAggregate::min_f64))),
            Series::from_f64("max", aggs.iter().map(|a| numeric(a, ColumnAggregate::max_f64))),
        ])
    }

    /// Minimum, quartiles and maximum of every numeric column.
    ///
    /// Quartiles are estimated from a uniform sample of `five_nums_sample_size` values per
    /// column, so they are exact only for columns with no more non-missing values than that.
    /// The result has a `stat` column naming each of the 5 rows, then one column per numeric
    /// column; a column without values yields nulls. When the frame already has a `stat`
    /// column the label column is renamed `stat_` (or `stat__`, ...).
    #[tracing::instrument(skip(self))]
    pub fn five_nums(&self) -> DdfResult<Table> {
        let numeric = self
            .schema()
            .fields
            .values()
            .positions(|field| field.dtype.is_numeric())
            .collect_vec();
        let request = AggregateRequest::all_columns()
            .with_columns(numeric)
            .with_reservoir(self.config().five_nums_sample_size);
        let aggs = self.aggregate(request, self.resolve_seed(None))?;

        let mut columns = vec![Series::from_strs(
            label_column_name(self.schema()),
            FiveNumberSummary::LABELS.iter().map(Some),
        )];
        for agg in &aggs {
            let values = match agg.five_number_summary() {
                Ok(summary) => summary.to_array().map(Some),
                Err(ddf_stats::Error::InsufficientData { .. }) => [None; 5],
                Err(e) => return Err(e.into()),
            };
            columns.push(Series::from_f64(agg.name(), values));
        }
        Table::from_nonempty_columns(columns)
    }
}
