use std::{
    fmt::{Display, Formatter},
    sync::Arc,
};

use common_ddf_config::DdfExecutionConfig;
use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;
use ddf_distributed::{ExecutorRef, LocalExecutor, map_partitions};
use ddf_micropartition::{MicroPartition, PartitionRef};
use ddf_table::Table;
use rand::{RngCore, SeedableRng, rngs::StdRng};

/// Seed offset of the coordinator's random stream, kept apart from the per-partition streams
/// `seed + i`.
const COORDINATOR_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// A logical table whose rows are split across partitions.
///
/// A frame is an immutable handle: cloning it is cheap, and operations that filter rows or
/// columns return a new frame over a new partition set.
#[derive(Clone, Debug)]
pub struct DistributedDataFrame {
    schema: SchemaRef,
    partitions: Arc<Vec<PartitionRef>>,
    executor: ExecutorRef,
    config: Arc<DdfExecutionConfig>,
    num_rows: usize,
}

fn default_executor(config: &DdfExecutionConfig) -> ExecutorRef {
    if let Some(num_threads) = config.compute_threads {
        if let Err(e) = common_runtime::set_compute_runtime_num_worker_threads(num_threads) {
            log::debug!("Keeping existing compute runtime size: {e}");
        }
    }
    Arc::new(LocalExecutor::new())
}

impl DistributedDataFrame {
    /// Builds a frame over `partitions`, checking that every partition has `schema`.
    pub fn new(
        schema: SchemaRef,
        partitions: Vec<PartitionRef>,
        executor: ExecutorRef,
        config: Arc<DdfExecutionConfig>,
    ) -> DdfResult<Self> {
        if let Some((idx, bad)) = partitions
            .iter()
            .enumerate()
            .find(|(_, p)| p.schema() != &schema)
        {
            return Err(DdfError::SchemaMismatch(format!(
                "Partition {idx} has columns {:?} but the frame expects {:?}",
                bad.column_names(),
                schema.names()
            )));
        }
        let num_rows = partitions.iter().map(|p| p.row_count()).sum();
        Ok(Self {
            schema,
            partitions: Arc::new(partitions),
            executor,
            config,
            num_rows,
        })
    }

    /// One partition per table, run on the shared compute runtime with the config from the
    /// environment.
    pub fn from_tables(schema: SchemaRef, tables: Vec<Table>) -> DdfResult<Self> {
        let config = DdfExecutionConfig::from_env();
        let executor = default_executor(&config);
        let partitions = tables
            .into_iter()
            .map(|t| MicroPartition::new_loaded(schema.clone(), Arc::new(vec![t])).map(Arc::new))
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new(schema, partitions, executor, Arc::new(config))
    }

    /// Splits `table` into partitions of the given row counts, which must add up to its length.
    pub fn from_table_with_layout(table: &Table, partition_sizes: &[usize]) -> DdfResult<Self> {
        let total: usize = partition_sizes.iter().sum();
        if total != table.len() {
            return Err(DdfError::ValueError(format!(
                "Partition sizes {partition_sizes:?} add up to {total} rows, but the table has {}",
                table.len()
            )));
        }
        let mut start = 0;
        let tables = partition_sizes
            .iter()
            .map(|size| {
                let part = table.slice(start, start + size);
                start += size;
                part
            })
            .collect::<DdfResult<Vec<_>>>()?;
        Self::from_tables(table.schema.clone(), tables)
    }

    /// Splits `table` into `num_partitions` partitions of near-equal size.
    pub fn from_table(table: &Table, num_partitions: usize) -> DdfResult<Self> {
        let num_partitions = num_partitions.max(1);
        let base = table.len() / num_partitions;
        let extra = table.len() % num_partitions;
        let sizes = (0..num_partitions)
            .map(|i| base + usize::from(i < extra))
            .collect::<Vec<_>>();
        Self::from_table_with_layout(table, &sizes)
    }

    #[must_use]
    pub fn with_executor(mut self, executor: ExecutorRef) -> Self {
        self.executor = executor;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: DdfExecutionConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// A frame over new partitions that shares this frame's executor and config.
    pub(crate) fn derive(&self, schema: SchemaRef, partitions: Vec<PartitionRef>) -> DdfResult<Self> {
        Self::new(
            schema,
            partitions,
            self.executor.clone(),
            self.config.clone(),
        )
    }

    pub fn nrow(&self) -> usize {
        self.num_rows
    }

    pub fn ncol(&self) -> usize {
        self.schema.len()
    }

    pub fn colnames(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn len(&self) -> usize {
        self.nrow()
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    pub fn partitions(&self) -> &[PartitionRef] {
        &self.partitions
    }

    /// Row count of each partition, in partition order.
    pub fn partition_sizes(&self) -> Vec<usize> {
        self.partitions.iter().map(|p| p.row_count()).collect()
    }

    pub fn config(&self) -> &DdfExecutionConfig {
        &self.config
    }

    pub fn executor(&self) -> &ExecutorRef {
        &self.executor
    }

    /// Runs `f` on every partition through the frame's executor.
    pub fn map_partitions<T, F>(&self, f: F) -> DdfResult<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(usize, &MicroPartition) -> DdfResult<T> + Send + Sync + 'static,
    {
        map_partitions(self.executor.as_ref(), &self.partitions, f)
    }

    /// Resolves a column reference to its position in the schema.
    pub fn resolve_column(&self, column: &ColumnRef) -> DdfResult<usize> {
        self.schema.resolve(column)
    }

    /// The seed a randomized operation runs with: `seed`, else the configured default, else a
    /// fresh one.
    pub(crate) fn resolve_seed(&self, seed: Option<u64>) -> u64 {
        seed.or(self.config.default_seed)
            .unwrap_or_else(|| rand::thread_rng().next_u64())
    }

    /// Materializes every row, in partition order.
    #[tracing::instrument(skip(self), fields(nrow = self.nrow()))]
    pub fn collect(&self) -> DdfResult<Table> {
        let tables = self.map_partitions(|_, partition| partition.concat_or_get())?;
        concat_or_empty(&self.schema, &tables)
    }

    /// Keeps the given columns, in the given order.
    pub fn select(&self, columns: &[ColumnRef]) -> DdfResult<Self> {
        let indices = columns
            .iter()
            .map(|c| self.resolve_column(c))
            .collect::<DdfResult<Vec<_>>>()?;
        let schema = Arc::new(self.schema.project(&indices)?);
        let partitions = self
            .map_partitions(move |_, partition| partition.select_columns(&indices).map(Arc::new))?;
        self.derive(schema, partitions)
    }
}

/// Concatenates per-partition results, or builds an empty table when there are none.
pub(crate) fn concat_or_empty(schema: &SchemaRef, tables: &[Table]) -> DdfResult<Table> {
    if tables.is_empty() {
        return Ok(Table::empty(Some(schema.clone())));
    }
    Table::concat(tables)
}

/// Random stream of partition `partition` for an operation seeded with `seed`.
pub(crate) fn partition_rng(seed: u64, partition: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add(partition as u64))
}

/// Random stream of the coordinator for an operation seeded with `seed`.
pub(crate) fn coordinator_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed ^ COORDINATOR_STREAM)
}

impl Display for DistributedDataFrame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "DistributedDataFrame with {} rows, {} columns in {} partitions",
            self.nrow(),
            self.ncol(),
            self.num_partitions()
        )?;
        let preview = self
            .head(self.config.num_preview_rows)
            .map_err(|_| std::fmt::Error)?;
        write!(f, "{preview}")?;
        if self.nrow() > preview.len() {
            writeln!(f, "(Showing first {} of {} rows)", preview.len(), self.nrow())?;
        }
        Ok(())
    }
}
