use std::sync::Arc;

use common_error::{DdfError, DdfResult};
use ddf_distributed::map_partitions;
use ddf_stats::{merge_reservoirs, sample_row_offsets};
use ddf_table::Table;
use rand::Rng;

use crate::dataframe::{DistributedDataFrame, concat_or_empty, coordinator_rng, partition_rng};

/// Parameters of [`DistributedDataFrame::sample_by_spec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleSpec {
    pub size: usize,
    pub replacement: bool,
    pub seed: Option<u64>,
}

impl SampleSpec {
    pub fn new(size: usize, replacement: bool) -> Self {
        Self {
            size,
            replacement,
            seed: None,
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks the sample size against a frame of `nrow` rows.
    pub fn validate(&self, nrow: usize) -> DdfResult<()> {
        if !self.replacement && self.size > nrow {
            return Err(DdfError::InvalidSampleSize {
                size: self.size,
                reason: format!("cannot draw more than {nrow} rows without replacement"),
            });
        }
        if self.replacement && self.size > 0 && nrow == 0 {
            return Err(DdfError::InvalidSampleSize {
                size: self.size,
                reason: "cannot sample from an empty frame".to_string(),
            });
        }
        Ok(())
    }
}

/// Resolves a global row rank to `(partition, offset)` given the exclusive end row of each
/// partition.
fn locate_row(partition_ends: &[usize], rank: usize) -> (usize, usize) {
    let partition = partition_ends.partition_point(|end| *end <= rank);
    let start = if partition == 0 {
        0
    } else {
        partition_ends[partition - 1]
    };
    (partition, rank - start)
}

impl DistributedDataFrame {
    /// The first `n` rows in partition order, or every row if the frame is shorter.
    ///
    /// Only the leading partitions that hold those rows are read.
    #[tracing::instrument(skip(self))]
    pub fn head(&self, n: usize) -> DdfResult<Table> {
        let mut remaining = n;
        let mut rows_per_partition = vec![];
        for partition in self.partitions() {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(partition.row_count());
            rows_per_partition.push(take);
            remaining -= take;
        }
        let leading = &self.partitions()[..rows_per_partition.len()];
        let tables = map_partitions(self.executor().as_ref(), leading, move |idx, partition| {
            partition.head(rows_per_partition[idx])?.concat_or_get()
        })?;
        concat_or_empty(self.schema(), &tables)
    }

    /// Draws `n` rows uniformly at random, with a fresh seed unless one is configured.
    pub fn sample(&self, n: usize, replacement: bool) -> DdfResult<Table> {
        self.sample_by_spec(&SampleSpec::new(n, replacement))
    }

    /// Like [`DistributedDataFrame::sample`], reproducible for a given seed and partition layout.
    pub fn sample_with_seed(&self, n: usize, replacement: bool, seed: u64) -> DdfResult<Table> {
        self.sample_by_spec(&SampleSpec::new(n, replacement).with_seed(seed))
    }

    #[tracing::instrument(skip(self))]
    pub fn sample_by_spec(&self, spec: &SampleSpec) -> DdfResult<Table> {
        spec.validate(self.nrow())?;
        let seed = self.resolve_seed(spec.seed);
        let addresses = if spec.replacement {
            self.ranks_with_replacement(spec.size, seed)
        } else {
            self.rows_without_replacement(spec.size, seed)?
        };
        log::debug!(
            "Sampled {} of {} rows, gathering from {} partitions",
            addresses.len(),
            self.nrow(),
            self.num_partitions()
        );
        self.gather(&addresses)
    }

    /// Round one of sampling without replacement: each partition reservoir-samples `n` of its
    /// row offsets, then the reservoirs are merged weighted by partition size.
    fn rows_without_replacement(&self, n: usize, seed: u64) -> DdfResult<Vec<(usize, usize)>> {
        let locals = self.map_partitions(move |idx, partition| {
            let mut rng = partition_rng(seed, idx);
            Ok(sample_row_offsets(partition.row_count(), n, &mut rng))
        })?;
        let addressed = locals
            .into_iter()
            .enumerate()
            .map(|(idx, reservoir)| reservoir.map(|offset| (idx, offset)));
        let merged = merge_reservoirs(n, addressed, &mut coordinator_rng(seed));
        Ok(merged.into_items())
    }

    fn ranks_with_replacement(&self, n: usize, seed: u64) -> Vec<(usize, usize)> {
        let partition_ends = self
            .partition_sizes()
            .into_iter()
            .scan(0, |end, size| {
                *end += size;
                Some(*end)
            })
            .collect::<Vec<_>>();
        let mut rng = coordinator_rng(seed);
        (0..n)
            .map(|_| locate_row(&partition_ends, rng.gen_range(0..self.nrow())))
            .collect()
    }

    /// Round two of sampling: fetches the rows at `(partition, offset)` addresses.
    fn gather(&self, addresses: &[(usize, usize)]) -> DdfResult<Table> {
        let mut offsets = vec![vec![]; self.num_partitions()];
        for (partition, offset) in addresses {
            offsets[*partition].push(*offset);
        }
        let offsets = Arc::new(offsets);
        let tables = self.map_partitions(move |idx, partition| partition.take(&offsets[idx]))?;
        concat_or_empty(self.schema(), &tables)
    }

    /// Keeps each row independently with probability `fraction`. Partitions are filtered in
    /// place, so the result has the same partitioning.
    pub fn sample2ddf(&self, fraction: f64) -> DdfResult<Self> {
        self.sample2ddf_with_seed(fraction, None)
    }

    #[tracing::instrument(skip(self))]
    pub fn sample2ddf_with_seed(&self, fraction: f64, seed: Option<u64>) -> DdfResult<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(DdfError::InvalidFraction(fraction));
        }
        let seed = self.resolve_seed(seed);
        let partitions = self.map_partitions(move |idx, partition| {
            let mut rng = partition_rng(seed, idx);
            let mask = (0..partition.row_count())
                .map(|_| rng.gen_bool(fraction))
                .collect::<Vec<_>>();
            partition.mask_filter(&mask).map(Arc::new)
        })?;
        self.derive(self.schema().clone(), partitions)
    }
}
