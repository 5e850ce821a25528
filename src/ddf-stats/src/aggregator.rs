//! Combines the per-partition results of [`crate::kernel`] into frame-wide results.
//!
//! All merges here are associative and commutative up to the randomness of reservoir merges,
//! so partitions can be folded in whatever order their results arrive.

use common_error::DdfResult;
use rand::Rng;
use snafu::ensure;

use crate::{MismatchedColumnCountSnafu, column_stats::ColumnAggregate, reservoir::Reservoir};

fn check_column_count(expected: usize, partition: usize, found: usize) -> crate::Result<()> {
    ensure!(
        expected == found,
        MismatchedColumnCountSnafu {
            expected,
            partition,
            found,
        }
    );
    Ok(())
}

/// Folds per-partition aggregates into `init`, one aggregate per column.
///
/// `init` holds empty aggregates for the requested columns, so a frame without partitions still
/// yields one aggregate per column.
pub fn merge_column_aggregates<R: Rng + ?Sized>(
    init: Vec<ColumnAggregate>,
    per_partition: Vec<Vec<ColumnAggregate>>,
    rng: &mut R,
) -> DdfResult<Vec<ColumnAggregate>> {
    let expected = init.len();
    let mut merged = init;
    for (partition, aggs) in per_partition.into_iter().enumerate() {
        check_column_count(expected, partition, aggs.len())?;
        merged = merged
            .into_iter()
            .zip(aggs)
            .map(|(acc, local)| acc.merge(local, rng))
            .collect::<crate::Result<Vec<_>>>()?;
    }
    Ok(merged)
}

/// ORs per-partition null flags column by column.
pub fn merge_null_flags(num_columns: usize, per_partition: &[Vec<bool>]) -> DdfResult<Vec<bool>> {
    let mut merged = vec![false; num_columns];
    for (partition, flags) in per_partition.iter().enumerate() {
        check_column_count(num_columns, partition, flags.len())?;
        for (acc, flag) in merged.iter_mut().zip(flags) {
            *acc |= *flag;
        }
    }
    Ok(merged)
}

/// Sums per-partition null counts column by column.
pub fn merge_null_counts(num_columns: usize, per_partition: &[Vec<u64>]) -> DdfResult<Vec<u64>> {
    let mut merged = vec![0; num_columns];
    for (partition, counts) in per_partition.iter().enumerate() {
        check_column_count(num_columns, partition, counts.len())?;
        for (acc, count) in merged.iter_mut().zip(counts) {
            *acc += *count;
        }
    }
    Ok(merged)
}

/// Merges per-partition reservoirs pairwise, weighting each by the rows it has seen.
pub fn merge_reservoirs<T, R: Rng + ?Sized>(
    capacity: usize,
    reservoirs: impl IntoIterator<Item = Reservoir<T>>,
    rng: &mut R,
) -> Reservoir<T> {
    reservoirs
        .into_iter()
        .fold(Reservoir::new(capacity), |acc, r| acc.merge(r, rng))
}

#[cfg(test)]
mod tests {
    use ddf_core::{DataType, Field, Value};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::kernel::sample_row_offsets;

    fn local(values: &[i64]) -> ColumnAggregate {
        let mut rng = StdRng::seed_from_u64(0);
        let mut agg = ColumnAggregate::new(Field::new("a", DataType::Int64), Some(4));
        for v in values {
            agg.update(&Value::Int64(*v), false, &mut rng);
        }
        agg
    }

    #[test]
    fn merges_partitions_in_order() -> DdfResult<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let init = vec![ColumnAggregate::new(Field::new("a", DataType::Int64), Some(4))];
        let merged = merge_column_aggregates(
            init,
            vec![vec![local(&[1, 2])], vec![local(&[3])]],
            &mut rng,
        )?;
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].count, 3);
        assert_eq!(merged[0].sum, 6.0);
        assert_eq!(merged[0].min, Some(Value::Int64(1)));
        assert_eq!(merged[0].max, Some(Value::Int64(3)));
        assert_eq!(merged[0].reservoir.as_ref().map(Reservoir::len), Some(3));
        Ok(())
    }

    #[test]
    fn no_partitions_yields_init() -> DdfResult<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let init = vec![ColumnAggregate::new(Field::new("a", DataType::Int64), None)];
        let merged = merge_column_aggregates(init.clone(), vec![], &mut rng)?;
        assert_eq!(merged, init);
        Ok(())
    }

    #[test]
    fn column_count_mismatch() {
        let mut rng = StdRng::seed_from_u64(0);
        let init = vec![ColumnAggregate::new(Field::new("a", DataType::Int64), None)];
        assert!(merge_column_aggregates(init, vec![vec![]], &mut rng).is_err());
        assert!(merge_null_flags(2, &[vec![true]]).is_err());
    }

    #[test]
    fn flags_or_and_counts_sum() -> DdfResult<()> {
        let flags = merge_null_flags(3, &[vec![false, true, false], vec![false, false, true]])?;
        assert_eq!(flags, vec![false, true, true]);
        let counts = merge_null_counts(2, &[vec![1, 0], vec![2, 5]])?;
        assert_eq!(counts, vec![3, 5]);
        assert_eq!(merge_null_flags(2, &[])?, vec![false, false]);
        Ok(())
    }

    #[test]
    fn reservoirs_across_partitions() {
        let mut rng = StdRng::seed_from_u64(9);
        let parts = [20, 0, 11]
            .into_iter()
            .map(|n| sample_row_offsets(n, 5, &mut rng))
            .collect::<Vec<_>>();
        let merged = merge_reservoirs(5, parts, &mut rng);
        assert_eq!(merged.seen(), 31);
        assert_eq!(merged.len(), 5);
    }
}
