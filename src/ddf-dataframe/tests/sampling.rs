mod common;

use std::collections::HashSet;

use common::{airlines, ids, sampled_ids};
use common_error::{DdfError, DdfResult};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use rstest::rstest;

#[rstest]
#[case(&[20, 11])]
#[case(&[31])]
#[case(&[0, 30, 0, 1])]
fn sample_without_replacement_gives_distinct_rows(#[case] layout: &[usize]) -> DdfResult<()> {
    let ddf = ids(layout)?;
    for n in [0, 1, 7, 31] {
        let sample = ddf.sample_with_seed(n, false, 11)?;
        assert_eq!(sample.len(), n);
        assert_eq!(sample.num_columns(), ddf.ncol());
        let unique = sampled_ids(&sample).into_iter().collect::<HashSet<_>>();
        assert_eq!(unique.len(), n);
        assert!(unique.iter().all(|id| (0..31).contains(id)));
    }
    Ok(())
}

#[test]
fn sampled_rows_stay_whole() -> DdfResult<()> {
    let ddf = ids(&[5, 9, 3])?;
    let sample = ddf.sample_with_seed(10, false, 3)?;
    for row in sample.rows() {
        let id = row[0].as_f64().unwrap();
        assert_eq!(row[1].as_f64(), Some(id));
    }
    Ok(())
}

#[test]
fn sample_with_replacement_gives_n_rows() -> DdfResult<()> {
    let ddf = ids(&[3, 0, 2])?;
    let sample = ddf.sample_with_seed(50, true, 5)?;
    assert_eq!(sample.len(), 50);
    let drawn = sampled_ids(&sample);
    assert!(drawn.iter().all(|id| (0..5).contains(id)));
    // 50 draws from 5 rows must repeat
    assert!(drawn.iter().collect::<HashSet<_>>().len() <= 5);
    Ok(())
}

#[test]
fn invalid_sample_sizes() -> DdfResult<()> {
    let ddf = ids(&[2, 2])?;
    assert!(matches!(
        ddf.sample(5, false),
        Err(DdfError::InvalidSampleSize { size: 5, .. })
    ));
    assert_eq!(ddf.sample(4, false)?.len(), 4);
    assert_eq!(ddf.sample(5, true)?.len(), 5);

    let empty = ids(&[0, 0])?;
    assert!(matches!(
        empty.sample(1, true),
        Err(DdfError::InvalidSampleSize { .. })
    ));
    assert_eq!(empty.sample(0, false)?.len(), 0);
    Ok(())
}

#[test]
fn seeded_samples_are_reproducible() -> DdfResult<()> {
    let ddf = ids(&[6, 6, 6])?;
    let a = ddf.sample_with_seed(5, false, 99)?;
    let b = ddf.sample_with_seed(5, false, 99)?;
    assert_eq!(a, b);
    let c = ddf.sample_with_seed(5, true, 99)?;
    let d = ddf.sample_with_seed(5, true, 99)?;
    assert_eq!(c, d);
    Ok(())
}

/// Every row must land in a size-k sample with probability k / n, whatever the partition
/// layout.
#[rstest]
#[case(&[10, 10])]
#[case(&[1, 19])]
#[case(&[0, 3, 17])]
#[case(&[20])]
#[case(&[2, 2, 2, 2, 2, 2, 2, 2, 2, 2])]
fn inclusion_is_uniform_across_layouts(#[case] layout: &[usize]) -> DdfResult<()> {
    let ddf = ids(layout)?;
    let n = ddf.nrow();
    let k = 5;
    let trials = 4_000;
    let mut seeds = StdRng::seed_from_u64(2024);
    let mut hits = vec![0_u32; n];
    for _ in 0..trials {
        let sample = ddf.sample_with_seed(k, false, seeds.next_u64())?;
        for id in sampled_ids(&sample) {
            hits[id as usize] += 1;
        }
    }
    let expected = f64::from(trials) * k as f64 / n as f64;
    for (id, count) in hits.iter().enumerate() {
        let deviation = (f64::from(*count) - expected).abs() / expected;
        assert!(
            deviation < 0.12,
            "row {id} sampled {count} times, expected about {expected} (layout {layout:?})"
        );
    }
    Ok(())
}

#[test]
fn sample2ddf_keeps_columns_and_partitioning() -> DdfResult<()> {
    let ddf = ids(&[250, 250, 0, 500])?;
    let sampled = ddf.sample2ddf_with_seed(0.3, Some(17))?;
    assert_eq!(sampled.colnames(), ddf.colnames());
    assert_eq!(sampled.num_partitions(), ddf.num_partitions());
    assert!(
        (240..=360).contains(&sampled.nrow()),
        "kept {} rows",
        sampled.nrow()
    );
    assert_eq!(sampled.partition_sizes()[2], 0);
    assert_eq!(sampled.collect()?.len(), sampled.nrow());

    assert_eq!(ddf.sample2ddf(0.0)?.nrow(), 0);
    assert_eq!(ddf.sample2ddf(1.0)?.nrow(), 1000);
    Ok(())
}

#[test]
fn sample2ddf_rejects_bad_fractions() {
    let ddf = ids(&[3]).unwrap();
    for fraction in [-0.1, 1.5, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            ddf.sample2ddf(fraction),
            Err(DdfError::InvalidFraction(_))
        ));
    }
}

#[test]
fn head_and_sample_on_local_executor() -> DdfResult<()> {
    let ddf = airlines();
    assert_eq!(ddf.head(3)?.num_columns(), ddf.ncol());
    let sample = ddf.sample_with_seed(10, false, 1)?;
    assert_eq!(sample.len(), 10);
    assert_eq!(sample.column_names(), ddf.colnames());
    Ok(())
}
