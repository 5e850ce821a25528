mod common;

use common::serial_executor;
use common_ddf_config::DdfExecutionConfig;
use common_error::DdfResult;
use ddf_core::prelude::*;
use ddf_dataframe::DistributedDataFrame;
use ddf_table::Table;
use rstest::rstest;

fn column_f64(table: &Table, name: &str) -> Vec<f64> {
    table
        .get_column(name)
        .unwrap()
        .values()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn user_column_named_stat() -> DdfResult<()> {
    let table = Table::from_nonempty_columns(vec![Series::from_f64(
        "stat",
        (0..10).map(|i| Some(f64::from(i))),
    )])?;
    let ddf = DistributedDataFrame::from_table_with_layout(&table, &[5, 5])?
        .with_executor(serial_executor());

    let five = ddf.five_nums()?;
    assert_eq!(five.len(), 5);
    assert_eq!(five.column_names(), vec!["stat_", "stat"]);
    assert_eq!(
        five.get_column("stat_")?.get(2),
        Some(&Value::from("median"))
    );
    assert_eq!(column_f64(&five, "stat"), vec![0.0, 2.25, 4.5, 6.75, 9.0]);
    Ok(())
}

/// 10 000 rows, nearly all in the second partition, estimated from a 500-value sample.
#[rstest]
#[case(7)]
#[case(1234)]
#[case(987_654_321)]
fn sampled_quartiles_over_skewed_layout(#[case] seed: u64) -> DdfResult<()> {
    let n = 10_000_i64;
    let table = Table::from_nonempty_columns(vec![Series::from_f64(
        "x",
        (0..n).map(|i| Some(i as f64)),
    )])?;
    let config = DdfExecutionConfig::default()
        .with_five_nums_sample_size(500)
        .with_default_seed(Some(seed));
    let ddf = DistributedDataFrame::from_table_with_layout(&table, &[100, 9900])?
        .with_executor(serial_executor())
        .with_config(config);

    let five = column_f64(&ddf.five_nums()?, "x");
    assert_eq!(five[0], 0.0);
    assert_eq!(five[4], 9999.0);
    assert!(five.windows(2).all(|w| w[0] <= w[1]), "{five:?}");
    // the sample quartiles stay well within 5 standard errors of the exact ones
    for (estimate, exact) in five[1..4].iter().zip([2499.75, 4999.5, 7499.25]) {
        assert!(
            (estimate - exact).abs() < 1000.0,
            "estimate {estimate} too far from {exact} in {five:?}"
        );
    }
    Ok(())
}
