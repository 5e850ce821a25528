mod common;

use common::{AIRLINES_ROWS, airlines, airlines_table, late_aircraft_delay};
use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;

#[test]
fn shape() {
    let ddf = airlines();
    assert_eq!(ddf.nrow(), 31);
    assert_eq!(ddf.ncol(), 29);
    assert_eq!(ddf.len(), ddf.nrow());
    assert_eq!(ddf.num_partitions(), 2);
    assert_eq!(ddf.partition_sizes(), vec![20, 11]);
    assert_eq!(ddf.colnames(), airlines_table().column_names());
}

#[test]
fn drop_na_by_row() -> DdfResult<()> {
    let ddf = airlines();
    let dropped = ddf.drop_na("row")?;
    assert_eq!(dropped.nrow(), 28);
    assert_eq!(dropped.ncol(), 29);
    assert_eq!(dropped.num_partitions(), 2);
    assert_eq!(dropped.partition_sizes(), vec![18, 10]);

    // the receiver is untouched
    assert_eq!(ddf.nrow(), 31);
    Ok(())
}

#[test]
fn drop_na_by_column() -> DdfResult<()> {
    let ddf = airlines();
    let dropped = ddf.drop_na("column")?;
    assert_eq!(dropped.nrow(), 31);
    assert_eq!(dropped.ncol(), 28);
    assert!(!dropped.colnames().contains(&"lateaircraftdelay".to_string()));
    assert_eq!(dropped.collect()?.num_columns(), 28);
    assert_eq!(ddf.ncol(), 29);
    Ok(())
}

#[test]
fn drop_na_rejects_unknown_axis() {
    let ddf = airlines();
    for axis in ["rows", "columns", "Row", "anything_else"] {
        assert!(matches!(ddf.drop_na(axis), Err(DdfError::InvalidAxis(a)) if a == axis));
    }
}

#[test]
fn var_skips_missing_rows() -> DdfResult<()> {
    let ddf = airlines();
    let values = (0..AIRLINES_ROWS)
        .filter_map(late_aircraft_delay)
        .map(|v| v as f64)
        .collect::<Vec<_>>();
    assert_eq!(values.len(), 28);
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    let (m, v) = ddf.var("lateaircraftdelay")?;
    assert!((m - mean).abs() < 1e-9);
    assert!((v - variance).abs() < 1e-9);
    assert!((ddf.std("lateaircraftdelay")? - variance.sqrt()).abs() < 1e-9);
    assert!((ddf.mean("lateaircraftdelay")? - mean).abs() < 1e-9);
    Ok(())
}

#[test]
fn var_by_position_matches_name() -> DdfResult<()> {
    let ddf = airlines();
    for (idx, name) in ddf.colnames().iter().enumerate() {
        let dtype = ddf.schema().field_at(idx)?.dtype;
        if !dtype.is_numeric() {
            assert!(matches!(ddf.var(idx), Err(DdfError::TypeError(_))));
            continue;
        }
        match (ddf.var(idx), ddf.var(name.as_str())) {
            (Ok(by_idx), Ok(by_name)) => assert_eq!(by_idx, by_name),
            (by_idx, by_name) => panic!("{name}: {by_idx:?} vs {by_name:?}"),
        }
    }
    Ok(())
}

#[test]
fn var_column_lookup_errors() {
    let ddf = airlines();
    assert!(matches!(
        ddf.var("no_such_column"),
        Err(DdfError::ColumnNotFound { name, .. }) if name == "no_such_column"
    ));
    assert!(matches!(
        ddf.var(29usize),
        Err(DdfError::IndexOutOfRange {
            index: 29,
            num_columns: 29
        })
    ));
}

#[test]
fn summary_has_a_row_per_column() -> DdfResult<()> {
    let ddf = airlines();
    let summary = ddf.summary()?;
    assert_eq!(summary.len(), ddf.ncol());
    assert_eq!(
        summary.column_names(),
        vec!["column", "count", "null_count", "mean", "std", "min", "max"]
    );

    let late = summary.row(28)?;
    assert_eq!(late[0], Value::from("lateaircraftdelay"));
    assert_eq!(late[1], Value::Int64(28));
    assert_eq!(late[2], Value::Int64(3));

    let carrier = summary.row(8)?;
    assert_eq!(carrier[0], Value::from("uniquecarrier"));
    assert_eq!(carrier[1], Value::Int64(31));
    assert!(carrier[3..].iter().all(Value::is_null));

    let year = summary.row(0)?;
    assert_eq!(year[3], Value::Float64(2008.0));
    assert_eq!(year[4], Value::Float64(0.0));
    assert_eq!(year[5], Value::Float64(2008.0));
    Ok(())
}

#[test]
fn five_nums_has_five_rows() -> DdfResult<()> {
    let ddf = airlines();
    let five = ddf.five_nums()?;
    assert_eq!(five.len(), 5);
    assert_eq!(five.column_names()[0], "stat");
    // 24 numeric columns plus the label column
    assert_eq!(five.num_columns(), 25);

    let late = five.get_column("lateaircraftdelay")?;
    let values = late
        .values()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect::<Vec<_>>();
    let observed = (0..AIRLINES_ROWS)
        .filter_map(late_aircraft_delay)
        .map(|v| v as f64)
        .collect::<Vec<_>>();
    let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
    let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(values[0], min);
    assert_eq!(values[4], max);
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    Ok(())
}

#[test]
fn head_in_partition_order() -> DdfResult<()> {
    let ddf = airlines();
    let head = ddf.head(25)?;
    assert_eq!(head.len(), 25);
    assert_eq!(head.num_columns(), ddf.ncol());
    assert_eq!(head, airlines_table().head(25)?);

    assert_eq!(ddf.head(100)?.len(), 31);
    assert_eq!(ddf.head(0)?.len(), 0);
    Ok(())
}

#[test]
fn display_previews_rows() {
    let ddf = airlines();
    let rendered = ddf.to_string();
    assert!(rendered.contains("31 rows, 29 columns in 2 partitions"));
    assert!(rendered.contains("Showing first 8 of 31 rows"));
}
