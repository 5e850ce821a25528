#![allow(dead_code)]

use std::sync::Arc;

use common_error::DdfResult;
use ddf_core::prelude::*;
use ddf_dataframe::DistributedDataFrame;
use ddf_distributed::{ExecutorRef, LocalExecutor, SerialExecutor};
use ddf_table::Table;

pub const AIRLINES_ROWS: usize = 31;
pub const AIRLINES_LAYOUT: [usize; 2] = [20, 11];
pub const LATE_AIRCRAFT_MISSING: [usize; 3] = [3, 17, 25];

pub fn late_aircraft_delay(row: usize) -> Option<i64> {
    (!LATE_AIRCRAFT_MISSING.contains(&row)).then(|| ((row * 5) % 23) as i64)
}

fn ints(name: &str, f: impl Fn(usize) -> i64) -> Series {
    Series::from_i64(name, (0..AIRLINES_ROWS).map(|r| Some(f(r))))
}

fn strs(name: &str, f: impl Fn(usize) -> String) -> Series {
    Series::from_strs(name, (0..AIRLINES_ROWS).map(|r| Some(f(r))))
}

/// 31 flights with 29 columns; only `lateaircraftdelay` has missing values.
pub fn airlines_table() -> Table {
    let r64 = |r: usize| r as i64;
    Table::from_nonempty_columns(vec![
        ints("year", |_| 2008),
        ints("month", |_| 1),
        ints("dayofmonth", |r| 1 + r64(r) % 28),
        ints("dayofweek", |r| 1 + r64(r) % 7),
        ints("deptime", |r| 600 + 17 * r64(r)),
        ints("crsdeptime", |r| 600 + 15 * r64(r)),
        ints("arrtime", |r| 800 + 19 * r64(r)),
        ints("crsarrtime", |r| 800 + 18 * r64(r)),
        strs("uniquecarrier", |_| "WN".to_string()),
        ints("flightnum", |r| 100 + 7 * r64(r)),
        strs("tailnum", |r| format!("N{r:03}SW")),
        ints("actualelapsedtime", |r| 60 + r64(r) % 9),
        ints("crselapsedtime", |_| 65),
        ints("airtime", |r| 50 + r64(r) % 11),
        ints("arrdelay", |r| (13 * r64(r)) % 40 - 10),
        ints("depdelay", |r| (7 * r64(r)) % 30 - 5),
        strs("origin", |_| "IAD".to_string()),
        strs("dest", |r| ["TPA", "JAX", "LAS"][r % 3].to_string()),
        ints("distance", |r| 810 + 100 * (r64(r) % 3)),
        ints("taxiin", |r| 4 + r64(r) % 5),
        ints("taxiout", |r| 8 + r64(r) % 6),
        ints("cancelled", |_| 0),
        strs("cancellationcode", |_| String::new()),
        ints("diverted", |_| 0),
        ints("carrierdelay", |r| (3 * r64(r)) % 11),
        ints("weatherdelay", |_| 0),
        ints("nasdelay", |r| r64(r) % 4),
        ints("securitydelay", |_| 0),
        Series::from_i64(
            "lateaircraftdelay",
            (0..AIRLINES_ROWS).map(late_aircraft_delay),
        ),
    ])
    .unwrap()
}

pub fn local_executor() -> ExecutorRef {
    Arc::new(LocalExecutor::with_num_threads(4).unwrap())
}

pub fn serial_executor() -> ExecutorRef {
    Arc::new(SerialExecutor)
}

pub fn airlines() -> DistributedDataFrame {
    DistributedDataFrame::from_table_with_layout(&airlines_table(), &AIRLINES_LAYOUT)
        .unwrap()
        .with_executor(local_executor())
}

/// A frame of `id` (0..n) and `x` (id as float) split into partitions of `layout` rows.
pub fn ids(layout: &[usize]) -> DdfResult<DistributedDataFrame> {
    let n = layout.iter().sum::<usize>() as i64;
    let table = Table::from_nonempty_columns(vec![
        Series::from_i64("id", (0..n).map(Some)),
        Series::from_f64("x", (0..n).map(|i| Some(i as f64))),
    ])?;
    Ok(DistributedDataFrame::from_table_with_layout(&table, layout)?
        .with_executor(serial_executor()))
}

/// The `id` column of a sampled table.
pub fn sampled_ids(table: &Table) -> Vec<i64> {
    table
        .get_column("id")
        .unwrap()
        .values()
        .iter()
        .map(|v| match v {
            Value::Int64(id) => *id,
            other => panic!("unexpected id {other}"),
        })
        .collect()
}
