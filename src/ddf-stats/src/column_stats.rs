use std::cmp::Ordering;

use ddf_core::{DataType, Field, Value};
use rand::Rng;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    InsufficientDataSnafu, MismatchedColumnsSnafu, MissingReservoirSnafu, NonNumericColumnSnafu,
    quantiles::{FiveNumberSummary, quantile_sorted},
    reservoir::Reservoir,
};

/// Statistics of one column, either over a single partition (a local aggregate) or merged over
/// every partition of a frame (a global aggregate). Both have the same shape.
///
/// `count` only counts non-missing cells. `sum` and `sum_sq` are kept for numeric columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnAggregate {
    pub field: Field,
    pub count: u64,
    pub null_count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: Option<Value>,
    pub max: Option<Value>,
    pub reservoir: Option<Reservoir<Value>>,
}

fn pick(current: Option<Value>, candidate: Option<Value>, keep: Ordering) -> Option<Value> {
    match (current, candidate) {
        (Some(cur), Some(cand)) => {
            if cand.compare(&cur) == Some(keep) {
                Some(cand)
            } else {
                Some(cur)
            }
        }
        (cur, None) => cur,
        (None, cand) => cand,
    }
}

impl ColumnAggregate {
    pub fn new(field: Field, reservoir_size: Option<usize>) -> Self {
        Self {
            field,
            count: 0,
            null_count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: None,
            max: None,
            reservoir: reservoir_size.map(Reservoir::new),
        }
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn dtype(&self) -> DataType {
        self.field.dtype
    }

    /// Total cells observed, missing or not.
    pub fn total_count(&self) -> u64 {
        self.count + self.null_count
    }

    /// Folds one cell into the aggregate.
    ///
    /// Missing cells only bump `null_count`, and reach the reservoir only when
    /// `include_nulls_in_reservoir` is set.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        value: &Value,
        include_nulls_in_reservoir: bool,
        rng: &mut R,
    ) {
        if value.is_missing() {
            self.null_count += 1;
            if include_nulls_in_reservoir {
                if let Some(reservoir) = self.reservoir.as_mut() {
                    reservoir.offer(Value::Null, rng);
                }
            }
            return;
        }

        self.count += 1;
        if self.dtype().is_numeric() {
            if let Some(x) = value.as_f64() {
                self.sum += x;
                self.sum_sq += x * x;
            }
        }
        self.min = pick(self.min.take(), Some(value.clone()), Ordering::Less);
        self.max = pick(self.max.take(), Some(value.clone()), Ordering::Greater);
        if let Some(reservoir) = self.reservoir.as_mut() {
            reservoir.offer(value.clone(), rng);
        }
    }

    /// Merges the aggregate of another, disjoint set of rows of the same column.
    pub fn merge<R: Rng + ?Sized>(self, other: Self, rng: &mut R) -> crate::Result<Self> {
        ensure!(
            self.field == other.field,
            MismatchedColumnsSnafu {
                expected: self.field.to_string(),
                found: other.field.to_string(),
            }
        );
        let reservoir = match (self.reservoir, other.reservoir) {
            (Some(l), Some(r)) => Some(l.merge(r, rng)),
            (l, r) => l.or(r),
        };
        Ok(Self {
            field: self.field,
            count: self.count + other.count,
            null_count: self.null_count + other.null_count,
            sum: self.sum + other.sum,
            sum_sq: self.sum_sq + other.sum_sq,
            min: pick(self.min, other.min, Ordering::Less),
            max: pick(self.max, other.max, Ordering::Greater),
            reservoir,
        })
    }

    fn ensure_numeric(&self, statistic: &'static str) -> crate::Result<()> {
        ensure!(
            self.dtype().is_numeric(),
            NonNumericColumnSnafu {
                statistic,
                column: self.name().to_string(),
                dtype: self.dtype(),
            }
        );
        Ok(())
    }

    fn ensure_count(&self, statistic: &'static str, min_count: u64) -> crate::Result<()> {
        ensure!(
            self.count >= min_count,
            InsufficientDataSnafu {
                statistic,
                column: self.name().to_string(),
                count: self.count,
            }
        );
        Ok(())
    }

    pub fn mean(&self) -> crate::Result<f64> {
        self.ensure_numeric("mean")?;
        self.ensure_count("mean", 1)?;
        Ok(self.sum / self.count as f64)
    }

    /// Unbiased sample variance: `(sum_sq - sum^2 / n) / (n - 1)`.
    pub fn variance(&self) -> crate::Result<f64> {
        self.ensure_numeric("variance")?;
        self.ensure_count("variance", 2)?;
        let n = self.count as f64;
        // rounding can push a constant column slightly below zero
        Ok(((self.sum_sq - self.sum * self.sum / n) / (n - 1.0)).max(0.0))
    }

    pub fn std(&self) -> crate::Result<f64> {
        self.variance().map(f64::sqrt)
    }

    pub fn min_f64(&self) -> Option<f64> {
        self.min.as_ref().and_then(Value::as_f64)
    }

    pub fn max_f64(&self) -> Option<f64> {
        self.max.as_ref().and_then(Value::as_f64)
    }

    /// Numeric values held by the reservoir, sorted ascending.
    fn sorted_sample(&self) -> crate::Result<Vec<f64>> {
        let reservoir = self.reservoir.as_ref().ok_or_else(|| {
            MissingReservoirSnafu {
                column: self.name().to_string(),
            }
            .build()
        })?;
        let mut values = reservoir
            .items()
            .iter()
            .filter(|v| !v.is_missing())
            .filter_map(Value::as_f64)
            .collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Ok(values)
    }

    /// Estimates the `q`-quantiles (each in `[0, 1]`) from the reservoir sample.
    ///
    /// Exact whenever the reservoir holds every non-missing value of the column.
    pub fn approx_quantiles(&self, qs: &[f64]) -> crate::Result<Vec<f64>> {
        self.ensure_numeric("quantiles")?;
        self.ensure_count("quantiles", 1)?;
        let sample = self.sorted_sample()?;
        ensure!(
            !sample.is_empty(),
            InsufficientDataSnafu {
                statistic: "quantiles",
                column: self.name().to_string(),
                count: 0_u64,
            }
        );
        Ok(qs.iter().map(|q| quantile_sorted(&sample, *q)).collect())
    }

    /// Minimum, quartiles and maximum. The extremes are exact; the quartiles come from the
    /// reservoir sample.
    pub fn five_number_summary(&self) -> crate::Result<FiveNumberSummary> {
        let quartiles = self.approx_quantiles(&[0.25, 0.5, 0.75])?;
        let min = self.min_f64().unwrap_or(quartiles[0]);
        let max = self.max_f64().unwrap_or(quartiles[2]);
        Ok(FiveNumberSummary {
            min,
            q1: quartiles[0].max(min),
            median: quartiles[1],
            q3: quartiles[2].min(max),
            max,
        })
    }
}
