use std::{fmt, str::FromStr, sync::Arc};

use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;
use ddf_stats::{column_null_counts, column_null_flags, merge_null_counts, merge_null_flags};
use itertools::Itertools;

use crate::dataframe::DistributedDataFrame;

/// Direction in which [`DistributedDataFrame::drop_na`] drops data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Row,
    Column,
}

impl FromStr for Axis {
    type Err = DdfError;

    /// Only the exact strings `"row"` and `"column"` are accepted.
    fn from_str(s: &str) -> DdfResult<Self> {
        match s {
            "row" => Ok(Self::Row),
            "column" => Ok(Self::Column),
            other => Err(DdfError::InvalidAxis(other.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row => write!(f, "row"),
            Self::Column => write!(f, "column"),
        }
    }
}

/// Whether a row or column is dropped when any or all of its inspected cells are missing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum How {
    #[default]
    Any,
    All,
}

impl FromStr for How {
    type Err = DdfError;

    fn from_str(s: &str) -> DdfResult<Self> {
        match s {
            "any" => Ok(Self::Any),
            "all" => Ok(Self::All),
            other => Err(DdfError::InvalidArgument(format!(
                "Invalid how {other:?}: expected \"any\" or \"all\""
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DropNaOptions {
    pub how: How,
    /// Keep a row or column only if it has at least this many non-missing cells. Takes
    /// precedence over `how`.
    pub thresh: Option<usize>,
    /// Columns inspected when dropping rows. All columns when `None`.
    pub subset: Option<Vec<ColumnRef>>,
}

impl DropNaOptions {
    #[must_use]
    pub fn with_how(mut self, how: How) -> Self {
        self.how = how;
        self
    }

    #[must_use]
    pub fn with_thresh(mut self, thresh: usize) -> Self {
        self.thresh = Some(thresh);
        self
    }

    #[must_use]
    pub fn with_subset(mut self, subset: Vec<ColumnRef>) -> Self {
        self.subset = Some(subset);
        self
    }

    /// Whether the default rule (drop on any missing cell) applies.
    fn is_any(&self) -> bool {
        self.how == How::Any && self.thresh.is_none()
    }

    fn keeps(&self, present: usize, inspected: usize) -> bool {
        match (self.thresh, self.how) {
            (Some(thresh), _) => present >= thresh,
            (None, How::Any) => present == inspected,
            (None, How::All) => present > 0 || inspected == 0,
        }
    }
}

impl DistributedDataFrame {
    /// Drops every row (`"row"`) or column (`"column"`) holding a missing cell.
    ///
    /// Any other axis fails with [`DdfError::InvalidAxis`] before touching the partitions.
    pub fn drop_na(&self, axis: &str) -> DdfResult<Self> {
        let axis = axis.parse::<Axis>()?;
        self.drop_na_with(axis, &DropNaOptions::default())
    }

    #[tracing::instrument(skip(self))]
    pub fn drop_na_with(&self, axis: Axis, options: &DropNaOptions) -> DdfResult<Self> {
        match axis {
            Axis::Row => self.drop_na_rows(options),
            Axis::Column => self.drop_na_columns(options),
        }
    }

    fn drop_na_rows(&self, options: &DropNaOptions) -> DdfResult<Self> {
        let inspected = match &options.subset {
            Some(subset) => subset
                .iter()
                .map(|c| self.resolve_column(c))
                .collect::<DdfResult<Vec<_>>>()?,
            None => (0..self.ncol()).collect(),
        };
        let options = options.clone();
        let partitions = self.map_partitions(move |_, partition| {
            partition
                .filter_rows(|row| {
                    let present = inspected.iter().filter(|i| !row[**i].is_missing()).count();
                    options.keeps(present, inspected.len())
                })
                .map(Arc::new)
        })?;
        let result = self.derive(self.schema().clone(), partitions)?;
        log::debug!(
            "drop_na(row) kept {} of {} rows",
            result.nrow(),
            self.nrow()
        );
        Ok(result)
    }

    /// Two rounds separated by a barrier: every partition reports per-column missingness, the
    /// reports are reduced, then every partition drops the same columns.
    fn drop_na_columns(&self, options: &DropNaOptions) -> DdfResult<Self> {
        if options.subset.is_some() {
            return Err(DdfError::InvalidArgument(
                "subset is only supported when dropping rows".to_string(),
            ));
        }
        let ncol = self.ncol();
        let keep = if options.is_any() {
            let flags = self.map_partitions(|_, partition| column_null_flags(partition))?;
            merge_null_flags(ncol, &flags)?
                .into_iter()
                .map(|has_null| !has_null)
                .collect::<Vec<_>>()
        } else {
            let counts = self.map_partitions(|_, partition| column_null_counts(partition))?;
            let nrow = self.nrow();
            merge_null_counts(ncol, &counts)?
                .into_iter()
                .map(|null_count| {
                    let present = nrow - null_count as usize;
                    options.keeps(present, nrow)
                })
                .collect()
        };

        let indices = keep.iter().positions(|keep| *keep).collect_vec();
        if indices.len() == ncol {
            return Ok(self.clone());
        }
        log::debug!(
            "drop_na(column) dropping [{}]",
            self.colnames()
                .into_iter()
                .zip(&keep)
                .filter_map(|(name, keep)| (!keep).then_some(name))
                .join(", ")
        );

        let schema = Arc::new(self.schema().project(&indices)?);
        let partitions = self
            .map_partitions(move |_, partition| partition.select_columns(&indices).map(Arc::new))?;
        self.derive(schema, partitions)
    }

    /// Replaces missing cells with `value` in every column that can hold it.
    ///
    /// Integers also fill float columns, and integral floats fill integer columns. Columns of
    /// other types are left untouched.
    #[tracing::instrument(skip(self))]
    pub fn fill_na(&self, value: Value) -> DdfResult<Self> {
        if value.is_missing() {
            return Err(DdfError::InvalidArgument(format!(
                "Cannot fill missing values with {value}"
            )));
        }
        if self
            .schema()
            .fields
            .values()
            .all(|field| field.dtype.coerce(&value).is_none())
        {
            log::warn!("fill_na({value}) matches no column of {:?}", self.colnames());
        }
        let partitions = self.map_partitions(move |_, partition| {
            partition
                .map_columns(|series| match series.data_type().coerce(&value) {
                    Some(fill) => series.fill_missing(&fill),
                    None => Ok(series.clone()),
                })
                .map(Arc::new)
        })?;
        self.derive(self.schema().clone(), partitions)
    }
}
