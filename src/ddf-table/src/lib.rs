use std::fmt::{Display, Formatter, Result};

use common_display::{StrValue, comfy_table, make_comfy_table};
use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;

/// A materialized, local table: the result type of operations that bring rows back from the
/// partitions (`head`, `sample`, `summary`, ...) and the storage of a single partition.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub schema: SchemaRef,
    columns: Vec<Series>,
    num_rows: usize,
}

#[inline]
fn validate_schema(schema: &Schema, columns: &[Series]) -> DdfResult<()> {
    if schema.fields.len() != columns.len() {
        return Err(DdfError::SchemaMismatch(format!(
            "Schema has {} fields but {} columns were given",
            schema.fields.len(),
            columns.len()
        )));
    }
    for (field, series) in schema.fields.values().zip(columns.iter()) {
        if field != series.field() {
            return Err(DdfError::SchemaMismatch(format!(
                "Column {} does not match schema field {field}",
                series.field()
            )));
        }
    }
    Ok(())
}

impl Table {
    /// Builds a table, checking `columns` against `schema` and every column against `num_rows`.
    ///
    /// `num_rows` is explicit so that a table without columns still has a length.
    pub fn new_with_size<S: Into<SchemaRef>>(
        schema: S,
        columns: Vec<Series>,
        num_rows: usize,
    ) -> DdfResult<Self> {
        let schema: SchemaRef = schema.into();
        validate_schema(schema.as_ref(), columns.as_slice())?;

        for (field, series) in schema.fields.values().zip(columns.iter()) {
            if series.len() != num_rows {
                return Err(DdfError::ValueError(format!(
                    "Column {} has {} rows, expected {num_rows}",
                    field.name,
                    series.len()
                )));
            }
        }

        Ok(Self::new_unchecked(schema, columns, num_rows))
    }

    /// Callers must guarantee that `columns` match `schema` and all have `num_rows` cells.
    pub fn new_unchecked<S: Into<SchemaRef>>(
        schema: S,
        columns: Vec<Series>,
        num_rows: usize,
    ) -> Self {
        Self {
            schema: schema.into(),
            columns,
            num_rows,
        }
    }

    pub fn empty(schema: Option<SchemaRef>) -> Self {
        let schema = schema.unwrap_or_else(|| Schema::empty().into());
        let columns = schema
            .fields
            .values()
            .map(|field| Series::empty(field.name.clone(), field.dtype))
            .collect();
        Self::new_unchecked(schema, columns, 0)
    }

    /// Create a Table from a set of columns, inferring the schema from their fields.
    ///
    /// `columns` must be non-empty and all have the same length.
    pub fn from_nonempty_columns(columns: Vec<Series>) -> DdfResult<Self> {
        let Some(first) = columns.first() else {
            return Err(DdfError::ValueError(
                "Cannot build a Table from an empty list of columns".to_string(),
            ));
        };
        let num_rows = first.len();
        let schema = Schema::new(columns.iter().map(|s| s.field().clone()).collect())?;
        Self::new_with_size(schema, columns, num_rows)
    }

    /// Builds a table from row tuples, type-checking every cell against `schema`.
    pub fn from_rows<S: Into<SchemaRef>>(schema: S, rows: Vec<Vec<Value>>) -> DdfResult<Self> {
        let schema: SchemaRef = schema.into();
        let num_rows = rows.len();
        let mut columns_values: Vec<Vec<Value>> = (0..schema.len())
            .map(|_| Vec::with_capacity(num_rows))
            .collect();
        for (row_idx, row) in rows.into_iter().enumerate() {
            if row.len() != schema.len() {
                return Err(DdfError::SchemaMismatch(format!(
                    "Row {row_idx} has {} cells but the schema has {} columns",
                    row.len(),
                    schema.len()
                )));
            }
            for (col, value) in columns_values.iter_mut().zip(row) {
                col.push(value);
            }
        }
        let columns = schema
            .fields
            .values()
            .zip(columns_values)
            .map(|(field, values)| Series::try_new(field.name.clone(), field.dtype, values))
            .collect::<DdfResult<Vec<_>>>()?;
        Ok(Self::new_unchecked(schema, columns, num_rows))
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn len(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn columns(&self) -> &[Series] {
        &self.columns
    }

    pub fn get_column<S: AsRef<str>>(&self, name: S) -> DdfResult<&Series> {
        let i = self.schema.get_index(name.as_ref())?;
        self.get_column_by_index(i)
    }

    pub fn get_column_by_index(&self, idx: usize) -> DdfResult<&Series> {
        self.columns.get(idx).ok_or(DdfError::IndexOutOfRange {
            index: idx,
            num_columns: self.columns.len(),
        })
    }

    /// Cells of row `idx`, in schema order.
    pub fn row(&self, idx: usize) -> DdfResult<Vec<Value>> {
        if idx >= self.len() {
            return Err(DdfError::ValueError(format!(
                "Row {idx} out of bounds for table of length {}",
                self.len()
            )));
        }
        Ok(self
            .columns
            .iter()
            .map(|s| s.values()[idx].clone())
            .collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        (0..self.len()).map(|idx| {
            self.columns
                .iter()
                .map(|s| s.values()[idx].clone())
                .collect()
        })
    }

    pub fn slice(&self, start: usize, end: usize) -> DdfResult<Self> {
        let new_series = self
            .columns
            .iter()
            .map(|s| s.slice(start, end))
            .collect::<DdfResult<Vec<_>>>()?;
        let new_num_rows = end.min(self.len()).saturating_sub(start);
        Self::new_with_size(self.schema.clone(), new_series, new_num_rows)
    }

    pub fn head(&self, num: usize) -> DdfResult<Self> {
        if num >= self.len() {
            return Ok(self.clone());
        }
        self.slice(0, num)
    }

    pub fn take(&self, indices: &[usize]) -> DdfResult<Self> {
        let new_series = self
            .columns
            .iter()
            .map(|s| s.take(indices))
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_with_size(self.schema.clone(), new_series, indices.len())
    }

    pub fn mask_filter(&self, mask: &[bool]) -> DdfResult<Self> {
        let new_series = self
            .columns
            .iter()
            .map(|s| s.filter(mask))
            .collect::<DdfResult<Vec<_>>>()?;
        let num_rows = mask.iter().filter(|keep| **keep).count();
        Self::new_with_size(self.schema.clone(), new_series, num_rows)
    }

    /// Keeps the columns at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> DdfResult<Self> {
        let schema = self.schema.project(indices)?;
        let columns = indices
            .iter()
            .map(|idx| self.get_column_by_index(*idx).cloned())
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_with_size(schema, columns, self.len())
    }

    /// Applies `f` to every column, keeping the schema.
    pub fn map_columns<F>(&self, f: F) -> DdfResult<Self>
    where
        F: Fn(&Series) -> DdfResult<Series>,
    {
        let columns = self
            .columns
            .iter()
            .map(f)
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_with_size(self.schema.clone(), columns, self.len())
    }

    pub fn concat<T: AsRef<Self>>(tables: &[T]) -> DdfResult<Self> {
        let Some(first_table) = tables.first().map(|t| t.as_ref()) else {
            return Err(DdfError::ValueError(
                "Need at least 1 Table to perform concat".to_string(),
            ));
        };
        if tables.len() == 1 {
            return Ok(first_table.clone());
        }

        let first_schema = first_table.schema.as_ref();
        for tab in tables.iter().skip(1).map(|t| t.as_ref()) {
            if tab.schema.as_ref() != first_schema {
                return Err(DdfError::SchemaMismatch(format!(
                    "Table concat requires all schemas to match, {:?} vs {:?}",
                    first_schema.names(),
                    tab.schema.names()
                )));
            }
        }
        let mut new_series = Vec::with_capacity(first_table.num_columns());
        for i in 0..first_table.num_columns() {
            let series_to_cat = tables
                .iter()
                .map(|t| t.as_ref().get_column_by_index(i))
                .collect::<DdfResult<Vec<_>>>()?;
            new_series.push(Series::concat(series_to_cat.as_slice())?);
        }

        Self::new_with_size(
            first_table.schema.clone(),
            new_series,
            tables.iter().map(|t| t.as_ref().len()).sum(),
        )
    }

    pub fn to_comfy_table(&self, max_col_width: Option<usize>) -> comfy_table::Table {
        let names = self.column_names();
        let columns = self
            .columns
            .iter()
            .map(|s| s as &dyn StrValue)
            .collect::<Vec<_>>();
        make_comfy_table(
            names.as_slice(),
            Some(columns.as_slice()),
            Some(self.len()),
            max_col_width,
        )
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut Formatter) -> Result {
        let table = self.to_comfy_table(Some(32));
        writeln!(f, "{table}")
    }
}

impl AsRef<Self> for Table {
    fn as_ref(&self) -> &Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use common_error::DdfResult;
    use rstest::rstest;

    use super::*;

    fn table() -> Table {
        Table::from_nonempty_columns(vec![
            Series::from_i64("a", [Some(1), Some(2), None, Some(4)]),
            Series::from_strs("b", [Some("w"), Some("x"), Some("y"), None]),
        ])
        .unwrap()
    }

    #[rstest]
    #[case(0, 0)]
    #[case(2, 2)]
    #[case(4, 4)]
    #[case(10, 4)]
    fn head_truncates(#[case] n: usize, #[case] expected: usize) -> DdfResult<()> {
        let head = table().head(n)?;
        assert_eq!(head.len(), expected);
        assert_eq!(head.num_columns(), 2);
        Ok(())
    }

    #[test]
    fn from_rows_matches_columns() -> DdfResult<()> {
        let t = table();
        let rows = t.rows().collect::<Vec<_>>();
        let rebuilt = Table::from_rows(t.schema.clone(), rows)?;
        assert_eq!(rebuilt, t);
        Ok(())
    }

    #[test]
    fn from_rows_rejects_wrong_arity() {
        let t = table();
        let res = Table::from_rows(t.schema.clone(), vec![vec![Value::Int64(1)]]);
        assert!(matches!(res, Err(DdfError::SchemaMismatch(_))));
    }

    #[test]
    fn mask_filter_and_take() -> DdfResult<()> {
        let t = table();
        let filtered = t.mask_filter(&[true, false, true, false])?;
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.row(1)?, vec![Value::Null, Value::Utf8("y".into())]);

        let taken = t.take(&[3, 3])?;
        assert_eq!(taken.len(), 2);
        assert_eq!(taken.row(0)?, taken.row(1)?);
        Ok(())
    }

    #[test]
    fn select_reorders() -> DdfResult<()> {
        let t = table().select(&[1])?;
        assert_eq!(t.column_names(), vec!["b"]);
        assert_eq!(t.len(), 4);
        Ok(())
    }

    #[test]
    fn concat_tables() -> DdfResult<()> {
        let t = table();
        let joined = Table::concat(&[&t, &t])?;
        assert_eq!(joined.len(), 8);
        assert_eq!(joined.row(4)?, t.row(0)?);
        Ok(())
    }

    #[test]
    fn display_renders_column_names() {
        let rendered = table().to_string();
        assert!(rendered.contains('a'));
        assert!(rendered.contains('b'));
        assert!(rendered.contains("None"));
    }
}
