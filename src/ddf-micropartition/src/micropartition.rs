use std::{fmt::Display, sync::Arc};

use common_error::{DdfError, DdfResult};
use ddf_core::prelude::*;
use ddf_table::Table;

use crate::table_metadata::TableMetadata;

pub type PartitionRef = Arc<MicroPartition>;

/// One partition of a distributed frame: an immutable list of record tables sharing a schema.
///
/// This is the read-only view a partition task gets of its rows. It is never mutated in place;
/// filtering operations build a new `MicroPartition`.
#[derive(Clone, Debug)]
pub struct MicroPartition {
    pub(crate) schema: SchemaRef,
    pub(crate) tables: Arc<Vec<Table>>,
    pub(crate) metadata: TableMetadata,
}

impl Display for MicroPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "MicroPartition with {} rows in {} tables:",
            self.len(),
            self.tables.len()
        )?;
        for tab in self.tables.iter() {
            writeln!(f, "{tab}")?;
        }
        Ok(())
    }
}

impl MicroPartition {
    /// Create a new `MicroPartition` from tables, checking that every table has `schema`.
    pub fn new_loaded(schema: SchemaRef, tables: Arc<Vec<Table>>) -> DdfResult<Self> {
        if let Some(bad) = tables.iter().find(|t| t.schema != schema) {
            return Err(DdfError::SchemaMismatch(format!(
                "MicroPartition schema {:?} does not match table schema {:?}",
                schema.names(),
                bad.schema.names()
            )));
        }
        let length = tables.iter().map(Table::len).sum();
        Ok(Self {
            schema,
            tables,
            metadata: TableMetadata { length },
        })
    }

    pub fn from_table(table: Table) -> Self {
        let length = table.len();
        Self {
            schema: table.schema.clone(),
            tables: Arc::new(vec![table]),
            metadata: TableMetadata { length },
        }
    }

    pub fn empty(schema: Option<SchemaRef>) -> Self {
        let schema = schema.unwrap_or_else(|| Schema::empty().into());
        Self {
            schema,
            tables: Arc::new(vec![]),
            metadata: TableMetadata { length: 0 },
        }
    }

    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.names()
    }

    pub fn len(&self) -> usize {
        self.metadata.length
    }

    /// Alias of [`MicroPartition::len`] matching the partition accessor vocabulary.
    pub fn row_count(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Cells of column `idx`, across all tables, in row order.
    pub fn column_values(&self, idx: usize) -> DdfResult<impl Iterator<Item = &Value> + '_> {
        if idx >= self.num_columns() {
            return Err(DdfError::IndexOutOfRange {
                index: idx,
                num_columns: self.num_columns(),
            });
        }
        Ok(self
            .tables
            .iter()
            .flat_map(move |t| t.columns()[idx].values().iter()))
    }

    /// Iterates rows in order; each row holds its cells in schema order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
        self.tables.iter().flat_map(Table::rows)
    }

    /// The row at partition-local offset `idx`.
    pub fn row(&self, idx: usize) -> DdfResult<Vec<Value>> {
        let mut offset = idx;
        for tab in self.tables.iter() {
            if offset < tab.len() {
                return tab.row(offset);
            }
            offset -= tab.len();
        }
        Err(DdfError::ValueError(format!(
            "Row offset {idx} out of bounds for MicroPartition of length {}",
            self.len()
        )))
    }

    /// Merges all tables into one, or returns the only table without copying.
    pub fn concat_or_get(&self) -> DdfResult<Table> {
        match self.tables.as_slice() {
            [] => Ok(Table::empty(Some(self.schema.clone()))),
            [single] => Ok(single.clone()),
            tables => Table::concat(tables),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn two_table_partition() -> MicroPartition {
        let t1 = Table::from_nonempty_columns(vec![
            Series::from_i64("a", [Some(1), None]),
            Series::from_strs("b", [Some("x"), Some("y")]),
        ])
        .unwrap();
        let t2 = Table::from_nonempty_columns(vec![
            Series::from_i64("a", [Some(3)]),
            Series::from_strs("b", [None::<&str>]),
        ])
        .unwrap();
        MicroPartition::new_loaded(t1.schema.clone(), Arc::new(vec![t1, t2])).unwrap()
    }

    #[test]
    fn counts_span_tables() {
        let part = two_table_partition();
        assert_eq!(part.row_count(), 3);
        assert_eq!(part.num_columns(), 2);
        let a = part.column_values(0).unwrap().cloned().collect::<Vec<_>>();
        assert_eq!(a, vec![Value::Int64(1), Value::Null, Value::Int64(3)]);
        assert_eq!(part.rows().count(), 3);
        assert_eq!(part.row(2).unwrap(), vec![Value::Int64(3), Value::Null]);
        assert!(part.row(3).is_err());
    }

    #[test]
    fn column_out_of_range() {
        let part = two_table_partition();
        assert!(matches!(
            part.column_values(2).map(|_| ()),
            Err(DdfError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn schema_mismatch_rejected() {
        let t1 = Table::from_nonempty_columns(vec![Series::from_i64("a", [Some(1)])]).unwrap();
        let t2 = Table::from_nonempty_columns(vec![Series::from_i64("b", [Some(1)])]).unwrap();
        let res = MicroPartition::new_loaded(t1.schema.clone(), Arc::new(vec![t1, t2]));
        assert!(matches!(res, Err(DdfError::SchemaMismatch(_))));
    }
}
