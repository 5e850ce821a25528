use std::sync::Arc;

use common_error::DdfResult;
use ddf_core::Series;

use crate::micropartition::MicroPartition;

impl MicroPartition {
    /// Keeps the columns at `indices`, in that order.
    pub fn select_columns(&self, indices: &[usize]) -> DdfResult<Self> {
        let schema = Arc::new(self.schema.project(indices)?);
        let tables = self
            .tables
            .iter()
            .map(|tab| tab.select(indices))
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_loaded(schema, Arc::new(tables))
    }

    /// Applies `f` to every column of every table. `f` must preserve the column field.
    pub fn map_columns<F>(&self, f: F) -> DdfResult<Self>
    where
        F: Fn(&Series) -> DdfResult<Series>,
    {
        let tables = self
            .tables
            .iter()
            .map(|tab| tab.map_columns(&f))
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_loaded(self.schema.clone(), Arc::new(tables))
    }
}
