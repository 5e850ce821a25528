use std::sync::Arc;

use common_error::{DdfError, DdfResult};
use ddf_core::Value;
use ddf_table::Table;

use crate::micropartition::MicroPartition;

impl MicroPartition {
    /// Keeps the rows whose entry in `mask` is true. `mask` spans every table of the partition.
    pub fn mask_filter(&self, mask: &[bool]) -> DdfResult<Self> {
        if mask.len() != self.len() {
            return Err(DdfError::ValueError(format!(
                "Mask of length {} does not match MicroPartition of length {}",
                mask.len(),
                self.len()
            )));
        }
        let mut offset = 0;
        let tables = self
            .tables
            .iter()
            .map(|tab| {
                let sub_mask = &mask[offset..offset + tab.len()];
                offset += tab.len();
                tab.mask_filter(sub_mask)
            })
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new_loaded(self.schema.clone(), Arc::new(tables))
    }

    /// Keeps the rows for which `predicate` returns true. Rows are passed in schema order.
    pub fn filter_rows<F>(&self, predicate: F) -> DdfResult<Self>
    where
        F: Fn(&[Value]) -> bool,
    {
        let tables = self
            .tables
            .iter()
            .map(|tab| {
                let mask = tab.rows().map(|row| predicate(&row)).collect::<Vec<_>>();
                tab.mask_filter(&mask)
            })
            .collect::<DdfResult<Vec<Table>>>()?;
        Self::new_loaded(self.schema.clone(), Arc::new(tables))
    }
}

#[cfg(test)]
mod tests {
    use common_error::DdfResult;
    use ddf_core::Value;

    use crate::micropartition::tests::two_table_partition;

    #[test]
    fn mask_spans_tables() -> DdfResult<()> {
        let part = two_table_partition();
        let filtered = part.mask_filter(&[false, true, true])?;
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.tables().len(), 2);
        assert!(part.mask_filter(&[true]).is_err());
        Ok(())
    }

    #[test]
    fn filter_rows_without_missing() -> DdfResult<()> {
        let part = two_table_partition();
        let complete = part.filter_rows(|row| !row.iter().any(Value::is_missing))?;
        assert_eq!(complete.len(), 1);
        assert_eq!(
            complete.rows().next().unwrap(),
            vec![Value::Int64(1), Value::Utf8("x".into())]
        );
        Ok(())
    }
}
