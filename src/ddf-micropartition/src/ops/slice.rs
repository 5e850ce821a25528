use std::sync::Arc;

use common_error::{DdfError, DdfResult};

use crate::micropartition::MicroPartition;

impl MicroPartition {
    /// Rows `start..end` in partition order; `end` is clamped to the length.
    ///
    /// Tables fully inside the range are shared, not copied.
    pub fn slice(&self, start: usize, end: usize) -> DdfResult<Self> {
        if start > end {
            return Err(DdfError::ValueError(format!(
                "Invalid MicroPartition slice {start}..{end}: start is past end"
            )));
        }
        let end = end.min(self.len());
        if start >= end {
            return Ok(Self::empty(Some(self.schema.clone())));
        }

        let mut tables = vec![];
        let mut table_start = 0;
        for tab in self.tables.iter() {
            let table_end = table_start + tab.len();
            let (lo, hi) = (start.max(table_start), end.min(table_end));
            if lo < hi {
                if lo == table_start && hi == table_end {
                    tables.push(tab.clone());
                } else {
                    tables.push(tab.slice(lo - table_start, hi - table_start)?);
                }
            }
            if table_end >= end {
                break;
            }
            table_start = table_end;
        }
        Self::new_loaded(self.schema.clone(), Arc::new(tables))
    }

    pub fn head(&self, num: usize) -> DdfResult<Self> {
        self.slice(0, num)
    }
}
