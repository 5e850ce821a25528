use common_error::{DdfError, DdfResult};
use ddf_table::Table;

use crate::micropartition::MicroPartition;

impl MicroPartition {
    /// Materializes the rows at `offsets` (local to this partition, may repeat) as one table,
    /// in the order given.
    pub fn take(&self, offsets: &[usize]) -> DdfResult<Table> {
        if let Some(bad) = offsets.iter().find(|o| **o >= self.len()) {
            return Err(DdfError::ValueError(format!(
                "Row offset {bad} out of bounds for MicroPartition of length {}",
                self.len()
            )));
        }
        self.concat_or_get()?.take(offsets)
    }
}
