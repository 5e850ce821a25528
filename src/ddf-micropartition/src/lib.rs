mod micropartition;
mod ops;
mod table_metadata;

pub use micropartition::{MicroPartition, PartitionRef};
pub use table_metadata::TableMetadata;
