//! Commonly used types, re-exported for `use ddf_core::prelude::*`.

pub use crate::{
    column_ref::ColumnRef,
    datatypes::{DataType, Value},
    field::Field,
    schema::{Schema, SchemaRef},
    series::Series,
};
