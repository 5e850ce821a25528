mod column_ref;
pub mod datatypes;
mod field;
pub mod prelude;
mod schema;
mod series;

pub use column_ref::ColumnRef;
pub use datatypes::{DataType, Value};
pub use field::Field;
pub use schema::{Schema, SchemaRef};
pub use series::Series;
