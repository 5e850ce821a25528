use std::{fmt, sync::Arc};

use common_display::make_schema_vertical_table;
use common_error::{DdfError, DdfResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{column_ref::ColumnRef, field::Field};

pub type SchemaRef = Arc<Schema>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    #[serde(with = "indexmap::map::serde_seq")]
    pub fields: IndexMap<String, Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> DdfResult<Self> {
        let mut map = IndexMap::with_capacity(fields.len());

        for f in fields {
            match map.entry(f.name.clone()) {
                indexmap::map::Entry::Vacant(entry) => {
                    entry.insert(f);
                }
                indexmap::map::Entry::Occupied(entry) => {
                    return Err(DdfError::DuplicateColumn(entry.key().clone()));
                }
            }
        }

        Ok(Self { fields: map })
    }

    pub fn empty() -> Self {
        Self {
            fields: IndexMap::new(),
        }
    }

    fn not_found(&self, name: &str) -> DdfError {
        DdfError::ColumnNotFound {
            name: name.to_string(),
            available: self.names(),
        }
    }

    pub fn get_field(&self, name: &str) -> DdfResult<&Field> {
        self.fields.get(name).ok_or_else(|| self.not_found(name))
    }

    pub fn get_index(&self, name: &str) -> DdfResult<usize> {
        self.fields
            .get_index_of(name)
            .ok_or_else(|| self.not_found(name))
    }

    pub fn field_at(&self, index: usize) -> DdfResult<&Field> {
        self.fields
            .get_index(index)
            .map(|(_, field)| field)
            .ok_or(DdfError::IndexOutOfRange {
                index,
                num_columns: self.len(),
            })
    }

    /// Resolves a column reference to its position.
    pub fn resolve(&self, column: &ColumnRef) -> DdfResult<usize> {
        match column {
            ColumnRef::Position(index) => {
                if *index < self.len() {
                    Ok(*index)
                } else {
                    Err(DdfError::IndexOutOfRange {
                        index: *index,
                        num_columns: self.len(),
                    })
                }
            }
            ColumnRef::Name(name) => self.get_index(name),
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a schema holding only the fields at `indices`, in that order.
    pub fn project(&self, indices: &[usize]) -> DdfResult<Self> {
        let fields = indices
            .iter()
            .map(|idx| self.field_at(*idx).cloned())
            .collect::<DdfResult<Vec<_>>>()?;
        Self::new(fields)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = make_schema_vertical_table(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.dtype.to_string())),
        );
        writeln!(f, "{table}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::DataType;

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("a", DataType::Int64),
            Field::new("b", DataType::Utf8),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_names_rejected() {
        let res = Schema::new(vec![
            Field::new("a", DataType::Int64),
            Field::new("a", DataType::Utf8),
        ]);
        assert!(matches!(res, Err(DdfError::DuplicateColumn(name)) if name == "a"));
    }

    #[test]
    fn resolve_by_name_and_position() -> DdfResult<()> {
        let schema = schema();
        assert_eq!(schema.resolve(&"b".into())?, 1);
        assert_eq!(schema.resolve(&1usize.into())?, 1);
        assert!(matches!(
            schema.resolve(&"c".into()),
            Err(DdfError::ColumnNotFound { .. })
        ));
        assert!(matches!(
            schema.resolve(&2usize.into()),
            Err(DdfError::IndexOutOfRange {
                index: 2,
                num_columns: 2
            })
        ));
        Ok(())
    }

    #[test]
    fn project_keeps_order() -> DdfResult<()> {
        let projected = schema().project(&[1, 0])?;
        assert_eq!(projected.names(), vec!["b", "a"]);
        Ok(())
    }

    #[test]
    fn serde_keeps_field_order() {
        let schema = schema();
        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(back.names(), schema.names());
    }
}
