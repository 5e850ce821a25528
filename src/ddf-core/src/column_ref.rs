use std::fmt;

use serde::{Deserialize, Serialize};

/// A column identified either by its position in the schema or by its name.
///
/// Resolved against a [`crate::Schema`] with [`crate::Schema::resolve`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        Self::Position(value)
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}

impl From<&String> for ColumnRef {
    fn from(value: &String) -> Self {
        Self::Name(value.clone())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(idx) => write!(f, "#{idx}"),
            Self::Name(name) => write!(f, "{name:?}"),
        }
    }
}
