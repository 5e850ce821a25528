use std::sync::Arc;

use common_display::StrValue;
use common_error::{DdfError, DdfResult};
use serde::{Deserialize, Serialize};

use crate::{
    datatypes::{DataType, Value},
    field::Field,
};

/// A named, typed column of cells.
///
/// Cells are shared behind an `Arc`, so cloning a `Series` is cheap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Series {
    field: Field,
    values: Arc<Vec<Value>>,
}

impl Series {
    /// Builds a series, checking that every non-null cell matches `dtype`.
    pub fn try_new<S: Into<String>>(name: S, dtype: DataType, values: Vec<Value>) -> DdfResult<Self> {
        let field = Field::new(name, dtype);
        if let Some(bad) = values.iter().find(|v| !dtype.accepts(v)) {
            return Err(DdfError::TypeError(format!(
                "Cannot store {bad} of type {} in column {field}",
                bad.data_type()
            )));
        }
        Ok(Self::new_unchecked(field, values))
    }

    pub fn new_unchecked(field: Field, values: Vec<Value>) -> Self {
        Self {
            field,
            values: Arc::new(values),
        }
    }

    pub fn empty<S: Into<String>>(name: S, dtype: DataType) -> Self {
        Self::new_unchecked(Field::new(name, dtype), vec![])
    }

    pub fn full_null<S: Into<String>>(name: S, dtype: DataType, length: usize) -> Self {
        Self::new_unchecked(Field::new(name, dtype), vec![Value::Null; length])
    }

    pub fn from_f64<S: Into<String>>(name: S, values: impl IntoIterator<Item = Option<f64>>) -> Self {
        let values = values.into_iter().map(Value::from).collect();
        Self::new_unchecked(Field::new(name, DataType::Float64), values)
    }

    pub fn from_i64<S: Into<String>>(name: S, values: impl IntoIterator<Item = Option<i64>>) -> Self {
        let values = values.into_iter().map(Value::from).collect();
        Self::new_unchecked(Field::new(name, DataType::Int64), values)
    }

    pub fn from_strs<S: Into<String>, T: AsRef<str>>(
        name: S,
        values: impl IntoIterator<Item = Option<T>>,
    ) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.map_or(Value::Null, |s| Value::Utf8(s.as_ref().to_string())))
            .collect();
        Self::new_unchecked(Field::new(name, DataType::Utf8), values)
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn data_type(&self) -> DataType {
        self.field.dtype
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_missing()).count()
    }

    #[must_use]
    pub fn rename<S: Into<String>>(&self, name: S) -> Self {
        Self {
            field: self.field.rename(name),
            values: self.values.clone(),
        }
    }

    pub fn slice(&self, start: usize, end: usize) -> DdfResult<Self> {
        let end = end.min(self.len());
        if start > end {
            return Err(DdfError::ValueError(format!(
                "Trying to slice series {} with negative length, start: {start} vs end: {end}",
                self.name()
            )));
        }
        Ok(Self::new_unchecked(
            self.field.clone(),
            self.values[start..end].to_vec(),
        ))
    }

    /// Gathers the cells at `indices`; indices may repeat.
    pub fn take(&self, indices: &[usize]) -> DdfResult<Self> {
        let values = indices
            .iter()
            .map(|idx| {
                self.values.get(*idx).cloned().ok_or_else(|| {
                    DdfError::ValueError(format!(
                        "Index {idx} out of bounds for series {} of length {}",
                        self.name(),
                        self.len()
                    ))
                })
            })
            .collect::<DdfResult<Vec<_>>>()?;
        Ok(Self::new_unchecked(self.field.clone(), values))
    }

    pub fn filter(&self, mask: &[bool]) -> DdfResult<Self> {
        if mask.len() != self.len() {
            return Err(DdfError::ValueError(format!(
                "Mask of length {} does not match series {} of length {}",
                mask.len(),
                self.name(),
                self.len()
            )));
        }
        let values = self
            .values
            .iter()
            .zip(mask)
            .filter_map(|(v, keep)| keep.then(|| v.clone()))
            .collect();
        Ok(Self::new_unchecked(self.field.clone(), values))
    }

    /// Replaces every missing cell with `value`.
    pub fn fill_missing(&self, value: &Value) -> DdfResult<Self> {
        if !self.data_type().accepts(value) {
            return Err(DdfError::TypeError(format!(
                "Cannot fill column {} with {value} of type {}",
                self.field,
                value.data_type()
            )));
        }
        let values = self
            .values
            .iter()
            .map(|v| if v.is_missing() { value.clone() } else { v.clone() })
            .collect();
        Ok(Self::new_unchecked(self.field.clone(), values))
    }

    pub fn concat(series: &[&Self]) -> DdfResult<Self> {
        let Some(first) = series.first() else {
            return Err(DdfError::ValueError(
                "Need at least 1 series to perform concat".to_string(),
            ));
        };
        if let Some(other) = series.iter().find(|s| s.field != first.field) {
            return Err(DdfError::SchemaMismatch(format!(
                "Cannot concat series {} with {}",
                first.field, other.field
            )));
        }
        let values = series
            .iter()
            .flat_map(|s| s.values.iter().cloned())
            .collect();
        Ok(Self::new_unchecked(first.field.clone(), values))
    }
}

impl StrValue for Series {
    fn str_value(&self, idx: usize) -> String {
        self.values
            .get(idx)
            .map_or_else(String::new, ToString::to_string)
    }
}
