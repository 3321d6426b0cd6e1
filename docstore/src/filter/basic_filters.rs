use std::any::Any;
use std::fmt::Display;

use itertools::Itertools;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::DocStoreResult;

use super::FilterProvider;

/// Evaluates `predicate` against a field value. An array field matches when
/// the array itself or any of its elements matches.
#[inline]
pub(crate) fn match_field(value: &Value, predicate: impl Fn(&Value) -> bool) -> bool {
    if predicate(value) {
        return true;
    }
    match value {
        Value::Array(items) => items.iter().any(predicate),
        _ => false,
    }
}

pub(crate) struct AllFilter;

impl FilterProvider for AllFilter {
    fn apply(&self, _entry: &Document) -> DocStoreResult<bool> {
        Ok(true)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Display for AllFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AllFilter")
    }
}

/// Field equals a value. A missing field equals `Null`.
pub(crate) struct EqualsFilter {
    field_name: String,
    field_value: Value,
}

impl EqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        EqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for EqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} == {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for EqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_field(&value, |v| v == &self.field_value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Negation of [EqualsFilter]; matches documents missing the field.
pub(crate) struct NotEqualsFilter {
    field_name: String,
    field_value: Value,
}

impl NotEqualsFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value) -> Self {
        NotEqualsFilter {
            field_name,
            field_value,
        }
    }
}

impl Display for NotEqualsFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} != {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for NotEqualsFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(!match_field(&value, |v| v == &self.field_value))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Field equals one of the listed values.
pub(crate) struct InFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl InFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        InFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for InFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

impl FilterProvider for InFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_field(&value, |v| self.field_values.contains(v)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Field equals none of the listed values.
pub(crate) struct NotInFilter {
    field_name: String,
    field_values: Vec<Value>,
}

impl NotInFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_values: Vec<Value>) -> Self {
        NotInFilter {
            field_name,
            field_values,
        }
    }
}

impl Display for NotInFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} not in [{}])", self.field_name, self.field_values.iter().join(", "))
    }
}

impl FilterProvider for NotInFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(!match_field(&value, |v| self.field_values.contains(v)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
