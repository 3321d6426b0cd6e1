use regex::Regex;
use std::any::Any;
use std::fmt::Display;

use crate::collection::Document;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

use super::basic_filters::match_field;
use super::FilterProvider;

/// Matches string fields (or string elements of array fields) against a
/// regular expression. Non-string values never match.
pub(crate) struct RegexFilter {
    field_name: String,
    field_value: String,
    pattern: Option<Regex>,
}

impl RegexFilter {
    /// Compiles the pattern immediately. An invalid pattern is logged and
    /// reported by every `apply`; use [RegexFilter::try_new] to fail early.
    #[inline]
    pub(crate) fn new(field_name: String, field_value: String) -> Self {
        let pattern = match Regex::new(&field_value) {
            Ok(regex) => Some(regex),
            Err(e) => {
                log::error!("Invalid regex pattern '{}': {}", field_value, e);
                None
            }
        };

        RegexFilter {
            field_name,
            field_value,
            pattern,
        }
    }

    pub(crate) fn try_new(field_name: String, field_value: String) -> DocStoreResult<Self> {
        let filter = RegexFilter::new(field_name, field_value);
        if filter.pattern.is_none() {
            return Err(DocStoreError::new(
                &format!("Invalid regex pattern: {}", filter.field_value),
                ErrorKind::FilterError,
            ));
        }
        Ok(filter)
    }
}

impl Display for RegexFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} =~ {})", self.field_name, self.field_value)
    }
}

impl FilterProvider for RegexFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let Some(pattern) = &self.pattern else {
            log::error!("Invalid regex pattern for filter {}", self);
            return Err(DocStoreError::new(
                "Invalid regex pattern",
                ErrorKind::FilterError,
            ));
        };

        let value = entry.get(&self.field_name);
        Ok(match_field(&value, |v| v.as_str().is_some_and(|s| pattern.is_match(s))))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
