use std::any::Any;
use std::cmp::Ordering;
use std::fmt::Display;
use std::mem::discriminant;

use crate::collection::Document;
use crate::common::Value;
use crate::errors::DocStoreResult;

use super::basic_filters::match_field;
use super::FilterProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ComparisonMode {
    Greater,
    GreaterEqual,
    Lesser,
    LesserEqual,
}

impl ComparisonMode {
    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            ComparisonMode::Greater => ordering == Ordering::Greater,
            ComparisonMode::GreaterEqual => ordering != Ordering::Less,
            ComparisonMode::Lesser => ordering == Ordering::Less,
            ComparisonMode::LesserEqual => ordering != Ordering::Greater,
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            ComparisonMode::Greater => ">",
            ComparisonMode::GreaterEqual => ">=",
            ComparisonMode::Lesser => "<",
            ComparisonMode::LesserEqual => "<=",
        }
    }
}

// numbers compare with numbers, everything else only within its own type
#[inline]
fn comparable(a: &Value, b: &Value) -> bool {
    (a.is_number() && b.is_number()) || (!a.is_null() && discriminant(a) == discriminant(b))
}

/// Orders a field against a value. Missing fields and values of another
/// type never match.
pub(crate) struct ComparisonFilter {
    field_name: String,
    field_value: Value,
    mode: ComparisonMode,
}

impl ComparisonFilter {
    #[inline]
    pub(crate) fn new(field_name: String, field_value: Value, mode: ComparisonMode) -> Self {
        ComparisonFilter {
            field_name,
            field_value,
            mode,
        }
    }
}

impl Display for ComparisonFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} {} {})", self.field_name, self.mode.symbol(), self.field_value)
    }
}

impl FilterProvider for ComparisonFilter {
    #[inline]
    fn apply(&self, entry: &Document) -> DocStoreResult<bool> {
        let value = entry.get(&self.field_name);
        Ok(match_field(&value, |v| {
            comparable(v, &self.field_value) && self.mode.accepts(v.cmp(&self.field_value))
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{doc, val};

    fn filter(mode: ComparisonMode, value: Value) -> ComparisonFilter {
        ComparisonFilter::new("a".to_string(), value, mode)
    }

    #[test]
    fn test_numeric_comparisons() {
        let document = doc! { a: 5 };
        assert!(filter(ComparisonMode::Greater, val!(4)).apply(&document).unwrap());
        assert!(!filter(ComparisonMode::Greater, val!(5)).apply(&document).unwrap());
        assert!(filter(ComparisonMode::GreaterEqual, val!(5.0)).apply(&document).unwrap());
        assert!(filter(ComparisonMode::Lesser, val!(5.5)).apply(&document).unwrap());
        assert!(filter(ComparisonMode::LesserEqual, val!(5i64)).apply(&document).unwrap());
        assert!(!filter(ComparisonMode::Lesser, val!(-1)).apply(&document).unwrap());
    }

    #[test]
    fn test_string_comparisons() {
        let document = doc! { a: "m" };
        assert!(filter(ComparisonMode::Greater, val!("a")).apply(&document).unwrap());
        assert!(filter(ComparisonMode::Lesser, val!("z")).apply(&document).unwrap());
    }

    #[test]
    fn test_mismatched_types_never_match() {
        let document = doc! { a: "5" };
        assert!(!filter(ComparisonMode::Greater, val!(1)).apply(&document).unwrap());
        assert!(!filter(ComparisonMode::Lesser, val!(1)).apply(&document).unwrap());
    }

    #[test]
    fn test_missing_field_never_matches() {
        let document = doc! { b: 1 };
        assert!(!filter(ComparisonMode::Greater, val!(0)).apply(&document).unwrap());
        assert!(!filter(ComparisonMode::LesserEqual, Value::Null).apply(&document).unwrap());
    }

    #[test]
    fn test_array_field_matches_any_element() {
        let document = doc! { a: [1, 10] };
        assert!(filter(ComparisonMode::Greater, val!(5)).apply(&document).unwrap());
        assert!(!filter(ComparisonMode::Greater, val!(10)).apply(&document).unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(filter(ComparisonMode::GreaterEqual, val!(3)).to_string(), "(a >= 3)");
    }
}
