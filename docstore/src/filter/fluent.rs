use crate::common::Value;

use super::{
    ComparisonFilter, ComparisonMode, EqualsFilter, Filter, InFilter, NotEqualsFilter, NotInFilter,
    RegexFilter,
};

/// Starts a filter on `field_name`, which may be an embedded path.
///
/// ```rust
/// use docstore::doc;
/// use docstore::filter::field;
///
/// let filter = field("address.city").eq("Paris").and(field("age").gt(30));
/// assert!(filter.apply(&doc! { age: 40, address: { city: "Paris" } }).unwrap());
/// ```
pub fn field(field_name: &str) -> FluentFilter {
    FluentFilter {
        field_name: field_name.to_string(),
    }
}

pub struct FluentFilter {
    field_name: String,
}

impl FluentFilter {
    #[inline]
    pub fn eq<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(EqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn ne<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(NotEqualsFilter::new(self.field_name, value.into()))
    }

    #[inline]
    pub fn gt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Greater,
        ))
    }

    #[inline]
    pub fn gte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::GreaterEqual,
        ))
    }

    #[inline]
    pub fn lt<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::Lesser,
        ))
    }

    #[inline]
    pub fn lte<T: Into<Value>>(self, value: T) -> Filter {
        Filter::new(ComparisonFilter::new(
            self.field_name,
            value.into(),
            ComparisonMode::LesserEqual,
        ))
    }

    pub fn in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(|v| v.into()).collect();
        Filter::new(InFilter::new(self.field_name, values))
    }

    pub fn not_in_array<T: Into<Value>>(self, values: Vec<T>) -> Filter {
        let values = values.into_iter().map(|v| v.into()).collect();
        Filter::new(NotInFilter::new(self.field_name, values))
    }

    /// Regular expression match. An invalid pattern makes the filter fail
    /// with `FilterError` when it is applied.
    #[inline]
    pub fn regex(self, pattern: &str) -> Filter {
        Filter::new(RegexFilter::new(self.field_name, pattern.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_fluent_filters() {
        let document = doc! { name: "Alice", age: 30, tags: ["a", "b"] };

        assert!(field("name").eq("Alice").apply(&document).unwrap());
        assert!(field("name").ne("Bob").apply(&document).unwrap());
        assert!(field("age").gt(29).apply(&document).unwrap());
        assert!(field("age").gte(30).apply(&document).unwrap());
        assert!(field("age").lt(31).apply(&document).unwrap());
        assert!(field("age").lte(30).apply(&document).unwrap());
        assert!(field("age").in_array(vec![10, 30]).apply(&document).unwrap());
        assert!(field("age").not_in_array(vec![10, 20]).apply(&document).unwrap());
        assert!(field("name").regex("^Al").apply(&document).unwrap());
        assert!(field("tags").eq("b").apply(&document).unwrap());
    }

    #[test]
    fn test_fluent_display() {
        assert_eq!(field("a").lt(3).to_string(), "(a < 3)");
        assert_eq!(field("a").in_array(vec![1, 2]).to_string(), "(a in [1, 2])");
    }
}
