use crate::collection::Document;
use crate::common::{
    Value, OPERATOR_PREFIX, OP_AND, OP_EQ, OP_GT, OP_GTE, OP_IN, OP_LT, OP_LTE, OP_NE, OP_NIN,
    OP_NOT, OP_OR, OP_REGEX,
};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

use super::{
    all, and, not, or, ComparisonFilter, ComparisonMode, EqualsFilter, Filter, InFilter,
    NotEqualsFilter, NotInFilter, RegexFilter,
};

/// Builds a [Filter] from a query document.
///
/// * `{}` matches every document;
/// * `{ field: value }` is an equality match, several fields are and-ed;
/// * `{ field: { "$gt": 1, "$lt": 5 } }` applies operators to one field
///   (`$eq`, `$ne`, `$gt`, `$gte`, `$lt`, `$lte`, `$in`, `$nin`, `$regex`,
///   `$not`);
/// * `{ "$and": [..] }`, `{ "$or": [..] }` and `{ "$not": {..} }` combine
///   sub-queries.
///
/// ```rust
/// use docstore::doc;
/// use docstore::filter::query;
///
/// let filter = query(&doc! {
///     age: { "$gte": 18 },
///     "$or": [{ city: "Paris" }, { city: "Rome" }]
/// })
/// .unwrap();
/// assert!(filter.apply(&doc! { age: 20, city: "Rome" }).unwrap());
/// ```
///
/// # Errors
///
/// Returns `FilterError` for unknown operators and operands of the wrong shape.
pub fn query(document: &Document) -> DocStoreResult<Filter> {
    let mut filters = Vec::with_capacity(document.size());
    for (key, value) in document.iter() {
        if key.starts_with(OPERATOR_PREFIX) {
            filters.push(parse_top_level_operator(key, value)?);
        } else {
            filters.push(parse_field(key, value)?);
        }
    }
    Ok(combine(filters))
}

fn combine(mut filters: Vec<Filter>) -> Filter {
    match filters.len() {
        0 => all(),
        1 => filters.remove(0),
        _ => and(filters),
    }
}

fn parse_top_level_operator(operator: &str, value: &Value) -> DocStoreResult<Filter> {
    match operator {
        OP_AND | OP_OR => {
            let Some(items) = value.as_array().filter(|items| !items.is_empty()) else {
                return Err(filter_error(&format!(
                    "{} requires a non-empty array of queries",
                    operator
                )));
            };

            let mut filters = Vec::with_capacity(items.len());
            for item in items {
                let Some(sub_query) = item.as_document() else {
                    return Err(filter_error(&format!(
                        "{} elements must be query documents",
                        operator
                    )));
                };
                filters.push(query(sub_query)?);
            }

            if operator == OP_AND {
                Ok(and(filters))
            } else {
                Ok(or(filters))
            }
        }
        OP_NOT => match value.as_document() {
            Some(sub_query) => Ok(not(query(sub_query)?)),
            None => Err(filter_error("$not requires a query document")),
        },
        other => Err(filter_error(&format!("Unknown top level operator {}", other))),
    }
}

fn parse_field(field_name: &str, value: &Value) -> DocStoreResult<Filter> {
    let operators = value.as_document().filter(|doc| is_operator_document(doc));
    match operators {
        Some(operators) => parse_field_operators(field_name, operators),
        None => {
            if let Some(doc) = value.as_document() {
                if doc.keys().any(|k| k.starts_with(OPERATOR_PREFIX)) {
                    return Err(filter_error(&format!(
                        "Query for {} mixes operators and plain fields",
                        field_name
                    )));
                }
            }
            Ok(Filter::new(EqualsFilter::new(field_name.to_string(), value.clone())))
        }
    }
}

fn is_operator_document(document: &Document) -> bool {
    !document.is_empty() && document.keys().all(|k| k.starts_with(OPERATOR_PREFIX))
}

fn parse_field_operators(field_name: &str, operators: &Document) -> DocStoreResult<Filter> {
    let mut filters = Vec::with_capacity(operators.size());
    for (operator, operand) in operators.iter() {
        let name = field_name.to_string();
        let filter = match operator.as_str() {
            OP_EQ => Filter::new(EqualsFilter::new(name, operand.clone())),
            OP_NE => Filter::new(NotEqualsFilter::new(name, operand.clone())),
            OP_GT => Filter::new(ComparisonFilter::new(
                name,
                operand.clone(),
                ComparisonMode::Greater,
            )),
            OP_GTE => Filter::new(ComparisonFilter::new(
                name,
                operand.clone(),
                ComparisonMode::GreaterEqual,
            )),
            OP_LT => Filter::new(ComparisonFilter::new(
                name,
                operand.clone(),
                ComparisonMode::Lesser,
            )),
            OP_LTE => Filter::new(ComparisonFilter::new(
                name,
                operand.clone(),
                ComparisonMode::LesserEqual,
            )),
            OP_IN | OP_NIN => {
                let Some(values) = operand.as_array() else {
                    return Err(filter_error(&format!(
                        "{} on {} requires an array",
                        operator, field_name
                    )));
                };
                if operator == OP_IN {
                    Filter::new(InFilter::new(name, values.clone()))
                } else {
                    Filter::new(NotInFilter::new(name, values.clone()))
                }
            }
            OP_REGEX => {
                let Some(pattern) = operand.as_str() else {
                    return Err(filter_error(&format!(
                        "$regex on {} requires a string",
                        field_name
                    )));
                };
                Filter::new(RegexFilter::try_new(name, pattern.to_string())?)
            }
            OP_NOT => match operand.as_document().filter(|doc| is_operator_document(doc)) {
                Some(inner) => not(parse_field_operators(field_name, inner)?),
                None => {
                    return Err(filter_error(&format!(
                        "$not on {} requires an operator document",
                        field_name
                    )))
                }
            },
            other => {
                return Err(filter_error(&format!(
                    "Unknown operator {} on {}",
                    other, field_name
                )))
            }
        };
        filters.push(filter);
    }
    Ok(combine(filters))
}

fn filter_error(message: &str) -> DocStoreError {
    log::error!("{}", message);
    DocStoreError::new(message, ErrorKind::FilterError)
}
