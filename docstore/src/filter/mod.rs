//! Filters select the documents a collection operation works on.
//!
//! The usual entry point is [field], which builds comparisons fluently:
//!
//! ```rust,ignore
//! use docstore::filter::{field, all};
//!
//! let cursor = collection.find(field("age").gt(30).and(field("city").eq("Paris")))?;
//! let everything = collection.find(all())?;
//! ```
//!
//! Query documents in the `{ field: { "$op": value } }` shape are turned into
//! filters by [query].
//!
//! A field filter on an array field matches when any element matches. A
//! missing field reads as `Null`, so `eq(Null)` and `ne(..)` match it while
//! ordering comparisons never do.

mod filter;
mod fluent;

mod basic_filters;
mod comparison_filters;
mod logical_filters;
mod pattern_filters;
mod query;

pub(crate) use basic_filters::*;
pub(crate) use comparison_filters::*;
pub use filter::*;
pub use fluent::*;
pub(crate) use logical_filters::*;
pub(crate) use pattern_filters::*;
pub use query::*;
