use crate::collection::{Document, ObjectId};
use crate::common::{Value, DOC_ID};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use std::any::Any;
use std::fmt::{Debug, Display};
use std::ops::Deref;
use std::sync::Arc;

use super::{AllFilter, AndFilter, EqualsFilter, NotFilter, OrFilter};

/// A predicate over documents.
///
/// Implementations are immutable and shared between threads: the in-memory
/// server evaluates a cursor's filter on whichever thread calls `get_more`.
pub trait FilterProvider: Any + Send + Sync + Display {
    /// Returns whether `entry` matches.
    fn apply(&self, entry: &Document) -> DocStoreResult<bool>;

    /// Child filters of a logical filter.
    fn logical_filters(&self) -> DocStoreResult<Vec<Filter>> {
        Err(DocStoreError::new(
            "Filter is not a logical filter",
            ErrorKind::FilterError,
        ))
    }

    fn as_any(&self) -> &dyn Any;
}

/// A cheaply cloneable handle to a [FilterProvider].
///
/// Filters are built with [field](super::field), the combinators in this
/// module or parsed from a query document with [query](super::query).
///
/// ```rust,ignore
/// let adults = field("age").gte(18).and(field("active").eq(true));
/// let cursor = collection.find(adults)?;
/// ```
#[derive(Clone)]
pub struct Filter {
    inner: Arc<dyn FilterProvider>,
}

impl Filter {
    pub fn new<T: FilterProvider + 'static>(inner: T) -> Self {
        Filter { inner: Arc::new(inner) }
    }

    pub fn and(&self, filter: Filter) -> Self {
        Filter::new(AndFilter::new(vec![self.clone(), filter]))
    }

    pub fn or(&self, filter: Filter) -> Self {
        Filter::new(OrFilter::new(vec![self.clone(), filter]))
    }

    pub fn not(&self) -> Self {
        Filter::new(NotFilter::new(self.clone()))
    }
}

impl Display for Filter {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filter({})", self.inner)
    }
}

impl Deref for Filter {
    type Target = Arc<dyn FilterProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Default for Filter {
    fn default() -> Self {
        all()
    }
}

/// Matches every document.
pub fn all() -> Filter {
    Filter::new(AllFilter)
}

/// Matches documents whose `_id` equals `id`.
pub fn by_id(id: ObjectId) -> Filter {
    Filter::new(EqualsFilter::new(DOC_ID.to_string(), Value::ObjectId(id)))
}

pub fn and(filters: Vec<Filter>) -> Filter {
    Filter::new(AndFilter::new(filters))
}

pub fn or(filters: Vec<Filter>) -> Filter {
    Filter::new(OrFilter::new(filters))
}

pub fn not(filter: Filter) -> Filter {
    Filter::new(NotFilter::new(filter))
}

pub(crate) fn is_all_filter(filter: &Filter) -> bool {
    filter.as_any().is::<AllFilter>()
}
