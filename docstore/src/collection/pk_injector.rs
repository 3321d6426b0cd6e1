use super::{Document, ObjectId};
use crate::common::{Value, DOC_ID};
use crate::errors::DocStoreResult;

/// Assigns primary keys to documents before a collection stores them.
///
/// A collection consults its injector for every document it inserts,
/// including the document of an `upsert`. Documents that still have no `_id`
/// afterwards get an [ObjectId].
///
/// ```rust
/// use docstore::collection::{Document, PkInjector};
/// use docstore::errors::DocStoreResult;
/// use std::sync::atomic::{AtomicI64, Ordering};
///
/// struct Sequence(AtomicI64);
///
/// impl PkInjector for Sequence {
///     fn inject_pk(&self, document: &mut Document) -> DocStoreResult<bool> {
///         if document.has_id() {
///             return Ok(false);
///         }
///         document.put("_id", self.0.fetch_add(1, Ordering::Relaxed))?;
///         Ok(true)
///     }
/// }
/// ```
pub trait PkInjector: Send + Sync {
    /// The field this injector writes.
    fn key(&self) -> &str {
        DOC_ID
    }

    /// Adds a key to `document` unless it already has one. Returns whether a
    /// key was added.
    fn inject_pk(&self, document: &mut Document) -> DocStoreResult<bool>;
}

/// The default injector: a fresh [ObjectId] as `_id`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjectIdInjector;

impl PkInjector for ObjectIdInjector {
    fn inject_pk(&self, document: &mut Document) -> DocStoreResult<bool> {
        if document.has_id() {
            return Ok(false);
        }
        document.put_id_first(Value::ObjectId(ObjectId::new()));
        Ok(true)
    }
}
