use super::{
    CollectionOptions, Document, DocumentLike, FindOptions, PkInjector, UpdateOptions, WriteResult,
};
use crate::common::DocumentCursor;
use crate::errors::DocStoreResult;
use crate::filter::Filter;
use std::fmt::{Debug, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// Operations on one named collection.
///
/// Implementations talk to a server through the client connection they were
/// created from. Every operation fails with `InvalidOperation` once that
/// client is closed and with `StoreUnavailable` when the server cannot be
/// reached.
pub trait CollectionProvider: Send + Sync {
    /// Removes every document. Clearing an empty collection does nothing.
    fn clear(&self) -> DocStoreResult<()>;

    /// Stores a copy of `document`, assigning an `ObjectId` as `_id` if it
    /// has none.
    fn insert_document(&self, document: Document) -> DocStoreResult<WriteResult>;

    /// Stores copies of `documents` in order. If any document is invalid
    /// nothing is stored.
    fn insert_documents(&self, documents: Vec<Document>) -> DocStoreResult<WriteResult>;

    /// Returns a lazy cursor over the matching documents in insertion order.
    fn find(&self, filter: Filter) -> DocStoreResult<DocumentCursor>;

    fn find_with_options(
        &self,
        filter: Filter,
        options: FindOptions,
    ) -> DocStoreResult<DocumentCursor>;

    /// The first matching document, if any.
    fn find_one(&self, filter: Filter) -> DocStoreResult<Option<Document>>;

    fn count(&self) -> DocStoreResult<u64>;

    fn count_matching(&self, filter: Filter) -> DocStoreResult<u64>;

    /// Removes every matching document.
    fn remove(&self, filter: Filter) -> DocStoreResult<WriteResult>;

    /// Removes the first matching document.
    fn remove_one(&self, filter: Filter) -> DocStoreResult<WriteResult>;

    /// Applies a `$set` / `$inc` modifier document to the matching documents.
    fn update(
        &self,
        filter: Filter,
        modifier: &Document,
        options: UpdateOptions,
    ) -> DocStoreResult<WriteResult>;

    /// Replaces the first matching document, keeping its `_id`.
    fn replace(&self, filter: Filter, document: Document) -> DocStoreResult<WriteResult>;

    /// Replaces the first matching document or inserts `document` when
    /// nothing matches.
    fn upsert(&self, filter: Filter, document: Document) -> DocStoreResult<WriteResult>;

    fn options(&self) -> DocStoreResult<CollectionOptions>;

    /// Replaces the injector that assigns primary keys to inserted documents.
    /// It applies to this handle and its clones.
    fn set_pk_injector(&self, injector: Arc<dyn PkInjector>);

    fn name(&self) -> String;

    fn database_name(&self) -> String;
}

/// A handle to a collection in a document store database.
///
/// Handles are cheap to clone and hold no state besides the collection name
/// and the client connection.
///
/// # Examples
///
/// ```rust
/// use docstore::doc;
/// use docstore::filter::field;
/// use docstore::store::InMemoryServer;
/// use docstore::DocStoreClient;
///
/// let client = DocStoreClient::connect(InMemoryServer::new(), "test").unwrap();
/// let users = client.collection("users").unwrap();
///
/// let mut alice = doc! { name: "Alice", age: 30 };
/// users.insert(&alice).unwrap();
/// alice.put("age", 31).unwrap();
/// users.insert(&alice).unwrap();
///
/// assert_eq!(users.count_matching(field("name").eq("Alice")).unwrap(), 2);
/// assert_eq!(users.count_matching(field("age").eq(30)).unwrap(), 1);
/// ```
#[derive(Clone)]
pub struct DocStoreCollection {
    inner: Arc<dyn CollectionProvider>,
}

impl DocStoreCollection {
    pub fn new<T: CollectionProvider + 'static>(inner: T) -> Self {
        DocStoreCollection { inner: Arc::new(inner) }
    }

    /// Inserts anything that converts into a [Document].
    pub fn insert<D: DocumentLike>(&self, document: D) -> DocStoreResult<WriteResult> {
        self.inner.insert_document(document.into_document()?)
    }

    /// Inserts several documents, all or none.
    pub fn insert_many<I, D>(&self, documents: I) -> DocStoreResult<WriteResult>
    where
        I: IntoIterator<Item = D>,
        D: DocumentLike,
    {
        let documents = documents
            .into_iter()
            .map(DocumentLike::into_document)
            .collect::<DocStoreResult<Vec<_>>>()?;
        self.inner.insert_documents(documents)
    }
}

impl Deref for DocStoreCollection {
    type Target = Arc<dyn CollectionProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Debug for DocStoreCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocStoreCollection({}.{})", self.inner.database_name(), self.inner.name())
    }
}
