use crate::collection::{CollectionOptions, Document, Modifier, UpdateOptions};
use crate::common::{SortableFields, Value, EXHAUSTED_CURSOR_ID};
use crate::filter::{all, Filter};
use crate::store::Namespace;
use crate::errors::DocStoreResult;
use std::ops::Deref;
use std::sync::Arc;

/// Everything a server needs to open a cursor.
#[derive(Debug, Clone)]
pub struct CursorQuery {
    pub filter: Filter,
    pub sort_by: Option<SortableFields>,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Option<Vec<String>>,
    /// Size of the first batch.
    pub batch_size: u32,
}

impl CursorQuery {
    pub fn new(filter: Filter, batch_size: u32) -> Self {
        CursorQuery {
            filter,
            sort_by: None,
            skip: 0,
            limit: None,
            projection: None,
            batch_size,
        }
    }
}

impl Default for CursorQuery {
    fn default() -> Self {
        CursorQuery::new(all(), crate::common::DEFAULT_BATCH_SIZE)
    }
}

/// One batch of a server-side cursor.
///
/// A `cursor_id` of [EXHAUSTED_CURSOR_ID] means the server has released the
/// cursor and no more batches will follow.
#[derive(Debug, Clone, Default)]
pub struct CursorBatch {
    pub cursor_id: u64,
    pub documents: Vec<Document>,
}

impl CursorBatch {
    pub fn new(cursor_id: u64, documents: Vec<Document>) -> Self {
        CursorBatch {
            cursor_id,
            documents,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor_id == EXHAUSTED_CURSOR_ID
    }
}

/// The operations a document store server exposes to clients.
///
/// Every method fails with `StoreUnavailable` while the server is not
/// reachable. Writes create missing collections; reads on a missing
/// collection behave as if it were empty.
///
/// Implementers must be `Send + Sync`: clients share one server between
/// threads.
pub trait ServerProvider: Send + Sync {
    /// Whether the server currently accepts requests.
    fn is_available(&self) -> bool;

    /// Names of the databases holding at least one collection, in no
    /// particular order.
    fn database_names(&self) -> DocStoreResult<Vec<String>>;

    /// Names of the collections in `database`, in no particular order.
    fn collection_names(&self, database: &str) -> DocStoreResult<Vec<String>>;

    fn has_collection(&self, namespace: &Namespace) -> DocStoreResult<bool>;

    /// Creates a collection. Returns `false` if it already existed, in which
    /// case its options are left unchanged.
    fn create_collection(
        &self,
        namespace: &Namespace,
        options: CollectionOptions,
    ) -> DocStoreResult<bool>;

    /// Options of an existing collection, `None` if it does not exist.
    fn collection_options(
        &self,
        namespace: &Namespace,
    ) -> DocStoreResult<Option<CollectionOptions>>;

    /// Drops a collection. Returns `false` if it did not exist.
    fn drop_collection(&self, namespace: &Namespace) -> DocStoreResult<bool>;

    fn drop_database(&self, database: &str) -> DocStoreResult<()>;

    /// Checks the integrity of a collection's stored data. A missing
    /// collection is not valid.
    fn validate_collection(&self, namespace: &Namespace) -> DocStoreResult<bool>;

    /// Stores copies of `documents` in order. Either all documents are
    /// stored or none is.
    fn insert(&self, namespace: &Namespace, documents: Vec<Document>) -> DocStoreResult<()>;

    /// Removes every document.
    fn clear(&self, namespace: &Namespace) -> DocStoreResult<()>;

    /// Removes matching documents and returns their ids.
    fn remove(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        just_one: bool,
    ) -> DocStoreResult<Vec<Value>>;

    /// Applies `modifier` to matching documents and returns the ids of the
    /// updated or upserted documents.
    fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        modifier: &Modifier,
        options: UpdateOptions,
    ) -> DocStoreResult<Vec<Value>>;

    /// Replaces the first matching document, keeping its `_id`. With
    /// `upsert`, inserts `document` when nothing matches.
    fn replace(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> DocStoreResult<Vec<Value>>;

    fn count(&self, namespace: &Namespace, filter: &Filter) -> DocStoreResult<u64>;

    /// Opens a cursor and returns its first batch.
    fn open_cursor(&self, namespace: &Namespace, query: CursorQuery) -> DocStoreResult<CursorBatch>;

    /// Returns the next batch of at most `batch_size` documents.
    ///
    /// Fails with `CursorExhausted` if the cursor id is unknown, exhausted or
    /// killed.
    fn get_more(&self, cursor_id: u64, batch_size: u32) -> DocStoreResult<CursorBatch>;

    /// Releases a cursor. Killing an unknown cursor is not an error.
    fn kill_cursor(&self, cursor_id: u64) -> DocStoreResult<()>;

    /// Largest accepted document, in estimated bytes.
    fn max_document_size(&self) -> usize;
}

/// A cheaply cloneable handle to a [ServerProvider].
///
/// ```rust,ignore
/// let server = DocStoreServer::new(InMemoryServer::new());
/// let client = DocStoreClient::connect(server, "test")?;
/// ```
#[derive(Clone)]
pub struct DocStoreServer {
    inner: Arc<dyn ServerProvider>,
}

impl DocStoreServer {
    pub fn new<T: ServerProvider + 'static>(inner: T) -> Self {
        DocStoreServer { inner: Arc::new(inner) }
    }
}

impl Deref for DocStoreServer {
    type Target = Arc<dyn ServerProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
