use crate::collection::{validate_document, CollectionOptions, Document, Modifier, UpdateOptions};
use crate::common::{LockHandle, LockRegistry, Value, WriteExecutor, EXHAUSTED_CURSOR_ID};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::{is_all_filter, Filter};
use crate::store::{CursorBatch, CursorQuery, DocStoreServer, Namespace, ServerProvider};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use itertools::Itertools;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{CursorRegistry, InMemoryCollection, InMemoryServerConfig, ServerCursor};

/// A document store server living in the current process.
///
/// Data lives as long as the server (or any clone of it). [shutdown] makes
/// the server unreachable without losing data, so tests can simulate a lost
/// connection; [start] brings it back.
///
/// ```rust
/// use docstore::store::InMemoryServer;
/// use docstore::DocStoreClient;
///
/// let server = InMemoryServer::new();
/// let client = DocStoreClient::connect(server.clone(), "test").unwrap();
/// assert!(client.collection_names().unwrap().is_empty());
/// ```
///
/// [shutdown]: InMemoryServer::shutdown
/// [start]: InMemoryServer::start
#[derive(Clone)]
pub struct InMemoryServer {
    inner: Arc<InMemoryServerInner>,
}

impl InMemoryServer {
    pub fn new() -> InMemoryServer {
        Self::with_config(InMemoryServerConfig::new())
    }

    pub fn with_config(config: InMemoryServerConfig) -> InMemoryServer {
        InMemoryServer {
            inner: Arc::new(InMemoryServerInner::new(config)),
        }
    }

    pub fn config(&self) -> InMemoryServerConfig {
        self.inner.config.clone()
    }

    /// Makes the server unreachable and discards every open cursor.
    pub fn shutdown(&self) {
        self.inner.shutdown()
    }

    /// Makes the server reachable again.
    pub fn start(&self) {
        self.inner.start()
    }

    /// Number of server-side cursors currently open.
    pub fn open_cursor_count(&self) -> usize {
        self.inner.cursors.len()
    }
}

impl Default for InMemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<InMemoryServer> for DocStoreServer {
    fn from(server: InMemoryServer) -> Self {
        DocStoreServer::new(server)
    }
}

impl ServerProvider for InMemoryServer {
    fn is_available(&self) -> bool {
        self.inner.available.load(Ordering::Acquire)
    }

    fn database_names(&self) -> DocStoreResult<Vec<String>> {
        self.inner.check_available()?;
        Ok(self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().database().to_string())
            .unique()
            .collect())
    }

    fn collection_names(&self, database: &str) -> DocStoreResult<Vec<String>> {
        self.inner.collection_names(database)
    }

    fn validate_collection(&self, namespace: &Namespace) -> DocStoreResult<bool> {
        self.inner.check_available()?;

        let lock = self.inner.lock(namespace);
        let _guard = lock.read();
        let Some(collection) = self.inner.find_collection(namespace) else {
            log::warn!("Cannot validate missing collection {}", namespace);
            return Ok(false);
        };

        let problems = collection.validate(self.inner.config.max_document_size());
        for problem in &problems {
            log::warn!("Collection {} is invalid: {}", namespace, problem);
        }
        Ok(problems.is_empty())
    }

    fn has_collection(&self, namespace: &Namespace) -> DocStoreResult<bool> {
        self.inner.check_available()?;
        Ok(self.inner.collections.contains_key(namespace))
    }

    fn create_collection(
        &self,
        namespace: &Namespace,
        options: CollectionOptions,
    ) -> DocStoreResult<bool> {
        self.inner.create_collection(namespace, options)
    }

    fn collection_options(
        &self,
        namespace: &Namespace,
    ) -> DocStoreResult<Option<CollectionOptions>> {
        self.inner.check_available()?;
        Ok(self.inner.find_collection(namespace).map(|c| c.options()))
    }

    fn drop_collection(&self, namespace: &Namespace) -> DocStoreResult<bool> {
        self.inner.check_available()?;
        Ok(self.inner.drop_collection(namespace))
    }

    fn drop_database(&self, database: &str) -> DocStoreResult<()> {
        self.inner.drop_database(database)
    }

    fn insert(&self, namespace: &Namespace, documents: Vec<Document>) -> DocStoreResult<()> {
        self.inner.insert(namespace, documents)
    }

    fn clear(&self, namespace: &Namespace) -> DocStoreResult<()> {
        self.inner.clear(namespace)
    }

    fn remove(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        just_one: bool,
    ) -> DocStoreResult<Vec<Value>> {
        self.inner.remove(namespace, filter, just_one)
    }

    fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        modifier: &Modifier,
        options: UpdateOptions,
    ) -> DocStoreResult<Vec<Value>> {
        self.inner.update(namespace, filter, modifier, options)
    }

    fn replace(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        document: Document,
        upsert: bool,
    ) -> DocStoreResult<Vec<Value>> {
        self.inner.replace(namespace, filter, document, upsert)
    }

    fn count(&self, namespace: &Namespace, filter: &Filter) -> DocStoreResult<u64> {
        self.inner.count(namespace, filter)
    }

    fn open_cursor(
        &self,
        namespace: &Namespace,
        query: CursorQuery,
    ) -> DocStoreResult<CursorBatch> {
        self.inner.open_cursor(namespace, query)
    }

    fn get_more(&self, cursor_id: u64, batch_size: u32) -> DocStoreResult<CursorBatch> {
        self.inner.get_more(cursor_id, batch_size)
    }

    fn kill_cursor(&self, cursor_id: u64) -> DocStoreResult<()> {
        self.inner.kill_cursor(cursor_id)
    }

    fn max_document_size(&self) -> usize {
        self.inner.config.max_document_size()
    }
}

struct InMemoryServerInner {
    available: AtomicBool,
    config: InMemoryServerConfig,
    collections: DashMap<Namespace, InMemoryCollection>,
    cursors: CursorRegistry,
    locks: LockRegistry,
}

impl InMemoryServerInner {
    fn new(config: InMemoryServerConfig) -> InMemoryServerInner {
        InMemoryServerInner {
            available: AtomicBool::new(true),
            config,
            collections: DashMap::new(),
            cursors: CursorRegistry::default(),
            locks: LockRegistry::new(),
        }
    }

    fn check_available(&self) -> DocStoreResult<()> {
        if !self.available.load(Ordering::Acquire) {
            log::error!("Server is not available");
            return Err(DocStoreError::new(
                "Server is not available",
                ErrorKind::StoreUnavailable,
            ));
        }
        Ok(())
    }

    fn shutdown(&self) {
        self.available.store(false, Ordering::Release);
        let open = self.cursors.len();
        self.cursors.clear();
        log::warn!("In-memory server shut down, discarded {} open cursors", open);
    }

    fn start(&self) {
        self.available.store(true, Ordering::Release);
        log::info!("In-memory server started");
    }

    fn lock(&self, namespace: &Namespace) -> LockHandle {
        self.locks.get_lock(&namespace.to_string())
    }

    fn find_collection(&self, namespace: &Namespace) -> Option<InMemoryCollection> {
        self.collections.get(namespace).map(|entry| entry.value().clone())
    }

    fn collection_for_write(&self, namespace: &Namespace) -> InMemoryCollection {
        self.collections
            .entry(namespace.clone())
            .or_insert_with(|| {
                log::debug!("Creating collection {}", namespace);
                InMemoryCollection::new(namespace.clone(), CollectionOptions::default())
            })
            .value()
            .clone()
    }

    fn collection_names(&self, database: &str) -> DocStoreResult<Vec<String>> {
        self.check_available()?;
        Ok(self
            .collections
            .iter()
            .filter(|entry| entry.key().database() == database)
            .map(|entry| entry.key().collection().to_string())
            .collect())
    }

    fn create_collection(
        &self,
        namespace: &Namespace,
        options: CollectionOptions,
    ) -> DocStoreResult<bool> {
        self.check_available()?;
        options.validate()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        match self.collections.entry(namespace.clone()) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(entry) => {
                log::debug!("Creating collection {} with {:?}", namespace, options);
                entry.insert(InMemoryCollection::new(namespace.clone(), options));
                Ok(true)
            }
        }
    }

    fn drop_collection(&self, namespace: &Namespace) -> bool {
        let lock = self.lock(namespace);
        let _guard = lock.write();
        match self.collections.remove(namespace) {
            Some((_, collection)) => {
                collection.mark_dropped();
                log::debug!("Dropped collection {}", namespace);
                true
            }
            None => false,
        }
    }

    fn drop_database(&self, database: &str) -> DocStoreResult<()> {
        self.check_available()?;
        let namespaces: Vec<Namespace> = self
            .collections
            .iter()
            .filter(|entry| entry.key().database() == database)
            .map(|entry| entry.key().clone())
            .collect();

        for namespace in namespaces {
            self.drop_collection(&namespace);
        }
        Ok(())
    }

    fn validate(&self, document: &Document, options: &CollectionOptions) -> DocStoreResult<()> {
        validate_document(document, self.config.max_document_size())?;

        if let Some(limit) = options.size_limit() {
            let size = document.estimated_size();
            if size > limit {
                log::error!("Document size {} exceeds the capped collection size {}", size, limit);
                return Err(DocStoreError::new(
                    &format!("Document size {} exceeds the capped collection size {}", size, limit),
                    ErrorKind::ValidationError,
                ));
            }
        }
        Ok(())
    }

    fn insert(&self, namespace: &Namespace, documents: Vec<Document>) -> DocStoreResult<()> {
        self.check_available()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        let collection = self.collection_for_write(namespace);
        let options = collection.options();
        for document in &documents {
            self.validate(document, &options)?;
        }

        collection.insert_all(documents);
        Ok(())
    }

    fn clear(&self, namespace: &Namespace) -> DocStoreResult<()> {
        self.check_available()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        self.collection_for_write(namespace).clear();
        Ok(())
    }

    fn remove(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        just_one: bool,
    ) -> DocStoreResult<Vec<Value>> {
        self.check_available()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        let Some(collection) = self.find_collection(namespace) else {
            return Ok(Vec::new());
        };

        let mut removed = Vec::new();
        for (seq, document) in collection.find_matching(filter, just_one)? {
            if collection.remove_at(seq) {
                removed.push(document.id().cloned().unwrap_or_default());
            }
        }
        Ok(removed)
    }

    fn update(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        modifier: &Modifier,
        options: UpdateOptions,
    ) -> DocStoreResult<Vec<Value>> {
        self.check_available()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        let collection = self.collection_for_write(namespace);
        let collection_options = collection.options();

        let matched = collection.find_matching(filter, !options.is_multi())?;
        if matched.is_empty() {
            if !options.is_upsert() {
                return Ok(Vec::new());
            }

            let mut document = modifier.to_upsert_document()?;
            let id = document.ensure_id();
            self.validate(&document, &collection_options)?;
            collection.insert_all(vec![document]);
            return Ok(vec![id]);
        }

        // apply and validate everything before writing anything
        let mut updated = Vec::with_capacity(matched.len());
        for (seq, mut document) in matched {
            modifier.apply(&mut document)?;
            self.validate(&document, &collection_options)?;
            updated.push((seq, document));
        }

        let mut ids = Vec::with_capacity(updated.len());
        for (seq, document) in updated {
            ids.push(document.id().cloned().unwrap_or_default());
            collection.replace_at(seq, document);
        }
        Ok(ids)
    }

    fn replace(
        &self,
        namespace: &Namespace,
        filter: &Filter,
        mut document: Document,
        upsert: bool,
    ) -> DocStoreResult<Vec<Value>> {
        self.check_available()?;

        let lock = self.lock(namespace);
        let _guard = lock.write();
        let collection = self.collection_for_write(namespace);
        let options = collection.options();

        match collection.find_matching(filter, true)?.into_iter().next() {
            Some((seq, existing)) => {
                if let Some(id) = existing.id() {
                    document.put_id_first(id.clone());
                }
                self.validate(&document, &options)?;
                let id = document.id().cloned().unwrap_or_default();
                collection.replace_at(seq, document);
                Ok(vec![id])
            }
            None if upsert => {
                let id = document.ensure_id();
                self.validate(&document, &options)?;
                collection.insert_all(vec![document]);
                Ok(vec![id])
            }
            None => Ok(Vec::new()),
        }
    }

    fn count(&self, namespace: &Namespace, filter: &Filter) -> DocStoreResult<u64> {
        self.check_available()?;

        match self.find_collection(namespace) {
            Some(collection) if is_all_filter(filter) => Ok(collection.len() as u64),
            Some(collection) => collection.count_matching(filter),
            None => Ok(0),
        }
    }

    fn open_cursor(
        &self,
        namespace: &Namespace,
        query: CursorQuery,
    ) -> DocStoreResult<CursorBatch> {
        self.check_available()?;

        let Some(collection) = self.find_collection(namespace) else {
            return Ok(CursorBatch::new(EXHAUSTED_CURSOR_ID, Vec::new()));
        };

        let batch_size = self.config.clamp_batch_size(query.batch_size);
        let mut cursor = ServerCursor::open(collection, query)?;
        let (documents, exhausted) = cursor.next_batch(batch_size)?;
        if exhausted {
            log::debug!(
                "Query on {} finished in the first batch of {}",
                namespace,
                documents.len()
            );
            return Ok(CursorBatch::new(EXHAUSTED_CURSOR_ID, documents));
        }

        let cursor_id = self.cursors.register(cursor);
        log::debug!("Opened cursor {} on {}", cursor_id, namespace);
        Ok(CursorBatch::new(cursor_id, documents))
    }

    fn get_more(&self, cursor_id: u64, batch_size: u32) -> DocStoreResult<CursorBatch> {
        self.check_available()?;

        let Some(cursor) = self.cursors.get(cursor_id) else {
            log::error!("Cursor {} is exhausted or does not exist", cursor_id);
            return Err(DocStoreError::new(
                &format!("Cursor {} is exhausted or does not exist", cursor_id),
                ErrorKind::CursorExhausted,
            ));
        };

        let batch_size = self.config.clamp_batch_size(batch_size);
        match cursor.write_with(|cursor| cursor.next_batch(batch_size)) {
            Ok((documents, true)) => {
                self.cursors.remove(cursor_id);
                log::debug!("Cursor {} exhausted", cursor_id);
                Ok(CursorBatch::new(EXHAUSTED_CURSOR_ID, documents))
            }
            Ok((documents, false)) => Ok(CursorBatch::new(cursor_id, documents)),
            Err(err) => {
                self.cursors.remove(cursor_id);
                log::error!("Cursor {} failed: {}", cursor_id, err);
                Err(err)
            }
        }
    }

    fn kill_cursor(&self, cursor_id: u64) -> DocStoreResult<()> {
        self.check_available()?;

        if self.cursors.remove(cursor_id) {
            log::debug!("Killed cursor {}", cursor_id);
        } else {
            log::warn!("Cursor {} is not open", cursor_id);
        }
        Ok(())
    }
}
