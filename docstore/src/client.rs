use crate::client_builder::ClientBuilder;
use crate::client_config::ClientConfig;
use crate::collection::{CollectionMode, CollectionOptions, DefaultCollection, DocStoreCollection};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::store::{DocStoreServer, Namespace};
use dashmap::DashSet;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A logical connection to one database on a document store server.
///
/// Clones share the connection. Collection handles and cursors obtained from
/// a client stop working once any clone is [closed](DocStoreClient::close).
///
/// # Examples
///
/// ```rust
/// use docstore::doc;
/// use docstore::filter::all;
/// use docstore::store::InMemoryServer;
/// use docstore::DocStoreClient;
///
/// let client = DocStoreClient::connect(InMemoryServer::new(), "test").unwrap();
/// let collection = client.collection("t1").unwrap();
/// collection.clear().unwrap();
/// collection.insert(doc! { a: 1 }).unwrap();
/// collection.insert([("a", 2)]).unwrap();
///
/// let values: Vec<i32> = collection
///     .find(all())
///     .unwrap()
///     .map(|doc| doc.unwrap().get("a").as_i32().unwrap())
///     .collect();
/// assert_eq!(values, vec![1, 2]);
/// ```
#[derive(Clone)]
pub struct DocStoreClient {
    inner: Arc<ClientContext>,
}

impl DocStoreClient {
    /// Connects to `database` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionError` if the database name is invalid or the server
    /// is unreachable.
    pub fn connect<S: Into<DocStoreServer>>(
        server: S,
        database: &str,
    ) -> DocStoreResult<DocStoreClient> {
        ClientBuilder::new().connect(server, database)
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn open(
        server: DocStoreServer,
        database: &str,
        config: ClientConfig,
    ) -> DocStoreResult<DocStoreClient> {
        validate_database_name(database)?;

        if !server.is_available() {
            log::error!("Cannot connect to database {}: server is unreachable", database);
            return Err(DocStoreError::new(
                &format!("Cannot connect to database {}: server is unreachable", database),
                ErrorKind::ConnectionError,
            ));
        }

        log::info!("Connected to database {}", database);
        Ok(DocStoreClient {
            inner: Arc::new(ClientContext::new(server, database, config)),
        })
    }

    /// Returns a handle to the collection `name` using the configured default
    /// mode.
    pub fn collection(&self, name: &str) -> DocStoreResult<DocStoreCollection> {
        self.collection_with_mode(name, self.inner.config.default_mode())
    }

    /// Returns a handle to the collection `name`.
    ///
    /// # Errors
    ///
    /// * `ValidationError` if the name is invalid.
    /// * `NotFound` if `mode` is [CollectionMode::Strict] and the collection
    ///   does not exist.
    pub fn collection_with_mode(
        &self,
        name: &str,
        mode: CollectionMode,
    ) -> DocStoreResult<DocStoreCollection> {
        self.inner.check_open()?;
        validate_collection_name(name)?;

        let namespace = self.inner.namespace(name);
        match mode {
            CollectionMode::Strict => {
                if !self.inner.server.has_collection(&namespace)? {
                    log::error!("Collection {} does not exist", namespace);
                    return Err(DocStoreError::new(
                        &format!("Collection {} does not exist", namespace),
                        ErrorKind::NotFound,
                    ));
                }
            }
            CollectionMode::CreateIfMissing => {
                self.inner.server.create_collection(&namespace, CollectionOptions::default())?;
            }
        }

        Ok(DocStoreCollection::new(DefaultCollection::new(
            self.inner.clone(),
            namespace,
            mode,
        )))
    }

    /// Creates the collection `name` with `options` and returns a handle to
    /// it.
    ///
    /// If the collection already exists its options are left unchanged and a
    /// handle is returned, unless the client is in strict mode, where this
    /// fails with `ValidationError`.
    pub fn create_collection(
        &self,
        name: &str,
        options: CollectionOptions,
    ) -> DocStoreResult<DocStoreCollection> {
        self.inner.check_open()?;
        validate_collection_name(name)?;

        let namespace = self.inner.namespace(name);
        let created = self.inner.server.create_collection(&namespace, options)?;
        let mode = self.inner.config.default_mode();
        if !created && mode == CollectionMode::Strict {
            log::error!("Collection {} already exists", namespace);
            return Err(DocStoreError::new(
                &format!("Collection {} already exists", namespace),
                ErrorKind::ValidationError,
            ));
        }

        Ok(DocStoreCollection::new(DefaultCollection::new(
            self.inner.clone(),
            namespace,
            mode,
        )))
    }

    /// Names of every database on the server that holds a collection, sorted.
    pub fn database_names(&self) -> DocStoreResult<Vec<String>> {
        self.inner.check_open()?;
        let mut names = self.inner.server.database_names()?;
        names.sort();
        Ok(names)
    }

    /// Names of the collections in this database, sorted.
    pub fn collection_names(&self) -> DocStoreResult<Vec<String>> {
        self.inner.check_open()?;
        let mut names = self.inner.server.collection_names(&self.inner.database)?;
        names.sort();
        Ok(names)
    }

    /// Asks the server to check a collection's stored data. Returns `false`
    /// for a missing or damaged collection.
    pub fn validate_collection(&self, name: &str) -> DocStoreResult<bool> {
        self.inner.check_open()?;
        validate_collection_name(name)?;
        self.inner.server.validate_collection(&self.inner.namespace(name))
    }

    pub fn has_collection(&self, name: &str) -> DocStoreResult<bool> {
        self.inner.check_open()?;
        validate_collection_name(name)?;
        self.inner.server.has_collection(&self.inner.namespace(name))
    }

    /// Drops the collection `name`. Dropping a missing collection does
    /// nothing.
    pub fn drop_collection(&self, name: &str) -> DocStoreResult<()> {
        self.inner.check_open()?;
        validate_collection_name(name)?;
        self.inner.server.drop_collection(&self.inner.namespace(name))?;
        Ok(())
    }

    /// Drops every collection of this database.
    pub fn drop_database(&self) -> DocStoreResult<()> {
        self.inner.check_open()?;
        self.inner.server.drop_database(&self.inner.database)
    }

    /// Closes the connection and kills the server cursors it still holds.
    /// Closing twice does nothing.
    pub fn close(&self) -> DocStoreResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn database_name(&self) -> &str {
        &self.inner.database
    }

    pub fn config(&self) -> ClientConfig {
        self.inner.config.clone()
    }
}

impl Debug for DocStoreClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocStoreClient")
            .field("database", &self.inner.database)
            .field("closed", &self.inner.is_closed())
            .finish()
    }
}

/// Connection state shared by a client and every handle and cursor created
/// from it.
pub(crate) struct ClientContext {
    server: DocStoreServer,
    database: String,
    config: ClientConfig,
    closed: AtomicBool,
    open_cursors: DashSet<u64>,
}

impl ClientContext {
    fn new(server: DocStoreServer, database: &str, config: ClientConfig) -> Self {
        ClientContext {
            server,
            database: database.to_string(),
            config,
            closed: AtomicBool::new(false),
            open_cursors: DashSet::new(),
        }
    }

    pub(crate) fn server(&self) -> &DocStoreServer {
        &self.server
    }

    pub(crate) fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn namespace(&self, collection: &str) -> Namespace {
        Namespace::new(&self.database, collection)
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn check_open(&self) -> DocStoreResult<()> {
        if self.is_closed() {
            log::error!("Client for database {} is closed", self.database);
            return Err(DocStoreError::new(
                &format!("Client for database {} is closed", self.database),
                ErrorKind::InvalidOperation,
            ));
        }
        Ok(())
    }

    pub(crate) fn track_cursor(&self, cursor_id: u64) {
        self.open_cursors.insert(cursor_id);
    }

    pub(crate) fn untrack_cursor(&self, cursor_id: u64) {
        self.open_cursors.remove(&cursor_id);
    }

    #[cfg(test)]
    fn open_cursor_count(&self) -> usize {
        self.open_cursors.len()
    }

    fn close(&self) -> DocStoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let cursor_ids: Vec<u64> = self.open_cursors.iter().map(|id| *id).collect();
        self.open_cursors.clear();
        if self.server.is_available() {
            for cursor_id in cursor_ids {
                if let Err(err) = self.server.kill_cursor(cursor_id) {
                    log::warn!("Failed to kill cursor {} while closing: {}", cursor_id, err);
                }
            }
        }

        log::info!("Closed client for database {}", self.database);
        Ok(())
    }
}

const INVALID_DATABASE_CHARS: [char; 5] = ['.', '/', '\\', '$', '"'];

fn validate_database_name(name: &str) -> DocStoreResult<()> {
    let invalid = name.is_empty()
        || name.chars().any(|c| c.is_whitespace() || INVALID_DATABASE_CHARS.contains(&c));
    if invalid {
        log::error!("Invalid database name '{}'", name);
        return Err(DocStoreError::new(
            &format!("Invalid database name '{}'", name),
            ErrorKind::ConnectionError,
        ));
    }
    Ok(())
}

fn validate_collection_name(name: &str) -> DocStoreResult<()> {
    let invalid = name.is_empty()
        || name.contains('$')
        || name.starts_with('.')
        || name.ends_with('.');
    if invalid {
        log::error!("Invalid collection name '{}'", name);
        return Err(DocStoreError::new(
            &format!("Invalid collection name '{}'", name),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}
