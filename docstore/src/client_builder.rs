use crate::client::DocStoreClient;
use crate::client_config::ClientConfig;
use crate::errors::{DocStoreError, DocStoreResult};
use crate::store::DocStoreServer;

/// Builder for a [DocStoreClient].
///
/// Configuration errors are kept and reported by [connect](ClientBuilder::connect),
/// so a chain of settings never has to be interrupted.
///
/// # Examples
///
/// ```rust
/// use docstore::store::InMemoryServer;
/// use docstore::DocStoreClient;
///
/// let client = DocStoreClient::builder()
///     .batch_size(10)
///     .connect(InMemoryServer::new(), "test")
///     .unwrap();
/// assert_eq!(client.config().batch_size(), 10);
///
/// let result = DocStoreClient::builder()
///     .batch_size(0)
///     .connect(InMemoryServer::new(), "test");
/// assert!(result.is_err());
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    error: Option<DocStoreError>,
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder {
            error: None,
            config: ClientConfig::new(),
        }
    }

    /// When enabled, [DocStoreClient::collection] fails with `NotFound` for
    /// collections that do not exist yet.
    pub fn strict_mode(self, strict: bool) -> Self {
        self.config.set_strict_mode(strict);
        self
    }

    /// Default number of documents a cursor fetches per round trip. Must be
    /// greater than zero.
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_batch_size(batch_size) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Connects to `database` on `server` with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error, or `ConnectionError` if the
    /// database name is invalid or the server is unreachable.
    pub fn connect<S: Into<DocStoreServer>>(
        self,
        server: S,
        database: &str,
    ) -> DocStoreResult<DocStoreClient> {
        if let Some(error) = self.error {
            return Err(error);
        }
        DocStoreClient::open(server.into(), database, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionMode;
    use crate::errors::ErrorKind;
    use crate::store::InMemoryServer;

    #[test]
    fn test_default_builder() {
        let client = ClientBuilder::new().connect(InMemoryServer::new(), "test").unwrap();
        assert_eq!(client.config().batch_size(), 100);
        assert_eq!(client.config().default_mode(), CollectionMode::CreateIfMissing);
    }

    #[test]
    fn test_strict_mode() {
        let client = ClientBuilder::new()
            .strict_mode(true)
            .connect(InMemoryServer::new(), "test")
            .unwrap();
        assert_eq!(client.config().default_mode(), CollectionMode::Strict);
    }

    #[test]
    fn test_first_error_is_reported() {
        let result = ClientBuilder::new()
            .batch_size(0)
            .batch_size(10)
            .connect(InMemoryServer::new(), "test");
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn test_connect_checks_database_name() {
        let result = ClientBuilder::new().connect(InMemoryServer::new(), "bad.name");
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::ConnectionError);
    }
}
