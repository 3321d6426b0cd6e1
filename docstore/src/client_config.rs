//! Configuration of a [DocStoreClient](crate::DocStoreClient).

use crate::collection::CollectionMode;
use crate::common::DEFAULT_BATCH_SIZE;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Client settings, shared by every clone.
///
/// Usually built through [ClientBuilder](crate::ClientBuilder):
///
/// ```rust,ignore
/// let client = DocStoreClient::builder()
///     .strict_mode(true)
///     .batch_size(500)
///     .connect(server, "test")?;
/// assert_eq!(client.config().batch_size(), 500);
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    inner: Arc<ClientConfigInner>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        ClientConfig {
            inner: Arc::new(ClientConfigInner::new()),
        }
    }

    /// Mode used by [DocStoreClient::collection](crate::DocStoreClient::collection).
    pub fn default_mode(&self) -> CollectionMode {
        self.inner.default_mode()
    }

    pub fn is_strict_mode(&self) -> bool {
        self.inner.strict_mode.load(Ordering::Relaxed)
    }

    /// In strict mode missing collections are never created implicitly.
    pub fn set_strict_mode(&self, strict: bool) {
        self.inner.strict_mode.store(strict, Ordering::Relaxed);
    }

    /// Number of documents a cursor asks the server for at a time.
    pub fn batch_size(&self) -> u32 {
        self.inner.batch_size.load(Ordering::Relaxed)
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if `batch_size` is zero.
    pub fn set_batch_size(&self, batch_size: u32) -> DocStoreResult<()> {
        self.inner.set_batch_size(batch_size)
    }
}

struct ClientConfigInner {
    strict_mode: AtomicBool,
    batch_size: AtomicU32,
}

impl ClientConfigInner {
    fn new() -> Self {
        ClientConfigInner {
            strict_mode: AtomicBool::new(false),
            batch_size: AtomicU32::new(DEFAULT_BATCH_SIZE),
        }
    }

    fn default_mode(&self) -> CollectionMode {
        if self.strict_mode.load(Ordering::Relaxed) {
            CollectionMode::Strict
        } else {
            CollectionMode::CreateIfMissing
        }
    }

    fn set_batch_size(&self, batch_size: u32) -> DocStoreResult<()> {
        if batch_size == 0 {
            log::error!("Batch size must be greater than zero");
            return Err(DocStoreError::new(
                "Batch size must be greater than zero",
                ErrorKind::ValidationError,
            ));
        }
        self.batch_size.store(batch_size, Ordering::Relaxed);
        Ok(())
    }
}
