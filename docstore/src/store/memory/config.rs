use crate::common::{DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_DOCUMENT_SIZE};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// Limits of an [InMemoryServer](super::InMemoryServer).
///
/// Requested batch sizes are clamped to `1..=max_batch_size`.
#[derive(Clone)]
pub struct InMemoryServerConfig {
    inner: Arc<InMemoryServerConfigInner>,
}

impl InMemoryServerConfig {
    pub fn new() -> InMemoryServerConfig {
        InMemoryServerConfig {
            inner: Arc::new(InMemoryServerConfigInner::new()),
        }
    }

    pub fn with_max_document_size(self, max_document_size: usize) -> Self {
        self.inner.max_document_size.store(max_document_size, Ordering::Relaxed);
        self
    }

    pub fn with_max_batch_size(self, max_batch_size: u32) -> Self {
        self.inner.max_batch_size.store(max_batch_size.max(1), Ordering::Relaxed);
        self
    }

    pub fn max_document_size(&self) -> usize {
        self.inner.max_document_size.load(Ordering::Relaxed)
    }

    pub fn max_batch_size(&self) -> u32 {
        self.inner.max_batch_size.load(Ordering::Relaxed)
    }

    pub(crate) fn clamp_batch_size(&self, requested: u32) -> usize {
        requested.clamp(1, self.max_batch_size()) as usize
    }
}

impl Default for InMemoryServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

struct InMemoryServerConfigInner {
    max_document_size: AtomicUsize,
    max_batch_size: AtomicU32,
}

impl InMemoryServerConfigInner {
    fn new() -> InMemoryServerConfigInner {
        InMemoryServerConfigInner {
            max_document_size: AtomicUsize::new(DEFAULT_MAX_DOCUMENT_SIZE),
            max_batch_size: AtomicU32::new(DEFAULT_MAX_BATCH_SIZE),
        }
    }
}
