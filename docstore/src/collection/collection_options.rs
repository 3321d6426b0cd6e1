use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

/// How a client resolves a collection name that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionMode {
    /// Create the collection on first access.
    #[default]
    CreateIfMissing,
    /// Fail with `NotFound` when the collection does not exist.
    Strict,
}

/// Creation options of a collection.
///
/// A capped collection has a fixed byte budget and optionally a maximum
/// number of documents. Inserting into a full capped collection evicts the
/// oldest documents first.
///
/// ```rust,ignore
/// let options = CollectionOptions::new().capped(2000).max_documents(10);
/// let log = client.create_collection("log", options)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionOptions {
    capped: bool,
    size_limit: Option<usize>,
    max_documents: Option<usize>,
}

impl CollectionOptions {
    pub fn new() -> Self {
        CollectionOptions {
            capped: false,
            size_limit: None,
            max_documents: None,
        }
    }

    /// Makes the collection capped at `size_limit` bytes.
    pub fn capped(mut self, size_limit: usize) -> Self {
        self.capped = true;
        self.size_limit = Some(size_limit);
        self
    }

    pub fn max_documents(mut self, max_documents: usize) -> Self {
        self.max_documents = Some(max_documents);
        self
    }

    pub fn is_capped(&self) -> bool {
        self.capped
    }

    pub fn size_limit(&self) -> Option<usize> {
        self.size_limit
    }

    pub fn get_max_documents(&self) -> Option<usize> {
        self.max_documents
    }

    pub(crate) fn validate(&self) -> DocStoreResult<()> {
        if !self.capped && self.max_documents.is_some() {
            log::error!("max_documents requires a capped collection");
            return Err(DocStoreError::new(
                "max_documents requires a capped collection",
                ErrorKind::ValidationError,
            ));
        }

        if self.capped && self.size_limit == Some(0) {
            log::error!("Capped collection size must be greater than zero");
            return Err(DocStoreError::new(
                "Capped collection size must be greater than zero",
                ErrorKind::ValidationError,
            ));
        }

        if self.max_documents == Some(0) {
            log::error!("max_documents must be greater than zero");
            return Err(DocStoreError::new(
                "max_documents must be greater than zero",
                ErrorKind::ValidationError,
            ));
        }
        Ok(())
    }
}
