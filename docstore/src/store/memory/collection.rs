use crate::collection::{validate_document, CollectionOptions, Document};
use crate::errors::DocStoreResult;
use crate::filter::Filter;
use crate::store::Namespace;
use crossbeam_skiplist::map::Entry;
use crossbeam_skiplist::SkipMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Documents of one collection, keyed by insertion sequence.
///
/// Sequences start at 1 and are never reused, so iterating the map yields
/// documents in insertion order and a cursor can bound its scan by the
/// sequence current when it was opened. Mutating methods expect the caller to
/// hold the namespace write lock.
#[derive(Clone)]
pub(crate) struct InMemoryCollection {
    inner: Arc<InMemoryCollectionInner>,
}

impl InMemoryCollection {
    pub(crate) fn new(namespace: Namespace, options: CollectionOptions) -> Self {
        InMemoryCollection {
            inner: Arc::new(InMemoryCollectionInner {
                namespace,
                options,
                documents: SkipMap::new(),
                sequence: AtomicU64::new(1),
                total_size: AtomicUsize::new(0),
                dropped: AtomicBool::new(false),
            }),
        }
    }

    pub(crate) fn namespace(&self) -> &Namespace {
        &self.inner.namespace
    }

    pub(crate) fn options(&self) -> CollectionOptions {
        self.inner.options
    }

    pub(crate) fn is_dropped(&self) -> bool {
        self.inner.dropped.load(Ordering::Acquire)
    }

    pub(crate) fn mark_dropped(&self) {
        self.inner.dropped.store(true, Ordering::Release);
        self.inner.documents.clear();
        self.inner.total_size.store(0, Ordering::Relaxed);
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.documents.len()
    }

    pub(crate) fn total_size(&self) -> usize {
        self.inner.total_size.load(Ordering::Relaxed)
    }

    /// Exclusive upper bound of the sequences assigned so far.
    pub(crate) fn snapshot(&self) -> u64 {
        self.inner.sequence.load(Ordering::Acquire)
    }

    pub(crate) fn entries(
        &self,
        range: Range<u64>,
    ) -> impl Iterator<Item = Entry<'_, u64, Document>> + '_ {
        self.inner.documents.range(range)
    }

    pub(crate) fn insert_all(&self, documents: Vec<Document>) {
        for document in documents {
            let seq = self.inner.sequence.fetch_add(1, Ordering::AcqRel);
            self.inner.total_size.fetch_add(document.estimated_size(), Ordering::Relaxed);
            self.inner.documents.insert(seq, document);
        }
        self.evict_if_capped();
    }

    /// Matching documents with their sequences, in insertion order.
    pub(crate) fn find_matching(
        &self,
        filter: &Filter,
        just_one: bool,
    ) -> DocStoreResult<Vec<(u64, Document)>> {
        let mut matched = Vec::new();
        for entry in self.inner.documents.iter() {
            if filter.apply(entry.value())? {
                matched.push((*entry.key(), entry.value().clone()));
                if just_one {
                    break;
                }
            }
        }
        Ok(matched)
    }

    pub(crate) fn count_matching(&self, filter: &Filter) -> DocStoreResult<u64> {
        let mut count = 0;
        for entry in self.inner.documents.iter() {
            if filter.apply(entry.value())? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Overwrites the document stored under `seq`, keeping its position.
    pub(crate) fn replace_at(&self, seq: u64, document: Document) {
        let new_size = document.estimated_size();
        if let Some(old) = self.inner.documents.get(&seq) {
            self.inner.total_size.fetch_sub(old.value().estimated_size(), Ordering::Relaxed);
        }
        self.inner.total_size.fetch_add(new_size, Ordering::Relaxed);
        self.inner.documents.insert(seq, document);
    }

    pub(crate) fn remove_at(&self, seq: u64) -> bool {
        match self.inner.documents.remove(&seq) {
            Some(entry) => {
                self.inner.total_size.fetch_sub(entry.value().estimated_size(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&self) {
        self.inner.documents.clear();
        self.inner.total_size.store(0, Ordering::Relaxed);
    }

    /// Checks the stored documents and the bookkeeping around them. Returns
    /// a description of every problem found.
    pub(crate) fn validate(&self, max_document_size: usize) -> Vec<String> {
        let mut problems = Vec::new();
        let mut total_size = 0usize;
        let sequence = self.snapshot();

        for entry in self.inner.documents.iter() {
            let (seq, document) = (*entry.key(), entry.value());
            total_size += document.estimated_size();

            if seq >= sequence {
                problems.push(format!("document {} is beyond the sequence {}", seq, sequence));
            }
            if !document.has_id() {
                problems.push(format!("document {} has no _id", seq));
            }
            if let Err(err) = validate_document(document, max_document_size) {
                problems.push(format!("document {}: {}", seq, err));
            }
        }

        if total_size != self.total_size() {
            problems.push(format!(
                "recorded size {} but documents hold {}",
                self.total_size(),
                total_size
            ));
        }

        let options = &self.inner.options;
        if options.get_max_documents().is_some_and(|max| self.len() > max) {
            problems.push(format!("{} documents exceed the cap", self.len()));
        }
        if options.size_limit().is_some_and(|limit| total_size > limit) {
            problems.push(format!("{} bytes exceed the cap", total_size));
        }
        problems
    }

    fn evict_if_capped(&self) {
        let options = &self.inner.options;
        if !options.is_capped() {
            return;
        }

        let over_limit = |collection: &Self| {
            options.get_max_documents().is_some_and(|max| collection.len() > max)
                || options.size_limit().is_some_and(|limit| collection.total_size() > limit)
        };

        let mut evicted = 0usize;
        while over_limit(self) {
            match self.inner.documents.pop_front() {
                Some(entry) => {
                    self.inner
                        .total_size
                        .fetch_sub(entry.value().estimated_size(), Ordering::Relaxed);
                    evicted += 1;
                }
                None => break,
            }
        }

        if evicted > 0 {
            log::debug!(
                "Evicted {} documents from capped collection {}",
                evicted,
                self.inner.namespace
            );
        }
    }
}

struct InMemoryCollectionInner {
    namespace: Namespace,
    options: CollectionOptions,
    documents: SkipMap<u64, Document>,
    sequence: AtomicU64,
    total_size: AtomicUsize,
    dropped: AtomicBool,
}
