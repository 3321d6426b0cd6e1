use crate::client::ClientContext;
use crate::collection::Document;
use crate::common::EXHAUSTED_CURSOR_ID;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::store::{CursorBatch, CursorQuery, Namespace};
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::sync::Arc;

/// Lifecycle of a [DocumentCursor].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// The query has not been sent to the server yet.
    Created,
    /// At least one batch has been requested and more may follow.
    Iterating,
    /// No more documents will be returned. This state is permanent.
    Exhausted,
}

/// A lazy, forward-only sequence of query results.
///
/// The query is sent on the first call to [next](Iterator::next); results
/// then arrive in batches of at most [batch_size](DocumentCursor::batch_size)
/// documents, and only the current batch is held in memory. The result set is
/// bounded by the collection's content when the query was sent.
///
/// Once exhausted the cursor yields `None` forever, so iterating it a second
/// time produces nothing. [next_document](DocumentCursor::next_document)
/// reports the same condition as a `CursorExhausted` error. An error while
/// fetching a batch is yielded once, after which the cursor is exhausted.
///
/// Dropping a cursor before it is exhausted releases the server-side cursor.
///
/// ```rust,ignore
/// let mut cursor = collection.find(field("a").gt(1))?;
/// for document in cursor.by_ref() {
///     println!("{}", document?);
/// }
/// assert!(cursor.next().is_none());
/// ```
pub struct DocumentCursor {
    context: Arc<ClientContext>,
    namespace: Namespace,
    query: Option<CursorQuery>,
    batch_size: u32,
    buffer: VecDeque<Document>,
    cursor_id: u64,
    state: CursorState,
}

impl DocumentCursor {
    pub(crate) fn new(
        context: Arc<ClientContext>,
        namespace: Namespace,
        query: CursorQuery,
    ) -> Self {
        DocumentCursor {
            context,
            namespace,
            batch_size: query.batch_size,
            query: Some(query),
            buffer: VecDeque::new(),
            cursor_id: EXHAUSTED_CURSOR_ID,
            state: CursorState::Created,
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Id of the server-side cursor, `0` when none is open.
    pub fn cursor_id(&self) -> u64 {
        self.cursor_id
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Number of fetched documents not yet returned.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Whether another document is available, fetching the next batch if
    /// needed.
    pub fn has_next(&mut self) -> DocStoreResult<bool> {
        if self.state == CursorState::Exhausted {
            return Ok(false);
        }

        match self.fill() {
            Ok(()) => Ok(!self.buffer.is_empty()),
            Err(err) => {
                self.exhaust();
                Err(err)
            }
        }
    }

    /// Returns the next document.
    ///
    /// # Errors
    ///
    /// Returns `CursorExhausted` once every result has been returned, or the
    /// error that ended the iteration.
    pub fn next_document(&mut self) -> DocStoreResult<Document> {
        match self.next() {
            Some(result) => result,
            None => {
                log::error!("Cursor on {} is exhausted", self.namespace);
                Err(DocStoreError::new(
                    &format!("Cursor on {} is exhausted", self.namespace),
                    ErrorKind::CursorExhausted,
                ))
            }
        }
    }

    /// Stops the iteration and releases the server-side cursor.
    pub fn close(&mut self) -> DocStoreResult<()> {
        let result = self.release();
        self.exhaust();
        result
    }

    fn fill(&mut self) -> DocStoreResult<()> {
        self.context.check_open()?;

        if let Some(query) = self.query.take() {
            let batch = self.context.server().open_cursor(&self.namespace, query)?;
            self.state = CursorState::Iterating;
            self.accept(batch);
        }

        while self.buffer.is_empty() && self.cursor_id != EXHAUSTED_CURSOR_ID {
            let batch = self.context.server().get_more(self.cursor_id, self.batch_size)?;
            self.accept(batch);
        }
        Ok(())
    }

    fn accept(&mut self, batch: CursorBatch) {
        let previous = self.cursor_id;
        if batch.cursor_id != previous {
            if previous != EXHAUSTED_CURSOR_ID {
                self.context.untrack_cursor(previous);
            }
            if batch.cursor_id != EXHAUSTED_CURSOR_ID {
                self.context.track_cursor(batch.cursor_id);
            }
            self.cursor_id = batch.cursor_id;
        }

        log::debug!(
            "Cursor on {} received {} documents",
            self.namespace,
            batch.documents.len()
        );
        self.buffer.extend(batch.documents);
    }

    fn release(&mut self) -> DocStoreResult<()> {
        if self.cursor_id == EXHAUSTED_CURSOR_ID {
            return Ok(());
        }

        let cursor_id = self.cursor_id;
        self.cursor_id = EXHAUSTED_CURSOR_ID;
        self.context.untrack_cursor(cursor_id);
        if self.context.is_closed() {
            // closing the client already killed it
            return Ok(());
        }
        self.context.server().kill_cursor(cursor_id)
    }

    fn exhaust(&mut self) {
        self.context.untrack_cursor(self.cursor_id);
        self.cursor_id = EXHAUSTED_CURSOR_ID;
        self.query = None;
        self.buffer.clear();
        self.state = CursorState::Exhausted;
    }
}

impl Iterator for DocumentCursor {
    type Item = DocStoreResult<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == CursorState::Exhausted {
            return None;
        }

        if let Err(err) = self.fill() {
            self.exhaust();
            return Some(Err(err));
        }

        match self.buffer.pop_front() {
            Some(document) => Some(Ok(document)),
            None => {
                self.exhaust();
                None
            }
        }
    }
}

impl FusedIterator for DocumentCursor {}

impl Drop for DocumentCursor {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            log::warn!("Failed to release cursor on {}: {}", self.namespace, err);
        }
    }
}
