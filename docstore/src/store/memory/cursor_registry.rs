use crate::collection::Document;
use crate::common::{atomic, Atomic, SortOrder, SortableFields};
use crate::errors::DocStoreResult;
use crate::filter::Filter;
use crate::store::CursorQuery;
use dashmap::DashMap;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use super::InMemoryCollection;

/// Server-side state of an open cursor.
///
/// An unsorted cursor scans the collection lazily from `position` up to the
/// sequence snapshot taken when it was opened, so documents inserted later
/// are never returned. A sorted cursor has to see every match before it can
/// return the first one and keeps the sorted result instead.
pub(crate) struct ServerCursor {
    collection: InMemoryCollection,
    filter: Filter,
    projection: Option<Vec<String>>,
    position: u64,
    upper: u64,
    sorted: Option<VecDeque<Document>>,
    skip: u64,
    remaining: Option<u64>,
}

impl ServerCursor {
    pub(crate) fn open(
        collection: InMemoryCollection,
        query: CursorQuery,
    ) -> DocStoreResult<ServerCursor> {
        let upper = collection.snapshot();
        let mut cursor = ServerCursor {
            collection,
            filter: query.filter,
            projection: query.projection,
            position: 0,
            upper,
            sorted: None,
            skip: query.skip,
            remaining: query.limit,
        };

        if let Some(sort_by) = query.sort_by.filter(|s| !s.is_empty()) {
            cursor.sort(&sort_by)?;
        }
        Ok(cursor)
    }

    fn sort(&mut self, sort_by: &SortableFields) -> DocStoreResult<()> {
        let mut matched = Vec::new();
        for entry in self.collection.entries(self.position..self.upper) {
            if self.filter.apply(entry.value())? {
                matched.push(entry.value().clone());
            }
        }

        let limit = self.remaining.map_or(usize::MAX, |l| l as usize);
        let sorted = matched
            .into_iter()
            .sorted_by(|a, b| compare_documents(a, b, sort_by))
            .skip(self.skip as usize)
            .take(limit)
            .collect();

        self.sorted = Some(sorted);
        self.position = self.upper;
        self.skip = 0;
        self.remaining = None;
        Ok(())
    }

    /// Returns up to `batch_size` documents and whether the cursor has
    /// nothing left after them.
    pub(crate) fn next_batch(
        &mut self,
        batch_size: usize,
    ) -> DocStoreResult<(Vec<Document>, bool)> {
        if self.collection.is_dropped() {
            return Ok((Vec::new(), true));
        }

        if let Some(sorted) = self.sorted.as_mut() {
            let count = batch_size.min(sorted.len());
            let mut batch = Vec::with_capacity(count);
            for document in sorted.drain(..count) {
                batch.push(project(document, self.projection.as_deref())?);
            }
            return Ok((batch, sorted.is_empty()));
        }

        let mut batch = Vec::with_capacity(batch_size.min(1024));
        for entry in self.collection.entries(self.position..self.upper) {
            if batch.len() >= batch_size || self.remaining == Some(0) {
                return Ok((batch, self.remaining == Some(0)));
            }

            self.position = *entry.key() + 1;
            if !self.filter.apply(entry.value())? {
                continue;
            }
            if self.skip > 0 {
                self.skip -= 1;
                continue;
            }

            batch.push(project(entry.value().clone(), self.projection.as_deref())?);
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
            }
        }

        self.position = self.upper;
        Ok((batch, true))
    }
}

fn compare_documents(a: &Document, b: &Document, sort_by: &SortableFields) -> Ordering {
    for (field, order) in sort_by.sorting_order() {
        let ordering = a.get(field).cmp(&b.get(field));
        let ordering = match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Keeps `_id` and the listed fields, in projection order.
fn project(document: Document, projection: Option<&[String]>) -> DocStoreResult<Document> {
    let Some(fields) = projection else {
        return Ok(document);
    };

    let mut projected = Document::new();
    if let Some(id) = document.id() {
        projected.put_id_first(id.clone());
    }
    for field in fields {
        if let Some(value) = document.lookup(field) {
            projected.put_path(field, value.clone())?;
        }
    }
    Ok(projected)
}

/// Open cursors of a server by id. Ids start at 1 and are never reused.
#[derive(Clone, Default)]
pub(crate) struct CursorRegistry {
    inner: Arc<CursorRegistryInner>,
}

#[derive(Default)]
struct CursorRegistryInner {
    cursors: DashMap<u64, Atomic<ServerCursor>>,
    last_id: AtomicU64,
}

impl CursorRegistry {
    pub(crate) fn register(&self, cursor: ServerCursor) -> u64 {
        let cursor_id = self.inner.last_id.fetch_add(1, AtomicOrdering::Relaxed) + 1;
        self.inner.cursors.insert(cursor_id, atomic(cursor));
        cursor_id
    }

    pub(crate) fn get(&self, cursor_id: u64) -> Option<Atomic<ServerCursor>> {
        self.inner.cursors.get(&cursor_id).map(|entry| entry.value().clone())
    }

    pub(crate) fn remove(&self, cursor_id: u64) -> bool {
        self.inner.cursors.remove(&cursor_id).is_some()
    }

    pub(crate) fn clear(&self) {
        self.inner.cursors.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.cursors.len()
    }
}
