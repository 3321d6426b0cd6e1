use super::{
    CollectionMode, CollectionOptions, CollectionProvider, Document, FindOptions, Modifier,
    ObjectIdInjector, PkInjector, UpdateOptions, WriteResult,
};
use crate::client::ClientContext;
use crate::common::{atomic, Atomic, DocumentCursor, Value, WriteExecutor};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::{all, Filter};
use crate::store::{CursorQuery, Namespace};
use std::sync::Arc;

/// The collection handle handed out by [DocStoreClient](crate::DocStoreClient).
pub(crate) struct DefaultCollection {
    context: Arc<ClientContext>,
    namespace: Namespace,
    mode: CollectionMode,
    pk_injector: Atomic<Arc<dyn PkInjector>>,
}

impl DefaultCollection {
    pub(crate) fn new(
        context: Arc<ClientContext>,
        namespace: Namespace,
        mode: CollectionMode,
    ) -> Self {
        DefaultCollection {
            context,
            namespace,
            mode,
            pk_injector: atomic(Arc::new(ObjectIdInjector)),
        }
    }

    /// Runs the injector, then falls back to an `ObjectId` if the document
    /// still has no `_id`. Returns the document's `_id`.
    fn assign_id(&self, document: &mut Document) -> DocStoreResult<Value> {
        let injector = self.pk_injector.read().clone();
        if injector.inject_pk(document)? {
            log::debug!("Injected {} into a document for {}", injector.key(), self.namespace);
        }
        Ok(document.ensure_id())
    }

    fn ensure_accessible(&self) -> DocStoreResult<()> {
        self.context.check_open()?;

        if self.mode == CollectionMode::Strict
            && !self.context.server().has_collection(&self.namespace)?
        {
            log::error!("Collection {} does not exist", self.namespace);
            return Err(DocStoreError::new(
                &format!("Collection {} does not exist", self.namespace),
                ErrorKind::NotFound,
            ));
        }
        Ok(())
    }

    fn cursor_query(&self, filter: Filter, options: FindOptions) -> DocStoreResult<CursorQuery> {
        let batch_size = match options.batch_size {
            Some(0) => {
                log::error!("Batch size must be greater than zero");
                return Err(DocStoreError::new(
                    "Batch size must be greater than zero",
                    ErrorKind::ValidationError,
                ));
            }
            Some(batch_size) => batch_size,
            None => self.context.config().batch_size(),
        };

        Ok(CursorQuery {
            filter,
            sort_by: options.sort_by,
            skip: options.skip.unwrap_or(0),
            limit: options.limit,
            projection: options.projection,
            batch_size,
        })
    }
}

impl CollectionProvider for DefaultCollection {
    fn clear(&self) -> DocStoreResult<()> {
        self.ensure_accessible()?;
        self.context.server().clear(&self.namespace)
    }

    fn insert_document(&self, document: Document) -> DocStoreResult<WriteResult> {
        self.insert_documents(vec![document])
    }

    fn insert_documents(&self, mut documents: Vec<Document>) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        if documents.is_empty() {
            return Ok(WriteResult::default());
        }

        let ids = documents
            .iter_mut()
            .map(|document| self.assign_id(document))
            .collect::<DocStoreResult<Vec<_>>>()?;
        self.context.server().insert(&self.namespace, documents)?;
        Ok(WriteResult::new(ids))
    }

    fn find(&self, filter: Filter) -> DocStoreResult<DocumentCursor> {
        self.find_with_options(filter, FindOptions::default())
    }

    fn find_with_options(
        &self,
        filter: Filter,
        options: FindOptions,
    ) -> DocStoreResult<DocumentCursor> {
        self.ensure_accessible()?;
        let query = self.cursor_query(filter, options)?;
        Ok(DocumentCursor::new(self.context.clone(), self.namespace.clone(), query))
    }

    fn find_one(&self, filter: Filter) -> DocStoreResult<Option<Document>> {
        let mut cursor = self.find_with_options(filter, FindOptions::new().limit(1).batch_size(1))?;
        cursor.next().transpose()
    }

    fn count(&self) -> DocStoreResult<u64> {
        self.count_matching(all())
    }

    fn count_matching(&self, filter: Filter) -> DocStoreResult<u64> {
        self.ensure_accessible()?;
        self.context.server().count(&self.namespace, &filter)
    }

    fn remove(&self, filter: Filter) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        let ids = self.context.server().remove(&self.namespace, &filter, false)?;
        Ok(WriteResult::new(ids))
    }

    fn remove_one(&self, filter: Filter) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        let ids = self.context.server().remove(&self.namespace, &filter, true)?;
        Ok(WriteResult::new(ids))
    }

    fn update(
        &self,
        filter: Filter,
        modifier: &Document,
        options: UpdateOptions,
    ) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        let modifier = Modifier::parse(modifier)?;
        let ids = self
            .context
            .server()
            .update(&self.namespace, &filter, &modifier, options)?;
        Ok(WriteResult::new(ids))
    }

    fn replace(&self, filter: Filter, document: Document) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        let ids = self.context.server().replace(&self.namespace, &filter, document, false)?;
        Ok(WriteResult::new(ids))
    }

    fn upsert(&self, filter: Filter, mut document: Document) -> DocStoreResult<WriteResult> {
        self.ensure_accessible()?;
        self.assign_id(&mut document)?;
        let ids = self.context.server().replace(&self.namespace, &filter, document, true)?;
        Ok(WriteResult::new(ids))
    }

    fn options(&self) -> DocStoreResult<CollectionOptions> {
        self.ensure_accessible()?;
        let options = self.context.server().collection_options(&self.namespace)?;
        Ok(options.unwrap_or_default())
    }

    fn set_pk_injector(&self, injector: Arc<dyn PkInjector>) {
        self.pk_injector.write_with(|current| *current = injector);
    }

    fn name(&self) -> String {
        self.namespace.collection().to_string()
    }

    fn database_name(&self) -> String {
        self.namespace.database().to_string()
    }
}
