use crate::common::{SortOrder, SortableFields};

/// Options that shape the result of a find operation.
///
/// Options compose fluently and can be started from one of the free
/// functions [order_by], [skip_by], [limit_to] or [project]:
///
/// ```rust,ignore
/// let options = order_by("age", SortOrder::Descending).skip(10).limit(5);
/// let cursor = collection.find_with_options(all(), options)?;
/// ```
///
/// Without a sort the results come back in insertion order.
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    pub(crate) sort_by: Option<SortableFields>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
    pub(crate) projection: Option<Vec<String>>,
    pub(crate) batch_size: Option<u32>,
}

pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions::new().sort_by(field_name, sort_order)
}

pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions::new().skip(skip)
}

pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions::new().limit(limit)
}

/// Keeps only the listed fields (and `_id`) in returned documents.
pub fn project(fields: &[&str]) -> FindOptions {
    FindOptions::new().projection(fields)
}

impl FindOptions {
    pub fn new() -> FindOptions {
        FindOptions {
            sort_by: None,
            skip: None,
            limit: None,
            projection: None,
            batch_size: None,
        }
    }

    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Adds a sort key. Earlier keys take precedence over later ones.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        let fields = self.sort_by.unwrap_or_default();
        self.sort_by = Some(fields.add_sorted_field(field_name.to_string(), sort_order));
        self
    }

    pub fn projection(mut self, fields: &[&str]) -> FindOptions {
        self.projection = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Number of documents fetched from the server per round trip. Overrides
    /// the client's configured batch size for this query.
    pub fn batch_size(mut self, batch_size: u32) -> FindOptions {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn get_skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn get_limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn get_sort_by(&self) -> Option<&SortableFields> {
        self.sort_by.as_ref()
    }

    pub fn get_projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    pub fn get_batch_size(&self) -> Option<u32> {
        self.batch_size
    }
}
