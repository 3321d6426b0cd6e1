use crate::common::Value;

/// The `_id`s of the documents touched by a write, in the order they were
/// written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteResult {
    ids: Vec<Value>,
}

impl WriteResult {
    pub fn new(ids: Vec<Value>) -> Self {
        Self { ids }
    }

    pub fn affected_ids(&self) -> &[Value] {
        &self.ids
    }

    pub fn affected_count(&self) -> usize {
        self.ids.len()
    }

    /// The first affected id, typically the one assigned by a single insert.
    pub fn first_id(&self) -> Option<&Value> {
        self.ids.first()
    }
}

impl IntoIterator for WriteResult {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}
