/// Options for [update](crate::collection::CollectionProvider::update).
///
/// By default only the first matching document is updated and nothing is
/// inserted when there is no match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOptions {
    upsert: bool,
    multi: bool,
}

impl UpdateOptions {
    pub fn new(upsert: bool, multi: bool) -> Self {
        Self { upsert, multi }
    }

    /// Insert a document built from the modifier when nothing matches.
    pub fn is_upsert(&self) -> bool {
        self.upsert
    }

    /// Update every matching document instead of the first one.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }

    pub fn multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }
}

pub fn upsert() -> UpdateOptions {
    UpdateOptions::new(true, false)
}

pub fn multi() -> UpdateOptions {
    UpdateOptions::new(false, true)
}
