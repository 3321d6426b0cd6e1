/// Reserved field holding a document's identity.
pub const DOC_ID: &str = "_id";

/// Separator for embedded field paths such as `address.city`.
pub const FIELD_SEPARATOR: &str = ".";

/// Prefix reserved for operators in query and modifier documents.
pub const OPERATOR_PREFIX: &str = "$";

// modifier operators
pub const MODIFIER_SET: &str = "$set";
pub const MODIFIER_INC: &str = "$inc";

// query operators
pub const OP_EQ: &str = "$eq";
pub const OP_NE: &str = "$ne";
pub const OP_GT: &str = "$gt";
pub const OP_GTE: &str = "$gte";
pub const OP_LT: &str = "$lt";
pub const OP_LTE: &str = "$lte";
pub const OP_IN: &str = "$in";
pub const OP_NIN: &str = "$nin";
pub const OP_REGEX: &str = "$regex";
pub const OP_AND: &str = "$and";
pub const OP_OR: &str = "$or";
pub const OP_NOT: &str = "$not";

/// Cursor id a server answers with once a cursor has no more results.
pub const EXHAUSTED_CURSOR_ID: u64 = 0;

pub const DEFAULT_BATCH_SIZE: u32 = 100;
pub const DEFAULT_MAX_BATCH_SIZE: u32 = 1000;
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 4 * 1024 * 1024;
