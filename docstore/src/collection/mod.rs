//! Collections and the documents they hold.
//!
//! A [Document] is an ordered map from string keys to [Value](crate::common::Value)s.
//! Keys keep their insertion order and nested documents are reached with
//! dotted paths:
//!
//! ```rust
//! use docstore::doc;
//!
//! let mut document = doc! { name: "Alice", address: { city: "Paris" } };
//! document.put("age", 30).unwrap();
//! assert_eq!(document.get("address.city").as_str(), Some("Paris"));
//! ```
//!
//! A [DocStoreCollection] stores copies of documents. Anything implementing
//! [DocumentLike] can be inserted, including maps and key/value arrays:
//!
//! ```rust,ignore
//! collection.insert(doc! { a: 1 })?;
//! collection.insert([("a", 2)])?;
//! let cursor = collection.find(all())?;
//! ```

mod collection_options;
mod default_collection;
mod docstore_collection;
mod document;
mod document_like;
mod find_options;
mod id_generator;
mod object_id;
mod operation;
mod pk_injector;
mod update_options;

pub use collection_options::*;
pub(crate) use default_collection::*;
pub use docstore_collection::*;
pub use document::*;
pub use document_like::*;
pub use find_options::*;
pub(crate) use id_generator::*;
pub use object_id::*;
pub use operation::*;
pub use pk_injector::*;
pub use update_options::*;
