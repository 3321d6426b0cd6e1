use crate::collection::Document;
use crate::common::Value;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// Anything that can be inserted into a collection as a document.
///
/// Implemented for [Document] itself and for the common map and pair-list
/// shapes with string keys. Pair lists and [IndexMap] keep their order,
/// [BTreeMap] yields sorted keys and [HashMap] has no defined order.
pub trait DocumentLike {
    fn into_document(self) -> DocStoreResult<Document>;
}

fn from_pairs<K, V, I>(pairs: I) -> DocStoreResult<Document>
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut document = Document::new();
    for (key, value) in pairs {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document key cannot be empty");
            return Err(DocStoreError::new(
                "Document key cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        document.put(key, value)?;
    }
    Ok(document)
}

impl DocumentLike for Document {
    fn into_document(self) -> DocStoreResult<Document> {
        Ok(self)
    }
}

impl DocumentLike for &Document {
    fn into_document(self) -> DocStoreResult<Document> {
        Ok(self.clone())
    }
}

impl<K: Into<String>, V: Into<Value>> DocumentLike for HashMap<K, V> {
    fn into_document(self) -> DocStoreResult<Document> {
        from_pairs(self)
    }
}

impl<K: Into<String>, V: Into<Value>> DocumentLike for BTreeMap<K, V> {
    fn into_document(self) -> DocStoreResult<Document> {
        from_pairs(self)
    }
}

impl<K: Into<String>, V: Into<Value>> DocumentLike for IndexMap<K, V> {
    fn into_document(self) -> DocStoreResult<Document> {
        from_pairs(self)
    }
}

impl<K: Into<String>, V: Into<Value>> DocumentLike for Vec<(K, V)> {
    fn into_document(self) -> DocStoreResult<Document> {
        from_pairs(self)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> DocumentLike for [(K, V); N] {
    fn into_document(self) -> DocStoreResult<Document> {
        from_pairs(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{doc, val};

    #[test]
    fn test_pairs_keep_order() {
        let document = vec![("b", 1), ("a", 2)].into_document().unwrap();
        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);

        let document = [("x", "1"), ("y", "2")].into_document().unwrap();
        assert_eq!(document.get("y"), val!("2"));
    }

    #[test]
    fn test_btree_map_is_sorted() {
        let mut map = BTreeMap::new();
        map.insert("z".to_string(), val!(1));
        map.insert("a".to_string(), val!(2));

        let document = map.into_document().unwrap();
        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys, vec!["a", "z"]);
    }

    #[test]
    fn test_hash_map() {
        let mut map = HashMap::new();
        map.insert("name", "Alice");
        let document = map.into_document().unwrap();
        assert_eq!(document, doc! { name: "Alice" });
    }

    #[test]
    fn test_index_map() {
        let mut map = IndexMap::new();
        map.insert("k2", 2);
        map.insert("k1", 1);
        let document = map.into_document().unwrap();
        assert_eq!(document.keys().next().map(|k| k.as_str()), Some("k2"));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = vec![("", 1)].into_document().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn test_document_reference_is_cloned() {
        let original = doc! { a: 1 };
        let copy = (&original).into_document().unwrap();
        assert_eq!(copy, original);
    }
}
