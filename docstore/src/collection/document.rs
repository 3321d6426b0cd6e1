use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::collection::ObjectId;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use std::cmp::Ordering;
use std::fmt::{Debug, Display};

type PathSplits<'a> = SmallVec<[&'a str; 8]>;

#[inline]
fn split_path(path: &str) -> PathSplits<'_> {
    path.split(FIELD_SEPARATOR).collect()
}

/// An ordered, string-keyed record of [Value]s.
///
/// Keys keep the order in which they were first put. Putting an existing key
/// replaces its value without moving it.
///
/// [Document::get] understands embedded paths: `"address.city"` reads the
/// `city` field of the nested `address` document, `"items.0"` reads the first
/// element of an array and `"items.name"` collects `name` from every document
/// in the `items` array.
///
/// The `_id` field holds the document's identity. Collections assign an
/// [ObjectId] when a document is inserted without one.
///
/// ```ignore
/// let mut doc = Document::new();
/// doc.put("name", "Alice")?;
/// doc.put("age", 30)?;
/// assert_eq!(doc.get("name"), Value::from("Alice"));
/// ```
#[derive(Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Document {
    data: IndexMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            data: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of top level entries.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Associates `value` with `key`.
    ///
    /// The key is stored as given; embedded paths are handled by
    /// [Document::put_path]. An existing key keeps its position.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if the key is empty.
    pub fn put<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> DocStoreResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        self.data.insert(key, value.into());
        Ok(())
    }

    /// Associates `value` with an embedded path, creating the intermediate
    /// documents that do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` for an empty path segment and
    /// `ValidationError` if an intermediate field holds something other than
    /// a document.
    pub fn put_path<V: Into<Value>>(&mut self, path: &str, value: V) -> DocStoreResult<()> {
        let splits = split_path(path);
        self.deep_put(&splits, value.into())
    }

    /// Returns the value at `key`, or [Value::Null] if there is none.
    ///
    /// `key` may be an embedded path.
    pub fn get(&self, key: &str) -> Value {
        match self.data.get(key) {
            Some(value) => value.clone(),
            None if key.contains(FIELD_SEPARATOR) => {
                let splits = split_path(key);
                recursive_get(self.data.get(splits[0]), &splits[1..])
            }
            None => Value::Null,
        }
    }

    /// Returns a reference to the value at `path`, following nested documents
    /// only.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        if let Some(value) = self.data.get(path) {
            return Some(value);
        }

        let splits = split_path(path);
        let (last, parents) = splits.split_last()?;
        let mut current = self;
        for key in parents {
            current = current.data.get(*key)?.as_document()?;
        }
        current.data.get(*last)
    }

    /// Returns the `_id` value, if the document has one.
    pub fn id(&self) -> Option<&Value> {
        self.data.get(DOC_ID)
    }

    /// Returns the `_id` as an [ObjectId] when it is one.
    pub fn object_id(&self) -> Option<ObjectId> {
        self.id().and_then(|id| id.as_object_id()).copied()
    }

    pub fn has_id(&self) -> bool {
        self.data.contains_key(DOC_ID)
    }

    /// Puts `_id` as the first field, moving it there if it already exists.
    pub(crate) fn put_id_first(&mut self, id: Value) {
        self.data.shift_insert(0, DOC_ID.to_string(), id);
    }

    /// Assigns a new [ObjectId] unless the document already has an `_id`, and
    /// returns the `_id`.
    pub(crate) fn ensure_id(&mut self) -> Value {
        match self.data.get(DOC_ID) {
            Some(id) => id.clone(),
            None => {
                let id = Value::ObjectId(ObjectId::new());
                self.put_id_first(id.clone());
                id
            }
        }
    }

    /// Removes a top level key, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.data.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Checks whether a top level or embedded field exists.
    pub fn contains_field(&self, field: &str) -> bool {
        self.lookup(field).is_some()
    }

    /// Top level keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    /// Top level entries in order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.data.iter()
    }

    /// Merges `other` into this document. Nested documents present on both
    /// sides are merged recursively; any other value from `other` wins.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (self.data.get_mut(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    existing.merge(incoming);
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    /// Approximate encoded size in bytes.
    pub fn estimated_size(&self) -> usize {
        let entries: usize = self
            .data
            .iter()
            .map(|(key, value)| key.len() + 2 + value.estimated_size())
            .sum();
        entries + 5
    }

    fn deep_put(&mut self, splits: &[&str], value: Value) -> DocStoreResult<()> {
        let Some((key, remaining)) = splits.split_first() else {
            log::error!("Empty embedded key");
            return Err(DocStoreError::new(
                "Empty embedded key",
                ErrorKind::InvalidOperation,
            ));
        };

        if remaining.is_empty() {
            return self.put(*key, value);
        }

        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(DocStoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        match self.data.get_mut(*key) {
            Some(Value::Document(nested)) => nested.deep_put(remaining, value),
            Some(Value::Null) | None => {
                let mut nested = Document::new();
                nested.deep_put(remaining, value)?;
                self.data.insert(key.to_string(), Value::Document(nested));
                Ok(())
            }
            Some(other) => {
                log::error!(
                    "Cannot set embedded field {} inside a {} value",
                    key,
                    other.type_name()
                );
                Err(DocStoreError::new(
                    &format!(
                        "Cannot set embedded field {} inside a {} value",
                        key,
                        other.type_name()
                    ),
                    ErrorKind::ValidationError,
                ))
            }
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }

        let indent_str = " ".repeat(indent + 2);
        let entries: Vec<String> = self
            .data
            .iter()
            .map(|(key, value)| {
                format!("{}{:?}: {}", indent_str, key, value.to_pretty_json(indent + 2))
            })
            .collect();
        format!("{{\n{}\n{}}}", entries.join(",\n"), " ".repeat(indent))
    }

    fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<(&String, &Value)> = self.data.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

fn recursive_get(value: Option<&Value>, splits: &[&str]) -> Value {
    let Some(value) = value else {
        return Value::Null;
    };

    let Some((key, remaining)) = splits.split_first() else {
        return value.clone();
    };

    match value {
        Value::Document(doc) => recursive_get(doc.data.get(*key), remaining),
        Value::Array(items) => match key.parse::<usize>() {
            Ok(index) => recursive_get(items.get(index), remaining),
            Err(_) => {
                // collect the field from every element of the array
                let values: Vec<Value> = items
                    .iter()
                    .map(|item| recursive_get(Some(item), splits))
                    .filter(|v| !v.is_null())
                    .collect();
                if values.is_empty() {
                    Value::Null
                } else {
                    Value::Array(values)
                }
            }
        },
        _ => Value::Null,
    }
}

impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for Document {}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sorted_entries().cmp(&other.sorted_entries())
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.data.iter()).finish()
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use docstore::doc;
///
/// let empty = doc!{};
///
/// let base = 100;
/// let person = doc!{
///     name: "Alice",
///     score: (base * 2),
///     address: {
///         city: "New York",
///         tags: ["home", "primary"]
///     }
/// };
/// assert_eq!(person.get("address.city").as_str(), Some("New York"));
/// ```
#[macro_export]
macro_rules! doc {
    ({}) => {
        $crate::collection::Document::new()
    };

    () => {
        $crate::collection::Document::new()
    };

    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::doc!($($key : $value),*)
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Converts one value position of the [doc!] macro.
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
