use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR, MODIFIER_INC, MODIFIER_SET};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

/// A parsed update document.
///
/// Only two operators are understood:
///
/// * `$set: { path: value, .. }` assigns values, creating embedded documents
///   along dotted paths as needed;
/// * `$inc: { path: number, .. }` adds a number to the current value, or sets
///   it when the field is missing.
///
/// ```rust,ignore
/// let modifier = doc! { "$set": { status: "active" }, "$inc": { visits: 1 } };
/// collection.update(field("name").eq("Alice"), &modifier, UpdateOptions::default())?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Modifier {
    set: Document,
    inc: Document,
}

impl Modifier {
    /// Parses and checks a modifier document.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the document is empty, has a key other than
    /// `$set` or `$inc`, maps an operator to something other than a document,
    /// has a non-numeric `$inc` value or targets `_id`.
    pub fn parse(update: &Document) -> DocStoreResult<Modifier> {
        if update.is_empty() {
            log::error!("Modifier document is empty");
            return Err(DocStoreError::new(
                "Modifier document is empty",
                ErrorKind::ValidationError,
            ));
        }

        let mut set = Document::new();
        let mut inc = Document::new();
        for (operator, fields) in update.iter() {
            let target = match operator.as_str() {
                MODIFIER_SET => &mut set,
                MODIFIER_INC => &mut inc,
                other => {
                    log::error!("Unsupported modifier {}", other);
                    return Err(DocStoreError::new(
                        &format!("Unsupported modifier {}, only $set and $inc are allowed", other),
                        ErrorKind::ValidationError,
                    ));
                }
            };

            let Some(fields) = fields.as_document() else {
                log::error!("Modifier {} must map to a document", operator);
                return Err(DocStoreError::new(
                    &format!("Modifier {} must map to a document", operator),
                    ErrorKind::ValidationError,
                ));
            };

            for (path, value) in fields.iter() {
                Self::check_path(path)?;
                if operator == MODIFIER_INC && !value.is_number() {
                    log::error!("$inc value for {} is not numeric: {}", path, value);
                    return Err(DocStoreError::new(
                        &format!("$inc value for {} must be numeric", path),
                        ErrorKind::ValidationError,
                    ));
                }
                target.put(path.clone(), value.clone())?;
            }
        }

        Ok(Modifier { set, inc })
    }

    /// Applies the modifier to `document` in place.
    pub fn apply(&self, document: &mut Document) -> DocStoreResult<()> {
        for (path, value) in self.set.iter() {
            document.put_path(path, value.clone())?;
        }

        for (path, amount) in self.inc.iter() {
            let updated = match document.lookup(path) {
                None | Some(Value::Null) => amount.clone(),
                Some(current) if current.is_number() => add_numbers(current, amount)?,
                Some(current) => {
                    log::error!(
                        "Cannot increment {} holding a {} value",
                        path,
                        current.type_name()
                    );
                    return Err(DocStoreError::new(
                        &format!(
                            "Cannot increment {} holding a {} value",
                            path,
                            current.type_name()
                        ),
                        ErrorKind::ValidationError,
                    ));
                }
            };
            document.put_path(path, updated)?;
        }
        Ok(())
    }

    /// The document inserted by an upsert that matched nothing.
    pub fn to_upsert_document(&self) -> DocStoreResult<Document> {
        let mut document = Document::new();
        self.apply(&mut document)?;
        Ok(document)
    }

    fn check_path(path: &str) -> DocStoreResult<()> {
        if path == DOC_ID || path.starts_with(&format!("{}{}", DOC_ID, FIELD_SEPARATOR)) {
            log::error!("Modifier cannot change {}", DOC_ID);
            return Err(DocStoreError::new(
                "Modifier cannot change _id",
                ErrorKind::ValidationError,
            ));
        }

        if path.split(FIELD_SEPARATOR).any(|segment| segment.is_empty()) {
            log::error!("Modifier field path {} has an empty segment", path);
            return Err(DocStoreError::new(
                &format!("Modifier field path {} has an empty segment", path),
                ErrorKind::ValidationError,
            ));
        }
        Ok(())
    }
}

fn add_numbers(current: &Value, amount: &Value) -> DocStoreResult<Value> {
    if matches!(current, Value::F64(_)) || matches!(amount, Value::F64(_)) {
        let sum = current.as_f64().unwrap_or_default() + amount.as_f64().unwrap_or_default();
        return Ok(Value::F64(sum));
    }

    if let (Value::I32(a), Value::I32(b)) = (current, amount) {
        if let Some(sum) = a.checked_add(*b) {
            return Ok(Value::I32(sum));
        }
    }

    let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64()) else {
        log::error!("Cannot add {} and {}", current, amount);
        return Err(DocStoreError::new(
            &format!("Cannot add {} and {}", current, amount),
            ErrorKind::ValidationError,
        ));
    };

    match a.checked_add(b) {
        Some(sum) => Ok(Value::I64(sum)),
        None => {
            log::error!("Integer overflow while adding {} and {}", a, b);
            Err(DocStoreError::new(
                &format!("Integer overflow while adding {} and {}", a, b),
                ErrorKind::ValidationError,
            ))
        }
    }
}
