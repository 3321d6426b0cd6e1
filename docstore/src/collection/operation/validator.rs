use crate::collection::Document;
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR, OPERATOR_PREFIX};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

/// Checks that a document can be stored.
///
/// Every key, at any depth, must be non-empty, must not contain `.` and must
/// not start with `$`. `Unknown` values are rejected, `_id` may not be null or
/// an array, and the estimated size must not exceed `max_document_size`.
pub(crate) fn validate_document(
    document: &Document,
    max_document_size: usize,
) -> DocStoreResult<()> {
    if let Some(id) = document.id() {
        if id.is_null() || id.is_array() {
            log::error!("Document {} cannot be {}", DOC_ID, id.type_name());
            return Err(DocStoreError::new(
                &format!("Document {} cannot be {}", DOC_ID, id.type_name()),
                ErrorKind::ValidationError,
            ));
        }
    }

    validate_fields(document, "")?;

    let size = document.estimated_size();
    if size > max_document_size {
        log::error!("Document size {} exceeds the maximum of {} bytes", size, max_document_size);
        return Err(DocStoreError::new(
            &format!("Document size {} exceeds the maximum of {} bytes", size, max_document_size),
            ErrorKind::ValidationError,
        ));
    }
    Ok(())
}

fn validate_fields(document: &Document, parent: &str) -> DocStoreResult<()> {
    for (key, value) in document.iter() {
        validate_key(key, parent)?;
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{}{}{}", parent, FIELD_SEPARATOR, key)
        };
        validate_value(value, &path)?;
    }
    Ok(())
}

fn validate_value(value: &Value, path: &str) -> DocStoreResult<()> {
    match value {
        Value::Unknown => {
            log::error!("Field {} holds an unsupported value", path);
            Err(DocStoreError::new(
                &format!("Field {} holds an unsupported value", path),
                ErrorKind::ValidationError,
            ))
        }
        Value::Document(nested) => validate_fields(nested, path),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                validate_value(item, &format!("{}[{}]", path, index))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_key(key: &str, parent: &str) -> DocStoreResult<()> {
    let problem = if key.is_empty() {
        "is empty"
    } else if key.contains(FIELD_SEPARATOR) {
        "contains '.'"
    } else if key.starts_with(OPERATOR_PREFIX) {
        "starts with '$'"
    } else {
        return Ok(());
    };

    let location = if parent.is_empty() { "document root" } else { parent };
    log::error!("Field name {:?} under {} {}", key, location, problem);
    Err(DocStoreError::new(
        &format!("Field name {:?} under {} {}", key, location, problem),
        ErrorKind::ValidationError,
    ))
}
