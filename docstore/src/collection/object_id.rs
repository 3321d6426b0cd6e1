use crate::common::secs_to_date_time;
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::ID_GENERATOR;
use chrono::{DateTime, Utc};
use itertools::Itertools;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display};
use std::str::FromStr;

static INVALID_HEX_ERROR: Lazy<DocStoreError> = Lazy::new(|| {
    DocStoreError::new(
        "ObjectId validation error: expected 24 hexadecimal characters",
        ErrorKind::InvalidId,
    )
});

/// A 12 byte document identifier.
///
/// The first four bytes hold the creation time in seconds. The rest is a
/// machine identifier, a process identifier and a per-second counter, so ids
/// generated in one process are unique and sort in generation order.
///
/// Collections assign a new `ObjectId` to every inserted document that has no
/// `_id` field.
///
/// # Examples
///
/// ```rust
/// use docstore::collection::ObjectId;
///
/// let id = ObjectId::new();
/// let parsed: ObjectId = id.to_hex().parse().unwrap();
/// assert_eq!(id, parsed);
/// ```
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectId {
    bytes: [u8; 12],
}

impl ObjectId {
    /// Generates a new unique `ObjectId`.
    pub fn new() -> Self {
        ObjectId {
            bytes: ID_GENERATOR.next_bytes(),
        }
    }

    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        ObjectId { bytes }
    }

    pub fn bytes(&self) -> [u8; 12] {
        self.bytes
    }

    /// Parses the 24 character hexadecimal form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidId` if the input has the wrong length or a
    /// non-hexadecimal character.
    pub fn parse_str(hex: &str) -> DocStoreResult<ObjectId> {
        if hex.len() != 24 || !hex.is_ascii() {
            log::error!("Invalid object id {}", hex);
            return Err(INVALID_HEX_ERROR.clone());
        }

        let mut bytes = [0u8; 12];
        for (index, byte) in bytes.iter_mut().enumerate() {
            let pair = &hex[index * 2..index * 2 + 2];
            *byte = u8::from_str_radix(pair, 16).map_err(|_| {
                log::error!("Invalid object id {}", hex);
                INVALID_HEX_ERROR.clone()
            })?;
        }
        Ok(ObjectId { bytes })
    }

    /// Lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{:02x}", b)).join("")
    }

    /// Creation time encoded in the id.
    pub fn timestamp(&self) -> DateTime<Utc> {
        let secs = u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]]);
        secs_to_date_time(secs)
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for ObjectId {
    type Err = DocStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
    }
}

impl Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Debug for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::current_time_secs;

    #[test]
    fn test_new_ids_are_unique() {
        let first = ObjectId::new();
        let second = ObjectId::new();
        assert_ne!(first, second);
    }

    #[test]
    fn test_hex_form() {
        let id = ObjectId::from_bytes([
            0x50, 0x7f, 0x1f, 0x77, 0xbc, 0xf8, 0x6c, 0xd7, 0x99, 0x43, 0x90, 0x11,
        ]);
        assert_eq!(id.to_hex(), "507f1f77bcf86cd799439011");
        assert_eq!(id.to_string(), "507f1f77bcf86cd799439011");
        assert_eq!(format!("{:?}", id), "ObjectId(507f1f77bcf86cd799439011)");
    }

    #[test]
    fn test_parse_str() {
        let id = ObjectId::parse_str("507F1F77BCF86CD799439011").unwrap();
        assert_eq!(id.bytes()[0], 0x50);
        assert_eq!(id.bytes()[11], 0x11);

        let parsed: ObjectId = "507f1f77bcf86cd799439011".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_parse_str_rejects_bad_input() {
        for input in [
            "",
            "507f1f77",
            "507f1f77bcf86cd79943901z",
            "507f1f77bcf86cd7994390110",
            "é07f1f77bcf86cd79943901",
        ] {
            let err = ObjectId::parse_str(input).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidId);
        }
    }

    #[test]
    fn test_timestamp() {
        let before = current_time_secs() as i64;
        let id = ObjectId::new();
        let secs = id.timestamp().timestamp();
        assert!(secs >= before);
        assert!(secs <= current_time_secs() as i64);
    }

    #[test]
    fn test_ordering_follows_bytes() {
        let low = ObjectId::from_bytes([0; 12]);
        let high = ObjectId::from_bytes([0xFF; 12]);
        assert!(low < high);
    }
}
