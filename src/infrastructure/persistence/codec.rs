//! Binary record format shared by all store backends.
//!
//! Records are MessagePack maps with named fields, so fields can be added
//! without breaking existing data: unknown fields are ignored on decode and
//! missing optional fields take their defaults.

use crate::domain::entities::Mapping;
use crate::domain::entities::mapping::is_template;
use crate::domain::repositories::StoreError;
use serde::{Deserialize, Serialize};

const RECORD_KIND: &str = "mapping";

#[derive(Debug, Serialize, Deserialize)]
struct MappingRecord {
    #[serde(rename = "type")]
    kind: String,
    key: String,
    dest: String,
    #[serde(default)]
    perm: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    comment: Option<String>,
}

/// Serializes a mapping. `is_template` is not persisted.
pub fn encode(mapping: &Mapping) -> Result<Vec<u8>, StoreError> {
    let record = MappingRecord {
        kind: RECORD_KIND.to_string(),
        key: mapping.key.clone(),
        dest: mapping.destination.clone(),
        perm: mapping.permanent,
        comment: mapping.comment.clone(),
    };

    rmp_serde::to_vec_named(&record).map_err(|e| StoreError::Codec {
        key: mapping.key.clone(),
        reason: e.to_string(),
    })
}

/// Deserializes a stored payload. An empty payload decodes to `None`.
///
/// `key` is the storage key and is only used in error messages.
pub fn decode(key: &str, bytes: &[u8]) -> Result<Option<Mapping>, StoreError> {
    if bytes.is_empty() {
        return Ok(None);
    }

    let record: MappingRecord = rmp_serde::from_slice(bytes).map_err(|e| StoreError::Codec {
        key: key.to_string(),
        reason: e.to_string(),
    })?;

    if record.kind != RECORD_KIND {
        return Err(StoreError::Codec {
            key: key.to_string(),
            reason: format!("unexpected record type `{}`", record.kind),
        });
    }

    Ok(Some(Mapping {
        is_template: is_template(&record.dest),
        key: record.key,
        destination: record.dest,
        permanent: record.perm,
        comment: record.comment,
    }))
}

/// Whether a stored payload counts as a mapping: non-empty and decodable.
///
/// Counting operations use this so their totals agree with `list`.
pub fn is_listed(key: &str, bytes: &[u8]) -> bool {
    matches!(decode(key, bytes), Ok(Some(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct FutureRecord<'a> {
        #[serde(rename = "type")]
        kind: &'a str,
        key: &'a str,
        dest: &'a str,
        hits: u64,
    }

    #[test]
    fn test_roundtrip_preserves_fields() {
        let mapping = Mapping::new("/t", "/?key={{ .Key }}", true).with_comment("tmpl");
        let decoded = decode("/t", &encode(&mapping).unwrap()).unwrap().unwrap();

        assert_eq!(decoded, mapping);
        assert!(decoded.is_template);
    }

    #[test]
    fn test_empty_payload_is_absent() {
        assert!(decode("/missing", &[]).unwrap().is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let bytes = rmp_serde::to_vec_named(&FutureRecord {
            kind: "mapping",
            key: "/a",
            dest: "/b",
            hits: 42,
        })
        .unwrap();

        let decoded = decode("/a", &bytes).unwrap().unwrap();
        assert_eq!(decoded, Mapping::new("/a", "/b", false));
    }

    #[test]
    fn test_wrong_record_type_is_rejected() {
        let bytes = rmp_serde::to_vec_named(&FutureRecord {
            kind: "alias",
            key: "/a",
            dest: "/b",
            hits: 0,
        })
        .unwrap();

        assert!(matches!(
            decode("/a", &bytes),
            Err(StoreError::Codec { .. })
        ));
    }

    #[test]
    fn test_is_listed_skips_empty_and_unreadable() {
        let bytes = encode(&Mapping::new("/a", "/b", false)).unwrap();

        assert!(is_listed("/a", &bytes));
        assert!(!is_listed("/a", &[]));
        assert!(!is_listed("/a", b"not msgpack"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(matches!(
            decode("/a", b"not msgpack"),
            Err(StoreError::Codec { .. })
        ));
    }
}
