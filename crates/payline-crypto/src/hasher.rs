use payline_types::ContentHash;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// SHA-256 content hasher.
///
/// Every hash in the audit trail goes through here: record content hashes
/// and Merkle parents alike. There is no domain tag; a Merkle parent is the
/// plain digest of its children's hex strings so roots can be recomputed by
/// any SHA-256 implementation.
pub struct ContentHasher;

impl ContentHasher {
    /// Hash raw bytes.
    pub fn digest(data: &[u8]) -> ContentHash {
        ContentHash::from_hash(Sha256::digest(data).into())
    }

    /// Hash the UTF-8 bytes of a string.
    pub fn digest_str(text: &str) -> ContentHash {
        Self::digest(text.as_bytes())
    }

    /// Canonical JSON encoding of a serializable value.
    ///
    /// Object keys are sorted by byte order at every depth and the output
    /// is compact. Numbers keep `serde_json`'s formatting: integers bare,
    /// floats in shortest round-trip form with a fractional part (`100.0`).
    pub fn canonical_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, HasherError> {
        let value =
            serde_json::to_value(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        serde_json::to_vec(&sort_keys(value)).map_err(|e| HasherError::Serialization(e.to_string()))
    }

    /// Hash the canonical JSON encoding of a serializable value.
    pub fn hash_canonical_json<T: serde::Serialize>(value: &T) -> Result<ContentHash, HasherError> {
        Ok(Self::digest(&Self::canonical_json(value)?))
    }

    /// Verify that data produces the expected hash.
    pub fn verify(data: &[u8], expected: &ContentHash) -> bool {
        Self::digest(data) == *expected
    }
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key, sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_answers() {
        assert_eq!(
            ContentHasher::digest(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            ContentHasher::digest_str("abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn hash_is_deterministic() {
        assert_eq!(
            ContentHasher::digest(b"hello world"),
            ContentHasher::digest(b"hello world")
        );
    }

    #[test]
    fn verify_correct_and_tampered_data() {
        let hash = ContentHasher::digest(b"payload");
        assert!(ContentHasher::verify(b"payload", &hash));
        assert!(!ContentHasher::verify(b"tampered", &hash));
    }

    #[test]
    fn canonical_json_sorts_keys_recursively() {
        let value = serde_json::json!({"b": 1, "a": {"z": [ {"y": 2, "x": 1} ], "c": 0.5}});
        let bytes = ContentHasher::canonical_json(&value).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"a":{"c":0.5,"z":[{"x":1,"y":2}]},"b":1}"#
        );
    }

    #[test]
    fn canonical_json_ignores_field_declaration_order() {
        #[derive(serde::Serialize)]
        struct Forward {
            alpha: u32,
            beta: &'static str,
        }
        #[derive(serde::Serialize)]
        struct Reverse {
            beta: &'static str,
            alpha: u32,
        }
        let a = ContentHasher::hash_canonical_json(&Forward { alpha: 7, beta: "x" }).unwrap();
        let b = ContentHasher::hash_canonical_json(&Reverse { beta: "x", alpha: 7 }).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn canonical_json_float_formatting() {
        let bytes = ContentHasher::canonical_json(&serde_json::json!([100.0, 1, 0.1])).unwrap();
        assert_eq!(bytes, b"[100.0,1,0.1]");
    }

    #[test]
    fn non_finite_floats_encode_as_null() {
        let a = ContentHasher::canonical_json(&f64::NAN).unwrap();
        assert_eq!(a, b"null");
    }
}
