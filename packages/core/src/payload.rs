//! Wire units: Payload, PayloadList, PayloadMap.

use std::collections::BTreeMap;
use std::fmt;

use base64::Engine;
use bytes::Bytes;
use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::encoding::{Encoding, ENCODING_KEY, MESSAGE_TYPE_KEY};
use crate::{Error, Result};

/// One serialized value: metadata plus opaque data bytes.
///
/// The metadata always carries an [`ENCODING_KEY`] entry when produced by one
/// of the built-in converters; converters use it to recognize their own output.
///
/// # JSON form
///
/// `Payload` serializes to the JSON history shape used by the server, with
/// every metadata value and the data base64-encoded:
///
/// ```rust
/// use temporal_payload_core::{Encoding, Payload};
///
/// let payload = Payload::new(Encoding::JSON, &b"\"hi\""[..]);
/// let json = serde_json::to_value(&payload).unwrap();
///
/// assert_eq!(json["metadata"]["encoding"], "anNvbi9wbGFpbg==");
/// assert_eq!(json["data"], "ImhpIg==");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Payload {
    /// Metadata entries, ordered by key.
    pub metadata: BTreeMap<String, Bytes>,
    /// The encoded value.
    pub data: Bytes,
}

/// Ordered payloads, one per positional argument or result.
pub type PayloadList = Vec<Payload>;

impl Payload {
    /// Create a payload tagged with an encoding.
    pub fn new(encoding: Encoding, data: impl Into<Bytes>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            ENCODING_KEY.to_string(),
            Bytes::copy_from_slice(encoding.as_str().as_bytes()),
        );
        Self {
            metadata,
            data: data.into(),
        }
    }

    /// Add a metadata entry, replacing any previous value under `key`.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The encoding tag, if present and valid UTF-8.
    pub fn encoding(&self) -> Option<Encoding> {
        self.metadata_str(ENCODING_KEY).map(Encoding::new)
    }

    /// Check the encoding tag without allocating.
    pub fn has_encoding(&self, encoding: &Encoding) -> bool {
        self.metadata_str(ENCODING_KEY) == Some(encoding.as_str())
    }

    /// The protobuf message type name, if present.
    pub fn message_type(&self) -> Option<&str> {
        self.metadata_str(MESSAGE_TYPE_KEY)
    }

    /// A metadata value as UTF-8 text.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Encoding tag for error messages; `<none>` when missing.
    pub(crate) fn encoding_label(&self) -> String {
        self.metadata_str(ENCODING_KEY)
            .unwrap_or("<none>")
            .to_string()
    }
}

#[derive(Serialize, Deserialize)]
struct PayloadRepr {
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    #[serde(default)]
    data: String,
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let engine = base64::engine::general_purpose::STANDARD;
        let repr = PayloadRepr {
            metadata: self
                .metadata
                .iter()
                .map(|(k, v)| (k.clone(), engine.encode(v)))
                .collect(),
            data: engine.encode(&self.data),
        };
        repr.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let engine = base64::engine::general_purpose::STANDARD;
        let repr = PayloadRepr::deserialize(deserializer)?;

        let mut metadata = BTreeMap::new();
        for (key, value) in repr.metadata {
            let decoded = engine.decode(&value).map_err(|e| {
                de::Error::custom(format!("invalid base64 in metadata '{}': {}", key, e))
            })?;
            metadata.insert(key, Bytes::from(decoded));
        }
        let data = engine
            .decode(&repr.data)
            .map_err(|e| de::Error::custom(format!("invalid base64 in data: {}", e)))?;

        Ok(Payload {
            metadata,
            data: Bytes::from(data),
        })
    }
}

/// Payloads keyed by name, in insertion order.
///
/// Keys are non-empty and unique; comparison is exact (ordinal, case-sensitive).
/// This is the wire shape of memo and header style maps.
///
/// Two maps are equal only if they hold the same entries in the same order.
#[derive(Clone, Debug, Default)]
pub struct PayloadMap {
    entries: IndexMap<String, Payload>,
}

impl PayloadMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if `key` is empty or already present.
    pub fn insert(&mut self, key: impl Into<String>, payload: Payload) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_argument("payload map keys must not be empty"));
        }
        match self.entries.entry(key) {
            indexmap::map::Entry::Occupied(entry) => Err(Error::invalid_argument(format!(
                "duplicate payload map key '{}'",
                entry.key()
            ))),
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(payload);
                Ok(())
            }
        }
    }

    /// Look up a payload by key.
    pub fn get(&self, key: &str) -> Option<&Payload> {
        self.entries.get(key)
    }

    /// Position of a key in insertion order.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    /// Entry at a position.
    pub fn get_index(&self, index: usize) -> Option<(&str, &Payload)> {
        self.entries.get_index(index).map(|(k, p)| (k.as_str(), p))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Payload)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }
}

impl PartialEq for PayloadMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for PayloadMap {}

impl Serialize for PayloadMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, payload) in &self.entries {
            map.serialize_entry(key, payload)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PayloadMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PayloadMapVisitor;

        impl<'de> Visitor<'de> for PayloadMapVisitor {
            type Value = PayloadMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a map of payloads")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<PayloadMap, A::Error> {
                let mut map = PayloadMap {
                    entries: IndexMap::with_capacity(access.size_hint().unwrap_or(0).min(4096)),
                };
                while let Some((key, payload)) = access.next_entry::<String, Payload>()? {
                    map.insert(key, payload).map_err(de::Error::custom)?;
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(PayloadMapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;

    #[test]
    fn new_sets_encoding() {
        let payload = Payload::new(Encoding::RAW, vec![1u8, 2, 3]);
        assert!(payload.has_encoding(&Encoding::RAW));
        assert!(!payload.has_encoding(&Encoding::JSON));
        assert_eq!(payload.encoding(), Some(Encoding::RAW));
        assert_eq!(payload.data.as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn metadata_literal() {
        let payload = Payload {
            metadata: btree! {
                ENCODING_KEY.to_string() => Bytes::from_static(b"binary/plain"),
                "origin".to_string() => Bytes::from_static(b"replay"),
            },
            data: Bytes::from_static(b"\x00"),
        };
        assert_eq!(payload.encoding(), Some(Encoding::RAW));
        assert_eq!(payload.metadata_str("origin"), Some("replay"));
    }

    #[test]
    fn missing_encoding() {
        let payload = Payload::default();
        assert_eq!(payload.encoding(), None);
        assert_eq!(payload.encoding_label(), "<none>");
    }

    #[test]
    fn message_type_metadata() {
        let payload = Payload::new(Encoding::PROTOBUF, Bytes::new())
            .with_metadata(MESSAGE_TYPE_KEY, "temporal.api.common.v1.WorkflowType");
        assert_eq!(
            payload.message_type(),
            Some("temporal.api.common.v1.WorkflowType")
        );
    }

    #[test]
    fn json_form_roundtrip() {
        let payload = Payload::new(Encoding::JSON, &b"{\"a\":1}"[..]).with_metadata("x", "y");

        let text = serde_json::to_string(&payload).unwrap();
        let back: Payload = serde_json::from_str(&text).unwrap();

        assert_eq!(payload, back);
    }

    #[test]
    fn json_form_rejects_bad_base64() {
        let text = r#"{"metadata":{"encoding":"!!!"},"data":""}"#;
        let result: std::result::Result<Payload, _> = serde_json::from_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn map_preserves_insertion_order() {
        let mut map = PayloadMap::new();
        map.insert("zeta", Payload::new(Encoding::NULL, Bytes::new()))
            .unwrap();
        map.insert("alpha", Payload::new(Encoding::NULL, Bytes::new()))
            .unwrap();

        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(map.position("alpha"), Some(1));
    }

    #[test]
    fn map_rejects_duplicate_and_empty_keys() {
        let mut map = PayloadMap::new();
        map.insert("a", Payload::default()).unwrap();

        assert!(matches!(
            map.insert("a", Payload::default()),
            Err(Error::InvalidArgument { .. })
        ));
        assert!(matches!(
            map.insert("", Payload::default()),
            Err(Error::InvalidArgument { .. })
        ));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn map_keys_are_case_sensitive() {
        let mut map = PayloadMap::new();
        map.insert("Key", Payload::default()).unwrap();
        map.insert("key", Payload::default()).unwrap();

        assert_eq!(map.len(), 2);
        assert!(map.get("KEY").is_none());
    }

    #[test]
    fn map_equality_respects_order() {
        let mut ab = PayloadMap::new();
        ab.insert("a", Payload::new(Encoding::JSON, &b"1"[..])).unwrap();
        ab.insert("b", Payload::new(Encoding::JSON, &b"2"[..])).unwrap();

        let mut ba = PayloadMap::new();
        ba.insert("b", Payload::new(Encoding::JSON, &b"2"[..])).unwrap();
        ba.insert("a", Payload::new(Encoding::JSON, &b"1"[..])).unwrap();

        assert_ne!(ab, ba);
        assert_eq!(ab, ab.clone());
    }

    #[test]
    fn large_map_lookups_by_key_and_position() {
        let count = 20_000;
        let mut map = PayloadMap::new();
        for i in 0..count {
            let payload = Payload::new(Encoding::NULL, Bytes::new());
            map.insert(format!("key-{}", i), payload).unwrap();
        }
        assert_eq!(map.len(), count);

        for i in (0..count).step_by(997) {
            let key = format!("key-{}", i);
            assert_eq!(map.position(&key), Some(i));
            assert_eq!(map.get_index(i).map(|(k, _)| k), Some(key.as_str()));
            assert!(map.get(&key).is_some());
        }
        assert!(map.insert("key-0", Payload::default()).is_err());
    }

    #[test]
    fn map_json_rejects_duplicate_keys() {
        let text = r#"{"a":{"metadata":{},"data":""},"a":{"metadata":{},"data":""}}"#;
        let result: std::result::Result<PayloadMap, _> = serde_json::from_str(text);
        assert!(result.is_err());
    }

    #[test]
    fn map_json_roundtrip() {
        let mut map = PayloadMap::new();
        map.insert("b", Payload::new(Encoding::JSON, &b"1"[..]))
            .unwrap();
        map.insert("a", Payload::new(Encoding::JSON, &b"2"[..]))
            .unwrap();

        let text = serde_json::to_string(&map).unwrap();
        let back: PayloadMap = serde_json::from_str(&text).unwrap();

        assert_eq!(map, back);
    }
}
