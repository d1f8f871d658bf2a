//! Encoding tags written into payload metadata.

use std::borrow::Cow;
use std::fmt;

use crate::value::ValueKind;

/// Metadata key holding the encoding tag of a payload.
pub const ENCODING_KEY: &str = "encoding";

/// Metadata key holding the full type name of a protobuf message payload.
pub const MESSAGE_TYPE_KEY: &str = "messageType";

/// The encoding tag of a payload.
///
/// Every converter writes its own fixed tag under [`ENCODING_KEY`] when it
/// serializes, and checks for that tag before it agrees to deserialize.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Encoding(pub Cow<'static, str>);

impl Encoding {
    /// A null reference (`binary/null`). Carries no data.
    pub const NULL: Encoding = Encoding(Cow::Borrowed("binary/null"));

    /// Raw bytes stored verbatim (`binary/plain`).
    pub const RAW: Encoding = Encoding(Cow::Borrowed("binary/plain"));

    /// Protobuf binary wire format (`binary/protobuf`).
    pub const PROTOBUF: Encoding = Encoding(Cow::Borrowed("binary/protobuf"));

    /// Protobuf canonical JSON (`json/protobuf`).
    pub const PROTOBUF_JSON: Encoding = Encoding(Cow::Borrowed("json/protobuf"));

    /// UTF-8 JSON text (`json/plain`).
    pub const JSON: Encoding = Encoding(Cow::Borrowed("json/plain"));

    /// Create an encoding from a static string.
    pub const fn from_static(s: &'static str) -> Self {
        Encoding(Cow::Borrowed(s))
    }

    /// Create an encoding from an owned string.
    pub fn new(s: impl Into<String>) -> Self {
        Encoding(Cow::Owned(s.into()))
    }

    /// Get the tag string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value shape this tag is produced for, if it is one of the
    /// well-known tags.
    pub fn kind(&self) -> Option<ValueKind> {
        if self == &Self::NULL {
            Some(ValueKind::Null)
        } else if self == &Self::RAW {
            Some(ValueKind::Bytes)
        } else if self == &Self::PROTOBUF || self == &Self::PROTOBUF_JSON {
            Some(ValueKind::Message)
        } else if self == &Self::JSON {
            Some(ValueKind::Json)
        } else {
            None
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&'static str> for Encoding {
    fn from(s: &'static str) -> Self {
        Encoding(Cow::Borrowed(s))
    }
}

impl From<String> for Encoding {
    fn from(s: String) -> Self {
        Encoding(Cow::Owned(s))
    }
}

impl AsRef<str> for Encoding {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
