use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const INLINE_PREFIX: &str = "data:";

/// One image reference on a record. Exactly one of two forms: a durable
/// public URL on the blob store, or an inline data URI still waiting to be
/// uploaded. A record may hold a mix of both only until its next sync.
#[derive(Clone, PartialEq, Eq)]
pub enum Attachment {
    Remote(String),
    Inline(String),
}

impl Attachment {
    /// Classify a stored string by its `data:` prefix.
    pub fn from_string(s: String) -> Self {
        if s.starts_with(INLINE_PREFIX) {
            Self::Inline(s)
        } else {
            Self::Remote(s)
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(s) | Self::Inline(s) => s,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Remote(s) | Self::Inline(s) => s,
        }
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(s) => write!(f, "Remote({s})"),
            Self::Inline(s) => {
                // Inline payloads can be megabytes of base64
                let head: String = s.chars().take(32).collect();
                write!(f, "Inline({head}..., {} bytes)", s.len())
            }
        }
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_string(s))
    }
}
