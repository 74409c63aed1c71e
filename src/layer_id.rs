//! Layer ids.
//!
//! A layer's id is the namespace for its durable state. Every cell a layer
//! registers is stored under `"<id>.<field>"`, so two layers may use the
//! same field name (`coal.buildFire`, `plastic.buildRefinery`) without
//! colliding in a save. The layer registry refuses a second layer with an
//! id already in use, which keeps the namespaces disjoint.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// Namespace of one layer's persistence keys.
///
/// # Examples
///
/// ```rust
/// use zzidle::LayerId;
///
/// let coal: LayerId = "coal".into();
/// assert_eq!(coal.key("activeFires"), "coal.activeFires");
/// assert_eq!(coal.field_of("coal.activeFires"), Some("activeFires"));
/// assert_eq!(coal.field_of("coalition.size"), None);
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct LayerId(Rc<str>);

impl LayerId {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self(Rc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The persistence key of `field` within this layer.
    pub fn key(&self, field: &str) -> String {
        format!("{}.{}", self.0, field)
    }

    /// The field part of `key` if the key belongs to this layer.
    pub fn field_of<'k>(&self, key: &'k str) -> Option<&'k str> {
        key.strip_prefix(self.as_str())?.strip_prefix('.')
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for LayerId {
    fn from(s: String) -> Self {
        Self(Rc::from(s))
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(LayerId::from)
    }
}
