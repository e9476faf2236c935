//! Identities of overlay entities.
//!
//! Callers name entities with strings such as `"device_42"`. The namespace (the
//! segment before the first `_`) groups entities for bulk operations; the whole
//! string identifies one entity. The string is parsed once at the API boundary
//! into an [`EntityKey`] so no registry ever splits strings again.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Separator between namespace and local id
pub const KEY_SEPARATOR: char = '_';

/// How a registry key names the bucket it lives in
pub trait RegistryKey: Clone + Eq + Hash + fmt::Display {
    fn namespace(&self) -> &str;
}

/// Full identity of one marker, popup or polygon group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    namespace: String,
    /// `None` when the caller id has no separator, so `"device"` and `"device_"` differ
    local_id: Option<String>,
}

impl EntityKey {
    pub fn new(namespace: impl Into<String>, local_id: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_id: Some(local_id.into()),
        }
    }

    /// A key for an id without a separator
    pub fn bare(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local_id: None,
        }
    }

    /// Splits a caller id at its first separator. Empty ids have no identity.
    pub fn parse(unique_id: &str) -> Option<Self> {
        if unique_id.is_empty() {
            return None;
        }

        Some(match unique_id.split_once(KEY_SEPARATOR) {
            Some((namespace, local_id)) => Self::new(namespace, local_id),
            None => Self::bare(unique_id),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.local_id {
            Some(local_id) => write!(f, "{}{}{}", self.namespace, KEY_SEPARATOR, local_id),
            None => f.write_str(&self.namespace),
        }
    }
}

impl RegistryKey for EntityKey {
    fn namespace(&self) -> &str {
        &self.namespace
    }
}

/// A caller-chosen label that is its own namespace
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeLabel(String);

impl TypeLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl RegistryKey for TypeLabel {
    fn namespace(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TypeLabel {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_at_first_separator() {
        let key = EntityKey::parse("device_42_b").unwrap();
        assert_eq!(key.namespace(), "device");
        assert_eq!(key.local_id(), Some("42_b"));
        assert_eq!(key.to_string(), "device_42_b");
    }

    #[test]
    fn test_parse_without_separator() {
        let key = EntityKey::parse("station").unwrap();
        assert_eq!(key.namespace(), "station");
        assert_eq!(key.local_id(), None);
        assert_eq!(key.to_string(), "station");
    }

    #[test]
    fn test_trailing_separator_is_a_distinct_key() {
        let bare = EntityKey::parse("device").unwrap();
        let trailing = EntityKey::parse("device_").unwrap();

        assert_ne!(bare, trailing);
        assert_eq!(trailing.namespace(), "device");
        assert_eq!(trailing.local_id(), Some(""));
        assert_eq!(trailing.to_string(), "device_");
    }

    #[test]
    fn test_empty_id_has_no_identity() {
        assert!(EntityKey::parse("").is_none());
    }

    #[test]
    fn test_label_is_its_own_namespace() {
        let label = TypeLabel::from("warehouses");
        assert_eq!(RegistryKey::namespace(&label), "warehouses");
    }
}
