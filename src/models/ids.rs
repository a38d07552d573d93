//! Newtype wrapper for movement identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, immutable identifier of a movement.
///
/// Identifiers produced by [`MovementId::generate`] are random UUIDs;
/// identifiers read from legacy exports are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovementId(String);

impl MovementId {
    /// Creates an identifier from the given string.
    #[inline]
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    /// Generates a fresh identifier, unique with overwhelming probability.
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns a reference to the inner string.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner string.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for MovementId {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for MovementId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MovementId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_differ() {
        let first = MovementId::generate();
        let second = MovementId::generate();
        assert_ne!(first, second);
        assert_eq!(first.as_inner().len(), 36);
    }

    #[test]
    fn serializes_transparently() {
        let id = MovementId::new("id1700000000123".to_owned());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""id1700000000123""#);
        let back: MovementId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_and_conversions() {
        let id = MovementId::from("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.clone().into_inner(), "abc");
        assert_eq!(MovementId::from("abc".to_owned()), id);
    }
}
