//! Protocol identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::frame::ID_LEN;

/// 128-bit random identifier for requests, chats, stages and content.
///
/// Text frames carry the hyphenated UUID form; binary media frames carry the
/// 16 raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(Uuid);

impl Id {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Build an identifier from its raw byte form.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ID_LEN]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Build an identifier from a 128-bit integer.
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    /// Raw byte form, as used in binary frames.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ID_LEN] {
        self.0.as_bytes()
    }

    /// The identifier as a 128-bit integer.
    #[must_use]
    pub const fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<Id> for Uuid {
    fn from(value: Id) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_differ() {
        assert_ne!(Id::random(), Id::random());
    }

    #[test]
    fn byte_form_roundtrips() {
        let id = Id::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        assert_eq!(Id::from_bytes(*id.as_bytes()), id);
        assert_eq!(id.as_bytes()[0], 0x00);
        assert_eq!(id.as_bytes()[15], 0xff);
    }

    #[test]
    fn json_form_is_hyphenated_string() {
        let id = Id::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00112233-4455-6677-8899-aabbccddeeff\"");
        assert_eq!(id.to_string(), "00112233-4455-6677-8899-aabbccddeeff");
    }
}
