//! Type-safe identifiers for marketplace entities.
//!
//! Each identifier is a newtype wrapper around [`uuid::Uuid`] (v4) so that
//! an ad id can never be confused with a wallet or category id at a call
//! site. All five share the same surface, generated by `id_type!`.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Wraps an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for uuid::Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

id_type! {
    /// Unique identifier for an advertiser's ad (campaign record).
    ///
    /// Generated at ad creation and immutable thereafter. Used as the
    /// dictionary key in [`super::AdRegistry`], event discriminator, and
    /// WebSocket subscription target.
    AdId
}

id_type! {
    /// Unique identifier for a single [`super::WebsiteSelection`].
    SelectionId
}

id_type! {
    /// Unique identifier for a publisher-defined ad slot ([`super::Category`]).
    CategoryId
}

id_type! {
    /// Unique identifier for a publisher's website.
    WebsiteId
}

id_type! {
    /// Unique identifier for a party wallet in the [`super::WalletLedger`].
    WalletId
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        let a = AdId::new();
        let b = AdId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_uuid_format() {
        let id = SelectionId::new();
        let s = format!("{id}");
        assert_eq!(s.len(), 36); // UUID string length
        assert!(s.contains('-'));
    }

    #[test]
    fn serde_round_trip() {
        let id = WalletId::new();
        let json = serde_json::to_string(&id).ok();
        let Some(json) = json else {
            panic!("serialization failed");
        };
        let deserialized: WalletId = serde_json::from_str(&json).ok().unwrap_or_else(|| {
            panic!("deserialization failed");
        });
        assert_eq!(id, deserialized);
    }

    #[test]
    fn from_uuid_round_trip() {
        let uuid = uuid::Uuid::new_v4();
        let id = CategoryId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = CategoryId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }

    #[test]
    fn ids_are_distinct_types() {
        // Compile-time property: an AdId cannot be passed where a
        // WalletId is expected. This test only pins the runtime surface.
        let ad = AdId::default();
        let wallet = WalletId::default();
        assert_ne!(ad.as_uuid(), wallet.as_uuid());
    }
}
