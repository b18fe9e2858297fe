//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Players and groups are resolved by external collaborators (the server's
//! player registry and the team plugin); this engine only ever carries their
//! identifiers. Strong typing prevents a player id from being used where a
//! group id is expected -- the resource scan cache in particular is keyed
//! per group, and mixing the two would silently break teammate sharing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player requesting an unlock cost.
    PlayerId
}

define_id! {
    /// Unique identifier for a team/group that owns chunks.
    ///
    /// Solo players are modelled as a group of one; the team resolver
    /// decides the mapping.
    GroupId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let player = PlayerId::new();
        let group = GroupId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_ne!(player.into_inner(), Uuid::nil());
        assert_ne!(group.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = PlayerId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<PlayerId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert!(restored.is_ok());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = GroupId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
