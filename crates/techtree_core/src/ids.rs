//! Stable string identifiers used as registry keys.
//!
//! Registries are keyed by these identifiers instead of runtime type
//! identity, so a key means the same thing in every build and every data file.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a concrete item type (e.g. `"IronPlate"`).
    ItemKind
);

string_id!(
    /// Semantic tag attached to items (e.g. `"Lumber"`, `"Diggable"`).
    ItemTag
);

string_id!(
    /// Identifier of an entity type (e.g. `"SteamFrontLoader"`).
    EntityTypeId
);

string_id!(
    /// Identifier of a crafting station type recipes are filed under.
    StationKind
);

string_id!(
    /// Opaque skill identifier, resolved by the host's skill system.
    SkillKind
);

string_id!(
    /// Opaque talent identifier, resolved by the host's skill system.
    TalentKind
);
