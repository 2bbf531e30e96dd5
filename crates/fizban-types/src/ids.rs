//! Strongly-typed identifiers.
//!
//! Actors and locations are named by the game side (`Player`,
//! `RainbowBridge`, ...), so their identifiers wrap a [`String`]. Records
//! minted by the backend itself (travel log entries) use UUID v7 so they
//! sort by creation time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around a game-side [`String`] name.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a name.
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            /// Borrow the underlying name.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the name is empty or only whitespace.
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
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
    };
}

define_name! {
    /// Name of an actor tracked by the world (usually `Player`).
    ActorId
}

define_name! {
    /// Name of a location (node in the travel graph).
    LocationId
}

define_id! {
    /// Unique identifier for a committed journey in the travel log.
    TravelId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_serialize_as_plain_strings() {
        let id = LocationId::from("RainbowBridge");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"RainbowBridge\""));
    }

    #[test]
    fn blank_names_detected() {
        assert!(ActorId::from("  ").is_blank());
        assert!(!ActorId::from("Player").is_blank());
    }
}
