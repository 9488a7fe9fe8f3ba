//! Identifier types for activity tracker resources.
//!
//! Routes and targets are addressed by v4 UUIDs assigned by the service.
//!
//! # Macro-based ID Types
//!
//! The `uuid_id_type!` macro keeps serialization, parsing, and display
//! consistent across identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Macro to define a UUID-based identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `uuid::Uuid` with implementations for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`
/// - `Serialize`, `Deserialize` (as string)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`
///
/// # Example
///
/// ```ignore
/// uuid_id_type!(MyId, "A custom identifier type.");
/// let id = MyId::generate();
/// let parsed: MyId = id.to_string().parse().unwrap();
/// ```
macro_rules! uuid_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Create a new identifier from a UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Generate a new random identifier (primarily for testing).
            #[must_use]
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Return the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = uuid::Uuid::parse_str(s).map_err(|_| IdError::InvalidUuid {
                    kind: stringify!($name),
                    value: s.to_string(),
                })?;
                Ok(Self(uuid))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0.to_string()
            }
        }
    };
}

uuid_id_type!(RouteId, "A route identifier (v4 UUID assigned by the activity tracker).");
uuid_id_type!(TargetId, "A target identifier (v4 UUID assigned by the activity tracker).");

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is not a valid UUID.
    #[error("invalid {kind}: {value:?} is not a UUID")]
    InvalidUuid {
        /// Which identifier type was being parsed.
        kind: &'static str,
        /// The rejected input.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_id_roundtrip() {
        let id = RouteId::generate();
        let parsed = RouteId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn target_id_serde_json() {
        let id = TargetId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let parsed: TargetId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn rejects_non_uuid() {
        let err = "not-a-uuid".parse::<RouteId>().unwrap_err();
        assert_eq!(
            err,
            IdError::InvalidUuid {
                kind: "RouteId",
                value: "not-a-uuid".to_string(),
            }
        );
        assert!(serde_json::from_str::<TargetId>("\"nope\"").is_err());
    }

    #[test]
    fn debug_includes_type_name() {
        let uuid = uuid::Uuid::nil();
        let id = TargetId::from_uuid(uuid);
        assert_eq!(
            format!("{id:?}"),
            "TargetId(00000000-0000-0000-0000-000000000000)"
        );
    }
}
