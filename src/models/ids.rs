use std::fmt::Display;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Declares a UUID-backed identifier newtype.
///
/// Identifiers order by their UUID bytes, which gives every id type the
/// total order used for deterministic tie-breaking.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Uuid", into = "Uuid")]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID, rejecting the nil UUID
            pub fn parse(id: Uuid) -> AppResult<Self> {
                if id.is_nil() {
                    return Err(AppError::InvalidArgument(format!(
                        "{} id must not be nil",
                        $label
                    )));
                }
                Ok(Self(id))
            }
        }

        impl TryFrom<Uuid> for $name {
            type Error = AppError;

            fn try_from(id: Uuid) -> AppResult<Self> {
                Self::parse(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a song in the catalog
    SongId,
    "song"
);

define_id!(
    /// Identifier of a radio station
    StationId,
    "station"
);

define_id!(
    /// Opaque identity of a listener
    UserId,
    "user"
);
