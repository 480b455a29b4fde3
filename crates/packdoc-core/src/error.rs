use crate::{container::ContainerKind, keyspace::KeySpaceError};
use thiserror::Error as ThisError;

///
/// ValidationError
///
/// Raised synchronously from `Field::set` when a candidate value is rejected.
/// The backing mapping is left untouched.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ValidationError {
    #[error("cannot coerce value for field: {key} value: {value}")]
    Coercion { key: &'static str, value: String },

    #[error("validation failed for field: {key} value: {value} ({reason})")]
    Failed {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("null value not permitted for field: {key}")]
    NullNotPermitted { key: &'static str },
}

impl ValidationError {
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Coercion { key, .. } | Self::Failed { key, .. } | Self::NullNotPermitted { key } => {
                key
            }
        }
    }
}

///
/// PackError
///
/// Runtime failures of the pack layer: field writes, container access,
/// owner storage handling and copies.
///

#[derive(Debug, ThisError)]
#[remain::sorted]
pub enum PackError {
    #[error("cached value for pack_key={pack_key} on field={field_name} has a different schema")]
    CacheConflict {
        field_name: &'static str,
        pack_key: &'static str,
    },

    #[error("stored value for field: {key} cannot be decoded (found {found})")]
    Corrupt { key: &'static str, found: &'static str },

    #[error("auto-increment counter exhausted in container pack_key={pack_key}")]
    CounterOverflow { pack_key: &'static str },

    #[error("entry at '{path}' was removed from its container")]
    DetachedEntry { path: String },

    #[error("invalid owner storage json: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    KeySpace(#[from] KeySpaceError),

    #[error("no entry with key={key} in container pack_key={pack_key}")]
    MissingEntry { pack_key: &'static str, key: String },

    #[error("no stored value for field: {key}")]
    MissingField { key: &'static str },

    #[error("expected a mapping at '{path}', found {found}")]
    NotAMapping { path: String, found: &'static str },

    #[error("owner has no raw field named '{field_name}'")]
    UnknownOwnerField { field_name: &'static str },

    #[error("copy is not supported for {kind} container pack_key={pack_key}")]
    UnsupportedContainer {
        kind: ContainerKind,
        pack_key: &'static str,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl PackError {
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    #[must_use]
    pub const fn is_missing_entry(&self) -> bool {
        matches!(self, Self::MissingEntry { .. })
    }

    #[must_use]
    pub const fn is_detached_entry(&self) -> bool {
        matches!(self, Self::DetachedEntry { .. })
    }
}
