use candid::CandidType;
use derive_more::Display;
use packdoc_core::{
    error::{PackError, ValidationError},
    keyspace::KeySpaceError,
};
use packdoc_schema::{build::BuildError, config::ConfigError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(CandidType, Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }
}

impl From<PackError> for Error {
    fn from(err: PackError) -> Self {
        let message = err.to_string();

        match err {
            PackError::CacheConflict { .. } => {
                Self::new(ErrorKind::Internal, ErrorOrigin::Container, message)
            }
            PackError::Corrupt { .. } => Self::new(ErrorKind::Corrupt, ErrorOrigin::Field, message),
            PackError::CounterOverflow { .. } => {
                Self::new(ErrorKind::Unsupported, ErrorOrigin::Container, message)
            }
            PackError::DetachedEntry { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Container, message)
            }
            PackError::Json(_) | PackError::NotAMapping { .. } => {
                Self::new(ErrorKind::Corrupt, ErrorOrigin::Storage, message)
            }
            PackError::KeySpace(err) => err.into(),
            PackError::MissingEntry { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Container, message)
            }
            PackError::MissingField { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Field, message)
            }
            PackError::UnknownOwnerField { .. } => {
                Self::new(ErrorKind::NotFound, ErrorOrigin::Owner, message)
            }
            PackError::UnsupportedContainer { .. } => {
                Self::new(ErrorKind::Unsupported, ErrorOrigin::Container, message)
            }
            PackError::Validation(err) => err.into(),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Self::new(ErrorKind::Validation, ErrorOrigin::Field, err.to_string())
    }
}

impl From<KeySpaceError> for Error {
    fn from(err: KeySpaceError) -> Self {
        Self::new(ErrorKind::KeySpace, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Self {
        Self::new(ErrorKind::KeySpace, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<packdoc_schema::Error> for Error {
    fn from(err: packdoc_schema::Error) -> Self {
        match err {
            packdoc_schema::Error::BuildError(err) => err.into(),
            packdoc_schema::Error::ConfigError(err) => err.into(),
        }
    }
}

///
/// ErrorKind
/// What went wrong, independent of where.
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorKind {
    /// Configuration could not be loaded.
    Config,

    /// Stored data does not have the expected shape.
    Corrupt,

    /// The caller cannot remediate this.
    Internal,

    /// Two declarations claim the same storage key.
    KeySpace,

    /// A field, entry or owner field does not exist.
    NotFound,

    /// The operation is not available for this container.
    Unsupported,

    /// A candidate value was rejected before it was stored.
    Validation,
}

///
/// ErrorOrigin
///

#[derive(CandidType, Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[remain::sorted]
pub enum ErrorOrigin {
    Config,
    Container,
    Field,
    Owner,
    Schema,
    Storage,
}
