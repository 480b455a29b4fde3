//! Schema compilation for PackDoc: explicit registration of pack and owner
//! schemas, aggregated key-space validation, and deployment config.

pub mod build;
pub mod config;
pub mod error;
pub mod validate;

use crate::{build::BuildError, config::ConfigError};
use thiserror::Error as ThisError;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        build::{Schema, SchemaBuilder},
        config::{Environment, PackConfig},
        err,
        error::ErrorTree,
    };
}

///
/// Error
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    BuildError(#[from] BuildError),

    #[error(transparent)]
    ConfigError(#[from] ConfigError),
}

/// Build a schema for `O` with the environment's config, the common
/// startup path for a single owning type.
pub fn build_for_owner<O: packdoc_core::owner::OwnerSchema>()
-> Result<build::Schema, Error> {
    let config = config::PackConfig::from_env()?;

    Ok(build::SchemaBuilder::new(config)
        .register_owner::<O>()
        .build()?)
}
