//! Typed, schema-described views over a single raw mapping field on an
//! owning entity.
//!
//! ## Crate layout
//! - `core`: raw values, fields, packs, containers and the owner contract.
//! - `schema`: schema registration, aggregated validation and config.
//! - `error`: the public error with its kind + origin taxonomy.
//!
//! ```ignore
//! use packdoc::prelude::*;
//!
//! pack_schema! {
//!     pub struct UserPreferencesPack {
//!         pub use_stream_markers: BoolField =
//!             Field::new("usm").doc("Use stream markers?").with_default(false),
//!     }
//! }
//!
//! owner_schema! {
//!     impl User {
//!         preferences: SingleContainer<UserPreferencesPack> = SingleContainer::new("p"),
//!     }
//! }
//!
//! let prefs = User::preferences().get(&user)?;
//! UserPreferencesPack::schema().use_stream_markers.set(&prefs, true)?;
//! ```

pub use packdoc_core as core;
pub use packdoc_schema as schema;

pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use packdoc_core::{owner_schema, pack_schema};
pub use packdoc_schema::err;

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            container::{AutoIncrementPackMap, CollectionKey, PackMap},
            owner::Slot,
            pack::PackView,
            prelude::*,
        },
        owner_schema, pack_schema,
        schema::prelude::{Environment, PackConfig, Schema, SchemaBuilder},
    };
}

/// Compile the schema for `O` with the config read from the environment.
pub fn build_schema<O: packdoc_core::owner::OwnerSchema>() -> Result<schema::build::Schema, Error> {
    Ok(packdoc_schema::build_for_owner::<O>()?)
}
