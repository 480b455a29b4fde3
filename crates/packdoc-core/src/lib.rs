//! Core runtime for PackDoc: raw values, typed fields, pack flyweights,
//! containers, and the per-owner pack cache.
#![warn(unreachable_pub)]

#[macro_use]
mod macros;

pub mod choices;
pub mod container;
pub mod error;
pub mod field;
pub mod keyspace;
pub mod owner;
pub mod pack;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// CONSTANTS
///

/// Name of the owner field that hosts containers unless a declaration says otherwise.
pub const DEFAULT_FIELD_NAME: &str = "extra_info";

/// Reserved entry key holding the next index of an auto-increment container.
pub const AUTO_INCREMENT_COUNTER_KEY: &str = "n";

///
/// Prelude
///
/// Domain vocabulary only; errors and helpers stay in their modules.
///

pub mod prelude {
    pub use crate::{
        choices::Choices,
        container::{AutoIncrementContainer, KeyedContainer, SingleContainer},
        field::{
            Bool, BoolField, Choice, ChoiceField, Field, Float, FloatField, Int, IntField, List,
            ListOfIdsField, Set, SetOfChoicesField, SetOfIdsField, Text, TextField, Timestamp,
            TimestampField,
        },
        owner::{OwnerSchema, PackCache, PackOwner, RawField},
        pack::{Pack, PackSchema},
        value::{RawMap, RawValue},
    };
}
