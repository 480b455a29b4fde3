//! Containers bind packs to a named slot on an owner.
//!
//! - `SingleContainer`: one pack at `raw_field[pack_key]`.
//! - `KeyedContainer`: packs at `raw_field[pack_key][entry_key]`,
//!   auto-vivified on access and removable.
//! - `AutoIncrementContainer`: keyed by dense indices allocated from a
//!   counter stored at `raw_field[pack_key]["n"]`.

mod auto_increment;
mod keyed;
mod single;

#[cfg(test)]
mod tests;

pub use auto_increment::{AutoIncrementContainer, AutoIncrementPackMap};
pub use keyed::{KeyedContainer, PackMap};
pub use single::SingleContainer;

use crate::{
    error::PackError,
    owner::{PackOwner, Slot},
    pack::PackRef,
    value::RawValue,
};
use derive_more::Display;
use serde::Serialize;
use std::fmt::Debug;

///
/// ContainerKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ContainerKind {
    #[display("auto-increment keyed")]
    AutoIncrementKeyed,

    #[display("keyed")]
    Keyed,

    #[display("single")]
    Single,
}

///
/// ContainerDescriptor
///

#[derive(Clone, Debug, Serialize)]
pub struct ContainerDescriptor {
    pub label: &'static str,
    pub field_name: &'static str,
    pub pack_key: &'static str,
    pub kind: ContainerKind,
    pub pack: PackRef,
}

///
/// CollectionKey
///
/// Key of a pack inside a keyed container, in its normalized form.
///

#[derive(Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(untagged)]
pub enum CollectionKey {
    #[display("{_0}")]
    Index(u64),

    #[display("{_0}")]
    Int(i64),

    #[display("{_0}")]
    Text(String),
}

///
/// EntryKey
///
/// Normalization between a container's key type and the string keys of
/// the stored mapping.
///

pub trait EntryKey: Clone + Debug + Ord + Send + Sync + 'static {
    fn from_storage(raw: &str) -> Option<Self>;

    fn to_storage(&self) -> String;

    fn to_collection_key(&self) -> CollectionKey;
}

impl EntryKey for String {
    fn from_storage(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }

    fn to_storage(&self) -> String {
        self.clone()
    }

    fn to_collection_key(&self) -> CollectionKey {
        CollectionKey::Text(self.clone())
    }
}

impl EntryKey for i64 {
    fn from_storage(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_storage(&self) -> String {
        self.to_string()
    }

    fn to_collection_key(&self) -> CollectionKey {
        CollectionKey::Int(*self)
    }
}

impl EntryKey for u64 {
    fn from_storage(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn to_storage(&self) -> String {
        self.to_string()
    }

    fn to_collection_key(&self) -> CollectionKey {
        CollectionKey::Index(*self)
    }
}

// container_slot
// locate (and create if missing) the container's mapping on the owner
fn container_slot<O: PackOwner + ?Sized>(
    owner: &O,
    field_name: &'static str,
    pack_key: &'static str,
) -> Result<Slot, PackError> {
    let slot = owner
        .pack_slot(field_name)
        .ok_or(PackError::UnknownOwnerField { field_name })?
        .child(pack_key);
    slot.ensure()?;

    Ok(slot)
}

// render_slot
// diagnostic rendering of a container's stored mapping without creating it
fn render_slot(slot: &Slot) -> String {
    slot.snapshot()
        .map_or_else(|| "{}".to_string(), |map| RawValue::Map(map).to_string())
}
