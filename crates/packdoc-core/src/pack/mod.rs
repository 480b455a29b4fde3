mod copy;
mod display;
mod member;


pub use member::{Member, MemberDescriptor, MemberKind, PackDescriptor, PackMember, PackRef};

use crate::{
    container::CollectionKey,
    error::PackError,
    keyspace::{self, KeySpaceError},
    owner::{PackCache, PackOwner, RawField, Slot},
    value::{RawMap, RawValue},
};
use std::marker::PhantomData;

///
/// PackSchema
///
/// A named, ordered set of fields and nested containers. Implemented by
/// `pack_schema!`; the schema value is built once and shared.
///

pub trait PackSchema: Sized + Send + Sync + 'static {
    const PATH: &'static str;

    fn schema() -> &'static Self;

    fn members(&self) -> Vec<Member<'_, Self>>;

    #[must_use]
    fn descriptor() -> PackDescriptor {
        PackDescriptor::of::<Self>()
    }

    /// Fail if two declarations share a storage key in this schema.
    fn validate_key_space() -> Result<(), KeySpaceError> {
        keyspace::validate_pack_key_space::<Self>()
    }
}

///
/// Pack
///
/// Flyweight view over one mapping inside an owner's raw field. The pack
/// interprets that mapping but never owns it.
///

pub struct Pack<S: PackSchema> {
    slot: Slot,
    key: Option<CollectionKey>,
    cache: PackCache,
    _schema: PhantomData<fn() -> S>,
}

impl<S: PackSchema> Pack<S> {
    pub(crate) fn bind(slot: Slot, key: Option<CollectionKey>) -> Self {
        Self {
            slot,
            key,
            cache: PackCache::new(),
            _schema: PhantomData,
        }
    }

    /// Unattached pack over a fresh empty mapping, for default probing and tests.
    #[must_use]
    pub fn dummy() -> Self {
        Self::bind(RawField::new().root(), None)
    }

    #[must_use]
    pub fn schema() -> &'static S {
        S::schema()
    }

    /// Location of the backing mapping inside the owner's raw field.
    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Key within the parent collection; `None` for single packs.
    #[must_use]
    pub const fn collection_key(&self) -> Option<&CollectionKey> {
        self.key.as_ref()
    }

    /// Snapshot of the backing mapping.
    #[must_use]
    pub fn values(&self) -> RawMap {
        self.slot.snapshot().unwrap_or_default()
    }

    #[must_use]
    pub const fn view(&self) -> PackView<'_> {
        PackView {
            slot: &self.slot,
            key: self.key.as_ref(),
        }
    }

    pub(crate) fn write_raw(&self, key: &str, value: RawValue) -> Result<(), PackError> {
        self.slot.write(|map| {
            map.insert(key.to_string(), value);
        })
    }

    pub(crate) fn remove_raw(&self, key: &str) -> Result<Option<RawValue>, PackError> {
        if !self.slot.exists() {
            return Ok(None);
        }

        self.slot.write(|map| map.remove(key))
    }
}

impl<S: PackSchema> PackOwner for Pack<S> {
    // nested containers always live in the pack's own mapping
    fn pack_slot(&self, _field_name: &str) -> Option<Slot> {
        Some(self.slot.clone())
    }

    fn pack_cache(&self) -> &PackCache {
        &self.cache
    }
}

///
/// PackView
///
/// Schema-erased read view handed to dynamic field defaults.
///

#[derive(Clone, Copy, Debug)]
pub struct PackView<'a> {
    slot: &'a Slot,
    key: Option<&'a CollectionKey>,
}

impl PackView<'_> {
    #[must_use]
    pub const fn slot(&self) -> &Slot {
        self.slot
    }

    #[must_use]
    pub const fn collection_key(&self) -> Option<&CollectionKey> {
        self.key
    }

    /// Raw stored value for a key, if present.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<RawValue> {
        self.slot
            .read(|map| map.and_then(|map| map.get(key).cloned()))
    }

    #[must_use]
    pub fn values(&self) -> RawMap {
        self.slot.snapshot().unwrap_or_default()
    }
}
