//! Owner contract: the single raw mapping field an owning entity exposes,
//! located slots inside it, and the per-owner pack cache.
//!
//! Persistence of the raw field as a whole is the owner's responsibility.
//! Read-modify-write sequences against shared persisted state (most of all
//! `AutoIncrementContainer::new_item`) must run under the owner's external
//! lock or transaction; this layer does not enforce it.

use crate::{
    container::ContainerDescriptor,
    error::PackError,
    value::{RawMap, RawValue},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

///
/// RawField
///
/// Shared handle over an owner's raw mapping field. Packs hold clones of
/// this handle and mutate the mapping in place; they never own it.
///

#[derive(Clone, Default)]
pub struct RawField {
    inner: Arc<RwLock<RawMap>>,
}

impl RawField {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_map(map: RawMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Load a field from its persisted text form. Blank text is an empty mapping.
    pub fn from_json_str(text: &str) -> Result<Self, PackError> {
        if text.trim().is_empty() {
            return Ok(Self::new());
        }

        match serde_json::from_str::<RawValue>(text)? {
            RawValue::Map(map) => Ok(Self::from_map(map)),
            other => Err(PackError::NotAMapping {
                path: String::new(),
                found: other.type_name(),
            }),
        }
    }

    /// Compact persisted text form.
    pub fn to_json_string(&self) -> Result<String, PackError> {
        self.read(|map| serde_json::to_string(map))
            .map_err(PackError::from)
    }

    /// Deep copy of the current mapping.
    #[must_use]
    pub fn snapshot(&self) -> RawMap {
        self.read(Clone::clone)
    }

    /// Slot addressing the whole field.
    #[must_use]
    pub fn root(&self) -> Slot {
        Slot {
            field: self.clone(),
            path: Vec::new(),
            anchor: 0,
        }
    }

    /// Whether two handles share the same underlying mapping.
    #[must_use]
    pub fn same_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&RawMap) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut RawMap) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl fmt::Debug for RawField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|map| f.debug_tuple("RawField").field(map).finish())
    }
}

impl From<RawMap> for RawField {
    fn from(map: RawMap) -> Self {
        Self::from_map(map)
    }
}

impl Serialize for RawField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read(|map| map.serialize(serializer))
    }
}

impl<'de> Deserialize<'de> for RawField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawMap::deserialize(deserializer).map(Self::from_map)
    }
}

///
/// Slot
///
/// A path to one nested mapping inside a raw field.
///
/// The first `anchor` segments must already exist for a write to succeed.
/// Container entries anchor their own key, so a handle kept after the entry
/// is deleted cannot bring it back.
///

#[derive(Clone, Debug)]
pub struct Slot {
    field: RawField,
    path: Vec<String>,
    anchor: usize,
}

impl Slot {
    #[must_use]
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(key.into());

        Self {
            field: self.field.clone(),
            path,
            anchor: self.anchor,
        }
    }

    /// Same location, but writes fail once the mapping at this path has
    /// been removed instead of recreating it.
    #[must_use]
    pub(crate) fn anchored(mut self) -> Self {
        self.anchor = self.path.len();
        self
    }

    #[must_use]
    pub const fn field(&self) -> &RawField {
        &self.field
    }

    #[must_use]
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Last path segment, the key this slot occupies in its parent.
    #[must_use]
    pub fn leaf(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.path.split_last()?;

        Some(Self {
            field: self.field.clone(),
            path: parent.to_vec(),
            anchor: self.anchor.min(parent.len()),
        })
    }

    /// Dotted display form of the path.
    #[must_use]
    pub fn display_path(&self) -> String {
        self.path.join(".")
    }

    /// Read the mapping at this slot. `None` when the path is missing or
    /// does not lead to a mapping.
    pub(crate) fn read<R>(&self, f: impl FnOnce(Option<&RawMap>) -> R) -> R {
        self.field.read(|root| f(descend(root, &self.path)))
    }

    /// Mutate the mapping at this slot, creating empty mappings along a
    /// missing path below the anchor.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut RawMap) -> R) -> Result<R, PackError> {
        self.field
            .write(|root| descend_mut(root, &self.path, self.anchor).map(f))
    }

    /// Make sure a mapping exists at this slot.
    pub fn ensure(&self) -> Result<(), PackError> {
        self.write(|_| ())
    }

    /// Whether a mapping currently exists at this slot.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.read(|map| map.is_some())
    }

    /// Deep copy of the mapping at this slot.
    #[must_use]
    pub fn snapshot(&self) -> Option<RawMap> {
        self.read(|map| map.cloned())
    }
}

fn descend<'a>(mut map: &'a RawMap, path: &[String]) -> Option<&'a RawMap> {
    for segment in path {
        map = map.get(segment)?.as_map()?;
    }

    Some(map)
}

fn descend_mut<'a>(
    mut map: &'a mut RawMap,
    path: &[String],
    anchor: usize,
) -> Result<&'a mut RawMap, PackError> {
    for (depth, segment) in path.iter().enumerate() {
        let entry = if depth < anchor {
            map.get_mut(segment).ok_or_else(|| PackError::DetachedEntry {
                path: path[..=depth].join("."),
            })?
        } else {
            map.entry(segment.clone()).or_insert_with(RawValue::empty_map)
        };

        map = match entry {
            RawValue::Map(inner) => inner,
            other => {
                return Err(PackError::NotAMapping {
                    path: path[..=depth].join("."),
                    found: other.type_name(),
                });
            }
        };
    }

    Ok(map)
}

///
/// PackCache
///
/// Per-owner side table of materialized containers, keyed by
/// (field name, pack key). Lives as long as the owner value.
///

#[derive(Default)]
pub struct PackCache {
    entries: RwLock<HashMap<(&'static str, &'static str), Arc<dyn Any + Send + Sync>>>,
}

impl PackCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every cached pack, e.g. after the owner reloads its raw field.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `(field_name, pack_key)`, creating it with
    /// `init` on first access.
    pub(crate) fn get_or_try_insert<T, F>(
        &self,
        field_name: &'static str,
        pack_key: &'static str,
        init: F,
    ) -> Result<Arc<T>, PackError>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, PackError>,
    {
        let conflict = || PackError::CacheConflict {
            field_name,
            pack_key,
        };

        // fast path
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = entries.get(&(field_name, pack_key)) {
                return Arc::clone(cached).downcast::<T>().map_err(|_| conflict());
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = entries.get(&(field_name, pack_key)) {
            return Arc::clone(cached).downcast::<T>().map_err(|_| conflict());
        }

        let value = Arc::new(init()?);
        entries.insert(
            (field_name, pack_key),
            Arc::clone(&value) as Arc<dyn Any + Send + Sync>,
        );

        Ok(value)
    }
}

impl fmt::Debug for PackCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackCache")
            .field("len", &self.len())
            .finish()
    }
}

///
/// PackOwner
///
/// Anything containers can be attached to: an owning entity with raw
/// fields, or a pack hosting nested containers.
///

pub trait PackOwner {
    /// Root slot of the named raw field, if the owner has one.
    fn pack_slot(&self, field_name: &str) -> Option<Slot>;

    /// Cache of materialized containers for this owner value.
    fn pack_cache(&self) -> &PackCache;
}

///
/// OwnerSchema
///
/// Static declaration of the containers attached to an owning type.
/// Usually generated by `owner_schema!`.
///

pub trait OwnerSchema: 'static {
    const PATH: &'static str;

    fn containers() -> Vec<ContainerDescriptor>;
}
