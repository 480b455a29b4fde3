use crate::{
    DEFAULT_FIELD_NAME,
    container::{
        ContainerDescriptor, ContainerKind, EntryKey, container_slot, render_slot,
    },
    error::PackError,
    owner::{PackOwner, Slot},
    pack::{MemberKind, Pack, PackMember, PackRef, PackSchema},
    value::RawValue,
};
use std::{
    collections::BTreeMap,
    fmt,
    marker::PhantomData,
    sync::{Arc, PoisonError, RwLock},
};

///
/// KeyedContainer
///
/// Mapping of entry keys to packs, stored at `raw_field[pack_key][entry_key]`.
///
/// Reading a missing entry creates it (and records it in storage). Check
/// `contains` first when existence matters. Entries are never assigned
/// wholesale; they are only created by access and removed by `delete`.
///

pub struct KeyedContainer<S, K = String> {
    pack_key: &'static str,
    field_name: &'static str,
    _schema: PhantomData<fn() -> (S, K)>,
}

impl<S: PackSchema, K: EntryKey> KeyedContainer<S, K> {
    #[must_use]
    pub const fn new(pack_key: &'static str) -> Self {
        Self::in_field(DEFAULT_FIELD_NAME, pack_key)
    }

    #[must_use]
    pub const fn in_field(field_name: &'static str, pack_key: &'static str) -> Self {
        Self {
            pack_key,
            field_name,
            _schema: PhantomData,
        }
    }

    #[must_use]
    pub const fn pack_key(&self) -> &'static str {
        self.pack_key
    }

    #[must_use]
    pub const fn field_name(&self) -> &'static str {
        self.field_name
    }

    /// Materialized entry map for an owner, cached per owner value.
    pub fn map<O: PackOwner + ?Sized>(&self, owner: &O) -> Result<Arc<PackMap<S, K>>, PackError> {
        owner
            .pack_cache()
            .get_or_try_insert(self.field_name, self.pack_key, || {
                let slot = container_slot(owner, self.field_name, self.pack_key)?;

                Ok(PackMap::load(self.pack_key, slot, None))
            })
    }

    /// Entry for `key`, auto-vivified if missing.
    pub fn get<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
        key: impl Into<K>,
    ) -> Result<Arc<Pack<S>>, PackError> {
        self.map(owner)?.get(key)
    }

    /// Remove an existing entry from cache and storage.
    pub fn delete<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
        key: impl Into<K>,
    ) -> Result<(), PackError> {
        self.map(owner)?.delete(key)
    }

    /// Membership test that does not create the entry.
    pub fn contains<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
        key: impl Into<K>,
    ) -> Result<bool, PackError> {
        Ok(self.map(owner)?.contains(&key.into()))
    }

    #[must_use]
    pub fn describe(&self, label: &'static str) -> ContainerDescriptor {
        ContainerDescriptor {
            label,
            field_name: self.field_name,
            pack_key: self.pack_key,
            kind: ContainerKind::Keyed,
            pack: PackRef::of::<S>(),
        }
    }
}

impl<S, K> fmt::Debug for KeyedContainer<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedContainer")
            .field("field_name", &self.field_name)
            .field("pack_key", &self.pack_key)
            .finish()
    }
}

impl<P: PackSchema, S: PackSchema, K: EntryKey> PackMember<P> for KeyedContainer<S, K> {
    fn key(&self) -> &'static str {
        self.pack_key
    }

    fn kind(&self) -> MemberKind {
        MemberKind::Container(ContainerKind::Keyed)
    }

    fn nested(&self) -> Option<PackRef> {
        Some(PackRef::of::<S>())
    }

    fn copy_member(&self, src: &Pack<P>, dest: &Pack<P>) -> Result<(), PackError> {
        let from = self.map(src)?;
        let to = self.map(dest)?;

        for (key, pack) in from.entries() {
            pack.copy_to(&*to.get(key)?)?;
        }

        Ok(())
    }

    fn render(&self, pack: &Pack<P>) -> String {
        render_slot(&pack.slot().child(self.pack_key))
    }
}

///
/// PackMap
///
/// Materialized keyed container for one owner: the entry cache plus the
/// slot of the stored mapping.
///

pub struct PackMap<S: PackSchema, K: EntryKey> {
    pack_key: &'static str,
    slot: Slot,
    reserved: Option<&'static str>,
    entries: RwLock<BTreeMap<K, Arc<Pack<S>>>>,
}

impl<S: PackSchema, K: EntryKey> PackMap<S, K> {
    // load
    // builds packs for every stored entry; `reserved` names a key that is not an entry
    pub(crate) fn load(pack_key: &'static str, slot: Slot, reserved: Option<&'static str>) -> Self {
        let stored = slot.snapshot().unwrap_or_default();
        let mut entries = BTreeMap::new();

        for (raw_key, value) in &stored {
            if Some(raw_key.as_str()) == reserved {
                continue;
            }

            let Some(key) = K::from_storage(raw_key) else {
                tracing::warn!(pack_key, key = %raw_key, "skipping entry with unparseable key");
                continue;
            };
            let canonical = key.to_storage();
            let shadowed = *raw_key != canonical && stored.contains_key(&canonical);
            if shadowed || entries.contains_key(&key) {
                tracing::warn!(
                    pack_key,
                    key = %raw_key,
                    canonical = %canonical,
                    "skipping duplicate spelling of entry key"
                );
                continue;
            }
            if !matches!(value, RawValue::Map(_)) {
                tracing::warn!(
                    pack_key,
                    key = %raw_key,
                    found = value.type_name(),
                    "skipping entry that is not a mapping, key stays inaccessible until repaired"
                );
                continue;
            }

            let entry_slot = slot.child(raw_key.clone()).anchored();
            let pack = Pack::bind(entry_slot, Some(key.to_collection_key()));
            entries.insert(key, Arc::new(pack));
        }

        Self {
            pack_key,
            slot,
            reserved,
            entries: RwLock::new(entries),
        }
    }

    #[must_use]
    pub const fn pack_key(&self) -> &'static str {
        self.pack_key
    }

    #[must_use]
    pub const fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Entry for `key`; a missing entry is created empty, cached and
    /// recorded in storage before it is returned.
    ///
    /// Fails with `NotAMapping` when storage holds a non-mapping value under
    /// the key; such values are skipped at load and never overwritten.
    pub fn get(&self, key: impl Into<K>) -> Result<Arc<Pack<S>>, PackError> {
        let key = key.into();

        if let Some(pack) = self.read_entries().get(&key) {
            return Ok(Arc::clone(pack));
        }

        let mut entries = self.write_entries();
        if let Some(pack) = entries.get(&key) {
            return Ok(Arc::clone(pack));
        }

        let storage_key = key.to_storage();
        let entry_slot = self.slot.child(storage_key.clone());
        entry_slot.ensure()?;

        tracing::debug!(pack_key = self.pack_key, key = %storage_key, "created pack entry");

        let pack = Arc::new(Pack::bind(entry_slot.anchored(), Some(key.to_collection_key())));
        entries.insert(key, Arc::clone(&pack));

        Ok(pack)
    }

    /// Remove an entry; fails with `MissingEntry` when it does not exist.
    /// Every stored spelling of the key is removed with it.
    pub fn delete(&self, key: impl Into<K>) -> Result<(), PackError> {
        let key = key.into();

        self.write_entries()
            .remove(&key)
            .ok_or_else(|| PackError::MissingEntry {
                pack_key: self.pack_key,
                key: key.to_storage(),
            })?;

        let reserved = self.reserved;
        self.slot.write(|map| {
            map.retain(|raw_key, _| {
                Some(raw_key.as_str()) == reserved
                    || K::from_storage(raw_key).as_ref() != Some(&key)
            });
        })
    }

    /// Remove every entry. A reserved key (the auto-increment counter) is kept.
    pub fn clear(&self) -> Result<(), PackError> {
        self.write_entries().clear();

        let reserved = self.reserved;
        self.slot
            .write(|map| map.retain(|key, _| Some(key.as_str()) == reserved))
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.read_entries().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_entries().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read_entries().is_empty()
    }

    /// Entry keys in key order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.read_entries().keys().cloned().collect()
    }

    /// Snapshot of the cached entries in key order.
    #[must_use]
    pub fn entries(&self) -> Vec<(K, Arc<Pack<S>>)> {
        self.read_entries()
            .iter()
            .map(|(key, pack)| (key.clone(), Arc::clone(pack)))
            .collect()
    }

    /// Iterate a snapshot of the cached entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, Arc<Pack<S>>)> + use<S, K> {
        self.entries().into_iter()
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<K, Arc<Pack<S>>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<K, Arc<Pack<S>>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: PackSchema, K: EntryKey> fmt::Debug for PackMap<S, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackMap")
            .field("pack_key", &self.pack_key)
            .field("keys", &self.keys())
            .finish()
    }
}
