use crate::{
    AUTO_INCREMENT_COUNTER_KEY, DEFAULT_FIELD_NAME,
    container::{ContainerDescriptor, ContainerKind, PackMap, container_slot, render_slot},
    error::PackError,
    owner::PackOwner,
    pack::{MemberKind, Pack, PackMember, PackRef, PackSchema},
    value::RawValue,
};
use std::{fmt, marker::PhantomData, sync::Arc};

///
/// AutoIncrementContainer
///
/// Keyed container whose entry keys are dense indices handed out by
/// `new_item`. The next index is stored next to the entries under `"n"`.
///
/// `new_item` is a read-increment-write on the stored counter. Callers must
/// hold the owner's external lock or transaction while calling it.
///

pub struct AutoIncrementContainer<S> {
    pack_key: &'static str,
    field_name: &'static str,
    _schema: PhantomData<fn() -> S>,
}

impl<S: PackSchema> AutoIncrementContainer<S> {
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

    pub fn map<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
    ) -> Result<Arc<AutoIncrementPackMap<S>>, PackError> {
        owner
            .pack_cache()
            .get_or_try_insert(self.field_name, self.pack_key, || {
                let slot = container_slot(owner, self.field_name, self.pack_key)?;

                AutoIncrementPackMap::load(self.pack_key, PackMap::load(
                    self.pack_key,
                    slot,
                    Some(AUTO_INCREMENT_COUNTER_KEY),
                ))
            })
    }

    /// Allocate the next index and return it with its new, empty pack.
    pub fn new_item<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
    ) -> Result<(u64, Arc<Pack<S>>), PackError> {
        self.map(owner)?.new_item()
    }

    /// Entry at `index`, auto-vivified if missing.
    pub fn get<O: PackOwner + ?Sized>(
        &self,
        owner: &O,
        index: u64,
    ) -> Result<Arc<Pack<S>>, PackError> {
        self.map(owner)?.get(index)
    }

    pub fn delete<O: PackOwner + ?Sized>(&self, owner: &O, index: u64) -> Result<(), PackError> {
        self.map(owner)?.delete(index)
    }

    #[must_use]
    pub fn describe(&self, label: &'static str) -> ContainerDescriptor {
        ContainerDescriptor {
            label,
            field_name: self.field_name,
            pack_key: self.pack_key,
            kind: ContainerKind::AutoIncrementKeyed,
            pack: PackRef::of::<S>(),
        }
    }
}

impl<S> fmt::Debug for AutoIncrementContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoIncrementContainer")
            .field("field_name", &self.field_name)
            .field("pack_key", &self.pack_key)
            .finish()
    }
}

impl<P: PackSchema, S: PackSchema> PackMember<P> for AutoIncrementContainer<S> {
    fn key(&self) -> &'static str {
        self.pack_key
    }

    fn kind(&self) -> MemberKind {
        MemberKind::Container(ContainerKind::AutoIncrementKeyed)
    }

    fn nested(&self) -> Option<PackRef> {
        Some(PackRef::of::<S>())
    }

    // copying entries would desynchronize the destination counter
    fn copy_member(&self, _src: &Pack<P>, _dest: &Pack<P>) -> Result<(), PackError> {
        Err(PackError::UnsupportedContainer {
            kind: ContainerKind::AutoIncrementKeyed,
            pack_key: self.pack_key,
        })
    }

    fn render(&self, pack: &Pack<P>) -> String {
        render_slot(&pack.slot().child(self.pack_key))
    }
}

///
/// AutoIncrementPackMap
///

pub struct AutoIncrementPackMap<S: PackSchema> {
    inner: PackMap<S, u64>,
}

impl<S: PackSchema> AutoIncrementPackMap<S> {
    // load
    // normalizes the stored counter and writes it back
    fn load(pack_key: &'static str, inner: PackMap<S, u64>) -> Result<Self, PackError> {
        let map = Self { inner };

        let stored = map.stored_counter();
        let floor = map.floor()?;
        if stored < floor {
            tracing::warn!(
                pack_key,
                stored,
                floor,
                "auto-increment counter behind existing entries, advancing"
            );
        }
        map.write_counter(stored.max(floor))?;

        Ok(map)
    }

    /// Next index `new_item` will hand out.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.stored_counter()
    }

    /// Allocate the current counter value as a new entry and advance the counter.
    ///
    /// Fails with `CounterOverflow` once the counter can no longer be stored,
    /// without creating an entry.
    pub fn new_item(&self) -> Result<(u64, Arc<Pack<S>>), PackError> {
        let index = self.stored_counter().max(self.floor()?);
        let next = index
            .checked_add(1)
            .filter(|next| i64::try_from(*next).is_ok())
            .ok_or(PackError::CounterOverflow {
                pack_key: self.inner.pack_key(),
            })?;

        let pack = self.inner.get(index)?;
        self.write_counter(next)?;

        Ok((index, pack))
    }

    pub fn get(&self, index: u64) -> Result<Arc<Pack<S>>, PackError> {
        self.inner.get(index)
    }

    pub fn delete(&self, index: u64) -> Result<(), PackError> {
        self.inner.delete(index)
    }

    /// Remove every entry; the counter keeps its value so indices are never reused.
    pub fn clear(&self) -> Result<(), PackError> {
        self.inner.clear()
    }

    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        self.inner.contains(&index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn keys(&self) -> Vec<u64> {
        self.inner.keys()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<(u64, Arc<Pack<S>>)> {
        self.inner.entries()
    }

    /// Iterate a snapshot of the cached entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, Arc<Pack<S>>)> + use<S> {
        self.entries().into_iter()
    }

    fn stored_counter(&self) -> u64 {
        self.inner.slot().read(|map| {
            map.and_then(|map| map.get(AUTO_INCREMENT_COUNTER_KEY))
                .and_then(RawValue::coerce_int)
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0)
        })
    }

    // smallest index above every existing entry
    fn floor(&self) -> Result<u64, PackError> {
        match self.inner.keys().last() {
            Some(max) => max.checked_add(1).ok_or(PackError::CounterOverflow {
                pack_key: self.inner.pack_key(),
            }),
            None => Ok(0),
        }
    }

    fn write_counter(&self, next: u64) -> Result<(), PackError> {
        let next = i64::try_from(next).map_err(|_| PackError::CounterOverflow {
            pack_key: self.inner.pack_key(),
        })?;

        self.inner.slot().write(|map| {
            map.insert(AUTO_INCREMENT_COUNTER_KEY.to_string(), RawValue::Int(next));
        })
    }
}

impl<S: PackSchema> fmt::Debug for AutoIncrementPackMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoIncrementPackMap")
            .field("pack_key", &self.inner.pack_key())
            .field("counter", &self.counter())
            .field("keys", &self.keys())
            .finish()
    }
}
