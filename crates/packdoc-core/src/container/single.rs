use crate::{
    DEFAULT_FIELD_NAME,
    container::{ContainerDescriptor, ContainerKind, container_slot, render_slot},
    error::PackError,
    owner::PackOwner,
    pack::{MemberKind, Pack, PackMember, PackRef, PackSchema},
};
use std::{fmt, marker::PhantomData, sync::Arc};

///
/// SingleContainer
///
/// Exactly one pack, stored at `raw_field[pack_key]`.
///

pub struct SingleContainer<S> {
    pack_key: &'static str,
    field_name: &'static str,
    _schema: PhantomData<fn() -> S>,
}

impl<S: PackSchema> SingleContainer<S> {
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

    /// Return the owner's pack, creating its mapping on first access.
    /// Later calls on the same owner value return the same cached pack.
    pub fn get<O: PackOwner + ?Sized>(&self, owner: &O) -> Result<Arc<Pack<S>>, PackError> {
        owner
            .pack_cache()
            .get_or_try_insert(self.field_name, self.pack_key, || {
                let slot = container_slot(owner, self.field_name, self.pack_key)?;

                Ok(Pack::bind(slot, None))
            })
    }

    #[must_use]
    pub fn describe(&self, label: &'static str) -> ContainerDescriptor {
        ContainerDescriptor {
            label,
            field_name: self.field_name,
            pack_key: self.pack_key,
            kind: ContainerKind::Single,
            pack: PackRef::of::<S>(),
        }
    }
}

impl<S> fmt::Debug for SingleContainer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleContainer")
            .field("field_name", &self.field_name)
            .field("pack_key", &self.pack_key)
            .finish()
    }
}

impl<P: PackSchema, S: PackSchema> PackMember<P> for SingleContainer<S> {
    fn key(&self) -> &'static str {
        self.pack_key
    }

    fn kind(&self) -> MemberKind {
        MemberKind::Container(ContainerKind::Single)
    }

    fn nested(&self) -> Option<PackRef> {
        Some(PackRef::of::<S>())
    }

    fn copy_member(&self, src: &Pack<P>, dest: &Pack<P>) -> Result<(), PackError> {
        let from = self.get(src)?;
        let to = self.get(dest)?;

        from.copy_to(&to)
    }

    fn render(&self, pack: &Pack<P>) -> String {
        render_slot(&pack.slot().child(self.pack_key))
    }
}
