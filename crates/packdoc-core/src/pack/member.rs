use crate::{
    container::ContainerKind,
    error::PackError,
    keyspace::KeySpaceError,
    pack::{Pack, PackSchema},
};
use derive_more::Display;
use serde::{Serialize, Serializer};
use std::fmt;

///
/// MemberKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum MemberKind {
    #[display("field")]
    Field,

    #[display("{_0} container")]
    Container(ContainerKind),
}

///
/// PackMember
///
/// One declaration on a pack schema: a field or a nested container.
/// Both claim a key in the same namespace.
///

pub trait PackMember<S: PackSchema>: Send + Sync {
    fn key(&self) -> &'static str;

    fn kind(&self) -> MemberKind;

    fn docstring(&self) -> Option<&'static str> {
        None
    }

    /// Schema of the packs a nested container holds.
    fn nested(&self) -> Option<PackRef> {
        None
    }

    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        Ok(())
    }

    fn copy_member(&self, src: &Pack<S>, dest: &Pack<S>) -> Result<(), PackError>;

    /// Diagnostic rendering; must not mutate the pack.
    fn render(&self, pack: &Pack<S>) -> String;
}

///
/// Member
///

pub struct Member<'a, S: PackSchema> {
    pub label: &'static str,
    pub decl: &'a dyn PackMember<S>,
}

impl<'a, S: PackSchema> Member<'a, S> {
    #[must_use]
    pub fn new(label: &'static str, decl: &'a dyn PackMember<S>) -> Self {
        Self { label, decl }
    }

    #[must_use]
    pub fn describe(&self) -> MemberDescriptor {
        MemberDescriptor {
            label: self.label,
            key: self.decl.key(),
            kind: self.decl.kind(),
            docstring: self.decl.docstring(),
            nested: self.decl.nested(),
            issue: self.decl.check_declaration().err(),
        }
    }
}

///
/// PackRef
///
/// Lazy, schema-erased reference to a pack schema. Descriptors are only
/// built on demand so recursive schemas do not recurse forever.
///

#[derive(Clone, Copy)]
pub struct PackRef {
    pub path: &'static str,
    describe: fn() -> PackDescriptor,
}

impl PackRef {
    #[must_use]
    pub fn of<S: PackSchema>() -> Self {
        Self {
            path: S::PATH,
            describe: S::descriptor,
        }
    }

    #[must_use]
    pub fn describe(&self) -> PackDescriptor {
        (self.describe)()
    }
}

impl fmt::Debug for PackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PackRef").field(&self.path).finish()
    }
}

impl Serialize for PackRef {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.serialize_str(self.path)
    }
}

///
/// MemberDescriptor
///

#[derive(Clone, Debug, Serialize)]
pub struct MemberDescriptor {
    pub label: &'static str,
    pub key: &'static str,
    pub kind: MemberKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<&'static str>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<PackRef>,

    /// Declaration problem found by the member itself (e.g. a broken `Choices`).
    #[serde(skip)]
    pub issue: Option<KeySpaceError>,
}

///
/// PackDescriptor
///

#[derive(Clone, Debug, Serialize)]
pub struct PackDescriptor {
    pub path: &'static str,
    pub members: Vec<MemberDescriptor>,
}

impl PackDescriptor {
    #[must_use]
    pub fn of<S: PackSchema>() -> Self {
        Self {
            path: S::PATH,
            members: S::schema().members().iter().map(Member::describe).collect(),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.label == label)
    }
}
