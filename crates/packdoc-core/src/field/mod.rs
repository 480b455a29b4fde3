mod kind;


pub use kind::{Bool, Choice, FieldKind, Float, Int, List, Set, Text, Timestamp};

use crate::{
    choices::Choices,
    error::{PackError, ValidationError},
    keyspace::KeySpaceError,
    pack::{MemberKind, Pack, PackMember, PackSchema, PackView},
    value::RawValue,
};
use std::{fmt, sync::Arc};

///
/// Field aliases
///

pub type BoolField = Field<Bool>;
pub type ChoiceField = Field<Choice>;
pub type FloatField = Field<Float>;
pub type IntField = Field<Int>;
pub type ListOfIdsField = Field<List<Int>>;
pub type SetOfChoicesField = Field<Set<Choice>>;
pub type SetOfIdsField = Field<Set<Int>>;
pub type TextField = Field<Text>;
pub type TimestampField = Field<Timestamp>;

type DefaultFn<T> = Box<dyn Fn(&PackView<'_>) -> T + Send + Sync>;
type ValidatorFn<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

///
/// FieldDefault
///

pub enum FieldDefault<T> {
    None,
    Static(T),
    Dynamic(DefaultFn<T>),
}

impl<T: Clone> FieldDefault<T> {
    fn resolve(&self, view: &PackView<'_>) -> Option<T> {
        match self {
            Self::None => None,
            Self::Static(value) => Some(value.clone()),
            Self::Dynamic(factory) => Some(factory(view)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FieldDefault<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

///
/// Field
///
/// Typed accessor for one value inside a pack's backing mapping.
/// Holds no per-instance state; every read and write goes straight to the
/// mapping the pack is bound to.
///

pub struct Field<C: FieldKind> {
    key: &'static str,
    docstring: Option<&'static str>,
    default: FieldDefault<C::Value>,
    null_ok: bool,
    validator: Option<ValidatorFn<C::Value>>,
    kind: C,
}

impl<C: FieldKind + Default> Field<C> {
    #[must_use]
    pub fn new(key: &'static str) -> Self {
        Self::with_kind(key, C::default())
    }
}

impl Field<Choice> {
    #[must_use]
    pub fn choice(key: &'static str, choices: Arc<Choices>) -> Self {
        Self::with_kind(key, Choice::new(choices))
    }
}

impl Field<Set<Choice>> {
    #[must_use]
    pub fn set_of_choices(key: &'static str, choices: Arc<Choices>) -> Self {
        Self::with_kind(key, Set::new(Choice::new(choices)))
    }
}

impl<C: FieldKind> Field<C> {
    #[must_use]
    pub fn with_kind(key: &'static str, kind: C) -> Self {
        let default = kind
            .implicit_default()
            .map_or(FieldDefault::None, FieldDefault::Static);

        Self {
            key,
            docstring: None,
            default,
            null_ok: false,
            validator: None,
            kind,
        }
    }

    #[must_use]
    pub fn doc(mut self, docstring: &'static str) -> Self {
        self.docstring = Some(docstring);
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: C::Value) -> Self {
        self.default = FieldDefault::Static(value);
        self
    }

    /// Default computed from the pack on every read of an absent key.
    #[must_use]
    pub fn with_default_fn<F>(mut self, factory: F) -> Self
    where
        F: Fn(&PackView<'_>) -> C::Value + Send + Sync + 'static,
    {
        self.default = FieldDefault::Dynamic(Box::new(factory));
        self
    }

    #[must_use]
    pub fn null_ok(mut self) -> Self {
        self.null_ok = true;
        self
    }

    /// Extra validator run after the kind's own validation.
    #[must_use]
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&C::Value) -> bool + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }

    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[must_use]
    pub const fn docstring(&self) -> Option<&'static str> {
        self.docstring
    }

    #[must_use]
    pub const fn is_null_ok(&self) -> bool {
        self.null_ok
    }

    #[must_use]
    pub const fn kind(&self) -> &C {
        &self.kind
    }

    #[must_use]
    pub const fn default_policy(&self) -> &FieldDefault<C::Value> {
        &self.default
    }

    /// Read the field. Absent keys resolve to the default; a stored null or
    /// an undecodable stored value reads as `None`.
    pub fn get<S: PackSchema>(&self, pack: &Pack<S>) -> Option<C::Value> {
        match self.try_get(pack) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(
                    pack = S::PATH,
                    field = self.key,
                    error = %err,
                    "undecodable stored value, reading as absent"
                );
                None
            }
        }
    }

    /// Strict read that reports undecodable stored values.
    pub fn try_get<S: PackSchema>(&self, pack: &Pack<S>) -> Result<Option<C::Value>, PackError> {
        let view = pack.view();

        match view.raw(self.key) {
            None => Ok(self.default.resolve(&view)),
            Some(RawValue::Null) => Ok(None),
            Some(raw) => self
                .kind
                .decode(&raw)
                .map(Some)
                .ok_or(PackError::Corrupt {
                    key: self.key,
                    found: raw.type_name(),
                }),
        }
    }

    /// Validate, normalize and store a value. `None` stores a null when the
    /// field allows it.
    pub fn set<S: PackSchema>(
        &self,
        pack: &Pack<S>,
        value: impl Into<Option<C::Value>>,
    ) -> Result<(), PackError> {
        let Some(value) = value.into() else {
            if self.null_ok {
                return pack.write_raw(self.key, RawValue::Null);
            }

            return Err(ValidationError::NullNotPermitted { key: self.key }.into());
        };

        self.validate(&value)?;

        pack.write_raw(self.key, self.kind.encode(&value))
    }

    /// Coerce a loosely typed value (e.g. integer text) and store it through
    /// the normal `set` pipeline.
    pub fn set_loose<S: PackSchema>(
        &self,
        pack: &Pack<S>,
        raw: impl Into<RawValue>,
    ) -> Result<(), PackError> {
        let raw = raw.into();
        if raw.is_null() {
            return self.set(pack, None);
        }

        let value = self
            .kind
            .coerce(&raw)
            .ok_or_else(|| ValidationError::Coercion {
                key: self.key,
                value: raw.to_string(),
            })?;

        self.set(pack, value)
    }

    /// Remove the stored value; later reads fall back to the default.
    pub fn delete<S: PackSchema>(&self, pack: &Pack<S>) -> Result<(), PackError> {
        match pack.remove_raw(self.key)? {
            Some(_) => Ok(()),
            None => Err(PackError::MissingField { key: self.key }),
        }
    }

    /// Whether a value (possibly null) is stored for this field.
    #[must_use]
    pub fn is_stored<S: PackSchema>(&self, pack: &Pack<S>) -> bool {
        pack.view().raw(self.key).is_some()
    }

    fn validate(&self, value: &C::Value) -> Result<(), ValidationError> {
        self.kind
            .validate(value)
            .map_err(|reason| ValidationError::Failed {
                key: self.key,
                value: format!("{value:?}"),
                reason,
            })?;

        if let Some(validator) = &self.validator
            && !validator(value)
        {
            return Err(ValidationError::Failed {
                key: self.key,
                value: format!("{value:?}"),
                reason: "rejected by field validator".to_string(),
            });
        }

        Ok(())
    }
}

impl<C: FieldKind> fmt::Debug for Field<C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("null_ok", &self.null_ok)
            .finish_non_exhaustive()
    }
}

impl<S: PackSchema, C: FieldKind> PackMember<S> for Field<C> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn kind(&self) -> MemberKind {
        MemberKind::Field
    }

    fn docstring(&self) -> Option<&'static str> {
        self.docstring
    }

    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        self.kind.check_declaration()
    }

    // an absent value on a non-nullable field clears the destination key
    fn copy_member(&self, src: &Pack<S>, dest: &Pack<S>) -> Result<(), PackError> {
        match self.get(src) {
            Some(value) => self.set(dest, value),
            None if self.null_ok => self.set(dest, None),
            None => dest.remove_raw(self.key).map(|_| ()),
        }
    }

    fn render(&self, pack: &Pack<S>) -> String {
        match self.get(pack) {
            Some(value) => format!("{value:?}"),
            None => "None".to_string(),
        }
    }
}
