use crate::{choices::Choices, keyspace::KeySpaceError, value::RawValue};
use std::{collections::BTreeSet, fmt, sync::Arc};
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::well_known::Rfc3339};

///
/// FieldKind
///
/// Normalizer/validator pair behind a typed field.
///
/// `decode` turns a stored value into the application form, `encode` does
/// the reverse, `validate` guards writes and `coerce` accepts loosely typed
/// input (e.g. integer text) for `Field::set_loose`.
///

pub trait FieldKind: Send + Sync + 'static {
    type Value: Clone + fmt::Debug + Send + Sync + 'static;

    fn decode(&self, raw: &RawValue) -> Option<Self::Value>;

    fn encode(&self, value: &Self::Value) -> RawValue;

    fn validate(&self, _value: &Self::Value) -> Result<(), String> {
        Ok(())
    }

    fn coerce(&self, raw: &RawValue) -> Option<Self::Value> {
        self.decode(raw)
    }

    /// Default used when the field declaration does not provide one.
    fn implicit_default(&self) -> Option<Self::Value> {
        None
    }

    /// Declaration-time checks run by key-space validation.
    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        Ok(())
    }
}

///
/// Int
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Int;

impl FieldKind for Int {
    type Value = i64;

    fn decode(&self, raw: &RawValue) -> Option<i64> {
        raw.coerce_int()
    }

    fn encode(&self, value: &i64) -> RawValue {
        RawValue::Int(*value)
    }
}

///
/// Float
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Float;

impl FieldKind for Float {
    type Value = f64;

    fn decode(&self, raw: &RawValue) -> Option<f64> {
        raw.coerce_float()
    }

    fn encode(&self, value: &f64) -> RawValue {
        RawValue::Float(*value)
    }

    fn validate(&self, value: &f64) -> Result<(), String> {
        if value.is_finite() {
            Ok(())
        } else {
            Err("float must be finite".to_string())
        }
    }
}

///
/// Bool
/// stored as 0 or 1
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Bool;

impl FieldKind for Bool {
    type Value = bool;

    fn decode(&self, raw: &RawValue) -> Option<bool> {
        Some(raw.is_truthy())
    }

    fn encode(&self, value: &bool) -> RawValue {
        RawValue::Int(i64::from(*value))
    }
}

///
/// Text
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Text;

impl FieldKind for Text {
    type Value = String;

    fn decode(&self, raw: &RawValue) -> Option<String> {
        raw.as_text().map(ToString::to_string)
    }

    fn encode(&self, value: &String) -> RawValue {
        RawValue::Text(value.clone())
    }

    fn coerce(&self, raw: &RawValue) -> Option<String> {
        match raw {
            RawValue::Text(s) => Some(s.clone()),
            RawValue::Int(v) => Some(v.to_string()),
            RawValue::Float(v) => Some(v.to_string()),
            RawValue::Bool(v) => Some(v.to_string()),
            RawValue::Null | RawValue::List(_) | RawValue::Map(_) => None,
        }
    }
}

///
/// Choice
/// an integer that must be a member of a `Choices` enumeration
///

#[derive(Clone, Debug)]
pub struct Choice {
    choices: Arc<Choices>,
}

impl Choice {
    #[must_use]
    pub const fn new(choices: Arc<Choices>) -> Self {
        Self { choices }
    }

    #[must_use]
    pub fn choices(&self) -> &Choices {
        &self.choices
    }
}

impl FieldKind for Choice {
    type Value = i64;

    fn decode(&self, raw: &RawValue) -> Option<i64> {
        raw.coerce_int()
    }

    fn encode(&self, value: &i64) -> RawValue {
        RawValue::Int(*value)
    }

    fn validate(&self, value: &i64) -> Result<(), String> {
        if self.choices.contains(*value) {
            Ok(())
        } else {
            Err(format!("{value} is not a valid choice"))
        }
    }

    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        self.choices.validate()
    }
}

///
/// Timestamp
/// stored as integer UTC epoch seconds, read back as a naive UTC instant
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp;

impl Timestamp {
    fn naive(dt: OffsetDateTime) -> PrimitiveDateTime {
        let utc = dt.to_offset(UtcOffset::UTC);

        PrimitiveDateTime::new(utc.date(), utc.time())
    }
}

impl FieldKind for Timestamp {
    type Value = PrimitiveDateTime;

    fn decode(&self, raw: &RawValue) -> Option<PrimitiveDateTime> {
        let dt = match raw {
            RawValue::Int(secs) => OffsetDateTime::from_unix_timestamp(*secs).ok()?,
            RawValue::Float(secs) => {
                let nanos = num_traits::ToPrimitive::to_i128(&(secs * 1e9).round())?;
                OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?
            }
            _ => return None,
        };

        Some(Self::naive(dt))
    }

    fn encode(&self, value: &PrimitiveDateTime) -> RawValue {
        RawValue::Int(value.assume_utc().unix_timestamp())
    }

    fn coerce(&self, raw: &RawValue) -> Option<PrimitiveDateTime> {
        match raw {
            RawValue::Text(s) => OffsetDateTime::parse(s.trim(), &Rfc3339)
                .ok()
                .map(Self::naive)
                .or_else(|| self.decode(&RawValue::Int(s.trim().parse().ok()?))),
            other => self.decode(other),
        }
    }
}

///
/// List
/// applies the item kind over the whole collection in both directions
///

#[derive(Clone, Copy, Debug, Default)]
pub struct List<C> {
    item: C,
}

impl<C: FieldKind> List<C> {
    #[must_use]
    pub const fn new(item: C) -> Self {
        Self { item }
    }
}

impl<C: FieldKind> FieldKind for List<C> {
    type Value = Vec<C::Value>;

    fn decode(&self, raw: &RawValue) -> Option<Self::Value> {
        raw.as_list()?
            .iter()
            .map(|item| self.item.decode(item))
            .collect()
    }

    fn encode(&self, value: &Self::Value) -> RawValue {
        RawValue::List(value.iter().map(|item| self.item.encode(item)).collect())
    }

    fn validate(&self, value: &Self::Value) -> Result<(), String> {
        validate_items(&self.item, value.iter())
    }

    fn coerce(&self, raw: &RawValue) -> Option<Self::Value> {
        raw.as_list()?
            .iter()
            .map(|item| self.item.coerce(item))
            .collect()
    }

    fn implicit_default(&self) -> Option<Self::Value> {
        Some(Vec::new())
    }

    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        self.item.check_declaration()
    }
}

///
/// Set
/// de-duplicated on write, stored as a sorted list
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Set<C> {
    item: C,
}

impl<C: FieldKind> Set<C> {
    #[must_use]
    pub const fn new(item: C) -> Self {
        Self { item }
    }
}

impl<C> FieldKind for Set<C>
where
    C: FieldKind,
    C::Value: Ord,
{
    type Value = BTreeSet<C::Value>;

    fn decode(&self, raw: &RawValue) -> Option<Self::Value> {
        raw.as_list()?
            .iter()
            .map(|item| self.item.decode(item))
            .collect()
    }

    fn encode(&self, value: &Self::Value) -> RawValue {
        RawValue::List(value.iter().map(|item| self.item.encode(item)).collect())
    }

    fn validate(&self, value: &Self::Value) -> Result<(), String> {
        validate_items(&self.item, value.iter())
    }

    fn coerce(&self, raw: &RawValue) -> Option<Self::Value> {
        raw.as_list()?
            .iter()
            .map(|item| self.item.coerce(item))
            .collect()
    }

    fn implicit_default(&self) -> Option<Self::Value> {
        Some(BTreeSet::new())
    }

    fn check_declaration(&self) -> Result<(), KeySpaceError> {
        self.item.check_declaration()
    }
}

// validate_items
fn validate_items<'a, C: FieldKind>(
    kind: &C,
    items: impl Iterator<Item = &'a C::Value>,
) -> Result<(), String> {
    for (index, item) in items.enumerate() {
        kind.validate(item)
            .map_err(|reason| format!("item {index}: {reason}"))?;
    }

    Ok(())
}
