use crate::value::RawValue;
use num_traits::ToPrimitive;

///
/// Loose coercions
///
/// Stored values may come from older schema versions or hand-edited
/// records, so readers accept any representation that converts cleanly.
///

impl RawValue {
    /// Coerce to an integer: ints, bools, finite floats (truncated) and
    /// integer text.
    #[must_use]
    pub fn coerce_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Float(f) => f.trunc().to_i64(),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }

    /// Coerce to a finite float: numbers, bools and numeric text.
    #[must_use]
    pub fn coerce_float(&self) -> Option<f64> {
        let value = match self {
            Self::Int(v) => v.to_f64()?,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Float(f) => *f,
            Self::Text(s) => s.trim().parse::<f64>().ok()?,
            Self::Null | Self::List(_) | Self::Map(_) => return None,
        };

        value.is_finite().then_some(value)
    }

    /// Truthiness: null, false, zero and empty collections are false.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(v) => *v != 0,
            Self::Float(f) => *f != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Map(map) => !map.is_empty(),
        }
    }
}
