// Declared-field slots
//
// A `Slot` is one typed field on an envelope. Decoding hands each slot the
// dynamic value found under its wire tag; the slot either converts it or
// reports a mismatch and stays as it was. A mismatch never fails the
// surrounding decode.

use indexmap::IndexMap;

use super::value::{Map, Value};
use crate::response_code::ResponseCode;
use crate::status::StatusCarrier;

/// A declared field that can be populated from, and rendered back to, a
/// dynamic [`Value`].
pub trait Slot {
    /// Best-effort assignment. Returns `false` (leaving the slot untouched)
    /// when the value cannot be represented by this field's type.
    fn assign(&mut self, value: Value) -> bool;

    /// Render the current field value for the wire.
    fn to_value(&self) -> Value;

    /// Capability check: does this field report an envelope status?
    fn as_status(&self) -> Option<&dyn StatusCarrier> {
        None
    }
}

// ── Numbers ──────────────────────────────────────────────────────────

/// Integer slots accept integer values, signed or unsigned, that fit the
/// target width.
/// Fractional values are rejected, as are negatives for unsigned targets.
macro_rules! integer_slot {
    ($($t:ty),* $(,)?) => {$(
        impl Slot for $t {
            fn assign(&mut self, value: Value) -> bool {
                match value {
                    Value::Int(i) => match <$t>::try_from(i) {
                        Ok(v) => {
                            *self = v;
                            true
                        }
                        Err(_) => false,
                    },
                    Value::UInt(u) => match <$t>::try_from(u) {
                        Ok(v) => {
                            *self = v;
                            true
                        }
                        Err(_) => false,
                    },
                    _ => false,
                }
            }

            fn to_value(&self) -> Value {
                i64::try_from(*self).map_or_else(|_| wide_unsigned(*self), Value::Int)
            }
        }
    )*};
}

integer_slot!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

// Only reachable for u64/usize values above i64::MAX.
fn wide_unsigned<T: TryInto<u64>>(v: T) -> Value {
    v.try_into().map_or(Value::Null, Value::UInt)
}

impl Slot for f64 {
    fn assign(&mut self, value: Value) -> bool {
        match value.as_f64() {
            Some(f) => {
                *self = f;
                true
            }
            None => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Slot for f32 {
    #[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
    fn assign(&mut self, value: Value) -> bool {
        match value.as_f64() {
            Some(f) => {
                *self = f as f32;
                true
            }
            None => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

// ── Scalars ──────────────────────────────────────────────────────────

impl Slot for bool {
    fn assign(&mut self, value: Value) -> bool {
        match value {
            Value::Bool(b) => {
                *self = b;
                true
            }
            _ => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Slot for String {
    fn assign(&mut self, value: Value) -> bool {
        match value {
            Value::String(s) => {
                *self = s;
                true
            }
            _ => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl Slot for Value {
    fn assign(&mut self, value: Value) -> bool {
        *self = value;
        true
    }

    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Slot for ResponseCode {
    fn assign(&mut self, value: Value) -> bool {
        match value {
            Value::String(s) => {
                *self = ResponseCode::parse(&s);
                true
            }
            scalar @ (Value::Bool(_) | Value::Int(_) | Value::UInt(_) | Value::Float(_)) => {
                *self = ResponseCode::parse(&scalar.to_string());
                true
            }
            _ => false,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.as_str().to_owned())
    }
}

// ── Containers ───────────────────────────────────────────────────────

impl<T: Slot + Default> Slot for Option<T> {
    fn assign(&mut self, value: Value) -> bool {
        if value.is_null() {
            *self = None;
            return true;
        }
        let mut inner = T::default();
        if inner.assign(value) {
            *self = Some(inner);
            true
        } else {
            false
        }
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, Slot::to_value)
    }

    fn as_status(&self) -> Option<&dyn StatusCarrier> {
        self.as_ref().and_then(Slot::as_status)
    }
}

/// Sequences convert all-or-nothing: one unusable element rejects the field.
impl<T: Slot + Default> Slot for Vec<T> {
    fn assign(&mut self, value: Value) -> bool {
        let Value::Array(items) = value else {
            return false;
        };
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let mut slot = T::default();
            if !slot.assign(item) {
                return false;
            }
            out.push(slot);
        }
        *self = out;
        true
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Slot::to_value).collect())
    }
}

impl<T: Slot + Default> Slot for IndexMap<String, T> {
    fn assign(&mut self, value: Value) -> bool {
        let Value::Object(map) = value else {
            return false;
        };
        let mut out = IndexMap::with_capacity(map.len());
        for (key, item) in map {
            let mut slot = T::default();
            if !slot.assign(item) {
                return false;
            }
            out.insert(key, slot);
        }
        *self = out;
        true
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, item)| (key.clone(), item.to_value()))
                .collect::<Map>(),
        )
    }
}
