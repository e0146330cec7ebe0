// Declared/overflow marshaling
//
// Decode splits a wire object into the fields an envelope declares and
// everything else. Declared tags always win: a consumed tag is removed
// before the leftovers are stored in the overflow set. Encode flattens
// both halves back into one object.

use thiserror::Error;
use tracing::trace;

use super::Envelope;
use super::value::{Map, Value};

/// Errors raised by the codec itself. Field-level conversion problems are
/// not errors; see [`Slot::assign`](super::Slot::assign).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    /// Well-formed JSON whose top level is not an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Decode a wire buffer into `dest`.
///
/// Fails only when the buffer is not a well-formed JSON object.
pub fn decode<T: Envelope + ?Sized>(bytes: &[u8], dest: &mut T) -> Result<(), CodecError> {
    match serde_json::from_slice::<Value>(bytes)? {
        Value::Object(map) => {
            absorb(dest, map);
            Ok(())
        }
        other => Err(CodecError::NotAnObject {
            found: other.kind(),
        }),
    }
}

/// Populate `dest` from an already-parsed wire object.
///
/// Used by [`decode`] and by nested envelopes, which receive their object
/// from the enclosing decode.
pub fn absorb<T: Envelope + ?Sized>(dest: &mut T, mut wire: Map) {
    for (tag, slot) in dest.fields_mut() {
        if let Some(value) = wire.shift_remove(tag) {
            let kind = value.kind();
            if !slot.assign(value) {
                trace!(field = tag, wire_type = kind, "wire value does not fit declared field");
            }
        }
    }

    match dest.overflow_mut() {
        Some(overflow) => *overflow = wire,
        None if !wire.is_empty() => {
            trace!(dropped = wire.len(), "no overflow field; discarding undeclared keys");
        }
        None => {}
    }
}

/// Render `source` as a single flat wire object.
///
/// Declared fields are written first, in declaration order. Overflow
/// entries follow; an overflow key that collides with a declared tag is
/// skipped so the typed value stays authoritative.
pub fn to_value<T: Envelope + ?Sized>(source: &T) -> Value {
    let mut out = Map::new();
    for (tag, slot) in source.fields() {
        out.insert(tag.to_owned(), slot.to_value());
    }
    if let Some(overflow) = source.overflow() {
        for (key, value) in overflow {
            if out.contains_key(key) {
                trace!(key = key.as_str(), "overflow key shadows a declared field; skipped");
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
    }
    Value::Object(out)
}

/// Encode `source` to wire bytes.
pub fn encode<T: Envelope + ?Sized>(source: &T) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(&to_value(source))?)
}
