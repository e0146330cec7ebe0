// Envelope marshaling
//
// Response types declare the fields they understand; everything else the
// controller sends is kept in an overflow map so it survives a decode and
// re-encode untouched. The declared-field map is exposed through the
// `Envelope` trait, normally generated with `impl_envelope!`.

mod codec;
mod slot;
mod value;

pub use codec::{CodecError, absorb, decode, encode, to_value};
pub use slot::Slot;
pub use value::{Map, Value};

use crate::status::StatusCarrier;

/// Undeclared wire fields, keyed by wire tag.
pub type Overflow = Map;

/// A payload type with declared fields and, optionally, an overflow set.
///
/// Implementations list each declared field with its wire tag. Fields left
/// out of the list are excluded from the wire representation entirely.
pub trait Envelope {
    /// Declared fields in declaration order.
    fn fields(&self) -> Vec<(&'static str, &dyn Slot)>;

    /// Mutable view of the declared fields, used while decoding.
    fn fields_mut(&mut self) -> Vec<(&'static str, &mut dyn Slot)>;

    /// The reserved catch-all for undeclared fields, if this type has one.
    fn overflow(&self) -> Option<&Overflow> {
        None
    }

    fn overflow_mut(&mut self) -> Option<&mut Overflow> {
        None
    }

    /// Capability check: does the envelope itself report a status?
    fn status(&self) -> Option<&dyn StatusCarrier> {
        None
    }
}

/// Implement [`Envelope`] and [`Slot`] for a struct.
///
/// ```ignore
/// impl_envelope!(Site { id = "_id", name, desc } overflow extra);
/// impl_envelope!(status CommonMeta { rc, msg } overflow extra);
/// ```
///
/// Each listed field uses its own name as the wire tag unless an explicit
/// tag follows `=`. `overflow <field>` names the catch-all map. A leading
/// `status` marks the type as a [`StatusCarrier`]; the type must also
/// implement that trait.
#[macro_export]
macro_rules! impl_envelope {
    (@tag $field:ident) => {
        ::core::stringify!($field)
    };
    (@tag $field:ident $tag:literal) => {
        $tag
    };

    (@overflow) => {};
    (@overflow $extra:ident) => {
        fn overflow(&self) -> ::core::option::Option<&$crate::envelope::Overflow> {
            ::core::option::Option::Some(&self.$extra)
        }

        fn overflow_mut(&mut self) -> ::core::option::Option<&mut $crate::envelope::Overflow> {
            ::core::option::Option::Some(&mut self.$extra)
        }
    };

    (@carrier no $method:ident) => {};
    (@carrier yes $method:ident) => {
        fn $method(&self) -> ::core::option::Option<&dyn $crate::status::StatusCarrier> {
            ::core::option::Option::Some(self)
        }
    };

    (@impl $carrier:ident $ty:ident
        { $($field:ident $(= $tag:literal)?),* $(,)? }
        $(overflow $extra:ident)?
    ) => {
        impl $crate::envelope::Envelope for $ty {
            fn fields(&self) -> ::std::vec::Vec<(&'static str, &dyn $crate::envelope::Slot)> {
                ::std::vec![
                    $((
                        $crate::impl_envelope!(@tag $field $($tag)?),
                        &self.$field as &dyn $crate::envelope::Slot,
                    )),*
                ]
            }

            fn fields_mut(
                &mut self,
            ) -> ::std::vec::Vec<(&'static str, &mut dyn $crate::envelope::Slot)> {
                ::std::vec![
                    $((
                        $crate::impl_envelope!(@tag $field $($tag)?),
                        &mut self.$field as &mut dyn $crate::envelope::Slot,
                    )),*
                ]
            }

            $crate::impl_envelope!(@overflow $($extra)?);
            $crate::impl_envelope!(@carrier $carrier status);
        }

        impl $crate::envelope::Slot for $ty {
            fn assign(&mut self, value: $crate::envelope::Value) -> bool {
                match value {
                    $crate::envelope::Value::Object(map) => {
                        $crate::envelope::absorb(self, map);
                        true
                    }
                    _ => false,
                }
            }

            fn to_value(&self) -> $crate::envelope::Value {
                $crate::envelope::to_value(self)
            }

            $crate::impl_envelope!(@carrier $carrier as_status);
        }
    };

    (status $ty:ident $($rest:tt)*) => {
        $crate::impl_envelope!(@impl yes $ty $($rest)*);
    };
    ($ty:ident $($rest:tt)*) => {
        $crate::impl_envelope!(@impl no $ty $($rest)*);
    };
}
