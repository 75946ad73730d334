//! The Variant Value
//!
//! A fixed-size, immutable container for a value of any [`VariantType`].
//!
//! ## Physical States
//!
//! ```text
//! slot                       payload         state
//! ───────────────────────────────────────────────────────────────
//! Null                       0               Null
//! Encoding(&strategy)        packed bits     SmallValue
//! Object(Arc<value>)         encoding id     WrapperStruct
//! Object(Arc<value>)         0               Reference
//! ```
//!
//! The slot's kind together with whether the payload is zero decides which
//! strategy decodes the variant. A variant never changes state after
//! construction.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::enums::EnumValue;
use crate::error::VariantError;
use crate::registry::{self, Encoding, EncodingId};
use crate::selector;
use crate::shape::{Object, TypeInfo, VariantType};

/// The reference-sized half of a variant.
#[derive(Clone)]
pub(crate) enum Slot {
    Null,
    /// Sentinel naming the small-value strategy that packed the payload
    Encoding(&'static dyn Encoding),
    Object(Arc<dyn Object>),
}

/// A type-erased value.
///
/// ```rust,ignore
/// let v = Variant::new(42i32);
/// assert_eq!(v.type_info(), TypeInfo::of::<i32>());
/// assert!(v.is::<i32>());
/// assert!(!v.is::<i64>());
/// assert_eq!(v.to_string(), "42");
/// ```
#[derive(Clone)]
pub struct Variant {
    slot: Slot,
    payload: u64,
}

/// Decoded view of a variant's physical state.
pub(crate) enum State<'a> {
    Null,
    Small(&'static dyn Encoding),
    Wrapped(&'static dyn Encoding),
    Reference(&'a Arc<dyn Object>),
}

impl Variant {
    /// The canonical null variant.
    pub const NULL: Variant = Variant {
        slot: Slot::Null,
        payload: 0,
    };

    /// Encode `value` with the strategy selected for `T`.
    pub fn new<T: VariantType>(value: T) -> Variant {
        selector::resolve::<T>().encode(value)
    }

    pub(crate) fn from_parts(slot: Slot, payload: u64) -> Variant {
        Variant { slot, payload }
    }

    pub(crate) fn payload(&self) -> u64 {
        self.payload
    }

    pub(crate) fn object(&self) -> Option<&Arc<dyn Object>> {
        match &self.slot {
            Slot::Object(object) => Some(object),
            _ => None,
        }
    }

    pub(crate) fn state(&self) -> State<'_> {
        match &self.slot {
            Slot::Null => State::Null,
            Slot::Encoding(encoding) => State::Small(*encoding),
            Slot::Object(object) if self.payload == 0 => State::Reference(object),
            Slot::Object(_) => {
                let id = EncodingId::from_payload(self.payload)
                    .expect("wrapper payload holds an encoding identity");
                State::Wrapped(registry::encoding_at(id))
            }
        }
    }

    /// The encoding that decodes this variant, when it is not self-describing.
    fn encoding(&self) -> Option<&'static dyn Encoding> {
        match self.state() {
            State::Small(encoding) | State::Wrapped(encoding) => Some(encoding),
            State::Null | State::Reference(_) => None,
        }
    }

    /// Retrieve the stored value if it is exactly a `T`.
    pub(crate) fn decode_exact<T: VariantType>(&self) -> Option<T> {
        match self.state() {
            State::Null => None,
            State::Small(encoding) | State::Wrapped(encoding) => {
                let mut out: Option<T> = None;
                encoding.decode_into(self, &mut out as &mut dyn Any);
                out
            }
            State::Reference(object) => object.as_any().downcast_ref::<T>().cloned(),
        }
    }

    /// The type stored values decode to, or `object` for null.
    pub fn type_info(&self) -> TypeInfo {
        match self.state() {
            State::Null => TypeInfo::object(),
            State::Small(encoding) | State::Wrapped(encoding) => encoding.type_info(),
            State::Reference(object) => object.type_info(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.slot, Slot::Null)
    }

    /// True when the slot holds a value type's object.
    ///
    /// That is a value heap-allocated to fit the slot, or a caller's
    /// `Arc<U>` of a value type `U`; the two share one object layout and
    /// are not told apart. Reference types are never boxed.
    pub fn is_boxed(&self) -> bool {
        match self.state() {
            State::Reference(object) => object.is_boxed_value(),
            _ => false,
        }
    }

    /// Check if the value can be retrieved as a `T`
    pub fn is<T: VariantType>(&self) -> bool {
        self.try_get::<T>().is_some()
    }

    /// Retrieve the value as a `T`.
    ///
    /// Succeeds for the stored type, for `Variant` itself (the `object`
    /// view), for `Option<U>` when the value is a `U` or null, for `Arc<U>`
    /// when the value is an object of type `U`, and for unions listing the
    /// stored type. There is no numeric widening here; see
    /// [`Variant::try_convert`].
    pub fn try_get<T: VariantType>(&self) -> Option<T> {
        T::from_variant(self)
    }

    /// Like [`Variant::try_get`], failing with [`VariantError::InvalidCast`].
    pub fn get<T: VariantType>(&self) -> Result<T, VariantError> {
        self.try_get::<T>().ok_or_else(|| VariantError::InvalidCast {
            requested: T::type_info().name(),
            actual: self.type_info().name(),
        })
    }

    /// Like [`Variant::try_get`], yielding `T::default()` on mismatch.
    pub fn get_or_default<T: VariantType + Default>(&self) -> T {
        self.try_get::<T>().unwrap_or_default()
    }

    /// Enum discriminant and name when the stored value is an enum.
    pub(crate) fn enum_value(&self) -> Option<EnumValue> {
        match self.state() {
            State::Null => None,
            State::Small(encoding) | State::Wrapped(encoding) => encoding.enum_value(self),
            State::Reference(object) => object.enum_value(),
        }
    }

    /// Identity of the encoding this variant is tagged with, if any.
    pub fn encoding_id(&self) -> Option<EncodingId> {
        self.encoding().map(registry::identity_of)
    }
}

impl Default for Variant {
    fn default() -> Self {
        Variant::NULL
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state() {
            State::Null => Ok(()),
            State::Small(encoding) | State::Wrapped(encoding) => encoding.fmt_value(self, f),
            State::Reference(object) => object.fmt_value(f),
        }
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return f.write_str("Variant(null)");
        }
        write!(f, "Variant({}: {})", self.type_info(), self)
    }
}

impl VariantType for Variant {
    fn shape() -> crate::TypeShape<Self> {
        crate::TypeShape::Variant(std::convert::identity)
    }

    fn type_info() -> TypeInfo {
        TypeInfo::object()
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn from_variant(variant: &Variant) -> Option<Self> {
        if variant.is_null() {
            None
        } else {
            Some(variant.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_scenario() {
        let v = Variant::new(42i32);
        assert_eq!(v.type_info(), TypeInfo::of::<i32>());
        assert!(v.is::<i32>());
        assert!(!v.is::<i64>());
        assert!(!v.is::<u32>(), "bit-compatible types do not match");
        assert_eq!(v.to_string(), "42");
        assert!(!v.is_null());
        assert!(!v.is_boxed());
    }

    #[test]
    fn test_null_string_scenario() {
        let v = Variant::new(None::<String>);
        assert!(v.is_null());
        assert_eq!(v.type_info(), TypeInfo::object());
        assert_eq!(v.try_get::<String>(), None);
        assert_eq!(v.get_or_default::<String>(), "");
        assert_eq!(v.to_string(), "");
    }

    #[test]
    fn test_default_is_null() {
        let v = Variant::default();
        assert!(v.is_null());
        assert_eq!(v.type_info(), TypeInfo::object());
        assert!(!v.is::<Variant>(), "null is not an object");
        assert_eq!(format!("{v:?}"), "Variant(null)");
    }

    #[test]
    fn test_object_view() {
        let v = Variant::new(7u8);
        let as_object = v.try_get::<Variant>().unwrap();
        assert_eq!(as_object.try_get::<u8>(), Some(7));
    }

    #[test]
    fn test_nested_variant_passthrough() {
        let inner = Variant::new(1.5f64);
        let outer = Variant::new(inner.clone());
        assert_eq!(outer.type_info(), TypeInfo::of::<f64>());
        assert_eq!(outer.try_get::<f64>(), Some(1.5));
        assert_eq!(outer.encoding_id(), inner.encoding_id());
    }

    #[test]
    fn test_get_reports_invalid_cast() {
        let v = Variant::new(5i32);
        let err = v.get::<String>().unwrap_err();
        assert_eq!(
            err,
            VariantError::InvalidCast {
                requested: "alloc::string::String",
                actual: "i32",
            }
        );
        assert_eq!(v.get::<i32>(), Ok(5));
        assert_eq!(v.get_or_default::<i64>(), 0);
    }

    #[test]
    fn test_debug_format() {
        assert_eq!(format!("{:?}", Variant::new(3u16)), "Variant(u16: 3)");
    }

    #[test]
    fn test_boxed_scenario() {
        let v = Variant::new("text".to_string());
        assert!(v.is_boxed());
        assert_eq!(v.encoding_id(), None, "boxed values describe themselves");
        assert_eq!(v.try_get::<String>().as_deref(), Some("text"));
    }
}
