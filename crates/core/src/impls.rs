//! `VariantType` for primitive and standard library types
//!
//! | Type | Shape | Stored as |
//! |---|---|---|
//! | integers up to 64 bits, `f32`, `f64`, `bool`, `char`, `()` | plain, bit-cast | small value |
//! | `i128`, `u128` | plain | boxed |
//! | `String`, `&'static str`, `Vec<T>` | composite | boxed |
//! | `Option<U>` | nullable | `U`'s strategy, or null |
//! | `Arc<U>` | reference | the shared `U` itself |
//! | `NaiveDate`, `NaiveTime` | plain, explicit codec | small value |
//! | `NaiveDateTime`, `TimeDelta` | plain | boxed |

use std::fmt;
use std::sync::Arc;

use crate::shape::{RefCodec, TypeShape, VariantType};
use crate::variant::{State, Variant};

/// Bit-packed types that format with `Display`.
macro_rules! impl_small_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl VariantType for $ty {
                fn shape() -> TypeShape<Self> {
                    // SAFETY: primitive, padding-free and at most 8 bytes.
                    unsafe { TypeShape::bitcast() }
                }

                fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

impl_small_value!(
    i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool, char
);

impl VariantType for () {
    fn shape() -> TypeShape<Self> {
        // SAFETY: zero-sized.
        unsafe { TypeShape::bitcast() }
    }
}

/// Types stored behind the slot, formatting with `Display`.
macro_rules! impl_boxed_display {
    ($shape:ident: $($ty:ty),* $(,)?) => {
        $(
            impl VariantType for $ty {
                fn shape() -> TypeShape<Self> {
                    TypeShape::$shape(None)
                }

                fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(self, f)
                }
            }
        )*
    };
}

impl_boxed_display!(Plain: i128, u128);
impl_boxed_display!(Composite: String, &'static str);

impl<T: VariantType> VariantType for Vec<T> {
    fn shape() -> TypeShape<Self> {
        TypeShape::Composite(None)
    }
}

// =============================================================================
// Option<U>: null or a U
// =============================================================================

fn encode_option<U: VariantType>(value: Option<U>) -> Variant {
    match value {
        Some(inner) => Variant::new(inner),
        None => Variant::NULL,
    }
}

impl<U: VariantType> VariantType for Option<U> {
    fn shape() -> TypeShape<Self> {
        TypeShape::Nullable(encode_option::<U>)
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Some(inner) => inner.fmt_value(f),
            None => Ok(()),
        }
    }

    fn as_enum(&self) -> Option<crate::EnumValue> {
        self.as_ref()?.as_enum()
    }

    /// Null reads back as `None`; anything else must be a `U`.
    fn from_variant(variant: &Variant) -> Option<Self> {
        if variant.is_null() {
            return Some(None);
        }
        U::from_variant(variant).map(Some)
    }
}

// =============================================================================
// Arc<U>: shared reference, stored without a new allocation
// =============================================================================

impl<U: VariantType> VariantType for Arc<U> {
    fn shape() -> TypeShape<Self> {
        TypeShape::Reference(RefCodec::shared())
    }

    fn type_info() -> crate::TypeInfo {
        U::type_info()
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        U::fmt_value(self, f)
    }

    fn as_enum(&self) -> Option<crate::EnumValue> {
        U::as_enum(self)
    }

    /// Any object of type `U` in the slot, boxed or shared.
    fn from_variant(variant: &Variant) -> Option<Self> {
        match variant.state() {
            State::Reference(object) => RefCodec::<Arc<U>>::shared().from_object(object),
            _ => None,
        }
    }
}

// =============================================================================
// Temporal types
// =============================================================================

#[cfg(feature = "temporal")]
mod temporal {
    use std::fmt;

    use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

    use crate::bits::BitCodec;
    use crate::shape::{TypeShape, VariantType};

    fn pack_date(date: &NaiveDate) -> u64 {
        i64::from(date.num_days_from_ce()) as u64
    }

    fn unpack_date(bits: u64) -> NaiveDate {
        NaiveDate::from_num_days_from_ce_opt(bits as i64 as i32).unwrap_or_default()
    }

    /// Seconds since midnight in the high half, nanoseconds in the low half.
    fn pack_time(time: &NaiveTime) -> u64 {
        (u64::from(time.num_seconds_from_midnight()) << 32) | u64::from(time.nanosecond())
    }

    fn unpack_time(bits: u64) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt((bits >> 32) as u32, bits as u32)
            .unwrap_or_default()
    }

    impl VariantType for NaiveDate {
        fn shape() -> TypeShape<Self> {
            TypeShape::Plain(Some(BitCodec::new(pack_date, unpack_date)))
        }

        fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(self, f)
        }
    }

    impl VariantType for NaiveTime {
        fn shape() -> TypeShape<Self> {
            TypeShape::Plain(Some(BitCodec::new(pack_time, unpack_time)))
        }

        fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(self, f)
        }
    }

    impl VariantType for NaiveDateTime {
        fn shape() -> TypeShape<Self> {
            TypeShape::Plain(None)
        }

        fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(self, f)
        }
    }

    impl VariantType for TimeDelta {
        fn shape() -> TypeShape<Self> {
            TypeShape::Plain(None)
        }

        fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            fmt::Display::fmt(self, f)
        }
    }
}
