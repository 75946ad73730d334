//! Decimal strategy
//!
//! A `Decimal` is 16 bytes, too wide for the payload, but most decimals in
//! practice have a small mantissa and few fractional digits. Those pack into
//! a reduced 64-bit form; everything else is boxed.
//!
//! ```text
//! reduced decimal (u64)
//! ┌────────────────────────────────────────────┬──────────┐
//! │ signed mantissa, two's complement (60 bits)│ scale (4)│
//! └────────────────────────────────────────────┴──────────┘
//!  63                                         4 3        0
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::trace;

use crate::shape::{RefCodec, TypeInfo, TypeShape, VariantType};
use crate::variant::{Slot, Variant};

/// Largest scale the reduced form can carry.
pub(crate) const MAX_REDUCED_SCALE: u32 = 15;

const SCALE_BITS: u32 = 4;
const SCALE_MASK: u64 = (1 << SCALE_BITS) - 1;

/// Mantissa bounds of the reduced form: a signed 60-bit integer.
const MAX_REDUCED_MANTISSA: i128 = (1 << 59) - 1;
const MIN_REDUCED_MANTISSA: i128 = -(1 << 59);

/// A decimal packed into 64 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct ReducedDecimal(u64);

impl ReducedDecimal {
    /// Pack `value`, or `None` when its scale or mantissa is out of range.
    pub(crate) fn pack(value: Decimal) -> Option<Self> {
        let scale = value.scale();
        if scale > MAX_REDUCED_SCALE {
            return None;
        }
        let mantissa = value.mantissa();
        if !(MIN_REDUCED_MANTISSA..=MAX_REDUCED_MANTISSA).contains(&mantissa) {
            return None;
        }
        let shifted = (mantissa as i64) << SCALE_BITS;
        Some(ReducedDecimal(shifted as u64 | u64::from(scale)))
    }

    pub(crate) fn unpack(self) -> Decimal {
        // Arithmetic shift restores the mantissa's sign.
        let mantissa = (self.0 as i64) >> SCALE_BITS;
        let scale = (self.0 & SCALE_MASK) as u32;
        Decimal::new(mantissa, scale)
    }
}

impl VariantType for ReducedDecimal {
    fn shape() -> TypeShape<Self> {
        // SAFETY: a transparent u64 has no padding.
        unsafe { TypeShape::bitcast() }
    }

    fn type_info() -> TypeInfo {
        TypeInfo::of::<Decimal>()
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.unpack(), f)
    }
}

impl VariantType for Decimal {
    fn shape() -> TypeShape<Self> {
        TypeShape::Plain(None)
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }

    fn from_variant(variant: &Variant) -> Option<Self> {
        variant
            .decode_exact::<Decimal>()
            .or_else(|| variant.decode_exact::<ReducedDecimal>().map(ReducedDecimal::unpack))
    }
}

/// Encode a value the selector routed to the decimal strategy.
pub(super) fn encode<T: VariantType>(value: T) -> Variant {
    match (&value as &dyn Any).downcast_ref::<Decimal>() {
        Some(decimal) => encode_decimal(*decimal),
        None => Variant::from_parts(Slot::Object(RefCodec::<T>::boxed().into_object(value)), 0),
    }
}

fn encode_decimal(value: Decimal) -> Variant {
    match ReducedDecimal::pack(value) {
        Some(reduced) => Variant::new(reduced),
        None => {
            trace!(%value, "decimal exceeds reduced range, boxing");
            Variant::from_parts(Slot::Object(Arc::new(value)), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_pack_keeps_scale() {
        let value = dec("1.50");
        let reduced = ReducedDecimal::pack(value).unwrap();
        let back = reduced.unpack();
        assert_eq!(back, value);
        assert_eq!(back.scale(), 2);
    }

    #[test]
    fn test_pack_negative() {
        let value = dec("-123456.789");
        assert_eq!(ReducedDecimal::pack(value).unwrap().unpack(), value);
    }

    #[test]
    fn test_scale_limit() {
        assert!(ReducedDecimal::pack(dec("0.000000000000001")).is_some(), "scale 15");
        assert!(ReducedDecimal::pack(dec("0.0000000000000001")).is_none(), "scale 16");
    }

    #[test]
    fn test_mantissa_limit() {
        let max = Decimal::from_i128_with_scale(MAX_REDUCED_MANTISSA, 0);
        let min = Decimal::from_i128_with_scale(MIN_REDUCED_MANTISSA, 0);
        assert_eq!(ReducedDecimal::pack(max).unwrap().unpack(), max);
        assert_eq!(ReducedDecimal::pack(min).unwrap().unpack(), min);

        let over = Decimal::from_i128_with_scale(MAX_REDUCED_MANTISSA + 1, 0);
        let under = Decimal::from_i128_with_scale(MIN_REDUCED_MANTISSA - 1, 0);
        assert!(ReducedDecimal::pack(over).is_none());
        assert!(ReducedDecimal::pack(under).is_none());
    }

    #[test]
    fn test_variant_paths() {
        let small = Variant::new(dec("19.99"));
        assert!(!small.is_boxed());
        assert_eq!(small.type_info(), TypeInfo::of::<Decimal>());
        assert_eq!(small.try_get::<Decimal>(), Some(dec("19.99")));
        assert_eq!(small.to_string(), "19.99");

        let big = Variant::new(Decimal::MAX);
        assert!(big.is_boxed());
        assert_eq!(big.type_info(), TypeInfo::of::<Decimal>());
        assert_eq!(big.try_get::<Decimal>(), Some(Decimal::MAX));
    }
}
