//! Numeric intermediates and the primitive conversion targets.

use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

use super::{Convert, Source};
use crate::variant::Variant;

/// 2^63 as a float; `i64` covers `[-2^63, 2^63)`.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

pub(crate) fn to_i64(source: &Source) -> Option<i64> {
    match source {
        Source::Bool(b) => Some(i64::from(*b)),
        Source::Int(i) => i64::try_from(*i).ok(),
        Source::Float(f) => {
            let truncated = f.trunc();
            (truncated >= -I64_BOUND && truncated < I64_BOUND).then_some(truncated as i64)
        }
        Source::Decimal(d) => d.trunc().to_i64(),
        Source::Char(c) => Some(i64::from(u32::from(*c))),
        Source::Text(text) => text.trim().parse().ok(),
        Source::Enum(value) => Some(value.discriminant),
        #[cfg(feature = "temporal")]
        _ => None,
    }
}

pub(crate) fn to_f64(source: &Source) -> Option<f64> {
    match source {
        Source::Bool(b) => Some(f64::from(u8::from(*b))),
        Source::Int(i) => Some(*i as f64),
        Source::Float(f) => Some(*f),
        Source::Decimal(d) => d.to_f64(),
        Source::Char(c) => Some(f64::from(u32::from(*c))),
        Source::Text(text) => text.trim().parse().ok(),
        Source::Enum(value) => Some(value.discriminant as f64),
        #[cfg(feature = "temporal")]
        _ => None,
    }
}

pub(crate) fn to_decimal(source: &Source) -> Option<Decimal> {
    match source {
        Source::Bool(b) => Some(Decimal::from(u8::from(*b))),
        Source::Int(i) => Decimal::try_from_i128_with_scale(*i, 0).ok(),
        Source::Float(f) => Decimal::from_f64(*f),
        Source::Decimal(d) => Some(*d),
        Source::Char(c) => Some(Decimal::from(u32::from(*c))),
        Source::Text(text) => {
            let text = text.trim();
            text.parse()
                .ok()
                .or_else(|| Decimal::from_scientific(text).ok())
        }
        Source::Enum(value) => Some(Decimal::from(value.discriminant)),
        #[cfg(feature = "temporal")]
        _ => None,
    }
}

/// Unsigned 64-bit values do not fit the `i64` intermediate.
fn to_u64(source: &Source) -> Option<u64> {
    to_decimal(source)?.trunc().to_u64()
}

macro_rules! convert_via_i64 {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Convert for $ty {
                fn convert_from(variant: &Variant) -> Option<Self> {
                    <$ty>::try_from(to_i64(&Source::of(variant)?)?).ok()
                }
            }
        )*
    };
}

convert_via_i64!(i8, i16, i32, i64, isize, u8, u16, u32);

impl Convert for u64 {
    fn convert_from(variant: &Variant) -> Option<Self> {
        to_u64(&Source::of(variant)?)
    }
}

impl Convert for usize {
    fn convert_from(variant: &Variant) -> Option<Self> {
        usize::try_from(to_u64(&Source::of(variant)?)?).ok()
    }
}

impl Convert for f64 {
    fn convert_from(variant: &Variant) -> Option<Self> {
        to_f64(&Source::of(variant)?)
    }
}

impl Convert for f32 {
    fn convert_from(variant: &Variant) -> Option<Self> {
        let wide = to_f64(&Source::of(variant)?)?;
        let narrow = wide as f32;
        // Infinities and NaN pass through; finite values must stay finite.
        (narrow.is_finite() || !wide.is_finite()).then_some(narrow)
    }
}

impl Convert for Decimal {
    fn convert_from(variant: &Variant) -> Option<Self> {
        to_decimal(&Source::of(variant)?)
    }
}

impl Convert for bool {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::Bool(b) => Some(b),
            Source::Int(i) => Some(i != 0),
            Source::Float(f) if !f.is_nan() => Some(f != 0.0),
            Source::Decimal(d) => Some(!d.is_zero()),
            Source::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("true") {
                    Some(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Some(false)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Convert for char {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::Char(c) => Some(c),
            Source::Text(text) => {
                let mut chars = text.chars();
                let first = chars.next()?;
                chars.next().is_none().then_some(first)
            }
            other => char::from_u32(u32::try_from(to_i64(&other)?).ok()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_bounds() {
        assert_eq!(to_i64(&Source::Float(-I64_BOUND)), Some(i64::MIN));
        assert_eq!(to_i64(&Source::Float(I64_BOUND)), None);
        assert_eq!(to_i64(&Source::Float(f64::NEG_INFINITY)), None);
    }

    #[test]
    fn test_decimal_from_scientific_text() {
        assert_eq!(
            to_decimal(&Source::Text("1.5e3".into())),
            Some(Decimal::from(1500))
        );
    }

    #[test]
    fn test_u64_truncates_fraction() {
        let d = Decimal::new(999, 1);
        assert_eq!(to_u64(&Source::Decimal(d)), Some(99));
        assert_eq!(to_u64(&Source::Int(-1)), None);
    }
}
