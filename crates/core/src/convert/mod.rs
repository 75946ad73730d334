//! Conversion Layer
//!
//! Best-effort coercion from whatever a variant holds to a requested type,
//! for callers that need more than exact retrieval (a stored `i16` read as
//! an `i64`, a stored string parsed as a number).
//!
//! # Policy by target
//!
//! - **Integers**: through an `i64` intermediate with range checks; `u64`
//!   and `usize` go through `Decimal` so values above `i64::MAX` survive
//! - **Floats**: through an `f64` intermediate
//! - **Decimal**: through a `Decimal` intermediate
//! - **Enums**: by case name (ignoring case) from strings and other enums,
//!   then by underlying value checked against the enum's repr
//! - **char**: from a single-character string or a valid code point
//! - **String**: the stored value's display text
//! - **Temporal** (`temporal` feature): see the `temporal` module
//!
//! Every conversion tries exact retrieval first. Nothing here panics;
//! failure is `None`, and only [`Variant::convert_to`] turns it into an
//! error.

mod numeric;
#[cfg(feature = "temporal")]
mod temporal;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::enums::{EnumValue, VariantEnum};
use crate::error::VariantError;
use crate::shape::VariantType;
use crate::variant::Variant;

/// A type reachable through [`Variant::try_convert`].
pub trait Convert: VariantType {
    /// Coerce the variant's value into `Self`, or `None` when no rule applies.
    fn convert_from(variant: &Variant) -> Option<Self>;
}

impl Variant {
    /// Retrieve the value as a `T`, coercing across numeric, text, enum and
    /// temporal types when it is not stored as one.
    pub fn try_convert<T: Convert>(&self) -> Option<T> {
        self.try_get::<T>().or_else(|| T::convert_from(self))
    }

    /// Like [`Variant::try_convert`], failing with [`VariantError::Conversion`].
    pub fn convert_to<T: Convert>(&self) -> Result<T, VariantError> {
        self.try_convert::<T>().ok_or_else(|| VariantError::Conversion {
            requested: T::type_info().name(),
            actual: self.type_info().name(),
        })
    }

    /// Retrieve a `T` directly, or parse it from a stored string.
    ///
    /// Covers any type with a `FromStr` impl, including ones with no
    /// [`Convert`] rules.
    pub fn parse_to<T: FromStr + VariantType>(&self) -> Option<T> {
        if let Some(exact) = self.try_get::<T>() {
            return Some(exact);
        }
        match Source::of(self)? {
            Source::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A stored value, classified by the category conversions care about.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Source {
    Bool(bool),
    Int(i128),
    Float(f64),
    Decimal(Decimal),
    Char(char),
    Text(String),
    Enum(EnumValue),
    #[cfg(feature = "temporal")]
    Date(chrono::NaiveDate),
    #[cfg(feature = "temporal")]
    Time(chrono::NaiveTime),
    #[cfg(feature = "temporal")]
    DateTime(chrono::NaiveDateTime),
    #[cfg(feature = "temporal")]
    Span(chrono::TimeDelta),
}

impl Source {
    /// Classify `variant`, or `None` for null and unconvertible types.
    pub(crate) fn of(variant: &Variant) -> Option<Source> {
        if let Some(value) = variant.enum_value() {
            return Some(Source::Enum(value));
        }
        let info = variant.type_info();

        macro_rules! probe {
            ($($ty:ty => $classify:expr),* $(,)?) => {
                $(
                    if info.is::<$ty>() {
                        return variant.try_get::<$ty>().map($classify);
                    }
                )*
            };
        }

        probe! {
            bool => Source::Bool,
            i8 => |v| Source::Int(v as i128),
            i16 => |v| Source::Int(v as i128),
            i32 => |v| Source::Int(v as i128),
            i64 => |v| Source::Int(v as i128),
            isize => |v| Source::Int(v as i128),
            i128 => Source::Int,
            u8 => |v| Source::Int(v as i128),
            u16 => |v| Source::Int(v as i128),
            u32 => |v| Source::Int(v as i128),
            u64 => |v| Source::Int(v as i128),
            usize => |v| Source::Int(v as i128),
            u128 => |v| i128::try_from(v).map_or(Source::Float(v as f64), Source::Int),
            f32 => |v| Source::Float(f64::from(v)),
            f64 => Source::Float,
            Decimal => Source::Decimal,
            char => Source::Char,
            String => Source::Text,
            &'static str => |v| Source::Text(v.to_owned()),
        }

        #[cfg(feature = "temporal")]
        probe! {
            chrono::NaiveDate => Source::Date,
            chrono::NaiveTime => Source::Time,
            chrono::NaiveDateTime => Source::DateTime,
            chrono::TimeDelta => Source::Span,
        }

        None
    }
}

/// Convert into an enum declared with [`variant_enum!`](crate::variant_enum).
///
/// Strings and other enums match by case name first; everything else, and
/// unmatched names, fall back to the numeric value, which must fit the
/// enum's repr and name a declared case.
pub fn convert_enum<T: VariantEnum>(variant: &Variant) -> Option<T> {
    let source = Source::of(variant)?;
    let by_name = match &source {
        Source::Text(text) => T::from_name(text),
        Source::Enum(value) => T::from_name(value.name),
        _ => None,
    };
    by_name.or_else(|| T::from_discriminant(numeric::to_i64(&source)?))
}

impl<U: Convert> Convert for Option<U> {
    fn convert_from(variant: &Variant) -> Option<Self> {
        if variant.is_null() {
            return Some(None);
        }
        U::convert_from(variant).map(Some)
    }
}

impl Convert for String {
    fn convert_from(variant: &Variant) -> Option<Self> {
        if variant.is_null() {
            None
        } else {
            Some(variant.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::variant_enum! {
        enum Color: u8 {
            Red = 1,
            Green = 2,
            Blue = 4,
        }
    }

    crate::variant_enum! {
        enum Hue: i32 {
            Red = 10,
            Blue = 40,
        }
    }

    #[test]
    fn test_integer_widening() {
        let v = Variant::new(-5i16);
        assert_eq!(v.convert_to::<i64>(), Ok(-5));
        assert_eq!(v.try_convert::<i8>(), Some(-5));
        assert!(!v.is::<i64>(), "retrieval stays exact");
    }

    #[test]
    fn test_negative_to_unsigned_fails() {
        let v = Variant::new(-1i32);
        assert_eq!(v.try_convert::<u64>(), None);
        assert_eq!(
            v.convert_to::<u64>(),
            Err(VariantError::Conversion {
                requested: "u64",
                actual: "i32",
            })
        );
    }

    #[test]
    fn test_u64_above_i64_range() {
        let v = Variant::new(u64::MAX);
        assert_eq!(v.try_convert::<u64>(), Some(u64::MAX));
        assert_eq!(v.try_convert::<i64>(), None);
        assert_eq!(v.try_convert::<f64>(), Some(u64::MAX as f64));

        let text = Variant::new("18446744073709551615".to_string());
        assert_eq!(text.try_convert::<u64>(), Some(u64::MAX));
    }

    #[test]
    fn test_narrowing_range_checked() {
        assert_eq!(Variant::new(300i32).try_convert::<u8>(), None);
        assert_eq!(Variant::new(255i32).try_convert::<u8>(), Some(255));
        assert_eq!(Variant::new(i128::MAX).try_convert::<i64>(), None);
    }

    #[test]
    fn test_float_truncates() {
        assert_eq!(Variant::new(3.9f64).try_convert::<i32>(), Some(3));
        assert_eq!(Variant::new(-3.9f32).try_convert::<i32>(), Some(-3));
        assert_eq!(Variant::new(f64::NAN).try_convert::<i64>(), None);
        assert_eq!(Variant::new(1e20f64).try_convert::<i64>(), None);
        assert_eq!(Variant::new(7i32).try_convert::<f32>(), Some(7.0));
        assert_eq!(Variant::new(1e300f64).try_convert::<f32>(), None, "overflows f32");
    }

    #[test]
    fn test_string_parsing() {
        let v = Variant::new(" 42 ".to_string());
        assert_eq!(v.try_convert::<i32>(), Some(42));
        assert_eq!(v.try_convert::<f64>(), Some(42.0));
        assert_eq!(Variant::new("4.2").try_convert::<i32>(), None);
        assert_eq!(Variant::new("abc").try_convert::<i32>(), None);
    }

    #[test]
    fn test_bool_and_char() {
        assert_eq!(Variant::new(true).try_convert::<i32>(), Some(1));
        assert_eq!(Variant::new(0u8).try_convert::<bool>(), Some(false));
        assert_eq!(Variant::new("TRUE").try_convert::<bool>(), Some(true));
        assert_eq!(Variant::new("yes").try_convert::<bool>(), None);

        assert_eq!(Variant::new('A').try_convert::<u32>(), Some(65));
        assert_eq!(Variant::new(97i64).try_convert::<char>(), Some('a'));
        assert_eq!(Variant::new("é").try_convert::<char>(), Some('é'));
        assert_eq!(Variant::new("ab").try_convert::<char>(), None);
        assert_eq!(Variant::new(0xD800u32).try_convert::<char>(), None, "surrogate");
    }

    #[test]
    fn test_decimal_targets() {
        let d = Decimal::from_str("12.75").unwrap();
        let v = Variant::new(d);
        assert_eq!(v.try_convert::<i32>(), Some(12));
        assert_eq!(v.try_convert::<f64>(), Some(12.75));
        assert_eq!(Variant::new(5i8).try_convert::<Decimal>(), Some(Decimal::from(5)));
        assert_eq!(Variant::new("0.1").try_convert::<Decimal>(), Decimal::from_str("0.1").ok());
        assert_eq!(Variant::new(f64::INFINITY).try_convert::<Decimal>(), None);
    }

    #[test]
    fn test_enum_conversion() {
        assert_eq!(Variant::new(2i32).try_convert::<Color>(), Some(Color::Green));
        assert_eq!(Variant::new("blue").try_convert::<Color>(), Some(Color::Blue));
        assert_eq!(Variant::new("4").try_convert::<Color>(), Some(Color::Blue));
        assert_eq!(Variant::new(3i32).try_convert::<Color>(), None, "undeclared");
        assert_eq!(Variant::new(260i32).try_convert::<Color>(), None, "outside u8");
        assert_eq!(Variant::new(Color::Red).try_convert::<Color>(), Some(Color::Red));
    }

    #[test]
    fn test_enum_to_enum_and_numbers() {
        assert_eq!(Variant::new(Color::Blue).try_convert::<Hue>(), Some(Hue::Blue), "by name");
        assert_eq!(Variant::new(Color::Green).try_convert::<Hue>(), None);
        assert_eq!(Variant::new(Hue::Red).try_convert::<i64>(), Some(10));
        assert_eq!(Variant::new(Color::Blue).try_convert::<String>().as_deref(), Some("Blue"));
    }

    #[test]
    fn test_string_target_and_null() {
        assert_eq!(Variant::new(1.5f64).try_convert::<String>().as_deref(), Some("1.5"));
        assert_eq!(Variant::NULL.try_convert::<String>(), None);
        assert_eq!(Variant::NULL.try_convert::<i32>(), None);
        assert_eq!(Variant::NULL.try_convert::<Option<i32>>(), Some(None));
        assert_eq!(Variant::new(8u8).try_convert::<Option<i32>>(), Some(Some(8)));
    }

    #[test]
    fn test_parse_to() {
        use std::net::Ipv4Addr;

        #[derive(Clone, Debug, PartialEq)]
        struct Addr(Ipv4Addr);

        impl FromStr for Addr {
            type Err = std::net::AddrParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Addr)
            }
        }

        crate::reference_type!(Addr);

        let text = Variant::new("127.0.0.1".to_string());
        assert_eq!(text.parse_to::<Addr>(), Some(Addr(Ipv4Addr::LOCALHOST)));

        let stored = Variant::new(Addr(Ipv4Addr::BROADCAST));
        assert_eq!(stored.parse_to::<Addr>(), Some(Addr(Ipv4Addr::BROADCAST)));
        assert_eq!(Variant::new(1i32).parse_to::<Addr>(), None);
    }
}
