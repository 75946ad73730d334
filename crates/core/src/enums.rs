//! Enum Support
//!
//! Fieldless enums are stored bit-packed like any small value. The
//! conversion layer additionally needs their names and underlying integers,
//! which [`variant_enum!`](crate::variant_enum) records at compile time.

use crate::shape::VariantType;

/// The integer and name behind a stored enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    pub discriminant: i64,
    pub name: &'static str,
}

/// A fieldless enum with a fixed integer representation.
pub trait VariantEnum: VariantType + Copy + PartialEq {
    /// Every case, in declaration order.
    const CASES: &'static [Self];

    fn name(self) -> &'static str;

    fn discriminant(self) -> i64;

    /// Check that `value` fits the enum's `#[repr]` integer
    fn fits_repr(value: i64) -> bool;

    /// The case with the given underlying value.
    ///
    /// Fails for values outside the representation's range and for values
    /// no case declares.
    fn from_discriminant(value: i64) -> Option<Self> {
        if !Self::fits_repr(value) {
            return None;
        }
        Self::CASES
            .iter()
            .copied()
            .find(|case| case.discriminant() == value)
    }

    /// The case whose name matches, ignoring ASCII case.
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::CASES
            .iter()
            .copied()
            .find(|case| case.name().eq_ignore_ascii_case(name))
    }

    fn enum_value(self) -> EnumValue {
        EnumValue {
            discriminant: self.discriminant(),
            name: self.name(),
        }
    }
}

/// Declare a fieldless enum that can live in a `Variant`.
///
/// ```rust,ignore
/// vessel_core::variant_enum! {
///     /// Traffic light state
///     pub enum Light: u8 {
///         Red = 1,
///         Amber = 2,
///         Green = 3,
///     }
/// }
/// ```
///
/// Every case needs an explicit discriminant. The enum gets
/// `#[repr($repr)]`, the usual derives, a bit-packed [`VariantType`] impl
/// that formats as the case name, a [`VariantEnum`] impl and a
/// [`Convert`](crate::Convert) impl.
#[macro_export]
macro_rules! variant_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $repr:ident {
            $($(#[$case_meta:meta])* $case:ident = $value:expr),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr($repr)]
        $vis enum $name {
            $($(#[$case_meta])* $case = $value),+
        }

        impl $crate::VariantType for $name {
            fn shape() -> $crate::TypeShape<Self> {
                // SAFETY: a fieldless enum with an integer repr has no padding
                // and only valid discriminants are ever packed.
                unsafe { $crate::TypeShape::bitcast() }
            }

            fn fmt_value(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::VariantEnum::name(*self))
            }

            fn as_enum(&self) -> ::std::option::Option<$crate::EnumValue> {
                ::std::option::Option::Some($crate::VariantEnum::enum_value(*self))
            }
        }

        impl $crate::VariantEnum for $name {
            const CASES: &'static [Self] = &[$($name::$case),+];

            fn name(self) -> &'static str {
                match self {
                    $($name::$case => stringify!($case)),+
                }
            }

            fn discriminant(self) -> i64 {
                self as $repr as i64
            }

            fn fits_repr(value: i64) -> bool {
                <$repr as ::std::convert::TryFrom<i64>>::try_from(value).is_ok()
            }
        }

        impl $crate::Convert for $name {
            fn convert_from(variant: &$crate::Variant) -> ::std::option::Option<Self> {
                $crate::convert_enum(variant)
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::variant_enum! {
        enum Level: i8 {
            Low = -1,
            Mid = 0,
            High = 1,
        }
    }

    #[test]
    fn test_discriminant_lookup() {
        assert_eq!(Level::from_discriminant(-1), Some(Level::Low));
        assert_eq!(Level::from_discriminant(1), Some(Level::High));
        assert_eq!(Level::from_discriminant(2), None, "undeclared case");
        assert_eq!(Level::from_discriminant(300), None, "outside i8");
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        assert_eq!(Level::from_name("high"), Some(Level::High));
        assert_eq!(Level::from_name(" MID "), Some(Level::Mid));
        assert_eq!(Level::from_name("middle"), None);
    }

    #[test]
    fn test_enum_value() {
        assert_eq!(
            Level::Low.enum_value(),
            EnumValue {
                discriminant: -1,
                name: "Low"
            }
        );
    }
}
