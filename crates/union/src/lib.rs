//! Vessel Union: generic one-of-N tagged unions
//!
//! `OneOf2` through `OneOf4` hold exactly one value whose type is one of
//! their type parameters. Each is a thin wrapper around a
//! [`Variant`](vessel_core::Variant) plus the position of the member it was
//! built as:
//!
//! ```text
//! OneOf3<i32, String, f64>
//! ┌──────────────────────────────┐
//! │ Variant (slot + payload)     │  ← the member value, encoded as usual
//! │ tag: u8                      │  ← which member, fixed at construction
//! │ PhantomData<(A, B, C)>       │  ← zero-sized
//! └──────────────────────────────┘
//! ```
//!
//! Unions implement [`TypeUnion`], so storing one in a `Variant` stores the
//! member value itself. That makes conversion between unions a plain
//! retrieval: any union whose member list covers the stored value accepts
//! it, whatever the order or arity. The tag is not stored in the variant;
//! a union rebuilt from one takes the first member type that accepts it.
//!
//! ```rust,ignore
//! let small: OneOf2<i32, String> = OneOf2::first(7);
//! let wide: OneOf3<f64, String, i32> = small.try_into_union().unwrap();
//! assert_eq!(wide.index(), 2);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use vessel_core::{TypeShape, TypeUnion, Variant, VariantType};

/// Decode a member value. A `Variant` member is the stored variant itself,
/// null included.
fn member<T: VariantType>(value: &Variant) -> Option<T> {
    match (value as &dyn Any).downcast_ref::<T>() {
        Some(itself) => Some(itself.clone()),
        None => value.try_get::<T>(),
    }
}

macro_rules! one_of {
    (
        $(#[$meta:meta])*
        $name:ident { $($param:ident = $idx:literal: $ctor:ident / $getter:ident),+ $(,)? }
    ) => {
        $(#[$meta])*
        pub struct $name<$($param),+> {
            value: Variant,
            tag: u8,
            members: PhantomData<fn() -> ($($param,)+)>,
        }

        impl<$($param: VariantType),+> $name<$($param),+> {
            fn wrap(value: Variant, tag: u8) -> Self {
                Self {
                    value,
                    tag,
                    members: PhantomData,
                }
            }

            $(
                #[doc = concat!("A union holding a `", stringify!($param), "`.")]
                pub fn $ctor(value: $param) -> Self {
                    Self::wrap(Variant::new(value), $idx)
                }

                #[doc = concat!("The value, if the union holds its `", stringify!($param), "` member.")]
                pub fn $getter(&self) -> Option<$param> {
                    if self.tag == $idx {
                        member::<$param>(&self.value)
                    } else {
                        None
                    }
                }
            )+

            /// Zero-based position of the member the union holds.
            pub fn index(&self) -> usize {
                usize::from(self.tag)
            }

            /// Retrieve the value as any `T`, with `Variant::try_get` rules.
            pub fn try_get<T: VariantType>(&self) -> Option<T> {
                self.value.try_get::<T>()
            }

            pub fn is<T: VariantType>(&self) -> bool {
                self.value.is::<T>()
            }

            /// The variant holding the member value.
            pub fn variant(&self) -> &Variant {
                &self.value
            }

            /// Re-home the value in another union whose members cover it.
            pub fn try_into_union<U: TypeUnion>(&self) -> Option<U> {
                U::try_from_variant(&self.value)
            }

            /// Consume the union with the handler for the member it holds.
            ///
            /// # Panics
            /// Panics if the member's `VariantType::from_variant` rejects the
            /// variant its own `Variant::new` produced.
            pub fn fold<R>(self, $($ctor: impl FnOnce($param) -> R),+) -> R {
                $(
                    if self.tag == $idx {
                        match member::<$param>(&self.value) {
                            Some(value) => return $ctor(value),
                            None => panic!(
                                "{} member {} does not decode its own encoding",
                                stringify!($name),
                                stringify!($param),
                            ),
                        }
                    }
                )+
                unreachable!(concat!(stringify!($name), " tag out of range"))
            }
        }

        impl<$($param),+> Clone for $name<$($param),+> {
            fn clone(&self) -> Self {
                Self {
                    value: self.value.clone(),
                    tag: self.tag,
                    members: PhantomData,
                }
            }
        }

        impl<$($param),+> fmt::Debug for $name<$($param),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.value)
            }
        }

        impl<$($param),+> fmt::Display for $name<$($param),+> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.value, f)
            }
        }

        impl<$($param: VariantType),+> VariantType for $name<$($param),+> {
            fn shape() -> TypeShape<Self> {
                TypeShape::union()
            }

            fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.value, f)
            }

            fn from_variant(variant: &Variant) -> Option<Self> {
                Self::try_from_variant(variant)
            }
        }

        impl<$($param: VariantType),+> TypeUnion for $name<$($param),+> {
            fn into_variant(self) -> Variant {
                self.value
            }

            fn try_from_variant(variant: &Variant) -> Option<Self> {
                let accepts = [$(member::<$param>(variant).is_some()),+];
                let tag = accepts.iter().position(|&accepted| accepted)?;
                Some(Self::wrap(variant.clone(), tag as u8))
            }
        }

        impl<$($param: VariantType),+> From<$name<$($param),+>> for Variant {
            fn from(union: $name<$($param),+>) -> Variant {
                union.into_variant()
            }
        }
    };
}

one_of! {
    /// A value of one of two types.
    OneOf2 { A = 0: first / try_first, B = 1: second / try_second }
}

one_of! {
    /// A value of one of three types.
    OneOf3 {
        A = 0: first / try_first,
        B = 1: second / try_second,
        C = 2: third / try_third,
    }
}

one_of! {
    /// A value of one of four types.
    OneOf4 {
        A = 0: first / try_first,
        B = 1: second / try_second,
        C = 2: third / try_third,
        D = 3: fourth / try_fourth,
    }
}

/// Infallible widening into a union that extends the member list.
macro_rules! widen {
    ($from:ident<$($param:ident),+> => $to:ident<$($extra:ident),+>) => {
        impl<$($param: VariantType,)+ $($extra: VariantType),+> From<$from<$($param),+>>
            for $to<$($param,)+ $($extra),+>
        {
            fn from(union: $from<$($param),+>) -> Self {
                $to::wrap(union.value, union.tag)
            }
        }
    };
}

widen!(OneOf2<A, B> => OneOf3<C>);
widen!(OneOf2<A, B> => OneOf4<C, D>);
widen!(OneOf3<A, B, C> => OneOf4<D>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_and_index() {
        let u: OneOf3<i32, String, f64> = OneOf3::second("two".to_string());
        assert_eq!(u.index(), 1);
        assert_eq!(u.try_second().as_deref(), Some("two"));
        assert_eq!(u.try_first(), None);
        assert!(u.is::<String>());
        assert_eq!(u.to_string(), "two");
    }

    #[test]
    fn test_union_in_variant_is_the_member() {
        let u: OneOf2<u8, bool> = OneOf2::second(true);
        let v = Variant::new(u.clone());
        assert_eq!(v.type_info(), vessel_core::TypeInfo::of::<bool>());
        assert_eq!(v.try_get::<bool>(), Some(true));
        assert_eq!(v.encoding_id(), u.variant().encoding_id());
    }

    #[test]
    fn test_try_from_variant_checks_members() {
        let v = Variant::new(2.5f64);
        assert!(OneOf2::<i32, f64>::try_from_variant(&v).is_some());
        assert!(OneOf2::<i32, String>::try_from_variant(&v).is_none());
        assert!(OneOf2::<i32, String>::try_from_variant(&Variant::NULL).is_none());
    }

    #[test]
    fn test_fold_picks_handler() {
        let u: OneOf3<i32, String, f64> = OneOf3::third(1.25);
        let text = u.fold(|i| format!("int {i}"), |s| format!("str {s}"), |f| format!("float {f}"));
        assert_eq!(text, "float 1.25");
    }

    #[test]
    fn test_widening() {
        let narrow: OneOf2<i32, String> = OneOf2::first(9);
        let wide: OneOf4<i32, String, bool, char> = narrow.into();
        assert_eq!(wide.index(), 0);
        assert_eq!(wide.try_first(), Some(9));
    }

    #[test]
    fn test_debug_format() {
        let u: OneOf2<i32, bool> = OneOf2::first(4);
        assert_eq!(format!("{u:?}"), "OneOf2(Variant(i32: 4))");
    }

    #[test]
    fn test_null_variant_member() {
        let u: OneOf2<Variant, i32> = OneOf2::first(Variant::NULL);
        assert_eq!(u.index(), 0);
        assert_eq!(u.try_first().map(|v| v.is_null()), Some(true));
        assert_eq!(u.try_second(), None);
        assert!(u.clone().fold(|v| v.is_null(), |_| false));

        let back = Variant::new(u).try_get::<OneOf2<Variant, i32>>().unwrap();
        assert_eq!(back.index(), 0);
        assert!(back.variant().is_null());
        assert!(Variant::NULL.try_get::<OneOf2<i32, String>>().is_none());
    }

    #[test]
    fn test_tag_keeps_constructed_member() {
        let u: OneOf2<Option<i32>, i32> = OneOf2::second(5);
        assert_eq!(u.index(), 1);
        assert_eq!(u.try_first(), None);
        assert_eq!(u.try_second(), Some(5));
        assert_eq!(u.fold(|_| "first", |_| "second"), "second");

        let wide: OneOf3<Option<i32>, i32, bool> = OneOf2::<Option<i32>, i32>::second(5).into();
        assert_eq!(wide.index(), 1);

        let rebuilt = Variant::new(OneOf2::<Option<i32>, i32>::second(5))
            .try_get::<OneOf2<Option<i32>, i32>>()
            .unwrap();
        assert_eq!(rebuilt.index(), 0, "first accepting member wins");
    }

    #[test]
    fn test_nullable_member() {
        let u: OneOf2<Option<String>, i32> = OneOf2::first(None);
        assert!(u.variant().is_null());
        assert_eq!(u.index(), 0);
        assert_eq!(u.try_first(), Some(None));
    }
}
