//! Declaring user types as storable
//!
//! [`variant_enum!`](crate::variant_enum) lives with the enum support. The
//! macros here cover the three remaining shapes a user type can have.

/// Implement `VariantType` for a value type with no references.
///
/// Without a codec the type is always boxed. With one, it is bit-packed
/// into the payload when it is at most 8 bytes:
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// #[repr(C)]
/// struct Point { x: i32, y: i32 }
///
/// // SAFETY: two i32 fields, no padding.
/// vessel_core::plain_value!(Point => unsafe { vessel_core::BitCodec::bitcast() });
///
/// #[derive(Clone, Debug)]
/// struct Matrix([f64; 4]);
/// vessel_core::plain_value!(Matrix);
/// ```
#[macro_export]
macro_rules! plain_value {
    ($ty:ty) => {
        impl $crate::VariantType for $ty {
            fn shape() -> $crate::TypeShape<Self> {
                $crate::TypeShape::Plain(::std::option::Option::None)
            }
        }
    };
    ($ty:ty => $codec:expr) => {
        impl $crate::VariantType for $ty {
            fn shape() -> $crate::TypeShape<Self> {
                $crate::TypeShape::Plain(::std::option::Option::Some($codec))
            }
        }
    };
}

/// Declare a value type that is exactly one shared reference.
///
/// The generated struct is stored in the variant's slot without an extra
/// allocation and formats as its target.
///
/// ```rust,ignore
/// vessel_core::thin_wrapper! {
///     /// A customer's display name
///     pub struct CustomerName(Arc<String>);
/// }
/// ```
#[macro_export]
macro_rules! thin_wrapper {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident(Arc<$target:ty>);
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug)]
        $vis struct $name(pub ::std::sync::Arc<$target>);

        impl $crate::ThinWrapper for $name {
            type Target = $target;

            fn into_inner(self) -> ::std::sync::Arc<$target> {
                self.0
            }

            fn from_inner(inner: ::std::sync::Arc<$target>) -> Self {
                $name(inner)
            }
        }

        impl $crate::VariantType for $name {
            fn shape() -> $crate::TypeShape<Self> {
                $crate::TypeShape::Composite(::std::option::Option::Some($crate::ThinCodec::of()))
            }

            fn fmt_value(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                <$target as $crate::VariantType>::fmt_value(&self.0, f)
            }
        }
    };
}

/// Implement `VariantType` for a reference type: one allocation per value,
/// stored in the slot as is.
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// struct Session { user: String, roles: Vec<String> }
/// vessel_core::reference_type!(Session);
/// ```
#[macro_export]
macro_rules! reference_type {
    ($ty:ty) => {
        impl $crate::VariantType for $ty {
            fn shape() -> $crate::TypeShape<Self> {
                $crate::TypeShape::Reference($crate::RefCodec::boxed())
            }
        }
    };
}
