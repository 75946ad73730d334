//! Type Shapes
//!
//! Rust has no runtime reflection, so every storable type describes its own
//! layout through [`VariantType::shape`]. The encoder selector reads that
//! description (plus `size_of`) once per type and picks a strategy.
//!
//! | Shape | Meaning | Candidate strategies |
//! |---|---|---|
//! | `Plain` | value type, no references in its layout | small value, decimal, boxed |
//! | `Composite` | value type holding references | wrapper struct, boxed |
//! | `Nullable` | `Option<U>` | delegate to `U` |
//! | `Variant` | `Variant` itself | passthrough |
//! | `Union` | a [`TypeUnion`] | the union's own variant |
//! | `Reference` | shared heap object | stored in the slot as is |

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use crate::bits::BitCodec;
use crate::enums::EnumValue;
use crate::variant::Variant;

/// Runtime identity of the type a variant decodes to.
#[derive(Clone, Copy)]
pub struct TypeInfo {
    id: TypeId,
    name: &'static str,
}

impl TypeInfo {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The type of the null variant: the root every stored type is an instance of.
    pub fn object() -> Self {
        Self {
            id: TypeId::of::<dyn Any>(),
            name: "object",
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check if this is exactly `T`
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type that can be stored in a [`Variant`].
///
/// Implementations for the primitive and standard types ship with the crate.
/// User types usually implement it through [`variant_enum!`](crate::variant_enum),
/// [`plain_value!`](crate::plain_value), [`thin_wrapper!`](crate::thin_wrapper)
/// or [`reference_type!`](crate::reference_type).
pub trait VariantType: Clone + fmt::Debug + Send + Sync + 'static {
    /// Layout facts the encoder selector uses to pick a strategy.
    fn shape() -> TypeShape<Self>;

    /// The type reported by `Variant::type_info` for stored values.
    fn type_info() -> TypeInfo {
        TypeInfo::of::<Self>()
    }

    /// Text produced by the variant's `Display`.
    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }

    /// Underlying discriminant and name, for enums.
    fn as_enum(&self) -> Option<EnumValue> {
        None
    }

    /// Retrieve a `Self` from `variant`.
    ///
    /// The default accepts exactly the stored type. Nullable, shared and
    /// union types widen this.
    fn from_variant(variant: &Variant) -> Option<Self> {
        variant.decode_exact::<Self>()
    }
}

/// A tagged union whose value is itself a variant.
///
/// Encoding a union into a `Variant` yields the union's inner variant, so
/// unions nest and convert between each other without rewrapping.
pub trait TypeUnion: VariantType {
    fn into_variant(self) -> Variant;

    fn try_from_variant(variant: &Variant) -> Option<Self>;
}

/// A value type that is exactly one shared reference wide.
pub trait ThinWrapper: Sized {
    type Target: VariantType;

    fn into_inner(self) -> Arc<Self::Target>;

    fn from_inner(inner: Arc<Self::Target>) -> Self;
}

/// Layout description of `T`, see the module docs.
pub enum TypeShape<T> {
    Plain(Option<BitCodec<T>>),
    Composite(Option<ThinCodec<T>>),
    Nullable(fn(T) -> Variant),
    Variant(fn(T) -> Variant),
    Union(fn(T) -> Variant),
    Reference(RefCodec<T>),
}

impl<T: TypeUnion> TypeShape<T> {
    pub fn union() -> Self {
        TypeShape::Union(T::into_variant)
    }
}

impl<T: Copy + 'static> TypeShape<T> {
    /// A plain shape packed by raw byte copy.
    ///
    /// # Safety
    /// Same contract as [`BitCodec::bitcast`]; types wider than the payload
    /// must use `TypeShape::Plain(None)` instead.
    pub unsafe fn bitcast() -> Self {
        // SAFETY: forwarded to the caller.
        TypeShape::Plain(Some(unsafe { BitCodec::bitcast() }))
    }
}

impl<T> fmt::Debug for TypeShape<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeShape::Plain(Some(_)) => "Plain(packable)",
            TypeShape::Plain(None) => "Plain",
            TypeShape::Composite(Some(_)) => "Composite(thin)",
            TypeShape::Composite(None) => "Composite",
            TypeShape::Nullable(_) => "Nullable",
            TypeShape::Variant(_) => "Variant",
            TypeShape::Union(_) => "Union",
            TypeShape::Reference(_) => "Reference",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Slot objects
// =============================================================================

/// A value living behind the variant's reference slot.
pub(crate) trait Object: Any + Send + Sync {
    fn type_info(&self) -> TypeInfo;

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn enum_value(&self) -> Option<EnumValue>;

    /// True when the object is a value type rather than a reference type.
    ///
    /// Decided by the object's type alone: an `Arc<U>` the caller shared in
    /// through [`RefCodec::shared`] reports the same as a boxed `U`.
    fn is_boxed_value(&self) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: VariantType> Object for T {
    fn type_info(&self) -> TypeInfo {
        <T as VariantType>::type_info()
    }

    fn fmt_value(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        VariantType::fmt_value(self, f)
    }

    fn enum_value(&self) -> Option<EnumValue> {
        self.as_enum()
    }

    fn is_boxed_value(&self) -> bool {
        !matches!(<T as VariantType>::shape(), TypeShape::Reference(_))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Moves a single-reference wrapper in and out of the slot without boxing.
pub struct ThinCodec<T> {
    wrap: fn(T) -> Arc<dyn Object>,
    unwrap: fn(&Arc<dyn Object>) -> Option<T>,
}

impl<T> Clone for ThinCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ThinCodec<T> {}

impl<T: ThinWrapper> ThinCodec<T> {
    pub fn of() -> Self {
        Self {
            wrap: wrap_thin::<T>,
            unwrap: unwrap_thin::<T>,
        }
    }
}

impl<T> ThinCodec<T> {
    pub(crate) fn wrap(&self, value: T) -> Arc<dyn Object> {
        (self.wrap)(value)
    }

    pub(crate) fn unwrap(&self, object: &Arc<dyn Object>) -> Option<T> {
        (self.unwrap)(object)
    }
}

fn wrap_thin<T: ThinWrapper>(value: T) -> Arc<dyn Object> {
    value.into_inner()
}

fn unwrap_thin<T: ThinWrapper>(object: &Arc<dyn Object>) -> Option<T> {
    let inner = Arc::clone(object).into_any().downcast::<T::Target>().ok()?;
    Some(T::from_inner(inner))
}

/// Moves a value into the slot as a shared object and reads it back.
pub struct RefCodec<T> {
    into_object: fn(T) -> Arc<dyn Object>,
    from_object: fn(&Arc<dyn Object>) -> Option<T>,
}

impl<T> Clone for RefCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RefCodec<T> {}

impl<T: VariantType> RefCodec<T> {
    /// Allocate a fresh object holding the value.
    pub fn boxed() -> Self {
        Self {
            into_object: box_object::<T>,
            from_object: unbox_object::<T>,
        }
    }
}

impl<U: VariantType> RefCodec<Arc<U>> {
    /// Store an existing `Arc` as the object, sharing its allocation.
    pub fn shared() -> Self {
        Self {
            into_object: share_object::<U>,
            from_object: unshare_object::<U>,
        }
    }
}

impl<T> RefCodec<T> {
    pub(crate) fn into_object(&self, value: T) -> Arc<dyn Object> {
        (self.into_object)(value)
    }

    pub(crate) fn from_object(&self, object: &Arc<dyn Object>) -> Option<T> {
        (self.from_object)(object)
    }
}

fn box_object<T: VariantType>(value: T) -> Arc<dyn Object> {
    Arc::new(value)
}

fn unbox_object<T: VariantType>(object: &Arc<dyn Object>) -> Option<T> {
    object.as_any().downcast_ref::<T>().cloned()
}

fn share_object<U: VariantType>(value: Arc<U>) -> Arc<dyn Object> {
    value
}

fn unshare_object<U: VariantType>(object: &Arc<dyn Object>) -> Option<Arc<U>> {
    Arc::clone(object).into_any().downcast::<U>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_info_identity() {
        assert_eq!(TypeInfo::of::<i32>(), TypeInfo::of::<i32>());
        assert_ne!(TypeInfo::of::<i32>(), TypeInfo::of::<i64>());
        assert!(TypeInfo::of::<String>().is::<String>());
        assert_eq!(TypeInfo::object().name(), "object");
        assert_eq!(TypeInfo::of::<u8>().to_string(), "u8");
    }

    #[test]
    fn test_boxed_object_roundtrip() {
        let codec = RefCodec::<String>::boxed();
        let object = codec.into_object("hello".to_string());
        assert!(object.is_boxed_value());
        assert_eq!(object.type_info(), TypeInfo::of::<String>());
        assert_eq!(codec.from_object(&object).as_deref(), Some("hello"));
        assert!(RefCodec::<i32>::boxed().from_object(&object).is_none());
    }

    #[test]
    fn test_shared_object_keeps_allocation() {
        let shared = Arc::new("abc".to_string());
        let codec = RefCodec::<Arc<String>>::shared();
        let object = codec.into_object(Arc::clone(&shared));
        let back = codec.from_object(&object).unwrap();
        assert!(Arc::ptr_eq(&shared, &back));
    }
}
