//! Wrapper-struct strategy: a one-reference value type stored without an
//! extra box. The payload carries the strategy identity so the shared
//! reference decodes back to the wrapper type rather than its target.

use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

use crate::enums::EnumValue;
use crate::registry::{self, Encoding, EncodingId};
use crate::shape::{ThinCodec, TypeInfo, VariantType};
use crate::variant::{Slot, Variant};

pub(crate) struct WrapperStruct<T> {
    codec: ThinCodec<T>,
    id: OnceLock<EncodingId>,
}

impl<T: VariantType> WrapperStruct<T> {
    pub(crate) fn new(codec: ThinCodec<T>) -> Self {
        Self {
            codec,
            id: OnceLock::new(),
        }
    }

    pub(crate) fn encode(&'static self, value: T) -> Variant {
        let id = registry::identity_of(self);
        Variant::from_parts(Slot::Object(self.codec.wrap(value)), id.to_payload())
    }

    fn decode(&self, variant: &Variant) -> Option<T> {
        self.codec.unwrap(variant.object()?)
    }
}

impl<T: VariantType> Encoding for WrapperStruct<T> {
    fn identity(&self) -> &OnceLock<EncodingId> {
        &self.id
    }

    fn type_info(&self) -> TypeInfo {
        T::type_info()
    }

    fn decode_into(&self, variant: &Variant, out: &mut dyn Any) -> bool {
        let Some(slot) = out.downcast_mut::<Option<T>>() else {
            return false;
        };
        *slot = self.decode(variant);
        slot.is_some()
    }

    fn fmt_value(&self, variant: &Variant, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.decode(variant) {
            Some(value) => value.fmt_value(f),
            None => Ok(()),
        }
    }

    fn enum_value(&self, variant: &Variant) -> Option<EnumValue> {
        self.decode(variant)?.as_enum()
    }
}
