//! Small-value strategy: the value lives in the payload word.

use std::any::Any;
use std::fmt;
use std::sync::OnceLock;

use crate::bits::BitCodec;
use crate::enums::EnumValue;
use crate::registry::{Encoding, EncodingId};
use crate::shape::{TypeInfo, VariantType};
use crate::variant::{Slot, Variant};

pub(crate) struct SmallValue<T> {
    codec: BitCodec<T>,
    id: OnceLock<EncodingId>,
}

impl<T: VariantType> SmallValue<T> {
    pub(crate) fn new(codec: BitCodec<T>) -> Self {
        Self {
            codec,
            id: OnceLock::new(),
        }
    }

    pub(crate) fn encode(&'static self, value: T) -> Variant {
        Variant::from_parts(Slot::Encoding(self), self.codec.pack(&value))
    }

    fn decode(&self, variant: &Variant) -> T {
        self.codec.unpack(variant.payload())
    }
}

impl<T: VariantType> Encoding for SmallValue<T> {
    fn identity(&self) -> &OnceLock<EncodingId> {
        &self.id
    }

    fn type_info(&self) -> TypeInfo {
        T::type_info()
    }

    fn decode_into(&self, variant: &Variant, out: &mut dyn Any) -> bool {
        match out.downcast_mut::<Option<T>>() {
            Some(slot) => {
                *slot = Some(self.decode(variant));
                true
            }
            None => false,
        }
    }

    fn fmt_value(&self, variant: &Variant, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.decode(variant).fmt_value(f)
    }

    fn enum_value(&self, variant: &Variant) -> Option<EnumValue> {
        self.decode(variant).as_enum()
    }
}
