//! Encoding Strategies
//!
//! The closed set of ways a value can be laid out inside a [`Variant`]:
//!
//! - **SmallValue**: reference-free value packed into the payload; the slot
//!   holds the strategy itself as a sentinel.
//! - **WrapperStruct**: a value that is exactly one shared reference; the
//!   slot holds the reference and the payload holds the strategy identity.
//! - **Decimal**: packed as a reduced 64-bit decimal when it fits, boxed
//!   otherwise.
//! - **Reference**: the value (boxed if needed) sits in the slot, payload 0.
//! - **Nullable / Passthrough / Delegate**: never stored; they hand the value
//!   to another strategy (`Option<U>` to `U`, a `Variant` to itself, a union
//!   to its inner variant).

mod decimal;
mod small;
mod wrapper;

use std::fmt;

pub(crate) use small::SmallValue;
pub(crate) use wrapper::WrapperStruct;

use crate::registry::Encoding;
use crate::shape::{RefCodec, VariantType};
use crate::variant::{Slot, Variant};

/// Which strategy the selector chose for a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    SmallValue,
    WrapperStruct,
    Decimal,
    Reference,
    Nullable,
    Passthrough,
    Delegate,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::SmallValue => "small-value",
            StrategyKind::WrapperStruct => "wrapper-struct",
            StrategyKind::Decimal => "decimal",
            StrategyKind::Reference => "reference",
            StrategyKind::Nullable => "nullable",
            StrategyKind::Passthrough => "passthrough",
            StrategyKind::Delegate => "delegate",
        };
        f.write_str(name)
    }
}

/// The strategy published for one concrete type.
pub(crate) enum Strategy<T> {
    SmallValue(SmallValue<T>),
    WrapperStruct(WrapperStruct<T>),
    Decimal,
    Reference(RefCodec<T>),
    Nullable(fn(T) -> Variant),
    Passthrough(fn(T) -> Variant),
    Delegate(fn(T) -> Variant),
}

impl<T: VariantType> Strategy<T> {
    pub(crate) fn encode(&'static self, value: T) -> Variant {
        match self {
            Strategy::SmallValue(encoding) => encoding.encode(value),
            Strategy::WrapperStruct(encoding) => encoding.encode(value),
            Strategy::Decimal => decimal::encode(value),
            Strategy::Reference(codec) => {
                Variant::from_parts(Slot::Object(codec.into_object(value)), 0)
            }
            Strategy::Nullable(delegate)
            | Strategy::Passthrough(delegate)
            | Strategy::Delegate(delegate) => delegate(value),
        }
    }

    pub(crate) fn kind(&self) -> StrategyKind {
        match self {
            Strategy::SmallValue(_) => StrategyKind::SmallValue,
            Strategy::WrapperStruct(_) => StrategyKind::WrapperStruct,
            Strategy::Decimal => StrategyKind::Decimal,
            Strategy::Reference(_) => StrategyKind::Reference,
            Strategy::Nullable(_) => StrategyKind::Nullable,
            Strategy::Passthrough(_) => StrategyKind::Passthrough,
            Strategy::Delegate(_) => StrategyKind::Delegate,
        }
    }

    /// The registrable encoding behind this strategy, if it has one.
    pub(crate) fn encoding(&'static self) -> Option<&'static dyn Encoding> {
        match self {
            Strategy::SmallValue(encoding) => Some(encoding as &'static dyn Encoding),
            Strategy::WrapperStruct(encoding) => Some(encoding as &'static dyn Encoding),
            _ => None,
        }
    }
}
