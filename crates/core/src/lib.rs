//! Vessel Core: compact, type-erased variant values
//!
//! A [`Variant`] holds one value of any [`VariantType`] in a fixed-size
//! slot + payload pair, picking per type the cheapest layout that still
//! round-trips the exact type:
//!
//! - SmallValue: padding-free values up to 8 bytes live in the payload
//! - WrapperStruct: one-reference wrappers live in the slot unboxed
//! - Decimal: packed to 64 bits when small enough, boxed otherwise
//! - Reference: everything else sits behind a shared object
//!
//! # Modules
//!
//! - `bits`: the audited bit-cast primitive behind small values
//! - `shape`: `VariantType`, the per-type layout description
//! - `registry`: process-wide identities for encoding strategies
//! - `encoding`: the strategies themselves
//! - `selector`: the one-time, per-type strategy decision
//! - `variant`: the `Variant` value and its accessors
//! - `convert`: numeric, text, enum and temporal coercions
//! - `enums` / `macros`: declaring user types as storable
//!
//! # Features
//!
//! - `temporal` (default): chrono date/time types and their conversions

pub mod bits;
pub mod convert;
pub mod enums;
pub mod error;
pub mod registry;
pub mod selector;
pub mod shape;
pub mod variant;

mod encoding;
mod impls;
mod macros;

pub use bits::BitCodec;
pub use convert::{Convert, convert_enum};
pub use encoding::StrategyKind;
pub use enums::{EnumValue, VariantEnum};
pub use error::VariantError;
pub use registry::{EncodingId, registered_encodings};
pub use selector::{encoding_id_of, strategy_kind};
pub use shape::{RefCodec, ThinCodec, ThinWrapper, TypeInfo, TypeShape, TypeUnion, VariantType};
pub use variant::Variant;

pub use rust_decimal::Decimal;

#[cfg(feature = "temporal")]
pub use chrono;
