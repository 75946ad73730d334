//! Encoder Selector
//!
//! Decides once per concrete type which strategy encodes it, and publishes
//! that decision for the rest of the process.
//!
//! # Selection order
//!
//! 1. `Option<U>`: delegate to `U`'s strategy
//! 2. reference-free value type: small value when it fits the payload, the
//!    decimal strategy for `Decimal`, boxed otherwise
//! 3. value type with references: wrapper struct when it is exactly one
//!    reference wide, boxed otherwise
//! 4. `Variant`: passthrough
//! 5. a type union: its own inner variant
//! 6. anything else: stored as a reference
//!
//! # Publication
//!
//! The shared cache maps `TypeId` to a leaked `Strategy<T>`. A candidate is
//! built outside the lock (building runs `T::shape`, which is user code); the
//! first writer to insert wins and later candidates are dropped. A published
//! strategy never changes.
//!
//! Each thread keeps its own copy of the entries it has resolved, so after a
//! thread's first use of `T` lookups take no lock at all.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::mem::size_of;
use std::sync::OnceLock;

use parking_lot::RwLock;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::bits::PAYLOAD_BYTES;
use crate::encoding::{SmallValue, Strategy, StrategyKind, WrapperStruct};
use crate::registry::{self, EncodingId};
use crate::shape::{RefCodec, TypeShape, VariantType};

type StrategyMap = FxHashMap<TypeId, &'static (dyn Any + Send + Sync)>;

static STRATEGIES: OnceLock<RwLock<StrategyMap>> = OnceLock::new();

thread_local! {
    /// Entries this thread has already seen published.
    static LOCAL: RefCell<StrategyMap> = RefCell::new(FxHashMap::default());
}

fn strategies() -> &'static RwLock<StrategyMap> {
    STRATEGIES.get_or_init(|| RwLock::new(FxHashMap::default()))
}

/// The strategy for `T`, selecting and publishing it on first use.
pub(crate) fn resolve<T: VariantType>() -> &'static Strategy<T> {
    let key = TypeId::of::<T>();

    // `try_with` fails only while the thread is tearing down its locals.
    let local = LOCAL
        .try_with(|local| local.borrow().get(&key).copied())
        .ok()
        .flatten();
    let published = match local {
        Some(strategy) => strategy,
        None => {
            let strategy = publish::<T>(key);
            let _ = LOCAL.try_with(|local| local.borrow_mut().insert(key, strategy));
            strategy
        }
    };

    match published.downcast_ref::<Strategy<T>>() {
        Some(strategy) => strategy,
        None => unreachable!("strategy cache entry keyed by the wrong type"),
    }
}

/// The shared entry for `T`, selecting one if no thread has yet.
fn publish<T: VariantType>(key: TypeId) -> &'static (dyn Any + Send + Sync) {
    if let Some(strategy) = strategies().read().get(&key).copied() {
        return strategy;
    }

    let candidate = select::<T>();
    let mut map = strategies().write();
    match map.entry(key) {
        Entry::Occupied(entry) => *entry.get(),
        Entry::Vacant(entry) => {
            debug!(
                type_name = std::any::type_name::<T>(),
                strategy = %candidate.kind(),
                "resolved variant encoding"
            );
            let leaked: &'static (dyn Any + Send + Sync) = Box::leak(Box::new(candidate));
            *entry.insert(leaked)
        }
    }
}

/// Build the strategy for `T` from its shape.
fn select<T: VariantType>() -> Strategy<T> {
    match T::shape() {
        TypeShape::Nullable(delegate) => Strategy::Nullable(delegate),
        TypeShape::Plain(codec) => match codec {
            Some(codec) if size_of::<T>() <= PAYLOAD_BYTES => {
                Strategy::SmallValue(SmallValue::new(codec))
            }
            _ if TypeId::of::<T>() == TypeId::of::<Decimal>() => Strategy::Decimal,
            _ => Strategy::Reference(RefCodec::boxed()),
        },
        TypeShape::Composite(thin) => match thin {
            Some(codec) if size_of::<T>() == size_of::<usize>() => {
                Strategy::WrapperStruct(WrapperStruct::new(codec))
            }
            _ => Strategy::Reference(RefCodec::boxed()),
        },
        TypeShape::Variant(passthrough) => Strategy::Passthrough(passthrough),
        TypeShape::Union(delegate) => Strategy::Delegate(delegate),
        TypeShape::Reference(codec) => Strategy::Reference(codec),
    }
}

/// The strategy kind selected for `T`.
pub fn strategy_kind<T: VariantType>() -> StrategyKind {
    resolve::<T>().kind()
}

/// The registry identity of `T`'s strategy.
///
/// Only small-value and wrapper-struct strategies are registrable; the
/// others never appear in a variant and return `None`.
pub fn encoding_id_of<T: VariantType>() -> Option<EncodingId> {
    resolve::<T>().encoding().map(registry::identity_of)
}
