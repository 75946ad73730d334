//! Encoding Registry
//!
//! Assigns every encoding strategy a small, stable identity so a variant can
//! name its strategy with nothing but a payload word.
//!
//! # Design
//!
//! Identities are handed out once, in order, under a process-wide lock, and
//! never reused. The table behind them is append-only and bucketed so it can
//! grow without moving published entries:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                EncodingRegistry (global)                 │
//! ├──────────────────────────────────────────────────────────┤
//! │ bucket 0: [ id 1 .. id 32 ]        (32 slots)            │
//! │ bucket 1: [ id 33 .. id 96 ]       (64 slots)            │
//! │ bucket 2: [ id 97 .. id 224 ]      (128 slots)           │
//! │ ...                                                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Performance
//!
//! - **Registration**: one lock acquisition per strategy, ever
//! - **Lookup**: two `OnceLock` reads, no lock (slots are set exactly once)

use std::any::Any;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use tracing::trace;

use crate::enums::EnumValue;
use crate::shape::TypeInfo;
use crate::variant::Variant;

/// Slots in the first bucket; each following bucket doubles.
const FIRST_BUCKET: usize = 32;

/// Number of buckets (enough for ~500 million identities)
const BUCKETS: usize = 24;

/// Stable identity of an encoding strategy. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EncodingId(NonZeroU32);

impl EncodingId {
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// The payload word that names this encoding.
    pub(crate) fn to_payload(self) -> u64 {
        u64::from(self.0.get())
    }

    pub(crate) fn from_payload(payload: u64) -> Option<Self> {
        u32::try_from(payload)
            .ok()
            .and_then(NonZeroU32::new)
            .map(EncodingId)
    }

    /// Bucket index and offset of this identity in the table.
    fn location(self) -> (usize, usize) {
        let index = (self.0.get() - 1) as usize;
        let mut bucket = 0;
        let mut start = 0;
        let mut len = FIRST_BUCKET;
        while index >= start + len {
            start += len;
            len *= 2;
            bucket += 1;
        }
        (bucket, index - start)
    }
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A strategy that can decode variants it produced.
///
/// Only strategies whose variants carry no self-describing object need this:
/// small values (the slot holds the strategy) and wrapper structs (the
/// payload holds the identity).
pub(crate) trait Encoding: Send + Sync + 'static {
    /// Lazily assigned identity cell, see [`identity_of`].
    fn identity(&self) -> &OnceLock<EncodingId>;

    /// The type values decode to.
    fn type_info(&self) -> TypeInfo;

    /// Decode into `out` when it is an `Option<T>` of the stored type.
    fn decode_into(&self, variant: &Variant, out: &mut dyn Any) -> bool;

    fn fmt_value(&self, variant: &Variant, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    fn enum_value(&self, variant: &Variant) -> Option<EnumValue>;
}

type Bucket = Box<[OnceLock<&'static dyn Encoding>]>;

/// Process-wide table from identity to encoding.
pub(crate) struct EncodingRegistry {
    buckets: [OnceLock<Bucket>; BUCKETS],
    len: AtomicU32,
    lock: Mutex<()>,
}

impl EncodingRegistry {
    fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| OnceLock::new()),
            len: AtomicU32::new(0),
            lock: Mutex::new(()),
        }
    }

    /// Append `encoding` and return its new identity.
    ///
    /// Callers go through [`identity_of`], which guarantees each encoding is
    /// registered at most once.
    ///
    /// No user code runs while the lock is held: `type_info` may itself
    /// encode a value and register another strategy.
    fn register(&self, encoding: &'static dyn Encoding) -> EncodingId {
        let id = {
            let _guard = self.lock.lock();

            let next = self.len.load(Ordering::Relaxed) + 1;
            let id = NonZeroU32::new(next).map(EncodingId).expect("identity counter starts at one");
            let (bucket, offset) = id.location();
            assert!(bucket < BUCKETS, "encoding registry exhausted");

            let slots = self.buckets[bucket].get_or_init(|| {
                let len = FIRST_BUCKET << bucket;
                (0..len).map(|_| OnceLock::new()).collect()
            });
            if slots[offset].set(encoding).is_err() {
                unreachable!("encoding slot {id} published twice");
            }
            self.len.store(next, Ordering::Release);
            id
        };

        trace!(id = id.get(), type_name = encoding.type_info().name(), "registered encoding");
        id
    }

    /// The encoding published under `id`, if any.
    fn get(&self, id: EncodingId) -> Option<&'static dyn Encoding> {
        let (bucket, offset) = id.location();
        let slots = self.buckets.get(bucket)?.get()?;
        slots.get(offset)?.get().copied()
    }

    /// Number of identities handed out so far
    fn len(&self) -> usize {
        self.len.load(Ordering::Acquire) as usize
    }
}

static REGISTRY: OnceLock<EncodingRegistry> = OnceLock::new();

fn registry() -> &'static EncodingRegistry {
    REGISTRY.get_or_init(EncodingRegistry::new)
}

/// The identity of `encoding`, registering it on first request.
pub(crate) fn identity_of(encoding: &'static dyn Encoding) -> EncodingId {
    *encoding
        .identity()
        .get_or_init(|| registry().register(encoding))
}

/// The encoding published under `id`.
///
/// # Panics
/// Panics if `id` was never handed out; identities only come from
/// [`identity_of`], so this indicates a corrupted variant.
pub(crate) fn encoding_at(id: EncodingId) -> &'static dyn Encoding {
    match registry().get(id) {
        Some(encoding) => encoding,
        None => panic!("encoding identity {id} was never registered"),
    }
}

/// Number of encodings registered in this process.
pub fn registered_encodings() -> usize {
    registry().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe {
        id: OnceLock<EncodingId>,
    }

    impl Encoding for Probe {
        fn identity(&self) -> &OnceLock<EncodingId> {
            &self.id
        }

        fn type_info(&self) -> TypeInfo {
            TypeInfo::of::<Probe>()
        }

        fn decode_into(&self, _variant: &Variant, _out: &mut dyn Any) -> bool {
            false
        }

        fn fmt_value(&self, _variant: &Variant, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }

        fn enum_value(&self, _variant: &Variant) -> Option<EnumValue> {
            None
        }
    }

    fn leak_probe() -> &'static Probe {
        Box::leak(Box::new(Probe { id: OnceLock::new() }))
    }

    #[test]
    fn test_bucket_locations() {
        let at = |raw: u32| EncodingId(NonZeroU32::new(raw).unwrap()).location();
        assert_eq!(at(1), (0, 0));
        assert_eq!(at(32), (0, 31));
        assert_eq!(at(33), (1, 0));
        assert_eq!(at(96), (1, 63));
        assert_eq!(at(97), (2, 0));
    }

    #[test]
    fn test_local_registry_grows_across_buckets() {
        let registry = EncodingRegistry::new();
        let ids: Vec<_> = (0..100).map(|_| registry.register(leak_probe())).collect();

        assert_eq!(ids[0].get(), 1);
        assert_eq!(ids[99].get(), 100);
        assert_eq!(registry.len(), 100);
        for id in ids {
            assert!(registry.get(id).is_some());
        }
        let unknown = EncodingId(NonZeroU32::new(101).unwrap());
        assert!(registry.get(unknown).is_none());
    }

    #[test]
    fn test_identity_is_stable() {
        let probe = leak_probe();
        let first = identity_of(probe);
        let second = identity_of(probe);
        assert_eq!(first, second);

        let found = encoding_at(first);
        assert!(std::ptr::addr_eq(found, probe as &dyn Encoding));
    }

    #[test]
    fn test_concurrent_registration_unique() {
        use std::collections::HashSet;
        use std::thread;

        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| (0..16).map(|_| identity_of(leak_probe())).collect::<Vec<_>>()))
            .collect();

        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(seen.insert(id), "identity {id} assigned twice");
            }
        }
        assert_eq!(seen.len(), 128);
    }

    /// Registers another encoding from inside its own `type_info`.
    struct Nested {
        id: OnceLock<EncodingId>,
        inner: &'static Probe,
    }

    impl Encoding for Nested {
        fn identity(&self) -> &OnceLock<EncodingId> {
            &self.id
        }

        fn type_info(&self) -> TypeInfo {
            identity_of(self.inner);
            TypeInfo::of::<Nested>()
        }

        fn decode_into(&self, _variant: &Variant, _out: &mut dyn Any) -> bool {
            false
        }

        fn fmt_value(&self, _variant: &Variant, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Ok(())
        }

        fn enum_value(&self, _variant: &Variant) -> Option<EnumValue> {
            None
        }
    }

    #[test]
    fn test_type_info_may_register_while_traced() {
        use std::sync::mpsc;
        use std::thread;
        use std::time::Duration;

        let nested: &'static Nested = Box::leak(Box::new(Nested {
            id: OnceLock::new(),
            inner: leak_probe(),
        }));
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_test_writer()
                .finish();
            let id = tracing::subscriber::with_default(subscriber, || identity_of(nested));
            let _ = tx.send(id);
        });

        let id = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("registration finished");
        assert_eq!(identity_of(nested), id);
        assert!(nested.inner.id.get().is_some(), "inner encoding registered too");
    }

    #[test]
    fn test_payload_roundtrip() {
        let id = EncodingId(NonZeroU32::new(77).unwrap());
        assert_eq!(EncodingId::from_payload(id.to_payload()), Some(id));
        assert_eq!(EncodingId::from_payload(0), None);
        assert_eq!(EncodingId::from_payload(u64::MAX), None);
    }
}
