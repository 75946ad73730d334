//! Payload Bit Packing
//!
//! The one place where a value's bytes are reinterpreted as the 64-bit
//! payload of a [`Variant`](crate::Variant) and back.
//!
//! ## Layout
//!
//! ```text
//! payload (u64, little end first in memory)
//! ┌──────────────────────────────┬──────────────────────────┐
//! │ size_of::<T>() bytes of T    │ zero fill up to 8 bytes  │
//! └──────────────────────────────┴──────────────────────────┘
//! ```
//!
//! Both directions assert `size_of::<T>() <= 8` at compile time. Everything
//! else that touches payload bits goes through a [`BitCodec`].

use std::mem::{MaybeUninit, size_of};
use std::ptr;

/// Number of bytes available in the payload word.
pub const PAYLOAD_BYTES: usize = size_of::<u64>();

/// Copy the bytes of `value` into the low bytes of a zeroed payload word.
///
/// # Safety
/// `T` must not contain padding or otherwise uninitialized bytes, or the
/// returned word would be partially uninitialized.
#[inline(always)]
pub unsafe fn to_bits<T: Copy + 'static>(value: &T) -> u64 {
    const { assert!(size_of::<T>() <= PAYLOAD_BYTES, "value does not fit the payload") };
    let mut bits: u64 = 0;
    // SAFETY: the destination is 8 writable bytes and T is at most 8 bytes.
    // Caller guarantees every copied byte is initialized.
    unsafe {
        ptr::copy_nonoverlapping(
            (value as *const T).cast::<u8>(),
            (&mut bits as *mut u64).cast::<u8>(),
            size_of::<T>(),
        );
    }
    bits
}

/// Rebuild a `T` from a payload word produced by [`to_bits`].
///
/// # Safety
/// `bits` must have been produced by `to_bits::<T>` on a valid `T`.
#[inline(always)]
pub unsafe fn from_bits<T: Copy + 'static>(bits: u64) -> T {
    const { assert!(size_of::<T>() <= PAYLOAD_BYTES, "value does not fit the payload") };
    let mut value = MaybeUninit::<T>::uninit();
    // SAFETY: the source holds the bytes of a valid T (caller contract) and
    // the destination has room for exactly size_of::<T>() bytes.
    unsafe {
        ptr::copy_nonoverlapping(
            (&bits as *const u64).cast::<u8>(),
            value.as_mut_ptr().cast::<u8>(),
            size_of::<T>(),
        );
        value.assume_init()
    }
}

/// Packs a small value into the payload word and unpacks it again.
///
/// A codec is the capability the encoder selector needs before it may choose
/// the small-value strategy for a type. Build one with [`BitCodec::bitcast`]
/// for padding-free types, or [`BitCodec::new`] with an explicit mapping.
pub struct BitCodec<T> {
    pack: fn(&T) -> u64,
    unpack: fn(u64) -> T,
}

impl<T> Clone for BitCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for BitCodec<T> {}

impl<T> std::fmt::Debug for BitCodec<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitCodec").finish_non_exhaustive()
    }
}

impl<T> BitCodec<T> {
    /// A codec from an explicit mapping.
    ///
    /// `unpack` is only ever handed words that `pack` produced for this type.
    pub const fn new(pack: fn(&T) -> u64, unpack: fn(u64) -> T) -> Self {
        Self { pack, unpack }
    }

    #[inline]
    pub fn pack(&self, value: &T) -> u64 {
        (self.pack)(value)
    }

    #[inline]
    pub fn unpack(&self, bits: u64) -> T {
        (self.unpack)(bits)
    }
}

impl<T: Copy + 'static> BitCodec<T> {
    /// A codec that copies the raw bytes of `T`.
    ///
    /// # Safety
    /// `T` must be at most 8 bytes and free of padding. Fieldless enums with
    /// an integer `#[repr]`, primitive numbers, `bool` and `char` qualify.
    pub const unsafe fn bitcast() -> Self {
        Self {
            pack: pack_raw::<T>,
            unpack: unpack_raw::<T>,
        }
    }
}

fn pack_raw<T: Copy + 'static>(value: &T) -> u64 {
    // SAFETY: only reachable through `BitCodec::bitcast`, whose contract
    // rules out padding.
    unsafe { to_bits(value) }
}

fn unpack_raw<T: Copy + 'static>(bits: u64) -> T {
    // SAFETY: a bitcast codec only unpacks words its own pack produced.
    unsafe { from_bits(bits) }
}
