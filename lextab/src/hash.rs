//! Primary hash ids.
//!
//! A [`HashTable`](crate::HashTable) with `table_size` primary slots sends every key to a slot in
//! `1..=table_size` (slot 0 is reserved as the miss sentinel). The mapping is a [`SlotHasher`].
//!
//! Two hashers are provided:
//!
//! - [`LegacyHasher`] mixes just the first byte, the last byte and the length of the key. It's
//!   cheap, and it's bit-compatible with existing consumers of such tables, so use it when the
//!   tables are probed by code you don't control.
//! - [`SeededHasher`] hashes every byte with rapidhash. It distributes long keys with common
//!   prefixes and suffixes better, at the cost of a full pass over the key on every lookup.
//!
//! The table compiler only relies on the contract of [`SlotHasher`], so any other function can be
//! plugged in as long as the consumer uses the same one.

use core::hash::Hasher;
use rapidhash::RapidHasher;

/// A function from keys to primary slots.
///
/// Implementations must be deterministic and portable: the table is built on the host and probed
/// on the target, possibly with a different pointer width.
pub trait SlotHasher {
    /// Compute the primary slot of `key`.
    ///
    /// `table_size` is never zero, and the result must lie in `1..=table_size`. If `case_folding`
    /// is set, keys that differ only in ASCII case must be mapped to the same slot.
    fn slot(&self, key: &[u8], table_size: usize, case_folding: bool) -> usize;
}

/// The `first * last * first + length` hash.
///
/// # Informational
///
/// `((first * last * first + key.len()) % table_size) + 1`, where `first` and `last` are the first
/// and the last byte of the key, ASCII-lowercased when case folding is enabled. An empty key uses
/// 0 for both bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegacyHasher;

impl LegacyHasher {
    /// Create the hasher. It has no state.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SlotHasher for LegacyHasher {
    #[inline]
    #[allow(
        clippy::arithmetic_side_effects,
        reason = "the product is below 2^24, table_size is nonzero"
    )]
    fn slot(&self, key: &[u8], table_size: usize, case_folding: bool) -> usize {
        let fold = |byte: u8| {
            usize::from(if case_folding {
                byte.to_ascii_lowercase()
            } else {
                byte
            })
        };
        let first = key.first().map_or(0, |&byte| fold(byte));
        let last = key.last().map_or(0, |&byte| fold(byte));
        (first * last * first).wrapping_add(key.len()) % table_size + 1
    }
}

/// Rapidhash over the whole key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeededHasher {
    seed: u64,
}

impl SeededHasher {
    /// Hexadecimal digits of pi - 3
    pub const DEFAULT_SEED: u64 = 0x243f_6a88_85a3_08d3;

    /// Create a hasher with the given seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// The seed this hasher was created with.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for SeededHasher {
    #[inline]
    fn default() -> Self {
        Self::new(Self::DEFAULT_SEED)
    }
}

impl SlotHasher for SeededHasher {
    #[inline]
    #[allow(clippy::arithmetic_side_effects, reason = "table_size is nonzero")]
    fn slot(&self, key: &[u8], table_size: usize, case_folding: bool) -> usize {
        let mut state = RapidHasher::new(self.seed);
        // Folded and unfolded keys must feed identical chunks, so always go through the buffer
        let mut buffer = [0u8; 32];
        for chunk in key.chunks(buffer.len()) {
            let bytes = &mut buffer[..chunk.len()];
            bytes.copy_from_slice(chunk);
            if case_folding {
                bytes.make_ascii_lowercase();
            }
            state.write(bytes);
        }
        state.write_u64(key.len() as u64);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "the remainder is below table_size"
        )]
        let slot = (state.finish() % table_size as u64) as usize;
        slot + 1
    }
}

/// Compare two keys, ignoring ASCII case if `case_folding` is set.
#[inline]
pub(crate) fn keys_equal(a: &[u8], b: &[u8], case_folding: bool) -> bool {
    if case_folding {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for LegacyHasher {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let hasher = gen.path("lextab::hash::LegacyHasher");
        quote::quote!(#hasher::new())
    }
}

#[cfg(feature = "codegen")]
impl super::codegen::Codegen for SeededHasher {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let hasher = gen.path("lextab::hash::SeededHasher");
        let seed = gen.piece(&self.seed);
        quote::quote!(#hasher::new(#seed))
    }
}
