//! Static lookup tables for name-to-token resolution.
//!
//! Parsers often need to turn a short name (a tag name, an attribute name, an encoding label,
//! a named character reference) into a token. The sets of names are known when the parser is
//! built, so the lookup structures can be computed ahead of time and embedded as constant data.
//!
//! This crate provides two such structures:
//!
//! - [`HashTable`], a small chained hash table. Its size is picked by an exhaustive search over a
//!   window of candidate sizes, minimizing the longest collision chain. It's not a perfect hash,
//!   but for typical name sets the chains stay at one or two cells.
//! - [`Trie`], a layered binary-search trie for recognizing the longest name that is a prefix of
//!   the input, one byte at a time. This is what named character references need, as `&amp` and
//!   `&ampersand`-style names overlap.
//!
//! # Usage
//!
//! The structures are built from a [`KeyValueSet`] and a [`Config`] with the `build` feature
//! (enabled by default):
//!
//! ```rust
//! # fn main() -> Result<(), lextab::Error> {
//! let set = lextab::KeyValueSet::from_entries([("div", 1u16), ("span", 2), ("a", 3)])?;
//! let compilation = lextab::HashTable::compile(&set, &lextab::Config::default())?;
//! assert_eq!(compilation.table.get("SPAN"), Some(&2));
//! # Ok(())
//! # }
//! ```
//!
//! A compiled structure can then be emitted in one of two ways:
//!
//! 1. As Rust code with [`codegen`] (the `codegen` feature), typically from `build.rs`, and then
//!    `include!`d into a `static`. The lookup code is `no_std` and doesn't allocate, so the
//!    consumer can depend on this crate with default features disabled.
//! 2. As C-style static array initializers with [`render`], for runtimes written in other
//!    languages.
//!
//! Lifetime parameters specify the duration of the borrow of keys and cells; generated tables are
//! `'static`.

#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod codegen;
#[cfg(feature = "alloc")]
mod config;
#[cfg(feature = "alloc")]
mod entries;
#[cfg(feature = "alloc")]
mod error;
pub mod hash;
#[cfg(feature = "build")]
pub mod render;
#[cfg(feature = "build")]
pub mod search;
mod table;
pub mod trie;

#[cfg(feature = "alloc")]
pub use config::{Config, OverflowPlacement};
#[cfg(feature = "alloc")]
pub use entries::{Entry, KeyValueSet};
#[cfg(feature = "alloc")]
pub use error::{Error, Warning};
#[cfg(feature = "build")]
pub use table::Compilation;
pub use table::{Cell, HashTable};
pub use trie::{Trie, TrieNode};

#[derive(Clone, Debug)]
#[doc(hidden)]
#[non_exhaustive]
pub enum BorrowedOrOwnedSlice<'a, T> {
    Borrowed(&'a [T]),
    #[cfg(feature = "alloc")]
    Owned(alloc::vec::Vec<T>),
}

impl<T> core::ops::Deref for BorrowedOrOwnedSlice<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        match self {
            Self::Borrowed(r) => r,
            #[cfg(feature = "alloc")]
            Self::Owned(o) => o,
        }
    }
}

#[cfg(feature = "serde")]
impl<T: serde::Serialize> serde::Serialize for BorrowedOrOwnedSlice<'_, T> {
    #[inline]
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (**self).serialize(serializer)
    }
}

#[cfg(all(test, feature = "build"))]
mod tests;
