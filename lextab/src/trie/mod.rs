//! Layered binary-search tries.
//!
//! A [`Trie`] recognizes names byte by byte. Each *layer* decides the byte at one position: it's
//! a balanced binary search tree over the distinct bytes that the still-possible names have at that
//! position. A node of a layer stores the byte, the left (smaller) and right (larger) children
//! within the layer, the value of the name ending at this node if there is one, and the root of the
//! next layer if some name continues past it.
//!
//! All layers live in one flat array. Index 0 is a sentinel that terminates searches, and the first
//! layer is rooted at [`ROOT`]. Child and next-layer links of 0 mean "absent".
//!
//!
//! # Matching policy
//!
//! The trie itself doesn't decide what happens when a name is a prefix of another one. The lookups
//! in this module implement *longest match wins*: matching continues past nodes that end a name and
//! the last such node reached is reported. This is what named character references need: given
//! `&notin;`, the reference is `notin`, not `not`. See [`Matcher`] for the incremental version.

#[cfg(feature = "build")]
mod build;
mod matcher;

pub use matcher::{Match, Matcher, Step};

use super::BorrowedOrOwnedSlice;

/// Index of the root of the first layer.
pub const ROOT: usize = 1;

/// A node of a [`Trie`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TrieNode<V> {
    byte: u8,
    value: Option<V>,
    left: usize,
    right: usize,
    next: usize,
}

impl<V> TrieNode<V> {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(
        byte: u8,
        value: Option<V>,
        left: usize,
        right: usize,
        next: usize,
    ) -> Self {
        Self {
            byte,
            value,
            left,
            right,
            next,
        }
    }

    /// The byte this node matches.
    #[inline]
    #[must_use]
    pub const fn byte(&self) -> u8 {
        self.byte
    }

    /// The value of the name ending at this node.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Index of the node with the next smaller byte in this layer, or 0.
    #[inline]
    #[must_use]
    pub const fn left(&self) -> usize {
        self.left
    }

    /// Index of the node with the next larger byte in this layer, or 0.
    #[inline]
    #[must_use]
    pub const fn right(&self) -> usize {
        self.right
    }

    /// Index of the root of the next layer, or 0 if no name continues past this node.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> usize {
        self.next
    }

    /// Whether a name ends at this node.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.value.is_some()
    }
}

/// A flattened, layered binary-search trie.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Trie<'a, V> {
    nodes: BorrowedOrOwnedSlice<'a, TrieNode<V>>,
}

impl<'a, V> Trie<'a, V> {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(nodes: &'a [TrieNode<V>]) -> Self {
        Self {
            nodes: BorrowedOrOwnedSlice::Borrowed(nodes),
        }
    }

    /// All nodes, including the sentinel at index 0.
    #[inline]
    pub fn nodes(&self) -> &[TrieNode<V>] {
        &self.nodes
    }

    /// Check if the trie recognizes no names.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= ROOT
    }

    /// Find the node matching `byte` in the layer rooted at `layer`.
    ///
    /// Returns the index of the node along with the node. Costs one comparison per visited node,
    /// i.e. about `log2` of the number of distinct bytes in the layer.
    #[inline]
    pub fn find(&self, layer: usize, byte: u8) -> Option<(usize, &TrieNode<V>)> {
        find(&self.nodes, layer, byte)
    }

    /// Get the value of a name, matched exactly.
    ///
    /// `name` excludes the prefix skipped at compilation time.
    #[inline]
    pub fn get(&self, name: &[u8]) -> Option<&V> {
        let (&last, init) = name.split_last()?;
        let mut layer = ROOT;
        for &byte in init {
            layer = self.find(layer, byte)?.1.next;
        }
        self.find(layer, last)?.1.value.as_ref()
    }

    /// Find the longest name that is a prefix of `input`.
    #[inline]
    pub fn longest_match(&self, input: &[u8]) -> Option<Match<'_, V>> {
        let mut matcher = self.matcher();
        for &byte in input {
            if matches!(matcher.push(byte), Step::Rejected) {
                break;
            }
        }
        matcher.best()
    }

    /// Start an incremental match.
    #[inline]
    pub fn matcher(&self) -> Matcher<'_, V> {
        Matcher::new(&self.nodes)
    }
}

/// Binary search within one layer. Index 0 ends the search.
#[inline]
fn find<V>(nodes: &[TrieNode<V>], layer: usize, byte: u8) -> Option<(usize, &TrieNode<V>)> {
    let mut index = layer;
    while index != 0 {
        let node = nodes.get(index)?;
        index = match byte.cmp(&node.byte) {
            core::cmp::Ordering::Equal => return Some((index, node)),
            core::cmp::Ordering::Less => node.left,
            core::cmp::Ordering::Greater => node.right,
        };
    }
    None
}

impl<V: core::fmt::Debug> core::fmt::Debug for Trie<'_, V> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Trie")
            .field("nodes", &&*self.nodes)
            .finish()
    }
}

#[cfg(feature = "codegen")]
impl<V: super::codegen::Codegen> super::codegen::Codegen for TrieNode<V> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let node = gen.path("lextab::TrieNode");
        let byte = gen.piece(&self.byte);
        let value = gen.piece(&self.value);
        let left = gen.piece(&self.left);
        let right = gen.piece(&self.right);
        let next = gen.piece(&self.next);
        quote::quote!(#node::from_raw_parts(#byte, #value, #left, #right, #next))
    }
}

#[cfg(feature = "codegen")]
impl<V: super::codegen::Codegen> super::codegen::Codegen for Trie<'_, V> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let trie = gen.path("lextab::Trie");
        let nodes = gen.piece(&&*self.nodes);
        quote::quote!(#trie::from_raw_parts(#nodes))
    }
}
