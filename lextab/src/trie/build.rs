use super::{Trie, TrieNode};
use crate::{BorrowedOrOwnedSlice, Config, Error, KeyValueSet};
use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

/// Names grouped by their byte at one position.
type Layer<V> = BTreeMap<u8, Branch<V>>;

/// Names sharing a prefix, as an intermediate tree.
struct Branch<V> {
    /// The value of the name ending right here.
    value: Option<V>,
    /// The names continuing past here.
    children: Layer<V>,
}

impl<V> Default for Branch<V> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

impl<V: Clone> Trie<'_, V> {
    /// Compile a trie.
    ///
    /// The first [`Config::trie_skip`] bytes of every name are dropped; the rest of the name is
    /// what the trie recognizes. Layers are bisected at the middle byte, and every layer is
    /// appended to the node array depth-first: the layer below a node is laid out when the walk
    /// over the node's own layer reaches it.
    ///
    /// # Errors
    ///
    /// - [`Error::NameTooShort`] if a name has no bytes left after skipping.
    /// - [`Error::DuplicateKey`] if two names are equal after skipping.
    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "heavy, we'd rather not copy it to every crate"
    )]
    pub fn compile(set: &KeyValueSet<V>, config: &Config) -> Result<Self, Error> {
        let skip = config.trie_skip();

        let mut root = Layer::new();
        for entry in set {
            let Some((&last, init)) = entry
                .key()
                .as_bytes()
                .get(skip..)
                .and_then(<[u8]>::split_last)
            else {
                return Err(Error::NameTooShort {
                    name: entry.key().into(),
                    skip,
                });
            };

            let mut layer = &mut root;
            for &byte in init {
                layer = &mut layer.entry(byte).or_default().children;
            }
            let branch = layer.entry(last).or_default();
            if branch.value.is_some() {
                return Err(Error::DuplicateKey {
                    key: entry.key().into(),
                });
            }
            branch.value = Some(entry.value().clone());
        }

        let mut builder = Builder::new();
        let first = builder.layer(root);

        // Depth-first: descend into a node's next layer as soon as it's built, then resume the
        // parent layer where we left off.
        let mut stack = vec![first];
        while let Some(mut range) = stack.pop() {
            while let Some(slot) = range.next() {
                if let Some(children) = builder.pending[slot].take() {
                    let next = builder.layer(children);
                    builder.nodes[slot].next = next.start;
                    stack.push(range);
                    range = next;
                }
            }
        }

        tracing::debug!(
            names = set.len(),
            nodes = builder.nodes.len(),
            "compiled trie"
        );

        Ok(Self {
            nodes: BorrowedOrOwnedSlice::Owned(builder.nodes),
        })
    }
}

/// Node storage during compilation.
struct Builder<V> {
    nodes: Vec<TrieNode<V>>,
    /// Per node, the layer below it that hasn't been laid out yet.
    pending: Vec<Option<Layer<V>>>,
}

impl<V> Builder<V> {
    fn new() -> Self {
        let mut builder = Self {
            nodes: Vec::new(),
            pending: Vec::new(),
        };
        // Sentinel
        builder.reserve();
        builder
    }

    /// Append a blank node and return its index.
    fn reserve(&mut self) -> usize {
        self.nodes.push(TrieNode::from_raw_parts(0, None, 0, 0, 0));
        self.pending.push(None);
        self.nodes.len() - 1
    }

    /// Lay out one layer as a balanced binary search tree and return its node range.
    ///
    /// A node's right child is reserved before its left child. Left spines are laid out
    /// immediately, pending right subtrees last-in-first-out.
    fn layer(&mut self, layer: Layer<V>) -> Range<usize> {
        let start = self.nodes.len();
        if layer.is_empty() {
            return start..start;
        }

        let mut branches: Vec<Option<(u8, Branch<V>)>> = layer.into_iter().map(Some).collect();

        let mut subtrees = vec![(0..branches.len(), self.reserve())];
        while let Some((mut range, mut slot)) = subtrees.pop() {
            loop {
                let mid = range.start + range.len() / 2;
                let left = range.start..mid;
                let right = mid + 1..range.end;

                let right_slot = if right.is_empty() { 0 } else { self.reserve() };
                let left_slot = if left.is_empty() { 0 } else { self.reserve() };

                if let Some((byte, branch)) = branches[mid].take() {
                    self.nodes[slot] =
                        TrieNode::from_raw_parts(byte, branch.value, left_slot, right_slot, 0);
                    if !branch.children.is_empty() {
                        self.pending[slot] = Some(branch.children);
                    }
                }

                if !right.is_empty() {
                    subtrees.push((right, right_slot));
                }
                if left.is_empty() {
                    break;
                }
                range = left;
                slot = left_slot;
            }
        }

        start..self.nodes.len()
    }
}
