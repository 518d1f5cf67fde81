use super::{find, TrieNode, ROOT};

/// The outcome of feeding one byte to a [`Matcher`].
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Step<'t, V> {
    /// The byte continues some name, but no name ends here.
    Partial,
    /// The byte completes a name. Longer names may still follow.
    Matched(&'t V),
    /// No name continues with this byte. The matcher is finished.
    Rejected,
}

/// A recognized name.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Match<'t, V> {
    /// The value of the name.
    pub value: &'t V,
    /// The length of the name in bytes, not counting the skipped prefix.
    pub len: usize,
}

impl<V> Clone for Match<'_, V> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Match<'_, V> {}

/// Incremental longest-match search.
///
/// Input can arrive in pieces: the matcher keeps the current layer between calls to
/// [`push`](Self::push), so a parser can feed bytes as they come and ask for the longest name seen
/// so far with [`best`](Self::best) once the trie rejects a byte or the input ends.
///
/// ```rust
/// # fn main() -> Result<(), lextab::Error> {
/// use lextab::trie::Step;
///
/// let set = lextab::KeyValueSet::from_entries([("not", 1), ("notin", 2)])?;
/// let trie = lextab::Trie::compile(&set, &lextab::Config::default())?;
///
/// let mut matcher = trie.matcher();
/// for &byte in b"noti" {
///     assert_ne!(matcher.push(byte), Step::Rejected);
/// }
/// assert_eq!(matcher.push(b'x'), Step::Rejected);
/// assert_eq!(matcher.best().map(|m| (*m.value, m.len)), Some((1, 3)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Matcher<'t, V> {
    nodes: &'t [TrieNode<V>],
    /// Root of the layer the next byte is searched in, 0 once finished.
    layer: usize,
    consumed: usize,
    best: Option<Match<'t, V>>,
}

impl<'t, V> Matcher<'t, V> {
    pub(super) const fn new(nodes: &'t [TrieNode<V>]) -> Self {
        Self {
            nodes,
            layer: ROOT,
            consumed: 0,
            best: None,
        }
    }

    /// Feed the next byte.
    #[inline]
    #[allow(clippy::arithmetic_side_effects, reason = "bounded by the input length")]
    pub fn push(&mut self, byte: u8) -> Step<'t, V> {
        if self.layer == 0 {
            return Step::Rejected;
        }
        let Some((_, node)) = find(self.nodes, self.layer, byte) else {
            self.layer = 0;
            return Step::Rejected;
        };
        self.consumed += 1;
        self.layer = node.next;
        match &node.value {
            Some(value) => {
                self.best = Some(Match {
                    value,
                    len: self.consumed,
                });
                Step::Matched(value)
            }
            None => Step::Partial,
        }
    }

    /// The longest name matched so far.
    #[inline]
    pub const fn best(&self) -> Option<Match<'t, V>> {
        self.best
    }

    /// Whether another byte could still extend the match.
    #[inline]
    pub const fn can_continue(&self) -> bool {
        self.layer != 0
    }

    /// Number of bytes accepted so far.
    #[inline]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Forget all input and start over at the first layer.
    #[inline]
    pub fn reset(&mut self) {
        self.layer = ROOT;
        self.consumed = 0;
        self.best = None;
    }
}
