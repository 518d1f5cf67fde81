use alloc::string::String;
use core::ops::Range;

/// Where colliding entries beyond the first one of each bucket are placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum OverflowPlacement {
    /// Append overflow cells after the `table_size + 1` primary slots.
    #[default]
    Append,

    /// Hand out primary slots that no key hashes to first, in ascending order, and append only
    /// when they run out. Produces smaller tables; this is what older generators did.
    ReuseVacant,
}

/// Parameters shared by the compilers and the emitters.
///
/// There is no global state: every invocation receives its configuration explicitly.
///
/// ```rust
/// let config = lextab::Config::default()
///     .with_search_window(128..1024)
///     .with_name_prefix("LXB_TAG_");
/// assert_eq!(config.search_window(), 128..1024);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    search_window: Range<usize>,
    name_prefix: String,
    case_folding: bool,
    overflow: OverflowPlacement,
    trie_skip: usize,
    line_rate: usize,
}

impl Config {
    /// Create a configuration with default settings.
    ///
    /// The defaults are: sizes `5..128`, no name prefix, ASCII case folding, overflow cells
    /// appended, no skipped trie prefix, two items per emitted line.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            search_window: 5..128,
            name_prefix: String::new(),
            case_folding: true,
            overflow: OverflowPlacement::Append,
            trie_skip: 0,
            line_rate: 2,
        }
    }

    /// Set the window of candidate table sizes, `start` inclusive, `end` exclusive.
    ///
    /// The search costs `O(window * keys)`. A few hundred candidates are plenty for sets of up to
    /// a few thousand keys.
    #[inline]
    #[must_use]
    pub fn with_search_window(mut self, window: Range<usize>) -> Self {
        self.search_window = window;
        self
    }

    /// Set the prefix of emitted constant names.
    #[inline]
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    /// Enable or disable ASCII case folding of hash table keys.
    #[inline]
    #[must_use]
    pub fn with_case_folding(mut self, case_folding: bool) -> Self {
        self.case_folding = case_folding;
        self
    }

    /// Set the overflow placement policy of hash tables.
    #[inline]
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPlacement) -> Self {
        self.overflow = overflow;
        self
    }

    /// Set the number of leading bytes of every trie name that the consumer has already matched
    /// before it starts walking the trie, e.g. 1 for the `&` of character references.
    #[inline]
    #[must_use]
    pub fn with_trie_skip(mut self, skip: usize) -> Self {
        self.trie_skip = skip;
        self
    }

    /// Set how many array items the emitters put on one line.
    #[inline]
    #[must_use]
    pub fn with_line_rate(mut self, rate: usize) -> Self {
        self.line_rate = rate;
        self
    }

    /// Window of candidate table sizes.
    #[inline]
    #[must_use]
    pub fn search_window(&self) -> Range<usize> {
        self.search_window.clone()
    }

    /// Prefix of emitted constant names.
    #[inline]
    #[must_use]
    pub fn name_prefix(&self) -> &str {
        &self.name_prefix
    }

    /// Whether hash table keys are compared ignoring ASCII case.
    #[inline]
    #[must_use]
    pub const fn case_folding(&self) -> bool {
        self.case_folding
    }

    /// Overflow placement policy.
    #[inline]
    #[must_use]
    pub const fn overflow(&self) -> OverflowPlacement {
        self.overflow
    }

    /// Number of skipped leading bytes of trie names.
    #[inline]
    #[must_use]
    pub const fn trie_skip(&self) -> usize {
        self.trie_skip
    }

    /// Array items per emitted line, at least 1.
    #[inline]
    #[must_use]
    pub fn line_rate(&self) -> usize {
        self.line_rate.max(1)
    }
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
