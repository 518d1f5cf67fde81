use alloc::string::String;
use core::ops::Range;

/// A fatal problem with the input of a compiler.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The same key was supplied twice. With case folding, keys that only differ in ASCII case
    /// count as the same key.
    #[error("duplicate key `{key}`")]
    DuplicateKey {
        /// The second occurrence of the key.
        key: String,
    },

    /// The window of candidate table sizes contains no usable size.
    #[error("table size search window {start}..{end} is empty or includes zero")]
    EmptySearchWindow {
        /// Inclusive lower bound.
        start: usize,
        /// Exclusive upper bound.
        end: usize,
    },

    /// A name has no bytes left after the prefix the consumer matches itself.
    #[error("name `{name}` is empty after skipping its first {skip} bytes")]
    NameTooShort {
        /// The offending name.
        name: String,
        /// The configured number of skipped bytes.
        skip: usize,
    },
}

/// A non-fatal condition noticed during compilation.
///
/// The compiled structure is valid regardless; warnings are meant to be shown to whoever runs the
/// generator.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Warning {
    /// There were no entries. The table consists of the sentinel slot only.
    #[error("no entries, emitting an empty table")]
    EmptyInput,

    /// No size in the window made every chain one cell long.
    #[error(
        "no table size in {window:?} avoids collisions; best is {table_size} with chains of up to \
         {max_depth} cells, consider widening the window"
    )]
    SearchExhausted {
        /// The searched window.
        window: Range<usize>,
        /// The size that was chosen.
        table_size: usize,
        /// The longest chain at that size.
        max_depth: usize,
    },
}
