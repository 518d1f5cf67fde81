use super::{
    hash::{keys_equal, LegacyHasher, SlotHasher},
    BorrowedOrOwnedSlice,
};

#[cfg(feature = "build")]
use super::{search::SizeReport, Config, Error, KeyValueSet, OverflowPlacement, Warning};
#[cfg(feature = "build")]
use alloc::{vec, vec::Vec};

/// A slot of a [`HashTable`].
///
/// Empty cells and the sentinel at index 0 have no key and no value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell<'a, V> {
    key: Option<&'a str>,
    value: Option<V>,
    key_len: usize,
    next: usize,
}

impl<'a, V> Cell<'a, V> {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(
        key: Option<&'a str>,
        value: Option<V>,
        key_len: usize,
        next: usize,
    ) -> Self {
        Self {
            key,
            value,
            key_len,
            next,
        }
    }

    /// A cell no key hashes to.
    #[cfg(feature = "build")]
    const fn vacant() -> Self {
        Self::from_raw_parts(None, None, 0, 0)
    }

    /// The key stored in this cell.
    #[inline]
    #[must_use]
    pub const fn key(&self) -> Option<&'a str> {
        self.key
    }

    /// The value stored in this cell.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Length of the key in bytes.
    ///
    /// For the sentinel at index 0, this is the table size instead.
    #[inline]
    #[must_use]
    pub const fn key_len(&self) -> usize {
        self.key_len
    }

    /// Index of the next cell of the chain, or 0 at the end of the chain.
    #[inline]
    #[must_use]
    pub const fn next(&self) -> usize {
        self.next
    }

    /// Check if the cell holds no entry.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.key.is_none()
    }
}

/// A static hash table with chained collisions.
///
/// The table consists of `table_size + 1` primary cells followed by overflow cells. Cell 0 is
/// a sentinel that never holds an entry. A key is looked up as follows:
///
/// 1. Compute the primary slot `1..=table_size` with the hasher.
/// 2. If the cell is empty, the key is absent.
/// 3. If the cell holds the key, return its value.
/// 4. Otherwise, follow `next`. Index 0 refers to the sentinel, which is empty.
///
/// Chains are sorted by key length, so a lookup also stops at the first key longer than the
/// probed one. No chain is longer than [`max_depth`](Self::max_depth).
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HashTable<'a, V, H = LegacyHasher> {
    hasher: H,
    table_size: usize,
    max_depth: usize,
    case_folding: bool,
    len: usize,
    cells: BorrowedOrOwnedSlice<'a, Cell<'a, V>>,
}

impl<'a, V, H> HashTable<'a, V, H> {
    #[doc(hidden)]
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(
        hasher: H,
        table_size: usize,
        max_depth: usize,
        case_folding: bool,
        len: usize,
        cells: &'a [Cell<'a, V>],
    ) -> Self {
        Self {
            hasher,
            table_size,
            max_depth,
            case_folding,
            len,
            cells: BorrowedOrOwnedSlice::Borrowed(cells),
        }
    }

    /// Number of primary slots, not counting the sentinel.
    #[inline]
    pub const fn table_size(&self) -> usize {
        self.table_size
    }

    /// Longest collision chain.
    #[inline]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Whether keys are compared ignoring ASCII case.
    #[inline]
    pub const fn case_folding(&self) -> bool {
        self.case_folding
    }

    /// The hasher computing primary slots.
    #[inline]
    pub const fn hasher(&self) -> &H {
        &self.hasher
    }

    /// All cells: the sentinel, the primary slots, and the overflow cells.
    #[inline]
    pub fn cells(&self) -> &[Cell<'a, V>] {
        &self.cells
    }

    /// Get number of entries.
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the table is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate through entries.
    ///
    /// The iteration order is the cell order, which is constant for a given input.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &V)> {
        self.cells
            .iter()
            .filter_map(|cell| Some((cell.key?, cell.value.as_ref()?)))
    }
}

impl<'a, V, H: SlotHasher> HashTable<'a, V, H> {
    /// Compute the primary slot of a key. `None` if the table has no slots.
    #[inline]
    pub fn primary_slot(&self, key: &str) -> Option<usize> {
        self.slot_of(key.as_bytes())
    }

    fn slot_of(&self, key: &[u8]) -> Option<usize> {
        (self.table_size != 0).then(|| self.hasher.slot(key, self.table_size, self.case_folding))
    }

    /// Walk the chain of `key`, calling `visit` on every occupied cell compared.
    ///
    /// Returns the index of the matching cell.
    fn walk(&self, key: &str, mut visit: impl FnMut(&Cell<'a, V>)) -> Option<usize> {
        let key = key.as_bytes();
        let mut index = self.slot_of(key)?;
        loop {
            let cell = self.cells.get(index)?;
            let stored = cell.key?;
            visit(cell);
            if cell.key_len == key.len() && keys_equal(stored.as_bytes(), key, self.case_folding) {
                return Some(index);
            }
            if cell.key_len > key.len() || cell.next == 0 {
                return None;
            }
            index = cell.next;
        }
    }

    /// Get a key-value pair by key.
    ///
    /// The returned key is the one stored in the table, which may differ in case from `key`.
    #[inline]
    pub fn get_key_value(&self, key: &str) -> Option<(&'a str, &V)> {
        let cell = &self.cells[self.walk(key, |_| {})?];
        Some((cell.key?, cell.value.as_ref()?))
    }

    /// Get a value by key.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&V> {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Check if the table contains a key.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.walk(key, |_| {}).is_some()
    }

    /// Count the occupied cells a lookup of `key` compares against.
    ///
    /// Never exceeds [`max_depth`](Self::max_depth).
    #[inline]
    #[allow(clippy::arithmetic_side_effects, reason = "bounded by the chain length")]
    pub fn probe_depth(&self, key: &str) -> usize {
        let mut depth = 0;
        self.walk(key, |_| depth += 1);
        depth
    }
}

impl<V: core::fmt::Debug, H: core::fmt::Debug> core::fmt::Debug for HashTable<'_, V, H> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HashTable")
            .field("hasher", &self.hasher)
            .field("table_size", &self.table_size)
            .field("max_depth", &self.max_depth)
            .field("case_folding", &self.case_folding)
            .field("cells", &&*self.cells)
            .finish()
    }
}

/// The result of compiling a hash table.
#[cfg(feature = "build")]
#[derive(Debug)]
#[non_exhaustive]
pub struct Compilation<'a, V, H = LegacyHasher> {
    /// The compiled table.
    pub table: HashTable<'a, V, H>,
    /// Statistics of the chosen table size.
    pub report: SizeReport,
    /// Non-fatal conditions worth showing to the operator.
    pub warnings: Vec<Warning>,
}

#[cfg(feature = "build")]
impl<'a, V: Clone> HashTable<'a, V> {
    /// Compile a table with [`LegacyHasher`].
    ///
    /// See [`compile_with`](Self::compile_with).
    ///
    /// # Errors
    ///
    /// Same as [`compile_with`](Self::compile_with).
    #[inline]
    pub fn compile(
        set: &'a KeyValueSet<V>,
        config: &Config,
    ) -> Result<Compilation<'a, V>, Error> {
        Self::compile_with(LegacyHasher, set, config)
    }
}

#[cfg(feature = "build")]
impl<'a, V: Clone, H: SlotHasher> HashTable<'a, V, H> {
    /// Compile a table.
    ///
    /// The table size is chosen from [`Config::search_window`] with
    /// [`choose_table_size`](crate::search::choose_table_size). Each bucket is ordered by key
    /// length, keeping insertion order among equal lengths; the shortest key takes the primary slot
    /// and the rest are linked into overflow cells according to [`Config::overflow`].
    ///
    /// An empty set produces a table with the sentinel only and a [`Warning::EmptyInput`]. If no
    /// size avoids collisions, the best one is used anyway and [`Warning::SearchExhausted`] is
    /// reported.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptySearchWindow`] if the window has no nonzero size in it.
    /// - [`Error::DuplicateKey`] if case folding is enabled and two keys only differ in case.
    #[allow(
        clippy::missing_inline_in_public_items,
        reason = "heavy, we'd rather not copy it to every crate"
    )]
    pub fn compile_with(
        hasher: H,
        set: &'a KeyValueSet<V>,
        config: &Config,
    ) -> Result<Compilation<'a, V, H>, Error> {
        let window = config.search_window();
        if window.start == 0 || window.start >= window.end {
            return Err(Error::EmptySearchWindow {
                start: window.start,
                end: window.end,
            });
        }

        let case_folding = config.case_folding();
        if case_folding {
            reject_folded_duplicates(set)?;
        }

        let mut warnings = Vec::new();

        if set.is_empty() {
            tracing::warn!("{}", Warning::EmptyInput);
            warnings.push(Warning::EmptyInput);
            return Ok(Compilation {
                table: Self::from_cells(hasher, 0, 0, case_folding, 0, vec![Cell::vacant()]),
                report: SizeReport {
                    table_size: 0,
                    max_depth: 0,
                    used: 0,
                },
                warnings,
            });
        }

        let keys = set.keys().map(str::as_bytes);
        let report = super::search::choose_table_size(&hasher, keys, window.clone(), case_folding)
            .ok_or(Error::EmptySearchWindow {
                start: window.start,
                end: window.end,
            })?;
        tracing::debug!(
            table_size = report.table_size,
            max_depth = report.max_depth,
            used = report.used,
            "chose table size"
        );

        if report.max_depth > 1 {
            let warning = Warning::SearchExhausted {
                window,
                table_size: report.table_size,
                max_depth: report.max_depth,
            };
            tracing::warn!("{warning}");
            warnings.push(warning);
        }

        let cells = place(&hasher, set, report.table_size, case_folding, config.overflow());

        Ok(Compilation {
            table: Self::from_cells(
                hasher,
                report.table_size,
                report.max_depth,
                case_folding,
                set.len(),
                cells,
            ),
            report,
            warnings,
        })
    }

    fn from_cells(
        hasher: H,
        table_size: usize,
        max_depth: usize,
        case_folding: bool,
        len: usize,
        mut cells: Vec<Cell<'a, V>>,
    ) -> Self {
        // The sentinel carries the table size, so consumers can recover it from the cells alone
        cells[0].key_len = table_size;
        Self {
            hasher,
            table_size,
            max_depth,
            case_folding,
            len,
            cells: BorrowedOrOwnedSlice::Owned(cells),
        }
    }
}

/// Fail if two keys are equal up to ASCII case.
#[cfg(feature = "build")]
fn reject_folded_duplicates<V>(set: &KeyValueSet<V>) -> Result<(), Error> {
    let mut seen = alloc::collections::BTreeSet::new();
    for key in set.keys() {
        if !seen.insert(key.to_ascii_lowercase()) {
            return Err(Error::DuplicateKey { key: key.into() });
        }
    }
    Ok(())
}

/// Distribute entries over cells for a fixed table size.
#[cfg(feature = "build")]
#[allow(clippy::arithmetic_side_effects, reason = "table_size < usize::MAX")]
fn place<'a, V: Clone, H: SlotHasher>(
    hasher: &H,
    set: &'a KeyValueSet<V>,
    table_size: usize,
    case_folding: bool,
    overflow: OverflowPlacement,
) -> Vec<Cell<'a, V>> {
    let mut buckets: Vec<Vec<&'a crate::Entry<V>>> = vec![Vec::new(); table_size + 1];
    for entry in set {
        buckets[hasher.slot(entry.key().as_bytes(), table_size, case_folding)].push(entry);
    }
    // radsort is stable, so keys of equal length keep their insertion order
    for bucket in &mut buckets {
        radsort::sort_by_key(bucket.as_mut_slice(), |entry| entry.key().len() as u64);
    }

    let occupy = |entry: &&'a crate::Entry<V>| {
        Cell::from_raw_parts(
            Some(entry.key()),
            Some(entry.value().clone()),
            entry.key().len(),
            0,
        )
    };

    let mut cells: Vec<Cell<'a, V>> = buckets
        .iter()
        .map(|bucket| bucket.first().map_or_else(Cell::vacant, occupy))
        .collect();

    let mut vacant = match overflow {
        OverflowPlacement::ReuseVacant => buckets
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, bucket)| bucket.is_empty())
            .map(|(slot, _)| slot)
            .collect(),
        OverflowPlacement::Append => Vec::new(),
    }
    .into_iter();

    for (slot, bucket) in buckets.iter().enumerate().skip(1) {
        let mut last = slot;
        for entry in bucket.iter().skip(1) {
            let index = if let Some(index) = vacant.next() {
                cells[index] = occupy(entry);
                index
            } else {
                cells.push(occupy(entry));
                cells.len() - 1
            };
            cells[last].next = index;
            last = index;
        }
    }

    cells
}

#[cfg(feature = "codegen")]
impl<V: super::codegen::Codegen> super::codegen::Codegen for Cell<'_, V> {
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let cell = gen.path("lextab::Cell");
        let key = gen.piece(&self.key);
        let value = gen.piece(&self.value);
        let key_len = gen.piece(&self.key_len);
        let next = gen.piece(&self.next);
        quote::quote!(#cell::from_raw_parts(#key, #value, #key_len, #next))
    }
}

#[cfg(feature = "codegen")]
impl<V: super::codegen::Codegen, H: super::codegen::Codegen> super::codegen::Codegen
    for HashTable<'_, V, H>
{
    #[inline]
    fn generate_piece(&self, gen: &mut super::codegen::CodeGenerator) -> proc_macro2::TokenStream {
        let table = gen.path("lextab::HashTable");
        let hasher = gen.piece(&self.hasher);
        let table_size = gen.piece(&self.table_size);
        let max_depth = gen.piece(&self.max_depth);
        let case_folding = gen.piece(&self.case_folding);
        let len = gen.piece(&self.len);
        let cells = gen.piece(&&*self.cells);
        quote::quote!(
            #table::from_raw_parts(
                #hasher,
                #table_size,
                #max_depth,
                #case_folding,
                #len,
                #cells,
            )
        )
    }
}
