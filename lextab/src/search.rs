//! Table size search.
//!
//! The hash functions used for name tables are weak on purpose: they must be cheap to evaluate in
//! the consumer. Instead of a strong hash, we compensate by trying every table size in a window
//! and keeping the one with the shortest worst-case collision chain. The search is exhaustive and
//! deterministic, and for name sets of up to a few thousand keys it takes milliseconds.

use super::hash::SlotHasher;
use alloc::vec::Vec;
use core::fmt;
use core::ops::Range;

/// Collision statistics of one candidate table size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct SizeReport {
    /// Number of primary slots.
    pub table_size: usize,
    /// Longest collision chain, i.e. the size of the largest bucket. 0 for no keys.
    pub max_depth: usize,
    /// Number of primary slots at least one key hashes to.
    pub used: usize,
}

impl fmt::Display for SizeReport {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max depth {}; used {} of {}",
            self.max_depth, self.used, self.table_size
        )
    }
}

impl SizeReport {
    /// Whether the first candidate is strictly better than the second one.
    const fn beats(&self, other: &Self) -> bool {
        self.max_depth < other.max_depth
            || (self.max_depth == other.max_depth && self.table_size < other.table_size)
    }
}

/// Pick the table size with the shortest worst-case chain.
///
/// Every size in `window` is tried; ties are broken by the smallest size. A size of 0 is never
/// considered. Returns `None` if there is no candidate.
///
/// This is a pure function of its arguments.
#[inline]
pub fn choose_table_size<'k, H: SlotHasher + ?Sized>(
    hasher: &H,
    keys: impl Iterator<Item = &'k [u8]> + Clone,
    window: Range<usize>,
    case_folding: bool,
) -> Option<SizeReport> {
    let mut depths = Vec::new();
    let mut best: Option<SizeReport> = None;
    for table_size in window.start.max(1)..window.end {
        let report = measure(hasher, keys.clone(), table_size, case_folding, &mut depths);
        if best.map_or(true, |best| report.beats(&best)) {
            best = Some(report);
        }
    }
    best
}

/// Measure every candidate size in `window`.
///
/// The reports are ordered from best to worst: by chain depth, then by size. The first element, if
/// any, is what [`choose_table_size`] returns.
#[inline]
pub fn survey<'k, H: SlotHasher + ?Sized>(
    hasher: &H,
    keys: impl Iterator<Item = &'k [u8]> + Clone,
    window: Range<usize>,
    case_folding: bool,
) -> Vec<SizeReport> {
    let mut depths = Vec::new();
    let mut reports: Vec<SizeReport> = (window.start.max(1)..window.end)
        .map(|table_size| measure(hasher, keys.clone(), table_size, case_folding, &mut depths))
        .collect();
    // Stable, so equal depths stay ordered by size
    reports.sort_by_key(|report| report.max_depth);
    reports
}

/// Collect statistics for a single table size.
///
/// `depths` is scratch space, reused between calls to avoid reallocation.
#[allow(clippy::arithmetic_side_effects, reason = "bounded by the number of keys")]
fn measure<'k, H: SlotHasher + ?Sized>(
    hasher: &H,
    keys: impl Iterator<Item = &'k [u8]>,
    table_size: usize,
    case_folding: bool,
    depths: &mut Vec<usize>,
) -> SizeReport {
    depths.clear();
    depths.resize(table_size + 1, 0);

    let mut report = SizeReport {
        table_size,
        max_depth: 0,
        used: 0,
    };
    for key in keys {
        let depth = &mut depths[hasher.slot(key, table_size, case_folding)];
        if *depth == 0 {
            report.used += 1;
        }
        *depth += 1;
        report.max_depth = report.max_depth.max(*depth);
    }
    report
}
