//! Merge rule management for BPE.
//!
//! Merge rules are keyed by the two symbol strings they join. The rank is the
//! position of the rule in the merges file: lower rank merges first.

use ahash::AHashMap;
use compact_str::CompactString;

/// A pair of adjacent symbols that can be merged.
pub type Pair = (CompactString, CompactString);

/// Merge rule mapping: pair -> rank.
pub type MergeMap = AHashMap<Pair, u32>;

/// Upper bound on merge lines read from a merges file, header excluded.
///
/// Matches the CLIP text vocabulary: 49152 entries minus the 256 byte symbols
/// and the two sentinels.
pub const MAX_MERGE_LINES: usize = 49152 - 256 - 2;

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRanks {
    /// Merge rules: pair -> rank
    pub merges: MergeMap,
    /// Number of rank slots handed out, duplicates included
    pub next_rank: u32,
}

impl MergeRanks {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new collection with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            merges: MergeMap::with_capacity(capacity),
            next_rank: 0,
        }
    }

    /// Append a merge rule with the next rank.
    ///
    /// A pair seen before keeps its first rank, but still consumes a slot so
    /// later rules keep their file position.
    pub fn push(&mut self, left: &str, right: &str) {
        let rank = self.next_rank;
        self.next_rank += 1;
        self.merges
            .entry((CompactString::new(left), CompactString::new(right)))
            .or_insert(rank);
    }

    /// Rank of the rule joining `left` and `right`, if any.
    #[inline]
    pub fn rank(&self, left: &str, right: &str) -> Option<u32> {
        self.merges
            .get(&(CompactString::new(left), CompactString::new(right)))
            .copied()
    }

    /// Get the number of distinct merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    /// Create merge rules from a list of pairs.
    ///
    /// The pairs are assigned ranks in order (0, 1, 2, ...).
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let pairs = pairs.into_iter();
        let mut rules = Self::with_capacity(pairs.size_hint().0);
        for (left, right) in pairs {
            rules.push(left.as_ref(), right.as_ref());
        }
        rules
    }
}
