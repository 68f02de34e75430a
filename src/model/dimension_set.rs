//! Bit-encoded sets of dimension ids.
//!
//! Bit `i` is set iff dimension id `i` is in the set. Words are kept
//! normalized (no trailing zero words) so that structural equality and
//! hashing coincide with set equality.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Dimension id as assigned by the [`DimensionRegistry`](crate::dimension::DimensionRegistry).
pub type DimensionId = u32;

const WORD_BITS: u32 = u64::BITS;

/// A set of dimension ids. 128 dimensions fit inline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawDimensionSet")]
pub struct DimensionSet {
    words: SmallVec<[u64; 2]>,
}

/// Wire form; normalized on the way in.
#[derive(Deserialize)]
struct RawDimensionSet {
    words: SmallVec<[u64; 2]>,
}

impl From<RawDimensionSet> for DimensionSet {
    fn from(raw: RawDimensionSet) -> Self {
        let mut set = Self { words: raw.words };
        set.normalize();
        set
    }
}

impl DimensionSet {
    /// The empty set `∅`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = DimensionId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn insert(&mut self, id: DimensionId) {
        let word = (id / WORD_BITS) as usize;
        if self.words.len() <= word {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << (id % WORD_BITS);
    }

    pub fn contains(&self, id: DimensionId) -> bool {
        self.words
            .get((id / WORD_BITS) as usize)
            .is_some_and(|w| w & (1u64 << (id % WORD_BITS)) != 0)
    }

    /// Cardinality.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// `self ∪= other`
    pub fn union_with(&mut self, other: &Self) {
        if self.words.len() < other.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w |= o;
        }
    }

    /// `self ∩= other`
    pub fn intersect_with(&mut self, other: &Self) {
        self.words.truncate(other.words.len());
        for (w, o) in self.words.iter_mut().zip(other.words.iter()) {
            *w &= o;
        }
        self.normalize();
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.union_with(other);
        out
    }

    pub fn intersection(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.intersect_with(other);
        out
    }

    /// `|self ∩ other|` without allocating.
    pub fn intersection_len(&self, other: &Self) -> usize {
        self.words
            .iter()
            .zip(other.words.iter())
            .map(|(a, b)| (a & b).count_ones() as usize)
            .sum()
    }

    /// `|self ∪ other|` without allocating.
    pub fn union_len(&self, other: &Self) -> usize {
        let n = self.words.len().max(other.words.len());
        (0..n)
            .map(|i| {
                let a = self.words.get(i).copied().unwrap_or(0);
                let b = other.words.get(i).copied().unwrap_or(0);
                (a | b).count_ones() as usize
            })
            .sum()
    }

    /// `|self △ other|`. Zero iff the sets are equal.
    pub fn symmetric_difference_len(&self, other: &Self) -> usize {
        let n = self.words.len().max(other.words.len());
        (0..n)
            .map(|i| {
                let a = self.words.get(i).copied().unwrap_or(0);
                let b = other.words.get(i).copied().unwrap_or(0);
                (a ^ b).count_ones() as usize
            })
            .sum()
    }

    /// `self ⊆ other`
    pub fn is_subset(&self, other: &Self) -> bool {
        self.words.iter().enumerate().all(|(i, w)| {
            let o = other.words.get(i).copied().unwrap_or(0);
            w & !o == 0
        })
    }

    /// Set ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DimensionId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let base = i as u32 * WORD_BITS;
            let mut rest = word;
            std::iter::from_fn(move || {
                if rest == 0 {
                    return None;
                }
                let bit = rest.trailing_zeros();
                rest &= rest - 1;
                Some(base + bit)
            })
        })
    }

    fn normalize(&mut self) {
        while self.words.last() == Some(&0) {
            self.words.pop();
        }
    }
}

impl FromIterator<DimensionId> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = DimensionId>>(iter: I) -> Self {
        Self::from_ids(iter)
    }
}

impl std::fmt::Display for DimensionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}
