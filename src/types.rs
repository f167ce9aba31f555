//! Type-safe wrappers for teams, score sequences and blocking constraints.
//!
//! A [`Subset`] is a set of indices into a [`ValueSequence`], stored as a
//! 64-bit mask so that disjointness is a single AND.
use std::fmt;

/// Largest sequence length representable by a [`Subset`] mask.
pub const MAX_LEN: usize = 64;

/// A set of indices into a value sequence ("team").
///
/// # Invariants
///
/// - All indices are `< MAX_LEN`
/// - Indices are iterated in ascending order
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Subset(u64);

impl Subset {
    /// Creates a subset from its indices.
    ///
    /// # Panics
    ///
    /// Panics if some index is `>= MAX_LEN`.
    pub fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = 0u64;
        for i in indices {
            assert!(i < MAX_LEN, "Subset index {} is out of range", i);
            mask |= 1 << i;
        }
        Subset(mask)
    }

    /// Creates a subset from a raw index mask.
    pub fn from_mask(mask: u64) -> Self {
        Subset(mask)
    }

    /// Returns the raw index mask.
    pub fn mask(self) -> u64 {
        self.0
    }

    /// Number of indices in the subset.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, index: usize) -> bool {
        index < MAX_LEN && self.0 & (1 << index) != 0
    }

    pub fn is_disjoint(self, other: Subset) -> bool {
        self.0 & other.0 == 0
    }

    /// Iterates over the indices in ascending order.
    pub fn indices(self) -> impl Iterator<Item = usize> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                None
            } else {
                let i = rest.trailing_zeros() as usize;
                rest &= rest - 1;
                Some(i)
            }
        })
    }

    /// Sum of the values selected by this subset, widened so that no `i64`
    /// input can overflow it.
    ///
    /// # Panics
    ///
    /// Panics if some index is out of bounds for `values`.
    pub fn sum(self, values: &[i64]) -> i128 {
        self.indices().map(|i| i128::from(values[i])).sum()
    }

    /// Values selected by this subset, in index order.
    pub fn pick(self, values: &[i64]) -> Vec<i64> {
        self.indices().map(|i| values[i]).collect()
    }
}

impl fmt::Display for Subset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (pos, i) in self.indices().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", i)?;
        }
        write!(f, ")")
    }
}

/// An ordered sequence of integer scores.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Default)]
pub struct ValueSequence(Vec<i64>);

impl ValueSequence {
    pub fn new(values: Vec<i64>) -> Self {
        ValueSequence(values)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<i64> {
        self.0
    }
}

impl fmt::Display for ValueSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl From<Vec<i64>> for ValueSequence {
    fn from(values: Vec<i64>) -> Self {
        ValueSequence(values)
    }
}

impl AsRef<[i64]> for ValueSequence {
    fn as_ref(&self) -> &[i64] {
        &self.0
    }
}

/// "The two teams must not have equal sums."
///
/// # Invariants
///
/// - `left` and `right` are disjoint
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BlockingConstraint {
    pub left: Subset,
    pub right: Subset,
}

impl BlockingConstraint {
    /// # Panics
    ///
    /// Panics if the two subsets overlap.
    pub fn new(left: Subset, right: Subset) -> Self {
        assert!(left.is_disjoint(right), "Blocked teams {} and {} overlap", left, right);
        BlockingConstraint { left, right }
    }

    /// Returns `true` if `values` gives both teams the same sum.
    pub fn is_violated_by(&self, values: &[i64]) -> bool {
        self.left.sum(values) == self.right.sum(values)
    }
}

impl fmt::Display for BlockingConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sum{} != sum{}", self.left, self.right)
    }
}
