//! Enumeration of fixed-size index subsets ("teams"), memoised per length.
//!
//! Both the finder and the static model walk every k-subset of `0..n` many
//! times for the same `n`, so the enumeration is stored in a [`SubsetCache`]
//! owned by whoever drives the proof. There is no process-wide state: two
//! drivers never share a cache unless the caller hands the same one to both.
//!
//! # Example
//!
//! ```
//! use equal_teams::subsets::SubsetCache;
//!
//! let mut cache = SubsetCache::new();
//! let teams = cache.subsets(6, 5);
//! assert_eq!(teams.len(), 6);
//! assert_eq!(teams[0].to_string(), "(0, 1, 2, 3, 4)");
//!
//! // Second request is served from the cache
//! let _ = cache.subsets(6, 5);
//! assert_eq!(cache.hits(), 1);
//! ```

use std::collections::HashMap;
use std::rc::Rc;

use num_bigint::BigUint;

use crate::types::{Subset, MAX_LEN};

/// Iterator over the `k`-subsets of `0..n` as ascending index tuples, in
/// lexicographic order.
///
/// Unlike [`Subset`], the tuples have no upper bound on `n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    idx: Vec<usize>,
    done: bool,
}

impl Combinations {
    /// # Panics
    ///
    /// Panics if `k > n`.
    pub fn new(n: usize, k: usize) -> Self {
        assert!(k <= n, "Subset size {} exceeds sequence length {}", k, n);
        Self {
            n,
            idx: (0..k).collect(),
            done: false,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.done {
            return None;
        }
        let current = self.idx.clone();

        // Rightmost position that can still move forward
        let k = self.idx.len();
        match (0..k).rev().find(|&p| self.idx[p] < self.n - k + p) {
            Some(pos) => {
                self.idx[pos] += 1;
                for p in pos + 1..k {
                    self.idx[p] = self.idx[p - 1] + 1;
                }
            }
            None => self.done = true,
        }
        Some(current)
    }
}

/// Returns all `k`-subsets of `0..n` in lexicographic order of their
/// ascending index tuples.
///
/// # Panics
///
/// Panics unless `k <= n <= MAX_LEN`.
pub fn combinations(n: usize, k: usize) -> Vec<Subset> {
    assert!(n <= MAX_LEN, "Sequence length {} exceeds {}", n, MAX_LEN);
    Combinations::new(n, k).map(Subset::from_indices).collect()
}

/// Binomial coefficient `C(n, k)`.
pub fn binomial(n: usize, k: usize) -> BigUint {
    if k > n {
        return BigUint::ZERO;
    }
    let k = k.min(n - k);
    let mut acc = BigUint::from(1u32);
    for i in 0..k {
        acc *= n - i;
        acc /= i + 1;
    }
    acc
}

/// Number of unordered pairs of disjoint `k`-subsets of `0..n`.
///
/// This bounds the number of blocking constraints a refinement loop can ever
/// add for this `n`.
pub fn disjoint_pair_bound(n: usize, k: usize) -> BigUint {
    if 2 * k > n {
        return BigUint::ZERO;
    }
    let pairs = binomial(n, k) * binomial(n - k, k);
    // k = 0 is the only case where a subset is disjoint from itself
    if k == 0 {
        pairs
    } else {
        pairs >> 1
    }
}

/// Number of non-decreasing sequences of length `n` over `1..=bound` that
/// start with 1.
pub fn sequence_space(n: usize, bound: usize) -> BigUint {
    if n == 0 || bound == 0 {
        return BigUint::ZERO;
    }
    // Stars and bars over the remaining n-1 positions
    binomial(n - 1 + bound - 1, n - 1)
}

/// Write-once cache of subset enumerations, keyed by `(n, k)`.
///
/// Entries are shared via [`Rc`], so handing out an enumeration never copies
/// it. Nothing is ever evicted.
#[derive(Debug, Default)]
pub struct SubsetCache {
    map: HashMap<(usize, usize), Rc<[Subset]>>,
    hits: usize,
    misses: usize,
}

impl SubsetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all `k`-subsets of `0..n`, computing them on first use.
    ///
    /// # Panics
    ///
    /// Panics unless `k <= n <= MAX_LEN`.
    pub fn subsets(&mut self, n: usize, k: usize) -> Rc<[Subset]> {
        if let Some(teams) = self.map.get(&(n, k)) {
            self.hits += 1;
            return Rc::clone(teams);
        }
        self.misses += 1;
        let teams: Rc<[Subset]> = combinations(n, k).into();
        self.map.insert((n, k), Rc::clone(&teams));
        teams
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Returns the number of cached enumerations.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinations_order() {
        let teams = combinations(4, 2);
        let tuples: Vec<Vec<usize>> = teams.iter().map(|t| t.indices().collect()).collect();
        assert_eq!(
            tuples,
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
    }

    #[test]
    fn test_combinations_count() {
        assert_eq!(combinations(10, 5).len(), 252);
        assert_eq!(combinations(17, 5).len(), 6188);
        assert_eq!(combinations(5, 5).len(), 1);
        assert_eq!(combinations(3, 0).len(), 1);
    }

    #[test]
    #[should_panic(expected = "exceeds sequence length")]
    fn test_combinations_too_large() {
        combinations(3, 5);
    }

    #[test]
    fn test_combinations_beyond_mask_width() {
        let mut teams = Combinations::new(70, 2);
        assert_eq!(teams.next(), Some(vec![0, 1]));
        assert_eq!(teams.last(), Some(vec![68, 69]));
        assert_eq!(Combinations::new(70, 2).count(), 70 * 69 / 2);
        assert_eq!(Combinations::new(4, 0).collect::<Vec<_>>(), vec![Vec::<usize>::new()]);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(17, 5), BigUint::from(6188u32));
        assert_eq!(binomial(10, 0), BigUint::from(1u32));
        assert_eq!(binomial(3, 4), BigUint::ZERO);
        assert_eq!(binomial(100, 50).to_string(), "100891344545564193334812497256");
    }

    #[test]
    fn test_disjoint_pair_bound() {
        // Every 5-subset of 10 has exactly one disjoint partner
        assert_eq!(disjoint_pair_bound(10, 5), BigUint::from(126u32));
        assert_eq!(disjoint_pair_bound(11, 5), BigUint::from(1386u32));
        assert_eq!(disjoint_pair_bound(9, 5), BigUint::ZERO);
    }

    #[test]
    fn test_sequence_space() {
        assert_eq!(sequence_space(1, 100), BigUint::from(1u32));
        assert_eq!(sequence_space(3, 2), BigUint::from(3u32));
        assert_eq!(sequence_space(10, 1), BigUint::from(1u32));
    }

    #[test]
    fn test_cache_hits() {
        let mut cache = SubsetCache::new();
        let a = cache.subsets(10, 5);
        let b = cache.subsets(10, 5);
        let c = cache.subsets(11, 5);
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(c.len(), 462);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);
        assert_eq!(cache.len(), 2);
    }
}
