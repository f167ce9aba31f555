//! Search for two disjoint teams with equal sums.
//!
//! Teams are scanned in enumeration order and bucketed by their sum. Each new
//! team is compared only against earlier teams in the same bucket, in the
//! order they were inserted, and the scan stops at the first disjoint match.
//! The result is therefore fully determined by the values and the team size.
//!
//! Sums are taken in `i128`, which holds any sum of `i64` values.

use std::collections::HashMap;
use std::fmt;

use crate::subsets::{Combinations, SubsetCache};
use crate::types::{Subset, MAX_LEN};

/// Two disjoint teams with the same sum.
///
/// `earlier` precedes `later` in enumeration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EqualSumPair {
    pub earlier: Subset,
    pub later: Subset,
    pub sum: i128,
}

impl fmt::Display for EqualSumPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {} (sum = {})", self.earlier, self.later, self.sum)
    }
}

/// [`EqualSumPair`] over index tuples, for sequences of any length.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TeamPair {
    pub earlier: Team,
    pub later: Team,
    pub sum: i128,
}

impl From<EqualSumPair> for TeamPair {
    fn from(pair: EqualSumPair) -> Self {
        TeamPair {
            earlier: Team(pair.earlier.indices().collect()),
            later: Team(pair.later.indices().collect()),
            sum: pair.sum,
        }
    }
}

impl fmt::Display for TeamPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {} (sum = {})", self.earlier, self.later, self.sum)
    }
}

/// Ascending indices of one team.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Team(pub Vec<usize>);

impl Team {
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self, values: &[i64]) -> i128 {
        self.0.iter().map(|&i| i128::from(values[i])).sum()
    }

    pub fn pick(&self, values: &[i64]) -> Vec<i64> {
        self.0.iter().map(|&i| values[i]).collect()
    }

    /// Merge walk over both sorted index lists.
    pub fn is_disjoint(&self, other: &Team) -> bool {
        let (mut a, mut b) = (self.0.iter().peekable(), other.0.iter().peekable());
        while let (Some(&&x), Some(&&y)) = (a.peek(), b.peek()) {
            match x.cmp(&y) {
                std::cmp::Ordering::Less => {
                    a.next();
                }
                std::cmp::Ordering::Greater => {
                    b.next();
                }
                std::cmp::Ordering::Equal => return false,
            }
        }
        true
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (pos, i) in self.0.iter().enumerate() {
            if pos > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", i)?;
        }
        write!(f, ")")
    }
}

/// Team representation the bucketed scan works over.
trait Members: Clone {
    fn disjoint(&self, other: &Self) -> bool;
    fn intersection(&self, other: &Self) -> Self;
}

impl Members for Subset {
    fn disjoint(&self, other: &Self) -> bool {
        self.is_disjoint(*other)
    }

    fn intersection(&self, other: &Self) -> Self {
        Subset::from_mask(self.mask() & other.mask())
    }
}

impl Members for Team {
    fn disjoint(&self, other: &Self) -> bool {
        self.is_disjoint(other)
    }

    fn intersection(&self, other: &Self) -> Self {
        Team(self.0.iter().copied().filter(|i| other.0.binary_search(i).is_ok()).collect())
    }
}

struct Bucket<T> {
    /// Indices shared by every member.
    common: T,
    teams: Vec<T>,
}

/// Bucketed scan shared by both team representations.
fn first_match<T: Members>(teams: impl IntoIterator<Item = T>, sum: impl Fn(&T) -> i128) -> Option<(T, T, i128)> {
    let mut by_sum: HashMap<i128, Bucket<T>> = HashMap::new();
    for team in teams {
        let s = sum(&team);
        match by_sum.get_mut(&s) {
            None => {
                by_sum.insert(
                    s,
                    Bucket {
                        common: team.clone(),
                        teams: vec![team],
                    },
                );
            }
            Some(bucket) => {
                // Meeting `common` means meeting every member
                if team.disjoint(&bucket.common) {
                    if let Some(earlier) = bucket.teams.iter().find(|u| u.disjoint(&team)) {
                        return Some((earlier.clone(), team, s));
                    }
                }
                bucket.common = bucket.common.intersection(&team);
                bucket.teams.push(team);
            }
        }
    }
    None
}

/// Returns the first pair of disjoint `k`-subsets of `values` with equal sum,
/// or `None` if there is no such pair.
///
/// Sequences shorter than `2 * k` never contain a pair.
///
/// # Panics
///
/// Panics if `values` is longer than [`MAX_LEN`]; use
/// [`find_equal_sum_teams`] for longer inputs.
pub fn find_disjoint_equal_sum_pair(values: &[i64], k: usize, cache: &mut SubsetCache) -> Option<EqualSumPair> {
    let n = values.len();
    if n < 2 * k {
        return None;
    }

    let teams = cache.subsets(n, k);
    let (earlier, later, sum) = first_match(teams.iter().copied(), |t| t.sum(values))?;
    Some(EqualSumPair { earlier, later, sum })
}

/// Same search as [`find_disjoint_equal_sum_pair`], for sequences of any
/// length.
///
/// Inputs up to [`MAX_LEN`] values go through the cached bitmask teams;
/// longer ones are enumerated lazily as index tuples in the same order.
pub fn find_equal_sum_teams(values: &[i64], k: usize, cache: &mut SubsetCache) -> Option<TeamPair> {
    let n = values.len();
    if n < 2 * k {
        return None;
    }
    if n <= MAX_LEN {
        return find_disjoint_equal_sum_pair(values, k, cache).map(TeamPair::from);
    }

    let (earlier, later, sum) = first_match(Combinations::new(n, k).map(Team), |t| t.sum(values))?;
    Some(TeamPair { earlier, later, sum })
}

/// Exhaustive check over all pairs of teams, ignoring buckets.
///
/// Quadratic in the number of teams; meant as a reference for small inputs.
pub fn has_disjoint_equal_sum_pair_naive(values: &[i64], k: usize) -> bool {
    let n = values.len();
    if n < 2 * k {
        return false;
    }
    let teams: Vec<Team> = Combinations::new(n, k).map(Team).collect();
    let sums: Vec<i128> = teams.iter().map(|t| t.sum(values)).collect();
    for i in 0..teams.len() {
        for j in i + 1..teams.len() {
            if sums[i] == sums[j] && teams[i].is_disjoint(&teams[j]) {
                return true;
            }
        }
    }
    false
}
