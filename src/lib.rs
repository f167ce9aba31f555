//! # equal-teams: how many players force two equal teams?
//!
//! Given scores in `[1, 100]`, this crate proves the smallest `N` such that
//! *every* multiset of `N` scores contains two disjoint teams of five players
//! with the same total.
//!
//! ## How the proof works
//!
//! For a candidate `N`, the Z3 solver is asked for a sorted score
//! sequence with **no** two disjoint equal teams. Rather than forbidding all
//! `O(C(N,5)^2)` equal-sum pairs at once, the model starts loose and is refined
//! (CEGAR):
//!
//! 1. Solve the current model.
//! 2. **UNSAT**: no counter-example exists, so `N` is proven.
//! 3. **SAT**: search the returned sequence for two disjoint equal teams.
//!    If there is none, the sequence is a genuine counter-example. Otherwise
//!    forbid that particular pair and go back to 1.
//!
//! A non-incremental strategy that forbids every pair up front is available
//! as a cross-check.
//!
//! ## Basic Usage
//!
//! ```rust
//! use equal_teams::checker::check;
//!
//! // Ten equal scores always split into two equal teams
//! let pair = check(&[7; 10], 5).unwrap().unwrap();
//! assert_eq!(pair.sum, 35);
//! assert!(pair.earlier.is_disjoint(&pair.later));
//! ```
//!
//! ```rust
//! use std::time::Duration;
//!
//! use equal_teams::cegar::CegarDriver;
//! use equal_teams::proof::{DriverOptions, Verdict};
//! use equal_teams::smt::Z3Oracle;
//!
//! // Scores limited to {1, 2}: eleven of them always contain five duplicate pairs
//! let options = DriverOptions { team_size: 5, value_bound: 2, workers: 1 };
//! let mut driver = CegarDriver::new(Z3Oracle::new(), options);
//! let verdict = driver.prove_with_cegar(11, Duration::from_secs(10)).unwrap();
//! assert_eq!(verdict, Verdict::Proven);
//! ```
//!
//! ## Core Components
//!
//! - **[`finder`]**: first pair of disjoint equal-sum teams in a sequence.
//! - **[`model`]**: the base constraint model for a given `N`.
//! - **[`oracle`]**: the solver boundary; [`smt`] implements it on top of Z3.
//! - **[`cegar`]** and **[`static_model`]**: the two proof strategies.
//! - **[`sweep`]**: ascending sweep over `N`.

pub mod cegar;
pub mod checker;
pub mod finder;
pub mod model;
pub mod oracle;
pub mod problem;
pub mod proof;
pub mod smt;
pub mod static_model;
pub mod subsets;
pub mod sweep;
pub mod types;
