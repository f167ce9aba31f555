//! Input handling for the standalone checker.
//!
//! Tokens are taken from comma- or whitespace-separated arguments. Each token
//! contributes its leading signed integer (`"12,"`, `"45abc"` and `"+7"` all
//! parse); tokens without one are skipped and reported, never fatal. A
//! leading integer that does not fit in an `i64` is an error.

use thiserror::Error;

use crate::finder::{find_equal_sum_teams, TeamPair};
use crate::subsets::SubsetCache;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum CheckError {
    #[error(
        "need at least {required} integers to form two disjoint subsets of size {team_size}, got {found}"
    )]
    InsufficientInput {
        found: usize,
        required: usize,
        team_size: usize,
    },
    #[error("'{token}' does not fit in a 64-bit integer")]
    OutOfRange { token: String },
}

/// Values parsed from the command line, plus the tokens that were skipped.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ParsedInput {
    pub values: Vec<i64>,
    pub skipped: Vec<String>,
}

/// Returns the leading `[+-]?digits` prefix of `token` as an integer.
///
/// `Ok(None)` if there is no such prefix.
pub fn parse_int_prefix(token: &str) -> Result<Option<i64>, CheckError> {
    let token = token.trim();
    let bytes = token.as_bytes();
    let sign = matches!(bytes.first(), Some(b'+' | b'-')) as usize;
    let digits = bytes[sign..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Ok(None);
    }
    // The prefix is all digits, so the only possible failure is overflow
    token[..sign + digits]
        .parse()
        .map(Some)
        .map_err(|_| CheckError::OutOfRange {
            token: token.to_string(),
        })
}

pub fn parse_values<S: AsRef<str>>(args: &[S]) -> Result<ParsedInput, CheckError> {
    let mut parsed = ParsedInput::default();
    for arg in args {
        for token in arg.as_ref().split(|c: char| c == ',' || c.is_whitespace()) {
            if token.is_empty() {
                continue;
            }
            match parse_int_prefix(token)? {
                Some(v) => parsed.values.push(v),
                None => parsed.skipped.push(token.to_string()),
            }
        }
    }
    Ok(parsed)
}

/// Looks for two disjoint `team_size`-subsets of `values` with equal sum.
///
/// Fails before running the search when there are too few values to form
/// two disjoint teams. There is no upper limit on the number of values.
pub fn check(values: &[i64], team_size: usize) -> Result<Option<TeamPair>, CheckError> {
    let required = 2 * team_size;
    if values.len() < required {
        return Err(CheckError::InsufficientInput {
            found: values.len(),
            required,
            team_size,
        });
    }
    let mut cache = SubsetCache::new();
    Ok(find_equal_sum_teams(values, team_size, &mut cache))
}
