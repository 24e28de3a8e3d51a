//! Result formatter.
//!
//! Turns the execution engine's unordered match set into the outward
//! shape: a deduplicated, lexicographically sorted list of tickers.
//! Formatting is a pure function of the match set, so identical screens
//! always serialize identically.

use crate::domain::screen::MatchSet;
use std::collections::BTreeSet;

/// Order a match set into the final ticker list.
///
/// Sorting is byte-wise lexicographic, which for the uppercase ASCII
/// tickers both markets use is the plain alphabetical order.
pub fn format_matches(matches: &MatchSet) -> Vec<String> {
    let ordered: BTreeSet<&String> = matches.iter().collect();
    ordered.into_iter().cloned().collect()
}
