//! Tag prefix ranking.
//!
//! Tools extend the documentation grammar with vendor-prefixed tags
//! (`@psalm-param`, `@phpstan-return`). When several tags describe the same
//! fact, the one whose prefix ranks highest wins; among equal ranks the
//! first one written wins.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Default ranks: `psalm` > `phpstan` > `phan` > unprefixed.
pub const DEFAULT_PRIORITIES: [(&str, i32); 3] = [("psalm", 3), ("phpstan", 2), ("phan", 1)];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagPrioritizer {
    ranks: FxHashMap<String, i32>,
}

impl Default for TagPrioritizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_PRIORITIES
                .iter()
                .map(|(prefix, rank)| (prefix.to_string(), *rank)),
        )
    }
}

impl TagPrioritizer {
    pub fn new(ranks: impl IntoIterator<Item = (String, i32)>) -> Self {
        Self {
            ranks: ranks.into_iter().collect(),
        }
    }

    /// Configured prefixes and their ranks, sorted by prefix.
    pub fn ranks(&self) -> Vec<(&str, i32)> {
        let mut ranks: Vec<(&str, i32)> = self
            .ranks
            .iter()
            .map(|(prefix, rank)| (prefix.as_str(), *rank))
            .collect();
        ranks.sort_unstable();
        ranks
    }

    /// Rank of a prefix; unprefixed tags rank 0.
    pub fn rank(&self, prefix: Option<&str>) -> i32 {
        prefix
            .and_then(|prefix| self.ranks.get(prefix).copied())
            .unwrap_or(0)
    }

    /// Split `psalm-param` into (`Some("psalm")`, `param`).
    ///
    /// Only configured prefixes are recognised, so `template-covariant`
    /// keeps its full name.
    pub fn split<'t>(&self, tag: &'t str) -> (Option<&'t str>, &'t str) {
        if let Some((prefix, rest)) = tag.split_once('-') {
            if !rest.is_empty() && self.ranks.contains_key(prefix) {
                return (Some(prefix), rest);
            }
        }
        (None, tag)
    }
}

/// Keeps the highest-ranked candidate seen so far.
#[derive(Clone, Debug)]
pub struct Ranked<T> {
    best: Option<(i32, T)>,
}

impl<T> Default for Ranked<T> {
    fn default() -> Self {
        Self { best: None }
    }
}

impl<T> Ranked<T> {
    /// Offer a candidate; it replaces the current one only if it ranks
    /// strictly higher.
    pub fn offer(&mut self, rank: i32, value: T) {
        match &self.best {
            Some((current, _)) if *current >= rank => {}
            _ => self.best = Some((rank, value)),
        }
    }

    pub fn into_inner(self) -> Option<T> {
        self.best.map(|(_, value)| value)
    }

    pub fn get(&self) -> Option<&T> {
        self.best.as_ref().map(|(_, value)| value)
    }
}

#[cfg(test)]
#[path = "../tests/priority_tests.rs"]
mod tests;
