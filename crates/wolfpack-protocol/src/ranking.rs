//! Validated rankings: the item → position mappings both sides submit.
//!
//! A ranking assigns each item a unique position from 1 to the number of
//! items. Clients send them as plain JSON objects, so validation happens
//! at the deserialization boundary (`#[serde(try_from)]`) — a ranking
//! that exists in memory is always well-formed, and the state machine
//! never has to re-check positions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Why a submitted ranking was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RankingError {
    /// An empty ranking carries no information and is almost certainly
    /// a client bug.
    #[error("ranking is empty")]
    Empty,

    /// Positions start at 1; zero is the classic off-by-one.
    #[error("item {0:?} has position 0, positions start at 1")]
    ZeroPosition(String),

    /// A position larger than the item count can never match anything.
    #[error("item {0:?} has position {1}, but there are only {2} items")]
    OutOfRange(String, u32, usize),

    /// Two items can't share a position.
    #[error("position {0} is assigned to more than one item")]
    DuplicatePosition(u32),
}

/// An ordering of items: each item identifier maps to a position in
/// `1..=len`, and no two items share a position.
///
/// Backed by a `BTreeMap` so iteration order is deterministic — the same
/// ranking always serializes and renders identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u32>", into = "BTreeMap<String, u32>")]
pub struct Ranking(BTreeMap<String, u32>);

impl Ranking {
    /// Returns the position assigned to `item`, if it appears at all.
    pub fn position(&self, item: &str) -> Option<u32> {
        self.0.get(item).copied()
    }

    /// Number of ranked items.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no items are ranked. Unreachable through
    /// deserialization (empty rankings are rejected) but kept for the
    /// usual len/is_empty pairing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(item, position)` pairs in item order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Borrows the underlying map.
    pub fn entries(&self) -> &BTreeMap<String, u32> {
        &self.0
    }
}

impl TryFrom<BTreeMap<String, u32>> for Ranking {
    type Error = RankingError;

    fn try_from(map: BTreeMap<String, u32>) -> Result<Self, RankingError> {
        if map.is_empty() {
            return Err(RankingError::Empty);
        }

        let len = map.len();
        let mut seen = vec![false; len];
        for (item, &pos) in &map {
            if pos == 0 {
                return Err(RankingError::ZeroPosition(item.clone()));
            }
            if pos as usize > len {
                return Err(RankingError::OutOfRange(item.clone(), pos, len));
            }
            let slot = &mut seen[(pos - 1) as usize];
            if *slot {
                return Err(RankingError::DuplicatePosition(pos));
            }
            *slot = true;
        }

        Ok(Self(map))
    }
}

impl From<Ranking> for BTreeMap<String, u32> {
    fn from(ranking: Ranking) -> Self {
        ranking.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_try_from_valid_ranking_succeeds() {
        let r = Ranking::try_from(map(&[("A", 1), ("B", 2), ("C", 3)]))
            .expect("valid ranking");
        assert_eq!(r.len(), 3);
        assert_eq!(r.position("B"), Some(2));
        assert_eq!(r.position("D"), None);
    }

    #[test]
    fn test_try_from_empty_rejected() {
        let result = Ranking::try_from(BTreeMap::new());
        assert_eq!(result.unwrap_err(), RankingError::Empty);
    }

    #[test]
    fn test_try_from_zero_position_rejected() {
        let result = Ranking::try_from(map(&[("A", 0), ("B", 1)]));
        assert!(matches!(result, Err(RankingError::ZeroPosition(item)) if item == "A"));
    }

    #[test]
    fn test_try_from_out_of_range_rejected() {
        // Two items, but one claims position 5.
        let result = Ranking::try_from(map(&[("A", 1), ("B", 5)]));
        assert!(matches!(
            result,
            Err(RankingError::OutOfRange(item, 5, 2)) if item == "B"
        ));
    }

    #[test]
    fn test_try_from_duplicate_position_rejected() {
        let result = Ranking::try_from(map(&[("A", 2), ("B", 2), ("C", 1)]));
        assert_eq!(result.unwrap_err(), RankingError::DuplicatePosition(2));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<Ranking, _> =
            serde_json::from_str(r#"{"A": 2, "B": 1}"#);
        assert!(ok.is_ok());

        let dup: Result<Ranking, _> =
            serde_json::from_str(r#"{"A": 1, "B": 1}"#);
        assert!(dup.is_err());
    }

    #[test]
    fn test_serialize_is_plain_object() {
        let r = Ranking::try_from(map(&[("A", 1), ("B", 2)])).unwrap();
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"A":1,"B":2}"#);
    }

    #[test]
    fn test_iter_is_deterministic_item_order() {
        let r = Ranking::try_from(map(&[("b", 1), ("a", 2), ("c", 3)])).unwrap();
        let items: Vec<&str> = r.iter().map(|(item, _)| item).collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }
}
