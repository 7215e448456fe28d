//! Pack scoring.

use wolfpack_protocol::Ranking;

/// Count the items the pack placed in exactly the same position as the
/// wolf. Items missing from either ranking contribute nothing, so the
/// score is symmetric in its arguments and bounded by the smaller
/// ranking's length.
pub fn pack_score(wolf: &Ranking, pack: &Ranking) -> u32 {
    wolf.iter()
        .filter(|(item, position)| pack.position(item) == Some(*position))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn ranking(entries: &[(&str, u32)]) -> Ranking {
        let map: BTreeMap<String, u32> = entries
            .iter()
            .map(|(item, pos)| (item.to_string(), *pos))
            .collect();
        Ranking::try_from(map).unwrap()
    }

    #[test]
    fn test_pack_score_identical_rankings_full_marks() {
        let wolf = ranking(&[("pizza", 1), ("sushi", 2), ("tacos", 3)]);
        assert_eq!(pack_score(&wolf, &wolf.clone()), 3);
    }

    #[test]
    fn test_pack_score_one_match_counts_one() {
        let wolf = ranking(&[("a", 1), ("b", 2), ("c", 3)]);
        let pack = ranking(&[("a", 1), ("b", 3), ("c", 2)]);
        assert_eq!(pack_score(&wolf, &pack), 1);
    }

    #[test]
    fn test_pack_score_no_matches_zero() {
        let wolf = ranking(&[("a", 1), ("b", 2), ("c", 3)]);
        let pack = ranking(&[("a", 2), ("b", 3), ("c", 1)]);
        assert_eq!(pack_score(&wolf, &pack), 0);
    }

    #[test]
    fn test_pack_score_disjoint_items_zero() {
        let wolf = ranking(&[("a", 1), ("b", 2)]);
        let pack = ranking(&[("x", 1), ("y", 2)]);
        assert_eq!(pack_score(&wolf, &pack), 0);
    }

    #[test]
    fn test_pack_score_symmetric() {
        let wolf = ranking(&[("a", 1), ("b", 2), ("c", 3)]);
        let pack = ranking(&[("a", 3), ("b", 2), ("c", 1)]);
        assert_eq!(pack_score(&wolf, &pack), pack_score(&pack, &wolf));
    }
}
