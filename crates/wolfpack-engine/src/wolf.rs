//! Wolf rotation.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;
use wolfpack_protocol::UserId;

/// Draw the next wolf uniformly from the players who have not yet been
/// wolf this rotation, recording the pick in `wolfed_users`.
///
/// When every player has had a turn the rotation resets: the history is
/// cleared and the draw runs over the full roster again. Returns `None`
/// only for an empty roster.
pub fn select_wolf<R: Rng + ?Sized>(
    players: &[UserId],
    wolfed_users: &mut Vec<UserId>,
    rng: &mut R,
) -> Option<UserId> {
    if players.is_empty() {
        return None;
    }

    let eligible: Vec<UserId> = players
        .iter()
        .filter(|user| !wolfed_users.contains(user))
        .copied()
        .collect();

    let pool = if eligible.is_empty() {
        debug!("wolf rotation exhausted, resetting");
        wolfed_users.clear();
        players.to_vec()
    } else {
        eligible
    };

    let chosen = pool.choose(rng).copied()?;
    wolfed_users.push(chosen);
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn uid(n: u64) -> UserId {
        UserId(n)
    }

    #[test]
    fn test_select_wolf_empty_roster_none() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut wolfed = Vec::new();
        assert_eq!(select_wolf(&[], &mut wolfed, &mut rng), None);
        assert!(wolfed.is_empty());
    }

    #[test]
    fn test_select_wolf_records_pick() {
        let mut rng = StdRng::seed_from_u64(7);
        let players = [uid(1), uid(2), uid(3)];
        let mut wolfed = Vec::new();
        let wolf = select_wolf(&players, &mut wolfed, &mut rng).unwrap();
        assert!(players.contains(&wolf));
        assert_eq!(wolfed, vec![wolf]);
    }

    #[test]
    fn test_select_wolf_no_repeats_within_rotation() {
        let mut rng = StdRng::seed_from_u64(42);
        let players = [uid(1), uid(2), uid(3), uid(4)];
        let mut wolfed = Vec::new();
        for _ in 0..players.len() {
            select_wolf(&players, &mut wolfed, &mut rng).unwrap();
        }
        let mut seen = wolfed.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), players.len());
    }

    #[test]
    fn test_select_wolf_resets_after_full_rotation() {
        let mut rng = StdRng::seed_from_u64(9);
        let players = [uid(1), uid(2)];
        let mut wolfed = vec![uid(1), uid(2)];
        let wolf = select_wolf(&players, &mut wolfed, &mut rng).unwrap();
        assert_eq!(wolfed, vec![wolf]);
    }

    #[test]
    fn test_select_wolf_only_remaining_player_chosen() {
        let mut rng = StdRng::seed_from_u64(11);
        let players = [uid(1), uid(2), uid(3)];
        let mut wolfed = vec![uid(1), uid(3)];
        let wolf = select_wolf(&players, &mut wolfed, &mut rng).unwrap();
        assert_eq!(wolf, uid(2));
    }
}
