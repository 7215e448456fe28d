//! End-of-game statistics.

use wolfpack_protocol::{GameStatistics, PlayerStanding, RoundSummary, UserId};

use crate::session::RosterPlayer;
use crate::state::Round;

/// Fold the finished rounds and the final roster into the `game_end`
/// payload.
///
/// Total scores come from the roster (the directory is the source of
/// truth for cumulative score); per-round pack scores and wolf counts
/// are reconstructed from the round records. A player in the roster who
/// never appears in a round still gets a standing with zeros. `winners`
/// lists every player tied for the maximum total, in roster order.
pub fn aggregate(rounds: &[Round], roster: &[RosterPlayer]) -> GameStatistics {
    let completed: Vec<&Round> = rounds.iter().filter(|r| r.is_complete()).collect();

    let standings: Vec<PlayerStanding> = roster
        .iter()
        .map(|player| {
            let rounds_as_wolf = completed
                .iter()
                .filter(|r| r.wolf == Some(player.user))
                .count() as u32;
            let pack_scores: Vec<u32> = completed
                .iter()
                .filter(|r| r.wolf != Some(player.user))
                .map(|r| r.pack_score)
                .collect();
            PlayerStanding {
                user: player.user,
                username: player.username.clone(),
                total_score: player.score,
                rounds_as_wolf,
                pack_scores,
            }
        })
        .collect();

    let round_summaries: Vec<RoundSummary> = completed
        .iter()
        .map(|r| RoundSummary {
            round_number: r.round_number,
            question: r.question.clone(),
            wolf: r.wolf,
            pack_score: r.pack_score,
        })
        .collect();

    let top = standings.iter().map(|s| s.total_score).max().unwrap_or(0);
    let winners: Vec<UserId> = standings
        .iter()
        .filter(|s| s.total_score == top)
        .map(|s| s.user)
        .collect();

    GameStatistics {
        standings,
        rounds: round_summaries,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use wolfpack_protocol::Ranking;

    fn player(id: u64, name: &str, score: u32) -> RosterPlayer {
        RosterPlayer {
            user: UserId(id),
            username: name.to_string(),
            score,
        }
    }

    fn completed_round(number: u32, wolf: u64, pack_score: u32) -> Round {
        let ranking = Ranking::try_from(
            [("a".to_string(), 1u32)].into_iter().collect::<BTreeMap<_, _>>(),
        )
        .unwrap();
        Round {
            round_number: number,
            wolf: Some(UserId(wolf)),
            question: format!("question {number}"),
            wolf_ranking: Some(ranking.clone()),
            pack_ranking: Some(ranking),
            pack_score,
        }
    }

    #[test]
    fn test_aggregate_totals_from_roster() {
        let roster = [player(1, "alice", 3), player(2, "bob", 5)];
        let rounds = [completed_round(1, 1, 2), completed_round(2, 2, 3)];
        let stats = aggregate(&rounds, &roster);
        assert_eq!(stats.standings[0].total_score, 3);
        assert_eq!(stats.standings[1].total_score, 5);
        assert_eq!(stats.winners, vec![UserId(2)]);
    }

    #[test]
    fn test_aggregate_wolf_counts_and_pack_scores() {
        let roster = [player(1, "alice", 0), player(2, "bob", 0)];
        let rounds = [completed_round(1, 1, 2), completed_round(2, 2, 1)];
        let stats = aggregate(&rounds, &roster);

        let alice = &stats.standings[0];
        assert_eq!(alice.rounds_as_wolf, 1);
        // Alice packed in round 2 only.
        assert_eq!(alice.pack_scores, vec![1]);

        let bob = &stats.standings[1];
        assert_eq!(bob.rounds_as_wolf, 1);
        assert_eq!(bob.pack_scores, vec![2]);
    }

    #[test]
    fn test_aggregate_tied_top_scores_all_win() {
        let roster = [player(1, "alice", 4), player(2, "bob", 4), player(3, "eve", 1)];
        let stats = aggregate(&[], &roster);
        assert_eq!(stats.winners, vec![UserId(1), UserId(2)]);
    }

    #[test]
    fn test_aggregate_skips_incomplete_rounds() {
        let roster = [player(1, "alice", 0)];
        let rounds = [Round::new(1)];
        let stats = aggregate(&rounds, &roster);
        assert!(stats.rounds.is_empty());
        assert_eq!(stats.standings[0].rounds_as_wolf, 0);
        assert!(stats.standings[0].pack_scores.is_empty());
    }

    #[test]
    fn test_aggregate_empty_roster_no_winners() {
        let stats = aggregate(&[], &[]);
        assert!(stats.standings.is_empty());
        assert!(stats.winners.is_empty());
    }
}
