//! The per-room round state machine.
//!
//! A [`GameSession`] owns every rule of the game: who may start a round,
//! who the wolf is, whose pack order counts, how a round scores, and when
//! the game ends. It is deliberately free of I/O and locking — the actor
//! feeds it roster snapshots and publishes the events it returns, so
//! every rule here is testable with plain function calls.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::info;
use wolfpack_protocol::{Ranking, RoomCode, RoundStatus, ServerMessage, UserId};

use crate::config::GameConfig;
use crate::error::EngineError;
use crate::scoring::pack_score;
use crate::state::{Game, Round};
use crate::stats::aggregate;
use crate::wolf::select_wolf;

/// A roster snapshot entry: what the session needs to know about one
/// player at the moment a command runs. Order matters — it is the join
/// order, which breaks score ties and decides host succession.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPlayer {
    pub user: UserId,
    pub username: String,
    pub score: u32,
}

/// What a committed pack order produces: the broadcasts to publish and
/// the score award the caller must apply to every non-wolf player.
#[derive(Debug)]
pub struct PackOutcome {
    pub events: Vec<ServerMessage>,
    /// Points each pack member earned this round; `None` when the pack
    /// scored zero and there is nothing to apply.
    pub award: Option<u32>,
    /// The round's wolf, who never receives the award.
    pub wolf: UserId,
}

/// One room's game, from `game_start` to the final statistics.
pub struct GameSession {
    code: RoomCode,
    config: GameConfig,
    game: Game,
    rounds: Vec<Round>,
    rng: StdRng,
}

impl GameSession {
    /// Create a session with `round_count` rounds (one per player at
    /// game start). A fixed `seed` makes wolf selection and prompt
    /// draws deterministic, which tests rely on.
    pub fn new(code: RoomCode, round_count: u32, config: GameConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let rounds = (1..=round_count).map(Round::new).collect();
        Self {
            code,
            config,
            game: Game::new(),
            rounds,
            rng,
        }
    }

    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Snapshot of the game's progress.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The record for round `round_number`, if it exists.
    pub fn round(&self, round_number: u32) -> Option<&Round> {
        self.rounds.get(round_number.checked_sub(1)? as usize)
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Host command: start the current round, or finish the game if no
    /// rounds remain.
    ///
    /// Starting draws a wolf (rotation: nobody repeats until everyone
    /// has served) and a prompt, and moves the game to `wolf_selection`.
    /// When every round is already played, this transitions to
    /// `game_ended` instead and returns the final statistics broadcast.
    pub fn start_round(
        &mut self,
        actor: UserId,
        round_number: u32,
        host: UserId,
        roster: &[RosterPlayer],
    ) -> Result<Vec<ServerMessage>, EngineError> {
        if actor != host {
            return Err(EngineError::Unauthorized(
                "Only the host can start the round".to_string(),
            ));
        }
        if self.game.round_status.is_terminal() {
            return Err(EngineError::GameOver(self.code.clone()));
        }

        // All rounds played: this request ends the game instead.
        if self.game.current_round as usize > self.rounds.len() {
            self.game.round_status = RoundStatus::GameEnded;
            let statistics = aggregate(&self.rounds, roster);
            info!(room = %self.code, "game ended, statistics computed");
            return Ok(vec![ServerMessage::GameEnd { statistics }]);
        }

        if round_number != self.game.current_round {
            return Err(EngineError::WrongRound(round_number));
        }
        let round = self
            .rounds
            .get_mut((round_number - 1) as usize)
            .ok_or(EngineError::RoundNotFound(round_number))?;
        if round.wolf.is_some() {
            return Err(EngineError::RoundAlreadyStarted(round_number));
        }

        let players: Vec<UserId> = roster.iter().map(|p| p.user).collect();
        let wolf = select_wolf(&players, &mut self.game.wolfed_users, &mut self.rng)
            .ok_or_else(|| EngineError::RoomEmpty(self.code.clone()))?;
        let question = self
            .config
            .prompts
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();

        round.wolf = Some(wolf);
        round.question = question.clone();
        self.game.round_status = RoundStatus::WolfSelection;
        info!(room = %self.code, round = round_number, wolf = %wolf, "round started");

        Ok(vec![
            ServerMessage::RoundStart {
                round_number,
                wolf_id: wolf,
                question,
            },
            ServerMessage::WolfTimer {
                round_number,
                time: self.config.wolf_timer_secs,
            },
        ])
    }

    /// Wolf command: commit the secret ranking for the round.
    ///
    /// The ranking itself is never broadcast — the room only learns that
    /// the wolf has submitted, and the game moves to `pack_selection`.
    pub fn submit_wolf_order(
        &mut self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
        roster: &[RosterPlayer],
    ) -> Result<Vec<ServerMessage>, EngineError> {
        if self.game.round_status.is_terminal() {
            return Err(EngineError::GameOver(self.code.clone()));
        }
        if round_number != self.game.current_round {
            return Err(EngineError::WrongRound(round_number));
        }
        let round = self
            .rounds
            .get_mut((round_number - 1) as usize)
            .ok_or(EngineError::RoundNotFound(round_number))?;

        if round.wolf != Some(actor) {
            return Err(EngineError::Unauthorized(
                "Only the wolf can submit the order".to_string(),
            ));
        }
        if round.wolf_ranking.is_some() {
            return Err(EngineError::AlreadySubmitted(round_number));
        }

        round.wolf_ranking = Some(order);
        self.game.round_status = RoundStatus::PackSelection;
        let submitter = resolve_username(roster, actor);
        info!(room = %self.code, round = round_number, "wolf order submitted");

        Ok(vec![ServerMessage::WolfOrder {
            round_number,
            submitter,
        }])
    }

    /// Pack command: commit the pack's consensus ranking and resolve the
    /// round.
    ///
    /// Only one player may submit for the pack: the host, unless the
    /// host is this round's wolf, in which case the duty falls to the
    /// lowest-scoring pack member (earliest joiner on ties). Scoring
    /// counts exact position matches against the wolf's ranking; the
    /// caller applies the award to every non-wolf player. The round
    /// completes and the game auto-advances to the next round's
    /// `waiting_to_start`.
    pub fn submit_pack_order(
        &mut self,
        actor: UserId,
        round_number: u32,
        order: Ranking,
        host: UserId,
        roster: &[RosterPlayer],
    ) -> Result<PackOutcome, EngineError> {
        if self.game.round_status.is_terminal() {
            return Err(EngineError::GameOver(self.code.clone()));
        }
        if round_number != self.game.current_round {
            return Err(EngineError::WrongRound(round_number));
        }
        let round_index = (round_number - 1) as usize;
        let round = self
            .rounds
            .get(round_index)
            .ok_or(EngineError::RoundNotFound(round_number))?;

        let (wolf, wolf_ranking) = match (round.wolf, &round.wolf_ranking) {
            (Some(wolf), Some(ranking)) => (wolf, ranking.clone()),
            _ => return Err(EngineError::WolfOrderPending(round_number)),
        };
        if round.pack_ranking.is_some() {
            return Err(EngineError::AlreadySubmitted(round_number));
        }

        let submitter = pack_submitter(host, wolf, roster)
            .ok_or_else(|| EngineError::RoomEmpty(self.code.clone()))?;
        if actor != submitter {
            return Err(EngineError::Unauthorized(
                "You are not authorized to submit the pack order".to_string(),
            ));
        }

        let score = pack_score(&wolf_ranking, &order);
        let wolf_rendered = render_items(roster, &wolf_ranking);
        let pack_rendered = render_items(roster, &order);

        let round = &mut self.rounds[round_index];
        round.pack_ranking = Some(order);
        round.pack_score = score;

        // Round complete; advance to the next round's waiting state.
        self.game.round_status = RoundStatus::RoundCompleted;
        self.game.current_round += 1;
        self.game.round_status = RoundStatus::WaitingToStart;
        info!(room = %self.code, round = round_number, score, "round resolved");

        Ok(PackOutcome {
            events: vec![ServerMessage::RoundResult {
                round_number,
                wolf_order: wolf_rendered,
                pack_order: pack_rendered,
                pack_score: score,
            }],
            award: (score > 0).then_some(score),
            wolf,
        })
    }

    /// Host command: force the round status. No transition rules apply;
    /// this is the host's manual override.
    pub fn change_status(
        &mut self,
        actor: UserId,
        round_number: u32,
        status: RoundStatus,
        host: UserId,
    ) -> Result<Vec<ServerMessage>, EngineError> {
        if actor != host {
            return Err(EngineError::Unauthorized(
                "Only the host can change the round status".to_string(),
            ));
        }
        self.game.round_status = status;
        info!(room = %self.code, round = round_number, %status, "status forced");

        Ok(vec![ServerMessage::StatusChange {
            round_number,
            status,
        }])
    }
}

/// Who is allowed to submit the pack order: the host, unless the host is
/// the wolf — then the lowest-scoring non-wolf player, earliest joiner
/// first on ties.
fn pack_submitter(host: UserId, wolf: UserId, roster: &[RosterPlayer]) -> Option<UserId> {
    if host != wolf {
        return Some(host);
    }
    roster
        .iter()
        .enumerate()
        .filter(|(_, p)| p.user != wolf)
        .min_by_key(|(index, p)| (p.score, *index))
        .map(|(_, p)| p.user)
}

fn resolve_username(roster: &[RosterPlayer], user: UserId) -> String {
    roster
        .iter()
        .find(|p| p.user == user)
        .map(|p| p.username.clone())
        .unwrap_or_else(|| user.to_string())
}

/// Item keys that are numeric ids of roster members render as usernames;
/// anything else passes through unchanged.
fn render_items(roster: &[RosterPlayer], ranking: &Ranking) -> BTreeMap<String, u32> {
    ranking
        .iter()
        .map(|(item, position)| {
            let rendered = item
                .parse::<u64>()
                .ok()
                .and_then(|id| roster.iter().find(|p| p.user == UserId(id)))
                .map(|p| p.username.clone())
                .unwrap_or_else(|| item.to_string());
            (rendered, position)
        })
        .collect()
}
