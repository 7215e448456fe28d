//! Game tuning knobs.

use wolfpack_protocol::WOLF_TIMER_SECS;

/// Per-game configuration. One of these is cloned into every session at
/// creation; changing it later does not affect running games.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Advisory countdown announced to the wolf when a round starts.
    /// The server never enforces it — a slow wolf just keeps the round
    /// in `wolf_selection`.
    pub wolf_timer_secs: u64,
    /// Prompt pool. Each round draws one uniformly at random.
    pub prompts: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            wolf_timer_secs: WOLF_TIMER_SECS,
            prompts: vec![
                "Rank these foods from most to least delicious".to_string(),
                "Rank these movies from best to worst".to_string(),
                "Rank these vacation destinations from most to least desirable".to_string(),
                "Rank these sports from most to least exciting".to_string(),
                "Rank these animals from most to least dangerous".to_string(),
            ],
        }
    }
}
