//! Uniformly random mover, used when no external engine is configured.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::computer::computer_mover::ComputerMover;
use crate::game_state::game_state::GameState;
use crate::moves::chess_move::ChessMove;

pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Reproducible sequence of choices, for tests.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMover {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputerMover for RandomMover {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, game_state: &GameState) -> Option<ChessMove> {
        game_state.legal_moves.as_slice().choose(&mut self.rng).copied()
    }
}
