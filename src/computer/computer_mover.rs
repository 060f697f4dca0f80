//! In-process move choosers for `PlayerKind::Computer` seats.

use crate::coordinator::game_coordinator::{GameCoordinator, MoveOutcome};
use crate::errors::ChessResult;
use crate::game_state::game_state::GameState;
use crate::moves::chess_move::ChessMove;

pub trait ComputerMover: Send {
    fn name(&self) -> &str;

    /// Pick one of the cached legal moves, or `None` when there are none.
    fn choose_move(&mut self, game_state: &GameState) -> Option<ChessMove>;
}

/// Let `mover` play one move for the side to move. Returns `Ok(None)` when
/// the game is already over.
pub fn play_computer_move(
    game: &mut GameCoordinator,
    mover: &mut dyn ComputerMover,
) -> ChessResult<Option<MoveOutcome>> {
    let Some(mv) = mover.choose_move(game.state()) else {
        return Ok(None);
    };
    log::debug!("{} chose {mv}", mover.name());
    game.request_move(mv.piece.id, mv.to, mv.promotion()).map(Some)
}
