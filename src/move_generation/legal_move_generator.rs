//! Legality filter.
//!
//! Every pseudo-legal candidate is tried on an independent clone of the board
//! and piece index; the candidate survives only if no opponent reply on the
//! clone can land on the mover's king. The live board is never touched.

use crate::errors::ChessResult;
use crate::game_state::board::{Board, PieceIndex};
use crate::game_state::chess_types::Color;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_apply::apply_move;
use crate::move_generation::legal_move_checks::king_is_exposed;
use crate::move_generation::move_generator::{pseudo_legal_moves, GenerationContext};
use crate::moves::chess_move::ChessMove;

pub trait MoveGenerator: Send + Sync {
    fn generate_legal_moves(&self, game_state: &GameState) -> ChessResult<Vec<ChessMove>>;
}

/// Clone-and-simulate legal move generator.
pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn generate_legal_moves(&self, game_state: &GameState) -> ChessResult<Vec<ChessMove>> {
        let side = game_state.side_to_move;
        let context = game_state.generation_context();
        legal_moves(&game_state.board, &game_state.pieces, side, &context)
    }
}

pub fn legal_moves(
    board: &Board,
    index: &PieceIndex,
    side: Color,
    context: &GenerationContext,
) -> ChessResult<Vec<ChessMove>> {
    let pseudo = pseudo_legal_moves(board, side, context);
    filter_legal(board, index, side, pseudo)
}

pub fn filter_legal(
    board: &Board,
    index: &PieceIndex,
    side: Color,
    candidates: Vec<ChessMove>,
) -> ChessResult<Vec<ChessMove>> {
    let mut legal = Vec::with_capacity(candidates.len());
    for mv in candidates {
        if leaves_king_safe(board, index, side, &mv)? {
            legal.push(mv);
        }
    }
    Ok(legal)
}

/// Simulate `mv` on a clone and report whether `side`'s king survives it.
pub fn leaves_king_safe(board: &Board, index: &PieceIndex, side: Color, mv: &ChessMove) -> ChessResult<bool> {
    let (mut scratch, mut scratch_index) = board.clone_with_index(index);
    let changed = apply_move(&mut scratch, mv)?;
    scratch_index.apply_changes(&changed);
    debug_assert!(scratch_index.matches_board(&scratch));

    Ok(!king_is_exposed(&scratch, side)?)
}
