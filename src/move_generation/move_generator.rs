//! Pseudo-legal move generation entry points.
//!
//! Each piece kind maps to one pure `MovementStrategy`. The table is the only
//! place that knows which strategy belongs to which kind.

use crate::game_state::board::{Board, Piece};
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::game_state::undo_state::UndoState;
use crate::moves::bishop_moves::bishop_moves;
use crate::moves::chess_move::ChessMove;
use crate::moves::king_moves::king_moves;
use crate::moves::knight_moves::knight_moves;
use crate::moves::pawn_moves::pawn_moves;
use crate::moves::queen_moves::queen_moves;
use crate::moves::rook_moves::rook_moves;

/// Inputs a strategy needs beyond the board and the piece itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationContext {
    /// Square jumped over by the opponent's immediately preceding double step.
    pub en_passant_target: Option<Square>,
    /// Castling candidates are skipped when computing attacks.
    pub include_castling: bool,
}

impl Default for GenerationContext {
    fn default() -> Self {
        Self {
            en_passant_target: None,
            include_castling: true,
        }
    }
}

impl GenerationContext {
    /// Derive the en-passant target from the last history entry, falling back
    /// to `initial_target` only while the history is empty.
    pub fn from_history(history: &[UndoState], initial_target: Option<Square>) -> Self {
        let en_passant_target = match history.last() {
            Some(last) => en_passant_target_of(&last.mv),
            None => initial_target,
        };
        Self {
            en_passant_target,
            include_castling: true,
        }
    }

    /// Context used when asking what a side attacks.
    pub const fn attacks_only() -> Self {
        Self {
            en_passant_target: None,
            include_castling: false,
        }
    }
}

/// Square a pawn jumped over, when `mv` is a double step.
pub fn en_passant_target_of(mv: &ChessMove) -> Option<Square> {
    if mv.is_double_pawn_step() {
        Some(Square::new((mv.from.row + mv.to.row) / 2, mv.from.col))
    } else {
        None
    }
}

pub type MovementStrategy = fn(&Board, &Piece, &GenerationContext) -> Vec<ChessMove>;

#[inline]
pub fn strategy_for(kind: PieceKind) -> MovementStrategy {
    match kind {
        PieceKind::Pawn => pawn_moves,
        PieceKind::Knight => knight_moves,
        PieceKind::Bishop => bishop_moves,
        PieceKind::Rook => rook_moves,
        PieceKind::Queen => queen_moves,
        PieceKind::King => king_moves,
    }
}

pub fn pseudo_legal_moves_for_piece(
    board: &Board,
    piece: &Piece,
    context: &GenerationContext,
) -> Vec<ChessMove> {
    strategy_for(piece.kind)(board, piece, context)
}

/// Every pseudo-legal move for `color`.
pub fn pseudo_legal_moves(board: &Board, color: Color, context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(64);
    for piece in board.pieces_of(color) {
        out.extend(pseudo_legal_moves_for_piece(board, piece, context));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{pseudo_legal_moves, GenerationContext};
    use crate::game_state::board::Board;
    use crate::game_state::chess_types::{Color, Player};

    #[test]
    fn start_position_has_twenty_pseudo_legal_moves_per_side() {
        let board = Board::standard(Player::human(Color::White), Player::human(Color::Black));
        let context = GenerationContext::default();
        assert_eq!(pseudo_legal_moves(&board, Color::White, &context).len(), 20);
        assert_eq!(pseudo_legal_moves(&board, Color::Black, &context).len(), 20);
    }
}
