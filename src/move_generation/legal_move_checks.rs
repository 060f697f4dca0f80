//! Attack detection.
//!
//! Attacks are read off the attacker's pseudo-legal moves, with two
//! adjustments: pawns attack their forward diagonals whether or not anything
//! stands there, and castling is never generated.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Board;
use crate::game_state::chess_types::{Color, PieceKind, Square};
use crate::move_generation::move_generator::{
    pseudo_legal_moves, pseudo_legal_moves_for_piece, GenerationContext,
};

/// Set of squares attacked by one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttackMap {
    squares: [[bool; 8]; 8],
}

impl AttackMap {
    #[inline]
    pub fn contains(&self, square: Square) -> bool {
        self.squares[square.row as usize][square.col as usize]
    }

    #[inline]
    fn mark(&mut self, square: Square) {
        self.squares[square.row as usize][square.col as usize] = true;
    }

    pub fn count(&self) -> usize {
        self.squares.iter().flatten().filter(|hit| **hit).count()
    }
}

pub fn attacked_squares(board: &Board, attacker: Color) -> AttackMap {
    let context = GenerationContext::attacks_only();
    let mut map = AttackMap::default();

    for piece in board.pieces_of(attacker) {
        if piece.kind == PieceKind::Pawn {
            for d_col in [-1i8, 1] {
                if let Some(square) = piece.square.offset(attacker.pawn_direction(), d_col) {
                    map.mark(square);
                }
            }
            continue;
        }
        for mv in pseudo_legal_moves_for_piece(board, piece, &context) {
            map.mark(mv.to);
        }
    }

    map
}

/// True when some opponent pseudo-legal move lands on `color`'s king or
/// captures a king. A missing king is an invariant violation.
pub fn king_is_exposed(board: &Board, color: Color) -> ChessResult<bool> {
    let king_square = board
        .king_square(color)
        .ok_or_else(|| ChessError::invariant(format!("no {color:?} king on the board")))?;

    let replies = pseudo_legal_moves(board, color.opposite(), &GenerationContext::attacks_only());
    Ok(replies.iter().any(|mv| {
        mv.to == king_square || mv.captured.is_some_and(|piece| piece.kind == PieceKind::King)
    }))
}
