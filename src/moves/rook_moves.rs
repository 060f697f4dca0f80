//! Rook movement strategy.

use crate::game_state::board::{Board, Piece};
use crate::move_generation::legal_move_shared::{ray_moves, ORTHOGONAL_DIRECTIONS};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub fn rook_moves(board: &Board, piece: &Piece, _context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(14);
    ray_moves(board, piece, &ORTHOGONAL_DIRECTIONS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::rook_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;

    #[test]
    fn rook_on_d4_has_fourteen_squares() {
        let mut board = Board::empty();
        let d4 = Square::new(4, 3);
        let rook = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Rook, d4);
        board.set(d4, Some(rook));

        assert_eq!(rook_moves(&board, &rook, &GenerationContext::default()).len(), 14);
    }

    #[test]
    fn rook_blocker_stops_ray() {
        let mut board = Board::empty();
        let a1 = Square::new(7, 0);
        let rook = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Rook, a1);
        board.set(a1, Some(rook));
        let a4 = Square::new(4, 0);
        board.set(a4, Some(Piece::new(PieceId(1), Player::human(Color::White), PieceKind::Pawn, a4)));

        let moves = rook_moves(&board, &rook, &GenerationContext::default());
        assert!(moves.iter().all(|mv| mv.to != a4));
        assert!(moves.iter().all(|mv| mv.to != Square::new(3, 0)));
        assert_eq!(moves.len(), 2 + 7);
    }
}
