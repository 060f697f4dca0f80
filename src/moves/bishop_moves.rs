//! Bishop movement strategy.

use crate::game_state::board::{Board, Piece};
use crate::move_generation::legal_move_shared::{ray_moves, DIAGONAL_DIRECTIONS};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub fn bishop_moves(board: &Board, piece: &Piece, _context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(13);
    ray_moves(board, piece, &DIAGONAL_DIRECTIONS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::bishop_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;

    #[test]
    fn bishop_on_d4_covers_thirteen_squares_on_empty_board() {
        let mut board = Board::empty();
        let d4 = Square::new(4, 3);
        let bishop = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Bishop, d4);
        board.set(d4, Some(bishop));

        let moves = bishop_moves(&board, &bishop, &GenerationContext::default());
        assert_eq!(moves.len(), 13);
    }

    #[test]
    fn bishop_ray_stops_at_first_blocker() {
        let mut board = Board::empty();
        let c1 = Square::new(7, 2);
        let bishop = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Bishop, c1);
        board.set(c1, Some(bishop));
        let e3 = Square::new(5, 4);
        board.set(e3, Some(Piece::new(PieceId(1), Player::human(Color::Black), PieceKind::Knight, e3)));

        let moves = bishop_moves(&board, &bishop, &GenerationContext::default());
        // b2, a3 on one ray; d2 and the capture on e3 on the other.
        assert_eq!(moves.len(), 4);
        assert!(moves.iter().any(|mv| mv.to == e3 && mv.is_capture()));
        assert!(moves.iter().all(|mv| mv.to != Square::new(4, 5)));
    }
}
