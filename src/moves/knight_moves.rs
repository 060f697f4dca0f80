//! Knight movement strategy.

use crate::game_state::board::{Board, Piece};
use crate::move_generation::legal_move_shared::step_moves;
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub fn knight_moves(board: &Board, piece: &Piece, _context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(8);
    step_moves(board, piece, &KNIGHT_OFFSETS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::knight_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;

    #[test]
    fn knight_in_corner_has_two_targets() {
        let mut board = Board::empty();
        let a1 = Square::new(7, 0);
        let knight = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Knight, a1);
        board.set(a1, Some(knight));

        let moves = knight_moves(&board, &knight, &GenerationContext::default());
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn knight_skips_own_pieces_and_captures_opponents() {
        let mut board = Board::empty();
        let d4 = Square::new(4, 3);
        let knight = Piece::new(PieceId(0), Player::human(Color::White), PieceKind::Knight, d4);
        board.set(d4, Some(knight));
        let own = Square::new(2, 2);
        let enemy = Square::new(2, 4);
        board.set(own, Some(Piece::new(PieceId(1), Player::human(Color::White), PieceKind::Pawn, own)));
        board.set(enemy, Some(Piece::new(PieceId(2), Player::human(Color::Black), PieceKind::Pawn, enemy)));

        let moves = knight_moves(&board, &knight, &GenerationContext::default());
        assert_eq!(moves.len(), 7);
        assert!(moves.iter().all(|mv| mv.to != own));
        let capture = moves.iter().find(|mv| mv.to == enemy).expect("capture on e6");
        assert_eq!(capture.captured.map(|p| p.id), Some(PieceId(2)));
    }
}
