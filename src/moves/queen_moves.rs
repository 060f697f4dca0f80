//! Queen movement strategy: rook and bishop rays combined.

use crate::game_state::board::{Board, Piece};
use crate::move_generation::legal_move_shared::{ray_moves, ALL_DIRECTIONS};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub fn queen_moves(board: &Board, piece: &Piece, _context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(27);
    ray_moves(board, piece, &ALL_DIRECTIONS, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::queen_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;

    #[test]
    fn queen_on_d4_covers_twenty_seven_squares() {
        let mut board = Board::empty();
        let d4 = Square::new(4, 3);
        let queen = Piece::new(PieceId(0), Player::human(Color::Black), PieceKind::Queen, d4);
        board.set(d4, Some(queen));

        assert_eq!(queen_moves(&board, &queen, &GenerationContext::default()).len(), 27);
    }
}
