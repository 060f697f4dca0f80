//! King movement strategy, including castling candidates.
//!
//! Castling is offered only when neither the king nor the rook has moved, the
//! squares between them are empty, and the king's start, transit and
//! destination squares are not attacked. Attacks are computed on the
//! unmodified board with castling disabled so the two kings never recurse
//! into each other.

use crate::game_state::board::{Board, Piece};
use crate::game_state::chess_rules::{KING_HOME_COL, KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL};
use crate::game_state::chess_types::{PieceKind, Square};
use crate::move_generation::legal_move_checks::{attacked_squares, AttackMap};
use crate::move_generation::legal_move_shared::{step_moves, ALL_DIRECTIONS};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub fn king_moves(board: &Board, king: &Piece, context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(10);
    step_moves(board, king, &ALL_DIRECTIONS, &mut out);
    if context.include_castling {
        castling_moves(board, king, &mut out);
    }
    out
}

fn castling_moves(board: &Board, king: &Piece, out: &mut Vec<ChessMove>) {
    let row = king.color.home_row();
    if king.has_moved || king.square != Square::new(row, KING_HOME_COL) {
        return;
    }

    let mut attacks: Option<AttackMap> = None;

    for rook_col in [KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL] {
        let Some(rook) = board.piece_at(Square::new(row, rook_col)) else {
            continue;
        };
        if rook.kind != PieceKind::Rook || rook.color != king.color || rook.has_moved {
            continue;
        }

        let (low, high) = if rook_col > KING_HOME_COL {
            (KING_HOME_COL, rook_col)
        } else {
            (rook_col, KING_HOME_COL)
        };
        if (low + 1..high).any(|col| !board.is_empty(Square::new(row, col))) {
            continue;
        }

        let step: i8 = if rook_col > KING_HOME_COL { 1 } else { -1 };
        let transit = Square::new(row, (KING_HOME_COL as i8 + step) as u8);
        let king_to = Square::new(row, (KING_HOME_COL as i8 + 2 * step) as u8);

        let attacked = attacks.get_or_insert_with(|| attacked_squares(board, king.color.opposite()));
        if attacked.contains(king.square) || attacked.contains(transit) || attacked.contains(king_to) {
            continue;
        }

        out.push(ChessMove::castling(*king, king_to, *rook, transit));
    }
}

#[cfg(test)]
mod tests {
    use super::king_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;
    use crate::moves::chess_move::MoveKind;

    fn place(board: &mut Board, id: u32, color: Color, kind: PieceKind, square: Square) -> Piece {
        let piece = Piece::new(PieceId(id), Player::human(color), kind, square);
        board.set(square, Some(piece));
        piece
    }

    fn castle_targets(board: &Board, king: &Piece) -> Vec<Square> {
        king_moves(board, king, &GenerationContext::default())
            .into_iter()
            .filter(|mv| matches!(mv.kind, MoveKind::Castling { .. }))
            .map(|mv| mv.to)
            .collect()
    }

    fn castling_fixture() -> (Board, Piece) {
        let mut board = Board::empty();
        let king = place(&mut board, 0, Color::White, PieceKind::King, Square::new(7, 4));
        place(&mut board, 1, Color::White, PieceKind::Rook, Square::new(7, 7));
        place(&mut board, 2, Color::White, PieceKind::Rook, Square::new(7, 0));
        place(&mut board, 3, Color::Black, PieceKind::King, Square::new(0, 4));
        (board, king)
    }

    #[test]
    fn king_in_centre_has_eight_steps() {
        let mut board = Board::empty();
        let king = place(&mut board, 0, Color::Black, PieceKind::King, Square::new(4, 4));
        assert_eq!(king_moves(&board, &king, &GenerationContext::default()).len(), 8);
    }

    #[test]
    fn castles_both_ways_when_clear() {
        let (board, king) = castling_fixture();
        let targets = castle_targets(&board, &king);
        assert_eq!(targets, vec![Square::new(7, 6), Square::new(7, 2)]);
    }

    #[test]
    fn castling_blocked_by_intervening_piece() {
        let (mut board, king) = castling_fixture();
        place(&mut board, 4, Color::White, PieceKind::Knight, Square::new(7, 1));
        assert_eq!(castle_targets(&board, &king), vec![Square::new(7, 6)]);
    }

    #[test]
    fn castling_through_attacked_square_is_refused() {
        let (mut board, king) = castling_fixture();
        // Black rook on f8 covers f1, the kingside transit square.
        place(&mut board, 4, Color::Black, PieceKind::Rook, Square::new(0, 5));
        assert_eq!(castle_targets(&board, &king), vec![Square::new(7, 2)]);
    }

    #[test]
    fn castling_out_of_check_is_refused() {
        let (mut board, king) = castling_fixture();
        place(&mut board, 4, Color::Black, PieceKind::Rook, Square::new(3, 4));
        assert!(castle_targets(&board, &king).is_empty());
    }

    #[test]
    fn moved_rook_loses_its_side() {
        let (mut board, king) = castling_fixture();
        let mut rook = *board.piece_at(Square::new(7, 7)).expect("rook on h1");
        rook.has_moved = true;
        board.set(rook.square, Some(rook));
        assert_eq!(castle_targets(&board, &king), vec![Square::new(7, 2)]);
    }

    #[test]
    fn queenside_b_file_attack_does_not_block() {
        let (mut board, king) = castling_fixture();
        // b1 is crossed by the rook only; an attack on it is irrelevant.
        place(&mut board, 4, Color::Black, PieceKind::Rook, Square::new(0, 1));
        let targets = castle_targets(&board, &king);
        assert!(targets.contains(&Square::new(7, 2)));
    }
}
