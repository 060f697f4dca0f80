//! Pawn movement strategy.
//!
//! Covers single and double advances, diagonal captures, en passant and the
//! four promotion candidates that replace any move landing on the back rank.

use crate::game_state::board::{Board, Piece};
use crate::game_state::chess_types::{PieceKind, Square, PROMOTION_KINDS};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;

pub fn pawn_moves(board: &Board, pawn: &Piece, context: &GenerationContext) -> Vec<ChessMove> {
    let mut out = Vec::with_capacity(8);
    let direction = pawn.color.pawn_direction();

    if let Some(one_step) = pawn.square.offset(direction, 0) {
        if board.is_empty(one_step) {
            push_advance(pawn, one_step, None, &mut out);

            if pawn.square.row == pawn.color.pawn_start_row() {
                if let Some(two_step) = one_step.offset(direction, 0) {
                    if board.is_empty(two_step) {
                        out.push(ChessMove::standard(*pawn, two_step, None));
                    }
                }
            }
        }
    }

    for d_col in [-1i8, 1] {
        let Some(to) = pawn.square.offset(direction, d_col) else {
            continue;
        };
        match board.piece_at(to) {
            Some(target) if target.color != pawn.color => {
                push_advance(pawn, to, Some(*target), &mut out);
            }
            Some(_) => {}
            None if context.en_passant_target == Some(to) => {
                let captured_square = Square::new(pawn.square.row, to.col);
                if let Some(victim) = board.piece_at(captured_square) {
                    if victim.kind == PieceKind::Pawn && victim.color != pawn.color {
                        out.push(ChessMove::en_passant(*pawn, to, *victim));
                    }
                }
            }
            None => {}
        }
    }

    out
}

/// Plain move, or one candidate per promotion kind on the back rank.
fn push_advance(pawn: &Piece, to: Square, captured: Option<Piece>, out: &mut Vec<ChessMove>) {
    if to.row == pawn.color.back_rank() {
        for kind in PROMOTION_KINDS {
            out.push(ChessMove::promoting(*pawn, to, kind, captured));
        }
    } else {
        out.push(ChessMove::standard(*pawn, to, captured));
    }
}

#[cfg(test)]
mod tests {
    use super::pawn_moves;
    use crate::game_state::board::{Board, Piece};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::move_generation::move_generator::GenerationContext;
    use crate::moves::chess_move::MoveKind;

    fn place(board: &mut Board, id: u32, color: Color, kind: PieceKind, square: Square) -> Piece {
        let piece = Piece::new(PieceId(id), Player::human(color), kind, square);
        board.set(square, Some(piece));
        piece
    }

    #[test]
    fn pawn_on_start_row_has_single_and_double_step() {
        let mut board = Board::empty();
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(6, 4));

        let moves = pawn_moves(&board, &pawn, &GenerationContext::default());
        let targets: Vec<Square> = moves.iter().map(|mv| mv.to).collect();
        assert_eq!(targets, vec![Square::new(5, 4), Square::new(4, 4)]);
    }

    #[test]
    fn double_step_needs_both_squares_empty() {
        let mut board = Board::empty();
        let pawn = place(&mut board, 0, Color::Black, PieceKind::Pawn, Square::new(1, 2));
        place(&mut board, 1, Color::White, PieceKind::Knight, Square::new(3, 2));

        let moves = pawn_moves(&board, &pawn, &GenerationContext::default());
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].to, Square::new(2, 2));
    }

    #[test]
    fn diagonal_capture_only_onto_opponent() {
        let mut board = Board::empty();
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(4, 4));
        place(&mut board, 1, Color::Black, PieceKind::Knight, Square::new(3, 3));
        place(&mut board, 2, Color::White, PieceKind::Knight, Square::new(3, 5));

        let moves = pawn_moves(&board, &pawn, &GenerationContext::default());
        assert_eq!(moves.len(), 2);
        assert!(moves.iter().any(|mv| mv.to == Square::new(3, 3) && mv.is_capture()));
    }

    #[test]
    fn en_passant_captures_pawn_beside_destination() {
        let mut board = Board::empty();
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(3, 4));
        let victim = place(&mut board, 1, Color::Black, PieceKind::Pawn, Square::new(3, 3));
        let context = GenerationContext {
            en_passant_target: Some(Square::new(2, 3)),
            include_castling: true,
        };

        let moves = pawn_moves(&board, &pawn, &context);
        let ep = moves
            .iter()
            .find(|mv| matches!(mv.kind, MoveKind::EnPassant { .. }))
            .expect("en passant candidate");
        assert_eq!(ep.to, Square::new(2, 3));
        assert_eq!(ep.captured.map(|p| p.id), Some(victim.id));
        assert_eq!(
            ep.kind,
            MoveKind::EnPassant {
                captured_square: Square::new(3, 3)
            }
        );
    }

    #[test]
    fn back_rank_yields_four_promotions_per_destination() {
        let mut board = Board::empty();
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(1, 0));
        place(&mut board, 1, Color::Black, PieceKind::Rook, Square::new(0, 1));

        let moves = pawn_moves(&board, &pawn, &GenerationContext::default());
        assert_eq!(moves.len(), 8);
        for target in [Square::new(0, 0), Square::new(0, 1)] {
            let count = moves
                .iter()
                .filter(|mv| mv.to == target && mv.promotion().is_some())
                .count();
            assert_eq!(count, 4);
        }
    }
}
