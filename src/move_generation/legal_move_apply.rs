//! Board mutation per move kind and its exact inverse.
//!
//! `apply_move` and `revert_move` return the records of every piece whose
//! state changed so the caller can refresh its `PieceIndex`. Captured pieces
//! are reported with `alive == false` on their last square.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::{Board, Piece};
use crate::game_state::chess_types::Square;
use crate::moves::chess_move::{ChessMove, MoveKind};

pub fn apply_move(board: &mut Board, mv: &ChessMove) -> ChessResult<Vec<Piece>> {
    let mover = expect_piece(board, mv.from, &mv.piece)?;

    match mv.kind {
        MoveKind::Standard => {
            let mut changed = Vec::with_capacity(2);
            if let Some(victim) = capture_at(board, mv.to, mv)? {
                changed.push(victim);
            }
            board.take(mv.from);
            let moved = relocate(mover, mv.to);
            board.set(mv.to, Some(moved));
            changed.push(moved);
            Ok(changed)
        }
        MoveKind::Castling {
            rook,
            rook_from,
            rook_to,
        } => {
            let rook = expect_piece(board, rook_from, &rook)?;
            if !board.is_empty(mv.to) {
                return Err(ChessError::invariant(format!("castling destination {} occupied", mv.to)));
            }
            if !board.is_empty(rook_to) {
                return Err(ChessError::invariant(format!("castling rook square {rook_to} occupied")));
            }
            board.take(mv.from);
            board.take(rook_from);
            let king = relocate(mover, mv.to);
            let rook = relocate(rook, rook_to);
            board.set(mv.to, Some(king));
            board.set(rook_to, Some(rook));
            Ok(vec![king, rook])
        }
        MoveKind::EnPassant { captured_square } => {
            if captured_square == mv.to {
                return Err(ChessError::invariant("en passant capture square equals destination"));
            }
            let mut changed = Vec::with_capacity(2);
            match capture_at(board, captured_square, mv)? {
                Some(victim) => changed.push(victim),
                None => {
                    return Err(ChessError::invariant(format!(
                        "en passant victim missing on {captured_square}"
                    )))
                }
            }
            board.take(mv.from);
            let moved = relocate(mover, mv.to);
            board.set(mv.to, Some(moved));
            changed.push(moved);
            Ok(changed)
        }
        MoveKind::Promotion { promotion } => {
            if !promotion.is_promotion_target() {
                return Err(ChessError::invariant(format!("cannot promote to {promotion:?}")));
            }
            let mut changed = Vec::with_capacity(2);
            if let Some(victim) = capture_at(board, mv.to, mv)? {
                changed.push(victim);
            }
            board.take(mv.from);
            let mut promoted = relocate(mover, mv.to);
            promoted.kind = promotion;
            board.set(mv.to, Some(promoted));
            changed.push(promoted);
            Ok(changed)
        }
    }
}

/// Undo `mv`, which must be the last move applied to `board`.
pub fn revert_move(board: &mut Board, mv: &ChessMove) -> ChessResult<Vec<Piece>> {
    board
        .piece_at(mv.to)
        .filter(|piece| piece.id == mv.piece.id)
        .ok_or_else(|| ChessError::invariant(format!("moved piece {} not on {}", mv.piece.id, mv.to)))?;

    match mv.kind {
        MoveKind::Castling {
            rook,
            rook_from,
            rook_to,
        } => {
            board
                .piece_at(rook_to)
                .filter(|piece| piece.id == rook.id)
                .ok_or_else(|| ChessError::invariant(format!("castled rook not on {rook_to}")))?;
            board.take(mv.to);
            board.take(rook_to);
            board.set(mv.from, Some(mv.piece));
            board.set(rook_from, Some(rook));
            Ok(vec![mv.piece, rook])
        }
        MoveKind::Standard | MoveKind::Promotion { .. } | MoveKind::EnPassant { .. } => {
            board.take(mv.to);
            board.set(mv.from, Some(mv.piece));
            let mut changed = vec![mv.piece];
            if let Some(victim) = mv.captured {
                let square = restore_square(mv);
                if !board.is_empty(square) {
                    return Err(ChessError::invariant(format!("cannot restore capture onto occupied {square}")));
                }
                board.set(square, Some(victim));
                changed.push(victim);
            }
            Ok(changed)
        }
    }
}

/// Where a captured piece goes back to: its own square, not `to`, for en passant.
fn restore_square(mv: &ChessMove) -> Square {
    match mv.kind {
        MoveKind::EnPassant { captured_square } => captured_square,
        _ => mv.to,
    }
}

fn expect_piece(board: &Board, square: Square, snapshot: &Piece) -> ChessResult<Piece> {
    match board.piece_at(square) {
        Some(piece) if piece.id == snapshot.id => Ok(*piece),
        Some(piece) => Err(ChessError::invariant(format!(
            "expected piece {} on {square}, found {}",
            snapshot.id, piece.id
        ))),
        None => Err(ChessError::invariant(format!(
            "expected piece {} on {square}, found nothing",
            snapshot.id
        ))),
    }
}

/// Remove the opponent piece on `square`, if any, and return its dead record.
fn capture_at(board: &mut Board, square: Square, mv: &ChessMove) -> ChessResult<Option<Piece>> {
    match board.piece_at(square) {
        None => Ok(None),
        Some(piece) if piece.color == mv.piece.color => Err(ChessError::invariant(format!(
            "move {mv} would capture own piece on {square}"
        ))),
        Some(_) => {
            let mut victim = board.take(square).ok_or_else(|| ChessError::invariant("capture vanished"))?;
            victim.alive = false;
            Ok(Some(victim))
        }
    }
}

#[inline]
fn relocate(mut piece: Piece, to: Square) -> Piece {
    piece.square = to;
    piece.has_moved = true;
    piece
}

#[cfg(test)]
mod tests {
    use super::{apply_move, revert_move};
    use crate::game_state::board::{Board, Piece, PieceIndex};
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};
    use crate::moves::chess_move::ChessMove;

    fn place(board: &mut Board, id: u32, color: Color, kind: PieceKind, square: Square) -> Piece {
        let piece = Piece::new(PieceId(id), Player::human(color), kind, square);
        board.set(square, Some(piece));
        piece
    }

    fn kings(board: &mut Board) {
        place(board, 90, Color::White, PieceKind::King, Square::new(7, 4));
        place(board, 91, Color::Black, PieceKind::King, Square::new(0, 4));
    }

    #[test]
    fn standard_capture_marks_victim_dead_and_reverts() {
        let mut board = Board::empty();
        kings(&mut board);
        let rook = place(&mut board, 0, Color::White, PieceKind::Rook, Square::new(4, 0));
        let knight = place(&mut board, 1, Color::Black, PieceKind::Knight, Square::new(2, 0));
        let before = board.clone();

        let mv = ChessMove::standard(rook, knight.square, Some(knight));
        let changed = apply_move(&mut board, &mv).expect("apply");
        assert_eq!(changed.len(), 2);
        assert!(changed.iter().any(|p| p.id == knight.id && !p.alive));
        let moved = board.piece_at(Square::new(2, 0)).expect("rook moved");
        assert_eq!(moved.id, rook.id);
        assert!(moved.has_moved);
        assert!(board.is_empty(Square::new(4, 0)));

        revert_move(&mut board, &mv).expect("revert");
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_king_and_rook_together() {
        let mut board = Board::empty();
        let king = place(&mut board, 0, Color::Black, PieceKind::King, Square::new(0, 4));
        let rook = place(&mut board, 1, Color::Black, PieceKind::Rook, Square::new(0, 0));
        place(&mut board, 2, Color::White, PieceKind::King, Square::new(7, 4));
        let before = board.clone();

        let mv = ChessMove::castling(king, Square::new(0, 2), rook, Square::new(0, 3));
        let changed = apply_move(&mut board, &mv).expect("apply");
        assert_eq!(changed.len(), 2);
        assert_eq!(board.piece_at(Square::new(0, 2)).map(|p| p.kind), Some(PieceKind::King));
        assert_eq!(board.piece_at(Square::new(0, 3)).map(|p| p.kind), Some(PieceKind::Rook));
        assert!(board.is_empty(Square::new(0, 0)));
        assert!(board.is_empty(Square::new(0, 4)));
        assert!(board.pieces().all(|p| p.kind != PieceKind::Rook || p.has_moved));

        revert_move(&mut board, &mv).expect("revert");
        assert_eq!(board, before);
    }

    #[test]
    fn en_passant_restores_victim_to_its_own_square() {
        let mut board = Board::empty();
        kings(&mut board);
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(3, 4));
        let victim = place(&mut board, 1, Color::Black, PieceKind::Pawn, Square::new(3, 5));
        let before = board.clone();

        let mv = ChessMove::en_passant(pawn, Square::new(2, 5), victim);
        apply_move(&mut board, &mv).expect("apply");
        assert!(board.is_empty(Square::new(3, 5)));
        assert_eq!(board.piece_at(Square::new(2, 5)).map(|p| p.id), Some(pawn.id));

        revert_move(&mut board, &mv).expect("revert");
        assert_eq!(board.piece_at(Square::new(3, 5)).map(|p| p.id), Some(victim.id));
        assert!(board.is_empty(Square::new(2, 5)));
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_keeps_id_and_color() {
        let mut board = Board::empty();
        kings(&mut board);
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(1, 0));
        let rook = place(&mut board, 1, Color::Black, PieceKind::Rook, Square::new(0, 1));
        let before = board.clone();
        let mut index = PieceIndex::from_board(&board);

        let mv = ChessMove::promoting(pawn, rook.square, PieceKind::Knight, Some(rook));
        let changed = apply_move(&mut board, &mv).expect("apply");
        index.apply_changes(&changed);
        let promoted = board.piece_at(Square::new(0, 1)).expect("promoted piece");
        assert_eq!(promoted.id, pawn.id);
        assert_eq!(promoted.color, Color::White);
        assert_eq!(promoted.kind, PieceKind::Knight);
        assert_eq!(index.captured(Color::Black).count(), 1);
        assert!(index.matches_board(&board));

        let restored = revert_move(&mut board, &mv).expect("revert");
        index.apply_changes(&restored);
        assert_eq!(board, before);
        assert!(index.matches_board(&board));
        assert_eq!(index.captured(Color::Black).count(), 0);
    }

    #[test]
    fn stale_snapshot_is_rejected() {
        let mut board = Board::empty();
        kings(&mut board);
        let pawn = place(&mut board, 0, Color::White, PieceKind::Pawn, Square::new(6, 0));
        let mut ghost = pawn;
        ghost.id = PieceId(77);
        let mv = ChessMove::standard(ghost, Square::new(5, 0), None);
        assert!(apply_move(&mut board, &mv).is_err());
        assert_eq!(board.piece_at(pawn.square).map(|p| p.id), Some(pawn.id));
    }
}
