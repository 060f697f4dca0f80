//! Move representation.
//!
//! A `ChessMove` carries the fields every move shares plus a `MoveKind`
//! holding what only castling, en passant and promotion need. The piece
//! records are snapshots taken before the move, which is what makes undo exact.

use std::fmt;

use crate::game_state::board::Piece;
use crate::game_state::chess_types::{PieceId, PieceKind, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKind {
    Standard,
    /// King travels `from -> to`; the rook jumps `rook_from -> rook_to`.
    Castling {
        rook: Piece,
        rook_from: Square,
        rook_to: Square,
    },
    /// The captured pawn stands on `captured_square`, beside `to`.
    EnPassant { captured_square: Square },
    Promotion { promotion: PieceKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChessMove {
    pub piece: Piece,
    pub from: Square,
    pub to: Square,
    pub captured: Option<Piece>,
    pub kind: MoveKind,
}

impl ChessMove {
    pub fn standard(piece: Piece, to: Square, captured: Option<Piece>) -> Self {
        Self {
            piece,
            from: piece.square,
            to,
            captured,
            kind: MoveKind::Standard,
        }
    }

    pub fn castling(king: Piece, king_to: Square, rook: Piece, rook_to: Square) -> Self {
        Self {
            piece: king,
            from: king.square,
            to: king_to,
            captured: None,
            kind: MoveKind::Castling {
                rook,
                rook_from: rook.square,
                rook_to,
            },
        }
    }

    pub fn en_passant(pawn: Piece, to: Square, captured: Piece) -> Self {
        Self {
            piece: pawn,
            from: pawn.square,
            to,
            captured: Some(captured),
            kind: MoveKind::EnPassant {
                captured_square: captured.square,
            },
        }
    }

    pub fn promoting(pawn: Piece, to: Square, promotion: PieceKind, captured: Option<Piece>) -> Self {
        Self {
            piece: pawn,
            from: pawn.square,
            to,
            captured,
            kind: MoveKind::Promotion { promotion },
        }
    }

    #[inline]
    pub fn piece_id(&self) -> PieceId {
        self.piece.id
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion { promotion } => Some(promotion),
            _ => None,
        }
    }

    /// Pawn advance of two rows.
    #[inline]
    pub fn is_double_pawn_step(&self) -> bool {
        self.piece.kind == PieceKind::Pawn && self.from.row.abs_diff(self.to.row) == 2
    }

    /// Request key: piece id, destination and promotion choice.
    #[inline]
    pub fn matches(&self, piece: PieceId, target: Square, promotion: Option<PieceKind>) -> bool {
        self.piece.id == piece && self.to == target && self.promotion() == promotion
    }

    /// Long algebraic form used by the engine protocol, e.g. `e7e8q`.
    pub fn to_long_algebraic(&self) -> String {
        match self.promotion() {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind.letter()),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for ChessMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_long_algebraic())
    }
}

#[cfg(test)]
mod tests {
    use super::{ChessMove, MoveKind};
    use crate::game_state::board::Piece;
    use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};

    #[test]
    fn promoting_move_reports_its_kind_and_notation() {
        let pawn = Piece::new(PieceId(8), Player::human(Color::White), PieceKind::Pawn, Square::new(1, 4));
        let mv = ChessMove::promoting(pawn, Square::new(0, 4), PieceKind::Knight, None);

        assert_eq!(mv.kind, MoveKind::Promotion { promotion: PieceKind::Knight });
        assert_eq!(mv.promotion(), Some(PieceKind::Knight));
        assert!(mv.matches(PieceId(8), Square::new(0, 4), Some(PieceKind::Knight)));
        assert!(!mv.matches(PieceId(8), Square::new(0, 4), None));
        assert_eq!(mv.to_string(), "e7e8n");

        let plain = ChessMove::standard(pawn, Square::new(0, 4), None);
        assert_eq!(plain.promotion(), None);
        assert_eq!(plain.to_long_algebraic(), "e7e8");
    }
}
