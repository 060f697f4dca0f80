//! Long algebraic move text as used by the engine protocol (`e2e4`, `e7e8q`).

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::{PieceKind, Square};
use crate::utils::algebraic::algebraic_to_square;

/// A move in coordinate form, not yet resolved against a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongAlgebraicMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

pub fn parse_long_algebraic(text: &str) -> ChessResult<LongAlgebraicMove> {
    let text = text.trim();
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(ChessError::InvalidSquare(text.to_owned()));
    }

    let from = algebraic_to_square(&text[0..2])?;
    let to = algebraic_to_square(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(ch) => match PieceKind::from_letter(ch) {
            Some(kind) if kind.is_promotion_target() && ch.is_ascii_lowercase() => Some(kind),
            _ => return Err(ChessError::InvalidSquare(text.to_owned())),
        },
    };

    Ok(LongAlgebraicMove { from, to, promotion })
}
