//! Helpers shared by the per-piece movement strategies.

use crate::game_state::board::{Board, Piece};
use crate::moves::chess_move::ChessMove;

pub const ORTHOGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL_DIRECTIONS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ALL_DIRECTIONS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Single-step targets (knight, king): empty or opponent-occupied squares.
pub fn step_moves(board: &Board, piece: &Piece, offsets: &[(i8, i8)], out: &mut Vec<ChessMove>) {
    for &(d_row, d_col) in offsets {
        let Some(to) = piece.square.offset(d_row, d_col) else {
            continue;
        };
        match board.piece_at(to) {
            None => out.push(ChessMove::standard(*piece, to, None)),
            Some(target) if target.color != piece.color => {
                out.push(ChessMove::standard(*piece, to, Some(*target)))
            }
            Some(_) => {}
        }
    }
}

/// Ray-cast along each direction until the edge or the first occupied square,
/// which is included only when it holds an opponent piece.
pub fn ray_moves(board: &Board, piece: &Piece, directions: &[(i8, i8)], out: &mut Vec<ChessMove>) {
    for &(d_row, d_col) in directions {
        let mut cursor = piece.square;
        while let Some(to) = cursor.offset(d_row, d_col) {
            match board.piece_at(to) {
                None => out.push(ChessMove::standard(*piece, to, None)),
                Some(target) => {
                    if target.color != piece.color {
                        out.push(ChessMove::standard(*piece, to, Some(*target)));
                    }
                    break;
                }
            }
            cursor = to;
        }
    }
}
