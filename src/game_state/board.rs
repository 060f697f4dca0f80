//! Board grid, piece records and the per-player piece index.
//!
//! The grid is the source of truth for what stands where. `PieceIndex` keeps
//! every piece record per color, captured ones included (`alive == false`),
//! and is refreshed from the change sets returned by the move handler.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::BACK_RANK_LAYOUT;
use crate::game_state::chess_types::{Color, PieceId, PieceKind, Player, Square};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Player,
    pub kind: PieceKind,
    pub color: Color,
    pub square: Square,
    pub alive: bool,
    pub has_moved: bool,
}

impl Piece {
    pub fn new(id: PieceId, owner: Player, kind: PieceKind, square: Square) -> Self {
        Self {
            id,
            owner,
            kind,
            color: owner.color,
            square,
            alive: true,
            has_moved: false,
        }
    }

    /// FEN letter, upper-case for White.
    pub fn fen_char(&self) -> char {
        let letter = self.kind.letter();
        match self.color {
            Color::White => letter.to_ascii_uppercase(),
            Color::Black => letter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; 8]; 8],
}

impl Default for Board {
    fn default() -> Self {
        Self {
            cells: [[None; 8]; 8],
        }
    }
}

impl Board {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Standard setup with ids assigned row by row from a8.
    pub fn standard(white: Player, black: Player) -> Self {
        let mut board = Board::empty();
        let mut next_id = 0u32;
        let mut place = |board: &mut Board, owner: Player, kind: PieceKind, square: Square| {
            board.set(square, Some(Piece::new(PieceId(next_id), owner, kind, square)));
            next_id += 1;
        };

        for (col, kind) in BACK_RANK_LAYOUT.iter().enumerate() {
            place(&mut board, black, *kind, Square::new(0, col as u8));
        }
        for col in 0..8 {
            place(&mut board, black, PieceKind::Pawn, Square::new(1, col));
        }
        for col in 0..8 {
            place(&mut board, white, PieceKind::Pawn, Square::new(6, col));
        }
        for (col, kind) in BACK_RANK_LAYOUT.iter().enumerate() {
            place(&mut board, white, *kind, Square::new(7, col as u8));
        }

        board
    }

    #[inline]
    pub fn piece_at(&self, square: Square) -> Option<&Piece> {
        self.cells[square.row as usize][square.col as usize].as_ref()
    }

    #[inline]
    pub fn is_empty(&self, square: Square) -> bool {
        self.piece_at(square).is_none()
    }

    /// True when `square` holds a piece of the color opposing `color`.
    #[inline]
    pub fn is_occupied_by_opponent(&self, square: Square, color: Color) -> bool {
        self.piece_at(square).is_some_and(|piece| piece.color != color)
    }

    /// Write a cell. The stored piece's square is forced to match the cell.
    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.cells[square.row as usize][square.col as usize] = piece.map(|mut p| {
            p.square = square;
            p
        });
    }

    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.cells[square.row as usize][square.col as usize].take()
    }

    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten().flatten()
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.pieces().filter(move |piece| piece.color == color)
    }

    pub fn find(&self, id: PieceId) -> Option<&Piece> {
        self.pieces().find(|piece| piece.id == id)
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.pieces_of(color)
            .find(|piece| piece.kind == PieceKind::King)
            .map(|piece| piece.square)
    }

    /// Independent copy of the grid plus a piece index rebuilt from it.
    ///
    /// Captured pieces are carried over from `index` so the copy reports the
    /// same captures; live records are taken from the copied grid.
    pub fn clone_with_index(&self, index: &PieceIndex) -> (Board, PieceIndex) {
        let board = self.clone();
        let mut rebuilt = PieceIndex::from_board(&board);
        for piece in index.all().filter(|piece| !piece.alive) {
            rebuilt.upsert(*piece);
        }
        (board, rebuilt)
    }

    /// Exactly one live king per color.
    pub fn validate_kings(&self) -> ChessResult<()> {
        for color in [Color::White, Color::Black] {
            let kings = self
                .pieces_of(color)
                .filter(|piece| piece.kind == PieceKind::King)
                .count();
            if kings != 1 {
                return Err(ChessError::MalformedPosition(format!(
                    "{color:?} has {kings} kings"
                )));
            }
        }
        Ok(())
    }
}

/// Piece records grouped by owning color.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PieceIndex {
    by_color: [BTreeMap<PieceId, Piece>; 2],
}

impl PieceIndex {
    pub fn from_board(board: &Board) -> Self {
        let mut index = PieceIndex::default();
        for piece in board.pieces() {
            index.upsert(*piece);
        }
        index
    }

    pub fn upsert(&mut self, piece: Piece) {
        self.by_color[piece.color.index()].insert(piece.id, piece);
    }

    /// Fold a handler change set into the index.
    pub fn apply_changes(&mut self, changed: &[Piece]) {
        for piece in changed {
            self.upsert(*piece);
        }
    }

    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.by_color.iter().find_map(|pieces| pieces.get(&id))
    }

    pub fn all(&self) -> impl Iterator<Item = &Piece> {
        self.by_color.iter().flat_map(|pieces| pieces.values())
    }

    pub fn live(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.by_color[color.index()].values().filter(|piece| piece.alive)
    }

    pub fn captured(&self, color: Color) -> impl Iterator<Item = &Piece> {
        self.by_color[color.index()].values().filter(|piece| !piece.alive)
    }

    /// Every live record must sit on the cell that holds it.
    pub fn matches_board(&self, board: &Board) -> bool {
        let live_ok = self
            .all()
            .filter(|piece| piece.alive)
            .all(|piece| board.piece_at(piece.square) == Some(piece));
        let board_ok = board
            .pieces()
            .all(|piece| self.get(piece.id).is_some_and(|p| p.alive));
        live_ok && board_ok
    }
}
