//! Complete state of one game.
//!
//! `GameState` owns the board, the per-player piece index, the history and
//! redo stacks and the cached legal moves for the side to move. It is plain
//! data plus derived-state refresh; the rules for advancing it live in the
//! coordinator.

use crate::errors::ChessResult;
use crate::game_state::board::{Board, PieceIndex};
use crate::game_state::chess_types::*;
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_checks::king_is_exposed;
use crate::move_generation::legal_move_generator::{LegalMoveGenerator, MoveGenerator};
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::ChessMove;
use crate::utils::fen_generator::generate_fen;
use crate::utils::fen_parser::parse_fen;

#[derive(Debug, Clone)]
pub struct GameState {
    pub board: Board,
    pub pieces: PieceIndex,
    /// Indexed by `Color::index`.
    pub players: [Player; 2],
    pub side_to_move: Color,

    pub history: Vec<UndoState>,
    pub redo_stack: Vec<ChessMove>,

    pub halfmove_clock: u16,
    pub fullmove_number: u16,

    /// En-passant target read from a loaded FEN, used only while `history`
    /// is empty.
    pub initial_en_passant: Option<Square>,

    // --- Derived, refreshed after every board change ---
    pub legal_moves: Vec<ChessMove>,
    pub check: CheckStatus,
}

impl GameState {
    #[inline]
    pub fn new_game() -> Self {
        Self::with_players(
            Player::human(Color::White),
            Player::human(Color::Black),
        )
    }

    /// Standard setup for the given players, White to move.
    pub fn with_players(white: Player, black: Player) -> Self {
        let board = Board::standard(white, black);
        Self::from_parts(board, [white, black], Color::White, None, 0, 1)
            .expect("standard setup always has both kings")
    }

    /// Assemble a state from a validated board and refresh derived data.
    pub fn from_parts(
        board: Board,
        players: [Player; 2],
        side_to_move: Color,
        initial_en_passant: Option<Square>,
        halfmove_clock: u16,
        fullmove_number: u16,
    ) -> ChessResult<Self> {
        board.validate_kings()?;
        let pieces = PieceIndex::from_board(&board);
        let mut state = Self {
            board,
            pieces,
            players,
            side_to_move,
            history: Vec::new(),
            redo_stack: Vec::new(),
            halfmove_clock,
            fullmove_number,
            initial_en_passant,
            legal_moves: Vec::new(),
            check: CheckStatus::default(),
        };
        state.refresh_derived()?;
        Ok(state)
    }

    #[inline]
    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        parse_fen(fen, [Player::human(Color::White), Player::human(Color::Black)])
    }

    #[inline]
    pub fn get_fen(&self) -> String {
        generate_fen(self)
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.players[self.side_to_move.index()]
    }

    #[inline]
    pub fn player(&self, color: Color) -> Player {
        self.players[color.index()]
    }

    #[inline]
    pub fn generation_context(&self) -> GenerationContext {
        GenerationContext::from_history(&self.history, self.initial_en_passant)
    }

    #[inline]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.generation_context().en_passant_target
    }

    pub fn last_move(&self) -> Option<&ChessMove> {
        self.history.last().map(|entry| &entry.mv)
    }

    /// Recompute the legal move cache and check status for the side to move.
    pub fn refresh_derived(&mut self) -> ChessResult<()> {
        self.legal_moves = LegalMoveGenerator.generate_legal_moves(self)?;
        self.check = CheckStatus {
            in_check: king_is_exposed(&self.board, self.side_to_move)?,
            king_square: self.board.king_square(self.side_to_move),
        };
        Ok(())
    }

    pub fn status(&self) -> GameStatus {
        if !self.legal_moves.is_empty() {
            GameStatus::Ongoing
        } else if self.check.in_check {
            GameStatus::Checkmate {
                winner: self.side_to_move.opposite(),
            }
        } else {
            GameStatus::Stalemate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GameState;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, GameStatus};

    #[test]
    fn new_game_matches_starting_fen() {
        let game = GameState::new_game();
        assert_eq!(game.get_fen(), STARTING_POSITION_FEN);
        assert_eq!(game.side_to_move, Color::White);
        assert_eq!(game.legal_moves.len(), 20);
        assert!(!game.check.in_check);
        assert_eq!(game.status(), GameStatus::Ongoing);
    }

    #[test]
    fn checkmate_and_stalemate_are_reported() {
        let mated = GameState::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3")
            .expect("fool's mate parses");
        assert!(mated.check.in_check);
        assert_eq!(
            mated.status(),
            GameStatus::Checkmate {
                winner: Color::Black
            }
        );

        let stale = GameState::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").expect("stalemate parses");
        assert!(!stale.check.in_check);
        assert_eq!(stale.status(), GameStatus::Stalemate);
    }
}
