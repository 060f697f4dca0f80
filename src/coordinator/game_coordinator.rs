//! Turn sequencing, history and undo/redo over one owned `GameState`.
//!
//! All mutation goes through `&mut self`; every successful change ends with
//! the legal move cache and check status rebuilt for the side to move.

use crate::coordinator::turn_state::{TurnPhase, TurnState};
use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::Piece;
use crate::game_state::chess_types::*;
use crate::game_state::game_state::GameState;
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_apply::{apply_move, revert_move};
use crate::moves::chess_move::ChessMove;
use crate::utils::fen_parser::parse_fen;
use crate::utils::long_algebraic::parse_long_algebraic;

/// Result of a move request that was not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied(ChessMove),
    /// The move needs a promotion kind before it can be played.
    AwaitingPromotion { piece: PieceId, target: Square },
}

#[derive(Debug, Clone)]
pub struct GameCoordinator {
    state: GameState,
    phase: TurnPhase,
}

impl Default for GameCoordinator {
    fn default() -> Self {
        Self::new(Player::human(Color::White), Player::human(Color::Black))
    }
}

impl GameCoordinator {
    pub fn new(white: Player, black: Player) -> Self {
        Self {
            state: GameState::with_players(white, black),
            phase: TurnPhase::Normal,
        }
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        Ok(Self {
            state: GameState::from_fen(fen)?,
            phase: TurnPhase::Normal,
        })
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn fen(&self) -> String {
        self.state.get_fen()
    }

    pub fn request_move(
        &mut self,
        piece: PieceId,
        target: Square,
        promotion: Option<PieceKind>,
    ) -> ChessResult<MoveOutcome> {
        if let TurnPhase::AwaitingPromotionChoice {
            piece: pending_piece,
            target: pending_target,
        } = self.phase
        {
            if promotion.is_none() || piece != pending_piece || target != pending_target {
                return Err(ChessError::PromotionPending {
                    piece: pending_piece,
                    target: pending_target,
                });
            }
        }

        let candidate = self
            .state
            .legal_moves
            .iter()
            .find(|mv| mv.matches(piece, target, promotion))
            .copied();

        let Some(mv) = candidate else {
            let needs_choice = promotion.is_none()
                && self
                    .state
                    .legal_moves
                    .iter()
                    .any(|mv| mv.piece.id == piece && mv.to == target && mv.promotion().is_some());
            if needs_choice {
                log::debug!("{piece} to {target} awaits a promotion choice");
                self.phase = TurnPhase::AwaitingPromotionChoice { piece, target };
                return Ok(MoveOutcome::AwaitingPromotion { piece, target });
            }
            return Err(ChessError::InvalidMoveRequest {
                piece,
                target,
                promotion,
            });
        };

        self.execute(mv)?;
        self.state.redo_stack.clear();
        self.phase = TurnPhase::Normal;
        Ok(MoveOutcome::Applied(mv))
    }

    pub fn cancel_promotion(&mut self) -> ChessResult<()> {
        match self.phase {
            TurnPhase::Normal => Err(ChessError::NoPendingPromotion),
            TurnPhase::AwaitingPromotionChoice { .. } => {
                self.phase = TurnPhase::Normal;
                Ok(())
            }
        }
    }

    /// Returns `false` when there is nothing to undo.
    pub fn undo_move(&mut self) -> ChessResult<bool> {
        self.phase = TurnPhase::Normal;
        match self.retract()? {
            Some(mv) => {
                self.state.redo_stack.push(mv);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns `false` when there is nothing to redo.
    pub fn redo_move(&mut self) -> ChessResult<bool> {
        self.phase = TurnPhase::Normal;
        let Some(mv) = self.state.redo_stack.pop() else {
            return Ok(false);
        };
        if let Err(err) = self.execute(mv) {
            self.state.redo_stack.push(mv);
            return Err(err);
        }
        Ok(true)
    }

    /// Undo or redo until exactly `ply` moves are in the history. Returns
    /// whether that ply was reachable.
    pub fn jump_to_ply(&mut self, ply: usize) -> ChessResult<bool> {
        while self.state.history.len() > ply {
            self.undo_move()?;
        }
        while self.state.history.len() < ply {
            if !self.redo_move()? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Fresh standard game with the same players.
    pub fn reset_game(&mut self) {
        let [white, black] = self.state.players;
        self.state = GameState::with_players(white, black);
        self.phase = TurnPhase::Normal;
    }

    /// Replace the game with a decoded position; on error nothing changes.
    pub fn load_fen(&mut self, fen: &str) -> ChessResult<()> {
        let state = parse_fen(fen, self.state.players)?;
        self.state = state;
        self.phase = TurnPhase::Normal;
        Ok(())
    }

    /// Play a best move reported for `position`. Fails with
    /// `StaleEngineResult` when the game has moved on.
    pub fn apply_engine_move(&mut self, position: &str, engine_move: &str) -> ChessResult<MoveOutcome> {
        let current = self.fen();
        if current != position {
            log::warn!("discarding engine move {engine_move} for a stale position");
            return Err(ChessError::StaleEngineResult { expected: current });
        }

        self.play_long_algebraic(engine_move)
    }

    /// Request a move written as `e2e4` or `e7e8q`.
    pub fn play_long_algebraic(&mut self, text: &str) -> ChessResult<MoveOutcome> {
        let parsed = parse_long_algebraic(text)?;
        let piece = self
            .state
            .board
            .piece_at(parsed.from)
            .map(|piece| piece.id)
            .ok_or_else(|| ChessError::InvalidSquare(format!("no piece on {}", parsed.from)))?;
        self.request_move(piece, parsed.to, parsed.promotion)
    }

    /// Destination squares of `piece`, each listed once.
    pub fn legal_moves_for(&self, piece: PieceId) -> Vec<Square> {
        let mut squares: Vec<Square> = Vec::new();
        for mv in self.state.legal_moves.iter().filter(|mv| mv.piece.id == piece) {
            if !squares.contains(&mv.to) {
                squares.push(mv.to);
            }
        }
        squares
    }

    #[inline]
    pub fn legal_moves(&self) -> &[ChessMove] {
        &self.state.legal_moves
    }

    #[inline]
    pub fn check_status(&self) -> CheckStatus {
        self.state.check
    }

    #[inline]
    pub fn history_view(&self) -> &[UndoState] {
        &self.state.history
    }

    #[inline]
    pub fn redo_view(&self) -> &[ChessMove] {
        &self.state.redo_stack
    }

    /// Pieces of `color` that have been captured.
    pub fn captured_pieces(&self, color: Color) -> Vec<Piece> {
        self.state.pieces.captured(color).copied().collect()
    }

    #[inline]
    pub fn current_player(&self) -> Player {
        self.state.current_player()
    }

    #[inline]
    pub fn turn_state(&self) -> TurnState {
        TurnState {
            side: self.state.side_to_move,
            phase: self.phase,
        }
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.state.status()
    }

    /// Apply an already-legal move: board, index, history, clocks, turn.
    pub(crate) fn execute(&mut self, mv: ChessMove) -> ChessResult<()> {
        let changed = apply_move(&mut self.state.board, &mv)?;
        self.state.pieces.apply_changes(&changed);

        let state = &mut self.state;
        state.history.push(UndoState::new(mv, state.halfmove_clock, state.fullmove_number));

        if mv.piece.kind == PieceKind::Pawn || mv.is_capture() {
            state.halfmove_clock = 0;
        } else {
            state.halfmove_clock = state.halfmove_clock.saturating_add(1);
        }
        if mv.piece.color == Color::Black {
            state.fullmove_number = state.fullmove_number.saturating_add(1);
        }

        state.side_to_move = state.side_to_move.opposite();
        log::debug!("played {mv}; {:?} to move", state.side_to_move);
        state.refresh_derived()
    }

    /// Pop and revert the last move without touching the redo stack.
    pub(crate) fn retract(&mut self) -> ChessResult<Option<ChessMove>> {
        let Some(entry) = self.state.history.pop() else {
            return Ok(None);
        };

        let restored = match revert_move(&mut self.state.board, &entry.mv) {
            Ok(restored) => restored,
            Err(err) => {
                self.state.history.push(entry);
                return Err(err);
            }
        };
        self.state.pieces.apply_changes(&restored);

        self.state.halfmove_clock = entry.prev_halfmove_clock;
        self.state.fullmove_number = entry.prev_fullmove_number;
        self.state.side_to_move = entry.mv.piece.color;
        self.state.refresh_derived()?;
        Ok(Some(entry.mv))
    }
}
