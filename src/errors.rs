//! Errors used throughout the rules engine and the engine bridge.
//!
//! `ChessError` is the single error type returned by board manipulation,
//! move requests and FEN decoding. `BridgeError` covers the external engine
//! process. Callers should treat the variants as follows:
//! - `InvalidMoveRequest`, `PromotionPending`, `NoPendingPromotion` and
//!   `MalformedPosition` are user-level rejections; the game state is left
//!   untouched and nothing is retried.
//! - `StaleEngineResult` means an engine answer arrived for a position that is
//!   no longer on the board; drop it.
//! - `InternalInvariantViolation` is a programming error (for example a side
//!   without a king). It is logged and propagated, never shown to a player.

use thiserror::Error;

use crate::game_state::chess_types::{PieceId, PieceKind, Square};

pub type ChessResult<T> = Result<T, ChessError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    /// The requested move is not in the cached legal-move list.
    #[error("illegal move request: piece {piece} to {target} ({promotion:?})")]
    InvalidMoveRequest {
        piece: PieceId,
        target: Square,
        promotion: Option<PieceKind>,
    },

    /// A promotion choice is outstanding and must be resolved first.
    #[error("a promotion choice is pending for piece {piece} on {target}")]
    PromotionPending { piece: PieceId, target: Square },

    #[error("no promotion choice is pending")]
    NoPendingPromotion,

    /// FEN (or snapshot) text could not be decoded.
    #[error("malformed position: {0}")]
    MalformedPosition(String),

    #[error("invalid square: {0}")]
    InvalidSquare(String),

    /// An engine result was computed for a different position.
    #[error("engine result for '{expected}' does not match the current position")]
    StaleEngineResult { expected: String },

    #[error("internal invariant violated: {0}")]
    InternalInvariantViolation(String),
}

impl ChessError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        let message = message.into();
        log::error!("internal invariant violated: {message}");
        ChessError::InternalInvariantViolation(message)
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine process (or transport) could not be started.
    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine bridge has not been initialized")]
    NotInitialized,

    #[error("engine worker disconnected")]
    Disconnected,

    #[error("invalid bridge configuration: {0}")]
    InvalidConfig(String),

    #[error("engine i/o error: {0}")]
    Io(#[from] std::io::Error),
}
