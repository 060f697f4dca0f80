use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::{Color, PieceId, Square};

/// Whether the side to move is free to move or must finish a promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TurnPhase {
    #[default]
    Normal,
    AwaitingPromotionChoice { piece: PieceId, target: Square },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub side: Color,
    pub phase: TurnPhase,
}

impl TurnState {
    #[inline]
    pub fn is_awaiting_promotion(&self) -> bool {
        matches!(self.phase, TurnPhase::AwaitingPromotionChoice { .. })
    }
}
