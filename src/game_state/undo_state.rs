use crate::moves::chess_move::ChessMove;

/// One history entry: the move and the counters in force before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoState {
    pub mv: ChessMove,
    pub prev_halfmove_clock: u16,
    pub prev_fullmove_number: u16,
}

impl UndoState {
    pub fn new(mv: ChessMove, prev_halfmove_clock: u16, prev_fullmove_number: u16) -> Self {
        Self {
            mv,
            prev_halfmove_clock,
            prev_fullmove_number,
        }
    }
}
