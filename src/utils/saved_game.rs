//! JSON snapshot of a game: starting position, moves played and a timestamp.
//!
//! Restoring replays every move through the coordinator, so a snapshot that
//! contains an illegal move is rejected rather than loaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coordinator::game_coordinator::GameCoordinator;
use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_types::Player;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub initial_fen: String,
    pub players: [Player; 2],
    /// Long algebraic, oldest first.
    pub moves: Vec<String>,
    pub saved_at: DateTime<Utc>,
}

impl SavedGame {
    /// Snapshot the history of `game`. Moves waiting on the redo stack are
    /// not included.
    pub fn capture(game: &GameCoordinator) -> ChessResult<Self> {
        let mut start = game.clone();
        start.jump_to_ply(0)?;

        Ok(Self {
            initial_fen: start.fen(),
            players: game.state().players,
            moves: game
                .history_view()
                .iter()
                .map(|entry| entry.mv.to_long_algebraic())
                .collect(),
            saved_at: Utc::now(),
        })
    }

    pub fn restore(&self) -> ChessResult<GameCoordinator> {
        let [white, black] = self.players;
        let mut game = GameCoordinator::new(white, black);
        game.load_fen(&self.initial_fen)?;
        for (ply, text) in self.moves.iter().enumerate() {
            game.play_long_algebraic(text).map_err(|err| {
                ChessError::MalformedPosition(format!("saved move {} ({text}) rejected: {err}", ply + 1))
            })?;
        }
        Ok(game)
    }

    pub fn to_json(&self) -> ChessResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ChessError::MalformedPosition(format!("cannot encode snapshot: {err}")))
    }

    pub fn from_json(json: &str) -> ChessResult<Self> {
        serde_json::from_str(json)
            .map_err(|err| ChessError::MalformedPosition(format!("cannot decode snapshot: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::SavedGame;
    use crate::coordinator::game_coordinator::GameCoordinator;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    #[test]
    fn snapshot_survives_json_and_replays() {
        let mut game = GameCoordinator::default();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"] {
            game.play_long_algebraic(mv).expect("opening move");
        }

        let saved = SavedGame::capture(&game).expect("capture");
        assert_eq!(saved.initial_fen, STARTING_POSITION_FEN);
        assert_eq!(saved.moves.len(), 5);

        let json = saved.to_json().expect("encode");
        let decoded = SavedGame::from_json(&json).expect("decode");
        assert_eq!(decoded, saved);

        let restored = decoded.restore().expect("replay");
        assert_eq!(restored.fen(), game.fen());
        assert_eq!(restored.history_view().len(), 5);
    }

    #[test]
    fn capture_ignores_redo_and_keeps_custom_start() {
        let fen = "4k3/P7/8/8/8/8/8/4K3 w - - 0 1";
        let mut game = GameCoordinator::from_fen(fen).expect("fixture parses");
        game.play_long_algebraic("a7a8q").expect("promotion");
        game.play_long_algebraic("e8d7").expect("king move");
        game.undo_move().expect("undo");

        let saved = SavedGame::capture(&game).expect("capture");
        assert_eq!(saved.initial_fen, fen);
        assert_eq!(saved.moves, vec!["a7a8q".to_owned()]);
        assert_eq!(saved.restore().expect("replay").fen(), game.fen());
    }

    #[test]
    fn illegal_saved_move_is_rejected() {
        let mut saved = SavedGame::capture(&GameCoordinator::default()).expect("capture");
        saved.moves.push("e2e5".to_owned());
        assert!(matches!(saved.restore(), Err(ChessError::MalformedPosition(_))));
        assert!(SavedGame::from_json("{").is_err());
    }
}
