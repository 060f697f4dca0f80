//! Crate root module declarations for the castle_chess rules engine.
//!
//! Exposes the board model, move generation and legality checks, the game
//! coordinator, FEN and snapshot utilities, in-process computer movers and
//! the bridge to an external UCI engine.

pub mod errors;

pub mod game_state {
    pub mod board;
    pub mod chess_rules;
    pub mod chess_types;
    pub mod game_state;
    pub mod undo_state;
}

pub mod moves {
    pub mod bishop_moves;
    pub mod chess_move;
    pub mod king_moves;
    pub mod knight_moves;
    pub mod pawn_moves;
    pub mod queen_moves;
    pub mod rook_moves;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod legal_move_shared;
    pub mod move_generator;
    pub mod perft;
}

pub mod coordinator {
    pub mod game_coordinator;
    pub mod turn_state;
}

pub mod computer {
    pub mod computer_mover;
    pub mod random_mover;
}

pub mod engine_bridge {
    pub mod bridge_config;
    pub mod engine_bridge;
    pub mod engine_messages;
    pub mod engine_transport;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen_generator;
    pub mod fen_parser;
    pub mod long_algebraic;
    pub mod render_game_state;
    pub mod saved_game;
}
