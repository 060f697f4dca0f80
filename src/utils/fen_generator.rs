use crate::game_state::board::Board;
use crate::game_state::chess_rules::{KING_HOME_COL, KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL};
use crate::game_state::{chess_types::*, game_state::GameState};

pub fn generate_fen(game_state: &GameState) -> String {
    let board = generate_board_field(&game_state.board);
    let side_to_move = match game_state.side_to_move {
        Color::White => "w",
        Color::Black => "b",
    };
    let castling = generate_castling_field(&game_state.board);
    let en_passant = game_state
        .en_passant_target()
        .map_or_else(|| "-".to_owned(), |square| square.to_string());

    format!(
        "{} {} {} {} {} {}",
        board,
        side_to_move,
        castling,
        en_passant,
        game_state.halfmove_clock,
        game_state.fullmove_number
    )
}

fn generate_board_field(board: &Board) -> String {
    let mut out = String::new();

    for row in 0..8u8 {
        let mut empty_count = 0u8;

        for col in 0..8u8 {
            if let Some(piece) = board.piece_at(Square::new(row, col)) {
                if empty_count > 0 {
                    out.push(char::from(b'0' + empty_count));
                    empty_count = 0;
                }
                out.push(piece.fen_char());
            } else {
                empty_count += 1;
            }
        }

        if empty_count > 0 {
            out.push(char::from(b'0' + empty_count));
        }

        if row < 7 {
            out.push('/');
        }
    }

    out
}

/// Rights are read off the unmoved flags of kings and corner rooks.
fn generate_castling_field(board: &Board) -> String {
    let mut out = String::new();

    for color in [Color::White, Color::Black] {
        let row = color.home_row();
        let unmoved = |col: u8, kind: PieceKind| {
            board
                .piece_at(Square::new(row, col))
                .is_some_and(|piece| piece.kind == kind && piece.color == color && !piece.has_moved)
        };

        if !unmoved(KING_HOME_COL, PieceKind::King) {
            continue;
        }
        for (rook_col, letter) in [(KINGSIDE_ROOK_COL, 'k'), (QUEENSIDE_ROOK_COL, 'q')] {
            if unmoved(rook_col, PieceKind::Rook) {
                out.push(match color {
                    Color::White => letter.to_ascii_uppercase(),
                    Color::Black => letter,
                });
            }
        }
    }

    if out.is_empty() {
        out.push('-');
    }
    out
}
