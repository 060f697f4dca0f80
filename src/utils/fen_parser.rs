//! FEN-to-GameState parser.
//!
//! FEN carries no per-piece movement flags, so `has_moved` is inferred: kings
//! and rooks count as unmoved only when a castling right names them, pawns
//! only while on their starting row. Piece ids are assigned row by row from
//! a8, matching `Board::standard`.

use crate::errors::{ChessError, ChessResult};
use crate::game_state::board::{Board, Piece};
use crate::game_state::chess_rules::{KING_HOME_COL, KINGSIDE_ROOK_COL, QUEENSIDE_ROOK_COL};
use crate::game_state::chess_types::*;
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_checks::king_is_exposed;
use crate::utils::algebraic::algebraic_to_square;

/// Castling flags as written in the third FEN field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct CastlingField {
    /// Indexed by `Color::index`: (kingside, queenside).
    sides: [(bool, bool); 2],
}

fn malformed(message: impl Into<String>) -> ChessError {
    ChessError::MalformedPosition(message.into())
}

pub fn parse_fen(fen: &str, players: [Player; 2]) -> ChessResult<GameState> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| malformed("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| malformed("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| malformed("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| malformed("missing en-passant square"))?;
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(malformed("extra trailing fields"));
    }

    let mut board = parse_board(board_part, players)?;
    let side_to_move = parse_side_to_move(side_part)?;
    let castling = parse_castling_rights(castling_part)?;
    let en_passant = parse_en_passant_square(en_passant_part, side_to_move)?;
    let halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| malformed(format!("invalid halfmove clock: {halfmove_part}")))?;
    let fullmove_number = fullmove_part
        .parse::<u16>()
        .map_err(|_| malformed(format!("invalid fullmove number: {fullmove_part}")))?
        .max(1);

    board.validate_kings()?;
    infer_has_moved(&mut board, castling);

    if king_is_exposed(&board, side_to_move.opposite())? {
        return Err(malformed("side not to move is in check"));
    }

    GameState::from_parts(
        board,
        players,
        side_to_move,
        en_passant,
        halfmove_clock,
        fullmove_number,
    )
}

fn parse_board(board_part: &str, players: [Player; 2]) -> ChessResult<Board> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(malformed("board layout must contain 8 ranks"));
    }

    let mut board = Board::empty();
    let mut next_id = 0u32;

    for (row, rank_str) in ranks.iter().enumerate() {
        let mut col = 0usize;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(malformed(format!("invalid empty-square count '{ch}'")));
                }
                col += empty_count as usize;
                continue;
            }

            let kind = PieceKind::from_letter(ch)
                .ok_or_else(|| malformed(format!("invalid piece character '{ch}'")))?;
            let color = if ch.is_ascii_uppercase() {
                Color::White
            } else {
                Color::Black
            };

            if col >= 8 {
                return Err(malformed(format!("rank {} has too many files", 8 - row)));
            }
            if kind == PieceKind::Pawn && (row == 0 || row == 7) {
                return Err(malformed(format!("pawn on back rank in rank {}", 8 - row)));
            }

            let square = Square::new(row as u8, col as u8);
            board.set(
                square,
                Some(Piece::new(PieceId(next_id), players[color.index()], kind, square)),
            );
            next_id += 1;
            col += 1;
        }

        if col != 8 {
            return Err(malformed(format!("rank {} does not sum to 8 files", 8 - row)));
        }
    }

    Ok(board)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(malformed(format!("invalid side to move: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingField> {
    let mut field = CastlingField::default();
    if castling_part == "-" {
        return Ok(field);
    }

    for ch in castling_part.chars() {
        match ch {
            'K' => field.sides[Color::White.index()].0 = true,
            'Q' => field.sides[Color::White.index()].1 = true,
            'k' => field.sides[Color::Black.index()].0 = true,
            'q' => field.sides[Color::Black.index()].1 = true,
            _ => return Err(malformed(format!("invalid castling character: {ch}"))),
        }
    }

    Ok(field)
}

/// The target must sit on the rank a double step by the side not to move
/// passes over.
fn parse_en_passant_square(en_passant_part: &str, side_to_move: Color) -> ChessResult<Option<Square>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let square = algebraic_to_square(en_passant_part)
        .map_err(|_| malformed(format!("invalid en-passant square: {en_passant_part}")))?;
    let mover = side_to_move.opposite();
    let expected_row = (mover.pawn_start_row() as i8 + mover.pawn_direction()) as u8;
    if square.row != expected_row {
        return Err(malformed(format!("en-passant square {square} on wrong rank")));
    }
    Ok(Some(square))
}

fn infer_has_moved(board: &mut Board, castling: CastlingField) {
    let pieces: Vec<Piece> = board.pieces().copied().collect();

    for mut piece in pieces {
        let (kingside, queenside) = castling.sides[piece.color.index()];
        let home_row = piece.color.home_row();

        piece.has_moved = match piece.kind {
            PieceKind::Pawn => piece.square.row != piece.color.pawn_start_row(),
            PieceKind::King => {
                !(piece.square == Square::new(home_row, KING_HOME_COL) && (kingside || queenside))
            }
            PieceKind::Rook => {
                let unmoved = (kingside && piece.square == Square::new(home_row, KINGSIDE_ROOK_COL))
                    || (queenside && piece.square == Square::new(home_row, QUEENSIDE_ROOK_COL));
                !unmoved
            }
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Queen => false,
        };

        board.set(piece.square, Some(piece));
    }

    for color in [Color::White, Color::Black] {
        let (kingside, queenside) = castling.sides[color.index()];
        let king_home = Square::new(color.home_row(), KING_HOME_COL);
        let king_ok = board
            .piece_at(king_home)
            .is_some_and(|piece| piece.kind == PieceKind::King && piece.color == color);
        if (kingside || queenside) && !king_ok {
            log::warn!("ignoring {color:?} castling rights: king not on its home square");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_fen;
    use crate::errors::ChessError;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;
    use crate::game_state::chess_types::{Color, PieceKind, Player, Square};

    fn humans() -> [Player; 2] {
        [Player::human(Color::White), Player::human(Color::Black)]
    }

    #[test]
    fn parse_starting_fen() {
        let game_state = parse_fen(STARTING_POSITION_FEN, humans()).expect("starting FEN should parse");

        assert_eq!(game_state.side_to_move, Color::White);
        assert_eq!(game_state.fullmove_number, 1);
        assert_eq!(game_state.halfmove_clock, 0);
        assert_eq!(game_state.board.pieces().count(), 32);
        assert!(game_state.board.pieces().all(|piece| !piece.has_moved));
    }

    #[test]
    fn castling_rights_drive_has_moved() {
        let game_state = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 0 1", humans()).expect("parses");
        let board = &game_state.board;
        let moved = |row, col| board.piece_at(Square::new(row, col)).map(|p| p.has_moved);

        assert_eq!(moved(7, 7), Some(false));
        assert_eq!(moved(7, 0), Some(true));
        assert_eq!(moved(7, 4), Some(false));
        assert_eq!(moved(0, 0), Some(false));
        assert_eq!(moved(0, 7), Some(true));
    }

    #[test]
    fn en_passant_target_is_kept_for_first_move() {
        let game_state = parse_fen(
            "rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3",
            humans(),
        )
        .expect("parses");
        assert_eq!(game_state.initial_en_passant, Some(Square::new(2, 5)));
        assert!(game_state
            .legal_moves
            .iter()
            .any(|mv| mv.piece.kind == PieceKind::Pawn && mv.to == Square::new(2, 5)));
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        let bad = [
            "",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkz - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e4 0 1",
            "4k2R/8/8/8/8/8/8/4K3 w - - 0 1",
            "P3k3/8/8/8/8/8/8/4K3 w - - 0 1",
        ];
        for fen in bad {
            assert!(
                matches!(parse_fen(fen, humans()), Err(ChessError::MalformedPosition(_))),
                "{fen:?} should be rejected"
            );
        }
    }
}
