//! Move-path enumeration for validating the generator against known counts.

use crate::coordinator::game_coordinator::GameCoordinator;
use crate::errors::ChessResult;
use crate::moves::chess_move::MoveKind;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: u64,
    pub captures: u64,
    pub en_passant: u64,
    pub castles: u64,
    pub promotions: u64,
    pub checks: u64,
    pub checkmates: u64,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

/// Leaf count at `depth`. The last ply is read off the legal move cache
/// instead of being played.
pub fn perft(game: &mut GameCoordinator, depth: u32) -> ChessResult<u64> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = game.legal_moves().to_vec();
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0;
    for mv in moves {
        game.execute(mv)?;
        nodes += perft(game, depth - 1)?;
        game.retract()?;
    }
    Ok(nodes)
}

/// Leaf count plus move-type tallies for the final ply. Every leaf is
/// played, so this is much slower than `perft`.
pub fn perft_counts(game: &mut GameCoordinator, depth: u32) -> ChessResult<PerftCounts> {
    let mut total = PerftCounts::default();
    if depth == 0 {
        total.nodes = 1;
        return Ok(total);
    }

    for mv in game.legal_moves().to_vec() {
        game.execute(mv)?;
        if depth == 1 {
            total.nodes += 1;
            total.captures += u64::from(mv.is_capture());
            match mv.kind {
                MoveKind::EnPassant { .. } => total.en_passant += 1,
                MoveKind::Castling { .. } => total.castles += 1,
                MoveKind::Promotion { .. } => total.promotions += 1,
                MoveKind::Standard => {}
            }
            if game.check_status().in_check {
                total.checks += 1;
                if game.legal_moves().is_empty() {
                    total.checkmates += 1;
                }
            }
        } else {
            total.merge(perft_counts(game, depth - 1)?);
        }
        game.retract()?;
    }
    Ok(total)
}

/// Per-root-move leaf counts, sorted by long algebraic text.
pub fn perft_divide(game: &mut GameCoordinator, depth: u32) -> ChessResult<Vec<(String, u64)>> {
    let mut out = Vec::new();
    if depth == 0 {
        return Ok(out);
    }
    for mv in game.legal_moves().to_vec() {
        game.execute(mv)?;
        let nodes = perft(game, depth - 1)?;
        game.retract()?;
        out.push((mv.to_long_algebraic(), nodes));
    }
    out.sort();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::{perft, perft_counts, perft_divide};
    use crate::coordinator::game_coordinator::GameCoordinator;
    use crate::game_state::chess_rules::STARTING_POSITION_FEN;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    #[test]
    fn start_position_counts() {
        let mut game = GameCoordinator::default();
        assert_eq!(perft(&mut game, 1), Ok(20));
        assert_eq!(perft(&mut game, 2), Ok(400));
        assert_eq!(perft(&mut game, 3), Ok(8902));
        assert_eq!(game.fen(), STARTING_POSITION_FEN);
        assert!(game.history_view().is_empty());
    }

    #[test]
    fn kiwipete_counts() {
        let mut game = GameCoordinator::from_fen(KIWIPETE).expect("kiwipete parses");
        assert_eq!(perft(&mut game, 2), Ok(2039));

        let counts = perft_counts(&mut game, 1).expect("perft counts");
        assert_eq!(counts.nodes, 48);
        assert_eq!(counts.captures, 8);
        assert_eq!(counts.castles, 2);
        assert_eq!(counts.en_passant, 0);
        assert_eq!(counts.promotions, 0);
        assert_eq!(counts.checks, 0);
        assert_eq!(game.fen(), KIWIPETE);
    }

    #[test]
    fn position_with_promotions_and_en_passant() {
        // Position 3 of the common perft suite.
        let mut game = GameCoordinator::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1")
            .expect("fixture parses");
        assert_eq!(perft(&mut game, 1), Ok(14));
        assert_eq!(perft(&mut game, 2), Ok(191));
        assert_eq!(perft(&mut game, 3), Ok(2812));
    }

    #[test]
    fn divide_sums_to_perft() {
        let mut game = GameCoordinator::default();
        let divided = perft_divide(&mut game, 2).expect("divide");
        assert_eq!(divided.len(), 20);
        assert_eq!(divided.iter().map(|(_, n)| n).sum::<u64>(), 400);
        assert!(divided.iter().all(|(_, n)| *n == 20));
    }
}
