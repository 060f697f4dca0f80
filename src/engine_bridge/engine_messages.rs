//! Parsing of engine output lines and evaluation scaling.
//!
//! Only the handful of messages the bridge acts on are recognised; every
//! other line parses to `None` and is dropped by the caller.

use serde::{Deserialize, Serialize};

use crate::game_state::chess_types::Color;
use crate::utils::long_algebraic::parse_long_algebraic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Score {
    Centipawns(i32),
    /// Moves to mate; negative when the side it is reported for is mated.
    Mate(i32),
}

impl Score {
    /// Same score seen from the other side.
    pub fn flipped(self) -> Self {
        match self {
            Score::Centipawns(cp) => Score::Centipawns(-cp),
            Score::Mate(n) => Score::Mate(-n),
        }
    }

    /// Engines report for the side to move; return it from White's view.
    pub fn for_white(self, side_to_move: Color) -> Self {
        match side_to_move {
            Color::White => self,
            Color::Black => self.flipped(),
        }
    }

    /// Position of the score on a 0..=100 bar, 50 being level. Centipawns
    /// are clamped to `cap` first; mates pin the bar to one end.
    pub fn display_percent(self, cap: i32) -> f64 {
        match self {
            Score::Centipawns(cp) => {
                let clamped = cp.clamp(-cap, cap);
                let percent = f64::from(clamped + cap) * 100.0 / f64::from(2 * cap);
                percent.clamp(0.0, 100.0)
            }
            Score::Mate(n) if n > 0 => 100.0,
            Score::Mate(_) => 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: Option<u32>,
    pub nodes_per_second: Option<u64>,
    pub score: Option<Score>,
    /// `lowerbound` / `upperbound` qualified the score.
    pub bound: bool,
    /// `currmove` when given, otherwise the first `pv` move.
    pub current_move: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    UciOk,
    ReadyOk,
    /// `option name <name> ...`
    OptionDeclared(String),
    Info(SearchInfo),
    /// `best` is `None` for `bestmove (none)`.
    BestMove {
        best: Option<String>,
        ponder: Option<String>,
    },
}

pub fn parse_engine_line(line: &str) -> Option<EngineMessage> {
    let line = line.trim();
    let mut tokens = line.split_whitespace();

    match tokens.next()? {
        "uciok" if line == "uciok" => Some(EngineMessage::UciOk),
        "readyok" if line == "readyok" => Some(EngineMessage::ReadyOk),
        "option" => parse_option(tokens),
        "info" => parse_info(tokens).map(EngineMessage::Info),
        "bestmove" => parse_best_move(tokens),
        _ => None,
    }
}

fn parse_option<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<EngineMessage> {
    if tokens.next()? != "name" {
        return None;
    }
    let name: Vec<&str> = tokens.take_while(|token| *token != "type").collect();
    if name.is_empty() {
        return None;
    }
    Some(EngineMessage::OptionDeclared(name.join(" ")))
}

fn parse_info<'a>(tokens: impl Iterator<Item = &'a str>) -> Option<SearchInfo> {
    let tokens: Vec<&str> = tokens.collect();
    if tokens.first() == Some(&"string") {
        return None;
    }

    let mut info = SearchInfo::default();
    let mut pv_move: Option<String> = None;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "depth" => {
                info.depth = tokens.get(i + 1).and_then(|t| t.parse().ok());
                i += 2;
            }
            "nps" => {
                info.nodes_per_second = tokens.get(i + 1).and_then(|t| t.parse().ok());
                i += 2;
            }
            "score" => {
                let value = tokens.get(i + 2).and_then(|t| t.parse::<i32>().ok());
                info.score = match (tokens.get(i + 1).copied(), value) {
                    (Some("cp"), Some(cp)) => Some(Score::Centipawns(cp)),
                    (Some("mate"), Some(n)) => Some(Score::Mate(n)),
                    _ => None,
                };
                i += 3;
            }
            "lowerbound" | "upperbound" => {
                info.bound = true;
                i += 1;
            }
            "currmove" => {
                info.current_move = tokens.get(i + 1).and_then(|t| checked_move(t));
                i += 2;
            }
            "pv" => {
                if pv_move.is_none() {
                    pv_move = tokens.get(i + 1).and_then(|t| checked_move(t));
                }
                i += 2;
            }
            _ => i += 1,
        }
    }

    if info.current_move.is_none() {
        info.current_move = pv_move;
    }
    if info.depth.is_none() && info.score.is_none() && info.current_move.is_none() {
        return None;
    }
    Some(info)
}

fn parse_best_move<'a>(mut tokens: impl Iterator<Item = &'a str>) -> Option<EngineMessage> {
    let best = tokens.next()?;
    let best = if best == "(none)" {
        None
    } else {
        Some(checked_move(best)?)
    };
    let ponder = match tokens.next() {
        Some("ponder") => tokens.next().and_then(checked_move),
        _ => None,
    };
    Some(EngineMessage::BestMove { best, ponder })
}

fn checked_move(text: &str) -> Option<String> {
    parse_long_algebraic(text).ok().map(|_| text.to_owned())
}

/// Side to move recorded in a FEN string, White when the field is missing.
pub fn side_to_move_of(fen: &str) -> Color {
    match fen.split_whitespace().nth(1) {
        Some("b") => Color::Black,
        _ => Color::White,
    }
}
