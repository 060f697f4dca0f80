use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use castle_chess::computer::computer_mover::play_computer_move;
use castle_chess::computer::random_mover::RandomMover;
use castle_chess::coordinator::game_coordinator::{GameCoordinator, MoveOutcome};
use castle_chess::engine_bridge::bridge_config::BridgeConfig;
use castle_chess::engine_bridge::engine_bridge::{BridgeEvent, ChannelListener, EngineBridge};
use castle_chess::game_state::chess_types::GameStatus;
use castle_chess::utils::algebraic::algebraic_to_square;
use castle_chess::utils::render_game_state::render_game_state;
use castle_chess::utils::saved_game::SavedGame;

const HELP: &str = "commands: move <e2e4> | undo | redo | jump <ply> | fen | load <fen> | reset | board \
| moves <square> | random | engine | go | save [path] | restore <path> | quit";

const ENGINE_TIMEOUT: Duration = Duration::from_secs(120);

struct Console {
    game: GameCoordinator,
    random: RandomMover,
    engine: Option<(EngineBridge, Receiver<BridgeEvent>)>,
}

impl Console {
    fn new() -> Self {
        Self {
            game: GameCoordinator::default(),
            random: RandomMover::new(),
            engine: None,
        }
    }

    /// Returns `false` on `quit`.
    fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        match command {
            "quit" | "exit" => return false,
            "help" => println!("{HELP}"),
            "board" => println!("{}", render_game_state(self.game.state())),
            "fen" => println!("{}", self.game.fen()),
            "move" => self.play(rest),
            "undo" => match self.game.undo_move() {
                Ok(true) => self.show_position(),
                Ok(false) => println!("nothing to undo"),
                Err(err) => println!("error: {err}"),
            },
            "redo" => match self.game.redo_move() {
                Ok(true) => self.show_position(),
                Ok(false) => println!("nothing to redo"),
                Err(err) => println!("error: {err}"),
            },
            "jump" => match rest.parse::<usize>() {
                Ok(ply) => match self.game.jump_to_ply(ply) {
                    Ok(true) => self.show_position(),
                    Ok(false) => println!("ply {ply} is out of reach"),
                    Err(err) => println!("error: {err}"),
                },
                Err(_) => println!("usage: jump <ply>"),
            },
            "load" => match self.game.load_fen(rest) {
                Ok(()) => self.show_position(),
                Err(err) => println!("error: {err}"),
            },
            "reset" => {
                self.game.reset_game();
                self.show_position();
            }
            "moves" => self.list_moves(rest),
            "random" => match play_computer_move(&mut self.game, &mut self.random) {
                Ok(Some(outcome)) => self.report(outcome),
                Ok(None) => println!("no legal moves"),
                Err(err) => println!("error: {err}"),
            },
            "engine" => self.start_engine(),
            "go" => self.engine_move(),
            "save" => self.save(rest),
            "restore" => self.restore(rest),
            "" => {}
            // A bare move such as `e2e4` is accepted without the `move` prefix.
            other if other.len() >= 4 => self.play(other),
            other => println!("unknown command '{other}'; {HELP}"),
        }
        true
    }

    fn play(&mut self, text: &str) {
        match self.game.play_long_algebraic(text) {
            Ok(outcome) => self.report(outcome),
            Err(err) => println!("error: {err}"),
        }
    }

    fn report(&mut self, outcome: MoveOutcome) {
        match outcome {
            MoveOutcome::Applied(mv) => {
                println!("played {mv}");
                self.show_position();
            }
            MoveOutcome::AwaitingPromotion { target, .. } => {
                println!("promotion on {target}: repeat the move with q, r, b or n");
                // The console has no separate prompt; drop the pending state.
                let _ = self.game.cancel_promotion();
            }
        }
    }

    fn show_position(&self) {
        println!("{}", render_game_state(self.game.state()));
        println!("{}", self.game.fen());
        match self.game.status() {
            GameStatus::Checkmate { winner } => println!("checkmate, {winner:?} wins"),
            GameStatus::Stalemate => println!("stalemate"),
            GameStatus::Ongoing if self.game.check_status().in_check => {
                println!("{:?} is in check", self.game.turn_state().side)
            }
            GameStatus::Ongoing => {}
        }
    }

    fn list_moves(&self, square: &str) {
        let square = match algebraic_to_square(square) {
            Ok(square) => square,
            Err(err) => {
                println!("error: {err}");
                return;
            }
        };
        let Some(piece) = self.game.state().board.piece_at(square) else {
            println!("no piece on {square}");
            return;
        };
        let targets: Vec<String> = self
            .game
            .legal_moves_for(piece.id)
            .iter()
            .map(|target| target.to_string())
            .collect();
        println!("{}", targets.join(" "));
    }

    fn start_engine(&mut self) {
        if let Some((bridge, _)) = self.engine.as_mut() {
            if bridge.is_initialized() {
                println!("engine already running");
                return;
            }
            match bridge.initialize() {
                Ok(()) => println!("engine restarted"),
                Err(err) => println!("error: {err}"),
            }
            return;
        }
        let config = match load_bridge_config() {
            Ok(config) => config,
            Err(err) => {
                println!("error: {err}");
                return;
            }
        };
        let (listener, events) = ChannelListener::new();
        let mut bridge = match EngineBridge::new(config, Box::new(listener)) {
            Ok(bridge) => bridge,
            Err(err) => {
                println!("error: {err}");
                return;
            }
        };
        match bridge.initialize() {
            Ok(()) => {
                println!("engine started");
                self.engine = Some((bridge, events));
            }
            Err(err) => println!("error: {err}"),
        }
    }

    fn engine_move(&mut self) {
        let Some((bridge, events)) = self.engine.as_ref() else {
            println!("no engine; use 'engine' first or 'random'");
            return;
        };
        let position = self.game.fen();
        if let Err(err) = bridge.submit(&position) {
            println!("error: {err}");
            return;
        }

        let best = loop {
            match events.recv_timeout(ENGINE_TIMEOUT) {
                Ok(BridgeEvent::Progress(progress)) => {
                    let current = progress.current_move.unwrap_or_default();
                    println!("depth {} {current}", progress.depth);
                }
                Ok(BridgeEvent::Evaluation(evaluation)) => {
                    println!("eval {:.0}/100", evaluation.percent);
                }
                Ok(BridgeEvent::BestMove(best)) if best.position == position => break best,
                Ok(BridgeEvent::Failure(message)) => {
                    println!("engine failure: {message}");
                    return;
                }
                Ok(_) => {}
                Err(_) => {
                    println!("engine did not answer in time");
                    let _ = bridge.cancel();
                    return;
                }
            }
        };

        let Some(engine_move) = best.best else {
            println!("engine found no move");
            return;
        };
        match self.game.apply_engine_move(&best.position, &engine_move) {
            Ok(outcome) => self.report(outcome),
            Err(err) => println!("error: {err}"),
        }
    }

    fn save(&self, path: &str) {
        let json = SavedGame::capture(&self.game).and_then(|saved| saved.to_json());
        match json {
            Ok(json) if path.is_empty() => println!("{json}"),
            Ok(json) => match fs::write(path, json) {
                Ok(()) => println!("saved to {path}"),
                Err(err) => println!("error: {err}"),
            },
            Err(err) => println!("error: {err}"),
        }
    }

    fn restore(&mut self, path: &str) {
        let restored = fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|json| SavedGame::from_json(&json).map_err(|err| err.to_string()))
            .and_then(|saved| saved.restore().map_err(|err| err.to_string()));
        match restored {
            Ok(game) => {
                self.game = game;
                self.show_position();
            }
            Err(err) => println!("error: {err}"),
        }
    }
}

/// Bridge settings from the JSON file named by `CASTLE_CHESS_ENGINE_CONFIG`,
/// or the defaults.
fn load_bridge_config() -> Result<BridgeConfig, String> {
    match std::env::var("CASTLE_CHESS_ENGINE_CONFIG") {
        Ok(path) => {
            let json = fs::read_to_string(&path).map_err(|err| format!("{path}: {err}"))?;
            BridgeConfig::from_json_str(&json).map_err(|err| err.to_string())
        }
        Err(_) => Ok(BridgeConfig::default()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut console = Console::new();
    println!("{HELP}");
    console.show_position();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if !console.handle_command(line.trim()) {
            break;
        }
        io::stdout().flush().ok();
    }
}
