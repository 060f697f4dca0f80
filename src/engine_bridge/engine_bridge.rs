//! Asynchronous client for an external UCI engine.
//!
//! `EngineBridge` is a thin handle: every operation becomes a message for a
//! worker thread that owns the transport and the `EngineStatus` state
//! machine. Results come back through a `BridgeListener`. The only shared
//! state is a status mirror so callers can poll without a round trip.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::engine_bridge::bridge_config::{analysis_options, AnalysisType, BridgeConfig, MAX_SKILL_LEVEL};
use crate::engine_bridge::engine_messages::{parse_engine_line, side_to_move_of, EngineMessage, Score, SearchInfo};
use crate::engine_bridge::engine_transport::{EngineTransport, LineSink, ProcessTransport, WorkerMessage};
use crate::errors::BridgeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineStatus {
    /// Not connected, or the handshake has not been acknowledged.
    Loading,
    /// `uciok` received.
    Loaded,
    /// `readyok` received and no search in flight.
    Ready,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub position: String,
    pub depth: u32,
    pub current_move: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub position: String,
    /// From White's point of view.
    pub score: Score,
    /// 0..=100, 100 meaning White is winning.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestMove {
    /// FEN the search was started for. Compare before applying.
    pub position: String,
    pub best: Option<String>,
    pub ponder: Option<String>,
}

/// Callbacks invoked on the bridge worker thread.
pub trait BridgeListener: Send {
    fn on_status_change(&mut self, _status: EngineStatus) {}
    fn on_search_progress(&mut self, _progress: &SearchProgress) {}
    fn on_evaluation_update(&mut self, _evaluation: &Evaluation) {}
    fn on_best_move(&mut self, _best_move: &BestMove) {}
    fn on_failure(&mut self, _message: &str) {}
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    StatusChanged(EngineStatus),
    Progress(SearchProgress),
    Evaluation(Evaluation),
    BestMove(BestMove),
    Failure(String),
}

/// Listener that forwards every callback as a `BridgeEvent`.
pub struct ChannelListener {
    tx: Sender<BridgeEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, Receiver<BridgeEvent>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }

    fn forward(&self, event: BridgeEvent) {
        let _ = self.tx.send(event);
    }
}

impl BridgeListener for ChannelListener {
    fn on_status_change(&mut self, status: EngineStatus) {
        self.forward(BridgeEvent::StatusChanged(status));
    }

    fn on_search_progress(&mut self, progress: &SearchProgress) {
        self.forward(BridgeEvent::Progress(progress.clone()));
    }

    fn on_evaluation_update(&mut self, evaluation: &Evaluation) {
        self.forward(BridgeEvent::Evaluation(evaluation.clone()));
    }

    fn on_best_move(&mut self, best_move: &BestMove) {
        self.forward(BridgeEvent::BestMove(best_move.clone()));
    }

    fn on_failure(&mut self, message: &str) {
        self.forward(BridgeEvent::Failure(message.to_owned()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BridgeCommand {
    Submit(String),
    Cancel,
    SetSkillLevel(u8),
    SetAnalysisType(AnalysisType),
    Quit,
}

pub struct EngineBridge {
    config: BridgeConfig,
    status: Arc<Mutex<EngineStatus>>,
    listener: Option<Box<dyn BridgeListener>>,
    commands: Option<Sender<WorkerMessage>>,
    worker: Option<JoinHandle<Box<dyn BridgeListener>>>,
}

impl EngineBridge {
    pub fn new(config: BridgeConfig, listener: Box<dyn BridgeListener>) -> Result<Self, BridgeError> {
        config.validate()?;
        Ok(Self {
            config,
            status: Arc::new(Mutex::new(EngineStatus::Loading)),
            listener: Some(listener),
            commands: None,
            worker: None,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn status(&self) -> EngineStatus {
        *self.status.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// True while a worker is running. Turns false on its own once the
    /// engine process exits.
    pub fn is_initialized(&self) -> bool {
        self.commands.is_some() && self.worker.as_ref().is_some_and(|worker| !worker.is_finished())
    }

    /// Start the configured engine executable and begin the handshake.
    pub fn initialize(&mut self) -> Result<(), BridgeError> {
        let path = self.config.engine_path.clone();
        self.initialize_with(move |sink| {
            ProcessTransport::spawn(&path, sink).map(|transport| Box::new(transport) as Box<dyn EngineTransport>)
        })
    }

    /// Start with a caller-supplied transport. `connect` receives the sink
    /// its engine output must be delivered to.
    pub fn initialize_with<F>(&mut self, connect: F) -> Result<(), BridgeError>
    where
        F: FnOnce(LineSink) -> Result<Box<dyn EngineTransport>, BridgeError>,
    {
        if self.is_initialized() {
            log::debug!("engine bridge already initialized");
            return Ok(());
        }
        if self.commands.is_some() {
            log::debug!("engine worker has stopped; reconnecting");
            self.shutdown();
        }
        let mut listener = self.listener.take().ok_or(BridgeError::Disconnected)?;

        let (tx, rx) = channel();
        let mut transport = match connect(LineSink::new(tx.clone())) {
            Ok(transport) => transport,
            Err(err) => {
                log::error!("engine failed to start: {err}");
                listener.on_failure(&err.to_string());
                self.listener = Some(listener);
                return Err(err);
            }
        };

        if let Err(err) = send_handshake(transport.as_mut(), &self.config) {
            log::error!("engine handshake failed: {err}");
            transport.close();
            listener.on_failure(&err.to_string());
            self.listener = Some(listener);
            return Err(BridgeError::EngineUnavailable(err.to_string()));
        }

        let worker = Worker::new(transport, listener, Arc::clone(&self.status), self.config.clone());
        let handle = thread::Builder::new()
            .name("engine-bridge".to_owned())
            .spawn(move || worker.run(rx))?;

        self.commands = Some(tx);
        self.worker = Some(handle);
        Ok(())
    }

    /// Ask for a best move in `fen`. Ignored while the same position is
    /// being searched; a different position replaces the running search.
    pub fn submit(&self, fen: &str) -> Result<(), BridgeError> {
        self.send(BridgeCommand::Submit(fen.trim().to_owned()))
    }

    /// Stop the running search. Its best move, if one still arrives, is dropped.
    pub fn cancel(&self) -> Result<(), BridgeError> {
        self.send(BridgeCommand::Cancel)
    }

    pub fn set_skill_level(&self, skill_level: u8) -> Result<(), BridgeError> {
        if skill_level > MAX_SKILL_LEVEL {
            return Err(BridgeError::InvalidConfig(format!(
                "skill level {skill_level} is above {MAX_SKILL_LEVEL}"
            )));
        }
        self.send(BridgeCommand::SetSkillLevel(skill_level))
    }

    pub fn set_analysis_type(&self, analysis_type: AnalysisType) -> Result<(), BridgeError> {
        self.send(BridgeCommand::SetAnalysisType(analysis_type))
    }

    /// Send `quit`, close the transport and join the worker. The bridge can
    /// be initialized again afterwards.
    pub fn shutdown(&mut self) {
        let Some(commands) = self.commands.take() else {
            return;
        };
        let _ = commands.send(WorkerMessage::Command(BridgeCommand::Quit));
        if let Some(worker) = self.worker.take() {
            match worker.join() {
                Ok(listener) => self.listener = Some(listener),
                Err(_) => log::error!("engine bridge worker panicked"),
            }
        }
        set_status(&self.status, EngineStatus::Loading);
    }

    fn send(&self, command: BridgeCommand) -> Result<(), BridgeError> {
        let commands = self.commands.as_ref().ok_or(BridgeError::NotInitialized)?;
        commands
            .send(WorkerMessage::Command(command))
            .map_err(|_| BridgeError::Disconnected)
    }
}

impl Drop for EngineBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn send_handshake(transport: &mut dyn EngineTransport, config: &BridgeConfig) -> Result<(), BridgeError> {
    transport.send_line("uci")?;
    for (name, value) in config.engine_options() {
        transport.send_line(&format!("setoption name {name} value {value}"))?;
    }
    transport.send_line("ucinewgame")?;
    transport.send_line("isready")
}

fn set_status(status: &Mutex<EngineStatus>, value: EngineStatus) {
    *status.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
}

#[derive(Debug)]
struct ActiveSearch {
    position: String,
    /// `stop` was sent; the coming best move is stale.
    stopping: bool,
    last_progress: Option<(u32, Instant)>,
}

struct Worker {
    transport: Box<dyn EngineTransport>,
    listener: Box<dyn BridgeListener>,
    status: Arc<Mutex<EngineStatus>>,
    config: BridgeConfig,
    current: EngineStatus,
    search: Option<ActiveSearch>,
    /// Position waiting for the handshake or for a superseded search to end.
    queued: Option<String>,
}

impl Worker {
    fn new(
        transport: Box<dyn EngineTransport>,
        listener: Box<dyn BridgeListener>,
        status: Arc<Mutex<EngineStatus>>,
        config: BridgeConfig,
    ) -> Self {
        Self {
            transport,
            listener,
            status,
            config,
            current: EngineStatus::Loading,
            search: None,
            queued: None,
        }
    }

    fn run(mut self, rx: Receiver<WorkerMessage>) -> Box<dyn BridgeListener> {
        for message in rx {
            let keep_going = match message {
                WorkerMessage::Command(command) => self.handle_command(command),
                WorkerMessage::EngineLine(line) => {
                    self.handle_line(&line);
                    true
                }
                WorkerMessage::EngineExited => {
                    log::error!("engine process exited unexpectedly");
                    self.listener.on_failure("engine process exited");
                    self.search = None;
                    self.transition(EngineStatus::Loading);
                    false
                }
            };
            if !keep_going {
                break;
            }
        }
        self.transport.close();
        self.listener
    }

    /// Returns `false` when the worker should stop.
    fn handle_command(&mut self, command: BridgeCommand) -> bool {
        match command {
            BridgeCommand::Submit(position) => self.submit(position),
            BridgeCommand::Cancel => {
                self.queued = None;
                if let Some(search) = self.search.as_mut() {
                    if !search.stopping {
                        search.stopping = true;
                        self.send("stop");
                    }
                }
            }
            BridgeCommand::SetSkillLevel(level) => {
                self.config.skill_level = level;
                self.send(&format!("setoption name Skill Level value {level}"));
            }
            BridgeCommand::SetAnalysisType(analysis_type) => {
                self.config.analysis_type = analysis_type;
                for (name, value) in analysis_options(&self.config) {
                    self.send(&format!("setoption name {name} value {value}"));
                }
            }
            BridgeCommand::Quit => {
                self.send("quit");
                return false;
            }
        }
        true
    }

    fn submit(&mut self, position: String) {
        match self.search.as_mut() {
            Some(search) if search.position == position && !search.stopping => {
                log::debug!("position already being searched; ignoring submit");
            }
            Some(search) => {
                log::debug!("superseding running search");
                if !search.stopping {
                    search.stopping = true;
                    self.send("stop");
                }
                self.queued = Some(position);
            }
            None if self.current == EngineStatus::Ready => self.start_search(position),
            None => {
                log::debug!("engine not ready; queueing position");
                self.queued = Some(position);
            }
        }
    }

    fn start_search(&mut self, position: String) {
        let depth = self.config.search_depth();
        self.send(&format!("position fen {position}"));
        self.send(&format!("go depth {depth}"));
        self.search = Some(ActiveSearch {
            position,
            stopping: false,
            last_progress: None,
        });
        self.transition(EngineStatus::Running);
    }

    fn handle_line(&mut self, line: &str) {
        let Some(message) = parse_engine_line(line) else {
            log::trace!("dropping engine line: {line}");
            return;
        };

        match message {
            EngineMessage::UciOk => {
                if self.current == EngineStatus::Loading {
                    self.transition(EngineStatus::Loaded);
                }
            }
            EngineMessage::ReadyOk => {
                if matches!(self.current, EngineStatus::Loading | EngineStatus::Loaded) {
                    self.transition(EngineStatus::Ready);
                    self.start_queued();
                }
            }
            EngineMessage::OptionDeclared(name) => log::trace!("engine option: {name}"),
            EngineMessage::Info(info) => self.handle_info(info),
            EngineMessage::BestMove { best, ponder } => {
                let Some(search) = self.search.take() else {
                    log::debug!("best move with no search in flight");
                    return;
                };
                self.transition(EngineStatus::Ready);
                if search.stopping {
                    log::debug!("discarding best move of a stopped search");
                } else {
                    self.listener.on_best_move(&BestMove {
                        position: search.position,
                        best,
                        ponder,
                    });
                }
                self.start_queued();
            }
        }
    }

    fn handle_info(&mut self, info: SearchInfo) {
        let Some(search) = self.search.as_mut() else {
            return;
        };
        if search.stopping {
            return;
        }

        if let Some(depth) = info.depth {
            let now = Instant::now();
            let due = match search.last_progress {
                None => true,
                Some((last_depth, last_time)) => {
                    depth == 1
                        || (depth.saturating_sub(last_depth) >= self.config.progress_depth_step
                            && now.duration_since(last_time)
                                >= Duration::from_millis(self.config.progress_interval_ms))
                }
            };
            if due {
                search.last_progress = Some((depth, now));
                self.listener.on_search_progress(&SearchProgress {
                    position: search.position.clone(),
                    depth,
                    current_move: info.current_move.clone(),
                });
            }
        }

        if let (Some(score), false) = (info.score, info.bound) {
            let score = score.for_white(side_to_move_of(&search.position));
            self.listener.on_evaluation_update(&Evaluation {
                position: search.position.clone(),
                score,
                percent: score.display_percent(self.config.eval_cap_cp),
            });
        }
    }

    fn start_queued(&mut self) {
        if self.current != EngineStatus::Ready {
            return;
        }
        if let Some(position) = self.queued.take() {
            self.start_search(position);
        }
    }

    fn transition(&mut self, next: EngineStatus) {
        if self.current == next {
            return;
        }
        log::debug!("engine status {:?} -> {next:?}", self.current);
        self.current = next;
        set_status(&self.status, next);
        self.listener.on_status_change(next);
    }

    fn send(&mut self, line: &str) {
        if let Err(err) = self.transport.send_line(line) {
            log::error!("failed to send '{line}' to engine: {err}");
            self.listener.on_failure(&err.to_string());
        }
    }
}
