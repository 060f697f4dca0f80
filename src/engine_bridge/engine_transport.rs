//! Line transport to an engine process.
//!
//! Outbound commands go through `EngineTransport::send_line`. Inbound lines
//! are pushed into the bridge worker's queue through a `LineSink`, so engine
//! output and caller commands are handled in arrival order by one thread.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use crate::engine_bridge::engine_bridge::BridgeCommand;
use crate::errors::BridgeError;

/// Everything the bridge worker consumes, in one queue.
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    Command(BridgeCommand),
    EngineLine(String),
    EngineExited,
}

/// Handle through which a transport delivers engine output.
#[derive(Debug, Clone)]
pub struct LineSink {
    tx: Sender<WorkerMessage>,
}

impl LineSink {
    pub(crate) fn new(tx: Sender<WorkerMessage>) -> Self {
        Self { tx }
    }

    /// Returns `false` once the worker is gone.
    pub fn line(&self, line: impl Into<String>) -> bool {
        self.tx.send(WorkerMessage::EngineLine(line.into())).is_ok()
    }

    pub fn closed(&self) {
        let _ = self.tx.send(WorkerMessage::EngineExited);
    }
}

pub trait EngineTransport: Send {
    fn send_line(&mut self, line: &str) -> Result<(), BridgeError>;

    /// Release the connection. Called once, after `quit` has been sent.
    fn close(&mut self);
}

/// Engine running as a child process speaking over stdin/stdout.
pub struct ProcessTransport {
    child: Child,
    stdin: Option<ChildStdin>,
    reader: Option<thread::JoinHandle<()>>,
}

const EXIT_GRACE: Duration = Duration::from_millis(500);

impl ProcessTransport {
    pub fn spawn(path: &str, sink: LineSink) -> Result<Self, BridgeError> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| BridgeError::EngineUnavailable(format!("{path}: {err}")))?;

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::EngineUnavailable(format!("{path}: no stdout pipe")))?;

        let spawned = thread::Builder::new()
            .name("engine-reader".to_owned())
            .spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    log::trace!("engine> {line}");
                    if !sink.line(line) {
                        return;
                    }
                }
                sink.closed();
            });
        let reader = match spawned {
            Ok(reader) => reader,
            Err(err) => {
                log::error!("cannot start engine reader thread: {err}");
                reap(&mut child);
                return Err(err.into());
            }
        };

        log::debug!("spawned engine process {path} (pid {})", child.id());
        Ok(Self {
            child,
            stdin,
            reader: Some(reader),
        })
    }
}

impl EngineTransport for ProcessTransport {
    fn send_line(&mut self, line: &str) -> Result<(), BridgeError> {
        let stdin = self.stdin.as_mut().ok_or(BridgeError::Disconnected)?;
        log::trace!("engine< {line}");
        writeln!(stdin, "{line}")?;
        stdin.flush()?;
        Ok(())
    }

    fn close(&mut self) {
        drop(self.stdin.take());

        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(10)),
                _ => {
                    log::warn!("engine did not exit after quit; killing it");
                    reap(&mut self.child);
                    break;
                }
            }
        }

        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

/// Kill `child` and collect its exit status.
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::{Command, Stdio};

    use super::reap;

    #[test]
    fn reaped_child_is_gone() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .expect("sleep is available");
        reap(&mut child);
        assert!(matches!(child.try_wait(), Ok(Some(_))));
    }
}
