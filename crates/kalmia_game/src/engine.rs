//! Client for one engine subprocess.
//!
//! [`EngineProcess`] launches the engine, writes commands to its stdin and
//! runs a reader thread that parses stdout line by line. Parsed lines update
//! the [`EngineSession`] and are fanned out as [`EngineEvent`]s in the order
//! the engine wrote them. Exactly one [`EngineEvent::Terminated`] is
//! published per process, classified by how the process ended.

use parking_lot::{Condvar, Mutex};
use reversi_core::{Move, Position};
use std::fmt::Display;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command as ProcessCommand, Stdio};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::{EventHub, SubscriptionId};
use crate::protocol::{parse_line, Command, EngineMessage, GameOverKind, ScoreScale, SearchInfo};
use crate::session::{EngineSession, EngineState, TerminationKind};

/// How often the reader thread checks whether a process with closed stdout has exited.
const REAP_INTERVAL: Duration = Duration::from_millis(10);

/// Events raised by an engine, in the order its output produced them.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// `bestmove`; None when the token was not a move
    BestMove(Option<Move>),
    /// `info`, with the score scale in force when the line arrived
    Info { info: SearchInfo, scale: ScoreScale },
    Terminated(TerminationKind),
}

struct Shared {
    session: Mutex<EngineSession>,
    changed: Condvar,
    events: EventHub<EngineEvent>,
}

impl Shared {
    fn dispatch_line(&self, line: &str) {
        debug!(line, "engine -> gui");
        let Some(message) = parse_line(line) else {
            return;
        };

        let event = {
            let mut session = self.session.lock();
            if session.apply(&message) {
                self.changed.notify_all();
            }
            match message {
                EngineMessage::BestMove(mv) => Some(EngineEvent::BestMove(mv)),
                EngineMessage::Info(info) => Some(EngineEvent::Info {
                    info,
                    scale: session.score_scale(),
                }),
                _ => None,
            }
        };

        if let Some(event) = event {
            self.events.publish(&event);
        }
    }

    fn on_exit(&self) {
        let kind = {
            let mut session = self.session.lock();
            let kind = session.mark_exited();
            self.changed.notify_all();
            kind
        };
        match kind {
            TerminationKind::Unexpected => warn!("engine process terminated unexpectedly"),
            _ => info!(?kind, "engine process terminated"),
        }
        self.events.publish(&EngineEvent::Terminated(kind));
    }

    /// Block until `done` holds, the process exits or the timeout elapses.
    /// Returns whether `done` held.
    fn wait_for(&self, timeout: Option<Duration>, done: impl Fn(&EngineSession) -> bool) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut session = self.session.lock();
        loop {
            if done(&*session) {
                return true;
            }
            if session.has_exited() {
                return false;
            }
            match deadline {
                Some(deadline) => {
                    if self.changed.wait_until(&mut session, deadline).timed_out() {
                        return done(&*session);
                    }
                }
                None => self.changed.wait(&mut session),
            }
        }
    }
}

fn read_loop(shared: Arc<Shared>, stdout: ChildStdout, child: Arc<Mutex<Option<Child>>>) {
    let mut reader = BufReader::new(stdout);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                shared.dispatch_line(line.trim_end());
            }
            Err(e) => {
                warn!(error = %e, "failed to read engine output");
                break;
            }
        }
    }
    reap(&child);
    shared.on_exit();
}

/// Wait for the child to exit without holding its lock, so `kill` stays possible.
fn reap(child: &Mutex<Option<Child>>) {
    loop {
        let mut guard = child.lock();
        let Some(process) = guard.as_mut() else {
            return;
        };
        match process.try_wait() {
            Ok(Some(status)) => {
                debug!(%status, "engine process reaped");
                return;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "failed to query engine process status");
                return;
            }
        }
        drop(guard);
        thread::sleep(REAP_INTERVAL);
    }
}

/// One engine subprocess and its protocol session.
pub struct EngineProcess {
    config: EngineConfig,
    shared: Arc<Shared>,
    child: Arc<Mutex<Option<Child>>>,
    stdin: Mutex<Option<ChildStdin>>,
}

impl EngineProcess {
    /// Create a client. Nothing is launched until [`EngineProcess::run`].
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared {
                session: Mutex::new(EngineSession::default()),
                changed: Condvar::new(),
                events: EventHub::new(),
            }),
            child: Arc::new(Mutex::new(None)),
            stdin: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Launch the process and complete the `usi`/`isready` handshake.
    ///
    /// Blocks until the engine acknowledges both, or fails if it cannot be
    /// launched or exits first.
    pub fn run(&self) -> Result<(), EngineError> {
        if self.child.lock().is_some() {
            return Ok(());
        }
        self.start_process()?;

        self.send(Command::Usi)?;
        if !self.shared.wait_for(None, |s| {
            s.state().is_some_and(|st| st >= EngineState::UsiOk)
        }) {
            return Err(EngineError::ExitedDuringHandshake { expected: "usiok" });
        }

        self.send(Command::IsReady)?;
        if !self.shared.wait_for(None, |s| {
            s.state().is_some_and(|st| st >= EngineState::Ready)
        }) {
            return Err(EngineError::ExitedDuringHandshake { expected: "readyok" });
        }

        let session = self.session();
        info!(
            name = session.name().unwrap_or("?"),
            author = session.author().unwrap_or("?"),
            "engine ready"
        );
        Ok(())
    }

    fn start_process(&self) -> Result<(), EngineError> {
        // relative program paths are ambiguous once current_dir is set
        let program =
            std::fs::canonicalize(&self.config.path).unwrap_or_else(|_| self.config.path.clone());

        let mut command = ProcessCommand::new(&program);
        command
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        if let Some(dir) = self.config.resolved_work_dir() {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| EngineError::Launch {
            path: self.config.path.clone(),
            source,
        })?;
        info!(path = %program.display(), pid = child.id(), "engine process started");

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            child.kill().ok();
            return Err(EngineError::NotRunning);
        };

        self.shared.session.lock().advance(EngineState::StartUp);
        *self.stdin.lock() = Some(stdin);
        *self.child.lock() = Some(child);

        let shared = Arc::clone(&self.shared);
        let child = Arc::clone(&self.child);
        let spawned = thread::Builder::new()
            .name("engine-reader".to_string())
            .spawn(move || read_loop(shared, stdout, child));
        if let Err(e) = spawned {
            self.kill();
            return Err(e.into());
        }
        Ok(())
    }

    fn send(&self, command: Command) -> Result<(), EngineError> {
        let mut stdin = self.stdin.lock();
        let stdin = stdin.as_mut().ok_or(EngineError::NotRunning)?;
        debug!(%command, "gui -> engine");
        writeln!(stdin, "{command}")?;
        stdin.flush()?;
        Ok(())
    }

    pub fn set_option(&self, name: &str, value: impl Display) -> Result<(), EngineError> {
        self.send(Command::set_option(name, value))
    }

    pub fn set_position(&self, pos: &Position) -> Result<(), EngineError> {
        self.send(Command::position(pos))
    }

    /// Announce a new game; the session enters `Playing`.
    pub fn new_game(&self) -> Result<(), EngineError> {
        self.send(Command::UsiNewGame)?;
        self.shared.session.lock().advance(EngineState::Playing);
        Ok(())
    }

    /// Report the game result; the session enters `GameOver`.
    pub fn game_over(&self, kind: GameOverKind) -> Result<(), EngineError> {
        self.send(Command::GameOver(kind))?;
        self.shared.session.lock().advance(EngineState::GameOver);
        Ok(())
    }

    /// Request score scale metadata, then start a search that ends with `bestmove`.
    pub fn go(&self) -> Result<(), EngineError> {
        self.send(Command::ScoreScaleAndType)?;
        self.send(Command::Go)
    }

    /// Request score scale metadata, then start a speculative search that runs until `stop`.
    pub fn go_ponder(&self) -> Result<(), EngineError> {
        self.send(Command::ScoreScaleAndType)?;
        self.send(Command::GoPonder)
    }

    pub fn stop_go(&self) -> Result<(), EngineError> {
        self.send(Command::Stop)
    }

    /// Ask the engine to quit and wait for it to exit, killing it on timeout.
    ///
    /// Returns true if the engine exited on its own. Calling this on a process
    /// that has already exited (or never started) does nothing.
    pub fn quit(&self) -> bool {
        {
            let mut session = self.shared.session.lock();
            if !session.is_launched() || session.has_exited() {
                return session.has_quit_successfully();
            }
            session.advance(EngineState::WaitForQuit);
        }

        if let Err(e) = self.send(Command::Quit) {
            warn!(error = %e, "failed to send quit to engine");
        }

        let timeout = self.config.quit_timeout();
        if self.shared.wait_for(Some(timeout), |s| s.has_exited()) {
            return self.session().has_quit_successfully();
        }

        warn!(?timeout, "engine did not exit in time, killing it");
        self.kill();
        false
    }

    /// Forcibly terminate the process. Does nothing if it has already exited.
    pub fn kill(&self) {
        {
            let mut session = self.shared.session.lock();
            if !session.is_launched() || session.has_exited() {
                return;
            }
            session.kill_requested = true;
        }

        if let Some(process) = self.child.lock().as_mut() {
            match process.kill() {
                Ok(()) => info!("engine process killed"),
                Err(e) => debug!(error = %e, "engine process was already gone"),
            }
        }
        self.shared.session.lock().mark_killed();
    }

    /// Snapshot of the session.
    pub fn session(&self) -> EngineSession {
        self.shared.session.lock().clone()
    }

    pub fn state(&self) -> Option<EngineState> {
        self.shared.session.lock().state()
    }

    pub fn has_exited(&self) -> bool {
        self.shared.session.lock().has_exited()
    }

    /// Block until the process has exited or the timeout elapses.
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        self.shared.wait_for(Some(timeout), |s| s.has_exited())
    }

    /// Receive all future events on a channel.
    pub fn events(&self) -> Receiver<EngineEvent> {
        self.shared.events.subscribe()
    }

    /// Register a callback run on the reader thread for each event.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(&EngineEvent) -> bool + Send + 'static,
    {
        self.shared.events.subscribe_fn(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.events.unsubscribe(id)
    }

    /// Process a line as if the engine had written it.
    #[cfg(test)]
    pub(crate) fn feed_line(&self, line: &str) {
        self.shared.dispatch_line(line);
    }

    /// Process an exit as if the engine had terminated.
    #[cfg(test)]
    pub(crate) fn feed_exit(&self) {
        self.shared.on_exit();
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
