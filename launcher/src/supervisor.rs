/// Runs a selected game as a supervised child process.
///
/// At most one child exists at a time.  Its pid is published through
/// [`ActiveChild`] immediately after a successful spawn and cleared only once
/// the child has been reaped; the [`SignalRouter`] reads it to pick a route.
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use nix::sys::signal::{self, kill, SigHandler, Signal};
use nix::unistd::Pid;
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::SpawnError;
use crate::event::LauncherEvent;
use crate::registry::GameEntry;
use crate::signals::{ActiveChild, Route, SignalRouter};

/// Handle to a spawned game.
pub struct GameProcess {
    child: Child,
    pid: Pid,
    path: PathBuf,
}

impl GameProcess {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Delivers `signal` to the game.  A game that has already exited but is
    /// not yet reaped still accepts signals, so this never hits a reused pid.
    pub fn signal(&self, sig: Signal) -> nix::Result<()> {
        kill(self.pid, sig)
    }

    /// Blocks until the game terminates and reaps it.
    pub async fn wait(&mut self) -> Result<ExitStatus, SpawnError> {
        self.child.wait().await.map_err(|source| SpawnError::Wait {
            path: self.path.clone(),
            source,
        })
    }
}

/// How a supervised run ended.
#[derive(Debug)]
pub struct ChildOutcome {
    /// Exit status of the reaped game, or why it could not be waited on.
    /// Informational only; it does not affect control flow.
    pub status: Result<ExitStatus, SpawnError>,
    /// SIGTERM was forwarded during the run, so the launcher must exit now.
    pub shutdown_requested: bool,
}

pub struct Supervisor {
    active: Arc<ActiveChild>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self {
            active: Arc::default(),
        }
    }

    /// Shared handle the [`SignalRouter`] reads.
    pub fn active_child(&self) -> Arc<ActiveChild> {
        Arc::clone(&self.active)
    }

    /// Starts `entry` with no arguments, inheriting the launcher's standard
    /// streams, and marks it as the active child.
    ///
    /// On failure nothing is left running and the active child stays unset.
    pub fn spawn(&self, entry: &GameEntry) -> Result<GameProcess, SpawnError> {
        let path = entry.path().to_path_buf();
        let mut command = Command::new(&path);
        command
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        // SAFETY: only async-signal-safe sigaction(2) calls run between fork
        // and exec.  Games must see the default SIGINT/SIGTERM dispositions
        // even if the launcher itself was started with them ignored.
        unsafe {
            command.pre_exec(|| {
                for sig in [Signal::SIGINT, Signal::SIGTERM] {
                    signal::signal(sig, SigHandler::SigDfl)?;
                }
                Ok(())
            });
        }
        let child = command
            .spawn()
            .map_err(|source| SpawnError::Launch {
                path: path.clone(),
                source,
            })?;

        // `id()` is only `None` once the child has been reaped, which cannot
        // have happened yet.
        let raw = child.id().unwrap_or_default();
        let pid = Pid::from_raw(raw as i32);
        self.active.set(pid);
        info!(target: "supervisor", pid = raw, path = %path.display(), "Game started");

        Ok(GameProcess { child, pid, path })
    }

    /// Spawns `entry` and blocks until it terminates, routing any signal that
    /// arrives on `events` in the meantime.
    ///
    /// Only a failed launch is an `Err`; once the game is running every
    /// outcome, including a failed wait, is reported through [`ChildOutcome`].
    pub async fn run(
        &self,
        entry: &GameEntry,
        events: &mut mpsc::Receiver<LauncherEvent>,
        router: &SignalRouter,
    ) -> Result<ChildOutcome, SpawnError> {
        let process = self.spawn(entry)?;
        Ok(self.supervise(process, events, router).await)
    }

    /// Waits for `process`, forwarding SIGINT and SIGTERM to it.
    ///
    /// The wait after forwarding is unconditional (no timeout).  Queued
    /// signals are routed before a finished child is reaped, so a SIGTERM is
    /// never lost to a game that happened to exit at the same moment.
    /// Keystroke events cannot arrive here because the menu never has a key
    /// request outstanding while a game runs.
    pub async fn supervise(
        &self,
        mut process: GameProcess,
        events: &mut mpsc::Receiver<LauncherEvent>,
        router: &SignalRouter,
    ) -> ChildOutcome {
        let pid = process.pid();
        let mut shutdown_requested = false;

        let status = loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => {
                    let LauncherEvent::Signal(signal) = event else {
                        continue;
                    };
                    let route = router.route(signal);
                    debug!(target: "supervisor", ?signal, ?route, "Routing signal");
                    match route {
                        Route::ForwardAndResume => {}
                        Route::ForwardThenExit => shutdown_requested = true,
                        // The child is still unreaped, so the router cannot
                        // report NoChildRunning here.
                        Route::Exit => continue,
                    }
                    if let Err(e) = process.signal(signal.as_signal()) {
                        warn!(target: "supervisor", pid = pid.as_raw(), "Failed to forward {signal:?}: {e}");
                    }
                }
                status = process.wait() => break status,
            }
        };

        self.active.clear();
        match &status {
            Ok(status) => info!(target: "supervisor", pid = pid.as_raw(), %status, "Game exited"),
            Err(e) => warn!(target: "supervisor", pid = pid.as_raw(), "{e}"),
        }
        ChildOutcome {
            status,
            shutdown_requested,
        }
    }
}
