//! SIGINT / SIGTERM routing.
//!
//! The OS-level handlers installed by `tokio::signal` only record that a
//! signal arrived.  Each arrival becomes a [`LauncherEvent::Signal`] on the
//! main event channel, and the main control flow decides what to do with it
//! from the current [`RouterState`]:
//!
//! | Signal  | State          | Route                                   |
//! |---------|----------------|-----------------------------------------|
//! | SIGINT  | ChildRunning   | forward, reap, back to the menu         |
//! | SIGINT  | NoChildRunning | restore terminal, exit 0                |
//! | SIGTERM | ChildRunning   | forward, reap, then exit                |
//! | SIGTERM | NoChildRunning | restore terminal, exit                  |
use std::io;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use nix::sys::signal::Signal;
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::LauncherEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutedSignal {
    Interrupt,
    Terminate,
}

impl RoutedSignal {
    pub fn as_signal(self) -> Signal {
        match self {
            RoutedSignal::Interrupt => Signal::SIGINT,
            RoutedSignal::Terminate => Signal::SIGTERM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    NoChildRunning,
    ChildRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Forward to the child, reap it, return to the menu.
    ForwardAndResume,
    /// Forward to the child, reap it, then shut the launcher down.
    ForwardThenExit,
    /// Restore the terminal and shut the launcher down.
    Exit,
}

/// Pid of the running game, or 0 when none is running.
///
/// A single atomic word so that reads and writes are lock-free and
/// allocation-free from any context.
#[derive(Debug, Default)]
pub struct ActiveChild(AtomicI32);

impl ActiveChild {
    pub fn set(&self, pid: Pid) {
        self.0.store(pid.as_raw(), Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<Pid> {
        match self.0.load(Ordering::SeqCst) {
            0 => None,
            raw => Some(Pid::from_raw(raw)),
        }
    }
}

/// Decides what a signal does in a given state.
pub fn route(signal: RoutedSignal, state: RouterState) -> Route {
    match (signal, state) {
        (RoutedSignal::Interrupt, RouterState::ChildRunning) => Route::ForwardAndResume,
        (RoutedSignal::Terminate, RouterState::ChildRunning) => Route::ForwardThenExit,
        (_, RouterState::NoChildRunning) => Route::Exit,
    }
}

pub struct SignalRouter {
    active: Arc<ActiveChild>,
}

impl SignalRouter {
    pub fn new(active: Arc<ActiveChild>) -> Self {
        Self { active }
    }

    /// Installs SIGINT and SIGTERM listeners that feed `tx`.
    ///
    /// From this point on neither signal terminates the process by default;
    /// every arrival is routed through the event loop.
    pub fn listen(&self, tx: mpsc::Sender<LauncherEvent>) -> io::Result<()> {
        for (kind, routed) in [
            (SignalKind::interrupt(), RoutedSignal::Interrupt),
            (SignalKind::terminate(), RoutedSignal::Terminate),
        ] {
            let mut stream = signal(kind)?;
            let tx = tx.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    debug!(target: "signals", signal = ?routed, "Signal received");
                    if tx.send(LauncherEvent::Signal(routed)).await.is_err() {
                        break;
                    }
                }
            });
        }
        Ok(())
    }

    pub fn state(&self) -> RouterState {
        match self.active.get() {
            Some(_) => RouterState::ChildRunning,
            None => RouterState::NoChildRunning,
        }
    }

    /// Routes `signal` according to the current state.
    pub fn route(&self, signal: RoutedSignal) -> Route {
        route(signal, self.state())
    }
}
