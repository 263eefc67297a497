mod config;
mod error;
mod event;
mod keys;
mod menu;
mod paths;
mod registry;
mod signals;
mod status;
mod supervisor;
mod terminal;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{DiscoveryError, TerminalError, EXIT_NO_GAMES, EXIT_OK, EXIT_TERMINAL};
use crate::event::LauncherEvent;
use crate::keys::KeyReader;
use crate::menu::{Menu, MenuAction};
use crate::registry::GameEntry;
use crate::signals::{Route, SignalRouter};
use crate::status::LauncherStatus;
use crate::supervisor::Supervisor;
use crate::terminal::TerminalModes;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // ── Logging ───────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if std::env::args_os().len() > 1 {
        warn!("game-launcher takes no arguments; ignoring them");
    }

    // ── Configuration ─────────────────────────────────────────────────────────
    let config_path = paths::config_file_path();
    let config = config::load_or_default(&config_path).unwrap_or_else(|e| {
        warn!(target: "config", "{e:#} (using defaults)");
        config::Config::default()
    });

    // ── Signal routing ────────────────────────────────────────────────────────
    let (event_tx, event_rx) = mpsc::channel::<LauncherEvent>(16);
    let supervisor = Supervisor::new();
    let router = SignalRouter::new(supervisor.active_child());
    if let Err(e) = router.listen(event_tx.clone()) {
        eprintln!("Failed to install signal handlers: {e}");
        std::process::exit(EXIT_TERMINAL);
    }

    // ── Discovery ─────────────────────────────────────────────────────────────
    let registry = match registry::discover(&config.discovery.directory, &config.discovery.prefix)
    {
        Ok(registry) => registry,
        Err(e) => {
            error!(target: "registry", "{e}");
            match e {
                DiscoveryError::NoCandidates { .. } => println!("No games found! Exiting..."),
                DiscoveryError::Scan { .. } => eprintln!("{e}. Exiting..."),
            }
            std::process::exit(EXIT_NO_GAMES);
        }
    };
    info!(target: "registry", games = registry.len(), "Discovery finished");
    for game in registry.iter() {
        debug!(target: "registry", path = %game.path().display(), name = game.display_name());
    }

    // ── Terminal ──────────────────────────────────────────────────────────────
    let terminal = match TerminalModes::capture() {
        Ok(terminal) => terminal,
        Err(e) => {
            eprintln!("Terminal error: {e}");
            std::process::exit(EXIT_TERMINAL);
        }
    };

    let keys = match KeyReader::start(event_tx) {
        Ok(keys) => keys,
        Err(e) => {
            eprintln!("Failed to start key reader: {e}");
            std::process::exit(EXIT_TERMINAL);
        }
    };

    let mut launcher = Launcher {
        menu: Menu::new(registry, config.menu.title.clone()),
        status_pause: config.menu.status_pause(),
        status_path: config.status_file.clone(),
        status: LauncherStatus::new(),
        terminal,
        supervisor,
        router,
        keys,
        events: event_rx,
    };
    launcher.publish_status();
    launcher.run().await;
}

/// Owns every piece of launcher state.  The terminal belongs to the launcher
/// except between a successful spawn and the matching reap.
struct Launcher {
    terminal: TerminalModes,
    supervisor: Supervisor,
    router: SignalRouter,
    keys: KeyReader,
    menu: Menu,
    events: mpsc::Receiver<LauncherEvent>,
    status: LauncherStatus,
    status_path: Option<PathBuf>,
    status_pause: Duration,
}

impl Launcher {
    /// Menu loop.  Suspends only while waiting for the next event or for a
    /// running game; never returns, every exit goes through [`Self::shutdown`].
    async fn run(&mut self) {
        loop {
            if let Err(e) = self.terminal.enter_interactive() {
                self.fatal(e);
            }
            if let Err(e) = self.menu.render(&mut io::stdout()) {
                warn!(target: "menu", "Failed to draw menu: {e}");
            }

            // Exactly one outstanding key request per iteration.
            self.keys.request();
            let Some(event) = self.events.recv().await else {
                self.shutdown(EXIT_OK);
            };

            match event {
                LauncherEvent::Key(key) => match self.menu.handle_key(key) {
                    MenuAction::Redraw => {
                        debug!(
                            target: "menu",
                            focus = ?self.menu.focus(),
                            selected = self.menu.selected(),
                            "Menu state"
                        );
                    }
                    MenuAction::Quit => self.shutdown(EXIT_OK),
                    MenuAction::Launch(game) => self.play(&game).await,
                },
                LauncherEvent::InputClosed => {
                    info!(target: "keys", "Standard input closed");
                    self.shutdown(EXIT_OK);
                }
                LauncherEvent::Signal(signal) => self.on_menu_signal(signal),
            }
        }
    }

    fn on_menu_signal(&mut self, signal: signals::RoutedSignal) {
        let route = self.router.route(signal);
        debug_assert_eq!(route, Route::Exit);
        info!(target: "signals", ?signal, ?route, "Signal with no game running");
        self.shutdown(EXIT_OK);
    }

    /// Hands the terminal to `game`, supervises it until it is reaped, then
    /// shows a transient message.
    async fn play(&mut self, game: &GameEntry) {
        let mut out = io::stdout();
        let _ = writeln!(out, "\nLaunching game: {}", game.file_name());
        let _ = out.flush();

        if let Err(e) = self.terminal.restore() {
            self.fatal(e);
        }
        self.status.game_started(game.display_name());
        self.publish_status();

        match self
            .supervisor
            .run(game, &mut self.events, &self.router)
            .await
        {
            Ok(outcome) => {
                match &outcome.status {
                    Ok(status) => self.status.game_finished(&status.to_string()),
                    Err(e) => self.status.launch_failed(&e.to_string()),
                }
                self.publish_status();
                if outcome.shutdown_requested {
                    info!(target: "signals", "Game reaped after SIGTERM, shutting down");
                    self.shutdown(EXIT_OK);
                }
                match outcome.status {
                    Ok(_) => {
                        let _ = writeln!(out, "\nGame exited. Returning to main menu...");
                    }
                    Err(e) => {
                        let _ = writeln!(out, "\nError waiting for game: {e}");
                    }
                }
            }
            Err(e) => {
                warn!(target: "supervisor", "{e}");
                self.status.launch_failed(&e.to_string());
                self.publish_status();
                let _ = writeln!(out, "\nError launching game: {e}");
            }
        }
        let _ = out.flush();
        self.pause().await;
    }

    /// Keeps the transient message on screen.  A signal arriving meanwhile
    /// is acted on immediately rather than after the redraw.
    async fn pause(&mut self) {
        tokio::select! {
            _ = tokio::time::sleep(self.status_pause) => {}
            Some(LauncherEvent::Signal(signal)) = self.events.recv() => {
                self.on_menu_signal(signal);
            }
        }
    }

    fn publish_status(&self) {
        if let Some(path) = &self.status_path {
            status::write_status(path, &self.status);
        }
    }

    /// Restores the terminal, clears the screen and exits with `code`.
    fn shutdown(&mut self, code: i32) -> ! {
        if let Err(e) = self.terminal.restore() {
            warn!(target: "terminal", "{e}");
        }
        let _ = terminal::clear_screen(&mut io::stdout());
        self.status = LauncherStatus {
            last_game: self.status.last_game.take(),
            last_exit: self.status.last_exit.take(),
            last_played_at: self.status.last_played_at.take(),
            ..LauncherStatus::new()
        };
        self.publish_status();
        std::process::exit(code);
    }

    /// Terminal attributes could not be applied; the menu cannot run safely.
    fn fatal(&self, e: TerminalError) -> ! {
        let _ = self.terminal.restore();
        eprintln!("Terminal error: {e}");
        std::process::exit(EXIT_TERMINAL);
    }
}
