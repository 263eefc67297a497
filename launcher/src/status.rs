use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// What the launcher is doing right now.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "lowercase")]
pub enum LauncherState {
    /// The menu owns the terminal.
    Menu,
    /// A game is running and owns the terminal.
    Playing,
}

/// Runtime status written to the configured `status_file`, if any.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LauncherStatus {
    /// Launcher binary version (set from Cargo.toml at compile time).
    pub version: String,
    pub state: LauncherState,
    /// Display name of the game currently running, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_game: Option<String>,
    /// Display name of the most recently finished game, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_game: Option<String>,
    /// Exit status of the most recently finished game, as text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_exit: Option<String>,
    /// RFC 3339 timestamp of when the most recent game was started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played_at: Option<String>,
    /// Most recent recoverable error (e.g. a failed launch).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LauncherStatus {
    /// Constructs the initial status on startup.
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            state: LauncherState::Menu,
            active_game: None,
            last_game: None,
            last_exit: None,
            last_played_at: None,
            error: None,
        }
    }

    /// Records that `game` has just been started.
    pub fn game_started(&mut self, game: &str) {
        self.state = LauncherState::Playing;
        self.active_game = Some(game.to_string());
        self.last_played_at = Some(chrono::Local::now().to_rfc3339());
        self.error = None;
    }

    /// Records that the active game was reaped with `exit`.
    pub fn game_finished(&mut self, exit: &str) {
        self.state = LauncherState::Menu;
        self.last_game = self.active_game.take();
        self.last_exit = Some(exit.to_string());
    }

    /// Records a launch that never produced a running game.
    pub fn launch_failed(&mut self, error: &str) {
        self.state = LauncherState::Menu;
        self.active_game = None;
        self.error = Some(error.to_string());
    }
}

/// Serializes `status` to TOML and writes it to `path`.
/// Creates the parent directory if it does not exist.
/// Failures are logged and never propagate to the caller.
pub fn write_status(path: &Path, status: &LauncherStatus) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            warn!(target: "status", "Failed to create directory {}: {e}", parent.display());
            return;
        }
    }
    match toml::to_string_pretty(status) {
        Ok(content) => {
            if let Err(e) = std::fs::write(path, content) {
                warn!(target: "status", "Failed to write status file: {e}");
            }
        }
        Err(e) => warn!(target: "status", "Failed to serialize status: {e}"),
    }
}
