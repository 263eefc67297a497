use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::registry::DEFAULT_PREFIX;

pub const DEFAULT_GAME_DIR: &str = ".";
pub const DEFAULT_TITLE: &str = "WELCOME TO ATARI CONSOLE";
pub const DEFAULT_STATUS_PAUSE_MS: u64 = 2000;
/// Upper bound for the post-game pause so a typo cannot freeze the menu.
pub const MAX_STATUS_PAUSE_MS: u64 = 10_000;

/// Root configuration structure.  Deserialized from `launcher.toml` in the
/// working directory; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Where the launcher writes its status document.  No file when unset.
    #[serde(default)]
    pub status_file: Option<PathBuf>,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub menu: MenuConfig,
}

/// Where and how games are discovered.
#[derive(Debug, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// File-name prefix that marks an executable as a game.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            prefix: default_prefix(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MenuConfig {
    /// Centered in the banner.
    #[serde(default = "default_title")]
    pub title: String,
    /// How long "Game exited" stays on screen before the menu is redrawn.
    #[serde(default = "default_status_pause")]
    pub status_pause_ms: u64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            status_pause_ms: DEFAULT_STATUS_PAUSE_MS,
        }
    }
}

impl MenuConfig {
    /// Returns the post-game pause, clamped to [`MAX_STATUS_PAUSE_MS`].
    pub fn status_pause(&self) -> Duration {
        Duration::from_millis(self.status_pause_ms.min(MAX_STATUS_PAUSE_MS))
    }
}

/// Loads the config file at `path`, returning `Config::default()` if the file does not exist.
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_directory() -> PathBuf {
    PathBuf::from(DEFAULT_GAME_DIR)
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_status_pause() -> u64 {
    DEFAULT_STATUS_PAUSE_MS
}
