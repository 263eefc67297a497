/// Canonical file locations for the launcher.
///
/// Everything is relative to the working directory, the same place games are
/// discovered in by default:
///   - launcher.toml  Optional configuration, read once at startup.
///
/// `GAME_LAUNCHER_CONFIG` overrides the config location.
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "launcher.toml";
pub const CONFIG_ENV_VAR: &str = "GAME_LAUNCHER_CONFIG";

/// Returns the config file path: `$GAME_LAUNCHER_CONFIG` or ./launcher.toml
pub fn config_file_path() -> PathBuf {
    config_file_path_from(std::env::var_os(CONFIG_ENV_VAR))
}

fn config_file_path_from(override_path: Option<std::ffi::OsString>) -> PathBuf {
    match override_path {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from(CONFIG_FILE_NAME),
    }
}
