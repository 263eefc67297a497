//! Discovery of launchable games.
//!
//! A game is any executable regular file in the scanned directory whose name
//! starts with the configured prefix (`game_` by default).  Entries keep the
//! order the filesystem enumerates them in; no sort is applied, so the menu
//! order may differ between platforms.
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};
use tracing::{debug, warn};

use crate::error::DiscoveryError;

pub const DEFAULT_PREFIX: &str = "game_";

/// A single launchable game.  Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntry {
    path: PathBuf,
    display_name: String,
}

impl GameEntry {
    /// Builds an entry for `file_name` inside `directory`.
    /// Returns `None` when the name lacks `prefix` or nothing follows it.
    pub fn new(directory: &Path, file_name: &str, prefix: &str) -> Option<Self> {
        Some(Self {
            display_name: display_name(file_name, prefix)?,
            path: directory.join(file_name),
        })
    }

    /// Path handed to the supervisor.  Always directory-qualified so that a
    /// `PATH` lookup can never substitute another program.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Bare executable name, e.g. `game_snake`.
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Strips `prefix` from `file_name` and upper-cases the first character of
/// what remains.  `None` when the prefix is missing or the remainder is empty.
pub fn display_name(file_name: &str, prefix: &str) -> Option<String> {
    let rest = file_name.strip_prefix(prefix)?;
    let mut chars = rest.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Ordered, non-empty list of discovered games.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<GameEntry>,
}

impl Registry {
    /// Wraps `entries`, rejecting an empty list.
    pub fn from_entries(
        directory: &Path,
        entries: Vec<GameEntry>,
    ) -> Result<Self, DiscoveryError> {
        let registry = Self { entries };
        if registry.is_empty() {
            return Err(DiscoveryError::NoCandidates {
                directory: directory.to_path_buf(),
            });
        }
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true for a registry returned by [`Registry::from_entries`].
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&GameEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEntry> {
        self.entries.iter()
    }
}

/// Scans `directory` for executables named `<prefix><name>`.
///
/// Zero matches is reported as [`DiscoveryError::NoCandidates`] rather than as
/// an empty registry so that callers can print a dedicated diagnostic.
pub fn discover(directory: &Path, prefix: &str) -> Result<Registry, DiscoveryError> {
    let listing = std::fs::read_dir(directory).map_err(|source| DiscoveryError::Scan {
        directory: directory.to_path_buf(),
        source,
    })?;

    let mut entries = Vec::new();
    for item in listing {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                warn!(target: "registry", "Skipping unreadable directory entry: {e}");
                continue;
            }
        };

        let os_name = item.file_name();
        let Some(name) = os_name.to_str() else {
            debug!(target: "registry", "Skipping non UTF-8 name {:?}", os_name);
            continue;
        };
        if !name.starts_with(prefix) {
            continue;
        }

        let path = directory.join(name);
        if !is_executable_file(&path) {
            debug!(target: "registry", path = %path.display(), "Not an executable file");
            continue;
        }

        match GameEntry::new(directory, name, prefix) {
            Some(entry) => {
                debug!(target: "registry", name = entry.display_name(), "Discovered game");
                entries.push(entry);
            }
            None => warn!(target: "registry", "Ignoring '{name}': nothing follows the prefix"),
        }
    }

    Registry::from_entries(directory, entries)
}

fn is_executable_file(path: &Path) -> bool {
    path.is_file() && access(path, AccessFlags::X_OK).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn touch(dir: &Path, name: &str, mode: u32) {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
    }

    fn pair(file_name: &str, display: &str) -> (String, String) {
        (file_name.to_string(), display.to_string())
    }

    fn sorted_names(registry: &Registry) -> Vec<(String, String)> {
        let mut names: Vec<_> = registry
            .iter()
            .map(|e| (e.file_name().to_string(), e.display_name().to_string()))
            .collect();
        names.sort();
        names
    }

    // ── display_name ──────────────────────────────────────────────────────────

    #[test]
    fn display_name_strips_prefix_and_capitalises() {
        assert_eq!(display_name("game_snake", "game_").as_deref(), Some("Snake"));
        assert_eq!(display_name("game_xox2P", "game_").as_deref(), Some("Xox2P"));
        assert_eq!(display_name("game_cross", "game_").as_deref(), Some("Cross"));
    }

    #[test]
    fn display_name_single_character() {
        assert_eq!(display_name("game_x", "game_").as_deref(), Some("X"));
    }

    #[test]
    fn display_name_keeps_rest_untouched() {
        assert_eq!(display_name("game_tIC_tac", "game_").as_deref(), Some("TIC_tac"));
        assert_eq!(display_name("game_2048", "game_").as_deref(), Some("2048"));
    }

    #[test]
    fn display_name_empty_after_prefix_is_rejected() {
        assert_eq!(display_name("game_", "game_"), None);
    }

    #[test]
    fn display_name_requires_prefix() {
        assert_eq!(display_name("snake", "game_"), None);
        assert_eq!(display_name("Game_snake", "game_"), None);
    }

    // ── GameEntry ─────────────────────────────────────────────────────────────

    #[test]
    fn entry_path_is_directory_qualified() {
        let entry = GameEntry::new(Path::new("."), "game_snake", "game_").unwrap();
        assert_eq!(entry.path(), Path::new("./game_snake"));
        assert_eq!(entry.file_name(), "game_snake");
        assert_eq!(entry.display_name(), "Snake");
    }

    // ── discover ──────────────────────────────────────────────────────────────

    #[test]
    fn discover_finds_every_executable_candidate() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "game_snake", 0o755);
        touch(dir.path(), "game_xox2P", 0o755);
        touch(dir.path(), "game_cross", 0o700);

        let registry = discover(dir.path(), DEFAULT_PREFIX).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(
            sorted_names(&registry),
            vec![
                pair("game_cross", "Cross"),
                pair("game_snake", "Snake"),
                pair("game_xox2P", "Xox2P"),
            ]
        );
    }

    #[test]
    fn discover_skips_non_executables() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "game_snake", 0o755);
        touch(dir.path(), "game_readme", 0o644);

        let registry = discover(dir.path(), DEFAULT_PREFIX).unwrap();
        assert_eq!(sorted_names(&registry), vec![pair("game_snake", "Snake")]);
    }

    #[test]
    fn discover_skips_names_without_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "game_snake", 0o755);
        touch(dir.path(), "launcher", 0o755);
        touch(dir.path(), "snake_game", 0o755);

        let registry = discover(dir.path(), DEFAULT_PREFIX).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn discover_skips_bare_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "game_", 0o755);
        touch(dir.path(), "game_snake", 0o755);

        let registry = discover(dir.path(), DEFAULT_PREFIX).unwrap();
        assert_eq!(sorted_names(&registry), vec![pair("game_snake", "Snake")]);
    }

    #[test]
    fn discover_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("game_levels")).unwrap();
        touch(dir.path(), "game_snake", 0o755);

        let registry = discover(dir.path(), DEFAULT_PREFIX).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn discover_honours_custom_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "arcade-pong", 0o755);
        touch(dir.path(), "game_snake", 0o755);

        let registry = discover(dir.path(), "arcade-").unwrap();
        assert_eq!(sorted_names(&registry), vec![pair("arcade-pong", "Pong")]);
    }

    #[test]
    fn discover_empty_directory_reports_no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let err = discover(dir.path(), DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoCandidates { .. }));
    }

    #[test]
    fn discover_only_non_executables_reports_no_candidates() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "game_snake", 0o644);
        let err = discover(dir.path(), DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoCandidates { .. }));
    }

    #[test]
    fn discover_missing_directory_is_a_scan_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = discover(&missing, DEFAULT_PREFIX).unwrap_err();
        assert!(matches!(err, DiscoveryError::Scan { .. }));
    }

    // ── Registry ──────────────────────────────────────────────────────────────

    #[test]
    fn registry_preserves_insertion_order() {
        let dir = Path::new(".");
        let entries = vec![
            GameEntry::new(dir, "game_snake", "game_").unwrap(),
            GameEntry::new(dir, "game_xox2P", "game_").unwrap(),
        ];
        let registry = Registry::from_entries(dir, entries).unwrap();
        assert_eq!(registry.get(0).unwrap().display_name(), "Snake");
        assert_eq!(registry.get(1).unwrap().display_name(), "Xox2P");
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn registry_rejects_empty_entry_list() {
        let err = Registry::from_entries(Path::new("."), Vec::new()).unwrap_err();
        assert!(matches!(err, DiscoveryError::NoCandidates { .. }));
    }

    #[test]
    fn registry_len_counts_entries() {
        let dir = Path::new(".");
        let entries = vec![GameEntry::new(dir, "game_snake", "game_").unwrap()];
        let registry = Registry::from_entries(dir, entries).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }
}
