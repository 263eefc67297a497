use std::path::PathBuf;

use thiserror::Error;

/// Process exit code for a clean quit, including every signal-driven exit.
pub const EXIT_OK: i32 = 0;
/// Process exit code when no game could be discovered.
pub const EXIT_NO_GAMES: i32 = 1;
/// Process exit code when the terminal cannot be put under our control.
pub const EXIT_TERMINAL: i32 = 2;

/// Fatal at startup: the menu is never shown.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("no games found in {}", directory.display())]
    NoCandidates { directory: PathBuf },
    #[error("failed to read game directory {}: {source}", directory.display())]
    Scan {
        directory: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fatal: interactive input cannot be guaranteed without these.
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("standard input is not a terminal")]
    NotATerminal,
    #[error("failed to read terminal attributes: {0}")]
    Query(#[source] nix::Error),
    #[error("failed to apply terminal attributes: {0}")]
    Apply(#[source] nix::Error),
}

/// Recoverable: reported on the menu, which stays usable.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("failed to launch {}: {source}", path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to wait for {}: {source}", path.display())]
    Wait {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
