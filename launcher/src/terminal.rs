//! Terminal line-discipline ownership.
//!
//! The original attributes are captured once at startup, before anything
//! mutates them.  The menu runs with canonical buffering and echo disabled;
//! every exit path (normal quit, fatal error, routed signal) calls
//! [`TerminalModes::restore`] explicitly before the process ends.
use std::io::{self, IsTerminal, Write};
use std::os::fd::AsFd;

use nix::sys::termios::{self, LocalFlags, SetArg, SpecialCharacterIndices, Termios};
use tracing::debug;

use crate::error::TerminalError;

/// Cursor home followed by clear-to-end-of-screen.
pub const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";

pub struct TerminalModes {
    original: Termios,
}

impl TerminalModes {
    /// Reads and stores the current attributes of standard input.
    pub fn capture() -> Result<Self, TerminalError> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(TerminalError::NotATerminal);
        }
        let original = termios::tcgetattr(stdin.as_fd()).map_err(TerminalError::Query)?;
        debug!(target: "terminal", "Captured original terminal attributes");
        Ok(Self { original })
    }

    /// Switches to keystroke-at-a-time input without echo.
    pub fn enter_interactive(&self) -> Result<(), TerminalError> {
        apply(&interactive_attrs(&self.original))
    }

    /// Reapplies the attributes captured at startup.
    pub fn restore(&self) -> Result<(), TerminalError> {
        apply(&self.original)
    }
}

fn apply(attrs: &Termios) -> Result<(), TerminalError> {
    termios::tcsetattr(io::stdin().as_fd(), SetArg::TCSANOW, attrs).map_err(TerminalError::Apply)
}

/// Derives the menu's attributes from `original`: canonical mode and echo off,
/// one byte per read.  Signal generation (`ISIG`) is left alone so Ctrl+C
/// still raises SIGINT.
pub fn interactive_attrs(original: &Termios) -> Termios {
    let mut attrs = original.clone();
    attrs.local_flags.remove(LocalFlags::ICANON | LocalFlags::ECHO);
    attrs.control_chars[SpecialCharacterIndices::VMIN as usize] = 1;
    attrs.control_chars[SpecialCharacterIndices::VTIME as usize] = 0;
    attrs
}

/// Writes [`CLEAR_SCREEN`] and flushes.
pub fn clear_screen(out: &mut impl Write) -> io::Result<()> {
    out.write_all(CLEAR_SCREEN.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cooked() -> Termios {
        // SAFETY: termios is a plain C struct; all-zero is a valid value.
        let raw: nix::libc::termios = unsafe { std::mem::zeroed() };
        let mut attrs = Termios::from(raw);
        attrs.local_flags = LocalFlags::ICANON | LocalFlags::ECHO | LocalFlags::ISIG;
        attrs
    }

    #[test]
    fn interactive_disables_canonical_and_echo() {
        let attrs = interactive_attrs(&cooked());
        assert!(!attrs.local_flags.contains(LocalFlags::ICANON));
        assert!(!attrs.local_flags.contains(LocalFlags::ECHO));
    }

    #[test]
    fn interactive_keeps_signal_generation() {
        let attrs = interactive_attrs(&cooked());
        assert!(attrs.local_flags.contains(LocalFlags::ISIG));
    }

    #[test]
    fn interactive_reads_one_byte_at_a_time() {
        let attrs = interactive_attrs(&cooked());
        assert_eq!(attrs.control_chars[SpecialCharacterIndices::VMIN as usize], 1);
        assert_eq!(attrs.control_chars[SpecialCharacterIndices::VTIME as usize], 0);
    }

    #[test]
    fn interactive_leaves_original_untouched() {
        let original = cooked();
        let _ = interactive_attrs(&original);
        assert!(original.local_flags.contains(LocalFlags::ICANON | LocalFlags::ECHO));
    }

    #[test]
    fn clear_screen_writes_home_and_clear() {
        let mut out = Vec::new();
        clear_screen(&mut out).unwrap();
        assert_eq!(out, b"\x1b[H\x1b[J");
    }
}
