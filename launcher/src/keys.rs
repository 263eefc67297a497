/// Demand-driven keystroke reader.
///
/// Reads happen on a dedicated OS thread, one byte per [`KeyReader::request`].
/// The menu loop issues exactly one request per iteration and never while a
/// game is running, so the launcher does not compete with the child for
/// standard input.  Reads go straight to the file descriptor, bypassing the
/// buffered `Stdin`, so no keystrokes meant for a game are swallowed.
use std::io;
use std::os::fd::AsRawFd;
use std::sync::mpsc as std_mpsc;

use nix::errno::Errno;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::event::LauncherEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `a`
    Left,
    /// `d`
    Right,
    /// `w`
    Up,
    /// `s`
    Down,
    Enter,
    /// `q`
    Quit,
    Other(u8),
}

impl Key {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            b'a' => Key::Left,
            b'd' => Key::Right,
            b'w' => Key::Up,
            b's' => Key::Down,
            b'\n' | b'\r' => Key::Enter,
            b'q' => Key::Quit,
            other => Key::Other(other),
        }
    }
}

pub struct KeyReader {
    request_tx: std_mpsc::Sender<()>,
}

impl KeyReader {
    /// Spawns the reader thread.  Keys are delivered to `tx` as
    /// [`LauncherEvent::Key`].
    pub fn start(tx: mpsc::Sender<LauncherEvent>) -> io::Result<Self> {
        let (request_tx, request_rx) = std_mpsc::channel::<()>();
        std::thread::Builder::new()
            .name("key-reader".into())
            .spawn(move || run(request_rx, tx))?;
        Ok(Self { request_tx })
    }

    /// Asks the reader thread for the next keystroke.
    pub fn request(&self) {
        if self.request_tx.send(()).is_err() {
            warn!(target: "keys", "Key reader thread is gone");
        }
    }
}

fn run(requests: std_mpsc::Receiver<()>, tx: mpsc::Sender<LauncherEvent>) {
    let fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; 1];

    for () in requests {
        let event = loop {
            match nix::unistd::read(fd, &mut buf) {
                Ok(0) => break LauncherEvent::InputClosed,
                Ok(_) => break LauncherEvent::Key(Key::from_byte(buf[0])),
                Err(Errno::EINTR) => continue,
                Err(e) => {
                    warn!(target: "keys", "Failed to read standard input: {e}");
                    break LauncherEvent::InputClosed;
                }
            }
        };
        let closed = matches!(event, LauncherEvent::InputClosed);
        if tx.blocking_send(event).is_err() || closed {
            break;
        }
    }
    debug!(target: "keys", "Key reader thread exited");
}
