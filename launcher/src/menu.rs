use std::io::{self, Write};

use crate::keys::Key;
use crate::registry::{GameEntry, Registry};
use crate::terminal::CLEAR_SCREEN;

const BANNER_WIDTH: usize = 49;

/// Which of the three horizontal menu items has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Play,
    GameSelect,
    Exit,
}

impl Focus {
    const ORDER: [Focus; 3] = [Focus::Play, Focus::GameSelect, Focus::Exit];

    fn index(self) -> usize {
        match self {
            Focus::Play => 0,
            Focus::GameSelect => 1,
            Focus::Exit => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// What the event loop should do after a keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Only the menu state changed (or nothing did); redraw and read again.
    Redraw,
    Launch(GameEntry),
    Quit,
}

/// Focus and selection state plus the registry it indexes into.
pub struct Menu {
    registry: Registry,
    focus: Focus,
    selected: usize,
    title: String,
}

impl Menu {
    pub fn new(registry: Registry, title: impl Into<String>) -> Self {
        Self {
            registry,
            focus: Focus::Play,
            selected: 0,
            title: title.into(),
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_game(&self) -> Option<&GameEntry> {
        self.registry.get(self.selected)
    }

    pub fn handle_key(&mut self, key: Key) -> MenuAction {
        let count = self.registry.len();
        match key {
            Key::Quit => return MenuAction::Quit,
            Key::Left => self.focus = self.focus.prev(),
            Key::Right => self.focus = self.focus.next(),
            Key::Up if self.focus == Focus::GameSelect => {
                self.selected = (self.selected + count - 1) % count;
            }
            Key::Down if self.focus == Focus::GameSelect => {
                self.selected = (self.selected + 1) % count;
            }
            Key::Enter => match self.focus {
                Focus::Play => {
                    if let Some(game) = self.selected_game() {
                        return MenuAction::Launch(game.clone());
                    }
                }
                Focus::Exit => return MenuAction::Quit,
                Focus::GameSelect => {}
            },
            _ => {}
        }
        MenuAction::Redraw
    }

    /// Clears the screen and draws the banner and the three menu items.
    pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
        let rule = "#".repeat(BANNER_WIDTH + 2);
        let game = self.selected_game().map(GameEntry::display_name).unwrap_or("");

        out.write_all(CLEAR_SCREEN.as_bytes())?;
        writeln!(out, "{rule}")?;
        writeln!(out, "#{:^width$}#", self.title, width = BANNER_WIDTH)?;
        writeln!(out, "#{:width$}#", "", width = BANNER_WIDTH)?;
        for help in [
            "Use 'a' and 'd' to navigate",
            "Use 'w' and 's' to switch game at games",
            "Press 'enter' to play at play",
            "Press 'q' to exit",
        ] {
            writeln!(out, "#   {help:<width$}#", width = BANNER_WIDTH - 3)?;
        }
        writeln!(out, "{rule}")?;
        writeln!(out)?;

        match self.focus {
            Focus::Play => write!(out, "-> [(Play)] <-       ")?,
            _ => write!(out, "    Play           ")?,
        }
        match self.focus {
            Focus::GameSelect => write!(out, "-> [( {game} )] <-")?,
            _ => write!(out, "    {game}     ")?,
        }
        match self.focus {
            Focus::Exit => writeln!(out, "       -> [(Exit)] <-")?,
            _ => writeln!(out, "           Exit")?,
        }
        out.flush()
    }
}
