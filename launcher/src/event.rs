use crate::keys::Key;
use crate::signals::RoutedSignal;

pub enum LauncherEvent {
    /// A keystroke requested by the menu loop arrived.
    Key(Key),
    /// Standard input reached end-of-file or failed; no more keys will come.
    InputClosed,
    /// SIGINT or SIGTERM was delivered to the launcher.
    Signal(RoutedSignal),
}
