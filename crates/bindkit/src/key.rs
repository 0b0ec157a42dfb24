//! # Terminal keys
//!
//! ## Overview
//!
//! Converts key events read from a terminal with [crossterm] into the [KeySymbol] values that
//! bindings are declared with, and adapts a stream of terminal events into a
//! [KeyInputSource](crate::input::KeyInputSource).
use futures::future;
use futures::stream::{Stream, StreamExt};
use tracing::warn;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keybindings::{KeySymbol, Modifiers};

/// A key pressed in a terminal.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TerminalKey {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl TerminalKey {
    /// Create a new key from a key code and the modifiers held with it.
    pub fn new(code: KeyCode, mut modifiers: KeyModifiers) -> Self {
        if let KeyCode::BackTab = code {
            modifiers |= KeyModifiers::SHIFT;
        }

        Self { code, modifiers }
    }

    /// The name this key has in a binding, if it can be bound.
    pub fn symbol(&self) -> Option<KeySymbol> {
        let name = match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Left => "left".into(),
            KeyCode::Right => "right".into(),
            KeyCode::Up => "up".into(),
            KeyCode::Down => "down".into(),
            KeyCode::Home => "home".into(),
            KeyCode::End => "end".into(),
            KeyCode::PageUp => "pageup".into(),
            KeyCode::PageDown => "pagedown".into(),
            KeyCode::Backspace => "backspace".into(),
            KeyCode::Enter => "enter".into(),
            KeyCode::Esc => "escape".into(),
            KeyCode::Delete => "delete".into(),
            KeyCode::Insert => "insert".into(),
            KeyCode::Tab | KeyCode::BackTab => "tab".into(),
            KeyCode::F(n) => format!("f{n}"),
            _ => return None,
        };

        KeySymbol::new(self.key_modifiers(), &name).ok()
    }

    fn key_modifiers(&self) -> Modifiers {
        let mut mods = Modifiers::empty();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            mods |= Modifiers::CTRL;
        }

        if self.modifiers.contains(KeyModifiers::ALT) {
            mods |= Modifiers::ALT;
        }

        if self.modifiers.contains(KeyModifiers::SHIFT) {
            mods |= Modifiers::SHIFT;
        }

        if self.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META) {
            mods |= Modifiers::META;
        }

        mods
    }
}

impl From<KeyEvent> for TerminalKey {
    fn from(ke: KeyEvent) -> Self {
        TerminalKey::new(ke.code, ke.modifiers)
    }
}

impl From<KeyCode> for TerminalKey {
    fn from(code: KeyCode) -> Self {
        TerminalKey::new(code, KeyModifiers::NONE)
    }
}

/// Turn a stream of terminal events into a stream of pressed keys.
///
/// Key releases, keys that can't be bound, and non-key events are skipped. Read errors are
/// logged and skipped.
pub fn key_events<S>(events: S) -> impl Stream<Item = KeySymbol> + Unpin
where
    S: Stream<Item = std::io::Result<Event>> + Unpin,
{
    events.filter_map(|event| {
        let key = match event {
            Ok(Event::Key(ke)) if ke.kind != KeyEventKind::Release => {
                TerminalKey::from(ke).symbol()
            },
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "failed to read terminal event");
                None
            },
        };

        future::ready(key)
    })
}
