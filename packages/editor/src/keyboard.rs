//! Keyboard layer.
//!
//! Chords are matched on the key alone, independent of toolbar state. Chord
//! strings such as `Ctrl+Shift+Z` or `Cmd+b` parse into a [`KeyEvent`].

use crate::commands::{execute, Command, Prompt};
use crate::editor::Editor;
use lectern_model::Mark;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    ArrowLeft,
    ArrowRight,
    Escape,
    Tab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Cmd on macOS.
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, meta: false, shift: false, alt: false };

    /// Ctrl or Cmd.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers { ctrl: true, ..Modifiers::NONE })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("empty key chord")]
    Empty,
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("unknown modifier `{0}`")]
    UnknownModifier(String),
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }
        // A trailing "+" is the plus key itself
        let (mods, key) = match s.strip_suffix("++") {
            Some(rest) => (rest, "+"),
            None => match s.rsplit_once('+') {
                Some((mods, key)) if !key.is_empty() => (mods, key),
                _ if s == "+" => ("", "+"),
                _ => ("", s),
            },
        };

        let mut modifiers = Modifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "cmd" | "meta" | "super" => modifiers.meta = true,
                "shift" => modifiers.shift = true,
                "alt" | "option" => modifiers.alt = true,
                _ => return Err(KeyParseError::UnknownModifier(part.to_string())),
            }
        }

        let key = match key.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            "space" => Key::Char(' '),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return Err(KeyParseError::UnknownKey(key.to_string())),
                }
            }
        };
        Ok(KeyEvent { key, modifiers })
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.modifiers;
        for (on, name) in [(m.ctrl, "Ctrl"), (m.meta, "Cmd"), (m.alt, "Alt"), (m.shift, "Shift")] {
            if on {
                write!(f, "{name}+")?;
            }
        }
        match self.key {
            Key::Char(' ') => f.write_str("Space"),
            Key::Char(c) => write!(f, "{c}"),
            Key::Enter => f.write_str("Enter"),
            Key::Backspace => f.write_str("Backspace"),
            Key::Delete => f.write_str("Delete"),
            Key::ArrowLeft => f.write_str("Left"),
            Key::ArrowRight => f.write_str("Right"),
            Key::Escape => f.write_str("Escape"),
            Key::Tab => f.write_str("Tab"),
        }
    }
}

/// What the host should do with the native event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub handled: bool,
    pub prevent_default: bool,
}

impl KeyOutcome {
    pub const IGNORED: KeyOutcome = KeyOutcome { handled: false, prevent_default: false };
    pub const HANDLED: KeyOutcome = KeyOutcome { handled: true, prevent_default: true };
}

/// The command a chord is bound to, if any.
pub fn chord_command(event: &KeyEvent) -> Option<Command> {
    if !event.modifiers.command() || event.modifiers.alt {
        return None;
    }
    let Key::Char(c) = event.key else {
        return None;
    };
    let command = match (c, event.modifiers.shift) {
        ('b', false) => Command::ToggleMark(Mark::Bold),
        ('i', false) => Command::ToggleMark(Mark::Italic),
        ('u', false) => Command::ToggleMark(Mark::Underline),
        ('`', false) => Command::ToggleMark(Mark::Code),
        ('k', false) => Command::InsertLink,
        ('z', false) => Command::Undo,
        // Browsers report the shifted letter
        ('z' | 'Z', true) => Command::Redo,
        ('y', false) => Command::Redo,
        _ => return None,
    };
    Some(command)
}

pub fn handle_key_down(editor: &mut Editor, event: &KeyEvent, prompt: &mut dyn Prompt) -> KeyOutcome {
    if editor.is_read_only() || !editor.is_focused() {
        return KeyOutcome::IGNORED;
    }
    if let Some(command) = chord_command(event) {
        trace!(chord = %event, ?command, "chord");
        execute(editor, &command, prompt);
        return KeyOutcome::HANDLED;
    }
    if event.modifiers.command() || event.modifiers.alt {
        return KeyOutcome::IGNORED;
    }

    let shift = event.modifiers.shift;
    match event.key {
        Key::Enter => {
            editor.insert_break();
        }
        Key::Backspace => {
            editor.delete_backward();
        }
        Key::Delete => {
            editor.delete_forward();
        }
        Key::ArrowLeft if shift => {
            editor.extend_selection(-1);
        }
        Key::ArrowLeft => {
            editor.move_selection(-1);
        }
        Key::ArrowRight if shift => {
            editor.extend_selection(1);
        }
        Key::ArrowRight => {
            editor.move_selection(1);
        }
        Key::Char(c) if !c.is_control() => {
            editor.insert_text(c.encode_utf8(&mut [0; 4]));
        }
        _ => return KeyOutcome::IGNORED,
    }
    KeyOutcome::HANDLED
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::NoPrompt;
    use lectern_model::{Document, Marks, Node, Point};

    fn key(chord: &str) -> KeyEvent {
        chord.parse().unwrap()
    }

    #[test]
    fn test_parse_chords() {
        assert_eq!(key("Ctrl+B"), KeyEvent::ctrl('B'));
        assert_eq!(
            key("cmd+shift+z"),
            KeyEvent::new(Key::Char('z'), Modifiers { meta: true, shift: true, ..Modifiers::NONE })
        );
        assert_eq!(key("Enter"), KeyEvent::plain(Key::Enter));
        assert_eq!(key("Ctrl++"), KeyEvent::ctrl('+'));
        assert_eq!(key("Ctrl+`"), KeyEvent::ctrl('`'));
        assert_eq!(key("Shift+Left").to_string(), "Shift+Left");
        assert_eq!("Hyper+x".parse::<KeyEvent>(), Err(KeyParseError::UnknownModifier("Hyper".into())));
        assert_eq!("Ctrl+foo".parse::<KeyEvent>(), Err(KeyParseError::UnknownKey("foo".into())));
    }

    #[test]
    fn test_chord_bindings() {
        assert_eq!(chord_command(&key("Ctrl+b")), Some(Command::ToggleMark(Mark::Bold)));
        assert_eq!(chord_command(&key("Cmd+`")), Some(Command::ToggleMark(Mark::Code)));
        assert_eq!(chord_command(&key("Ctrl+Shift+Z")), Some(Command::Redo));
        assert_eq!(chord_command(&key("Ctrl+y")), Some(Command::Redo));
        assert_eq!(chord_command(&key("b")), None);
        assert_eq!(chord_command(&key("Ctrl+q")), None);
    }

    #[test]
    fn test_shifted_letters_are_not_mark_chords() {
        assert_eq!(chord_command(&key("Ctrl+Shift+b")), None);
        assert_eq!(chord_command(&key("Ctrl+Shift+I")), None);
        assert_eq!(chord_command(&key("Cmd+Shift+u")), None);
        assert_eq!(chord_command(&key("Ctrl+Shift+k")), None);
        assert_eq!(chord_command(&key("Ctrl+B")), None);
        assert_eq!(chord_command(&key("Ctrl+Shift+z")), Some(Command::Redo));
    }

    #[test]
    fn test_unfocused_editor_ignores_keys() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("a")]));
        let outcome = handle_key_down(&mut editor, &key("x"), &mut NoPrompt);
        assert_eq!(outcome, KeyOutcome::IGNORED);
        assert_eq!(editor.document(), &Document::new(vec![Node::paragraph("a")]));
    }

    #[test]
    fn test_typing_with_bold_chord() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("a")]));
        editor.focus();
        assert_eq!(editor.selection().unwrap().anchor, Point::new([0, 0], 1));
        assert!(handle_key_down(&mut editor, &key("Ctrl+b"), &mut NoPrompt).prevent_default);
        handle_key_down(&mut editor, &key("x"), &mut NoPrompt);
        handle_key_down(&mut editor, &key("Space"), &mut NoPrompt);
        assert_eq!(
            editor.document().children[0].children().unwrap(),
            &[Node::text("a"), Node::marked("x ", Marks::default().with(Mark::Bold))]
        );
    }

    #[test]
    fn test_undo_chord() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("a")]));
        editor.focus();
        handle_key_down(&mut editor, &key("b"), &mut NoPrompt);
        assert_eq!(editor.document().plain_text(), "ab");
        assert!(handle_key_down(&mut editor, &key("Ctrl+z"), &mut NoPrompt).handled);
        assert_eq!(editor.document().plain_text(), "a");
        handle_key_down(&mut editor, &key("Ctrl+Shift+z"), &mut NoPrompt);
        assert_eq!(editor.document().plain_text(), "ab");
    }
}
