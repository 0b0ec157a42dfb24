//! # Key symbols
//!
//! ## Overview
//!
//! Keys are identified by normalized strings such as `x`, `up` or `ctrl+c`. Normalizing when
//! a [KeySymbol] is created means that two spellings of the same key (`Ctrl+C`, `control+c`)
//! always hash and compare equal, regardless of whether they came from a binding declaration,
//! a configuration file, or the terminal.
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

/// The eight navigation keys that widgets commonly bind for scrolling and cursor movement.
///
/// Nothing binds these implicitly: a node only responds to them if its type declares them, so
/// callers can use this list when writing their own declarations.
pub const MOVEMENT_KEYS: [&str; 8] =
    ["up", "down", "left", "right", "home", "end", "pageup", "pagedown"];

/// Errors that occur while parsing a key string.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum KeyError {
    /// An empty key string.
    #[error("Empty key string")]
    Empty,

    /// A key string that couldn't be interpreted.
    #[error("Invalid key string: {0:?}")]
    Invalid(String),

    /// A modifier name that isn't recognized.
    #[error("Unknown key modifier: {0:?}")]
    UnknownModifier(String),
}

bitflags! {
    /// Modifier keys held down alongside a key.
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    pub struct Modifiers: u8 {
        /// The Control key.
        const CTRL = 0b0001;

        /// The Alt (or Option) key.
        const ALT = 0b0010;

        /// The Shift key.
        const SHIFT = 0b0100;

        /// The Meta (or Super, or Command) key.
        const META = 0b1000;
    }
}

fn parse_modifier(name: &str) -> Result<Modifiers, KeyError> {
    match name.to_ascii_lowercase().as_str() {
        "ctrl" | "control" => Ok(Modifiers::CTRL),
        "alt" | "option" => Ok(Modifiers::ALT),
        "shift" => Ok(Modifiers::SHIFT),
        "meta" | "super" | "cmd" => Ok(Modifiers::META),
        _ => Err(KeyError::UnknownModifier(name.to_string())),
    }
}

fn canonical_name(name: &str) -> String {
    let name = name.to_ascii_lowercase();

    let alias = match name.as_str() {
        "esc" => "escape",
        "return" => "enter",
        "pgup" | "page_up" => "pageup",
        "pgdn" | "pgdown" | "page_down" => "pagedown",
        "del" => "delete",
        "ins" => "insert",
        "bs" => "backspace",
        "plus" => "+",
        _ => return name,
    };

    alias.to_string()
}

/// A normalized key identifier, such as `x`, `A`, `up` or `ctrl+c`.
///
/// Single characters keep their case, and Shift is folded into them (`shift+a` becomes `A`).
/// Named keys are lowercased, and common aliases are mapped to a single spelling (`esc`
/// becomes `escape`, `pgup` becomes `pageup`). Modifiers always print in the order
/// `ctrl+alt+shift+meta`.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct KeySymbol {
    modifiers: Modifiers,
    name: String,
}

impl KeySymbol {
    /// Create a new key from a set of modifiers and a key name.
    pub fn new(mut modifiers: Modifiers, name: &str) -> Result<Self, KeyError> {
        if name.is_empty() {
            return Err(KeyError::Empty);
        }

        let mut chars = name.chars();

        let name = match (chars.next(), chars.next()) {
            (Some(' '), None) => {
                modifiers -= Modifiers::SHIFT;

                String::from("space")
            },
            (Some(c), None) => {
                let c = if modifiers.contains(Modifiers::SHIFT) && c.is_alphabetic() {
                    c.to_uppercase().next().unwrap_or(c)
                } else if !(modifiers - Modifiers::SHIFT).is_empty() {
                    c.to_ascii_lowercase()
                } else {
                    c
                };

                modifiers -= Modifiers::SHIFT;

                c.to_string()
            },
            _ => {
                if name.chars().any(char::is_whitespace) {
                    return Err(KeyError::Invalid(name.to_string()));
                }

                canonical_name(name)
            },
        };

        Ok(KeySymbol { modifiers, name })
    }

    /// Create a key for a single unmodified character.
    pub fn char(c: char) -> Self {
        if c == ' ' {
            return KeySymbol { modifiers: Modifiers::empty(), name: String::from("space") };
        }

        KeySymbol { modifiers: Modifiers::empty(), name: c.to_string() }
    }

    /// The modifiers held alongside this key.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// The name of the key, without any modifiers.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns the character this key types, if it is a single unmodified character.
    pub fn get_char(&self) -> Option<char> {
        if !self.modifiers.is_empty() {
            return None;
        }

        let mut chars = self.name.chars();

        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    /// Whether this is one of the unmodified [MOVEMENT_KEYS].
    pub fn is_movement(&self) -> bool {
        self.modifiers.is_empty() && MOVEMENT_KEYS.contains(&self.name.as_str())
    }

    /// All of the [MOVEMENT_KEYS] as [KeySymbol] values.
    pub fn movement_keys() -> Vec<KeySymbol> {
        MOVEMENT_KEYS
            .iter()
            .map(|name| KeySymbol { modifiers: Modifiers::empty(), name: name.to_string() })
            .collect()
    }
}

impl FromStr for KeySymbol {
    type Err = KeyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(KeyError::Empty);
        }

        if input == "+" {
            return KeySymbol::new(Modifiers::empty(), "+");
        }

        let (mods, name) = if let Some(prefix) = input.strip_suffix("++") {
            (prefix, "+")
        } else if let Some((prefix, name)) = input.rsplit_once('+') {
            (prefix, name)
        } else {
            ("", input)
        };

        if name.is_empty() {
            return Err(KeyError::Invalid(input.to_string()));
        }

        let mut modifiers = Modifiers::empty();

        if !mods.is_empty() {
            for m in mods.split('+') {
                if m.is_empty() {
                    return Err(KeyError::Invalid(input.to_string()));
                }

                modifiers |= parse_modifier(m)?;
            }
        }

        return KeySymbol::new(modifiers, name);
    }
}

impl TryFrom<&str> for KeySymbol {
    type Error = KeyError;

    fn try_from(input: &str) -> Result<Self, Self::Error> {
        KeySymbol::from_str(input)
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Modifiers::CTRL, "ctrl"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
            (Modifiers::META, "meta"),
        ];

        for (m, name) in names {
            if self.modifiers.contains(m) {
                write!(f, "{name}+")?;
            }
        }

        write!(f, "{}", self.name)
    }
}
