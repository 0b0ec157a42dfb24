//! # action-parser
//!
//! ## Overview
//!
//! This crate parses the action strings attached to keybindings. An action string names the
//! action to run, optionally prefixed with the namespace it should run in, and optionally
//! followed by a parenthesized list of literal arguments:
//!
//! ```text
//! quit
//! record('x')
//! app.record("locally_up", 2, true)
//! ```
//!
//! Parsing only checks the shape of the string. Whether the named action exists, and whether
//! it accepts the given arguments, is decided later when the action is dispatched.
//!
//! ## Example
//!
//! ```
//! use action_parser::{parse_action, Literal};
//!
//! let parsed = parse_action("screen.record('up', 3)").unwrap();
//!
//! assert_eq!(parsed.namespace.as_deref(), Some("screen"));
//! assert_eq!(parsed.name, "record");
//! assert_eq!(parsed.args, vec![Literal::Str("up".into()), Literal::Int(3)]);
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::needless_return)]
use std::fmt;

mod grammar;

/// Errors returned when an action string can't be parsed.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
pub enum ActionParseError {
    /// The action string contained nothing but whitespace.
    #[error("Empty action string")]
    Empty,

    /// The action string didn't match the action grammar.
    #[error("Invalid action string: {0:?}")]
    Invalid(String),
}

/// A literal argument in an action string.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// A quoted string, using either single or double quotes.
    Str(String),

    /// An integer, possibly negative.
    Int(i64),

    /// A number containing a decimal point.
    Float(f64),

    /// `true`/`True` or `false`/`False`.
    Bool(bool),

    /// `None`.
    None,
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Str(s) => {
                write!(f, "'")?;

                for c in s.chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{c}")?,
                    }
                }

                write!(f, "'")
            },
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n}.0"),
            Literal::Float(n) => write!(f, "{n}"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::None => write!(f, "None"),
        }
    }
}

/// The pieces of a successfully parsed action string.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedAction {
    /// The namespace prefix before the first `.`, if one was given.
    pub namespace: Option<String>,

    /// The name of the action.
    pub name: String,

    /// Literal arguments, in the order they were written.
    pub args: Vec<Literal>,
}

impl fmt::Display for ParsedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}.")?;
        }

        write!(f, "{}", self.name)?;

        if self.args.is_empty() {
            return Ok(());
        }

        write!(f, "(")?;

        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{arg}")?;
        }

        write!(f, ")")
    }
}

/// Parse an action string.
pub fn parse_action(input: &str) -> Result<ParsedAction, ActionParseError> {
    if input.trim().is_empty() {
        return Err(ActionParseError::Empty);
    }

    match grammar::action(input) {
        Ok((_, parsed)) => Ok(parsed),
        Err(_) => Err(ActionParseError::Invalid(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_action(""), Err(ActionParseError::Empty));
        assert_eq!(parse_action("   "), Err(ActionParseError::Empty));

        let invalid = ["record(", "record('x'", "record(up')", "1record", "app.", "a b"];

        for s in invalid {
            assert_eq!(parse_action(s), Err(ActionParseError::Invalid(s.to_string())), "{s}");
        }
    }

    #[test]
    fn test_display_round_trip() {
        let strs = [
            "quit",
            "app.bell",
            "record('x')",
            "screen.record('it\\'s', -4, 2.5, true, None)",
        ];

        for s in strs {
            let parsed = parse_action(s).unwrap();
            assert_eq!(parsed.to_string(), s);
            assert_eq!(parse_action(&parsed.to_string()).unwrap(), parsed);
        }
    }

    #[test]
    fn test_display_floats() {
        let floats =
            [(1e16, "10000000000000000.0"), (2.0, "2.0"), (1e-7, "0.0000001"), (-0.5, "-0.5")];

        for (n, s) in floats {
            assert_eq!(Literal::Float(n).to_string(), s);

            let parsed = parse_action(&format!("record({s})")).unwrap();
            assert_eq!(parsed.args, vec![Literal::Float(n)]);
        }
    }

    #[test]
    fn test_display_normalizes() {
        let parsed = parse_action("  record( \"x\" ,True, )  ").unwrap();
        assert_eq!(parsed.to_string(), "record('x', true)");

        let parsed = parse_action("record()").unwrap();
        assert_eq!(parsed.to_string(), "record");
    }
}
