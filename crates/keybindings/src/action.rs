//! # Action specifications
//!
//! ## Overview
//!
//! An [ActionSpec] is the parsed form of the action string attached to a binding. It records
//! which action to run, where to run it, and the literal arguments to pass. Nothing here checks
//! that the action exists: that happens when the action is dispatched, which lets bindings refer
//! to actions that a node only gains once it's been composed into a tree.
use std::fmt;
use std::str::FromStr;

use action_parser::{parse_action, ActionParseError, ParsedAction};

/// A literal argument value passed to an action.
pub use action_parser::Literal as Value;

/// Errors that occur while interpreting an action string.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ActionSpecError {
    /// The action string couldn't be parsed.
    #[error("{0}")]
    Parse(#[from] ActionParseError),

    /// The action string used a namespace prefix that doesn't name a scope.
    #[error("Unknown action namespace: {0:?}")]
    UnknownNamespace(String),
}

/// The scope an action runs in.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum ActionTarget {
    /// The node that declared the matching binding.
    #[default]
    Owner,

    /// The application root (`app.` prefix).
    App,

    /// The currently active screen (`screen.` prefix).
    Screen,

    /// The currently focused widget (`focused.` prefix).
    Focused,
}

impl ActionTarget {
    fn from_namespace(ns: &str) -> Result<Self, ActionSpecError> {
        match ns {
            "app" => Ok(ActionTarget::App),
            "screen" => Ok(ActionTarget::Screen),
            "focused" => Ok(ActionTarget::Focused),
            _ => Err(ActionSpecError::UnknownNamespace(ns.to_string())),
        }
    }

    fn namespace(&self) -> Option<&'static str> {
        match self {
            ActionTarget::Owner => None,
            ActionTarget::App => Some("app"),
            ActionTarget::Screen => Some("screen"),
            ActionTarget::Focused => Some("focused"),
        }
    }
}

/// An action name, the scope to run it in, and its literal arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionSpec {
    target: ActionTarget,
    name: String,
    args: Vec<Value>,
}

impl ActionSpec {
    /// Create a new action that runs on the binding's owner without any arguments.
    pub fn new<T: Into<String>>(name: T) -> Self {
        ActionSpec { target: ActionTarget::Owner, name: name.into(), args: vec![] }
    }

    /// Change the scope this action runs in.
    pub fn with_target(mut self, target: ActionTarget) -> Self {
        self.target = target;
        self
    }

    /// Replace the arguments passed to this action.
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// The scope this action runs in.
    pub fn target(&self) -> ActionTarget {
        self.target
    }

    /// The action's name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The literal arguments to pass.
    pub fn args(&self) -> &[Value] {
        self.args.as_slice()
    }
}

impl TryFrom<ParsedAction> for ActionSpec {
    type Error = ActionSpecError;

    fn try_from(parsed: ParsedAction) -> Result<Self, Self::Error> {
        let target = match parsed.namespace {
            Some(ns) => ActionTarget::from_namespace(&ns)?,
            None => ActionTarget::Owner,
        };

        Ok(ActionSpec { target, name: parsed.name, args: parsed.args })
    }
}

impl FromStr for ActionSpec {
    type Err = ActionSpecError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        ActionSpec::try_from(parse_action(input)?)
    }
}

impl fmt::Display for ActionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parsed = ParsedAction {
            namespace: self.target.namespace().map(str::to_string),
            name: self.name.clone(),
            args: self.args.clone(),
        };

        write!(f, "{parsed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        let act = ActionSpec::from_str("record('x')").unwrap();
        assert_eq!(act.target(), ActionTarget::Owner);
        assert_eq!(act.name(), "record");
        assert_eq!(act.args(), &[Value::Str("x".into())]);

        let act = ActionSpec::from_str("app.quit").unwrap();
        assert_eq!(act.target(), ActionTarget::App);
        assert_eq!(act.name(), "quit");
        assert!(act.args().is_empty());

        let act = ActionSpec::from_str("screen.focus_next").unwrap();
        assert_eq!(act.target(), ActionTarget::Screen);

        let act = ActionSpec::from_str("focused.toggle(true)").unwrap();
        assert_eq!(act.target(), ActionTarget::Focused);
        assert_eq!(act.args(), &[Value::Bool(true)]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ActionSpec::from_str("widget.record('x')"),
            Err(ActionSpecError::UnknownNamespace("widget".into()))
        );
        assert_eq!(
            ActionSpec::from_str(""),
            Err(ActionSpecError::Parse(ActionParseError::Empty))
        );
        assert!(matches!(
            ActionSpec::from_str("record(up')"),
            Err(ActionSpecError::Parse(ActionParseError::Invalid(_)))
        ));
    }

    #[test]
    fn test_builder_display() {
        let act = ActionSpec::new("record")
            .with_target(ActionTarget::App)
            .with_args(vec![Value::Str("locally_up".into())]);

        assert_eq!(act.to_string(), "app.record('locally_up')");
        assert_eq!(ActionSpec::from_str(&act.to_string()).unwrap(), act);
    }
}
