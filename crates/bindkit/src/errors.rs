//! # Errors
//!
//! ## Overview
//!
//! Failures are split by where they happen. [TypeError] and [ConfigError] come up while the
//! application is being put together, [TreeError] while nodes are being mounted, focused and
//! removed, and [ActionError] while a key is being dispatched. [AppError] wraps all of them.
use keybindings::{BindingError, HierarchyError, KeyError};

use crate::node::{NodeId, NodeKind};

/// Errors from operations on the node tree and the screen stack.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TreeError {
    /// The node isn't (or is no longer) in the tree.
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// The node's type can't receive focus.
    #[error("Node {0} can't receive focus")]
    NotFocusable(NodeId),

    /// The node belongs to a screen that isn't currently active.
    #[error("Node {0} isn't on the active screen")]
    NotOnActiveScreen(NodeId),

    /// The operation only applies to widgets.
    #[error("Node {0} is not a widget")]
    NotAWidget(NodeId),

    /// Widgets can only be mounted under screens and other widgets.
    #[error("Widgets can't be mounted under node {0}")]
    InvalidParent(NodeId),

    /// The only screen on the stack can't be popped.
    #[error("Can't pop the last screen")]
    LastScreen,

    /// No screen has been installed under this name.
    #[error("Unknown screen: {0:?}")]
    UnknownScreen(String),

    /// A node type was used where a different kind of node was expected.
    #[error("Type {0:?} can't be used here; expected a {1} type")]
    WrongKind(String, NodeKind),
}

/// Errors from registering node types.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum TypeError {
    /// The underlying type hierarchy rejected the type.
    #[error("{0}")]
    Hierarchy(#[from] HierarchyError),

    /// One of the type's bindings couldn't be parsed.
    #[error("Invalid binding for {ty}: {source}")]
    Binding {
        /// The type being registered.
        ty: String,

        /// What was wrong with the binding.
        source: BindingError,
    },
}

/// Errors from loading and validating a [Config](crate::config::Config).
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file couldn't be read.
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file wasn't valid JSON, or didn't have the expected shape.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configured quit key couldn't be parsed.
    #[error("Invalid quit key: {0}")]
    QuitKey(KeyError),

    /// A keymap entry couldn't be parsed.
    #[error("Invalid binding for {ty}: {source}")]
    Binding {
        /// The type the keymap entry is for.
        ty: String,

        /// What was wrong with the binding.
        source: BindingError,
    },
}

/// Errors from resolving and running an action.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ActionError {
    /// The target node's type doesn't provide an action with this name.
    #[error("Action not found: {0:?}")]
    NotFound(String),

    /// The literal arguments don't match what the action accepts.
    #[error("Bad arguments for action {action:?}: {reason}")]
    BadArguments {
        /// The action that was being invoked.
        action: String,

        /// What was wrong with the arguments.
        reason: String,
    },

    /// The action targets a scope that doesn't currently exist, like the focused widget when
    /// nothing has focus.
    #[error("No {0} to run the action on")]
    NoTarget(String),

    /// The action tried to modify the tree in an invalid way.
    #[error("{0}")]
    Tree(#[from] TreeError),

    /// The action's implementation reported a failure.
    #[error("Action failed: {0}")]
    Failed(String),

    /// An action started by another action's implementation with [App::invoke] failed.
    ///
    /// [App::invoke]: crate::app::App::invoke
    #[error("Action {action:?} failed: {source}")]
    Nested {
        /// The action that was invoked.
        action: String,

        /// Why it failed.
        source: Box<ActionError>,
    },
}

impl ActionError {
    /// Whether this error was raised while resolving the action, before any of its
    /// implementation ran.
    ///
    /// Argument errors reported by the action's own [ActionCall](crate::action::ActionCall)
    /// accessors count as resolution errors. The input loop logs these and moves on to the next
    /// key. Anything else came from inside an action, including resolution errors for actions
    /// it invoked itself, and is returned to the caller.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ActionError::NotFound(_) => true,
            ActionError::BadArguments { .. } => true,
            ActionError::NoTarget(_) => true,
            ActionError::Tree(_) => false,
            ActionError::Failed(_) => false,
            ActionError::Nested { .. } => false,
        }
    }
}

impl From<AppError> for ActionError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Action(e) => e,
            AppError::Tree(e) => ActionError::Tree(e),
            e => ActionError::Failed(e.to_string()),
        }
    }
}

/// Any error that can occur while building or driving an application.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Failure while dispatching an action.
    #[error("{0}")]
    Action(#[from] ActionError),

    /// Failure while modifying the node tree.
    #[error("{0}")]
    Tree(#[from] TreeError),

    /// Failure while registering a node type.
    #[error("{0}")]
    Type(#[from] TypeError),

    /// Failure while parsing a key.
    #[error("{0}")]
    Key(#[from] KeyError),

    /// Failure while loading configuration.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Result of running an action.
pub type ActionResult<T = ()> = Result<T, ActionError>;

/// Result of building or driving an application.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable() {
        assert!(ActionError::NotFound("record".into()).is_recoverable());
        assert!(ActionError::NoTarget("focused widget".into()).is_recoverable());
        assert!(ActionError::BadArguments { action: "record".into(), reason: "".into() }
            .is_recoverable());

        assert!(!ActionError::Failed("boom".into()).is_recoverable());
        assert!(!ActionError::Tree(TreeError::LastScreen).is_recoverable());

        let nested = ActionError::Nested {
            action: "record".into(),
            source: Box::new(ActionError::NotFound("record".into())),
        };
        assert!(!nested.is_recoverable());
        assert_eq!(nested.to_string(), r#"Action "record" failed: Action not found: "record""#);
    }

    #[test]
    fn test_from_app_error() {
        let err = AppError::from(ActionError::NotFound("x".into()));
        assert_eq!(ActionError::from(err), ActionError::NotFound("x".into()));

        let err = AppError::from(TreeError::UnknownScreen("help".into()));
        let expected = ActionError::Tree(TreeError::UnknownScreen("help".into()));
        assert_eq!(ActionError::from(err), expected);

        let err = AppError::from(KeyError::Empty);
        assert_eq!(ActionError::from(err), ActionError::Failed("Empty key string".into()));
    }
}
