//! # Action dispatch
//!
//! ## Overview
//!
//! Once a key has been matched to a binding, the binding's [ActionSpec] is paired with the node
//! that declared it to form an [ActionInvocation], and [dispatch] runs it:
//!
//! 1. The spec's namespace picks the target node: the binding's owner, the application root,
//!    the active screen, or the focused widget.
//! 2. The action is looked up among those provided by the target's type. A missing action is
//!    [ActionError::NotFound]; nothing further up the focus chain is tried.
//! 3. The literal arguments are checked against the action's [Arity](crate::types::Arity), and
//!    a mismatch is [ActionError::BadArguments].
//! 4. The handler runs, and is awaited to completion. Whatever it returns is returned to the
//!    caller unchanged.
//!
//! Handlers receive the target and arguments as an [ActionCall]. A handler that wants another
//! node's action to run, like a widget forwarding to an action on the application, calls
//! [App::invoke] itself. If that action can't be resolved, the failure belongs to the handler
//! that asked for it, and stops the input loop like any other failure raised by a handler.
use keybindings::{ActionSpec, ActionTarget, KeySymbol, Value};
use tracing::{debug_span, Instrument};

use crate::app::App;
use crate::errors::{ActionError, ActionResult};
use crate::node::NodeId;

/// A request to run an action, as received by its handler.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionCall {
    /// The name of the action.
    pub name: String,

    /// The node the action runs on.
    pub target: NodeId,

    /// The literal arguments, already checked against the action's arity.
    pub args: Vec<Value>,

    /// The key that triggered the action, if it came from a binding.
    pub key: Option<KeySymbol>,
}

impl ActionCall {
    /// Create a call without a triggering key.
    pub fn new<T: Into<String>>(name: T, target: NodeId, args: Vec<Value>) -> Self {
        ActionCall { name: name.into(), target, args, key: None }
    }

    fn bad_argument(&self, reason: String) -> ActionError {
        ActionError::BadArguments { action: self.name.clone(), reason }
    }

    /// Get an argument.
    pub fn arg(&self, idx: usize) -> ActionResult<&Value> {
        self.args
            .get(idx)
            .ok_or_else(|| self.bad_argument(format!("missing argument {}", idx + 1)))
    }

    /// Get an argument that should be a string.
    pub fn str_arg(&self, idx: usize) -> ActionResult<&str> {
        match self.arg(idx)? {
            Value::Str(s) => Ok(s.as_str()),
            v => {
                let reason = format!("expected a string for argument {}, got {v}", idx + 1);

                Err(self.bad_argument(reason))
            },
        }
    }

    /// Get an argument that should be an integer.
    pub fn int_arg(&self, idx: usize) -> ActionResult<i64> {
        match self.arg(idx)? {
            Value::Int(n) => Ok(*n),
            v => {
                let reason = format!("expected an integer for argument {}, got {v}", idx + 1);

                Err(self.bad_argument(reason))
            },
        }
    }

    /// Get an argument that should be a boolean.
    pub fn bool_arg(&self, idx: usize) -> ActionResult<bool> {
        match self.arg(idx)? {
            Value::Bool(b) => Ok(*b),
            v => {
                let reason = format!("expected a boolean for argument {}, got {v}", idx + 1);

                Err(self.bad_argument(reason))
            },
        }
    }
}

/// An action to run on behalf of the node that declared its binding.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionInvocation {
    /// The action, with its namespace and arguments.
    pub action: ActionSpec,

    /// The node whose binding produced this invocation.
    pub owner: NodeId,

    /// The key that was pressed.
    pub key: Option<KeySymbol>,
}

impl ActionInvocation {
    /// Create an invocation of `action` owned by `owner`.
    pub fn new(action: ActionSpec, owner: NodeId) -> Self {
        ActionInvocation { action, owner, key: None }
    }

    /// Record the key that triggered this invocation.
    pub fn with_key(mut self, key: KeySymbol) -> Self {
        self.key = Some(key);
        self
    }
}

/// Resolve an invocation's target, then look up, check and run its action.
pub async fn dispatch<S: 'static>(app: &mut App<S>, invocation: ActionInvocation) -> ActionResult {
    let target = app.resolve_target(invocation.owner, invocation.action.target())?;
    let span = debug_span!("action", action = %invocation.action, %target);
    let call = ActionCall {
        name: invocation.action.name().to_string(),
        target,
        args: invocation.action.args().to_vec(),
        key: invocation.key,
    };

    app.call(call).instrument(span).await
}

impl<S: 'static> App<S> {
    /// Find the node that an action in the given namespace runs on.
    pub fn resolve_target(&self, owner: NodeId, target: ActionTarget) -> ActionResult<NodeId> {
        match target {
            ActionTarget::Owner => {
                self.tree.type_of(owner)?;

                Ok(owner)
            },
            ActionTarget::App => Ok(self.tree.app_of(owner)?),
            ActionTarget::Screen => {
                self.active_screen().ok_or_else(|| ActionError::NoTarget("active screen".into()))
            },
            ActionTarget::Focused => {
                self.focused().ok_or_else(|| ActionError::NoTarget("focused widget".into()))
            },
        }
    }

    /// Run an action provided by a node's type.
    ///
    /// This is how an action's implementation runs other actions, so failures to resolve the
    /// invoked action are reported as [ActionError::Nested], which the input loop doesn't skip
    /// over.
    pub async fn invoke(&mut self, target: NodeId, name: &str, args: Vec<Value>) -> ActionResult {
        self.call(ActionCall::new(name, target, args)).await.map_err(|e| {
            if e.is_recoverable() {
                ActionError::Nested { action: name.to_string(), source: Box::new(e) }
            } else {
                e
            }
        })
    }

    async fn call(&mut self, call: ActionCall) -> ActionResult {
        let ty = self.tree.type_of(call.target)?;
        let Some(entry) = self.types.action(ty, &call.name) else {
            return Err(ActionError::NotFound(call.name));
        };

        if !entry.arity.accepts(call.args.len()) {
            let reason = format!("expected {} arguments, got {}", entry.arity, call.args.len());

            return Err(ActionError::BadArguments { action: call.name, reason });
        }

        let handler = entry.handler;

        handler(self, call).await
    }
}
