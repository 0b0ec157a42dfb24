//! # bindkit
//!
//! ## Overview
//!
//! This crate puts the pieces from [keybindings] together into a runtime for applications
//! built from an application root, a stack of screens, and trees of widgets. It handles:
//!
//! * Declaring node types, with their bindings, actions, and mount hooks ([types]).
//! * Building and modifying the tree of nodes, and tracking focus ([app], [node], [focus]).
//! * Resolving each key press against the focus chain and dispatching the matched action
//!   ([input], [action]).
//! * Loading user settings and keymaps ([config]), and reading keys from a terminal ([key]).
//!
//! ## Example
//!
//! ```
//! use bindkit::prelude::*;
//! use futures::future::{FutureExt, LocalBoxFuture};
//!
//! #[derive(Default)]
//! struct Counter {
//!     count: i64,
//! }
//!
//! fn add(app: &mut App<Counter>, call: ActionCall) -> LocalBoxFuture<'_, ActionResult> {
//!     async move {
//!         let n = call.int_arg(0)?;
//!         app.state_mut().count += n;
//!
//!         Ok(())
//!     }
//!     .boxed_local()
//! }
//!
//! fn compose(app: &mut App<Counter>, _: NodeId) -> AppResult<()> {
//!     if let Some(ty) = app.types().lookup("Counter") {
//!         let counter = app.compose(ty)?;
//!         app.focus(counter)?;
//!     }
//!
//!     Ok(())
//! }
//!
//! let mut types = NodeTypes::new(&Config::default()).unwrap();
//!
//! let counter = NodeType::new("Counter", types.widget_type())
//!     .can_focus(true)
//!     .bind("up", "add(1)", "Increment")
//!     .bind("down", "add(-1)", "Decrement")
//!     .action("add", Arity::exact(1), add);
//! types.register(counter).unwrap();
//!
//! let app_ty = NodeType::new("CounterApp", types.app_type()).on_mount(compose);
//! let app_ty = types.register(app_ty).unwrap();
//!
//! let mut app = App::new(types, app_ty, Counter::default()).unwrap();
//!
//! futures::executor::block_on(app.press(&["up", "up", "down", "up"])).unwrap();
//! assert_eq!(app.state().count, 2);
//!
//! futures::executor::block_on(app.press(&["ctrl+c"])).unwrap();
//! assert!(app.is_exiting());
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::needless_return)]
#![allow(clippy::type_complexity)]

pub mod action;
pub mod app;
pub mod config;
pub mod errors;
pub mod focus;
pub mod input;
pub mod key;
pub mod node;
pub mod types;

mod builtin;

pub use keybindings;

/// A collection of types and traits commonly used when building applications.
pub mod prelude {
    pub use crate::action::{dispatch, ActionCall, ActionInvocation};
    pub use crate::app::App;
    pub use crate::config::{BindingConfig, Config};
    pub use crate::errors::{
        ActionError,
        ActionResult,
        AppError,
        AppResult,
        ConfigError,
        TreeError,
        TypeError,
    };
    pub use crate::focus::{FocusChain, FocusChainProvider};
    pub use crate::input::{InputPhase, KeyInputSource, KeyOutcome};
    pub use crate::key::{key_events, TerminalKey};
    pub use crate::node::{NodeId, NodeKind};
    pub use crate::types::{ActionHandler, Arity, MountHook, NodeType, NodeTypeId, NodeTypes};

    pub use keybindings::{
        ActionSpec,
        ActionTarget,
        Binding,
        BindingTable,
        KeySymbol,
        Value,
        MOVEMENT_KEYS,
    };
}
