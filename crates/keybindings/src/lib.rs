//! # keybindings
//!
//! ## Overview
//!
//! This crate provides the environment-agnostic pieces for resolving a key press against
//! bindings declared at several levels of a user interface.
//!
//! Applications are trees of nodes (an application root, a screen, and the widgets on it), and
//! every node has a type. Types declare [Binding]s, which map a [KeySymbol] to an
//! [ActionSpec]. Two rules decide which binding a key press reaches:
//!
//! * **Type inheritance.** [TypeHierarchy] merges each type's declared bindings over those of
//!   its base type, unless the type opts out of inheriting, in which case it keeps only its own.
//!   The result is the type's effective [BindingTable].
//! * **Innermost wins.** [ChainResolver] walks the focus chain from the focused leaf up to the
//!   root, and the first node whose effective table binds the key handles it.
//!
//! Nothing is bound implicitly. The [MOVEMENT_KEYS] are exported so that consumers can declare
//! them, but they are resolved exactly like any other key.
//!
//! ## Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::str::FromStr;
//! use std::sync::Arc;
//!
//! use keybindings::{
//!     Binding,
//!     BindingLookup,
//!     BindingTable,
//!     ChainResolver,
//!     KeySymbol,
//!     TypeHierarchy,
//!     TypeKey,
//! };
//!
//! struct Nodes {
//!     types: TypeHierarchy,
//!     nodes: HashMap<&'static str, TypeKey>,
//! }
//!
//! impl BindingLookup<&'static str> for Nodes {
//!     fn bindings_for(&self, node: &&'static str) -> Option<Arc<BindingTable>> {
//!         self.types.effective(*self.nodes.get(node)?).ok()
//!     }
//! }
//!
//! let mut types = TypeHierarchy::new();
//! let app = types.register("App", None).unwrap();
//! let widget = types.register("Widget", None).unwrap();
//!
//! let quit = Binding::parse("ctrl+c", "quit", "Quit").unwrap();
//! let up = Binding::parse("up", "scroll_up", "Scroll up").unwrap();
//! types.declare_bindings(app, vec![quit], true).unwrap();
//! types.declare_bindings(widget, vec![up], true).unwrap();
//!
//! let nodes = Nodes { types, nodes: HashMap::from([("list", widget), ("app", app)]) };
//! let resolver = ChainResolver::new(&nodes);
//! let chain = ["list", "app"];
//!
//! let up = resolver.resolve(&chain, &KeySymbol::from_str("up").unwrap()).unwrap();
//! assert_eq!(up.node, "list");
//! assert_eq!(up.binding.action.name(), "scroll_up");
//!
//! let quit = resolver.resolve(&chain, &KeySymbol::from_str("ctrl+c").unwrap()).unwrap();
//! assert_eq!(quit.node, "app");
//! ```

// Require docs for public APIs, and disable the more annoying clippy lints.
#![deny(missing_docs)]
#![allow(clippy::bool_to_int_with_if)]
#![allow(clippy::len_without_is_empty)]
#![allow(clippy::needless_return)]
#![allow(clippy::type_complexity)]

pub mod action;
pub mod binding;
pub mod chain;
pub mod hierarchy;
pub mod key;

pub use self::action::{ActionSpec, ActionSpecError, ActionTarget, Value};
pub use self::binding::{Binding, BindingError, BindingTable};
pub use self::chain::{BindingLookup, ChainMatch, ChainResolver};
pub use self::hierarchy::{HierarchyError, TypeHierarchy, TypeKey};
pub use self::key::{KeyError, KeySymbol, Modifiers, MOVEMENT_KEYS};
