//! # Applications
//!
//! ## Overview
//!
//! An [App] owns a tree of nodes, the stack of screens in that tree, the types the nodes were
//! created from, and a user-defined state value `S` that actions can modify.
//!
//! Creating an application mounts a root node of the given application type and pushes a
//! default screen, then runs the application type's mount hook, which is typically where
//! screens get pushed and widgets get composed and focused. Each screen remembers its own
//! focused widget, so focus comes back when a screen above it is popped.
use std::sync::Arc;

use tracing::{debug, info, warn};

use keybindings::{BindingLookup, BindingTable, ChainMatch, ChainResolver};

use crate::errors::{AppResult, TreeError};
use crate::focus::{FocusChain, FocusChainProvider};
use crate::input::InputPhase;
use crate::node::{NodeId, NodeKind, Tree};
use crate::types::{NodeTypeId, NodeTypes};

#[derive(Clone, Copy, Debug)]
struct ScreenEntry {
    node: NodeId,
    focused: Option<NodeId>,
}

/// A running application.
pub struct App<S> {
    pub(crate) types: NodeTypes<S>,
    pub(crate) tree: Tree,
    pub(crate) phase: InputPhase,
    root: NodeId,
    screens: Vec<ScreenEntry>,
    state: S,
    exiting: bool,
    bells: usize,
}

impl<S: 'static> App<S> {
    /// Create a new application of type `app_type`.
    pub fn new(types: NodeTypes<S>, app_type: NodeTypeId, state: S) -> AppResult<Self> {
        let (tree, root) = Tree::new(app_type);
        let mut app = App {
            types,
            tree,
            phase: InputPhase::Idle,
            root,
            screens: vec![],
            state,
            exiting: false,
            bells: 0,
        };

        app.expect_kind(app_type, NodeKind::App)?;

        for name in app.types.unknown_keymap_types() {
            warn!(ty = name, "keymap entry names a type that isn't registered");
        }

        let screen = app.types.screen_type();
        app.push_screen(screen)?;
        app.mounted(root)?;

        info!(app = %root, "application started");

        Ok(app)
    }

    fn expect_kind(&self, ty: NodeTypeId, kind: NodeKind) -> AppResult<()> {
        let name = self.types.name(ty)?;

        if self.types.kind(ty) == Some(kind) {
            return Ok(());
        }

        Err(TreeError::WrongKind(name.to_string(), kind).into())
    }

    fn mounted(&mut self, node: NodeId) -> AppResult<()> {
        let ty = self.tree.type_of(node)?;

        if let Some(hook) = self.types.on_mount(ty) {
            hook(self, node)?;
        }

        Ok(())
    }

    /// The application root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The application's state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the application's state.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    /// The node types this application was created with.
    pub fn types(&self) -> &NodeTypes<S> {
        &self.types
    }

    /// Mutable access to the node types, for redeclaring bindings on live types.
    pub fn types_mut(&mut self) -> &mut NodeTypes<S> {
        &mut self.types
    }

    /// The application's nodes.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Whether the input loop is idle or waiting on an action.
    pub fn phase(&self) -> InputPhase {
        self.phase
    }

    /// Ask the input loop to stop after the current key.
    pub fn exit(&mut self) {
        info!("exit requested");
        self.exiting = true;
    }

    /// Whether [App::exit] has been called.
    pub fn is_exiting(&self) -> bool {
        self.exiting
    }

    /// Ring the terminal bell.
    pub fn bell(&mut self) {
        debug!("bell");
        self.bells += 1;
    }

    /// How many times the bell has been rung.
    pub fn bells(&self) -> usize {
        self.bells
    }

    /// The application that owns a node.
    pub fn owning_app(&self, node: NodeId) -> Result<NodeId, TreeError> {
        self.tree.app_of(node)
    }

    /*
     * Screens
     */

    /// The screen on top of the stack.
    pub fn active_screen(&self) -> Option<NodeId> {
        self.screens.last().map(|s| s.node)
    }

    /// Every screen on the stack, from the bottom up.
    pub fn screens(&self) -> Vec<NodeId> {
        self.screens.iter().map(|s| s.node).collect()
    }

    /// Push a new screen of type `ty`, and run its mount hook.
    pub fn push_screen(&mut self, ty: NodeTypeId) -> AppResult<NodeId> {
        self.expect_kind(ty, NodeKind::Screen)?;

        let node = self.tree.insert(self.root, ty, NodeKind::Screen)?;
        self.screens.push(ScreenEntry { node, focused: None });

        info!(screen = %node, ty = self.types.name(ty).unwrap_or_default(), "pushed screen");

        self.mounted(node)?;

        Ok(node)
    }

    /// Push the screen installed under `name` on the application's type.
    pub fn push_named_screen(&mut self, name: &str) -> AppResult<NodeId> {
        let app_ty = self.tree.type_of(self.root)?;
        let ty = self
            .types
            .named_screen(app_ty, name)
            .ok_or_else(|| TreeError::UnknownScreen(name.to_string()))?;

        self.push_screen(ty)
    }

    /// Pop the active screen, removing it and its widgets from the tree.
    pub fn pop_screen(&mut self) -> AppResult<NodeId> {
        if self.screens.len() <= 1 {
            return Err(TreeError::LastScreen.into());
        }

        let entry = self.screens.pop().ok_or(TreeError::LastScreen)?;
        self.tree.remove(entry.node)?;

        info!(screen = %entry.node, "popped screen");

        Ok(entry.node)
    }

    /*
     * Widgets
     */

    /// Mount a new widget of type `ty` under `parent`, and run its mount hook.
    pub fn mount(&mut self, parent: NodeId, ty: NodeTypeId) -> AppResult<NodeId> {
        self.expect_kind(ty, NodeKind::Widget)?;

        if self.tree.kind_of(parent)? == NodeKind::App {
            return Err(TreeError::InvalidParent(parent).into());
        }

        let node = self.tree.insert(parent, ty, NodeKind::Widget)?;

        debug!(widget = %node, %parent, "mounted widget");

        self.mounted(node)?;

        Ok(node)
    }

    /// Mount a new widget of type `ty` directly on the active screen.
    pub fn compose(&mut self, ty: NodeTypeId) -> AppResult<NodeId> {
        let screen = self.active_screen().ok_or(TreeError::InvalidParent(self.root))?;

        self.mount(screen, ty)
    }

    /// Remove a widget and everything beneath it.
    pub fn unmount(&mut self, node: NodeId) -> AppResult<()> {
        if self.tree.kind_of(node)? != NodeKind::Widget {
            return Err(TreeError::NotAWidget(node).into());
        }

        let removed = self.tree.remove(node)?;

        for screen in self.screens.iter_mut() {
            if screen.focused.map_or(false, |f| removed.contains(&f)) {
                screen.focused = None;
            }
        }

        debug!(widget = %node, removed = removed.len(), "unmounted widget");

        Ok(())
    }

    /// Every widget on the active screen whose type is `ty` or derives from it.
    pub fn query(&self, ty: NodeTypeId) -> Vec<NodeId> {
        let Some(screen) = self.active_screen() else {
            return vec![];
        };

        self.tree
            .descendants(screen)
            .into_iter()
            .filter(|n| self.tree.type_of(*n).map_or(false, |t| self.types.is_subtype(t, ty)))
            .collect()
    }

    /// The first widget on the active screen whose type is `ty` or derives from it.
    pub fn query_one(&self, ty: NodeTypeId) -> Option<NodeId> {
        self.query(ty).into_iter().next()
    }

    /*
     * Focus
     */

    /// The focused widget on the active screen.
    pub fn focused(&self) -> Option<NodeId> {
        self.screens.last().and_then(|s| s.focused)
    }

    /// Give focus to a widget on the active screen.
    pub fn focus(&mut self, node: NodeId) -> Result<(), TreeError> {
        let ty = self.tree.type_of(node)?;

        if self.tree.kind_of(node)? != NodeKind::Widget {
            return Err(TreeError::NotAWidget(node));
        }

        if !self.types.can_focus(ty) {
            return Err(TreeError::NotFocusable(node));
        }

        let Some(entry) = self.screens.last_mut() else {
            return Err(TreeError::NotOnActiveScreen(node));
        };

        if !self.tree.is_within(node, entry.node) {
            return Err(TreeError::NotOnActiveScreen(node));
        }

        entry.focused = Some(node);

        debug!(widget = %node, "focused");

        Ok(())
    }

    /// Remove focus from the active screen's focused widget.
    pub fn blur(&mut self) {
        if let Some(entry) = self.screens.last_mut() {
            entry.focused = None;
        }
    }

    fn focusable(&self) -> Vec<NodeId> {
        let Some(screen) = self.active_screen() else {
            return vec![];
        };

        self.tree
            .descendants(screen)
            .into_iter()
            .filter(|n| self.tree.type_of(*n).map_or(false, |t| self.types.can_focus(t)))
            .collect()
    }

    fn cycle_focus(&mut self, forward: bool) -> Option<NodeId> {
        let nodes = self.focusable();
        let len = nodes.len();

        if len == 0 {
            return None;
        }

        let idx = match self.focused().and_then(|f| nodes.iter().position(|n| *n == f)) {
            Some(idx) if forward => (idx + 1) % len,
            Some(idx) => (idx + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };

        let next = nodes[idx];
        self.focus(next).ok()?;

        Some(next)
    }

    /// Move focus to the next focusable widget on the active screen, wrapping around.
    pub fn focus_next(&mut self) -> Option<NodeId> {
        self.cycle_focus(true)
    }

    /// Move focus to the previous focusable widget on the active screen, wrapping around.
    pub fn focus_previous(&mut self) -> Option<NodeId> {
        self.cycle_focus(false)
    }

    /*
     * Bindings
     */

    /// The bindings that apply to a node.
    ///
    /// This is the node's own table if one was installed with [App::set_bindings], and
    /// otherwise the effective table of its type.
    pub fn effective_bindings(&self, node: NodeId) -> AppResult<Arc<BindingTable>> {
        if let Some(table) = self.tree.bindings_override(node) {
            return Ok(table);
        }

        let ty = self.tree.type_of(node)?;

        Ok(self.types.effective(ty)?)
    }

    /// Replace the bindings for a single node, ignoring those of its type.
    pub fn set_bindings(&mut self, node: NodeId, table: BindingTable) -> Result<(), TreeError> {
        self.tree.set_bindings(node, Some(Arc::new(table)))
    }

    /// Go back to using a node's type bindings.
    pub fn reset_bindings(&mut self, node: NodeId) -> Result<(), TreeError> {
        self.tree.set_bindings(node, None)
    }

    /// The binding each reachable key would trigger, innermost first.
    pub fn active_bindings(&self) -> Vec<ChainMatch<NodeId>> {
        let chain = self.current_chain();

        ChainResolver::new(self).active(chain.nodes())
    }
}

impl<S: 'static> FocusChainProvider for App<S> {
    fn current_chain(&self) -> FocusChain {
        let start = self.focused().or_else(|| self.active_screen()).unwrap_or(self.root);

        self.tree.ancestors(start).collect()
    }
}

impl<S: 'static> BindingLookup<NodeId> for App<S> {
    fn bindings_for(&self, node: &NodeId) -> Option<Arc<BindingTable>> {
        self.effective_bindings(*node).ok()
    }
}

impl<S> std::fmt::Debug for App<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("root", &self.root)
            .field("screens", &self.screens)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
