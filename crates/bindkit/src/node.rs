//! # Node tree
//!
//! ## Overview
//!
//! Every application is a tree of nodes. The root is the application itself, its children are
//! the screens on its screen stack, and each screen owns a tree of widgets. Nodes are identified
//! by [NodeId] and stored in a [Tree], which records each node's type, its parent and children,
//! and the application that owns it.
//!
//! Removing a node removes everything beneath it.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use keybindings::BindingTable;

use crate::errors::TreeError;
use crate::types::NodeTypeId;

/// Identifies a node in a [Tree].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The three kinds of node that make up an application.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    /// The application root.
    App,

    /// A screen on the application's screen stack.
    Screen,

    /// A widget on a screen.
    Widget,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::App => write!(f, "app"),
            NodeKind::Screen => write!(f, "screen"),
            NodeKind::Widget => write!(f, "widget"),
        }
    }
}

#[derive(Debug, Default)]
struct IdGenerator {
    next_id: u64,
}

impl IdGenerator {
    fn next(&mut self) -> NodeId {
        let id = self.next_id;

        // Identifiers are never reused, so a removed node can't be mistaken for a new one.
        self.next_id = self.next_id.wrapping_add(1);

        NodeId(id)
    }
}

#[derive(Debug)]
struct NodeData {
    ty: NodeTypeId,
    kind: NodeKind,
    app: NodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    bindings: Option<Arc<BindingTable>>,
}

/// The nodes of a single application.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: HashMap<NodeId, NodeData>,
    idgen: IdGenerator,
}

impl Tree {
    /// Create a tree containing only an application root of the given type.
    pub(crate) fn new(ty: NodeTypeId) -> (Tree, NodeId) {
        let mut tree = Tree::default();
        let root = tree.idgen.next();
        let data = NodeData {
            ty,
            kind: NodeKind::App,
            app: root,
            parent: None,
            children: vec![],
            bindings: None,
        };

        tree.nodes.insert(root, data);

        (tree, root)
    }

    fn get(&self, node: NodeId) -> Result<&NodeData, TreeError> {
        self.nodes.get(&node).ok_or(TreeError::UnknownNode(node))
    }

    fn get_mut(&mut self, node: NodeId) -> Result<&mut NodeData, TreeError> {
        self.nodes.get_mut(&node).ok_or(TreeError::UnknownNode(node))
    }

    /// Add a new node as the last child of `parent`.
    pub(crate) fn insert(
        &mut self,
        parent: NodeId,
        ty: NodeTypeId,
        kind: NodeKind,
    ) -> Result<NodeId, TreeError> {
        let app = self.get(parent)?.app;
        let id = self.idgen.next();
        let data = NodeData {
            ty,
            kind,
            app,
            parent: Some(parent),
            children: vec![],
            bindings: None,
        };

        self.get_mut(parent)?.children.push(id);
        self.nodes.insert(id, data);

        Ok(id)
    }

    /// Remove a node and all of its descendants, returning the removed nodes.
    pub(crate) fn remove(&mut self, node: NodeId) -> Result<Vec<NodeId>, TreeError> {
        let parent = self.get(node)?.parent;

        if let Some(parent) = parent {
            self.get_mut(parent)?.children.retain(|c| *c != node);
        }

        let mut removed = vec![node];
        removed.extend(self.descendants(node));

        for id in removed.iter() {
            self.nodes.remove(id);
        }

        Ok(removed)
    }

    /// Whether a node is in the tree.
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    /// The number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// The type of a node.
    pub fn type_of(&self, node: NodeId) -> Result<NodeTypeId, TreeError> {
        self.get(node).map(|n| n.ty)
    }

    /// The kind of a node.
    pub fn kind_of(&self, node: NodeId) -> Result<NodeKind, TreeError> {
        self.get(node).map(|n| n.kind)
    }

    /// The application root that owns a node.
    pub fn app_of(&self, node: NodeId) -> Result<NodeId, TreeError> {
        self.get(node).map(|n| n.app)
    }

    /// The parent of a node, or `None` for the root.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|n| n.parent)
    }

    /// The children of a node, in the order they were mounted.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(&node).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    /// A node followed by each of its ancestors, ending at the root.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let start = self.contains(node).then_some(node);

        std::iter::successors(start, |n| self.parent(*n))
    }

    /// Every node beneath `node`, in depth-first order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut found = vec![];
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            found.push(id);
            stack.extend(self.children(id).iter().rev());
        }

        found
    }

    /// Whether `node` is `ancestor` or somewhere beneath it.
    pub fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// The binding table installed directly on a node, if any.
    pub fn bindings_override(&self, node: NodeId) -> Option<Arc<BindingTable>> {
        self.nodes.get(&node).and_then(|n| n.bindings.clone())
    }

    /// Install or clear a node's own binding table.
    pub(crate) fn set_bindings(
        &mut self,
        node: NodeId,
        bindings: Option<Arc<BindingTable>>,
    ) -> Result<(), TreeError> {
        self.get_mut(node)?.bindings = bindings;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keybindings::TypeHierarchy;

    fn setup() -> (Tree, NodeId, NodeTypeId) {
        let mut types = TypeHierarchy::new();
        let ty = types.register("Node", None).unwrap();
        let (tree, root) = Tree::new(ty);

        (tree, root, ty)
    }

    #[test]
    fn test_insert() {
        let (mut tree, root, ty) = setup();
        let screen = tree.insert(root, ty, NodeKind::Screen).unwrap();
        let a = tree.insert(screen, ty, NodeKind::Widget).unwrap();
        let b = tree.insert(screen, ty, NodeKind::Widget).unwrap();
        let c = tree.insert(a, ty, NodeKind::Widget).unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.children(screen), &[a, b]);
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.kind_of(c), Ok(NodeKind::Widget));
        assert_eq!(tree.app_of(c), Ok(root));
        assert_eq!(tree.app_of(root), Ok(root));

        assert_eq!(tree.ancestors(c).collect::<Vec<_>>(), vec![c, a, screen, root]);
        assert_eq!(tree.descendants(screen), vec![a, c, b]);
        assert!(tree.is_within(c, screen));
        assert!(!tree.is_within(b, a));
    }

    #[test]
    fn test_remove() {
        let (mut tree, root, ty) = setup();
        let screen = tree.insert(root, ty, NodeKind::Screen).unwrap();
        let a = tree.insert(screen, ty, NodeKind::Widget).unwrap();
        let b = tree.insert(screen, ty, NodeKind::Widget).unwrap();
        let c = tree.insert(a, ty, NodeKind::Widget).unwrap();

        assert_eq!(tree.remove(a).unwrap(), vec![a, c]);
        assert_eq!(tree.children(screen), &[b]);
        assert!(!tree.contains(c));
        assert_eq!(tree.type_of(c), Err(TreeError::UnknownNode(c)));
        assert_eq!(tree.ancestors(c).count(), 0);
        assert_eq!(tree.remove(a), Err(TreeError::UnknownNode(a)));

        // Identifiers aren't reused.
        let d = tree.insert(screen, ty, NodeKind::Widget).unwrap();
        assert!(d != a && d != c);
    }

    #[test]
    fn test_bindings_override() {
        let (mut tree, root, _) = setup();
        assert_eq!(tree.bindings_override(root), None);

        let table = Arc::new(BindingTable::new());
        tree.set_bindings(root, Some(table.clone())).unwrap();
        assert_eq!(tree.bindings_override(root), Some(table));

        tree.set_bindings(root, None).unwrap();
        assert_eq!(tree.bindings_override(root), None);
    }
}
