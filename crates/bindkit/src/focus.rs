//! # Focus chains
//!
//! ## Overview
//!
//! A [FocusChain] lists the nodes that get a chance to handle a key, starting with the focused
//! widget and ending with the application root. When no widget has focus, the chain starts at
//! the active screen.
//!
//! Chains aren't kept around: a new one is built for every key, so that focus changes made by
//! one action are seen by the next key.
use crate::node::NodeId;

/// The nodes from the focused leaf up to the application root.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FocusChain(Vec<NodeId>);

impl FocusChain {
    /// Create a chain from a leaf-first list of nodes.
    pub fn new(nodes: Vec<NodeId>) -> Self {
        FocusChain(nodes)
    }

    /// The nodes in the chain, leaf first.
    pub fn nodes(&self) -> &[NodeId] {
        self.0.as_slice()
    }

    /// The innermost node.
    pub fn leaf(&self) -> Option<NodeId> {
        self.0.first().copied()
    }

    /// The outermost node.
    pub fn root(&self) -> Option<NodeId> {
        self.0.last().copied()
    }

    /// The number of nodes in the chain.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<NodeId> for FocusChain {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        FocusChain(iter.into_iter().collect())
    }
}

/// Something that knows where input focus currently is.
pub trait FocusChainProvider {
    /// Build the chain for the current focus.
    fn current_chain(&self) -> FocusChain;
}
