//! # Focus-chain resolution
//!
//! ## Overview
//!
//! When a key is pressed, the nodes between the focused leaf and the application root are
//! checked in order, and the first one whose table binds the key handles it. The walk is the
//! same for every key: movement keys get no special treatment, and a node with an empty table
//! simply passes the key on to its parent.
use std::collections::HashSet;
use std::sync::Arc;

use crate::binding::{Binding, BindingTable};
use crate::key::KeySymbol;

/// Provides the effective binding table for each node in a focus chain.
pub trait BindingLookup<N> {
    /// Get the table for a node, or `None` if the node no longer exists.
    fn bindings_for(&self, node: &N) -> Option<Arc<BindingTable>>;
}

/// The innermost binding found for a key.
#[derive(Clone, Debug, PartialEq)]
pub struct ChainMatch<N> {
    /// The node whose table contained the key.
    pub node: N,

    /// How many nodes were skipped before this one (0 for the focused leaf).
    pub depth: usize,

    /// The binding that matched.
    pub binding: Binding,
}

/// Walks focus chains looking for the innermost binding for a key.
pub struct ChainResolver<'a, L> {
    lookup: &'a L,
}

impl<'a, L> ChainResolver<'a, L> {
    /// Create a resolver that reads tables from `lookup`.
    pub fn new(lookup: &'a L) -> Self {
        ChainResolver { lookup }
    }

    /// Find the innermost binding for `key` in a leaf-first chain of nodes.
    pub fn resolve<N: Clone>(&self, chain: &[N], key: &KeySymbol) -> Option<ChainMatch<N>>
    where
        L: BindingLookup<N>,
    {
        for (depth, node) in chain.iter().enumerate() {
            let Some(table) = self.lookup.bindings_for(node) else {
                continue;
            };

            if let Some(binding) = table.get(key) {
                return Some(ChainMatch { node: node.clone(), depth, binding: binding.clone() });
            }
        }

        return None;
    }

    /// List the binding that would handle each key reachable from a chain.
    ///
    /// Keys are listed leaf-first, in declaration order within each node, and a key bound by
    /// several nodes is only listed for the innermost one.
    pub fn active<N: Clone>(&self, chain: &[N]) -> Vec<ChainMatch<N>>
    where
        L: BindingLookup<N>,
    {
        let mut seen = HashSet::new();
        let mut active = vec![];

        for (depth, node) in chain.iter().enumerate() {
            let Some(table) = self.lookup.bindings_for(node) else {
                continue;
            };

            for binding in table.iter() {
                if !seen.insert(binding.key.clone()) {
                    continue;
                }

                active.push(ChainMatch { node: node.clone(), depth, binding: binding.clone() });
            }
        }

        active
    }
}
