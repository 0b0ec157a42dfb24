//! # Bindings and binding tables
//!
//! ## Overview
//!
//! A [Binding] maps a [KeySymbol] to an [ActionSpec] within a single declaring scope, and a
//! [BindingTable] holds the bindings for one scope with at most one binding per key.
//!
//! Declaring a key a second time in the same table replaces the earlier binding. The
//! replacement keeps the position of the binding it replaced, so iterating over a table lists
//! keys in the order they were first declared.
use std::collections::HashMap;
use std::str::FromStr;

use tracing::debug;

use crate::action::{ActionSpec, ActionSpecError};
use crate::key::{KeyError, KeySymbol};

/// Errors that occur while building a [Binding] from strings.
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum BindingError {
    /// The key string was invalid.
    #[error("Invalid key: {0}")]
    Key(#[from] KeyError),

    /// The action string was invalid.
    #[error("Invalid action: {0}")]
    Action(#[from] ActionSpecError),
}

/// An association between a key and the action it triggers.
#[derive(Clone, Debug, PartialEq)]
pub struct Binding {
    /// The key that triggers this binding.
    pub key: KeySymbol,

    /// The action to run when the key is pressed.
    pub action: ActionSpec,

    /// A short, human-readable description of the action.
    pub description: String,

    /// Whether this binding should be listed in help text and footers.
    pub show: bool,
}

impl Binding {
    /// Create a new, visible binding.
    pub fn new<T: Into<String>>(key: KeySymbol, action: ActionSpec, description: T) -> Self {
        Binding { key, action, description: description.into(), show: true }
    }

    /// Parse a key string and an action string into a new, visible binding.
    pub fn parse(key: &str, action: &str, description: &str) -> Result<Self, BindingError> {
        let key = KeySymbol::from_str(key)?;
        let action = ActionSpec::from_str(action)?;

        Ok(Binding::new(key, action, description))
    }

    /// Hide this binding from help text and footers.
    pub fn hidden(mut self) -> Self {
        self.show = false;
        self
    }
}

/// The bindings declared by one scope, with at most one binding per key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BindingTable {
    bindings: Vec<Binding>,
    index: HashMap<KeySymbol, usize>,
}

impl BindingTable {
    /// Create a new, empty table.
    pub fn new() -> Self {
        BindingTable::default()
    }

    /// Add a binding to this table.
    ///
    /// If the key is already bound, the new binding takes the old one's place and the old one is
    /// returned.
    pub fn insert(&mut self, binding: Binding) -> Option<Binding> {
        if let Some(&idx) = self.index.get(&binding.key) {
            debug!(key = %binding.key, action = %binding.action, "overriding earlier binding");

            return Some(std::mem::replace(&mut self.bindings[idx], binding));
        }

        self.index.insert(binding.key.clone(), self.bindings.len());
        self.bindings.push(binding);

        return None;
    }

    /// Insert every binding from another table, in its order, replacing any bindings here for the
    /// same keys.
    pub fn merge(&mut self, other: &BindingTable) {
        for binding in other.iter() {
            self.insert(binding.clone());
        }
    }

    /// Get the binding for a key.
    pub fn get(&self, key: &KeySymbol) -> Option<&Binding> {
        self.index.get(key).map(|&idx| &self.bindings[idx])
    }

    /// Whether this table has a binding for a key.
    pub fn contains(&self, key: &KeySymbol) -> bool {
        self.index.contains_key(key)
    }

    /// Iterate over the bound keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &KeySymbol> {
        self.bindings.iter().map(|b| &b.key)
    }

    /// Iterate over the bindings, in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding> {
        self.bindings.iter()
    }

    /// Iterate over the bindings that should be listed in help text and footers.
    pub fn shown(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter().filter(|b| b.show)
    }

    /// The number of bound keys.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether this table has no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<Binding> for BindingTable {
    fn from_iter<T: IntoIterator<Item = Binding>>(iter: T) -> Self {
        let mut table = BindingTable::new();
        table.extend(iter);
        table
    }
}

impl Extend<Binding> for BindingTable {
    fn extend<T: IntoIterator<Item = Binding>>(&mut self, iter: T) {
        for binding in iter {
            self.insert(binding);
        }
    }
}

impl<'a> IntoIterator for &'a BindingTable {
    type Item = &'a Binding;
    type IntoIter = std::slice::Iter<'a, Binding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}
