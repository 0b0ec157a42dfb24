//! # Type-level binding inheritance
//!
//! ## Overview
//!
//! Node types form a single-inheritance hierarchy. Each type may declare its own bindings, and
//! chooses whether to inherit the bindings of its base type. [TypeHierarchy] computes each
//! type's *effective* table from those declarations:
//!
//! * A type that inherits gets its base type's effective table, with its own bindings merged on
//!   top. Its own binding wins when both bind the same key.
//! * A type that doesn't inherit gets exactly its own bindings. Nothing from its base types is
//!   kept, even when it declares no bindings at all.
//!
//! Effective tables are computed the first time they're requested and then shared. Declaring
//! new bindings for a type discards the cached tables for that type and every type derived
//! from it.
//!
//! ## Example
//!
//! ```
//! use keybindings::{Binding, TypeHierarchy};
//!
//! let mut types = TypeHierarchy::new();
//! let widget = types.register("Widget", None).unwrap();
//! let list = types.register("List", Some(widget)).unwrap();
//! let raw = types.register("RawList", Some(list)).unwrap();
//!
//! let tab = Binding::parse("tab", "focus_next", "Next").unwrap();
//! let up = Binding::parse("up", "cursor_up", "Up").unwrap();
//!
//! types.declare_bindings(widget, vec![tab], true).unwrap();
//! types.declare_bindings(list, vec![up], true).unwrap();
//! types.declare_bindings(raw, vec![], false).unwrap();
//!
//! assert_eq!(types.effective(list).unwrap().len(), 2);
//! assert!(types.effective(raw).unwrap().is_empty());
//! ```
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::binding::{Binding, BindingTable};

/// Errors returned by [TypeHierarchy].
#[derive(thiserror::Error, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum HierarchyError {
    /// A [TypeKey] that wasn't produced by this hierarchy.
    #[error("Unknown node type: {0:?}")]
    UnknownType(TypeKey),

    /// A type name that has already been registered.
    #[error("Node type {0:?} is already registered")]
    DuplicateName(String),
}

/// Identifies a type registered with a [TypeHierarchy].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeKey(usize);

impl TypeKey {
    /// The position of this type in registration order.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
struct TypeEntry {
    name: String,
    base: Option<TypeKey>,
    own: BindingTable,
    declared: bool,
    inherits: bool,
}

/// Tracks node types, their declared bindings, and their effective binding tables.
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    types: Vec<TypeEntry>,
    names: HashMap<String, TypeKey>,
    effective: RwLock<HashMap<TypeKey, Arc<BindingTable>>>,
}

impl TypeHierarchy {
    /// Create a new, empty hierarchy.
    pub fn new() -> Self {
        TypeHierarchy::default()
    }

    /// Register a new type, with an optional base type.
    ///
    /// New types inherit bindings and declare none until [TypeHierarchy::declare_bindings] or
    /// [TypeHierarchy::set_inherits] says otherwise. Since a base type must already be registered,
    /// the hierarchy can never contain a cycle.
    pub fn register<T: Into<String>>(
        &mut self,
        name: T,
        base: Option<TypeKey>,
    ) -> Result<TypeKey, HierarchyError> {
        let name = name.into();

        if self.names.contains_key(&name) {
            return Err(HierarchyError::DuplicateName(name));
        }

        if let Some(base) = base {
            self.entry(base)?;
        }

        let key = TypeKey(self.types.len());
        let entry = TypeEntry {
            name: name.clone(),
            base,
            own: BindingTable::new(),
            declared: false,
            inherits: true,
        };

        self.types.push(entry);
        self.names.insert(name, key);

        Ok(key)
    }

    /// Declare the bindings for a type, and whether it inherits its base type's bindings.
    ///
    /// This replaces any earlier declaration for the type.
    pub fn declare_bindings<I>(
        &mut self,
        ty: TypeKey,
        bindings: I,
        inherits: bool,
    ) -> Result<(), HierarchyError>
    where
        I: IntoIterator<Item = Binding>,
    {
        let entry = self.entry_mut(ty)?;
        entry.own = bindings.into_iter().collect();
        entry.declared = true;
        entry.inherits = inherits;

        self.invalidate(ty);

        Ok(())
    }

    /// Change whether a type inherits its base type's bindings, without declaring any bindings.
    pub fn set_inherits(&mut self, ty: TypeKey, inherits: bool) -> Result<(), HierarchyError> {
        self.entry_mut(ty)?.inherits = inherits;
        self.invalidate(ty);

        Ok(())
    }

    /// Get the effective binding table for a type.
    pub fn effective(&self, ty: TypeKey) -> Result<Arc<BindingTable>, HierarchyError> {
        if let Some(table) = self.cache().get(&ty) {
            trace!(ty = ty.0, "effective bindings cached");

            return Ok(table.clone());
        }

        let entry = self.entry(ty)?;

        let table = match (entry.inherits, entry.base) {
            (true, Some(base)) => {
                let mut table = (*self.effective(base)?).clone();
                table.merge(&entry.own);
                table
            },
            (true, None) | (false, _) => entry.own.clone(),
        };

        debug!(ty = %entry.name, keys = table.len(), "computed effective bindings");

        let table = self.cache_mut().entry(ty).or_insert_with(|| Arc::new(table)).clone();

        Ok(table)
    }

    /// Get the bindings that a type declares itself.
    pub fn own_bindings(&self, ty: TypeKey) -> Result<&BindingTable, HierarchyError> {
        Ok(&self.entry(ty)?.own)
    }

    /// Whether a type inherits its base type's bindings.
    pub fn inherits(&self, ty: TypeKey) -> Result<bool, HierarchyError> {
        Ok(self.entry(ty)?.inherits)
    }

    /// Whether bindings have been declared for a type, even if the declaration was empty.
    pub fn has_declaration(&self, ty: TypeKey) -> Result<bool, HierarchyError> {
        Ok(self.entry(ty)?.declared)
    }

    /// Get a type's base type.
    pub fn base(&self, ty: TypeKey) -> Result<Option<TypeKey>, HierarchyError> {
        Ok(self.entry(ty)?.base)
    }

    /// Get the name a type was registered under.
    pub fn name(&self, ty: TypeKey) -> Result<&str, HierarchyError> {
        Ok(self.entry(ty)?.name.as_str())
    }

    /// Find a type by name.
    pub fn lookup(&self, name: &str) -> Option<TypeKey> {
        self.names.get(name).copied()
    }

    /// Iterate over a type and then each of its base types, ending at a root type.
    pub fn ancestors(&self, ty: TypeKey) -> impl Iterator<Item = TypeKey> + '_ {
        let first = self.entry(ty).ok().map(|_| ty);

        std::iter::successors(first, move |t| self.types[t.0].base)
    }

    /// Whether `ty` is `ancestor` or derives from it.
    pub fn is_subtype(&self, ty: TypeKey, ancestor: TypeKey) -> bool {
        self.ancestors(ty).any(|t| t == ancestor)
    }

    /// The number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    fn entry(&self, ty: TypeKey) -> Result<&TypeEntry, HierarchyError> {
        self.types.get(ty.0).ok_or(HierarchyError::UnknownType(ty))
    }

    fn entry_mut(&mut self, ty: TypeKey) -> Result<&mut TypeEntry, HierarchyError> {
        self.types.get_mut(ty.0).ok_or(HierarchyError::UnknownType(ty))
    }

    fn invalidate(&self, ty: TypeKey) {
        let mut cache = self.cache_mut();
        let before = cache.len();

        cache.retain(|t, _| !self.is_subtype(*t, ty));

        trace!(ty = ty.0, dropped = before - cache.len(), "invalidated effective bindings");
    }

    fn cache(&self) -> RwLockReadGuard<'_, HashMap<TypeKey, Arc<BindingTable>>> {
        self.effective.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn cache_mut(&self) -> RwLockWriteGuard<'_, HashMap<TypeKey, Arc<BindingTable>>> {
        self.effective.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{KeySymbol, MOVEMENT_KEYS};
    use std::str::FromStr;

    fn bind(key: &str, action: &str) -> Binding {
        Binding::parse(key, action, key).unwrap()
    }

    fn keys(table: &BindingTable) -> Vec<String> {
        table.keys().map(ToString::to_string).collect()
    }

    fn action_for(table: &BindingTable, key: &str) -> Option<String> {
        let key = KeySymbol::from_str(key).unwrap();

        table.get(&key).map(|b| b.action.to_string())
    }

    fn movement(action: &str) -> Vec<Binding> {
        MOVEMENT_KEYS.iter().map(|k| bind(k, &format!("{action}('{k}')"))).collect()
    }

    #[test]
    fn test_register() {
        let mut types = TypeHierarchy::new();
        let root = types.register("Widget", None).unwrap();
        let child = types.register("Static", Some(root)).unwrap();

        assert_eq!(types.len(), 2);
        assert_eq!(types.name(child).unwrap(), "Static");
        assert_eq!(types.base(child).unwrap(), Some(root));
        assert_eq!(types.base(root).unwrap(), None);
        assert_eq!(types.lookup("Static"), Some(child));
        assert_eq!(types.lookup("Screen"), None);
        assert!(types.inherits(child).unwrap());
        assert!(!types.has_declaration(child).unwrap());

        assert_eq!(
            types.register("Static", Some(root)),
            Err(HierarchyError::DuplicateName("Static".into()))
        );
        assert_eq!(
            types.register("Orphan", Some(TypeKey(7))),
            Err(HierarchyError::UnknownType(TypeKey(7)))
        );
        assert_eq!(types.effective(TypeKey(7)), Err(HierarchyError::UnknownType(TypeKey(7))));
    }

    #[test]
    fn test_ancestry() {
        let mut types = TypeHierarchy::new();
        let a = types.register("A", None).unwrap();
        let b = types.register("B", Some(a)).unwrap();
        let c = types.register("C", Some(b)).unwrap();
        let d = types.register("D", Some(a)).unwrap();

        assert_eq!(types.ancestors(c).collect::<Vec<_>>(), vec![c, b, a]);
        assert_eq!(types.ancestors(TypeKey(99)).count(), 0);
        assert!(types.is_subtype(c, a));
        assert!(types.is_subtype(c, c));
        assert!(!types.is_subtype(c, d));
        assert!(!types.is_subtype(a, c));
    }

    #[test]
    fn test_root_without_base() {
        let mut types = TypeHierarchy::new();
        let app = types.register("App", None).unwrap();

        assert!(types.effective(app).unwrap().is_empty());

        types.declare_bindings(app, vec![bind("ctrl+c", "quit")], true).unwrap();
        assert_eq!(keys(&types.effective(app).unwrap()), vec!["ctrl+c"]);
    }

    #[test]
    fn test_inherit_merges_over_base() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Base", None).unwrap();
        let derived = types.register("Derived", Some(base)).unwrap();
        let leaf = types.register("Leaf", Some(derived)).unwrap();

        types.declare_bindings(base, vec![bind("a", "base_a"), bind("b", "base_b")], true).unwrap();
        types
            .declare_bindings(derived, vec![bind("b", "derived_b"), bind("c", "derived_c")], true)
            .unwrap();

        let table = types.effective(derived).unwrap();
        assert_eq!(keys(&table), vec!["a", "b", "c"]);
        assert_eq!(action_for(&table, "a").unwrap(), "base_a");
        assert_eq!(action_for(&table, "b").unwrap(), "derived_b");
        assert_eq!(action_for(&table, "c").unwrap(), "derived_c");

        // A type that declares nothing and inherits sees its base's table.
        assert_eq!(types.effective(leaf).unwrap(), table);
    }

    #[test]
    fn test_no_inherit_discards_base() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Static", None).unwrap();
        let own = types.register("OwnOnly", Some(base)).unwrap();

        types.declare_bindings(base, movement("scroll"), true).unwrap();
        types.declare_bindings(own, vec![bind("x", "local_record('x')")], false).unwrap();

        let table = types.effective(own).unwrap();
        assert_eq!(keys(&table), vec!["x"]);
        assert_eq!(*table, *types.own_bindings(own).unwrap());
    }

    #[test]
    fn test_no_inherit_empty_declaration() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Static", None).unwrap();
        let empty = types.register("EmptyNoInherit", Some(base)).unwrap();

        types.declare_bindings(base, movement("scroll"), true).unwrap();
        types.declare_bindings(empty, vec![], false).unwrap();

        assert!(types.has_declaration(empty).unwrap());
        assert!(types.effective(empty).unwrap().is_empty());
    }

    #[test]
    fn test_no_inherit_without_declaration() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Static", None).unwrap();
        let bare = types.register("BareNoInherit", Some(base)).unwrap();
        let bare_inherit = types.register("BareInherit", Some(base)).unwrap();

        types.declare_bindings(base, movement("scroll"), true).unwrap();
        types.set_inherits(bare, false).unwrap();

        // Declaring nothing is tracked separately from declaring an empty list...
        assert!(!types.has_declaration(bare).unwrap());
        assert!(!types.inherits(bare).unwrap());

        // ...but opting out of inheritance still never falls back to the base's declaration.
        assert!(types.effective(bare).unwrap().is_empty());

        // While a type that declares nothing and inherits gets the base's bindings.
        assert_eq!(types.effective(bare_inherit).unwrap().len(), 8);
    }

    #[test]
    fn test_memoized() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Base", None).unwrap();
        let derived = types.register("Derived", Some(base)).unwrap();

        types.declare_bindings(base, vec![bind("a", "a")], true).unwrap();

        let first = types.effective(derived).unwrap();
        let second = types.effective(derived).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_redeclare_invalidates_descendants() {
        let mut types = TypeHierarchy::new();
        let base = types.register("Base", None).unwrap();
        let derived = types.register("Derived", Some(base)).unwrap();
        let sibling = types.register("Sibling", None).unwrap();

        types.declare_bindings(base, vec![bind("a", "a")], true).unwrap();
        types.declare_bindings(sibling, vec![bind("s", "s")], true).unwrap();

        let before = types.effective(derived).unwrap();
        let sibling_before = types.effective(sibling).unwrap();
        assert_eq!(keys(&before), vec!["a"]);

        types.declare_bindings(base, vec![bind("a", "a"), bind("b", "b")], true).unwrap();

        let after = types.effective(derived).unwrap();
        assert_eq!(keys(&after), vec!["a", "b"]);
        assert!(!Arc::ptr_eq(&before, &after));

        // Unrelated types keep their cached tables.
        assert!(Arc::ptr_eq(&sibling_before, &types.effective(sibling).unwrap()));
    }

    #[test]
    fn test_no_inherit_in_the_middle() {
        let mut types = TypeHierarchy::new();
        let a = types.register("A", None).unwrap();
        let b = types.register("B", Some(a)).unwrap();
        let c = types.register("C", Some(b)).unwrap();

        types.declare_bindings(a, vec![bind("a", "a")], true).unwrap();
        types.declare_bindings(b, vec![bind("b", "b")], false).unwrap();
        types.declare_bindings(c, vec![bind("c", "c")], true).unwrap();

        // C inherits from B, whose effective table already dropped A's bindings.
        assert_eq!(keys(&types.effective(c).unwrap()), vec!["b", "c"]);
    }
}
