//! # Node types
//!
//! ## Overview
//!
//! A node type is declared once, with a [NodeType] builder, and registered with [NodeTypes].
//! Registration records:
//!
//! * the type's declared bindings, and whether it inherits its base type's bindings, in the
//!   underlying [TypeHierarchy];
//! * the actions nodes of the type provide, flattened together with the actions of every base
//!   type so that dispatch only needs a single lookup;
//! * whether nodes of the type can receive focus, what to do when one is mounted, and, for
//!   application types, which screens can be pushed by name.
//!
//! Three types are always present. `App` binds the configured quit key to its `quit` action,
//! and also provides `bell`, `push_screen(name)` and `pop_screen`. `Screen` provides
//! `focus_next` and `focus_previous`, and `Widget` provides nothing. Neither `Screen` nor
//! `Widget` declares any bindings, so a key only reaches an action if something bound it.
//!
//! Bindings listed for a type in the [Config] keymap are declared after the type's own, and so
//! replace them when they bind the same key. This applies to the built-in types too, and is
//! repeated whenever a type's bindings are redeclared.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use tracing::debug;

use keybindings::{
    ActionSpec,
    Binding,
    BindingError,
    BindingTable,
    HierarchyError,
    KeySymbol,
    TypeHierarchy,
    TypeKey,
};

use crate::action::ActionCall;
use crate::app::App;
use crate::builtin;
use crate::config::Config;
use crate::errors::{ActionResult, AppResult, TypeError};
use crate::node::{NodeId, NodeKind};

/// Identifies a registered node type.
pub type NodeTypeId = TypeKey;

/// The implementation of an action.
///
/// Handlers get exclusive access to the application for as long as they run, including while
/// they're suspended, and no other key is processed until they finish.
pub type ActionHandler<S> =
    for<'a> fn(&'a mut App<S>, ActionCall) -> LocalBoxFuture<'a, ActionResult>;

/// A function run after a node has been mounted.
pub type MountHook<S> = fn(&mut App<S>, NodeId) -> AppResult<()>;

/// How many arguments an action accepts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    /// Accept no arguments.
    pub const NONE: Arity = Arity::exact(0);

    /// Accept exactly `n` arguments.
    pub const fn exact(n: usize) -> Self {
        Arity { min: n, max: Some(n) }
    }

    /// Accept `n` or more arguments.
    pub const fn at_least(n: usize) -> Self {
        Arity { min: n, max: None }
    }

    /// Accept between `min` and `max` arguments, inclusive.
    pub const fn range(min: usize, max: usize) -> Self {
        Arity { min, max: Some(max) }
    }

    /// Whether `n` arguments are acceptable.
    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

/// A registered action.
pub struct ActionEntry<S> {
    /// The arguments the action accepts.
    pub arity: Arity,

    /// The action's implementation.
    pub handler: ActionHandler<S>,
}

impl<S> Clone for ActionEntry<S> {
    fn clone(&self) -> Self {
        ActionEntry { arity: self.arity, handler: self.handler }
    }
}

impl<S> fmt::Debug for ActionEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionEntry").field("arity", &self.arity).finish_non_exhaustive()
    }
}

/// Describes a node type to register with [NodeTypes].
pub struct NodeType<S> {
    name: String,
    base: NodeTypeId,
    bindings: Option<Vec<Binding>>,
    inherits: bool,
    can_focus: Option<bool>,
    actions: HashMap<String, ActionEntry<S>>,
    on_mount: Option<MountHook<S>>,
    screens: HashMap<String, NodeTypeId>,
    error: Option<BindingError>,
}

impl<S> NodeType<S> {
    /// Start describing a type named `name` that derives from `base`.
    ///
    /// Unless told otherwise, the new type inherits its base's bindings, focusability, mount
    /// hook, actions and named screens.
    pub fn new<T: Into<String>>(name: T, base: NodeTypeId) -> Self {
        NodeType {
            name: name.into(),
            base,
            bindings: None,
            inherits: true,
            can_focus: None,
            actions: HashMap::new(),
            on_mount: None,
            screens: HashMap::new(),
            error: None,
        }
    }

    /// Declare a binding from key and action strings.
    ///
    /// Strings that fail to parse are reported when the type is registered.
    pub fn bind(mut self, key: &str, action: &str, description: &str) -> Self {
        match Binding::parse(key, action, description) {
            Ok(binding) => self.binding(binding),
            Err(e) => {
                self.error.get_or_insert(e);
                self
            },
        }
    }

    /// Declare a binding.
    pub fn binding(mut self, binding: Binding) -> Self {
        self.bindings.get_or_insert_with(Vec::new).push(binding);
        self
    }

    /// Declare a list of bindings.
    ///
    /// Declaring an empty list is different from declaring nothing: a type that doesn't inherit
    /// and declares an empty list has no bindings at all.
    pub fn bindings<I: IntoIterator<Item = Binding>>(mut self, bindings: I) -> Self {
        self.bindings.get_or_insert_with(Vec::new).extend(bindings);
        self
    }

    /// Control whether this type's bindings are merged over its base type's.
    pub fn inherit_bindings(mut self, inherits: bool) -> Self {
        self.inherits = inherits;
        self
    }

    /// Control whether widgets of this type can receive focus.
    pub fn can_focus(mut self, can_focus: bool) -> Self {
        self.can_focus = Some(can_focus);
        self
    }

    /// Provide an action, replacing any inherited action with the same name.
    pub fn action<T: Into<String>>(
        mut self,
        name: T,
        arity: Arity,
        handler: ActionHandler<S>,
    ) -> Self {
        self.actions.insert(name.into(), ActionEntry { arity, handler });
        self
    }

    /// Run a hook after each node of this type is mounted.
    pub fn on_mount(mut self, hook: MountHook<S>) -> Self {
        self.on_mount = Some(hook);
        self
    }

    /// Make a screen type available to `push_screen` under a name.
    pub fn screen<T: Into<String>>(mut self, name: T, ty: NodeTypeId) -> Self {
        self.screens.insert(name.into(), ty);
        self
    }
}

struct TypeInfo<S> {
    kind: NodeKind,
    can_focus: bool,
    actions: HashMap<String, ActionEntry<S>>,
    on_mount: Option<MountHook<S>>,
    screens: HashMap<String, NodeTypeId>,
}

/// The node types available to an application.
pub struct NodeTypes<S> {
    hierarchy: TypeHierarchy,
    info: Vec<TypeInfo<S>>,
    keymap: BTreeMap<String, Vec<Binding>>,
    quit_key: KeySymbol,
    always_quit: bool,

    app: NodeTypeId,
    screen: NodeTypeId,
    widget: NodeTypeId,
}

impl<S: 'static> NodeTypes<S> {
    /// Create the built-in types, using the quit key and keymap from `config`.
    pub fn new(config: &Config) -> AppResult<Self> {
        let quit_key = config.quit_key()?;
        let keymap = config.keymap_bindings()?;
        let quit = Binding::new(quit_key.clone(), ActionSpec::new("quit"), "Quit").hidden();

        let mut hierarchy = TypeHierarchy::new();
        let mut info = vec![];

        let app = hierarchy.register("App", None).map_err(TypeError::from)?;
        let app_bindings = std::iter::once(quit).chain(configured(&keymap, "App"));
        hierarchy.declare_bindings(app, app_bindings, true).map_err(TypeError::from)?;
        info.push(TypeInfo {
            kind: NodeKind::App,
            can_focus: false,
            actions: HashMap::from([
                builtin_action("quit", Arity::NONE, builtin::quit::<S>),
                builtin_action("bell", Arity::NONE, builtin::bell::<S>),
                builtin_action("push_screen", Arity::exact(1), builtin::push_screen::<S>),
                builtin_action("pop_screen", Arity::NONE, builtin::pop_screen::<S>),
            ]),
            on_mount: None,
            screens: HashMap::new(),
        });

        let screen = hierarchy.register("Screen", None).map_err(TypeError::from)?;
        info.push(TypeInfo {
            kind: NodeKind::Screen,
            can_focus: false,
            actions: HashMap::from([
                builtin_action("focus_next", Arity::NONE, builtin::focus_next::<S>),
                builtin_action("focus_previous", Arity::NONE, builtin::focus_previous::<S>),
            ]),
            on_mount: None,
            screens: HashMap::new(),
        });

        let widget = hierarchy.register("Widget", None).map_err(TypeError::from)?;
        info.push(TypeInfo {
            kind: NodeKind::Widget,
            can_focus: false,
            actions: HashMap::new(),
            on_mount: None,
            screens: HashMap::new(),
        });

        for (ty, name) in [(screen, "Screen"), (widget, "Widget")] {
            if keymap.contains_key(name) {
                let bindings = configured(&keymap, name);

                hierarchy.declare_bindings(ty, bindings, true).map_err(TypeError::from)?;
            }
        }

        let types = NodeTypes {
            hierarchy,
            info,
            keymap,
            quit_key,
            always_quit: config.always_quit,
            app,
            screen,
            widget,
        };

        Ok(types)
    }

    /// Register a new node type.
    pub fn register(&mut self, def: NodeType<S>) -> Result<NodeTypeId, TypeError> {
        if let Some(source) = def.error {
            return Err(TypeError::Binding { ty: def.name, source });
        }

        let base = self.info(def.base)?;
        let mut actions = base.actions.clone();
        let mut screens = base.screens.clone();
        let kind = base.kind;
        let can_focus = def.can_focus.unwrap_or(base.can_focus);
        let on_mount = def.on_mount.or(base.on_mount);

        actions.extend(def.actions);
        screens.extend(def.screens);

        let ty = self.hierarchy.register(def.name.as_str(), Some(def.base))?;
        let configured = self.keymap.get(&def.name).cloned();

        match (def.bindings, configured) {
            (None, None) => {
                self.hierarchy.set_inherits(ty, def.inherits)?;
            },
            (own, configured) => {
                let bindings = own.into_iter().flatten().chain(configured.into_iter().flatten());

                self.hierarchy.declare_bindings(ty, bindings, def.inherits)?;
            },
        }

        self.info.push(TypeInfo { kind, can_focus, actions, on_mount, screens });

        debug!(ty = %def.name, %kind, inherits = def.inherits, "registered node type");

        Ok(ty)
    }

    /// Replace the bindings declared for a type that's already registered.
    ///
    /// The type's keymap entries from the [Config] are declared again after `bindings`.
    /// Effective tables for the type and everything derived from it are recomputed on their
    /// next use.
    pub fn declare_bindings<I>(
        &mut self,
        ty: NodeTypeId,
        bindings: I,
        inherits: bool,
    ) -> Result<(), TypeError>
    where
        I: IntoIterator<Item = Binding>,
    {
        let name = self.hierarchy.name(ty)?;
        let bindings = bindings.into_iter().chain(configured(&self.keymap, name));

        self.hierarchy.declare_bindings(ty, bindings, inherits)?;

        Ok(())
    }

    /// The type names in the [Config] keymap that don't match any registered type.
    pub fn unknown_keymap_types(&self) -> Vec<&str> {
        self.keymap
            .keys()
            .map(String::as_str)
            .filter(|name| self.hierarchy.lookup(name).is_none())
            .collect()
    }

    fn info(&self, ty: NodeTypeId) -> Result<&TypeInfo<S>, TypeError> {
        let info = self.info.get(ty.index());

        info.ok_or(TypeError::Hierarchy(HierarchyError::UnknownType(ty)))
    }

    /// The built-in application type.
    pub fn app_type(&self) -> NodeTypeId {
        self.app
    }

    /// The built-in screen type.
    pub fn screen_type(&self) -> NodeTypeId {
        self.screen
    }

    /// The built-in widget type.
    pub fn widget_type(&self) -> NodeTypeId {
        self.widget
    }

    /// The key bound to `quit` on the built-in application type.
    pub fn quit_key(&self) -> &KeySymbol {
        &self.quit_key
    }

    /// Whether the quit key should exit even when nothing in the focus chain binds it.
    pub fn always_quit(&self) -> bool {
        self.always_quit
    }

    /// The hierarchy holding every type's declared bindings.
    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// The effective bindings for a type.
    pub fn effective(&self, ty: NodeTypeId) -> Result<Arc<BindingTable>, TypeError> {
        Ok(self.hierarchy.effective(ty)?)
    }

    /// Look up a type by name.
    pub fn lookup(&self, name: &str) -> Option<NodeTypeId> {
        self.hierarchy.lookup(name)
    }

    /// The name a type was registered under.
    pub fn name(&self, ty: NodeTypeId) -> Result<&str, TypeError> {
        Ok(self.hierarchy.name(ty)?)
    }

    /// Whether `ty` is `ancestor` or derives from it.
    pub fn is_subtype(&self, ty: NodeTypeId, ancestor: NodeTypeId) -> bool {
        self.hierarchy.is_subtype(ty, ancestor)
    }

    /// The kind of node a type creates.
    pub fn kind(&self, ty: NodeTypeId) -> Option<NodeKind> {
        self.info(ty).ok().map(|i| i.kind)
    }

    /// Whether widgets of this type can receive focus.
    pub fn can_focus(&self, ty: NodeTypeId) -> bool {
        self.info(ty).map(|i| i.can_focus).unwrap_or(false)
    }

    /// Look up an action provided by a type.
    pub fn action(&self, ty: NodeTypeId, name: &str) -> Option<&ActionEntry<S>> {
        self.info(ty).ok()?.actions.get(name)
    }

    /// The hook to run when a node of this type is mounted.
    pub fn on_mount(&self, ty: NodeTypeId) -> Option<MountHook<S>> {
        self.info(ty).ok()?.on_mount
    }

    /// Look up a screen type installed under a name on an application type.
    pub fn named_screen(&self, ty: NodeTypeId, name: &str) -> Option<NodeTypeId> {
        self.info(ty).ok()?.screens.get(name).copied()
    }
}

fn configured(keymap: &BTreeMap<String, Vec<Binding>>, name: &str) -> Vec<Binding> {
    keymap.get(name).cloned().unwrap_or_default()
}

fn builtin_action<S>(
    name: &str,
    arity: Arity,
    handler: ActionHandler<S>,
) -> (String, ActionEntry<S>) {
    (name.to_string(), ActionEntry { arity, handler })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn noop(_: &mut App<()>, _: ActionCall) -> LocalBoxFuture<'_, ActionResult> {
        async { Ok(()) }.boxed_local()
    }

    fn setup() -> NodeTypes<()> {
        NodeTypes::new(&Config::default()).unwrap()
    }

    fn keys(types: &NodeTypes<()>, ty: NodeTypeId) -> Vec<String> {
        types.effective(ty).unwrap().keys().map(ToString::to_string).collect()
    }

    #[test]
    fn test_arity() {
        assert!(Arity::NONE.accepts(0));
        assert!(!Arity::NONE.accepts(1));
        assert!(Arity::at_least(1).accepts(5));
        assert!(!Arity::at_least(1).accepts(0));
        assert!(Arity::range(1, 2).accepts(2));
        assert!(!Arity::range(1, 2).accepts(3));

        assert_eq!(Arity::exact(1).to_string(), "1");
        assert_eq!(Arity::range(1, 3).to_string(), "1 to 3");
        assert_eq!(Arity::at_least(2).to_string(), "at least 2");
    }

    #[test]
    fn test_builtins() {
        let types = setup();

        assert_eq!(keys(&types, types.app_type()), vec!["ctrl+c"]);
        assert!(keys(&types, types.screen_type()).is_empty());
        assert!(keys(&types, types.widget_type()).is_empty());

        assert_eq!(types.kind(types.app_type()), Some(NodeKind::App));
        assert_eq!(types.kind(types.screen_type()), Some(NodeKind::Screen));
        assert_eq!(types.kind(types.widget_type()), Some(NodeKind::Widget));

        assert!(types.action(types.app_type(), "quit").is_some());
        assert_eq!(types.action(types.app_type(), "push_screen").unwrap().arity, Arity::exact(1));
        assert!(types.action(types.screen_type(), "focus_next").is_some());
        assert!(types.action(types.widget_type(), "quit").is_none());
        assert!(!types.can_focus(types.widget_type()));

        // The quit binding is declared, but kept out of footers.
        let app = types.effective(types.app_type()).unwrap();
        assert_eq!(app.shown().count(), 0);
    }

    #[test]
    fn test_register_flattens_actions() {
        let mut types = setup();
        let button = NodeType::new("Button", types.widget_type())
            .can_focus(true)
            .action("press", Arity::NONE, noop);
        let button = types.register(button).unwrap();

        let danger = NodeType::new("DangerButton", button).action("confirm", Arity::exact(1), noop);
        let danger = types.register(danger).unwrap();

        assert!(types.action(danger, "press").is_some());
        assert!(types.action(danger, "confirm").is_some());
        assert!(types.action(button, "confirm").is_none());
        assert!(types.can_focus(danger));
        assert_eq!(types.kind(danger), Some(NodeKind::Widget));
        assert!(types.is_subtype(danger, types.widget_type()));
        assert_eq!(types.lookup("DangerButton"), Some(danger));
        assert_eq!(types.name(danger), Ok("DangerButton"));
    }

    #[test]
    fn test_register_bindings() {
        let mut types = setup();
        let app = NodeType::new("MyApp", types.app_type()).bind("a", "a", "a");
        let app = types.register(app).unwrap();
        assert_eq!(keys(&types, app), vec!["ctrl+c", "a"]);

        let bare = NodeType::new("BareApp", types.app_type()).inherit_bindings(false);
        let bare = types.register(bare).unwrap();
        assert!(keys(&types, bare).is_empty());
        assert!(!types.hierarchy().has_declaration(bare).unwrap());

        let empty = NodeType::new("EmptyApp", types.app_type())
            .bindings(vec![])
            .inherit_bindings(false);
        let empty = types.register(empty).unwrap();
        assert!(keys(&types, empty).is_empty());
        assert!(types.hierarchy().has_declaration(empty).unwrap());
    }

    #[test]
    fn test_register_errors() {
        let mut types = setup();

        let res = types.register(NodeType::new("Broken", types.widget_type()).bind("", "x", ""));
        assert!(matches!(res, Err(TypeError::Binding { ty, .. }) if ty == "Broken"));

        types.register(NodeType::new("Dup", types.widget_type())).unwrap();
        let res = types.register(NodeType::new("Dup", types.widget_type()));
        assert!(matches!(res, Err(TypeError::Hierarchy(_))));
    }

    #[test]
    fn test_keymap_overrides() {
        let config = Config::from_json(
            r#"{"keymap": {"Viewer": [
                {"key": "j", "action": "scroll_down"},
                {"key": "q", "action": "app.quit"}
            ]}}"#,
        )
        .unwrap();
        let mut types: NodeTypes<()> = NodeTypes::new(&config).unwrap();

        let viewer = NodeType::new("Viewer", types.widget_type())
            .bind("j", "down", "Down")
            .bind("k", "up", "Up");
        let viewer = types.register(viewer).unwrap();
        let table = types.effective(viewer).unwrap();

        let actions: Vec<_> =
            table.iter().map(|b| (b.key.to_string(), b.action.to_string())).collect();
        assert_eq!(actions, vec![
            ("j".to_string(), "scroll_down".to_string()),
            ("k".to_string(), "up".to_string()),
            ("q".to_string(), "app.quit".to_string()),
        ]);

        // Keymap entries count as a declaration even if the type declared nothing itself.
        let config =
            Config::from_json(r#"{"keymap": {"Plain": [{"key": "x", "action": "x"}]}}"#).unwrap();
        let mut types: NodeTypes<()> = NodeTypes::new(&config).unwrap();
        let plain = types.register(NodeType::new("Plain", types.widget_type())).unwrap();
        assert_eq!(keys(&types, plain), vec!["x"]);
    }

    #[test]
    fn test_custom_quit_key() {
        let config = Config { quit_key: "ctrl+q".into(), ..Config::default() };
        let types: NodeTypes<()> = NodeTypes::new(&config).unwrap();

        assert_eq!(keys(&types, types.app_type()), vec!["ctrl+q"]);
        assert_eq!(types.quit_key().to_string(), "ctrl+q");
    }

    #[test]
    fn test_redeclare_live_type() {
        let mut types = setup();
        let list = NodeType::new("List", types.widget_type()).bind("up", "up", "");
        let list = types.register(list).unwrap();
        let sub = types.register(NodeType::new("SubList", list)).unwrap();
        assert_eq!(keys(&types, sub), vec!["up"]);

        let down = Binding::parse("down", "down", "").unwrap();
        types.declare_bindings(list, vec![down], true).unwrap();
        assert_eq!(keys(&types, sub), vec!["down"]);
    }

    #[test]
    fn test_keymap_builtins() {
        let config = Config::from_json(
            r#"{"keymap": {
                "App": [{"key": "q", "action": "quit"}],
                "Screen": [{"key": "tab", "action": "focus_next"}]
            }}"#,
        )
        .unwrap();
        let mut types: NodeTypes<()> = NodeTypes::new(&config).unwrap();

        assert_eq!(keys(&types, types.app_type()), vec!["ctrl+c", "q"]);
        assert_eq!(keys(&types, types.screen_type()), vec!["tab"]);
        assert!(keys(&types, types.widget_type()).is_empty());
        assert!(!types.hierarchy().has_declaration(types.widget_type()).unwrap());

        // Derived types pick up the configured bindings through inheritance.
        let app = types.register(NodeType::new("MyApp", types.app_type())).unwrap();
        assert_eq!(keys(&types, app), vec!["ctrl+c", "q"]);
    }

    #[test]
    fn test_keymap_survives_redeclare() {
        let config =
            Config::from_json(r#"{"keymap": {"Viewer": [{"key": "j", "action": "down"}]}}"#)
                .unwrap();
        let mut types: NodeTypes<()> = NodeTypes::new(&config).unwrap();
        let viewer = NodeType::new("Viewer", types.widget_type()).bind("k", "up", "");
        let viewer = types.register(viewer).unwrap();
        assert_eq!(keys(&types, viewer), vec!["k", "j"]);

        let up = Binding::parse("k", "scroll_up", "").unwrap();
        types.declare_bindings(viewer, vec![up], true).unwrap();
        assert_eq!(keys(&types, viewer), vec!["k", "j"]);

        let table = types.effective(viewer).unwrap();
        assert_eq!(table.get(&KeySymbol::char('k')).unwrap().action.name(), "scroll_up");
    }

    #[test]
    fn test_unknown_keymap_types() {
        let config = Config::from_json(
            r#"{"keymap": {
                "Viewer": [{"key": "j", "action": "down"}],
                "Viwer": [{"key": "k", "action": "up"}],
                "App": [{"key": "q", "action": "quit"}]
            }}"#,
        )
        .unwrap();
        let mut types: NodeTypes<()> = NodeTypes::new(&config).unwrap();
        assert_eq!(types.unknown_keymap_types(), vec!["Viewer", "Viwer"]);

        types.register(NodeType::new("Viewer", types.widget_type())).unwrap();
        assert_eq!(types.unknown_keymap_types(), vec!["Viwer"]);
    }
}
