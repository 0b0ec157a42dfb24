//! # Configuration
//!
//! ## Overview
//!
//! User-facing settings, loaded from JSON. Every field has a default, so an empty object is a
//! valid configuration:
//!
//! ```
//! use bindkit::config::Config;
//!
//! let config = Config::from_json(r#"{
//!     "quit_key": "ctrl+q",
//!     "keymap": {
//!         "Viewer": [
//!             {"key": "j", "action": "scroll_down", "description": "Down"},
//!             {"key": "g", "action": "scroll_home", "show": false}
//!         ]
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(config.quit_key().unwrap().to_string(), "ctrl+q");
//! assert!(config.always_quit);
//! assert_eq!(config.keymap["Viewer"].len(), 2);
//!
//! assert_eq!(Config::from_json("{}").unwrap(), Config::default());
//! ```
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use keybindings::{Binding, BindingError, KeySymbol};

use crate::errors::ConfigError;

fn default_show() -> bool {
    true
}

/// A binding listed in the configuration file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    /// The key to bind.
    pub key: String,

    /// The action to run, in the same syntax as declared bindings.
    pub action: String,

    /// A short description for help text and footers.
    #[serde(default)]
    pub description: String,

    /// Whether to list the binding in help text and footers.
    #[serde(default = "default_show")]
    pub show: bool,
}

impl BindingConfig {
    /// Parse this entry into a [Binding].
    pub fn to_binding(&self) -> Result<Binding, BindingError> {
        let binding = Binding::parse(&self.key, &self.action, &self.description)?;

        if self.show {
            Ok(binding)
        } else {
            Ok(binding.hidden())
        }
    }
}

/// Application settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The key bound to `quit` on the built-in application type.
    pub quit_key: String,

    /// Exit when the quit key is pressed, even if nothing in the focus chain binds it.
    pub always_quit: bool,

    /// Extra bindings for node types, by type name.
    ///
    /// These are declared after the type's own bindings, and replace them for the same key.
    pub keymap: BTreeMap<String, Vec<BindingConfig>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            quit_key: String::from("ctrl+c"),
            always_quit: true,
            keymap: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;

        Config::from_json(&text)
    }

    /// Parse and validate a configuration string.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;

        Ok(config)
    }

    /// Check that the quit key and every keymap entry can be parsed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.quit_key()?;
        self.keymap_bindings()?;

        Ok(())
    }

    /// The parsed quit key.
    pub fn quit_key(&self) -> Result<KeySymbol, ConfigError> {
        KeySymbol::from_str(&self.quit_key).map_err(ConfigError::QuitKey)
    }

    /// The parsed keymap.
    pub fn keymap_bindings(&self) -> Result<BTreeMap<String, Vec<Binding>>, ConfigError> {
        let mut keymap = BTreeMap::new();

        for (ty, entries) in self.keymap.iter() {
            let bindings = entries
                .iter()
                .map(BindingConfig::to_binding)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ConfigError::Binding { ty: ty.clone(), source })?;

            keymap.insert(ty.clone(), bindings);
        }

        Ok(keymap)
    }
}
