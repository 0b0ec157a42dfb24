//! # Input sequencing
//!
//! ## Overview
//!
//! Keys are handled strictly one at a time. For each key, the application builds the current
//! [FocusChain](crate::focus::FocusChain), finds the innermost binding for the key, and then
//! dispatches its action and waits for it to finish before the next key is read. An action that
//! suspends, for example to wait on a timer, holds up the keys behind it, so the effects of a
//! sequence of keys always happen in the order the keys were pressed.
//!
//! ```text
//!           key, no binding
//!            ┌──────────┐
//!            │          ▼
//!         ┌──┴───┐  binding  ┌─────────────┐
//!   ─────►│ Idle ├──────────►│ Dispatching │
//!         └──────┘           └──────┬──────┘
//!            ▲   action finished    │
//!            └──────────────────────┘
//! ```
//!
//! A key that nothing in the chain binds is dropped, except for the configured quit key, which
//! exits the application when [Config::always_quit](crate::config::Config::always_quit) is set.
use std::str::FromStr;

use futures::stream::{Next, Stream, StreamExt};
use tracing::{debug_span, info, trace, warn, Instrument};

use keybindings::{ActionSpec, ChainResolver, KeySymbol};

use crate::action::{dispatch, ActionInvocation};
use crate::app::App;
use crate::errors::{ActionResult, AppResult};
use crate::focus::FocusChainProvider;
use crate::node::NodeId;

/// Whether the input loop is waiting for a key or for an action to finish.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum InputPhase {
    /// Waiting for the next key.
    #[default]
    Idle,

    /// Waiting for an action to finish.
    Dispatching,
}

/// What happened to a key.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// A binding matched, and its action ran to completion.
    Dispatched {
        /// The node whose binding matched.
        node: NodeId,

        /// The action that ran.
        action: ActionSpec,
    },

    /// Nothing in the focus chain binds the key.
    Unhandled,

    /// The quit key went unmatched, and the application is exiting anyway.
    Quit,
}

/// A source of keys for [App::run].
pub trait KeyInputSource: Stream<Item = KeySymbol> + Unpin {
    /// Wait for the next key, or `None` once the source is exhausted.
    fn next_key(&mut self) -> Next<'_, Self>
    where
        Self: Sized,
    {
        self.next()
    }
}

impl<T> KeyInputSource for T where T: Stream<Item = KeySymbol> + Unpin {}

impl<S: 'static> App<S> {
    /// Resolve a single key against the current focus chain and run its action.
    pub async fn process_key(&mut self, key: KeySymbol) -> ActionResult<KeyOutcome> {
        let span = debug_span!("key", key = %key);

        self.process_key_inner(key).instrument(span).await
    }

    async fn process_key_inner(&mut self, key: KeySymbol) -> ActionResult<KeyOutcome> {
        let chain = self.current_chain();
        let found = ChainResolver::new(&*self).resolve(chain.nodes(), &key);

        let Some(found) = found else {
            if self.types.always_quit() && &key == self.types.quit_key() {
                info!("quit key is unbound; exiting");
                self.exit();

                return Ok(KeyOutcome::Quit);
            }

            trace!("no binding for key");

            return Ok(KeyOutcome::Unhandled);
        };

        let node = found.node;
        let action = found.binding.action;
        let invocation = ActionInvocation::new(action.clone(), node).with_key(key);

        trace!(%node, depth = found.depth, "matched binding");

        self.phase = InputPhase::Dispatching;
        let res = dispatch(self, invocation).await;
        self.phase = InputPhase::Idle;

        res.map(|()| KeyOutcome::Dispatched { node, action })
    }

    async fn handle_key(&mut self, key: KeySymbol) -> ActionResult {
        match self.process_key(key).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "failed to dispatch key");

                Ok(())
            },
            Err(e) => Err(e),
        }
    }

    /// Process keys from `keys` until it runs out or the application exits.
    ///
    /// Errors raised while resolving an action are logged, and the loop moves on to the next
    /// key. Errors raised by an action's implementation stop the loop and are returned.
    pub async fn run<K: KeyInputSource>(&mut self, mut keys: K) -> ActionResult {
        while !self.is_exiting() {
            let Some(key) = keys.next_key().await else {
                break;
            };

            self.handle_key(key).await?;
        }

        Ok(())
    }

    /// Parse and process a sequence of keys, as if they'd been typed.
    pub async fn press(&mut self, keys: &[&str]) -> AppResult<()> {
        for key in keys {
            if self.is_exiting() {
                break;
            }

            let key = KeySymbol::from_str(key)?;
            self.handle_key(key).await?;
        }

        Ok(())
    }
}
