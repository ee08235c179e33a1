//! Event registry - one dispatcher per event name

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::args::{ArgKind, EventArgs};
use super::dispatcher::EventDispatcher;
use super::names;
use super::types::{Dispatch, PayloadSlot};
use crate::error::EventError;

use ArgKind::*;

/// Built-in events: name, argument shape, replaceable payload
const BUILTIN_EVENTS: &[(&str, &[ArgKind], PayloadSlot)] = &[
    (names::CONSOLE_PRINT, &[Text], PayloadSlot::Text(0)),
    (names::COMMAND, &[Player, Command, Text], PayloadSlot::None),
    (names::CLIENT_COMMAND, &[Player, Text], PayloadSlot::Text(1)),
    (names::SERVER_COMMAND, &[OptPlayer, Text], PayloadSlot::Text(1)),
    (names::FRAME, &[], PayloadSlot::None),
    (names::SET_CONFIGSTRING, &[Int, Text], PayloadSlot::Text(1)),
    (names::CHAT, &[Player, Text, Channel], PayloadSlot::Text(1)),
    (names::UNLOAD, &[Text], PayloadSlot::None),
    (names::PLAYER_CONNECT, &[Player], PayloadSlot::None),
    (names::PLAYER_LOADED, &[Player], PayloadSlot::None),
    (names::PLAYER_DISCONNECT, &[Player, Text], PayloadSlot::None),
    (names::PLAYER_SPAWN, &[Player], PayloadSlot::None),
    (names::KAMIKAZE_USE, &[Player], PayloadSlot::None),
    (names::KAMIKAZE_EXPLODE, &[Player, Bool], PayloadSlot::None),
    (names::STATS, &[Json], PayloadSlot::None),
    (names::VOTE_CALLED, &[Player, Text, Text], PayloadSlot::None),
    (names::VOTE_STARTED, &[OptPlayer, Text, Text], PayloadSlot::None),
    (names::VOTE_ENDED, &[Int, Int, Text, Text, Bool], PayloadSlot::None),
    (names::VOTE, &[Player, Bool], PayloadSlot::None),
    (names::GAME_COUNTDOWN, &[], PayloadSlot::None),
    (names::GAME_START, &[Json], PayloadSlot::None),
    (names::GAME_END, &[Json], PayloadSlot::None),
    (names::ROUND_COUNTDOWN, &[Int], PayloadSlot::None),
    (names::ROUND_START, &[Int], PayloadSlot::None),
    (names::ROUND_END, &[Json], PayloadSlot::None),
    (names::TEAM_SWITCH, &[Player, Text, Text], PayloadSlot::None),
    (names::TEAM_SWITCH_ATTEMPT, &[Player, Text, Text], PayloadSlot::None),
    (names::MAP, &[Text, Text], PayloadSlot::None),
    (names::NEW_GAME, &[], PayloadSlot::None),
    (names::KILL, &[OptPlayer, Player, Json], PayloadSlot::None),
    (names::DEATH, &[OptPlayer, OptPlayer, Json], PayloadSlot::None),
    (names::USERINFO, &[Player, Vars], PayloadSlot::Vars(1)),
    (names::DAMAGE, &[Target, Target, Int, Int, Int], PayloadSlot::None),
];

/// Whether `name` is one of the built-in events
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_EVENTS.iter().any(|(builtin, _, _)| *builtin == name)
}

/// Registry of event dispatchers
pub struct EventRegistry {
    dispatchers: RwLock<HashMap<String, Arc<EventDispatcher>>>,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EventRegistry {
    /// Create a registry holding every built-in event
    pub fn new() -> Self {
        let registry = Self::empty();
        for (name, signature, payload) in BUILTIN_EVENTS {
            let dispatcher = EventDispatcher::new(*name, signature, *payload);
            registry
                .dispatchers
                .write()
                .insert(name.to_string(), Arc::new(dispatcher));
        }
        registry
    }

    /// Create a registry with no events
    pub fn empty() -> Self {
        Self {
            dispatchers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a dispatcher under its name
    pub fn register(&self, dispatcher: EventDispatcher) -> Result<Arc<EventDispatcher>, EventError> {
        dispatcher.validate()?;

        let mut dispatchers = self.dispatchers.write();
        if dispatchers.contains_key(dispatcher.name()) {
            return Err(EventError::DuplicateEvent(dispatcher.name().to_string()));
        }

        let dispatcher = Arc::new(dispatcher);
        dispatchers.insert(dispatcher.name().to_string(), dispatcher.clone());
        tracing::debug!("Registered event: {}", dispatcher.name());
        Ok(dispatcher)
    }

    /// Get the dispatcher for an event
    pub fn lookup(&self, name: &str) -> Result<Arc<EventDispatcher>, EventError> {
        self.dispatchers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| EventError::UnknownEvent(name.to_string()))
    }

    /// Remove a custom event. Built-in events cannot be removed.
    pub fn unregister(&self, name: &str) -> Result<(), EventError> {
        if is_builtin(name) {
            return Err(EventError::InvalidDispatcher {
                name: name.to_string(),
                reason: "built-in events cannot be unregistered".to_string(),
            });
        }

        match self.dispatchers.write().remove(name) {
            Some(_) => {
                tracing::debug!("Unregistered event: {}", name);
                Ok(())
            }
            None => Err(EventError::UnknownEvent(name.to_string())),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.dispatchers.read().contains_key(name)
    }

    /// Names of all registered events
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.dispatchers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Dispatch an event by name
    pub fn dispatch(&self, name: &str, args: impl Into<EventArgs>) -> Result<Dispatch, EventError> {
        // The registry lock is released before hooks run
        let dispatcher = self.lookup(name)?;
        Ok(dispatcher.dispatch(args.into()))
    }

    /// Remove every hook owned by `plugin` from every event
    pub fn remove_plugin_hooks(&self, plugin: &str) -> usize {
        let dispatchers: Vec<Arc<EventDispatcher>> =
            self.dispatchers.read().values().cloned().collect();
        dispatchers
            .iter()
            .map(|dispatcher| dispatcher.remove_plugin_hooks(plugin))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::args::Arg;
    use crate::events::types::{HookResult, Priority};
    use crate::events::typed::{ChatEvent, RoundEvent};

    #[test]
    fn test_builtin_catalog() {
        let registry = EventRegistry::new();
        assert_eq!(registry.names().len(), BUILTIN_EVENTS.len());
        for name in [names::CHAT, names::DAMAGE, names::USERINFO, names::VOTE_ENDED] {
            assert!(registry.contains(name));
        }
        for (_, signature, payload) in BUILTIN_EVENTS {
            EventDispatcher::new("check", signature, *payload).validate().unwrap();
        }
    }

    #[test]
    fn test_register_and_unregister_custom_event() {
        let registry = EventRegistry::new();
        registry
            .register(EventDispatcher::new("balance_done", &[ArgKind::Text], PayloadSlot::None))
            .unwrap();

        assert!(matches!(
            registry.register(EventDispatcher::new("balance_done", &[], PayloadSlot::None)),
            Err(EventError::DuplicateEvent(_))
        ));

        registry.unregister("balance_done").unwrap();
        assert!(matches!(
            registry.unregister("balance_done"),
            Err(EventError::UnknownEvent(_))
        ));
        assert!(registry.unregister(names::CHAT).is_err());
        assert!(matches!(registry.lookup("nope"), Err(EventError::UnknownEvent(_))));
    }

    #[test]
    fn test_typed_hook_signature_checked() {
        let registry = EventRegistry::new();
        let round_start = registry.lookup(names::ROUND_START).unwrap();

        let err = round_start
            .add_typed_hook::<ChatEvent, _>("p", "h", Priority::Normal, |_| HookResult::Continue)
            .unwrap_err();
        assert!(matches!(err, EventError::SignatureMismatch { .. }));

        round_start
            .add_typed_hook::<RoundEvent, _>("p", "h", Priority::Normal, |event| {
                if event.round == 3 {
                    HookResult::Stop
                } else {
                    HookResult::Continue
                }
            })
            .unwrap();

        let result = registry
            .dispatch(names::ROUND_START, vec![Arg::Int(3)])
            .unwrap();
        assert!(result.is_blocked());
    }

    #[test]
    fn test_remove_plugin_hooks_across_events() {
        let registry = EventRegistry::new();
        for name in [names::FRAME, names::NEW_GAME] {
            registry
                .lookup(name)
                .unwrap()
                .add_hook("gone", "h", Priority::Normal, |_| HookResult::Continue)
                .unwrap();
        }
        assert_eq!(registry.remove_plugin_hooks("gone"), 2);
        assert_eq!(registry.lookup(names::FRAME).unwrap().hook_count(), 0);
    }
}
