//! Per-event hook storage and dispatch

use std::sync::Arc;

use parking_lot::RwLock;

use super::args::{ArgKind, EventArgs};
use super::typed::TypedEvent;
use super::types::{Dispatch, HookCallback, HookResult, PayloadKind, PayloadSlot, Priority};
use crate::error::EventError;
use crate::unwind::contain;

/// Events too frequent to log every dispatch
const NO_DEBUG: [&str; 9] = [
    "frame",
    "set_configstring",
    "stats",
    "server_command",
    "death",
    "kill",
    "command",
    "console_print",
    "damage",
];

/// Maximum length of a dispatch debug line
const DEBUG_LINE_LIMIT: usize = 100;

/// A registered hook
struct Hook {
    plugin: String,
    handler: String,
    callback: HookCallback,
}

type Buckets = [Vec<Arc<Hook>>; 5];

/// Dispatcher for a single named event
pub struct EventDispatcher {
    name: String,
    signature: Vec<ArgKind>,
    payload: PayloadSlot,
    hooks: RwLock<Buckets>,
}

impl EventDispatcher {
    /// Create a dispatcher for `name` carrying arguments shaped like
    /// `signature`, with `payload` naming the argument hooks may replace.
    pub fn new(name: impl Into<String>, signature: &[ArgKind], payload: PayloadSlot) -> Self {
        Self {
            name: name.into(),
            signature: signature.to_vec(),
            payload,
            hooks: RwLock::new(Default::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &[ArgKind] {
        &self.signature
    }

    pub fn payload_slot(&self) -> PayloadSlot {
        self.payload
    }

    /// Check that the payload slot points at an argument of matching kind
    pub(crate) fn validate(&self) -> Result<(), EventError> {
        if self.name.is_empty() {
            return Err(EventError::InvalidDispatcher {
                name: self.name.clone(),
                reason: "event name is empty".to_string(),
            });
        }
        if let Some((index, kind)) = self.payload.position() {
            let expected = match kind {
                PayloadKind::Text => ArgKind::Text,
                PayloadKind::Vars => ArgKind::Vars,
            };
            if self.signature.get(index) != Some(&expected) {
                return Err(EventError::InvalidDispatcher {
                    name: self.name.clone(),
                    reason: format!("payload slot {:?} does not match the signature", self.payload),
                });
            }
        }
        Ok(())
    }

    /// Add a hook
    ///
    /// Hooks are identified by `(plugin, handler)`; the pair may appear only
    /// once per event regardless of priority.
    pub fn add_hook<F>(
        &self,
        plugin: &str,
        handler: &str,
        priority: Priority,
        callback: F,
    ) -> Result<(), EventError>
    where
        F: Fn(&EventArgs) -> HookResult + Send + Sync + 'static,
    {
        let mut hooks = self.hooks.write();

        let duplicate = hooks
            .iter()
            .flatten()
            .any(|hook| hook.plugin == plugin && hook.handler == handler);
        if duplicate {
            return Err(EventError::DuplicateHook {
                event: self.name.clone(),
                plugin: plugin.to_string(),
                handler: handler.to_string(),
            });
        }

        hooks[priority.index()].push(Arc::new(Hook {
            plugin: plugin.to_string(),
            handler: handler.to_string(),
            callback: Arc::new(callback),
        }));

        tracing::trace!(
            event = %self.name,
            plugin,
            handler,
            "Added hook at {:?} priority",
            priority
        );
        Ok(())
    }

    /// Add a hook that receives a typed view of the arguments
    ///
    /// Fails with `SignatureMismatch` if `E` does not describe this event.
    pub fn add_typed_hook<E, F>(
        &self,
        plugin: &str,
        handler: &str,
        priority: Priority,
        callback: F,
    ) -> Result<(), EventError>
    where
        E: TypedEvent,
        F: Fn(&E) -> HookResult + Send + Sync + 'static,
    {
        if E::SIGNATURE != self.signature.as_slice() {
            return Err(EventError::SignatureMismatch {
                event: self.name.clone(),
                expected: format!("{:?}", self.signature),
                found: format!("{:?}", E::SIGNATURE),
            });
        }

        let event_name = self.name.clone();
        self.add_hook(plugin, handler, priority, move |args| match E::from_args(args) {
            Some(event) => callback(&event),
            None => {
                tracing::warn!(event = %event_name, "Arguments did not convert to typed event");
                HookResult::Continue
            }
        })
    }

    /// Remove a hook from the given priority bucket
    pub fn remove_hook(&self, plugin: &str, handler: &str, priority: Priority) -> Result<(), EventError> {
        let mut hooks = self.hooks.write();
        let bucket = &mut hooks[priority.index()];

        match bucket
            .iter()
            .position(|hook| hook.plugin == plugin && hook.handler == handler)
        {
            Some(index) => {
                bucket.remove(index);
                Ok(())
            }
            None => Err(EventError::HookNotFound {
                event: self.name.clone(),
                plugin: plugin.to_string(),
                handler: handler.to_string(),
            }),
        }
    }

    /// Remove every hook owned by `plugin`, returning how many were removed
    pub fn remove_plugin_hooks(&self, plugin: &str) -> usize {
        let mut hooks = self.hooks.write();
        let mut removed = 0;
        for bucket in hooks.iter_mut() {
            let before = bucket.len();
            bucket.retain(|hook| hook.plugin != plugin);
            removed += before - bucket.len();
        }
        removed
    }

    /// Total number of hooks across all priorities
    pub fn hook_count(&self) -> usize {
        self.hooks.read().iter().map(Vec::len).sum()
    }

    /// Call every hook, highest priority first, and fold their results
    ///
    /// A panicking hook is logged and treated as `Continue`.
    pub fn dispatch(&self, args: EventArgs) -> Dispatch {
        if args.kinds() != self.signature {
            tracing::error!(
                event = %self.name,
                "Dispatch arguments {:?} do not match signature {:?}",
                args.kinds(),
                self.signature
            );
            return Dispatch::Continue;
        }

        if !NO_DEBUG.contains(&self.name.as_str()) {
            let line = format!("{}({})", self.name, args);
            let line: String = line.chars().take(DEBUG_LINE_LIMIT).collect();
            tracing::debug!("{}", line);
        }

        // Hooks may add or remove hooks while running
        let snapshot: Buckets = self.hooks.read().clone();

        let mut args = args;
        let mut replaced = false;
        let mut blocked = false;

        for hook in snapshot.iter().flatten() {
            let result = match contain(|| (hook.callback)(&args)) {
                Ok(result) => result,
                Err(message) => {
                    tracing::error!(
                        event = %self.name,
                        plugin = %hook.plugin,
                        handler = %hook.handler,
                        "Hook panicked: {}",
                        message
                    );
                    continue;
                }
            };

            match result {
                HookResult::Continue => {}
                HookResult::Handled => blocked = true,
                HookResult::Stop => return Dispatch::Blocked,
                HookResult::StopHooks => break,
                HookResult::Replace(payload) => match self.payload.position() {
                    Some((index, kind)) if kind == payload.kind() => {
                        args.set_payload(index, payload);
                        replaced = true;
                    }
                    _ => {
                        tracing::warn!(
                            event = %self.name,
                            plugin = %hook.plugin,
                            handler = %hook.handler,
                            "Handler returned an unknown value: {:?}",
                            payload
                        );
                    }
                },
            }
        }

        if blocked {
            return Dispatch::Blocked;
        }

        match (replaced, self.payload.position()) {
            (true, Some((index, kind))) => args
                .payload(index, kind)
                .map(Dispatch::Replaced)
                .unwrap_or_default(),
            _ => Dispatch::Continue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::args::Arg;
    use crate::events::types::Payload;
    use parking_lot::Mutex;

    fn text_event() -> EventDispatcher {
        EventDispatcher::new("console_print", &[ArgKind::Text], PayloadSlot::Text(0))
    }

    fn text_args(text: &str) -> EventArgs {
        EventArgs::new(vec![Arg::Text(text.to_string())])
    }

    #[test]
    fn test_priority_then_insertion_order() {
        let dispatcher = text_event();
        let order = Arc::new(Mutex::new(Vec::new()));

        for (handler, priority) in [
            ("low", Priority::Low),
            ("highest", Priority::Highest),
            ("normal_a", Priority::Normal),
            ("normal_b", Priority::Normal),
        ] {
            let order = order.clone();
            dispatcher
                .add_hook("test", handler, priority, move |_| {
                    order.lock().push(handler);
                    HookResult::Continue
                })
                .unwrap();
        }

        assert_eq!(dispatcher.dispatch(text_args("x")), Dispatch::Continue);
        assert_eq!(*order.lock(), vec!["highest", "normal_a", "normal_b", "low"]);
    }

    #[test]
    fn test_stop_short_circuits() {
        let dispatcher = text_event();
        let later_ran = Arc::new(Mutex::new(false));

        dispatcher
            .add_hook("a", "stop", Priority::High, |_| HookResult::Stop)
            .unwrap();
        let flag = later_ran.clone();
        dispatcher
            .add_hook("b", "later", Priority::Low, move |_| {
                *flag.lock() = true;
                HookResult::Continue
            })
            .unwrap();

        assert!(dispatcher.dispatch(text_args("x")).is_blocked());
        assert!(!*later_ran.lock());
    }

    #[test]
    fn test_handled_blocks_but_continues() {
        let dispatcher = text_event();
        let later_ran = Arc::new(Mutex::new(false));

        dispatcher
            .add_hook("a", "handled", Priority::High, |_| HookResult::Handled)
            .unwrap();
        let flag = later_ran.clone();
        dispatcher
            .add_hook("b", "later", Priority::Low, move |_| {
                *flag.lock() = true;
                HookResult::Continue
            })
            .unwrap();

        assert!(dispatcher.dispatch(text_args("x")).is_blocked());
        assert!(*later_ran.lock());
    }

    #[test]
    fn test_stop_hooks_keeps_engine_action() {
        let dispatcher = text_event();
        let later_ran = Arc::new(Mutex::new(false));

        dispatcher
            .add_hook("a", "rewrite", Priority::Highest, |_| {
                HookResult::Replace(Payload::Text("quiet".to_string()))
            })
            .unwrap();
        dispatcher
            .add_hook("b", "claim", Priority::High, |_| HookResult::StopHooks)
            .unwrap();
        let flag = later_ran.clone();
        dispatcher
            .add_hook("c", "later", Priority::Low, move |_| {
                *flag.lock() = true;
                HookResult::Handled
            })
            .unwrap();

        let result = dispatcher.dispatch(text_args("loud"));
        assert!(!result.is_blocked());
        assert_eq!(result.text(), Some("quiet"));
        assert!(!*later_ran.lock());

        dispatcher.remove_hook("a", "rewrite", Priority::Highest).unwrap();
        assert_eq!(dispatcher.dispatch(text_args("loud")), Dispatch::Continue);
        assert!(!*later_ran.lock());
    }

    #[test]
    fn test_replacement_is_seen_by_later_hooks() {
        let dispatcher = text_event();
        let seen = Arc::new(Mutex::new(String::new()));

        dispatcher
            .add_hook("a", "rewrite", Priority::High, |_| {
                HookResult::Replace(Payload::Text("rewritten".to_string()))
            })
            .unwrap();
        let seen_by = seen.clone();
        dispatcher
            .add_hook("b", "observe", Priority::Normal, move |args| {
                *seen_by.lock() = args.text(0).unwrap_or_default().to_string();
                HookResult::Continue
            })
            .unwrap();

        let result = dispatcher.dispatch(text_args("original"));
        assert_eq!(result.text(), Some("rewritten"));
        assert_eq!(*seen.lock(), "rewritten");
    }

    #[test]
    fn test_wrong_payload_kind_is_ignored() {
        let dispatcher = text_event();
        dispatcher
            .add_hook("a", "bad", Priority::Normal, |_| {
                HookResult::Replace(Payload::Vars(Default::default()))
            })
            .unwrap();
        assert_eq!(dispatcher.dispatch(text_args("x")), Dispatch::Continue);
    }

    #[test]
    fn test_panicking_hook_is_contained() {
        let dispatcher = text_event();
        let later_ran = Arc::new(Mutex::new(false));

        dispatcher
            .add_hook("a", "broken", Priority::High, |_| panic!("plugin bug"))
            .unwrap();
        let flag = later_ran.clone();
        dispatcher
            .add_hook("b", "later", Priority::Normal, move |_| {
                *flag.lock() = true;
                HookResult::Continue
            })
            .unwrap();

        assert_eq!(dispatcher.dispatch(text_args("x")), Dispatch::Continue);
        assert!(*later_ran.lock());
    }

    #[test]
    fn test_duplicate_hook_rejected() {
        let dispatcher = text_event();
        dispatcher
            .add_hook("a", "h", Priority::High, |_| HookResult::Continue)
            .unwrap();
        let err = dispatcher
            .add_hook("a", "h", Priority::Low, |_| HookResult::Continue)
            .unwrap_err();
        assert!(matches!(err, EventError::DuplicateHook { .. }));
        assert_eq!(dispatcher.hook_count(), 1);
    }

    #[test]
    fn test_remove_hook_checks_priority() {
        let dispatcher = text_event();
        dispatcher
            .add_hook("a", "h", Priority::High, |_| HookResult::Continue)
            .unwrap();
        assert!(matches!(
            dispatcher.remove_hook("a", "h", Priority::Low),
            Err(EventError::HookNotFound { .. })
        ));
        dispatcher.remove_hook("a", "h", Priority::High).unwrap();
        assert_eq!(dispatcher.hook_count(), 0);
    }

    #[test]
    fn test_mismatched_arguments_skip_hooks() {
        let dispatcher = text_event();
        dispatcher
            .add_hook("a", "stop", Priority::High, |_| HookResult::Stop)
            .unwrap();
        let result = dispatcher.dispatch(EventArgs::new(vec![Arg::Int(1)]));
        assert_eq!(result, Dispatch::Continue);
    }

    #[test]
    fn test_invalid_payload_slot() {
        let dispatcher = EventDispatcher::new("bad", &[ArgKind::Int], PayloadSlot::Text(0));
        assert!(matches!(
            dispatcher.validate(),
            Err(EventError::InvalidDispatcher { .. })
        ));
    }
}
