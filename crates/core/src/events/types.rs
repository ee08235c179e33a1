//! Event system types

use std::sync::Arc;

use super::args::EventArgs;
use crate::player::Vars;

/// Priority tier for hooks and commands, evaluated highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Priority {
    Highest = 0,
    High = 1,
    #[default]
    Normal = 2,
    Low = 3,
    Lowest = 4,
}

impl Priority {
    /// All tiers in evaluation order
    pub const ALL: [Priority; 5] = [
        Priority::Highest,
        Priority::High,
        Priority::Normal,
        Priority::Low,
        Priority::Lowest,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// A replacement value a hook can hand back
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Replacement text for text-bearing events
    Text(String),
    /// Replacement key/value pairs for key/value-bearing events
    Vars(Vars),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Text(_) => PayloadKind::Text,
            Self::Vars(_) => PayloadKind::Vars,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Text,
    Vars,
}

/// Which argument of an event hooks may replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadSlot {
    /// The event has no replaceable payload
    #[default]
    None,
    /// Text argument at this position
    Text(usize),
    /// Vars argument at this position
    Vars(usize),
}

impl PayloadSlot {
    /// Argument position and kind, if the event has a payload
    pub fn position(self) -> Option<(usize, PayloadKind)> {
        match self {
            Self::None => None,
            Self::Text(i) => Some((i, PayloadKind::Text)),
            Self::Vars(i) => Some((i, PayloadKind::Vars)),
        }
    }
}

/// Result from an event hook determining how to proceed
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HookResult {
    /// Continue processing, call other hooks and let the engine action happen
    #[default]
    Continue,

    /// Replace the event payload; later hooks and the caller see the new value
    Replace(Payload),

    /// Block the engine action, but continue calling other hooks
    Handled,

    /// Stop calling lower hooks; the engine action is decided by what
    /// earlier hooks returned
    StopHooks,

    /// Block the engine action AND stop processing other hooks
    Stop,
}

/// Overall result of dispatching an event
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Dispatch {
    /// No hook objected or replaced anything
    #[default]
    Continue,
    /// At least one hook replaced the payload; this is the final value
    Replaced(Payload),
    /// A hook blocked the engine action
    Blocked,
}

impl Dispatch {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked)
    }

    /// Replacement text, if a hook replaced a text payload
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Replaced(Payload::Text(text)) => Some(text),
            _ => None,
        }
    }

    /// Replacement vars, if a hook replaced a vars payload
    pub fn vars(&self) -> Option<&Vars> {
        match self {
            Self::Replaced(Payload::Vars(vars)) => Some(vars),
            _ => None,
        }
    }
}

/// Type alias for event hook functions
///
/// # Arguments
/// * `args` - The event arguments, with any payload replaced by earlier hooks
///
/// # Returns
/// `HookResult` indicating how to proceed
pub type HookCallback = Arc<dyn Fn(&EventArgs) -> HookResult + Send + Sync>;
