//! Event arguments
//!
//! Events carry differently shaped arguments. Each argument is an [`Arg`]
//! variant; each event declares the [`ArgKind`] sequence it carries, and
//! dispatch and typed hook registration are checked against it.

use std::fmt;
use std::sync::Arc;

use qlrust_sdk::ClientId;

use super::types::{Payload, PayloadKind};
use crate::channels::Channel;
use crate::commands::Command;
use crate::player::{Player, Vars};

/// Kind of a single event argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Bool,
    Int,
    Text,
    Player,
    /// A player that may be absent
    OptPlayer,
    /// A player, or a raw entity number for non-client entities
    Target,
    Vars,
    Channel,
    Command,
    Json,
}

/// Damage source or target: a client, or some other entity
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Player(Player),
    Entity(i32),
}

impl Target {
    pub fn player(&self) -> Option<&Player> {
        match self {
            Self::Player(player) => Some(player),
            Self::Entity(_) => None,
        }
    }

    pub fn id(&self) -> ClientId {
        match self {
            Self::Player(player) => player.id,
            Self::Entity(id) => *id,
        }
    }
}

/// A single event argument
#[derive(Debug, Clone)]
pub enum Arg {
    Bool(bool),
    Int(i64),
    Text(String),
    Player(Player),
    OptPlayer(Option<Player>),
    Target(Target),
    Vars(Vars),
    Channel(Channel),
    Command(Arc<Command>),
    Json(serde_json::Value),
}

impl Arg {
    pub fn kind(&self) -> ArgKind {
        match self {
            Self::Bool(_) => ArgKind::Bool,
            Self::Int(_) => ArgKind::Int,
            Self::Text(_) => ArgKind::Text,
            Self::Player(_) => ArgKind::Player,
            Self::OptPlayer(_) => ArgKind::OptPlayer,
            Self::Target(_) => ArgKind::Target,
            Self::Vars(_) => ArgKind::Vars,
            Self::Channel(_) => ArgKind::Channel,
            Self::Command(_) => ArgKind::Command,
            Self::Json(_) => ArgKind::Json,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{:?}", value),
            Self::Player(player) => write!(f, "{}", player),
            Self::OptPlayer(Some(player)) => write!(f, "{}", player),
            Self::OptPlayer(None) => f.write_str("None"),
            Self::Target(Target::Player(player)) => write!(f, "{}", player),
            Self::Target(Target::Entity(id)) => write!(f, "{}", id),
            Self::Vars(vars) => write!(f, "{:?}", vars.to_string()),
            Self::Channel(channel) => write!(f, "{}", channel),
            Self::Command(command) => f.write_str(command.name()),
            Self::Json(value) => write!(f, "{}", value),
        }
    }
}

/// Argument list for one dispatch
#[derive(Debug, Clone, Default)]
pub struct EventArgs(Vec<Arg>);

impl EventArgs {
    pub fn new(args: Vec<Arg>) -> Self {
        Self(args)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    pub fn kinds(&self) -> Vec<ArgKind> {
        self.0.iter().map(Arg::kind).collect()
    }

    pub fn bool(&self, index: usize) -> Option<bool> {
        match self.get(index)? {
            Arg::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn int(&self, index: usize) -> Option<i64> {
        match self.get(index)? {
            Arg::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match self.get(index)? {
            Arg::Text(value) => Some(value),
            _ => None,
        }
    }

    /// A present player, from either a `Player` or `OptPlayer` argument
    pub fn player(&self, index: usize) -> Option<&Player> {
        match self.get(index)? {
            Arg::Player(player) => Some(player),
            Arg::OptPlayer(player) => player.as_ref(),
            _ => None,
        }
    }

    pub fn target(&self, index: usize) -> Option<&Target> {
        match self.get(index)? {
            Arg::Target(target) => Some(target),
            _ => None,
        }
    }

    pub fn vars(&self, index: usize) -> Option<&Vars> {
        match self.get(index)? {
            Arg::Vars(vars) => Some(vars),
            _ => None,
        }
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        match self.get(index)? {
            Arg::Channel(channel) => Some(channel),
            _ => None,
        }
    }

    pub fn command(&self, index: usize) -> Option<&Arc<Command>> {
        match self.get(index)? {
            Arg::Command(command) => Some(command),
            _ => None,
        }
    }

    pub fn json(&self, index: usize) -> Option<&serde_json::Value> {
        match self.get(index)? {
            Arg::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Payload currently at `index`, if it has the given kind
    pub(crate) fn payload(&self, index: usize, kind: PayloadKind) -> Option<Payload> {
        match (self.get(index)?, kind) {
            (Arg::Text(text), PayloadKind::Text) => Some(Payload::Text(text.clone())),
            (Arg::Vars(vars), PayloadKind::Vars) => Some(Payload::Vars(vars.clone())),
            _ => None,
        }
    }

    /// Replace the argument at `index` with a payload
    pub(crate) fn set_payload(&mut self, index: usize, payload: Payload) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = match payload {
                Payload::Text(text) => Arg::Text(text),
                Payload::Vars(vars) => Arg::Vars(vars),
            };
        }
    }
}

impl From<Vec<Arg>> for EventArgs {
    fn from(args: Vec<Arg>) -> Self {
        Self(args)
    }
}

impl fmt::Display for EventArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_check_kind() {
        let args = EventArgs::new(vec![Arg::Int(9), Arg::Text("vote".to_string())]);
        assert_eq!(args.kinds(), vec![ArgKind::Int, ArgKind::Text]);
        assert_eq!(args.int(0), Some(9));
        assert_eq!(args.text(0), None);
        assert_eq!(args.text(1), Some("vote"));
        assert_eq!(args.to_string(), "9, \"vote\"");
    }

    #[test]
    fn test_set_payload() {
        let mut args = EventArgs::new(vec![Arg::Text("old".to_string())]);
        args.set_payload(0, Payload::Text("new".to_string()));
        assert_eq!(
            args.payload(0, PayloadKind::Text),
            Some(Payload::Text("new".to_string()))
        );
        assert_eq!(args.payload(0, PayloadKind::Vars), None);
    }
}
