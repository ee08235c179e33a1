//! Typed game events
//!
//! Provides strongly-typed views over common events' argument lists.
//!
//! # Example
//!
//! ```ignore
//! use qlrust_core::events::{names, ChatEvent, HookResult, Priority};
//!
//! core.events().lookup(names::CHAT)?.add_typed_hook::<ChatEvent, _>(
//!     "greeter",
//!     "handle_chat",
//!     Priority::Normal,
//!     |event| {
//!         if event.message == "hi" {
//!             tracing::info!("{} said hi on {}", event.player, event.channel);
//!         }
//!         HookResult::Continue
//!     },
//! )?;
//! ```

use std::sync::Arc;

use super::args::{ArgKind, EventArgs, Target};
use crate::channels::Channel;
use crate::commands::Command;
use crate::damage::DamageFlags;
use crate::player::{Player, Vars};

/// Trait for typed event structs
pub trait TypedEvent: Sized + Send + 'static {
    /// Argument shape this type reads; must equal the event's signature
    const SIGNATURE: &'static [ArgKind];

    /// Build the typed view from raw arguments
    fn from_args(args: &EventArgs) -> Option<Self>;
}

/// `chat`: a player said something on a channel
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub player: Player,
    pub message: String,
    pub channel: Channel,
}

impl TypedEvent for ChatEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Text, ArgKind::Channel];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            message: args.text(1)?.to_string(),
            channel: args.channel(2)?.clone(),
        })
    }
}

/// `command`: a registered command is about to run
#[derive(Debug, Clone)]
pub struct CommandEvent {
    pub player: Player,
    pub command: Arc<Command>,
    pub message: String,
}

impl TypedEvent for CommandEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Command, ArgKind::Text];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            command: args.command(1)?.clone(),
            message: args.text(2)?.to_string(),
        })
    }
}

/// `client_command`: raw command text sent by a client
#[derive(Debug, Clone)]
pub struct ClientCommandEvent {
    pub player: Player,
    pub command: String,
}

impl TypedEvent for ClientCommandEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Text];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            command: args.text(1)?.to_string(),
        })
    }
}

/// `player_connect`, `player_loaded`, `player_spawn`, `kamikaze_use`
#[derive(Debug, Clone)]
pub struct PlayerConnectEvent {
    pub player: Player,
}

impl TypedEvent for PlayerConnectEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
        })
    }
}

/// `player_disconnect`
#[derive(Debug, Clone)]
pub struct PlayerDisconnectEvent {
    pub player: Player,
    pub reason: String,
}

impl TypedEvent for PlayerDisconnectEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Text];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            reason: args.text(1)?.to_string(),
        })
    }
}

/// `death`: victim and killer may both be unresolved
#[derive(Debug, Clone)]
pub struct DeathEvent {
    pub victim: Option<Player>,
    pub killer: Option<Player>,
    pub data: serde_json::Value,
}

impl TypedEvent for DeathEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::OptPlayer, ArgKind::OptPlayer, ArgKind::Json];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            victim: args.player(0).cloned(),
            killer: args.player(1).cloned(),
            data: args.json(2)?.clone(),
        })
    }
}

/// `kill`: only dispatched when the killer is known
#[derive(Debug, Clone)]
pub struct KillEvent {
    pub victim: Option<Player>,
    pub killer: Player,
    pub data: serde_json::Value,
}

impl TypedEvent for KillEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::OptPlayer, ArgKind::Player, ArgKind::Json];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            victim: args.player(0).cloned(),
            killer: args.player(1)?.clone(),
            data: args.json(2)?.clone(),
        })
    }
}

/// `team_switch` and `team_switch_attempt`
///
/// Team names are lowercase; `team_switch_attempt` may carry `any`.
#[derive(Debug, Clone)]
pub struct TeamSwitchEvent {
    pub player: Player,
    pub old_team: String,
    pub new_team: String,
}

impl TypedEvent for TeamSwitchEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Text, ArgKind::Text];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            old_team: args.text(1)?.to_string(),
            new_team: args.text(2)?.to_string(),
        })
    }
}

/// `userinfo`: only the changed keys
#[derive(Debug, Clone)]
pub struct UserinfoEvent {
    pub player: Player,
    pub changed: Vars,
}

impl TypedEvent for UserinfoEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Vars];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            changed: args.vars(1)?.clone(),
        })
    }
}

/// `vote_called`
#[derive(Debug, Clone)]
pub struct VoteCalledEvent {
    pub player: Player,
    pub vote: String,
    pub args: String,
}

impl TypedEvent for VoteCalledEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Player, ArgKind::Text, ArgKind::Text];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            player: args.player(0)?.clone(),
            vote: args.text(1)?.to_string(),
            args: args.text(2)?.to_string(),
        })
    }
}

/// `round_countdown` and `round_start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEvent {
    pub round: i64,
}

impl TypedEvent for RoundEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Int];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self { round: args.int(0)? })
    }
}

/// `damage`
#[derive(Debug, Clone)]
pub struct DamageEvent {
    pub target: Target,
    pub attacker: Target,
    pub damage: i64,
    pub flags: DamageFlags,
    pub means_of_death: i64,
}

impl TypedEvent for DamageEvent {
    const SIGNATURE: &'static [ArgKind] = &[
        ArgKind::Target,
        ArgKind::Target,
        ArgKind::Int,
        ArgKind::Int,
        ArgKind::Int,
    ];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            target: args.target(0)?.clone(),
            attacker: args.target(1)?.clone(),
            damage: args.int(2)?,
            flags: DamageFlags::from_bits_truncate(args.int(3)? as u32),
            means_of_death: args.int(4)?,
        })
    }
}

/// `stats`: the full stats message
#[derive(Debug, Clone)]
pub struct StatsEvent {
    pub data: serde_json::Value,
}

impl TypedEvent for StatsEvent {
    const SIGNATURE: &'static [ArgKind] = &[ArgKind::Json];

    fn from_args(args: &EventArgs) -> Option<Self> {
        Some(Self {
            data: args.json(0)?.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::args::Arg;

    #[test]
    fn test_damage_event_from_args() {
        let args = EventArgs::new(vec![
            Arg::Target(Target::Entity(1022)),
            Arg::Target(Target::Entity(7)),
            Arg::Int(100),
            Arg::Int(0x03),
            Arg::Int(22),
        ]);
        let event = DamageEvent::from_args(&args).unwrap();
        assert_eq!(event.target.id(), 1022);
        assert_eq!(event.flags, DamageFlags::RADIUS | DamageFlags::NO_ARMOR);
        assert!(event.attacker.player().is_none());
    }

    #[test]
    fn test_death_event_allows_missing_players() {
        let args = EventArgs::new(vec![
            Arg::OptPlayer(None),
            Arg::OptPlayer(None),
            Arg::Json(serde_json::json!({"MOD": "ROCKET"})),
        ]);
        let event = DeathEvent::from_args(&args).unwrap();
        assert!(event.victim.is_none());
        assert_eq!(event.data["MOD"], "ROCKET");
    }
}
