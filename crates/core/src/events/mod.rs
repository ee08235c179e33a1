//! Game Event System
//!
//! Subscribe to and handle server events (chat, votes, rounds, deaths, etc.)
//!
//! # Architecture
//!
//! ```text
//! host engine → entry point / protocol classifier → EventRegistry → EventDispatcher → hooks
//! ```
//!
//! Each event owns five priority buckets of hooks. Dispatch visits them
//! highest first, in insertion order within a bucket, and folds the
//! [`HookResult`]s into a [`Dispatch`].
//!
//! # Example
//!
//! ```ignore
//! use qlrust_core::events::{names, HookResult, Payload, Priority};
//!
//! // Censor a word in console output
//! core.events().lookup(names::CONSOLE_PRINT)?.add_hook(
//!     "censor",
//!     "handle_console_print",
//!     Priority::High,
//!     |args| match args.text(0) {
//!         Some(text) if text.contains("darn") => {
//!             HookResult::Replace(Payload::Text(text.replace("darn", "****")))
//!         }
//!         _ => HookResult::Continue,
//!     },
//! )?;
//! ```

mod args;
mod dispatcher;
mod manager;
pub mod typed;
mod types;

pub use args::{Arg, ArgKind, EventArgs, Target};
pub use dispatcher::EventDispatcher;
pub use manager::{is_builtin, EventRegistry};
pub use types::{Dispatch, HookCallback, HookResult, Payload, PayloadKind, PayloadSlot, Priority};

pub use typed::{
    ChatEvent, ClientCommandEvent, CommandEvent, DamageEvent, DeathEvent, KillEvent,
    PlayerConnectEvent, PlayerDisconnectEvent, RoundEvent, StatsEvent, TeamSwitchEvent,
    TypedEvent, UserinfoEvent, VoteCalledEvent,
};

/// Built-in event names
pub mod names {
    pub const CONSOLE_PRINT: &str = "console_print";
    pub const COMMAND: &str = "command";
    pub const CLIENT_COMMAND: &str = "client_command";
    pub const SERVER_COMMAND: &str = "server_command";
    pub const FRAME: &str = "frame";
    pub const SET_CONFIGSTRING: &str = "set_configstring";
    pub const CHAT: &str = "chat";
    pub const UNLOAD: &str = "unload";
    pub const PLAYER_CONNECT: &str = "player_connect";
    pub const PLAYER_LOADED: &str = "player_loaded";
    pub const PLAYER_DISCONNECT: &str = "player_disconnect";
    pub const PLAYER_SPAWN: &str = "player_spawn";
    pub const KAMIKAZE_USE: &str = "kamikaze_use";
    pub const KAMIKAZE_EXPLODE: &str = "kamikaze_explode";
    pub const STATS: &str = "stats";
    pub const VOTE_CALLED: &str = "vote_called";
    pub const VOTE_STARTED: &str = "vote_started";
    pub const VOTE_ENDED: &str = "vote_ended";
    pub const VOTE: &str = "vote";
    pub const GAME_COUNTDOWN: &str = "game_countdown";
    pub const GAME_START: &str = "game_start";
    pub const GAME_END: &str = "game_end";
    pub const ROUND_COUNTDOWN: &str = "round_countdown";
    pub const ROUND_START: &str = "round_start";
    pub const ROUND_END: &str = "round_end";
    pub const TEAM_SWITCH: &str = "team_switch";
    pub const TEAM_SWITCH_ATTEMPT: &str = "team_switch_attempt";
    pub const MAP: &str = "map";
    pub const NEW_GAME: &str = "new_game";
    pub const KILL: &str = "kill";
    pub const DEATH: &str = "death";
    pub const USERINFO: &str = "userinfo";
    pub const DAMAGE: &str = "damage";
}
