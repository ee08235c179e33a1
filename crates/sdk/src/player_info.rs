//! Raw client information reported by the host engine

use crate::privileges::Privileges;
use crate::team::Team;

/// Client slot index (0..MAX_CLIENTS)
pub type ClientId = i32;

/// Connection state of a client slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Slot is unused
    #[default]
    Free,
    /// Client dropped, slot not yet reusable
    Zombie,
    /// Connecting, gamestate not yet sent
    Connected,
    /// Gamestate sent, waiting for the first usercmd
    Primed,
    /// In game
    Active,
}

/// Snapshot of a client slot as reported by the host
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerInfo {
    /// Slot index
    pub client_id: ClientId,
    /// Display name (may contain color codes)
    pub name: String,
    /// Connection state
    pub connection_state: ConnectionState,
    /// Raw backslash-delimited userinfo string
    pub userinfo: String,
    /// SteamID64; 0 for bots
    pub steam_id: i64,
    /// Current team
    pub team: Team,
    /// Engine privilege level
    pub privileges: Privileges,
}
