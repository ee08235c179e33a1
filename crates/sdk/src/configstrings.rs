//! Configstring indices
//!
//! Configstrings are indexed string slots the server uses to broadcast
//! world state to clients. Only the slots the scripting core reads or
//! reacts to are listed here.

/// Server info string with all the serverinfo cvars (holds `g_gameState`)
pub const CS_SERVERINFO: u32 = 0;
/// Info string with all the systeminfo cvars
pub const CS_SYSTEMINFO: u32 = 1;
/// Music track for the current map
pub const CS_MUSIC: u32 = 2;
/// Message of the day
pub const CS_MESSAGE: u32 = 3;
/// Level start time
pub const CS_LEVEL_START_TIME: u32 = 5;
/// Vote start time; zero when no vote is running
pub const CS_VOTE_TIME: u32 = 8;
/// Vote command and arguments; empty when no vote is running
pub const CS_VOTE_STRING: u32 = 9;
/// Yes vote count
pub const CS_VOTE_YES: u32 = 10;
/// No vote count
pub const CS_VOTE_NO: u32 = 11;
/// Round status info string (also used by freeze tag)
pub const CS_ROUND_STATUS: u32 = 661;
/// Round time; -1 when the round is over
pub const CS_ROUND_TIME: u32 = 662;

/// Total number of configstring slots
pub const MAX_CONFIGSTRINGS: u32 = 1024;
