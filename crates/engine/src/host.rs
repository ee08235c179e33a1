//! The host engine boundary
//!
//! Everything the scripting core needs from the game process goes through
//! this trait. Implementations are opaque and synchronous; they are only
//! ever called from the frame thread.

use qlrust_sdk::{ClientId, PlayerInfo, MAX_CLIENTS};

/// Functions the host engine exposes to the scripting core
pub trait HostEngine: Send + Sync {
    /// Read a cvar; `None` if it does not exist
    fn get_cvar(&self, name: &str) -> Option<String>;

    /// Read a configstring by index
    fn get_configstring(&self, index: u32) -> String;

    /// Write a configstring by index
    fn set_configstring(&self, index: u32, value: &str);

    /// Execute a command on the server console
    fn console_command(&self, command: &str);

    /// Print text on the server console
    fn console_print(&self, text: &str);

    /// Send a server command to one client, or to everyone if `client_id` is `None`
    fn send_server_command(&self, client_id: Option<ClientId>, command: &str);

    /// Information about a client slot; `None` if the slot is not in use
    fn player_info(&self, client_id: ClientId) -> Option<PlayerInfo>;

    /// Information about every client slot in use
    fn players_info(&self) -> Vec<PlayerInfo> {
        (0..MAX_CLIENTS)
            .filter_map(|client_id| self.player_info(client_id))
            .collect()
    }
}
