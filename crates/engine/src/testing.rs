//! In-memory host engine for tests
//!
//! [`FakeEngine`] keeps cvars, configstrings and client slots in maps and
//! records every outbound call so tests can assert on them.

use std::collections::HashMap;

use parking_lot::Mutex;
use qlrust_sdk::{ClientId, PlayerInfo};

use crate::host::HostEngine;

/// A server command captured by [`FakeEngine`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentCommand {
    pub client_id: Option<ClientId>,
    pub command: String,
}

#[derive(Default)]
pub struct FakeEngine {
    cvars: Mutex<HashMap<String, String>>,
    configstrings: Mutex<HashMap<u32, String>>,
    players: Mutex<HashMap<ClientId, PlayerInfo>>,
    console_commands: Mutex<Vec<String>>,
    console_prints: Mutex<Vec<String>>,
    server_commands: Mutex<Vec<SentCommand>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cvar(&self, name: &str, value: &str) {
        self.cvars.lock().insert(name.to_string(), value.to_string());
    }

    pub fn remove_cvar(&self, name: &str) {
        self.cvars.lock().remove(name);
    }

    pub fn put_configstring(&self, index: u32, value: &str) {
        self.configstrings.lock().insert(index, value.to_string());
    }

    pub fn add_player(&self, info: PlayerInfo) {
        self.players.lock().insert(info.client_id, info);
    }

    pub fn remove_player(&self, client_id: ClientId) {
        self.players.lock().remove(&client_id);
    }

    pub fn console_commands(&self) -> Vec<String> {
        self.console_commands.lock().clone()
    }

    pub fn console_prints(&self) -> Vec<String> {
        self.console_prints.lock().clone()
    }

    pub fn server_commands(&self) -> Vec<SentCommand> {
        self.server_commands.lock().clone()
    }

    /// Forget everything recorded so far
    pub fn clear_recorded(&self) {
        self.console_commands.lock().clear();
        self.console_prints.lock().clear();
        self.server_commands.lock().clear();
    }
}

impl HostEngine for FakeEngine {
    fn get_cvar(&self, name: &str) -> Option<String> {
        self.cvars.lock().get(name).cloned()
    }

    fn get_configstring(&self, index: u32) -> String {
        self.configstrings
            .lock()
            .get(&index)
            .cloned()
            .unwrap_or_default()
    }

    fn set_configstring(&self, index: u32, value: &str) {
        self.put_configstring(index, value);
    }

    fn console_command(&self, command: &str) {
        self.console_commands.lock().push(command.to_string());
    }

    fn console_print(&self, text: &str) {
        self.console_prints.lock().push(text.to_string());
    }

    fn send_server_command(&self, client_id: Option<ClientId>, command: &str) {
        self.server_commands.lock().push(SentCommand {
            client_id,
            command: command.to_string(),
        });
    }

    fn player_info(&self, client_id: ClientId) -> Option<PlayerInfo> {
        self.players.lock().get(&client_id).cloned()
    }
}
