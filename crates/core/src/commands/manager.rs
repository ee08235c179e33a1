//! Command registry - registration and input matching

use std::sync::Arc;

use parking_lot::RwLock;

use super::info::{Command, CommandResult};
use crate::channels::Channel;
use crate::config::cvars;
use crate::context::Core;
use crate::error::CommandError;
use crate::events::{names, Arg, Priority};
use crate::player::Player;
use crate::unwind::contain;

type Buckets = [Vec<Arc<Command>>; 5];

/// Priority-bucketed command list
#[derive(Default)]
pub struct CommandRegistry {
    commands: RwLock<Buckets>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command at a priority
    pub fn add_command(&self, command: Command, priority: Priority) -> Result<Arc<Command>, CommandError> {
        if command.names().is_empty() || command.name().is_empty() {
            return Err(CommandError::InvalidCommand(format!(
                "{}.{} has no name",
                command.plugin(),
                command.handler()
            )));
        }

        let mut commands = self.commands.write();
        if commands.iter().flatten().any(|c| c.same_identity(&command)) {
            return Err(CommandError::AlreadyRegistered(command.name().to_string()));
        }

        let command = Arc::new(command);
        commands[priority.index()].push(command.clone());
        tracing::debug!("Registered command: {} ({})", command.name(), command.plugin());
        Ok(command)
    }

    /// Unregister a command by identity
    pub fn remove_command(&self, command: &Command) -> Result<(), CommandError> {
        let mut commands = self.commands.write();
        for bucket in commands.iter_mut() {
            if let Some(index) = bucket.iter().position(|c| c.same_identity(command)) {
                bucket.remove(index);
                tracing::debug!("Unregistered command: {}", command.name());
                return Ok(());
            }
        }
        Err(CommandError::NotRegistered(command.name().to_string()))
    }

    pub fn is_registered(&self, command: &Command) -> bool {
        self.commands
            .read()
            .iter()
            .flatten()
            .any(|c| c.same_identity(command))
    }

    /// Remove every command owned by `plugin`, returning how many were removed
    pub fn remove_plugin_commands(&self, plugin: &str) -> usize {
        let mut commands = self.commands.write();
        let mut removed = 0;
        for bucket in commands.iter_mut() {
            let before = bucket.len();
            bucket.retain(|c| c.plugin() != plugin);
            removed += before - bucket.len();
        }
        removed
    }

    /// All commands in evaluation order
    pub fn commands(&self) -> Vec<Arc<Command>> {
        self.commands.read().iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.commands.read().iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Match input against every eligible command and run them
    ///
    /// # Returns
    /// `true` if the input should pass through to the engine, `false` to block it
    pub fn handle_input(&self, core: &Core, player: &Player, message: &str, channel: &Channel) -> bool {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return true;
        }

        let name = trimmed
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_lowercase();
        let is_client_cmd = channel.is_client_command();
        let prefix = core.engine().get_cvar(cvars::COMMAND_PREFIX);
        let owner = core.owner();
        let mut pass_through = true;

        // Handlers may register or remove commands while running
        let snapshot: Buckets = self.commands.read().clone();

        for command in snapshot.iter().flatten() {
            let eligible = command.is_eligible_name(&name, prefix.as_deref())
                && command.is_eligible_channel(channel)
                && command.is_eligible_player(
                    player,
                    is_client_cmd,
                    core.engine(),
                    owner,
                    core.permissions(),
                );
            if !eligible {
                continue;
            }

            // Client commands only reach the engine when asked to
            if is_client_cmd {
                pass_through = command.passes_client_command();
            }

            let dispatch = core.events().dispatch(
                names::COMMAND,
                vec![
                    Arg::Player(player.clone()),
                    Arg::Command(command.clone()),
                    Arg::Text(message.to_string()),
                ],
            );
            match dispatch {
                Ok(result) if result.is_blocked() => return false,
                Ok(_) => {}
                Err(e) => tracing::error!("Failed to dispatch command event: {}", e),
            }

            let result = match contain(|| command.execute(player, message, channel)) {
                Ok(result) => result,
                Err(panic) => {
                    tracing::error!(
                        plugin = %command.plugin(),
                        handler = %command.handler(),
                        "Command '{}' panicked: {}",
                        command.name(),
                        panic
                    );
                    CommandResult::Ok
                }
            };

            match result {
                CommandResult::Ok => {}
                CommandResult::Stop | CommandResult::StopAll => return false,
                CommandResult::StopEvent => pass_through = false,
                CommandResult::Usage if !command.usage_text().is_empty() => {
                    channel.reply(
                        core.engine(),
                        &format!("^7Usage: ^6{} {}", name, command.usage_text()),
                    );
                }
                CommandResult::Usage => {
                    tracing::warn!(
                        "Command '{}' with handler '{}' returned usage without a usage string",
                        command.name(),
                        command.handler()
                    );
                }
            }
        }

        pass_through
    }
}
