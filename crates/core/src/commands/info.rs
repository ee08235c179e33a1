//! Command definitions

use std::fmt;
use std::sync::Arc;

use qlrust_engine::HostEngine;

use crate::channels::Channel;
use crate::config::cvars;
use crate::permissions::PermissionStore;
use crate::player::Player;

/// Result of command execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandResult {
    /// Done, keep evaluating other matching commands
    #[default]
    Ok,
    /// Stop evaluating commands and block the input
    Stop,
    /// Keep evaluating, but do not pass a client command through to the engine
    StopEvent,
    /// Stop evaluating commands and block the input
    StopAll,
    /// Reply with the command's usage line
    Usage,
}

/// Type alias for command handler functions
///
/// # Arguments
/// * `player` - Who ran the command (the console acts as the owner)
/// * `args` - Whitespace-split input, index 0 is the command name as typed
/// * `channel` - Where the command came from and where replies go
pub type CommandCallback = Arc<dyn Fn(&Player, &[String], &Channel) -> CommandResult + Send + Sync>;

/// A command registered by a plugin
///
/// # Example
///
/// ```ignore
/// let cmd = Command::new("ban", &["b", "ban"], "cmd_ban", |player, args, channel| {
///     if args.len() < 2 {
///         return CommandResult::Usage;
///     }
///     channel.reply(engine, &format!("Banning {}", args[1]));
///     CommandResult::Ok
/// })
/// .permission(3)
/// .usage("<id>");
/// ```
#[derive(Clone)]
pub struct Command {
    plugin: String,
    names: Vec<String>,
    handler: String,
    callback: CommandCallback,
    permission: i32,
    client_cmd_perm: i32,
    prefix: bool,
    channels: Vec<String>,
    exclude_channels: Vec<String>,
    client_cmd_pass: bool,
    usage: String,
}

impl Command {
    /// Create a command with default options: permission 0, client command
    /// permission 5, prefix required, all channels, no passthrough.
    pub fn new<F>(plugin: &str, names: &[&str], handler: &str, callback: F) -> Self
    where
        F: Fn(&Player, &[String], &Channel) -> CommandResult + Send + Sync + 'static,
    {
        Self {
            plugin: plugin.to_string(),
            names: names.iter().map(|name| name.to_lowercase()).collect(),
            handler: handler.to_string(),
            callback: Arc::new(callback),
            permission: 0,
            client_cmd_perm: 5,
            prefix: true,
            channels: Vec::new(),
            exclude_channels: Vec::new(),
            client_cmd_pass: false,
            usage: String::new(),
        }
    }

    pub fn permission(mut self, level: i32) -> Self {
        self.permission = level;
        self
    }

    pub fn client_cmd_perm(mut self, level: i32) -> Self {
        self.client_cmd_perm = level;
        self
    }

    pub fn prefix(mut self, required: bool) -> Self {
        self.prefix = required;
        self
    }

    /// Restrict the command to these channel names
    pub fn channels(mut self, names: &[&str]) -> Self {
        self.channels = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Never run the command on these channel names
    pub fn exclude_channels(mut self, names: &[&str]) -> Self {
        self.exclude_channels = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn client_cmd_pass(mut self, pass: bool) -> Self {
        self.client_cmd_pass = pass;
        self
    }

    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Primary name
    pub fn name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or("")
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }

    pub fn passes_client_command(&self) -> bool {
        self.client_cmd_pass
    }

    /// Same first name and handler
    pub fn same_identity(&self, other: &Command) -> bool {
        self.name() == other.name() && self.plugin == other.plugin && self.handler == other.handler
    }

    /// Does `name` (as typed) refer to this command?
    pub fn is_eligible_name(&self, name: &str, prefix: Option<&str>) -> bool {
        let name = if self.prefix {
            match prefix {
                Some(prefix) if !prefix.is_empty() => match name.strip_prefix(prefix) {
                    Some(rest) => rest,
                    None => return false,
                },
                _ => return false,
            }
        } else {
            name
        };

        let name = name.to_lowercase();
        self.names.iter().any(|n| *n == name)
    }

    /// May this command run on `channel`? Exclusion wins.
    pub fn is_eligible_channel(&self, channel: &Channel) -> bool {
        let name = channel.name();
        if self.exclude_channels.iter().any(|c| c == name) {
            return false;
        }
        self.channels.is_empty() || self.channels.iter().any(|c| c == name)
    }

    /// Required level after applying cvar overrides
    pub fn effective_permission(&self, engine: &dyn HostEngine, is_client_cmd: bool) -> i32 {
        let (cvar, default) = if is_client_cmd {
            (cvars::CCMD_PERM_PREFIX, self.client_cmd_perm)
        } else {
            (cvars::PERM_PREFIX, self.permission)
        };

        engine
            .get_cvar(&format!("{}{}", cvar, self.name()))
            .filter(|value| !value.is_empty())
            .and_then(|value| match value.trim().parse::<i32>() {
                Ok(level) => Some(level),
                Err(_) => {
                    tracing::warn!("Ignoring non-numeric permission override {}{}: {}", cvar, self.name(), value);
                    None
                }
            })
            .unwrap_or(default)
    }

    /// May `player` run this command?
    pub fn is_eligible_player(
        &self,
        player: &Player,
        is_client_cmd: bool,
        engine: &dyn HostEngine,
        owner: Option<i64>,
        permissions: &dyn PermissionStore,
    ) -> bool {
        let required = self.effective_permission(engine, is_client_cmd);
        if owner == Some(player.steam_id) || required == 0 {
            return true;
        }
        permissions.permission_level(player.steam_id) >= required
    }

    /// Run the handler
    pub fn execute(&self, player: &Player, message: &str, channel: &Channel) -> CommandResult {
        tracing::debug!(
            "{} executed: {} @ {} -> {}",
            player.steam_id,
            self.name(),
            self.plugin,
            channel
        );
        let args: Vec<String> = message.split_whitespace().map(str::to_string).collect();
        (self.callback)(player, &args, channel)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("plugin", &self.plugin)
            .field("names", &self.names)
            .field("handler", &self.handler)
            .field("permission", &self.permission)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
