//! The core context
//!
//! [`Core`] owns every registry, the scheduler and the per-server
//! protocol state. The plugin crate creates one at load time and drops it
//! at unload; nothing here is a process-wide global.

use std::sync::Arc;

use parking_lot::Mutex;
use qlrust_engine::HostEngine;
use qlrust_sdk::configstrings::CS_VOTE_STRING;
use qlrust_sdk::{ClientId, MAX_CLIENTS};

use crate::channels::Channel;
use crate::commands::CommandRegistry;
use crate::config::{cvars, CoreConfig};
use crate::events::{names, EventArgs, EventRegistry};
use crate::permissions::{MemoryPermissions, PermissionStore};
use crate::player::Player;
use crate::scheduler::FrameScheduler;
use crate::stats::StatsListener;

/// State the protocol handlers carry between callbacks
#[derive(Debug)]
pub(crate) struct ProtocolState {
    /// Last Attack & Defend round number
    pub(crate) ad_round_number: i64,
    /// No `new_game` seen yet
    pub(crate) first_game: bool,
    pub(crate) zmq_warning_issued: bool,
    /// Who called the vote that is about to start
    pub(crate) vote_caller: Option<Player>,
    /// Console output captured for a redirect
    pub(crate) print_redirect: Option<(Channel, String)>,
}

impl Default for ProtocolState {
    fn default() -> Self {
        Self {
            ad_round_number: 0,
            first_game: true,
            zmq_warning_issued: false,
            vote_caller: None,
            print_redirect: None,
        }
    }
}

/// Event dispatch, command routing and scheduling for one server
pub struct Core {
    engine: Arc<dyn HostEngine>,
    config: CoreConfig,
    events: EventRegistry,
    commands: CommandRegistry,
    scheduler: FrameScheduler,
    permissions: Arc<dyn PermissionStore>,
    pub(crate) state: Mutex<ProtocolState>,
    pub(crate) stats: Mutex<Option<StatsListener>>,
}

impl Core {
    /// Create a core with every built-in event and an empty permission store
    pub fn new(engine: Arc<dyn HostEngine>, config: CoreConfig) -> Self {
        let scheduler = FrameScheduler::new(config.handoff_capacity);
        Self {
            engine,
            config,
            events: EventRegistry::new(),
            commands: CommandRegistry::new(),
            scheduler,
            permissions: Arc::new(MemoryPermissions::new()),
            state: Mutex::new(ProtocolState::default()),
            stats: Mutex::new(None),
        }
    }

    /// Use `permissions` for command eligibility
    pub fn with_permissions(mut self, permissions: Arc<dyn PermissionStore>) -> Self {
        self.permissions = permissions;
        self
    }

    pub fn engine(&self) -> &dyn HostEngine {
        self.engine.as_ref()
    }

    /// Shared handle to the engine, for moving into callbacks
    pub fn engine_arc(&self) -> Arc<dyn HostEngine> {
        self.engine.clone()
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn permissions(&self) -> &dyn PermissionStore {
        self.permissions.as_ref()
    }

    /// The player in a client slot
    pub fn player(&self, client_id: ClientId) -> Option<Player> {
        if !(0..MAX_CLIENTS).contains(&client_id) {
            return None;
        }
        self.engine.player_info(client_id).map(Player::from_info)
    }

    /// Every connected player
    pub fn players(&self) -> Vec<Player> {
        self.engine
            .players_info()
            .into_iter()
            .map(Player::from_info)
            .collect()
    }

    pub fn find_player_by_steam_id(&self, steam_id: i64) -> Option<Player> {
        self.players().into_iter().find(|p| p.steam_id == steam_id)
    }

    /// Match on the color-stripped name, ignoring case
    pub fn find_player_by_name(&self, name: &str) -> Option<Player> {
        let name = crate::player::strip_colors(name).to_lowercase();
        self.players()
            .into_iter()
            .find(|p| p.clean_name().to_lowercase() == name)
    }

    /// SteamID64 of the server owner from `qlx_owner`
    pub fn owner(&self) -> Option<i64> {
        let value = self.engine.get_cvar(cvars::OWNER)?;
        match value.trim().parse::<i64>() {
            Ok(id) if id > 0 => Some(id),
            _ => {
                if !value.trim().is_empty() {
                    tracing::warn!("qlx_owner is not a valid SteamID64: {}", value);
                }
                None
            }
        }
    }

    /// A vote is running while the vote configstring is set
    pub fn is_vote_active(&self) -> bool {
        !self.engine.get_configstring(CS_VOTE_STRING).is_empty()
    }

    /// One scheduler tick: due tasks, the `frame` event, then the hand-off drain
    pub fn run_frame(&self) {
        self.scheduler.run_due(self);

        if let Err(e) = self.events.dispatch(names::FRAME, EventArgs::empty()) {
            tracing::error!("Failed to dispatch frame event: {}", e);
        }

        self.scheduler.drain_handoff();
    }

    /// Capture console output until the returned guard drops, then reply
    /// it to `channel`
    pub fn redirect_print(&self, channel: Channel) -> PrintRedirect<'_> {
        self.state.lock().print_redirect = Some((channel, String::new()));
        PrintRedirect { core: self }
    }

    /// Stop background work and drop pending tasks
    pub fn shutdown(&self) {
        self.stop_stats();
        self.scheduler.clear();
        tracing::info!("qlrust core shut down");
    }
}

/// Guard returned by [`Core::redirect_print`]
#[must_use = "output is only captured while the guard is alive"]
pub struct PrintRedirect<'a> {
    core: &'a Core,
}

impl Drop for PrintRedirect<'_> {
    fn drop(&mut self) {
        // Taken before replying; the reply prints to the console again
        let redirect = self.core.state.lock().print_redirect.take();
        if let Some((channel, text)) = redirect {
            if !text.is_empty() {
                channel.reply(self.core.engine(), &text);
            }
        }
    }
}

impl Drop for Core {
    fn drop(&mut self) {
        self.stop_stats();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlrust_engine::testing::FakeEngine;
    use qlrust_sdk::{PlayerInfo, Team};

    fn core() -> (Arc<FakeEngine>, Core) {
        let engine = Arc::new(FakeEngine::new());
        engine.add_player(PlayerInfo {
            client_id: 4,
            name: "^3Mi^7ke".to_string(),
            steam_id: 42,
            team: Team::Blue,
            ..Default::default()
        });
        (engine.clone(), Core::new(engine, CoreConfig::default()))
    }

    #[test]
    fn test_player_lookup() {
        let (_, core) = core();
        assert_eq!(core.player(4).map(|p| p.steam_id), Some(42));
        assert!(core.player(5).is_none());
        assert!(core.player(-1).is_none());
        assert_eq!(core.find_player_by_name("MIKE").map(|p| p.id), Some(4));
        assert_eq!(core.find_player_by_steam_id(42).map(|p| p.id), Some(4));
        assert!(core.find_player_by_steam_id(7).is_none());
    }

    #[test]
    fn test_owner_cvar() {
        let (engine, core) = core();
        assert_eq!(core.owner(), None);
        engine.set_cvar("qlx_owner", "76561198000000001");
        assert_eq!(core.owner(), Some(76561198000000001));
        engine.set_cvar("qlx_owner", "nobody");
        assert_eq!(core.owner(), None);
    }

    #[test]
    fn test_print_redirect_flushes_on_drop() {
        let (engine, core) = core();
        {
            let _guard = core.redirect_print(Channel::Console);
            core.handle_console_print("line one\n");
            core.handle_console_print("line two");
        }
        assert_eq!(
            engine.console_prints(),
            vec!["line one\n", "line two\n"]
        );

        // Nothing is captured once the guard is gone
        core.handle_console_print("after\n");
        assert_eq!(engine.console_prints().len(), 2);
    }
}
