use qlrust_sdk::configstrings::{
    CS_ROUND_STATUS, CS_SERVERINFO, CS_VOTE_NO, CS_VOTE_STRING, CS_VOTE_YES,
};
use qlrust_sdk::{ClientId, MAX_CLIENTS};

use super::configstring::{game_state_change, round_signal, GameStateChange, RoundSignal};
use super::patterns::{self, ClientCommand};
use super::{guarded, Outcome};
use crate::channels::Channel;
use crate::config::cvars;
use crate::context::Core;
use crate::damage::DamageFlags;
use crate::error::CoreResult;
use crate::events::{names, Arg, Target};
use crate::player::{Player, Vars};

impl Core {
    /// Console input, run through the command registry as the owner
    pub fn handle_rcon(&self, cmd: &str) -> Outcome {
        guarded("rcon", || {
            let console = Player::console(self.owner().unwrap_or_default());
            self.commands()
                .handle_input(self, &console, cmd, &Channel::Console);
            Ok(Outcome::Allow)
        })
    }

    /// A command sent by a client (`say`, `callvote`, `userinfo`, ...)
    pub fn handle_client_command(&self, client_id: ClientId, cmd: &str) -> Outcome {
        guarded("client_command", || {
            let Some(player) = self.player(client_id) else {
                return Ok(Outcome::Allow);
            };

            let dispatch = self.events().dispatch(
                names::CLIENT_COMMAND,
                vec![Arg::Player(player.clone()), Arg::Text(cmd.to_string())],
            )?;
            if dispatch.is_blocked() {
                return Ok(Outcome::Block);
            }
            let rewritten = dispatch.text().map(str::to_string);
            let cmd = rewritten.as_deref().unwrap_or(cmd);

            let channel = Channel::ClientCommand(player.id);
            if !self.commands().handle_input(self, &player, cmd, &channel) {
                return Ok(Outcome::Block);
            }

            match self.classify_client_command(&player, cmd)? {
                Outcome::Allow => Ok(Outcome::rewrite_or_allow(rewritten)),
                outcome => Ok(outcome),
            }
        })
    }

    fn classify_client_command(&self, player: &Player, cmd: &str) -> CoreResult<Outcome> {
        match patterns::classify(cmd) {
            Some(ClientCommand::Say(msg)) => self.handle_chat(player, msg, Channel::Chat, "say"),
            Some(ClientCommand::SayTeam(msg)) => {
                self.handle_chat(player, msg, Channel::for_team(player.team), "say_team")
            }
            Some(ClientCommand::CallVote { vote, args }) if !self.is_vote_active() => {
                // Attributed to the vote once its configstring shows up
                self.state.lock().vote_caller = Some(player.clone());
                let dispatch = self.events().dispatch(
                    names::VOTE_CALLED,
                    vec![
                        Arg::Player(player.clone()),
                        Arg::Text(vote.to_string()),
                        Arg::Text(args.to_string()),
                    ],
                )?;
                Ok(block_or_allow(dispatch.is_blocked()))
            }
            Some(ClientCommand::Vote(arg)) if self.is_vote_active() => {
                let yes = match arg {
                    'y' | '1' => true,
                    'n' | '2' => false,
                    _ => return Ok(Outcome::Allow),
                };
                let dispatch = self
                    .events()
                    .dispatch(names::VOTE, vec![Arg::Player(player.clone()), Arg::Bool(yes)])?;
                Ok(block_or_allow(dispatch.is_blocked()))
            }
            Some(ClientCommand::Team(arg)) => {
                if arg == player.team.initial() {
                    return Ok(Outcome::Allow);
                }
                let target = match arg {
                    'f' => "free",
                    'r' => "red",
                    'b' => "blue",
                    's' => "spectator",
                    'a' => "any",
                    _ => return Ok(Outcome::Allow),
                };
                let dispatch = self.events().dispatch(
                    names::TEAM_SWITCH_ATTEMPT,
                    vec![
                        Arg::Player(player.clone()),
                        Arg::Text(player.team.name().to_string()),
                        Arg::Text(target.to_string()),
                    ],
                )?;
                Ok(block_or_allow(dispatch.is_blocked()))
            }
            Some(ClientCommand::Userinfo(vars)) => self.handle_userinfo(player, vars),
            _ => Ok(Outcome::Allow),
        }
    }

    fn handle_chat(&self, player: &Player, msg: &str, channel: Channel, verb: &str) -> CoreResult<Outcome> {
        let msg = msg.replace('"', "'");

        if !self.commands().handle_input(self, player, &msg, &channel) {
            return Ok(Outcome::Block);
        }

        let dispatch = self.events().dispatch(
            names::CHAT,
            vec![
                Arg::Player(player.clone()),
                Arg::Text(msg.clone()),
                Arg::Channel(channel),
            ],
        )?;
        if dispatch.is_blocked() {
            return Ok(Outcome::Block);
        }

        let msg = dispatch
            .text()
            .map(|text| text.replace('"', "'"))
            .unwrap_or(msg);
        Ok(Outcome::Rewrite(format!("{} \"{}\"", verb, msg)))
    }

    fn handle_userinfo(&self, player: &Player, vars: &str) -> CoreResult<Outcome> {
        let mut new_info = Vars::parse(vars);
        let changed = new_info.changed_from(&player.userinfo);
        if changed.is_empty() {
            return Ok(Outcome::Allow);
        }

        let dispatch = self.events().dispatch(
            names::USERINFO,
            vec![Arg::Player(player.clone()), Arg::Vars(changed)],
        )?;
        if dispatch.is_blocked() {
            return Ok(Outcome::Block);
        }

        match dispatch.vars() {
            Some(replacement) => {
                new_info.merge(replacement);
                Ok(Outcome::Rewrite(format!("userinfo \"{}\"", new_info)))
            }
            None => Ok(Outcome::Allow),
        }
    }

    /// A command the server sends to one client, or to everyone when
    /// `client_id` is negative
    pub fn handle_server_command(&self, client_id: ClientId, cmd: &str) -> Outcome {
        guarded("server_command", || {
            let player = if client_id < 0 {
                None
            } else {
                match self.player(client_id) {
                    Some(player) => Some(player),
                    None => return Ok(Outcome::Allow),
                }
            };

            let dispatch = self.events().dispatch(
                names::SERVER_COMMAND,
                vec![Arg::OptPlayer(player), Arg::Text(cmd.to_string())],
            )?;
            if dispatch.is_blocked() {
                return Ok(Outcome::Block);
            }
            let rewritten = dispatch.text().map(str::to_string);

            if let Some(passed) = patterns::vote_ended(rewritten.as_deref().unwrap_or(cmd)) {
                self.dispatch_vote_ended(passed)?;
            }

            Ok(Outcome::rewrite_or_allow(rewritten))
        })
    }

    fn dispatch_vote_ended(&self, passed: bool) -> CoreResult<()> {
        let engine = self.engine();
        let vote_string = engine.get_configstring(CS_VOTE_STRING);
        if vote_string.is_empty() {
            tracing::debug!("vote_ended went off without a vote configstring");
            return Ok(());
        }
        let Some((vote, args)) = patterns::vote_string(&vote_string) else {
            tracing::debug!("Invalid vote called: {}", vote_string);
            return Ok(());
        };

        let count = |index| {
            engine
                .get_configstring(index)
                .trim()
                .parse::<i64>()
                .unwrap_or(0)
        };

        self.events().dispatch(
            names::VOTE_ENDED,
            vec![
                Arg::Int(count(CS_VOTE_YES)),
                Arg::Int(count(CS_VOTE_NO)),
                Arg::Text(vote.to_string()),
                Arg::Text(args.to_string()),
                Arg::Bool(passed),
            ],
        )?;
        Ok(())
    }

    /// The server is about to set a configstring
    pub fn handle_set_configstring(&self, index: u32, value: &str) -> Outcome {
        guarded("set_configstring", || {
            let dispatch = self.events().dispatch(
                names::SET_CONFIGSTRING,
                vec![Arg::Int(index as i64), Arg::Text(value.to_string())],
            )?;
            if dispatch.is_blocked() {
                return Ok(Outcome::Block);
            }
            let rewritten = dispatch.text().map(str::to_string);
            let value = rewritten.as_deref().unwrap_or(value);

            match index {
                CS_VOTE_STRING if !value.is_empty() => self.vote_started(value)?,
                CS_SERVERINFO => self.game_state_changed(value)?,
                CS_ROUND_STATUS => self.round_status_changed(value)?,
                _ => {}
            }

            Ok(Outcome::rewrite_or_allow(rewritten))
        })
    }

    fn vote_started(&self, value: &str) -> CoreResult<()> {
        let mut parts = value.split_whitespace();
        let vote = parts.next().unwrap_or_default().to_string();
        let args = parts.collect::<Vec<_>>().join(" ");
        let caller = self.state.lock().vote_caller.take();

        self.events().dispatch(
            names::VOTE_STARTED,
            vec![Arg::OptPlayer(caller), Arg::Text(vote), Arg::Text(args)],
        )?;
        Ok(())
    }

    fn game_state_changed(&self, value: &str) -> CoreResult<()> {
        let old = Vars::parse(&self.engine().get_configstring(CS_SERVERINFO));
        if old.is_empty() {
            return Ok(());
        }

        match game_state_change(&old, &Vars::parse(value)) {
            GameStateChange::Countdown => {
                self.state.lock().ad_round_number = 1;
                self.events().dispatch(names::GAME_COUNTDOWN, vec![])?;
            }
            GameStateChange::Unknown { old, new } => {
                tracing::warn!("UNKNOWN GAME STATES: {} - {}", old, new);
            }
            GameStateChange::Unchanged | GameStateChange::Expected => {}
        }
        Ok(())
    }

    fn round_status_changed(&self, value: &str) -> CoreResult<()> {
        let status = Vars::parse(value);
        let signal = {
            let mut state = self.state.lock();
            round_signal(&status, &mut state.ad_round_number)
        };

        match signal {
            Ok(Some(RoundSignal::Countdown(round))) => {
                self.events()
                    .dispatch(names::ROUND_COUNTDOWN, vec![Arg::Int(round)])?;
            }
            Ok(Some(RoundSignal::Start(round))) => {
                self.events()
                    .dispatch(names::ROUND_START, vec![Arg::Int(round)])?;
            }
            Ok(None) => {}
            Err(reason) => tracing::warn!("Malformed round status '{}': {}", value, reason),
        }
        Ok(())
    }

    /// A new map or a map restart
    pub fn handle_new_game(&self, is_restart: bool) -> Outcome {
        guarded("new_game", || {
            let first_game = std::mem::replace(&mut self.state.lock().first_game, false);
            if first_game {
                self.late_init();
            }

            if !is_restart {
                let engine = self.engine();
                self.events().dispatch(
                    names::MAP,
                    vec![
                        Arg::Text(engine.get_cvar(cvars::MAPNAME).unwrap_or_default()),
                        Arg::Text(engine.get_cvar(cvars::FACTORY).unwrap_or_default()),
                    ],
                )?;
            }

            self.events().dispatch(names::NEW_GAME, vec![])?;
            Ok(Outcome::Allow)
        })
    }

    /// Setup that needs a running server
    fn late_init(&self) {
        let stats_enabled = self
            .engine()
            .get_cvar(cvars::ZMQ_STATS_ENABLE)
            .and_then(|value| value.trim().parse::<i64>().ok())
            .is_some_and(|value| value != 0);

        if !stats_enabled {
            let mut state = self.state.lock();
            if !state.zmq_warning_issued {
                tracing::warn!(
                    "Some events will not work because ZMQ stats is not enabled. \
                     Launch the server with \"zmq_stats_enable 1\""
                );
                state.zmq_warning_issued = true;
            }
            return;
        }

        self.start_default_stats();
    }

    /// Text the server prints to its console
    pub fn handle_console_print(&self, text: &str) -> Outcome {
        if text.is_empty() {
            return Outcome::Allow;
        }

        guarded("console_print", || {
            tracing::debug!(target: "qlrust::console", "{}", text.trim_end_matches('\n'));

            let dispatch = self
                .events()
                .dispatch(names::CONSOLE_PRINT, vec![Arg::Text(text.to_string())])?;
            if dispatch.is_blocked() {
                return Ok(Outcome::Block);
            }

            if let Some((_, buffer)) = self.state.lock().print_redirect.as_mut() {
                buffer.push_str(text);
            }

            Ok(Outcome::rewrite_or_allow(dispatch.text().map(str::to_string)))
        })
    }

    /// Once per server frame
    pub fn handle_frame(&self) -> Outcome {
        guarded("frame", || {
            self.run_frame();
            Ok(Outcome::Allow)
        })
    }

    /// A client is connecting; blocking refuses the connection
    pub fn handle_player_connect(&self, client_id: ClientId, _is_bot: bool) -> Outcome {
        self.player_event("player_connect", names::PLAYER_CONNECT, client_id, vec![])
    }

    pub fn handle_player_loaded(&self, client_id: ClientId) -> Outcome {
        self.player_event("player_loaded", names::PLAYER_LOADED, client_id, vec![])
    }

    pub fn handle_player_disconnect(&self, client_id: ClientId, reason: &str) -> Outcome {
        self.player_event(
            "player_disconnect",
            names::PLAYER_DISCONNECT,
            client_id,
            vec![Arg::Text(reason.to_string())],
        )
    }

    pub fn handle_player_spawn(&self, client_id: ClientId) -> Outcome {
        self.player_event("player_spawn", names::PLAYER_SPAWN, client_id, vec![])
    }

    pub fn handle_kamikaze_use(&self, client_id: ClientId) -> Outcome {
        self.player_event("kamikaze_use", names::KAMIKAZE_USE, client_id, vec![])
    }

    pub fn handle_kamikaze_explode(&self, client_id: ClientId, used_on_demand: bool) -> Outcome {
        self.player_event(
            "kamikaze_explode",
            names::KAMIKAZE_EXPLODE,
            client_id,
            vec![Arg::Bool(used_on_demand)],
        )
    }

    fn player_event(&self, entry: &'static str, event: &str, client_id: ClientId, extra: Vec<Arg>) -> Outcome {
        guarded(entry, || {
            let Some(player) = self.player(client_id) else {
                return Ok(Outcome::Allow);
            };

            let mut args = vec![Arg::Player(player)];
            args.extend(extra);
            let dispatch = self.events().dispatch(event, args)?;
            Ok(block_or_allow(dispatch.is_blocked()))
        })
    }

    /// Something took damage. Client slots resolve to players; anything
    /// else stays an entity number.
    pub fn handle_damage(
        &self,
        target_id: i32,
        attacker_id: i32,
        damage: i32,
        dflags: DamageFlags,
        means_of_death: i32,
    ) -> Outcome {
        guarded("damage", || {
            let resolve = |id: i32| {
                (0..MAX_CLIENTS)
                    .contains(&id)
                    .then(|| self.player(id))
                    .flatten()
                    .map_or(Target::Entity(id), Target::Player)
            };

            self.events().dispatch(
                names::DAMAGE,
                vec![
                    Arg::Target(resolve(target_id)),
                    Arg::Target(resolve(attacker_id)),
                    Arg::Int(damage as i64),
                    Arg::Int(dflags.bits() as i64),
                    Arg::Int(means_of_death as i64),
                ],
            )?;
            Ok(Outcome::Allow)
        })
    }

    /// Tell hooks a plugin is going away, then drop everything it registered
    pub fn unload_plugin(&self, plugin: &str) -> Outcome {
        guarded("unload", || {
            self.events()
                .dispatch(names::UNLOAD, vec![Arg::Text(plugin.to_string())])?;

            let hooks = self.events().remove_plugin_hooks(plugin);
            let commands = self.commands().remove_plugin_commands(plugin);
            tracing::info!(
                "Unloaded plugin {}: removed {} hooks and {} commands",
                plugin,
                hooks,
                commands
            );
            Ok(Outcome::Allow)
        })
    }
}

fn block_or_allow(blocked: bool) -> Outcome {
    if blocked {
        Outcome::Block
    } else {
        Outcome::Allow
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use qlrust_engine::testing::FakeEngine;
    use qlrust_sdk::{PlayerInfo, Team};

    use super::*;
    use crate::commands::{Command, CommandResult};
    use crate::config::CoreConfig;
    use crate::events::{EventArgs, HookResult, Payload, Priority};

    fn setup() -> (Arc<FakeEngine>, Core) {
        let engine = Arc::new(FakeEngine::new());
        engine.add_player(PlayerInfo {
            client_id: 0,
            name: "Bar".to_string(),
            userinfo: "\\name\\Bar\\rate\\25000".to_string(),
            steam_id: 76561198000000001,
            team: Team::Red,
            ..Default::default()
        });
        let core = Core::new(engine.clone(), CoreConfig::default());
        (engine, core)
    }

    /// Record the arguments of every dispatch of `event`
    fn record(core: &Core, event: &str) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = log.clone();
        core.events()
            .lookup(event)
            .unwrap()
            .add_hook("test", "record", Priority::Normal, move |args: &EventArgs| {
                l.lock().push(args.to_string());
                HookResult::Continue
            })
            .unwrap();
        log
    }

    fn hook<F>(core: &Core, event: &str, f: F)
    where
        F: Fn(&EventArgs) -> HookResult + Send + Sync + 'static,
    {
        core.events()
            .lookup(event)
            .unwrap()
            .add_hook("test", "hook", Priority::High, f)
            .unwrap();
    }

    #[test]
    fn test_userinfo_dispatches_only_changed_keys() {
        let (_, core) = setup();
        let changed = Arc::new(Mutex::new(None));
        let c = changed.clone();
        hook(&core, names::USERINFO, move |args| {
            *c.lock() = args.vars(1).cloned();
            HookResult::Continue
        });

        let outcome = core.handle_client_command(0, r#"userinfo "\name\Foo\rate\25000""#);
        assert_eq!(outcome, Outcome::Allow);

        let changed = changed.lock().clone().unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed.get("name"), Some("Foo"));
    }

    #[test]
    fn test_userinfo_replacement_keeps_other_keys() {
        let (_, core) = setup();
        hook(&core, names::USERINFO, |_| {
            let mut vars = Vars::new();
            vars.insert("name", "Censored");
            HookResult::Replace(Payload::Vars(vars))
        });

        let outcome = core.handle_client_command(0, r#"userinfo "\name\Foo\rate\25000\sex\male""#);
        assert_eq!(
            outcome,
            Outcome::Rewrite(r#"userinfo "\name\Censored\rate\25000\sex\male""#.to_string())
        );
    }

    #[test]
    fn test_unchanged_userinfo_is_not_dispatched() {
        let (_, core) = setup();
        let log = record(&core, names::USERINFO);
        assert_eq!(
            core.handle_client_command(0, r#"userinfo "\name\Bar\rate\25000""#),
            Outcome::Allow
        );
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_chat_normalizes_quotes_and_picks_team_channel() {
        let (_, core) = setup();
        let channels = Arc::new(Mutex::new(Vec::new()));
        let c = channels.clone();
        hook(&core, names::CHAT, move |args| {
            c.lock().push(args.channel(2).map(|ch| ch.name()).unwrap_or_default());
            HookResult::Continue
        });

        assert_eq!(
            core.handle_client_command(0, r#"say "he said "hi"""#),
            Outcome::Rewrite(r#"say "he said 'hi'""#.to_string())
        );
        assert_eq!(
            core.handle_client_command(0, "say_team go"),
            Outcome::Rewrite(r#"say_team "go""#.to_string())
        );
        assert_eq!(*channels.lock(), vec!["chat", "red_team_chat"]);
    }

    #[test]
    fn test_chat_command_blocks_say() {
        let (engine, core) = setup();
        engine.set_cvar("qlx_commandPrefix", "!");
        let chat = record(&core, names::CHAT);
        core.commands()
            .add_command(
                Command::new("fun", &["hush"], "cmd_hush", |_, _, _| CommandResult::Stop),
                Priority::Normal,
            )
            .unwrap();

        assert_eq!(core.handle_client_command(0, "say !hush"), Outcome::Block);
        assert!(chat.lock().is_empty());
    }

    #[test]
    fn test_client_command_rewrite_and_block() {
        let (_, core) = setup();
        hook(&core, names::CLIENT_COMMAND, |args| match args.text(1) {
            Some("kill") => HookResult::Stop,
            Some("scores") => HookResult::Replace(Payload::Text("score".to_string())),
            _ => HookResult::Continue,
        });

        assert_eq!(core.handle_client_command(0, "kill"), Outcome::Block);
        assert_eq!(
            core.handle_client_command(0, "scores"),
            Outcome::Rewrite("score".to_string())
        );
        assert_eq!(core.handle_client_command(0, "follow"), Outcome::Allow);
        assert_eq!(core.handle_client_command(9, "kill"), Outcome::Allow);
    }

    #[test]
    fn test_callvote_only_without_active_vote() {
        let (engine, core) = setup();
        let called = record(&core, names::VOTE_CALLED);

        core.handle_client_command(0, r#"callvote map "campgrounds""#);
        assert_eq!(*called.lock(), vec![r#"Bar, "map", "campgrounds""#]);

        engine.put_configstring(CS_VOTE_STRING, "map campgrounds");
        core.handle_client_command(0, "cv kick 2");
        assert_eq!(called.lock().len(), 1);
    }

    #[test]
    fn test_vote_started_uses_recorded_caller() {
        let (_, core) = setup();
        let started = record(&core, names::VOTE_STARTED);

        core.handle_client_command(0, "callvote map campgrounds");
        core.handle_set_configstring(CS_VOTE_STRING, "map campgrounds ca");
        core.handle_set_configstring(CS_VOTE_STRING, "shuffle");

        assert_eq!(
            *started.lock(),
            vec![r#"Bar, "map", "campgrounds ca""#, r#"None, "shuffle", """#]
        );
    }

    #[test]
    fn test_vote_cast_requires_active_vote() {
        let (engine, core) = setup();
        let votes = Arc::new(Mutex::new(Vec::new()));
        let v = votes.clone();
        hook(&core, names::VOTE, move |args| {
            v.lock().push(args.bool(1).unwrap_or_default());
            HookResult::Stop
        });

        assert_eq!(core.handle_client_command(0, "vote yes"), Outcome::Allow);
        engine.put_configstring(CS_VOTE_STRING, "restart");
        assert_eq!(core.handle_client_command(0, "vote 2"), Outcome::Block);
        assert_eq!(core.handle_client_command(0, "vote y"), Outcome::Block);
        assert_eq!(core.handle_client_command(0, "vote x"), Outcome::Allow);
        assert_eq!(*votes.lock(), vec![false, true]);
    }

    #[test]
    fn test_team_switch_attempt() {
        let (_, core) = setup();
        let attempts = record(&core, names::TEAM_SWITCH_ATTEMPT);

        assert_eq!(core.handle_client_command(0, "team r"), Outcome::Allow);
        core.handle_client_command(0, "team s");
        core.handle_client_command(0, "team any");
        core.handle_client_command(0, "team x");

        assert_eq!(*attempts.lock(), vec![r#"Bar, "red", "spectator""#, r#"Bar, "red", "any""#]);
    }

    #[test]
    fn test_vote_ended_reads_configstrings() {
        let (engine, core) = setup();
        let ended = record(&core, names::VOTE_ENDED);

        // No vote string: nothing to report
        core.handle_server_command(-1, "print \"Vote passed.\n\"");
        assert!(ended.lock().is_empty());

        engine.put_configstring(CS_VOTE_STRING, r#"map "campgrounds""#);
        engine.put_configstring(CS_VOTE_YES, "5");
        engine.put_configstring(CS_VOTE_NO, "2");
        assert_eq!(
            core.handle_server_command(-1, "print \"Vote passed.\n\""),
            Outcome::Allow
        );
        assert_eq!(*ended.lock(), vec![r#"5, 2, "map", "campgrounds", true"#]);
    }

    #[test]
    fn test_server_command_to_unknown_client_is_ignored() {
        let (_, core) = setup();
        let log = record(&core, names::SERVER_COMMAND);
        core.handle_server_command(12, "cs 5 x");
        core.handle_server_command(0, "cs 5 x");
        core.handle_server_command(-1, "cs 5 x");
        assert_eq!(*log.lock(), vec![r#"Bar, "cs 5 x""#, r#"None, "cs 5 x""#]);
    }

    #[test]
    fn test_round_status_configstring() {
        let (_, core) = setup();
        let countdown = record(&core, names::ROUND_COUNTDOWN);
        let start = record(&core, names::ROUND_START);

        core.handle_set_configstring(CS_ROUND_STATUS, "\\round\\2\\time\\30");
        core.handle_set_configstring(CS_ROUND_STATUS, "\\round\\2");
        core.handle_set_configstring(CS_ROUND_STATUS, "\\turn\\1\\round\\0\\state\\1");
        // Malformed input is logged, not fatal
        assert_eq!(
            core.handle_set_configstring(CS_ROUND_STATUS, "\\round\\x"),
            Outcome::Allow
        );

        assert_eq!(*countdown.lock(), vec!["2"]);
        assert_eq!(*start.lock(), vec!["2", "2"]);
    }

    #[test]
    fn test_game_countdown_resets_round_number() {
        let (engine, core) = setup();
        let countdown = record(&core, names::GAME_COUNTDOWN);
        core.state.lock().ad_round_number = 7;

        // Nothing known about the old state yet
        core.handle_set_configstring(CS_SERVERINFO, "\\g_gameState\\COUNT_DOWN");
        assert!(countdown.lock().is_empty());

        engine.put_configstring(CS_SERVERINFO, "\\g_gameState\\PRE_GAME");
        core.handle_set_configstring(CS_SERVERINFO, "\\g_gameState\\COUNT_DOWN");
        assert_eq!(countdown.lock().len(), 1);
        assert_eq!(core.state.lock().ad_round_number, 1);
    }

    #[test]
    fn test_set_configstring_rewrite() {
        let (_, core) = setup();
        hook(&core, names::SET_CONFIGSTRING, |args| match args.int(0) {
            Some(3) => HookResult::Replace(Payload::Text("welcome".to_string())),
            Some(4) => HookResult::Stop,
            _ => HookResult::Continue,
        });

        assert_eq!(
            core.handle_set_configstring(3, "motd"),
            Outcome::Rewrite("welcome".to_string())
        );
        assert_eq!(core.handle_set_configstring(4, "x"), Outcome::Block);
        assert_eq!(core.handle_set_configstring(2, "x"), Outcome::Allow);
    }

    #[test]
    fn test_new_game_dispatches_map_unless_restart() {
        let (engine, core) = setup();
        engine.set_cvar("mapname", "campgrounds");
        engine.set_cvar("g_factory", "ca");
        let map = record(&core, names::MAP);
        let new_game = record(&core, names::NEW_GAME);

        core.handle_new_game(false);
        core.handle_new_game(true);

        assert_eq!(*map.lock(), vec![r#""campgrounds", "ca""#]);
        assert_eq!(new_game.lock().len(), 2);
        assert!(core.state.lock().zmq_warning_issued);
    }

    #[test]
    fn test_console_print_redirect_and_rewrite() {
        let (engine, core) = setup();
        hook(&core, names::CONSOLE_PRINT, |args| match args.text(0) {
            Some("secret\n") => HookResult::Stop,
            Some(text) if text.contains("darn") => {
                HookResult::Replace(Payload::Text(text.replace("darn", "****")))
            }
            _ => HookResult::Continue,
        });

        assert_eq!(core.handle_console_print(""), Outcome::Allow);
        assert_eq!(core.handle_console_print("secret\n"), Outcome::Block);
        assert_eq!(
            core.handle_console_print("darn it\n"),
            Outcome::Rewrite("**** it\n".to_string())
        );

        {
            let _redirect = core.redirect_print(Channel::Tell(0));
            core.handle_console_print("status line");
        }
        let sent = engine.server_commands();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].command, "print \"status line\n\"\n");
    }

    #[test]
    fn test_player_events() {
        let (_, core) = setup();
        let disconnects = record(&core, names::PLAYER_DISCONNECT);
        hook(&core, names::PLAYER_CONNECT, |_| HookResult::Stop);

        assert_eq!(core.handle_player_connect(0, false), Outcome::Block);
        assert_eq!(core.handle_player_connect(5, false), Outcome::Allow);
        assert_eq!(core.handle_player_disconnect(0, "timed out"), Outcome::Allow);
        assert_eq!(*disconnects.lock(), vec![r#"Bar, "timed out""#]);
    }

    #[test]
    fn test_damage_resolves_targets() {
        let (_, core) = setup();
        let targets = Arc::new(Mutex::new(Vec::new()));
        let t = targets.clone();
        hook(&core, names::DAMAGE, move |args| {
            let target = args.target(0).map(|t| t.player().is_some());
            let attacker = args.target(1).map(|t| t.id());
            t.lock().push((target, attacker, args.int(3)));
            HookResult::Continue
        });

        core.handle_damage(0, 1022, 100, DamageFlags::RADIUS, 7);
        assert_eq!(*targets.lock(), vec![(Some(true), Some(1022), Some(1))]);
    }

    #[test]
    fn test_rcon_runs_commands_as_owner() {
        let (engine, core) = setup();
        engine.set_cvar("qlx_owner", "76561198000000099");
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = seen.clone();
        core.commands()
            .add_command(
                Command::new("admin", &["status"], "cmd_status", move |player, _, channel| {
                    s.lock().push((player.steam_id, channel.name()));
                    CommandResult::Ok
                })
                .prefix(false)
                .permission(5),
                Priority::Normal,
            )
            .unwrap();

        assert_eq!(core.handle_rcon("status"), Outcome::Allow);
        assert_eq!(*seen.lock(), vec![(76561198000000099, "console")]);
    }

    #[test]
    fn test_unload_plugin_removes_everything() {
        let (_, core) = setup();
        let unloads = record(&core, names::UNLOAD);
        hook(&core, names::FRAME, |_| HookResult::Continue);
        core.commands()
            .add_command(
                Command::new("test", &["x"], "h", |_, _, _| CommandResult::Ok),
                Priority::Normal,
            )
            .unwrap();

        core.unload_plugin("test");
        assert_eq!(*unloads.lock(), vec![r#""test""#]);
        assert_eq!(core.events().lookup(names::FRAME).unwrap().hook_count(), 0);
        assert!(core.commands().is_empty());
    }

    #[test]
    fn test_panicking_hook_does_not_fault_entry_point() {
        let (_, core) = setup();
        hook(&core, names::PLAYER_SPAWN, |_| panic!("plugin bug"));
        assert_eq!(core.handle_player_spawn(0), Outcome::Allow);
    }
}
