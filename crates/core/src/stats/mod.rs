//! Stats Feed Bridge
//!
//! A background thread reads the server's match telemetry feed and hands
//! every message to the frame thread, where it becomes a `stats` event
//! plus at most one derived event:
//!
//! | `TYPE`              | Derived event                                   |
//! |---------------------|-------------------------------------------------|
//! | `MATCH_STARTED`     | `game_start`                                    |
//! | `ROUND_OVER`        | `round_end`                                     |
//! | `MATCH_REPORT`      | `game_end`, only after a `MATCH_STARTED`        |
//! | `PLAYER_DEATH`      | `death`, plus `kill` when the killer is known   |
//! | `PLAYER_SWITCHTEAM` | `team_switch`; blocking it puts the player back |
//!
//! The transport is a [`StatsSource`]. With the `zmq` feature,
//! [`ZmqSource`] subscribes to the server's ZeroMQ publisher.

mod message;
mod tracker;
#[cfg(feature = "zmq")]
mod transport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use qlrust_engine::HostEngine;
use serde_json::Value;

use crate::config::{cvars, StatsConfig};
use crate::context::Core;
use crate::error::{CoreResult, SchedulerError, StatsError};
use crate::events::{names, Arg};
use crate::player::Player;
use crate::scheduler::{spawn_background, SchedulerHandle};

pub use message::{StatsKind, StatsMessage};
pub use tracker::{Route, StatsTracker};
#[cfg(feature = "zmq")]
pub use transport::ZmqSource;

/// A connection to the stats feed
pub trait StatsSource: Send + 'static {
    /// Open the connection
    fn connect(&mut self, address: &str, password: &str) -> Result<(), StatsError>;

    /// Wait up to `timeout` for one message; `Ok(None)` when nothing arrived
    fn poll(&mut self, timeout: Duration) -> Result<Option<String>, StatsError>;

    /// Close the connection
    fn disconnect(&mut self);
}

/// Where the feed lives, taken from the server's cvars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsEndpoint {
    pub address: String,
    pub password: String,
}

impl StatsEndpoint {
    pub fn from_engine(engine: &dyn HostEngine) -> Self {
        let cvar = |name| engine.get_cvar(name).filter(|value| !value.is_empty());
        let host = cvar(cvars::ZMQ_STATS_IP).unwrap_or_else(|| "127.0.0.1".to_string());
        let port = cvar(cvars::ZMQ_STATS_PORT)
            .or_else(|| cvar(cvars::NET_PORT))
            .unwrap_or_default();

        Self {
            address: format!("tcp://{}:{}", host, port),
            password: engine
                .get_cvar(cvars::ZMQ_STATS_PASSWORD)
                .unwrap_or_default(),
        }
    }
}

/// Handle to the listener thread; stops it on drop
pub struct StatsListener {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl StatsListener {
    /// Start listening on a background thread
    pub fn start<S: StatsSource>(
        source: S,
        endpoint: StatsEndpoint,
        config: StatsConfig,
        handle: SchedulerHandle,
    ) -> Result<Self, SchedulerError> {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let thread = spawn_background("qlrust-stats", move || {
            listen(source, &endpoint, &config, &handle, &flag);
        })?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the loop to stop at its next poll and wait for it
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Stats listener thread ended abnormally");
            }
        }
    }
}

impl Drop for StatsListener {
    fn drop(&mut self) {
        self.stop();
    }
}

fn listen<S: StatsSource>(
    mut source: S,
    endpoint: &StatsEndpoint,
    config: &StatsConfig,
    handle: &SchedulerHandle,
    stop: &AtomicBool,
) {
    // Kept across reconnects
    let mut tracker = StatsTracker::new();

    while !stop.load(Ordering::SeqCst) {
        if let Err(e) = source.connect(&endpoint.address, &endpoint.password) {
            tracing::warn!("{}", e);
            pause(config.reconnect_delay(), config.poll_timeout(), stop);
            continue;
        }
        tracing::info!("Listening to stats feed at {}", endpoint.address);

        while !stop.load(Ordering::SeqCst) {
            let text = match source.poll(config.poll_timeout()) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("Stats feed failed, reconnecting: {}", e);
                    break;
                }
            };

            let message = match StatsMessage::parse(&text) {
                Ok(message) => message,
                Err(e) => {
                    tracing::warn!("Ignoring stats message: {}", e);
                    continue;
                }
            };

            // Waits out a full queue so no match transition is lost
            let route = tracker.route(&message);
            let queued = handle.schedule_next_frame_while(
                move |core| {
                    if let Err(e) = core.apply_stats(message, route) {
                        tracing::error!("Failed to dispatch stats message: {}", e);
                    }
                },
                config.poll_timeout(),
                || !stop.load(Ordering::SeqCst),
            );
            if queued.is_err() {
                source.disconnect();
                return;
            }
        }

        source.disconnect();
        if !stop.load(Ordering::SeqCst) {
            pause(config.reconnect_delay(), config.poll_timeout(), stop);
        }
    }
}

/// Sleep for `total`, waking every `step` to check `stop`
fn pause(total: Duration, step: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + total;
    let step = step.max(Duration::from_millis(1));
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(step.min(deadline - now));
    }
}

/// Read a `STEAM_ID` member that may be a string or a number
fn steam_id(entry: &Value) -> i64 {
    match &entry["STEAM_ID"] {
        Value::String(s) => s.trim().parse().unwrap_or(0),
        Value::Number(n) => n.as_i64().unwrap_or(0),
        _ => 0,
    }
}

impl Core {
    /// Dispatch the events for one stats message. Runs on the frame thread.
    pub fn apply_stats(&self, message: StatsMessage, route: Route) -> CoreResult<()> {
        self.events()
            .dispatch(names::STATS, vec![Arg::Json(message.raw)])?;

        let data = message.data;
        match route {
            Route::StatsOnly => {}
            Route::GameStart => {
                self.events()
                    .dispatch(names::GAME_START, vec![Arg::Json(data)])?;
            }
            Route::RoundEnd => {
                self.events()
                    .dispatch(names::ROUND_END, vec![Arg::Json(data)])?;
            }
            Route::GameEnd => {
                self.events()
                    .dispatch(names::GAME_END, vec![Arg::Json(data)])?;
            }
            Route::Death => self.stats_death(data)?,
            Route::TeamSwitch => self.stats_team_switch(data)?,
        }
        Ok(())
    }

    /// Bots have no SteamID, so they are matched by name
    fn stats_player(&self, entry: &Value) -> Option<Player> {
        match steam_id(entry) {
            id if id > 0 => self.find_player_by_steam_id(id),
            _ => entry["NAME"]
                .as_str()
                .and_then(|name| self.find_player_by_name(name)),
        }
    }

    fn stats_death(&self, data: Value) -> CoreResult<()> {
        let victim = self.stats_player(&data["VICTIM"]);
        let killer = match &data["KILLER"] {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            entry => self.stats_player(entry),
        };

        self.events().dispatch(
            names::DEATH,
            vec![
                Arg::OptPlayer(victim.clone()),
                Arg::OptPlayer(killer.clone()),
                Arg::Json(data.clone()),
            ],
        )?;

        if let Some(killer) = killer {
            self.events().dispatch(
                names::KILL,
                vec![Arg::OptPlayer(victim), Arg::Player(killer), Arg::Json(data)],
            )?;
        }
        Ok(())
    }

    fn stats_team_switch(&self, data: Value) -> CoreResult<()> {
        // The switching player is reported under KILLER
        let entry = &data["KILLER"];
        let id = steam_id(entry);
        // Bots all report 0 and cannot be told apart
        if id <= 0 {
            return Ok(());
        }
        let Some(player) = self.find_player_by_steam_id(id) else {
            return Ok(());
        };

        let team = |key: &str| entry[key].as_str().unwrap_or_default().to_lowercase();
        let (old_team, new_team) = (team("OLD_TEAM"), team("TEAM"));
        if old_team == new_team {
            return Ok(());
        }

        let dispatch = self.events().dispatch(
            names::TEAM_SWITCH,
            vec![
                Arg::Player(player.clone()),
                Arg::Text(old_team.clone()),
                Arg::Text(new_team),
            ],
        )?;
        if dispatch.is_blocked() {
            self.engine()
                .console_command(&format!("put {} {}", player.id, old_team));
        }
        Ok(())
    }

    /// Start the stats listener on `source`, replacing a running one
    pub fn start_stats<S: StatsSource>(&self, source: S) -> Result<(), SchedulerError> {
        let endpoint = StatsEndpoint::from_engine(self.engine());
        let listener = StatsListener::start(
            source,
            endpoint,
            self.config().stats.clone(),
            self.scheduler().handle(),
        )?;

        let previous = self.stats.lock().replace(listener);
        drop(previous);
        Ok(())
    }

    /// Start the transport this build ships with
    pub(crate) fn start_default_stats(&self) {
        #[cfg(feature = "zmq")]
        if let Err(e) = self.start_stats(ZmqSource::new()) {
            tracing::error!("Failed to start stats listener: {}", e);
        }

        #[cfg(not(feature = "zmq"))]
        tracing::warn!("zmq_stats_enable is set, but this build has no ZeroMQ support");
    }

    /// Stop the stats listener if one is running
    pub fn stop_stats(&self) {
        let listener = self.stats.lock().take();
        drop(listener);
    }
}
