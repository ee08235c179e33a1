//! qlrust Core - Event Dispatch and Command Routing
//!
//! This crate holds the scripting layer that sits between the Quake Live
//! host engine and plugins: the protocol handlers that turn raw engine
//! callbacks into named events, the event and command registries, the
//! frame scheduler and the stats feed listener.
//!
//! Everything hangs off a [`Core`] value, created once by the plugin
//! crate when the host loads it.
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Configstring indices, teams and client records
//! - [`engine`] - The host engine interface and main thread tracking

pub use qlrust_engine as engine;
pub use qlrust_sdk as sdk;

pub mod channels;
pub mod commands;
pub mod config;
mod context;
pub mod damage;
pub mod error;
pub mod events;
pub mod permissions;
pub mod player;
pub mod protocol;
pub mod scheduler;
pub mod stats;
pub mod unwind;

pub use context::{Core, PrintRedirect};

pub use channels::Channel;
pub use commands::{Command, CommandRegistry, CommandResult};
pub use config::{ConfigError, ConfigResult, CoreConfig, StatsConfig};
pub use damage::DamageFlags;
pub use error::{CommandError, CoreError, CoreResult, EventError, SchedulerError, StatsError};
pub use events::{names, Dispatch, EventArgs, EventRegistry, HookResult, Payload, Priority};
pub use permissions::{MemoryPermissions, PermissionStore};
pub use player::{Player, Vars};
pub use protocol::Outcome;
pub use scheduler::{FrameScheduler, SchedulerHandle, Task};
pub use stats::{StatsListener, StatsSource};
