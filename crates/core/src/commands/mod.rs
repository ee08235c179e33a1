//! Command Routing
//!
//! Matches chat, console and client command input against commands that
//! plugins register.
//!
//! # Architecture
//!
//! ```text
//! chat / rcon / client_command → CommandRegistry::handle_input → command event → handlers
//! ```
//!
//! # Prefixes
//!
//! Commands require the `qlx_commandPrefix` cvar in front of their name
//! unless registered with `prefix(false)`. With the prefix `!`, a command
//! named `ping` runs on `!ping`.
//!
//! # Example
//!
//! ```ignore
//! use qlrust_core::commands::{Command, CommandResult};
//! use qlrust_core::events::Priority;
//!
//! let engine = core.engine_arc();
//! core.commands().add_command(
//!     Command::new("fun", &["ping"], "cmd_ping", move |_, _, channel| {
//!         channel.reply(engine.as_ref(), "Pong!");
//!         CommandResult::Ok
//!     }),
//!     Priority::Normal,
//! )?;
//! ```

mod info;
mod manager;

pub use info::{Command, CommandCallback, CommandResult};
pub use manager::CommandRegistry;
