//! qlrust SDK - Quake Live Engine Type Definitions
//!
//! This crate contains plain type definitions for the vocabulary the host
//! engine speaks: configstring slots, teams, game states, privilege levels
//! and the per-client information record. It has no dependencies and
//! compiles quickly, allowing parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`configstrings`] - Configstring indices
//! - [`team`] - Team identifiers
//! - [`game_state`] - Global game state keywords
//! - [`privileges`] - Engine privilege levels
//! - [`player_info`] - Raw client information reported by the host

pub mod configstrings;
pub mod game_state;
pub mod player_info;
pub mod privileges;
pub mod team;

pub use game_state::GameState;
pub use player_info::{ClientId, ConnectionState, PlayerInfo};
pub use privileges::Privileges;
pub use team::Team;

/// Maximum number of client slots on a server
pub const MAX_CLIENTS: i32 = 64;
