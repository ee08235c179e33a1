//! qlrust Engine - Host Interface and Thread Bookkeeping
//!
//! This crate handles:
//! - The [`HostEngine`] trait: the synchronous functions the scripting core
//!   calls back into (cvars, configstrings, console and server commands,
//!   client information)
//! - Loading a C function table supplied by the native hook layer and
//!   exposing it as a [`HostEngine`]
//! - Recording the main (frame) thread for runtime checks
//!
//! # Thread Safety
//!
//! The host engine is single-threaded with respect to its callbacks. The
//! frame thread ID is stored once at load time and checked via
//! [`is_main_thread()`].

pub mod error;
pub mod globals;
pub mod host;
pub mod loader;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::EngineError;
pub use globals::{init_main_thread, is_main_thread, main_thread_id};
pub use host::HostEngine;
pub use loader::{load_engine, EngineFunctions, FfiEngine, RawPlayerInfo};
