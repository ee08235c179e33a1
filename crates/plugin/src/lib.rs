//! qlrust Plugin - FFI Layer
//!
//! This crate provides the C boundary between the native hook layer
//! injected into the Quake Live server and the Rust core. It compiles to
//! a cdylib (.so).
//!
//! The loaded [`Core`] lives in a process-wide slot between
//! `qlrust_plugin_load` and `qlrust_plugin_unload`; every other export is a
//! no-op returning "allow" while the slot is empty.

pub mod ffi;

use std::sync::Arc;

use parking_lot::RwLock;
use qlrust_core::Core;

static CORE: RwLock<Option<Arc<Core>>> = RwLock::new(None);

/// Install `core` as the loaded instance, returning the previous one
pub fn install(core: Core) -> Option<Arc<Core>> {
    CORE.write().replace(Arc::new(core))
}

/// Remove the loaded instance
pub fn uninstall() -> Option<Arc<Core>> {
    CORE.write().take()
}

/// Run `f` against the loaded core
///
/// The slot lock is released before `f` runs, so hooks may unload the
/// plugin from inside a callback.
pub fn with_core<R>(f: impl FnOnce(&Core) -> R) -> Option<R> {
    let core = CORE.read().clone()?;
    Some(f(&core))
}

/// Stop background work and drop the loaded core
pub fn shutdown() {
    if let Some(core) = uninstall() {
        core.shutdown();
    }
}
