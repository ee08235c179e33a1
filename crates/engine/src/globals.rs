//! Main thread bookkeeping
//!
//! The thread that loads the plugin is the frame thread: every host
//! callback arrives on it. Its ID is recorded once so other code can check
//! where it is running.

use std::sync::OnceLock;
use std::thread::ThreadId;

use crate::error::EngineError;

/// Frame thread ID storage
static MAIN_THREAD: OnceLock<ThreadId> = OnceLock::new();

/// Record the calling thread as the main thread
///
/// Called once during plugin load. Returns error if already initialized.
pub fn init_main_thread() -> Result<(), EngineError> {
    MAIN_THREAD
        .set(std::thread::current().id())
        .map_err(|_| EngineError::AlreadyInitialized)
}

/// The recorded main thread, if any
pub fn main_thread_id() -> Option<ThreadId> {
    MAIN_THREAD.get().copied()
}

/// Check if current thread is the main game thread
///
/// Before [`init_main_thread`] has run every thread counts as the main
/// thread, which keeps unit tests and tools free of setup.
pub fn is_main_thread() -> bool {
    MAIN_THREAD
        .get()
        .map(|id| std::thread::current().id() == *id)
        .unwrap_or(true)
}
