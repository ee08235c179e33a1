//! C-compatible exports called by the native hook layer

use std::ffi::{c_char, c_int};
use std::path::Path;
use std::sync::Arc;

use tracing::instrument;
use tracing_subscriber::EnvFilter;

use qlrust_core::config::{core_config_path, cvars};
use qlrust_core::{Core, CoreConfig, DamageFlags, Outcome};
use qlrust_engine::{init_main_thread, load_engine, EngineFunctions, HostEngine};

use super::{c_str, outcome_code, status_code, write_error, OUTCOME_ALLOW};
use crate::{install, shutdown, with_core};

static NAME: &[u8] = b"qlrust\0";
static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();

/// Read `<fs_homepath>/qlrust/core.toml`, falling back to defaults
fn load_config(engine: &dyn HostEngine) -> (CoreConfig, Option<String>) {
    let Some(homepath) = engine.get_cvar(cvars::HOMEPATH).filter(|p| !p.is_empty()) else {
        return (CoreConfig::default(), None);
    };

    let path = core_config_path(Path::new(&homepath));
    match CoreConfig::load(&path) {
        Ok(config) => (config, None),
        Err(e) => (
            CoreConfig::default(),
            Some(format!("Failed to load {:?}, using defaults: {}", path, e)),
        ),
    }
}

fn init_logging(config: &CoreConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Called once the native hook layer has resolved the engine functions
///
/// # Safety
/// - `table` must be null or point to a valid [`EngineFunctions`]
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
pub unsafe extern "C" fn qlrust_plugin_load(
    table: *const EngineFunctions,
    error: *mut c_char,
    maxlen: usize,
) -> bool {
    let engine = match load_engine(table) {
        Ok(engine) => Arc::new(engine),
        Err(e) => {
            write_error(error, maxlen, &format!("Engine error: {}", e));
            return false;
        }
    };

    let (config, config_error) = load_config(engine.as_ref());
    init_logging(&config);
    if let Some(message) = config_error {
        tracing::warn!("{}", message);
    }

    tracing::info!("qlrust loading...");

    // A reload keeps the thread recorded by the first load
    if init_main_thread().is_err() {
        tracing::debug!("Main thread already recorded");
    }

    if install(Core::new(engine, config)).is_some() {
        tracing::warn!("Replaced a core that was never unloaded");
    }

    tracing::info!("qlrust {} loaded", env!("CARGO_PKG_VERSION"));
    true
}

/// Called when the host unloads the scripting layer
#[no_mangle]
#[instrument(skip_all)]
pub extern "C" fn qlrust_plugin_unload() -> bool {
    tracing::info!("qlrust unloading...");

    match std::panic::catch_unwind(shutdown) {
        Ok(()) => true,
        Err(_) => {
            tracing::error!("Panic during shutdown");
            false
        }
    }
}

#[no_mangle]
pub extern "C" fn qlrust_get_name() -> *const c_char {
    NAME.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn qlrust_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

/// Run a handler against the loaded core; allow when nothing is loaded
fn dispatch(handler: impl FnOnce(&Core) -> Outcome) -> Outcome {
    with_core(handler).unwrap_or(Outcome::Allow)
}

/// # Safety
/// `cmd` must be a valid NUL-terminated string or null.
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_rcon(cmd: *const c_char) -> c_int {
    let cmd = c_str(cmd);
    status_code(dispatch(|core| core.handle_rcon(&cmd)))
}

/// # Safety
/// - `cmd` must be a valid NUL-terminated string or null
/// - `out` must be null or valid for `maxlen` bytes
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_client_command(
    client_id: c_int,
    cmd: *const c_char,
    out: *mut c_char,
    maxlen: usize,
) -> c_int {
    let cmd = c_str(cmd);
    outcome_code(dispatch(|core| core.handle_client_command(client_id, &cmd)), out, maxlen)
}

/// `client_id` is negative for broadcasts
///
/// # Safety
/// - `cmd` must be a valid NUL-terminated string or null
/// - `out` must be null or valid for `maxlen` bytes
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_server_command(
    client_id: c_int,
    cmd: *const c_char,
    out: *mut c_char,
    maxlen: usize,
) -> c_int {
    let cmd = c_str(cmd);
    outcome_code(dispatch(|core| core.handle_server_command(client_id, &cmd)), out, maxlen)
}

/// # Safety
/// - `value` must be a valid NUL-terminated string or null
/// - `out` must be null or valid for `maxlen` bytes
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_set_configstring(
    index: u32,
    value: *const c_char,
    out: *mut c_char,
    maxlen: usize,
) -> c_int {
    let value = c_str(value);
    outcome_code(dispatch(|core| core.handle_set_configstring(index, &value)), out, maxlen)
}

/// # Safety
/// - `text` must be a valid NUL-terminated string or null
/// - `out` must be null or valid for `maxlen` bytes
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_console_print(
    text: *const c_char,
    out: *mut c_char,
    maxlen: usize,
) -> c_int {
    let text = c_str(text);
    outcome_code(dispatch(|core| core.handle_console_print(&text)), out, maxlen)
}

#[no_mangle]
pub extern "C" fn qlrust_handle_new_game(is_restart: bool) -> c_int {
    status_code(dispatch(|core| core.handle_new_game(is_restart)))
}

/// Called every server frame
#[no_mangle]
pub extern "C" fn qlrust_handle_frame() -> c_int {
    status_code(dispatch(Core::handle_frame))
}

/// Returns [`OUTCOME_BLOCK`](super::OUTCOME_BLOCK) to refuse the connection
#[no_mangle]
pub extern "C" fn qlrust_handle_player_connect(client_id: c_int, is_bot: bool) -> c_int {
    status_code(dispatch(|core| core.handle_player_connect(client_id, is_bot)))
}

#[no_mangle]
pub extern "C" fn qlrust_handle_player_loaded(client_id: c_int) -> c_int {
    status_code(dispatch(|core| core.handle_player_loaded(client_id)))
}

/// # Safety
/// `reason` must be a valid NUL-terminated string or null.
#[no_mangle]
pub unsafe extern "C" fn qlrust_handle_player_disconnect(client_id: c_int, reason: *const c_char) -> c_int {
    let reason = c_str(reason);
    status_code(dispatch(|core| core.handle_player_disconnect(client_id, &reason)))
}

#[no_mangle]
pub extern "C" fn qlrust_handle_player_spawn(client_id: c_int) -> c_int {
    status_code(dispatch(|core| core.handle_player_spawn(client_id)))
}

#[no_mangle]
pub extern "C" fn qlrust_handle_kamikaze_use(client_id: c_int) -> c_int {
    status_code(dispatch(|core| core.handle_kamikaze_use(client_id)))
}

#[no_mangle]
pub extern "C" fn qlrust_handle_kamikaze_explode(client_id: c_int, used_on_demand: bool) -> c_int {
    status_code(dispatch(|core| core.handle_kamikaze_explode(client_id, used_on_demand)))
}

/// Entity numbers outside the client range are passed through as-is
#[no_mangle]
pub extern "C" fn qlrust_handle_damage(
    target_id: c_int,
    attacker_id: c_int,
    damage: c_int,
    dflags: u32,
    means_of_death: c_int,
) -> c_int {
    let dflags = DamageFlags::from_bits_truncate(dflags);
    status_code(dispatch(|core| {
        core.handle_damage(target_id, attacker_id, damage, dflags, means_of_death)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{install, uninstall};
    use qlrust_core::events::{names, HookResult, Priority};
    use qlrust_engine::testing::FakeEngine;

    // Single test: the loaded core is process-wide
    #[test]
    fn test_exports_route_to_loaded_core() {
        assert_eq!(unsafe { qlrust_handle_rcon(c"status".as_ptr()) }, OUTCOME_ALLOW);

        let engine = Arc::new(FakeEngine::new());
        install(Core::new(engine, CoreConfig::default()));

        with_core(|core| {
            core.events()
                .lookup(names::CONSOLE_PRINT)
                .unwrap()
                .add_hook("test", "mute", Priority::Normal, |_| HookResult::Stop)
                .unwrap();
        });

        let mut out = [0 as c_char; 64];
        let code = unsafe { qlrust_handle_console_print(c"hello\n".as_ptr(), out.as_mut_ptr(), 64) };
        assert_eq!(code, crate::ffi::OUTCOME_BLOCK);
        assert_eq!(qlrust_handle_frame(), OUTCOME_ALLOW);

        assert!(qlrust_plugin_unload());
        assert!(uninstall().is_none());
        let code = unsafe { qlrust_handle_console_print(c"hello\n".as_ptr(), out.as_mut_ptr(), 64) };
        assert_eq!(code, OUTCOME_ALLOW);
    }

    #[test]
    fn test_load_rejects_null_table() {
        let mut error = [0 as c_char; 64];
        let loaded = unsafe { qlrust_plugin_load(std::ptr::null(), error.as_mut_ptr(), 64) };
        assert!(!loaded);
        assert_eq!(unsafe { c_str(error.as_ptr()) }, "Engine error: Engine function table is null");
    }
}
