//! Host function table loading
//!
//! The native hook layer hands the scripting core a table of C function
//! pointers at load time. [`load_engine`] validates it and wraps it in
//! [`FfiEngine`], which implements [`HostEngine`].

use std::ffi::{c_char, c_int, CStr, CString};

use qlrust_sdk::{ClientId, ConnectionState, PlayerInfo, Privileges, Team};

use crate::error::EngineError;
use crate::host::HostEngine;

/// Buffer size for cvar values
const CVAR_BUFFER_SIZE: usize = 1024;

/// Buffer size for configstrings (BIG_INFO_STRING)
const CONFIGSTRING_BUFFER_SIZE: usize = 8192;

/// Reads a cvar into `out`; returns the length written, or -1 if missing
pub type GetCvarFn = unsafe extern "C" fn(*const c_char, *mut c_char, usize) -> c_int;
/// Reads a configstring into `out`; returns the length written
pub type GetConfigstringFn = unsafe extern "C" fn(u32, *mut c_char, usize) -> c_int;
/// Writes a configstring
pub type SetConfigstringFn = unsafe extern "C" fn(u32, *const c_char);
/// Executes or prints a console string
pub type ConsoleFn = unsafe extern "C" fn(*const c_char);
/// Sends a server command; client -1 means everyone
pub type SendServerCommandFn = unsafe extern "C" fn(c_int, *const c_char);
/// Fills `out` with the client's info; returns false if the slot is unused
pub type PlayerInfoFn = unsafe extern "C" fn(c_int, *mut RawPlayerInfo) -> bool;

/// Function table supplied by the native hook layer
#[repr(C)]
#[derive(Clone, Copy)]
pub struct EngineFunctions {
    pub get_cvar: Option<GetCvarFn>,
    pub get_configstring: Option<GetConfigstringFn>,
    pub set_configstring: Option<SetConfigstringFn>,
    pub console_command: Option<ConsoleFn>,
    pub console_print: Option<ConsoleFn>,
    pub send_server_command: Option<SendServerCommandFn>,
    pub player_info: Option<PlayerInfoFn>,
}

/// Client information as laid out by the native hook layer
#[repr(C)]
pub struct RawPlayerInfo {
    pub client_id: c_int,
    pub name: [c_char; 40],
    pub connection_state: c_int,
    pub userinfo: [c_char; 1024],
    pub steam_id: i64,
    pub team: c_int,
    pub privileges: u32,
}

impl Default for RawPlayerInfo {
    fn default() -> Self {
        Self {
            client_id: -1,
            name: [0; 40],
            connection_state: 0,
            userinfo: [0; 1024],
            steam_id: 0,
            team: Team::Spectator as c_int,
            privileges: 0,
        }
    }
}

impl RawPlayerInfo {
    fn to_player_info(&self) -> PlayerInfo {
        PlayerInfo {
            client_id: self.client_id,
            name: fixed_to_string(&self.name),
            connection_state: match self.connection_state {
                1 => ConnectionState::Zombie,
                2 => ConnectionState::Connected,
                3 => ConnectionState::Primed,
                4 => ConnectionState::Active,
                _ => ConnectionState::Free,
            },
            userinfo: fixed_to_string(&self.userinfo),
            steam_id: self.steam_id,
            team: Team::from_index(self.team).unwrap_or_default(),
            privileges: Privileges::from_raw(self.privileges),
        }
    }
}

/// Convert a NUL-terminated fixed-size C buffer
fn fixed_to_string(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// A [`HostEngine`] backed by a validated C function table
pub struct FfiEngine {
    get_cvar: GetCvarFn,
    get_configstring: GetConfigstringFn,
    set_configstring: SetConfigstringFn,
    console_command: ConsoleFn,
    console_print: ConsoleFn,
    send_server_command: SendServerCommandFn,
    player_info: PlayerInfoFn,
}

// SAFETY: The table holds plain function pointers into the host process,
// valid for the plugin's lifetime and only invoked from the frame thread.
unsafe impl Send for FfiEngine {}
unsafe impl Sync for FfiEngine {}

/// Validate a function table and wrap it
///
/// # Safety
/// `table` must be null or point to an `EngineFunctions` whose non-null
/// entries are valid for the plugin's lifetime.
pub unsafe fn load_engine(table: *const EngineFunctions) -> Result<FfiEngine, EngineError> {
    let table = table.as_ref().ok_or(EngineError::NullTable)?;

    Ok(FfiEngine {
        get_cvar: table.get_cvar.ok_or(EngineError::MissingFunction("get_cvar"))?,
        get_configstring: table
            .get_configstring
            .ok_or(EngineError::MissingFunction("get_configstring"))?,
        set_configstring: table
            .set_configstring
            .ok_or(EngineError::MissingFunction("set_configstring"))?,
        console_command: table
            .console_command
            .ok_or(EngineError::MissingFunction("console_command"))?,
        console_print: table
            .console_print
            .ok_or(EngineError::MissingFunction("console_print"))?,
        send_server_command: table
            .send_server_command
            .ok_or(EngineError::MissingFunction("send_server_command"))?,
        player_info: table
            .player_info
            .ok_or(EngineError::MissingFunction("player_info"))?,
    })
}

/// Build a C string, logging and dropping strings with interior NULs
fn to_cstring(value: &str) -> Option<CString> {
    match CString::new(value) {
        Ok(s) => Some(s),
        Err(_) => {
            tracing::warn!("Dropping engine call with interior NUL: {:?}", value);
            None
        }
    }
}

/// Call a reader that fills a buffer and return the string it wrote
fn read_into_buffer(size: usize, reader: impl FnOnce(*mut c_char, usize) -> c_int) -> Option<String> {
    let mut buffer = vec![0 as c_char; size];
    let written = reader(buffer.as_mut_ptr(), buffer.len());
    if written < 0 {
        return None;
    }
    // Guarantee termination even if the host filled the whole buffer
    buffer[size - 1] = 0;
    let value = unsafe { CStr::from_ptr(buffer.as_ptr()) };
    Some(value.to_string_lossy().into_owned())
}

impl HostEngine for FfiEngine {
    fn get_cvar(&self, name: &str) -> Option<String> {
        let name = to_cstring(name)?;
        read_into_buffer(CVAR_BUFFER_SIZE, |out, len| unsafe {
            (self.get_cvar)(name.as_ptr(), out, len)
        })
    }

    fn get_configstring(&self, index: u32) -> String {
        read_into_buffer(CONFIGSTRING_BUFFER_SIZE, |out, len| unsafe {
            (self.get_configstring)(index, out, len)
        })
        .unwrap_or_default()
    }

    fn set_configstring(&self, index: u32, value: &str) {
        if let Some(value) = to_cstring(value) {
            unsafe { (self.set_configstring)(index, value.as_ptr()) }
        }
    }

    fn console_command(&self, command: &str) {
        if let Some(command) = to_cstring(command) {
            unsafe { (self.console_command)(command.as_ptr()) }
        }
    }

    fn console_print(&self, text: &str) {
        if let Some(text) = to_cstring(text) {
            unsafe { (self.console_print)(text.as_ptr()) }
        }
    }

    fn send_server_command(&self, client_id: Option<ClientId>, command: &str) {
        if let Some(command) = to_cstring(command) {
            unsafe { (self.send_server_command)(client_id.unwrap_or(-1), command.as_ptr()) }
        }
    }

    fn player_info(&self, client_id: ClientId) -> Option<PlayerInfo> {
        let mut raw = RawPlayerInfo::default();
        let found = unsafe { (self.player_info)(client_id, &mut raw) };
        found.then(|| raw.to_player_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "C" fn fake_get_cvar(name: *const c_char, out: *mut c_char, len: usize) -> c_int {
        let name = CStr::from_ptr(name).to_str().unwrap_or("");
        if name != "sv_hostname" {
            return -1;
        }
        let value = b"test server\0";
        let n = value.len().min(len);
        std::ptr::copy_nonoverlapping(value.as_ptr() as *const c_char, out, n);
        (n - 1) as c_int
    }

    unsafe extern "C" fn fake_get_configstring(_: u32, _: *mut c_char, _: usize) -> c_int {
        0
    }
    unsafe extern "C" fn fake_set_configstring(_: u32, _: *const c_char) {}
    unsafe extern "C" fn fake_console(_: *const c_char) {}
    unsafe extern "C" fn fake_send(_: c_int, _: *const c_char) {}

    unsafe extern "C" fn fake_player_info(client_id: c_int, out: *mut RawPlayerInfo) -> bool {
        if client_id != 3 {
            return false;
        }
        let out = &mut *out;
        out.client_id = 3;
        for (i, b) in b"Mocked".iter().enumerate() {
            out.name[i] = *b as c_char;
        }
        out.steam_id = 76561197960287930;
        out.team = Team::Red as c_int;
        out.connection_state = 4;
        true
    }

    fn full_table() -> EngineFunctions {
        EngineFunctions {
            get_cvar: Some(fake_get_cvar),
            get_configstring: Some(fake_get_configstring),
            set_configstring: Some(fake_set_configstring),
            console_command: Some(fake_console),
            console_print: Some(fake_console),
            send_server_command: Some(fake_send),
            player_info: Some(fake_player_info),
        }
    }

    #[test]
    fn test_load_rejects_null_table() {
        let result = unsafe { load_engine(std::ptr::null()) };
        assert!(matches!(result, Err(EngineError::NullTable)));
    }

    #[test]
    fn test_load_rejects_missing_function() {
        let mut table = full_table();
        table.player_info = None;
        let result = unsafe { load_engine(&table) };
        assert!(matches!(
            result,
            Err(EngineError::MissingFunction("player_info"))
        ));
    }

    #[test]
    fn test_ffi_engine_reads() {
        let table = full_table();
        let engine = unsafe { load_engine(&table) }.unwrap();

        assert_eq!(engine.get_cvar("sv_hostname").as_deref(), Some("test server"));
        assert_eq!(engine.get_cvar("missing"), None);
        assert_eq!(engine.get_configstring(0), "");

        let info = engine.player_info(3).unwrap();
        assert_eq!(info.name, "Mocked");
        assert_eq!(info.team, Team::Red);
        assert_eq!(info.connection_state, ConnectionState::Active);
        assert!(engine.player_info(4).is_none());
        assert_eq!(engine.players_info().len(), 1);
    }
}
