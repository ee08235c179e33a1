//! Permission levels for command eligibility
//!
//! Commands declare a numeric permission level; a player may run a command
//! when their stored level is at least the required one. Where levels come
//! from is up to the embedder: anything implementing [`PermissionStore`]
//! can back the lookup. The default [`MemoryPermissions`] is a concurrent
//! map that plugins fill in (for example from a database on connect).
//!
//! # Usage
//!
//! ```ignore
//! let permissions = Arc::new(MemoryPermissions::new());
//! permissions.set_permission(76561197960287930, 3);
//! let core = Core::new(engine, config).with_permissions(permissions);
//! ```

mod registry;

pub use registry::MemoryPermissions;

/// Source of per-player permission levels
pub trait PermissionStore: Send + Sync {
    /// Stored level for a SteamID64; `None` if there is no record
    fn get_permission(&self, steam_id: i64) -> Option<i32>;

    /// Stored level, treating a missing record as level 0
    fn permission_level(&self, steam_id: i64) -> i32 {
        self.get_permission(steam_id).unwrap_or(0)
    }
}
