//! In-memory permission store keyed by SteamID64

use dashmap::DashMap;

use super::PermissionStore;

#[derive(Debug, Default)]
pub struct MemoryPermissions {
    levels: DashMap<i64, i32>,
}

impl MemoryPermissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a player's level, replacing any existing one
    pub fn set_permission(&self, steam_id: i64, level: i32) {
        self.levels.insert(steam_id, level);
    }

    /// Remove a player's record
    ///
    /// # Returns
    /// The level that was stored, if any
    pub fn clear_permission(&self, steam_id: i64) -> Option<i32> {
        self.levels.remove(&steam_id).map(|(_, level)| level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl PermissionStore for MemoryPermissions {
    fn get_permission(&self, steam_id: i64) -> Option<i32> {
        self.levels.get(&steam_id).map(|level| *level)
    }
}
