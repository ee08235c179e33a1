//! Engine privilege levels

/// Privilege level the engine assigns to a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Privileges {
    /// Regular player
    #[default]
    None,
    /// Moderator
    Mod,
    /// Administrator
    Admin,
    /// Server owner
    Root,
    /// Banned client
    Banned,
}

impl Privileges {
    /// Convert the engine's raw privilege value
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Mod,
            2 => Self::Admin,
            3 => Self::Root,
            u32::MAX => Self::Banned,
            _ => Self::None,
        }
    }
}
