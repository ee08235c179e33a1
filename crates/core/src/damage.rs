//! Damage flags reported with the damage entry point

use bitflags::bitflags;

bitflags! {
    /// `DAMAGE_*` flags passed by the engine
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DamageFlags: u32 {
        /// Damage was indirect
        const RADIUS = 0x01;
        /// Armour does not protect from this damage
        const NO_ARMOR = 0x02;
        /// Do not affect velocity, just view angles
        const NO_KNOCKBACK = 0x04;
        /// Armour, shields, invulnerability and godmode have no effect
        const NO_PROTECTION = 0x08;
        /// Team protection does not apply
        const NO_TEAM_PROTECTION = 0x10;
    }
}
