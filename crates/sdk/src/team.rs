//! Team identifiers

use std::fmt;

/// A team a client can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum Team {
    /// Free-for-all team
    Free = 0,
    /// Red team
    Red = 1,
    /// Blue team
    Blue = 2,
    /// Spectators
    #[default]
    Spectator = 3,
}

impl Team {
    /// Lowercase name as used by chat channels and the `put` command
    pub fn name(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Spectator => "spectator",
        }
    }

    /// Parse a team name, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "spectator" => Some(Self::Spectator),
            _ => None,
        }
    }

    /// Convert the engine's numeric team value
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Self::Free),
            1 => Some(Self::Red),
            2 => Some(Self::Blue),
            3 => Some(Self::Spectator),
            _ => None,
        }
    }

    /// First letter of the team name, used by the `team` client command
    pub fn initial(&self) -> char {
        match self {
            Self::Free => 'f',
            Self::Red => 'r',
            Self::Blue => 'b',
            Self::Spectator => 's',
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_names() {
        assert_eq!(Team::from_name("RED"), Some(Team::Red));
        assert_eq!(Team::from_name("spectator"), Some(Team::Spectator));
        assert_eq!(Team::from_name("any"), None);
        assert_eq!(Team::Blue.initial(), 'b');
        assert_eq!(Team::from_index(0), Some(Team::Free));
        assert_eq!(Team::from_index(7), None);
    }
}
