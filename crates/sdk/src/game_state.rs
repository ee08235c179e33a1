//! Global game state keywords carried in `g_gameState`

/// State of the current match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameState {
    /// Warmup, waiting for players to ready up
    PreGame,
    /// Match countdown running
    CountDown,
    /// Match in progress
    InProgress,
}

impl GameState {
    /// Parse the keyword used in the serverinfo configstring
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "PRE_GAME" => Some(Self::PreGame),
            "COUNT_DOWN" => Some(Self::CountDown),
            "IN_PROGRESS" => Some(Self::InProgress),
            _ => None,
        }
    }

    /// Keyword used in the serverinfo configstring
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::PreGame => "PRE_GAME",
            Self::CountDown => "COUNT_DOWN",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}
