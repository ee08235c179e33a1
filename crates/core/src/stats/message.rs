//! Stats feed messages

use serde::Deserialize;
use serde_json::Value;

use crate::error::StatsError;

/// Message types the core derives events from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsKind {
    MatchStarted,
    RoundOver,
    MatchReport,
    PlayerDeath,
    PlayerSwitchTeam,
    /// Anything else; only the generic `stats` event fires
    Other(String),
}

impl StatsKind {
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "MATCH_STARTED" => Self::MatchStarted,
            "ROUND_OVER" => Self::RoundOver,
            "MATCH_REPORT" => Self::MatchReport,
            "PLAYER_DEATH" => Self::PlayerDeath,
            "PLAYER_SWITCHTEAM" => Self::PlayerSwitchTeam,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "TYPE")]
    kind: String,
    #[serde(rename = "DATA", default)]
    data: Value,
}

/// One decoded stats message
#[derive(Debug, Clone, PartialEq)]
pub struct StatsMessage {
    pub kind: StatsKind,
    /// The `DATA` member
    pub data: Value,
    /// The whole message as received
    pub raw: Value,
}

impl StatsMessage {
    /// Decode a JSON document carrying `TYPE` and `DATA`
    pub fn parse(text: &str) -> Result<Self, StatsError> {
        let raw: Value = serde_json::from_str(text)?;
        let envelope = Envelope::deserialize(&raw)?;
        Ok(Self {
            kind: StatsKind::from_type(&envelope.kind),
            data: envelope.data,
            raw,
        })
    }
}
