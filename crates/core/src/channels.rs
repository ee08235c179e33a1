//! Message channels
//!
//! A channel is both where a message came from (commands can restrict
//! themselves to channels) and where replies go.

use std::fmt;

use qlrust_engine::HostEngine;
use qlrust_sdk::{ClientId, Team};

/// Maximum line length for replies
pub const REPLY_LINE_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Global chat
    Chat,
    /// A team's chat
    TeamChat(Team),
    /// The server console
    Console,
    /// Private messages to one client
    Tell(ClientId),
    /// Client console commands; replies go to the client like `Tell`
    ClientCommand(ClientId),
}

impl Channel {
    /// Team chat channel for a player on `team`
    pub fn for_team(team: Team) -> Self {
        Self::TeamChat(team)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::TeamChat(Team::Red) => "red_team_chat",
            Self::TeamChat(Team::Blue) => "blue_team_chat",
            Self::TeamChat(Team::Free) => "free_chat",
            Self::TeamChat(Team::Spectator) => "spectator_chat",
            Self::Console => "console",
            Self::Tell(_) => "tell",
            Self::ClientCommand(_) => "client_command",
        }
    }

    pub fn is_client_command(&self) -> bool {
        matches!(self, Self::ClientCommand(_))
    }

    /// Send `message` to everyone this channel addresses
    pub fn reply(&self, engine: &dyn HostEngine, message: &str) {
        let recipients: Option<Vec<ClientId>> = match self {
            Self::Console => {
                for line in message.split('\n') {
                    engine.console_print(&format!("{}\n", line));
                }
                return;
            }
            Self::Chat => None,
            Self::TeamChat(team) => Some(
                engine
                    .players_info()
                    .into_iter()
                    .filter(|info| info.team == *team)
                    .map(|info| info.client_id)
                    .collect(),
            ),
            Self::Tell(id) | Self::ClientCommand(id) => Some(vec![*id]),
        };

        let message = message.replace('"', "'");
        let mut last_color = String::new();
        for line in split_long_lines(&message, REPLY_LINE_LIMIT) {
            let text = format!("{}{}", last_color, line);
            if let Some(color) = last_color_tag(&text) {
                last_color = color.to_string();
            }
            let command = format!("print \"{}\n\"\n", text);
            match &recipients {
                None => engine.send_server_command(None, &command),
                Some(ids) => {
                    for id in ids {
                        engine.send_server_command(Some(*id), &command);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tell(id) => write!(f, "tell {}", id),
            Self::ClientCommand(id) => write!(f, "client_command {}", id),
            other => f.write_str(other.name()),
        }
    }
}

/// The last `^N` color tag in `text`
fn last_color_tag(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    (0..bytes.len().saturating_sub(1))
        .rev()
        .find(|&i| bytes[i] == b'^' && (b'0'..=b'7').contains(&bytes[i + 1]))
        .map(|i| &text[i..i + 2])
}

/// Split on newlines, then break lines longer than `limit` on spaces
pub fn split_long_lines(message: &str, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for line in message.split('\n') {
        if line.chars().count() <= limit {
            lines.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        for word in line.split(' ') {
            let needed = current.chars().count() + word.chars().count() + usize::from(!current.is_empty());
            if needed > limit && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlrust_engine::testing::FakeEngine;
    use qlrust_sdk::PlayerInfo;

    #[test]
    fn test_channel_names() {
        assert_eq!(Channel::for_team(Team::Red).name(), "red_team_chat");
        assert_eq!(Channel::for_team(Team::Spectator).name(), "spectator_chat");
        assert_eq!(Channel::ClientCommand(3).to_string(), "client_command 3");
        assert!(Channel::ClientCommand(3).is_client_command());
    }

    #[test]
    fn test_split_long_lines() {
        let long = vec!["word"; 30].join(" ");
        let lines = split_long_lines(&long, 20);
        assert!(lines.iter().all(|l| l.len() <= 20));
        assert_eq!(lines.join(" "), long);
        assert_eq!(split_long_lines("a\nb", 100), vec!["a", "b"]);
    }

    #[test]
    fn test_team_reply_addresses_team_only() {
        let engine = FakeEngine::new();
        for (id, team) in [(0, Team::Red), (1, Team::Blue), (2, Team::Red)] {
            engine.add_player(PlayerInfo {
                client_id: id,
                team,
                ..Default::default()
            });
        }

        Channel::for_team(Team::Red).reply(&engine, "say \"hi\"");
        let sent = engine.server_commands();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|c| c.command == "print \"say 'hi'\n\"\n"));
        assert!(sent.iter().all(|c| c.client_id != Some(1)));
    }

    #[test]
    fn test_color_carries_over_lines() {
        let engine = FakeEngine::new();
        let message = format!("^1{}", vec!["x"; 80].join(" "));
        Channel::Tell(4).reply(&engine, &message);
        let sent = engine.server_commands();
        assert_eq!(sent.len(), 2);
        assert!(sent[1].command.starts_with("print \"^1"));
    }
}
