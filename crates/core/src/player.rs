//! Players and backslash-delimited variable strings

use std::fmt;
use std::sync::LazyLock;

use qlrust_sdk::{ClientId, PlayerInfo, Privileges, Team};
use regex::Regex;

static COLOR_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\^[0-7]").unwrap());

/// Remove `^N` color tags from a string
pub fn strip_colors(text: &str) -> String {
    COLOR_TAG.replace_all(text, "").into_owned()
}

/// Ordered key/value pairs as found in userinfo and info configstrings
///
/// The wire format is `\key1\value1\key2\value2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(Vec<(String, String)>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a backslash-delimited string. A trailing key without a value
    /// is dropped with a warning.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\\').unwrap_or(text);
        if text.is_empty() {
            return Self::default();
        }

        let items: Vec<&str> = text.split('\\').collect();
        if items.len() % 2 != 0 {
            tracing::warn!("Uneven number of keys and values: {}", text);
        }

        Self(
            items
                .chunks_exact(2)
                .map(|pair| (pair[0].to_string(), pair[1].to_string()))
                .collect(),
        )
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value, keeping the key's position if it already exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Overwrite keys with the values from `other`
    pub fn merge(&mut self, other: &Vars) {
        for (key, value) in other.iter() {
            self.insert(key, value);
        }
    }

    /// Entries of `self` that are missing from or differ in `previous`
    pub fn changed_from(&self, previous: &Vars) -> Vars {
        self.0
            .iter()
            .filter(|(key, value)| previous.get(key) != Some(value.as_str()))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Vars {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut vars = Vars::new();
        for (key, value) in iter {
            vars.insert(key, value);
        }
        vars
    }
}

impl fmt::Display for Vars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.0 {
            write!(f, "\\{}\\{}", key, value)?;
        }
        Ok(())
    }
}

/// A connected client, or the server console acting as the owner
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: ClientId,
    pub steam_id: i64,
    pub name: String,
    pub team: Team,
    pub userinfo: Vars,
    pub privileges: Privileges,
}

impl Player {
    pub fn from_info(info: PlayerInfo) -> Self {
        let userinfo = Vars::parse(&info.userinfo);
        // The engine's name field can lag behind userinfo during renames
        let name = userinfo
            .get("name")
            .map(str::to_string)
            .unwrap_or(info.name);
        Self {
            id: info.client_id,
            steam_id: info.steam_id,
            name,
            team: info.team,
            userinfo,
            privileges: info.privileges,
        }
    }

    /// The server console, which acts with the owner's identity
    pub fn console(owner_steam_id: i64) -> Self {
        Self {
            id: -1,
            steam_id: owner_steam_id,
            name: "console".to_string(),
            team: Team::Spectator,
            userinfo: Vars::new(),
            privileges: Privileges::Root,
        }
    }

    pub fn is_console(&self) -> bool {
        self.id < 0
    }

    /// Name without color tags
    pub fn clean_name(&self) -> String {
        strip_colors(&self.name)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
