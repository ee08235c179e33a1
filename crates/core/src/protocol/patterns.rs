//! Recognizers for raw client and server command text

use std::sync::LazyLock;

use regex::Regex;

static RE_SAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^say +(?P<msg>.+)$").unwrap());
static RE_SAY_TEAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^say_team +(?P<msg>.+)$").unwrap());
static RE_CALLVOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^(?:cv|callvote) +(?P<cmd>[^ ]+)(?: "?(?P<args>.+?)"?)?$"#).unwrap()
});
static RE_VOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^vote +(?P<arg>.)").unwrap());
static RE_TEAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^team +(?P<arg>.)").unwrap());
static RE_VOTE_ENDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^print "Vote (?P<result>passed|failed)\.\n"$"#).unwrap());
static RE_USERINFO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)^userinfo "(?P<vars>.+)"$"#).unwrap());
static RE_VOTE_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?P<cmd>[^ ]+)(?: "?(?P<args>.*?)"?)?$"#).unwrap());

/// A client command the classifier understands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand<'a> {
    /// `say <msg>`, quotes around the message stripped
    Say(&'a str),
    /// `say_team <msg>`
    SayTeam(&'a str),
    /// `callvote <vote> [args]` or `cv <vote> [args]`
    CallVote { vote: &'a str, args: &'a str },
    /// `vote <c>`, first character of the argument
    Vote(char),
    /// `team <c>`, first character of the argument
    Team(char),
    /// `userinfo "<vars>"`
    Userinfo(&'a str),
}

/// Classify a client command. Patterns are tried in a fixed order.
pub fn classify(cmd: &str) -> Option<ClientCommand<'_>> {
    if let Some(caps) = RE_SAY.captures(cmd) {
        return caps.name("msg").map(|m| ClientCommand::Say(strip_quotes(m.as_str())));
    }
    if let Some(caps) = RE_SAY_TEAM.captures(cmd) {
        return caps
            .name("msg")
            .map(|m| ClientCommand::SayTeam(strip_quotes(m.as_str())));
    }
    if let Some(caps) = RE_CALLVOTE.captures(cmd) {
        let vote = caps.name("cmd").map(|m| m.as_str()).unwrap_or_default();
        let args = caps.name("args").map(|m| m.as_str()).unwrap_or_default();
        return Some(ClientCommand::CallVote { vote, args });
    }
    if let Some(caps) = RE_VOTE.captures(cmd) {
        return first_char(caps.name("arg")).map(ClientCommand::Vote);
    }
    if let Some(caps) = RE_TEAM.captures(cmd) {
        return first_char(caps.name("arg")).map(ClientCommand::Team);
    }
    if let Some(caps) = RE_USERINFO.captures(cmd) {
        return caps.name("vars").map(|m| ClientCommand::Userinfo(m.as_str()));
    }
    None
}

/// `Some(true)` for `print "Vote passed.\n"`, `Some(false)` for failed
pub fn vote_ended(cmd: &str) -> Option<bool> {
    RE_VOTE_ENDED
        .captures(cmd)
        .and_then(|caps| caps.name("result"))
        .map(|m| m.as_str() == "passed")
}

/// Split the vote configstring into vote name and arguments
pub fn vote_string(value: &str) -> Option<(&str, &str)> {
    let caps = RE_VOTE_STRING.captures(value)?;
    let vote = caps.name("cmd")?.as_str();
    let args = caps.name("args").map(|m| m.as_str()).unwrap_or_default();
    Some((vote, args))
}

/// Strip one pair of surrounding double quotes
fn strip_quotes(msg: &str) -> &str {
    msg.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .filter(|inner| !inner.is_empty())
        .unwrap_or(msg)
}

fn first_char(m: Option<regex::Match<'_>>) -> Option<char> {
    m.and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_lowercase())
}
