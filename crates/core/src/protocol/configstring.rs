//! Interpretation of the game state and round status configstrings

use qlrust_sdk::GameState;

use crate::player::Vars;

/// What a serverinfo change means for the match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameStateChange {
    /// `g_gameState` did not change
    Unchanged,
    /// Warmup ended and the match countdown started
    Countdown,
    /// A known transition with nothing to announce
    Expected,
    /// A transition the core does not recognize
    Unknown { old: String, new: String },
}

/// Compare the `g_gameState` values of two serverinfo strings
pub fn game_state_change(old: &Vars, new: &Vars) -> GameStateChange {
    let old_state = old.get("g_gameState").unwrap_or_default();
    let new_state = new.get("g_gameState").unwrap_or_default();
    if old_state == new_state {
        return GameStateChange::Unchanged;
    }

    use GameState::*;
    match (GameState::from_keyword(old_state), GameState::from_keyword(new_state)) {
        (Some(PreGame), Some(CountDown)) => GameStateChange::Countdown,
        (Some(PreGame), Some(InProgress))
        | (Some(CountDown), Some(InProgress))
        | (Some(InProgress | CountDown), Some(PreGame)) => GameStateChange::Expected,
        _ => GameStateChange::Unknown {
            old: old_state.to_string(),
            new: new_state.to_string(),
        },
    }
}

/// A round announcement derived from the round status configstring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundSignal {
    Countdown(i64),
    Start(i64),
}

/// Derive the round number from the round status configstring
///
/// Attack & Defend carries a `turn` key and numbers rounds from the
/// `round`/`turn` pair, remembering the last number in `ad_round` since
/// `round` only appears on countdowns. Other modes carry the number in
/// `round` directly. Round zero announces nothing.
pub fn round_signal(status: &Vars, ad_round: &mut i64) -> Result<Option<RoundSignal>, String> {
    if status.is_empty() {
        return Ok(None);
    }

    let round = if status.contains_key("turn") {
        if parse_int(status, "state")? == 0 {
            return Ok(None);
        }
        let round = if status.contains_key("round") {
            parse_int(status, "round")? * 2 + 1 + parse_int(status, "turn")?
        } else {
            *ad_round
        };
        *ad_round = round;
        round
    } else {
        parse_int(status, "round")?
    };

    if round == 0 {
        return Ok(None);
    }
    if status.contains_key("time") {
        Ok(Some(RoundSignal::Countdown(round)))
    } else {
        Ok(Some(RoundSignal::Start(round)))
    }
}

fn parse_int(vars: &Vars, key: &str) -> Result<i64, String> {
    let value = vars
        .get(key)
        .ok_or_else(|| format!("missing '{}'", key))?;
    value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number: {}", key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(value: &str) -> Vars {
        Vars::parse(&format!("\\sv_hostname\\test\\g_gameState\\{}", value))
    }

    #[test]
    fn test_game_state_transitions() {
        assert_eq!(
            game_state_change(&state("PRE_GAME"), &state("COUNT_DOWN")),
            GameStateChange::Countdown
        );
        assert_eq!(
            game_state_change(&state("COUNT_DOWN"), &state("IN_PROGRESS")),
            GameStateChange::Expected
        );
        assert_eq!(
            game_state_change(&state("IN_PROGRESS"), &state("PRE_GAME")),
            GameStateChange::Expected
        );
        assert_eq!(
            game_state_change(&state("IN_PROGRESS"), &state("IN_PROGRESS")),
            GameStateChange::Unchanged
        );
        assert_eq!(
            game_state_change(&state("IN_PROGRESS"), &state("COUNT_DOWN")),
            GameStateChange::Unknown {
                old: "IN_PROGRESS".to_string(),
                new: "COUNT_DOWN".to_string()
            }
        );
    }

    #[test]
    fn test_round_numbering_without_turn() {
        let mut ad_round = 0;
        assert_eq!(
            round_signal(&Vars::parse("\\round\\2\\time\\30"), &mut ad_round),
            Ok(Some(RoundSignal::Countdown(2)))
        );
        assert_eq!(
            round_signal(&Vars::parse("\\round\\2"), &mut ad_round),
            Ok(Some(RoundSignal::Start(2)))
        );
        assert_eq!(round_signal(&Vars::parse("\\round\\0"), &mut ad_round), Ok(None));
        assert_eq!(ad_round, 0);
    }

    #[test]
    fn test_round_numbering_with_turn() {
        let mut ad_round = 1;
        assert_eq!(
            round_signal(&Vars::parse("\\turn\\1\\round\\0\\state\\1"), &mut ad_round),
            Ok(Some(RoundSignal::Start(2)))
        );
        assert_eq!(ad_round, 2);

        // No round key: reuse the remembered number
        assert_eq!(
            round_signal(&Vars::parse("\\turn\\0\\state\\2\\time\\10"), &mut ad_round),
            Ok(Some(RoundSignal::Countdown(2)))
        );

        // State zero is ignored entirely
        assert_eq!(
            round_signal(&Vars::parse("\\turn\\0\\round\\5\\state\\0"), &mut ad_round),
            Ok(None)
        );
        assert_eq!(ad_round, 2);
    }

    #[test]
    fn test_round_status_malformed() {
        let mut ad_round = 0;
        assert!(round_signal(&Vars::parse("\\round\\x"), &mut ad_round).is_err());
        assert!(round_signal(&Vars::parse("\\time\\5"), &mut ad_round).is_err());
        assert_eq!(round_signal(&Vars::new(), &mut ad_round), Ok(None));
    }
}
