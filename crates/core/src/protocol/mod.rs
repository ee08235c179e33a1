//! Low-level entry points and protocol classification
//!
//! The native hook layer calls one `Core::handle_*` method per engine
//! callback. Each one turns raw text and client numbers into events,
//! dispatches them, and reports an [`Outcome`] back.
//!
//! Every entry point runs inside [`guarded`]: an error or a panic is logged
//! and reported as [`Outcome::Faulted`] instead of reaching the host.

mod configstring;
mod handlers;
pub mod patterns;

pub use configstring::{game_state_change, round_signal, GameStateChange, RoundSignal};
pub use patterns::ClientCommand;

use crate::error::CoreResult;
use crate::unwind::contain;

/// What the engine should do with the action that triggered a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Let the action happen unchanged
    Allow,
    /// Let the action happen with this text instead
    Rewrite(String),
    /// Suppress the action
    Block,
    /// The core failed while handling the callback
    Faulted,
}

impl Outcome {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Block)
    }

    /// `Rewrite(text)` when `text` is present, `Allow` otherwise
    pub fn rewrite_or_allow(text: Option<String>) -> Self {
        text.map_or(Self::Allow, Self::Rewrite)
    }
}

/// Run an entry point body, converting errors and panics into `Faulted`
pub(crate) fn guarded<F>(entry: &'static str, body: F) -> Outcome
where
    F: FnOnce() -> CoreResult<Outcome>,
{
    match contain(body) {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            tracing::error!(entry, "Entry point failed: {}", e);
            Outcome::Faulted
        }
        Err(panic) => {
            tracing::error!(entry, "Entry point panicked: {}", panic);
            Outcome::Faulted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;

    #[test]
    fn test_guarded_maps_failures() {
        assert_eq!(guarded("ok", || Ok(Outcome::Block)), Outcome::Block);
        assert_eq!(
            guarded("err", || Err(EventError::UnknownEvent("x".into()).into())),
            Outcome::Faulted
        );
        assert_eq!(guarded("panic", || panic!("bad")), Outcome::Faulted);
    }
}
