//! Match tracking on the listener thread

use super::message::{StatsKind, StatsMessage};

/// Which derived event a message leads to, besides `stats`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    StatsOnly,
    GameStart,
    RoundEnd,
    GameEnd,
    Death,
    TeamSwitch,
}

/// Tracks whether a match is running so map changes do not look like
/// finished games. Survives reconnects of the feed.
#[derive(Debug, Default)]
pub struct StatsTracker {
    in_progress: bool,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Decide what `message` means and update the match flag
    pub fn route(&mut self, message: &StatsMessage) -> Route {
        match message.kind {
            StatsKind::MatchStarted => {
                self.in_progress = true;
                Route::GameStart
            }
            StatsKind::RoundOver => Route::RoundEnd,
            // Also sent on map changes and restarts
            StatsKind::MatchReport => {
                let was_running = std::mem::replace(&mut self.in_progress, false);
                if was_running {
                    Route::GameEnd
                } else {
                    Route::StatsOnly
                }
            }
            StatsKind::PlayerDeath => Route::Death,
            StatsKind::PlayerSwitchTeam => Route::TeamSwitch,
            StatsKind::Other(_) => Route::StatsOnly,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(kind: &str) -> StatsMessage {
        StatsMessage::parse(&format!(r#"{{"TYPE": "{}", "DATA": {{}}}}"#, kind)).unwrap()
    }

    #[test]
    fn test_match_report_needs_started_match() {
        let mut tracker = StatsTracker::new();
        assert_eq!(tracker.route(&message("MATCH_REPORT")), Route::StatsOnly);

        assert_eq!(tracker.route(&message("MATCH_STARTED")), Route::GameStart);
        assert!(tracker.in_progress());
        assert_eq!(tracker.route(&message("ROUND_OVER")), Route::RoundEnd);
        assert_eq!(tracker.route(&message("MATCH_REPORT")), Route::GameEnd);
        assert!(!tracker.in_progress());
        assert_eq!(tracker.route(&message("MATCH_REPORT")), Route::StatsOnly);
    }
}
