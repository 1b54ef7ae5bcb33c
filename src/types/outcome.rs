//! Round outcomes and session scores

use serde::{Deserialize, Serialize};

use crate::types::Move;

/// Result of one resolved round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    PlayerWin,
    ComputerWin,
    Tie,
    /// No hand was classified before the countdown expired
    NoGesture,
}

impl RoundOutcome {
    /// Decide the outcome from the finalized moves
    pub fn decide(player: Option<Move>, computer: Move) -> Self {
        match player {
            None => RoundOutcome::NoGesture,
            Some(p) if p == computer => RoundOutcome::Tie,
            Some(p) if p.beats(computer) => RoundOutcome::PlayerWin,
            Some(_) => RoundOutcome::ComputerWin,
        }
    }

    /// Result line shown to the player
    pub fn message(&self) -> &'static str {
        match self {
            RoundOutcome::PlayerWin => "You win!",
            RoundOutcome::ComputerWin => "You lose!",
            RoundOutcome::Tie => "Tie",
            RoundOutcome::NoGesture => "Couldn't find a hand... Try again?",
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            RoundOutcome::PlayerWin => "\x1b[32m",   // Green
            RoundOutcome::ComputerWin => "\x1b[31m", // Red
            RoundOutcome::Tie => "\x1b[33m",         // Yellow
            RoundOutcome::NoGesture => "\x1b[90m",   // Gray
        }
    }
}

impl std::fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoundOutcome::PlayerWin => "PLAYER_WIN",
            RoundOutcome::ComputerWin => "COMPUTER_WIN",
            RoundOutcome::Tie => "TIE",
            RoundOutcome::NoGesture => "NO_GESTURE",
        };
        write!(f, "{}", name)
    }
}

/// Session-scoped score pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub player: u32,
    pub computer: u32,
}

impl Scoreboard {
    /// Apply one outcome; ties and forfeits change nothing
    pub fn record(&mut self, outcome: RoundOutcome) {
        match outcome {
            RoundOutcome::PlayerWin => self.player += 1,
            RoundOutcome::ComputerWin => self.computer += 1,
            RoundOutcome::Tie | RoundOutcome::NoGesture => {}
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_all_pairs() {
        for p in Move::ALL {
            for c in Move::ALL {
                let outcome = RoundOutcome::decide(Some(p), c);
                if p == c {
                    assert_eq!(outcome, RoundOutcome::Tie);
                } else if p.beats(c) {
                    assert_eq!(outcome, RoundOutcome::PlayerWin);
                } else {
                    assert_eq!(outcome, RoundOutcome::ComputerWin);
                }
            }
        }
    }

    #[test]
    fn test_missing_player_move_is_no_gesture() {
        assert_eq!(RoundOutcome::decide(None, Move::Rock), RoundOutcome::NoGesture);
    }

    #[test]
    fn test_scoreboard_ignores_ties_and_forfeits() {
        let mut score = Scoreboard::default();
        score.record(RoundOutcome::PlayerWin);
        score.record(RoundOutcome::Tie);
        score.record(RoundOutcome::NoGesture);
        score.record(RoundOutcome::ComputerWin);
        score.record(RoundOutcome::ComputerWin);
        assert_eq!(score, Scoreboard { player: 1, computer: 2 });

        score.clear();
        assert_eq!(score, Scoreboard::default());
    }
}
