//! Opponent strategy selection

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{GameError, RoundOutcome};

/// Which algorithm the opponent plays with for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyMode {
    /// Uniform random
    Random,
    /// Win-stay, lose-shift heuristic
    Conditional,
    /// First-order transition prediction
    Markov,
    /// Counter the gesture seen most during the countdown
    Anticipate,
}

impl StrategyMode {
    pub const ALL: [StrategyMode; 4] = [
        StrategyMode::Random,
        StrategyMode::Conditional,
        StrategyMode::Markov,
        StrategyMode::Anticipate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyMode::Random => "random",
            StrategyMode::Conditional => "conditional",
            StrategyMode::Markov => "markov",
            StrategyMode::Anticipate => "anticipate",
        }
    }

    /// One-line description for menus
    pub fn description(&self) -> &'static str {
        match self {
            StrategyMode::Random => "Picks a move uniformly at random",
            StrategyMode::Conditional => "Assumes you repeat winners and switch after losses",
            StrategyMode::Markov => "Learns which move you tend to play next",
            StrategyMode::Anticipate => "Watches your hand during the countdown",
        }
    }
}

impl std::fmt::Display for StrategyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrategyMode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" | "1" => Ok(StrategyMode::Random),
            "conditional" | "2" => Ok(StrategyMode::Conditional),
            "markov" | "3" => Ok(StrategyMode::Markov),
            "anticipate" | "4" => Ok(StrategyMode::Anticipate),
            _ => Err(GameError::UnknownStrategy(s.to_string())),
        }
    }
}

/// What the streak counter counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakPolicy {
    /// Consecutive player wins; reset on loss or tie
    #[default]
    PlayerWins,
    /// Consecutive player losses; reset on win or tie
    PlayerLosses,
}

impl StreakPolicy {
    /// New streak value after a round. Forfeits leave it unchanged.
    pub fn advance(&self, streak: u32, outcome: RoundOutcome) -> u32 {
        let counted = match self {
            StreakPolicy::PlayerWins => RoundOutcome::PlayerWin,
            StreakPolicy::PlayerLosses => RoundOutcome::ComputerWin,
        };
        match outcome {
            RoundOutcome::NoGesture => streak,
            o if o == counted => streak.saturating_add(1),
            _ => 0,
        }
    }
}

impl FromStr for StreakPolicy {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "player_wins" | "wins" => Ok(StreakPolicy::PlayerWins),
            "player_losses" | "losses" => Ok(StreakPolicy::PlayerLosses),
            _ => Err(GameError::InvalidConfig(format!("unknown streak policy: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strategy_names_and_ids() {
        assert_eq!("markov".parse::<StrategyMode>().unwrap(), StrategyMode::Markov);
        assert_eq!("1".parse::<StrategyMode>().unwrap(), StrategyMode::Random);
        assert_eq!("Anticipate".parse::<StrategyMode>().unwrap(), StrategyMode::Anticipate);
        assert!("mirror".parse::<StrategyMode>().is_err());
    }

    #[test]
    fn test_player_wins_policy() {
        let policy = StreakPolicy::PlayerWins;
        assert_eq!(policy.advance(0, RoundOutcome::PlayerWin), 1);
        assert_eq!(policy.advance(1, RoundOutcome::PlayerWin), 2);
        assert_eq!(policy.advance(2, RoundOutcome::Tie), 0);
        assert_eq!(policy.advance(2, RoundOutcome::ComputerWin), 0);
        assert_eq!(policy.advance(2, RoundOutcome::NoGesture), 2);
    }

    #[test]
    fn test_player_losses_policy() {
        let policy = StreakPolicy::PlayerLosses;
        assert_eq!(policy.advance(0, RoundOutcome::ComputerWin), 1);
        assert_eq!(policy.advance(1, RoundOutcome::PlayerWin), 0);
        assert_eq!(policy.advance(3, RoundOutcome::NoGesture), 3);
    }

    #[test]
    fn test_parse_streak_policy() {
        assert_eq!("player-losses".parse::<StreakPolicy>().unwrap(), StreakPolicy::PlayerLosses);
        assert_eq!("wins".parse::<StreakPolicy>().unwrap(), StreakPolicy::PlayerWins);
        assert!("ties".parse::<StreakPolicy>().is_err());
    }
}
