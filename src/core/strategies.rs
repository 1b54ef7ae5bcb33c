//! Strategy implementations, one per [`StrategyMode`]
//!
//! Each strategy reads the engine state and either commits to a move or
//! returns None, in which case the engine plays uniformly at random.

use crate::core::engine::EngineState;
use crate::types::{Move, StrategyMode};

/// A way of choosing the opponent's move
pub trait Strategy: Send + Sync {
    fn mode(&self) -> StrategyMode;

    /// Counter-move for the current state, or None to play at random
    fn select_move(&self, state: &EngineState) -> Option<Move>;
}

/// Look up the implementation for a mode
pub fn strategy_for(mode: StrategyMode) -> &'static dyn Strategy {
    match mode {
        StrategyMode::Random => &RandomPlay,
        StrategyMode::Conditional => &WinStayLoseShift,
        StrategyMode::Markov => &MarkovChain,
        StrategyMode::Anticipate => &Anticipate,
    }
}

/// Always defers to the engine's random pick
pub struct RandomPlay;

impl Strategy for RandomPlay {
    fn mode(&self) -> StrategyMode {
        StrategyMode::Random
    }

    fn select_move(&self, _state: &EngineState) -> Option<Move> {
        None
    }
}

/// Streak 0: the player repeats, so beat their last move.
/// Streak 2+: the player shifts to the move their last move beats, which
/// their last move itself beats.
/// Streak 1 or no history: random.
pub struct WinStayLoseShift;

impl Strategy for WinStayLoseShift {
    fn mode(&self) -> StrategyMode {
        StrategyMode::Conditional
    }

    fn select_move(&self, state: &EngineState) -> Option<Move> {
        let last = state.last_move()?;
        match state.losing_streak() {
            0 => Some(last.winning_move_against()),
            1 => None,
            _ => Some(last),
        }
    }
}

/// Predict the most frequent follow-up to the player's last move
pub struct MarkovChain;

impl Strategy for MarkovChain {
    fn mode(&self) -> StrategyMode {
        StrategyMode::Markov
    }

    fn select_move(&self, state: &EngineState) -> Option<Move> {
        let last = state.last_move()?;
        let transitions = state.transitions();
        if transitions.row_total(last) == 0 {
            return None;
        }
        transitions.most_likely_after(last).map(Move::winning_move_against)
    }
}

/// Beat the gesture seen most often during this round's countdown
pub struct Anticipate;

impl Strategy for Anticipate {
    fn mode(&self) -> StrategyMode {
        StrategyMode::Anticipate
    }

    fn select_move(&self, state: &EngineState) -> Option<Move> {
        state.tally().leader().map(Move::winning_move_against)
    }
}
