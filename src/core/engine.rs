//! Opponent Strategy Engine: picks the computer's move for each round
//!
//! The engine owns the session's learning state:
//! - move history (append-only until reset)
//! - streak counter (see [`StreakPolicy`])
//! - 3x3 transition-count matrix over consecutive player moves
//! - per-round tally of gestures seen during the countdown
//!
//! Move selection never touches history or transitions; those only change
//! through [`OpponentStrategyEngine::record_player_move`], which runs after
//! the opponent has committed.

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::core::strategies::strategy_for;
use crate::types::{Move, RoundOutcome, StrategyMode, StreakPolicy};

// =============================================================================
// TRANSITION MATRIX
// =============================================================================

/// First-order transition counts, `counts[from][to]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransitionMatrix {
    counts: [[u32; 3]; 3],
}

impl TransitionMatrix {
    pub fn record(&mut self, from: Move, to: Move) {
        let cell = &mut self.counts[from.index()][to.index()];
        *cell = cell.saturating_add(1);
    }

    pub fn count(&self, from: Move, to: Move) -> u32 {
        self.counts[from.index()][to.index()]
    }

    /// Total transitions observed out of `from`
    pub fn row_total(&self, from: Move) -> u32 {
        self.counts[from.index()].iter().sum()
    }

    /// Most frequent follow-up to `from`; ties go to the earlier move in
    /// Rock, Paper, Scissors order. None if `from` has never been left.
    pub fn most_likely_after(&self, from: Move) -> Option<Move> {
        arg_max(&self.counts[from.index()])
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().flatten().all(|&c| c == 0)
    }
}

// =============================================================================
// ANTICIPATION TALLY
// =============================================================================

/// Gesture counts seen during one capture window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnticipationTally {
    counts: [u32; 3],
}

impl AnticipationTally {
    pub fn record(&mut self, mv: Move) {
        let cell = &mut self.counts[mv.index()];
        *cell = cell.saturating_add(1);
    }

    pub fn count(&self, mv: Move) -> u32 {
        self.counts[mv.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Most seen gesture, ties broken Rock > Paper > Scissors
    pub fn leader(&self) -> Option<Move> {
        arg_max(&self.counts)
    }

    pub fn clear(&mut self) {
        self.counts = [0; 3];
    }
}

/// Index of the first maximal non-zero count
fn arg_max(counts: &[u32; 3]) -> Option<Move> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &c) in counts.iter().enumerate() {
        if c > 0 && best.map_or(true, |(_, b)| c > b) {
            best = Some((i, c));
        }
    }
    best.and_then(|(i, _)| Move::from_index(i))
}

// =============================================================================
// ENGINE STATE
// =============================================================================

/// Learning state for one session, read by every strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EngineState {
    move_history: Vec<Move>,
    losing_streak: u32,
    transitions: TransitionMatrix,
    tally: AnticipationTally,
}

impl EngineState {
    /// Build a state from a known history and streak, replaying the
    /// history into the transition matrix
    pub fn from_parts(history: &[Move], losing_streak: u32) -> Self {
        let mut state = Self::default();
        for &mv in history {
            state.push_move(mv);
        }
        state.losing_streak = losing_streak;
        state
    }

    fn push_move(&mut self, mv: Move) {
        if let Some(&prev) = self.move_history.last() {
            self.transitions.record(prev, mv);
        }
        self.move_history.push(mv);
    }

    pub fn move_history(&self) -> &[Move] {
        &self.move_history
    }

    pub fn last_move(&self) -> Option<Move> {
        self.move_history.last().copied()
    }

    pub fn losing_streak(&self) -> u32 {
        self.losing_streak
    }

    pub fn transitions(&self) -> &TransitionMatrix {
        &self.transitions
    }

    pub fn tally(&self) -> &AnticipationTally {
        &self.tally
    }

    /// Mutable tally access for seeding a state by hand
    pub fn tally_mut(&mut self) -> &mut AnticipationTally {
        &mut self.tally
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// Opponent move selection plus session learning state
#[derive(Debug)]
pub struct OpponentStrategyEngine {
    state: EngineState,
    streak_policy: StreakPolicy,
    rng: StdRng,
}

impl Default for OpponentStrategyEngine {
    fn default() -> Self {
        Self::new(StreakPolicy::default(), None)
    }
}

impl OpponentStrategyEngine {
    /// Create engine; a seed makes random fallbacks reproducible
    pub fn new(streak_policy: StreakPolicy, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: EngineState::default(),
            streak_policy,
            rng,
        }
    }

    /// Create engine around an existing state
    pub fn with_state(state: EngineState, streak_policy: StreakPolicy, seed: Option<u64>) -> Self {
        let mut engine = Self::new(streak_policy, seed);
        engine.state = state;
        engine
    }

    /// Choose the opponent's move. Falls back to uniform random when the
    /// strategy has nothing to go on.
    pub fn select_move(&mut self, mode: StrategyMode) -> Move {
        match strategy_for(mode).select_move(&self.state) {
            Some(mv) => {
                debug!("{} strategy picked {}", mode, mv);
                mv
            }
            None => {
                let mv = self.random_move();
                debug!("{} strategy fell back to random {}", mode, mv);
                mv
            }
        }
    }

    fn random_move(&mut self) -> Move {
        Move::ALL[self.rng.gen_range(0..Move::ALL.len())]
    }

    /// Append the finalized player move and update transitions
    pub fn record_player_move(&mut self, mv: Move) {
        self.state.push_move(mv);
    }

    /// Advance the streak counter after a round
    pub fn record_outcome(&mut self, outcome: RoundOutcome) {
        self.state.losing_streak = self.streak_policy.advance(self.state.losing_streak, outcome);
    }

    /// Count one capture-window sample toward the anticipation tally
    pub fn record_observation_for_anticipation(&mut self, mv: Move) {
        self.state.tally.record(mv);
    }

    /// Zero the anticipation tally for a new round
    pub fn clear_tally(&mut self) {
        self.state.tally.clear();
    }

    /// Wipe all session state
    pub fn reset(&mut self) {
        self.state = EngineState::default();
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }
}

// =============================================================================
// TESTS
// =============================================================================
