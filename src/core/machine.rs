//! Round State Machine: one play-round at a time
//!
//! Phase transitions:
//! - IDLE → SAMPLING: capture feed ready (strategy selected)
//! - SAMPLING → COUNTING_DOWN: first tracked hand
//! - COUNTING_DOWN → COUNTING_DOWN: tick, countdown decremented
//! - COUNTING_DOWN → RESOLVED: countdown reaches 0, feed frozen
//! - RESOLVED → SAMPLING: play again (scores and history kept)
//! - any → IDLE: strategy change (everything cleared)
//!
//! Every handler runs to completion; the outcome is set exactly once per
//! round, on the tick that empties the countdown.

use log::{debug, info, warn};
use serde::Serialize;

use crate::core::engine::OpponentStrategyEngine;
use crate::types::{
    GameConfig, GameError, GestureObservation, Move, ReasonCode, Result, RoundOutcome,
    RoundOutput, RoundPhase, Scoreboard, StrategyMode,
};

/// Round-scoped fields, cleared in place at the start of every round
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundState {
    pub countdown_remaining: u32,
    pub latest_observation: Option<GestureObservation>,
    pub player_move: Option<Move>,
    pub computer_move: Option<Move>,
    pub outcome: Option<RoundOutcome>,
    pub frozen: bool,
}

impl RoundState {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Drives rounds and owns the session's scores and opponent engine
#[derive(Debug)]
pub struct RoundStateMachine {
    phase: RoundPhase,
    round: RoundState,
    scores: Scoreboard,
    engine: OpponentStrategyEngine,
    mode: Option<StrategyMode>,
    config: GameConfig,
    /// Latched feed failure; cleared by a strategy change
    feed_failure: Option<String>,
    rounds_played: u64,
}

impl Default for RoundStateMachine {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

impl RoundStateMachine {
    /// Create machine in IDLE with a fresh engine
    pub fn new(config: GameConfig) -> Self {
        let engine = OpponentStrategyEngine::new(config.streak_policy, config.seed);
        Self::with_engine(config, engine)
    }

    /// Create machine around a prepared engine
    pub fn with_engine(config: GameConfig, engine: OpponentStrategyEngine) -> Self {
        Self {
            phase: RoundPhase::Idle,
            round: RoundState::default(),
            scores: Scoreboard::default(),
            engine,
            mode: None,
            config,
            feed_failure: None,
            rounds_played: 0,
        }
    }

    // =========================================================================
    // COMMANDS
    // =========================================================================

    /// Choose the opponent strategy. Replacing an existing one wipes the
    /// session first.
    pub fn select_strategy(&mut self, mode: StrategyMode) -> RoundOutput {
        if self.mode.is_some() {
            self.change_strategy();
        }
        self.mode = Some(mode);
        info!("strategy selected: {}", mode);
        self.output(ReasonCode::R005_STRATEGY_SELECTED)
    }

    /// Classifier ready, start accepting samples
    pub fn feed_ready(&mut self) -> Result<RoundOutput> {
        if let Some(reason) = &self.feed_failure {
            return Err(GameError::FeedUnavailable(reason.clone()));
        }
        if self.mode.is_none() {
            return Err(GameError::NoStrategySelected);
        }
        if self.phase != RoundPhase::Idle {
            return Err(GameError::InvalidTransition {
                phase: self.phase,
                command: "start the feed",
            });
        }
        self.round.clear();
        self.phase = RoundPhase::Sampling;
        info!("capture feed ready, sampling");
        Ok(self.output(ReasonCode::R001_FEED_READY))
    }

    /// Record that the feed could not start; the session stays IDLE
    pub fn feed_failed(&mut self, reason: impl Into<String>) -> GameError {
        let reason = reason.into();
        warn!("capture feed unavailable: {}", reason);
        self.feed_failure = Some(reason.clone());
        self.phase = RoundPhase::Idle;
        self.round.clear();
        GameError::FeedUnavailable(reason)
    }

    /// Handle a frame in which a hand was tracked. `observation` is its
    /// classified gesture, None when nothing cleared the classifier cutoff.
    ///
    /// Any tracked hand starts the countdown; only recognized gestures
    /// replace the latest observation.
    pub fn observe(&mut self, observation: Option<GestureObservation>) -> RoundOutput {
        if let Some(dropped) = self.drop_frame() {
            return dropped;
        }

        let reason = match observation {
            Some(obs) => {
                self.round.latest_observation = Some(obs);
                self.engine.record_observation_for_anticipation(obs.mv);
                debug!("observed {} ({}%)", obs.mv, obs.confidence_percent());
                ReasonCode::R003_OBSERVATION_RECORDED
            }
            None => ReasonCode::R003_UNRECOGNIZED_HAND,
        };

        if self.phase == RoundPhase::Sampling {
            self.phase = RoundPhase::CountingDown;
            self.round.countdown_remaining = self.config.countdown_secs;
            info!("hand detected, countdown from {}", self.round.countdown_remaining);
            return self.output(ReasonCode::R004_COUNTDOWN_STARTED);
        }
        self.output(reason)
    }

    /// Handle a frame without a hand
    pub fn observe_empty(&mut self) -> RoundOutput {
        if let Some(dropped) = self.drop_frame() {
            return dropped;
        }
        self.output(ReasonCode::R003_NO_HAND)
    }

    fn drop_frame(&self) -> Option<RoundOutput> {
        if self.round.frozen {
            return Some(self.output(ReasonCode::R003_FEED_FROZEN));
        }
        if !self.phase.accepts_observations() {
            return Some(self.output(ReasonCode::R003_OBSERVATION_IGNORED));
        }
        None
    }

    /// Advance the countdown by one tick
    pub fn tick(&mut self) -> RoundOutput {
        if !self.timer_armed() {
            return self.output(ReasonCode::R004_TICK_IGNORED);
        }
        self.round.countdown_remaining = self.round.countdown_remaining.saturating_sub(1);
        debug!("countdown {}", self.round.countdown_remaining);
        if self.round.countdown_remaining == 0 {
            return self.resolve();
        }
        self.output(ReasonCode::R004_COUNTDOWN_TICK)
    }

    /// Stop the capture feed. Later samples and ticks are dropped.
    pub fn freeze(&mut self) -> RoundOutput {
        if !self.round.frozen {
            debug!("capture feed frozen");
        }
        self.round.frozen = true;
        self.output(ReasonCode::R003_FEED_FROZEN)
    }

    /// Play again: clear round fields, keep scores and history
    pub fn reset_round(&mut self) -> Result<RoundOutput> {
        if self.phase == RoundPhase::Idle {
            return Err(GameError::InvalidTransition {
                phase: self.phase,
                command: "reset the round",
            });
        }
        self.round.clear();
        self.engine.clear_tally();
        self.phase = RoundPhase::Sampling;
        info!("round reset, sampling");
        Ok(self.output(ReasonCode::R005_ROUND_RESET))
    }

    /// Clear the strategy and wipe all session state
    pub fn change_strategy(&mut self) -> RoundOutput {
        self.round.clear();
        self.engine.reset();
        self.scores.clear();
        self.mode = None;
        self.feed_failure = None;
        self.rounds_played = 0;
        self.phase = RoundPhase::Idle;
        info!("strategy cleared, session reset");
        self.output(ReasonCode::R005_STRATEGY_CHANGED)
    }

    // =========================================================================
    // RESOLUTION
    // =========================================================================

    fn resolve(&mut self) -> RoundOutput {
        self.round.frozen = true;
        let player = self.round.latest_observation.map(|o| o.mv);
        // Countdown only runs after feed_ready, which requires a strategy
        let mode = self.mode.unwrap_or(StrategyMode::Random);
        let computer = self.engine.select_move(mode);
        let outcome = RoundOutcome::decide(player, computer);

        self.round.player_move = player;
        self.round.computer_move = Some(computer);
        self.round.outcome = Some(outcome);
        self.scores.record(outcome);
        self.rounds_played += 1;

        if let Some(mv) = player {
            self.engine.record_player_move(mv);
            self.engine.record_outcome(outcome);
        }
        self.phase = RoundPhase::Resolved;

        info!(
            "round {} resolved: player={} computer={} outcome={} score={}-{}",
            self.rounds_played,
            player.map(|m| m.name()).unwrap_or("-"),
            computer,
            outcome,
            self.scores.player,
            self.scores.computer
        );

        let reason = match outcome {
            RoundOutcome::NoGesture => ReasonCode::R005_ROUND_FORFEITED,
            _ => ReasonCode::R005_ROUND_RESOLVED,
        };
        self.output(reason)
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Is the countdown timer allowed to fire?
    pub fn timer_armed(&self) -> bool {
        self.phase == RoundPhase::CountingDown && !self.round.frozen
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn scores(&self) -> Scoreboard {
        self.scores
    }

    pub fn engine(&self) -> &OpponentStrategyEngine {
        &self.engine
    }

    pub fn mode(&self) -> Option<StrategyMode> {
        self.mode
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// Current output without handling an event. A latched feed failure
    /// is reported instead of the phase.
    pub fn snapshot(&self) -> RoundOutput {
        match self.feed_failure {
            Some(_) => self.output(ReasonCode::R001_FEED_UNAVAILABLE),
            None => self.output(ReasonCode::for_phase(self.phase)),
        }
    }

    fn output(&self, reason: ReasonCode) -> RoundOutput {
        RoundOutput {
            timestamp: chrono::Utc::now(),
            phase: self.phase,
            mode: self.mode,
            countdown: self.round.countdown_remaining,
            latest: self.round.latest_observation,
            player_move: self.round.player_move,
            computer_move: self.round.computer_move,
            outcome: self.round.outcome,
            scores: self.scores,
            frozen: self.round.frozen,
            reason,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::COUNTDOWN_START_SECS;

    fn started(mode: StrategyMode) -> RoundStateMachine {
        let mut machine = RoundStateMachine::new(GameConfig { seed: Some(5), ..GameConfig::default() });
        machine.select_strategy(mode);
        machine.feed_ready().unwrap();
        machine
    }

    fn rock() -> Option<GestureObservation> {
        Some(GestureObservation::new(Move::Rock, 0.9))
    }

    #[test]
    fn test_initial_phase_is_idle() {
        let machine = RoundStateMachine::default();
        assert_eq!(machine.phase(), RoundPhase::Idle);
        assert_eq!(machine.mode(), None);
    }

    #[test]
    fn test_feed_ready_requires_strategy() {
        let mut machine = RoundStateMachine::default();
        assert!(matches!(machine.feed_ready(), Err(GameError::NoStrategySelected)));
    }

    #[test]
    fn test_feed_ready_twice_is_invalid() {
        let mut machine = started(StrategyMode::Random);
        assert!(matches!(
            machine.feed_ready(),
            Err(GameError::InvalidTransition { phase: RoundPhase::Sampling, .. })
        ));
    }

    #[test]
    fn test_no_hand_keeps_sampling() {
        let mut machine = started(StrategyMode::Random);
        let output = machine.observe_empty();
        assert_eq!(output.phase, RoundPhase::Sampling);
        assert_eq!(output.reason, ReasonCode::R003_NO_HAND);
    }

    #[test]
    fn test_unrecognized_hand_starts_countdown_and_forfeits() {
        let mut machine = started(StrategyMode::Random);
        let output = machine.observe(None);
        assert_eq!(output.phase, RoundPhase::CountingDown);
        assert_eq!(output.latest, None);

        let mut last = output;
        for _ in 0..COUNTDOWN_START_SECS {
            last = machine.tick();
        }
        assert_eq!(last.outcome, Some(RoundOutcome::NoGesture));
        assert_eq!(last.reason, ReasonCode::R005_ROUND_FORFEITED);
        assert_eq!(last.scores, Scoreboard::default());
        assert!(machine.engine().state().move_history().is_empty());
    }

    #[test]
    fn test_unrecognized_hand_keeps_earlier_gesture() {
        let mut machine = started(StrategyMode::Random);
        machine.observe(rock());
        machine.observe(None);
        assert_eq!(machine.round().latest_observation.map(|o| o.mv), Some(Move::Rock));
    }

    #[test]
    fn test_first_gesture_starts_countdown() {
        let mut machine = started(StrategyMode::Random);
        let output = machine.observe(rock());
        assert_eq!(output.phase, RoundPhase::CountingDown);
        assert_eq!(output.countdown, COUNTDOWN_START_SECS);
        assert_eq!(output.reason, ReasonCode::R004_COUNTDOWN_STARTED);
    }

    #[test]
    fn test_later_gestures_overwrite_latest() {
        let mut machine = started(StrategyMode::Random);
        machine.observe(rock());
        machine.tick();
        let output = machine.observe(Some(GestureObservation::new(Move::Paper, 0.8)));
        assert_eq!(output.countdown, COUNTDOWN_START_SECS - 1);
        assert_eq!(output.latest.map(|o| o.mv), Some(Move::Paper));
    }

    #[test]
    fn test_ticks_ignored_before_countdown() {
        let mut machine = started(StrategyMode::Random);
        let output = machine.tick();
        assert_eq!(output.reason, ReasonCode::R004_TICK_IGNORED);
        assert_eq!(output.phase, RoundPhase::Sampling);
    }

    #[test]
    fn test_observations_ignored_when_idle() {
        let mut machine = RoundStateMachine::default();
        machine.select_strategy(StrategyMode::Random);
        let output = machine.observe(rock());
        assert_eq!(output.reason, ReasonCode::R003_OBSERVATION_IGNORED);
        assert_eq!(output.latest, None);
    }

    #[test]
    fn test_resolution_freezes_feed() {
        let mut machine = started(StrategyMode::Random);
        machine.observe(rock());
        for _ in 0..COUNTDOWN_START_SECS {
            machine.tick();
        }
        assert_eq!(machine.phase(), RoundPhase::Resolved);
        assert!(machine.round().frozen);

        let output = machine.observe(Some(GestureObservation::new(Move::Scissors, 1.0)));
        assert_eq!(output.reason, ReasonCode::R003_FEED_FROZEN);
        assert_eq!(output.player_move, Some(Move::Rock));
    }

    #[test]
    fn test_freeze_stops_countdown() {
        let mut machine = started(StrategyMode::Random);
        machine.observe(rock());
        machine.freeze();
        for _ in 0..10 {
            machine.tick();
        }
        assert_eq!(machine.phase(), RoundPhase::CountingDown);
        assert_eq!(machine.round().countdown_remaining, COUNTDOWN_START_SECS);
        assert_eq!(machine.round().outcome, None);
    }

    #[test]
    fn test_reset_round_from_idle_fails() {
        let mut machine = RoundStateMachine::default();
        assert!(machine.reset_round().is_err());
    }

    #[test]
    fn test_feed_failure_latches_until_strategy_change() {
        let mut machine = RoundStateMachine::default();
        machine.select_strategy(StrategyMode::Markov);
        let err = machine.feed_failed("camera denied");
        assert!(matches!(err, GameError::FeedUnavailable(_)));
        assert!(matches!(machine.feed_ready(), Err(GameError::FeedUnavailable(_))));

        machine.change_strategy();
        machine.select_strategy(StrategyMode::Markov);
        assert!(machine.feed_ready().is_ok());
    }

    #[test]
    fn test_feed_ready_clears_early_freeze() {
        let mut machine = RoundStateMachine::default();
        machine.select_strategy(StrategyMode::Random);
        machine.freeze();
        let ready = machine.feed_ready().unwrap();
        assert!(!ready.frozen);

        let output = machine.observe(rock());
        assert_eq!(output.phase, RoundPhase::CountingDown);
        assert_eq!(output.reason, ReasonCode::R004_COUNTDOWN_STARTED);
    }

    #[test]
    fn test_snapshot_reports_feed_failure() {
        let mut machine = RoundStateMachine::default();
        machine.select_strategy(StrategyMode::Random);
        assert_eq!(machine.snapshot().reason, ReasonCode::R002_PHASE_IDLE);
        machine.feed_failed("no camera");
        assert_eq!(machine.snapshot().reason, ReasonCode::R001_FEED_UNAVAILABLE);
    }

    #[test]
    fn test_selecting_new_strategy_wipes_session() {
        let mut machine = started(StrategyMode::Random);
        machine.observe(rock());
        for _ in 0..COUNTDOWN_START_SECS {
            machine.tick();
        }
        assert_eq!(machine.engine().state().move_history().len(), 1);

        let output = machine.select_strategy(StrategyMode::Anticipate);
        assert_eq!(output.phase, RoundPhase::Idle);
        assert_eq!(output.mode, Some(StrategyMode::Anticipate));
        assert!(machine.engine().state().move_history().is_empty());
    }
}
