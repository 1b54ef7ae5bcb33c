//! Reason codes for round events and phase changes

use serde::{Deserialize, Serialize};

use crate::types::RoundPhase;

/// Reason codes for every event the round machine handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Capture feed
    // =========================================================================
    /// Classifier ready, feed started
    R001_FEED_READY,
    /// Camera or classifier could not start
    R001_FEED_UNAVAILABLE,

    // =========================================================================
    // R002: Phase reports (no change)
    // =========================================================================
    /// Phase is IDLE
    R002_PHASE_IDLE,
    /// Phase is SAMPLING
    R002_PHASE_SAMPLING,
    /// Phase is COUNTING_DOWN
    R002_PHASE_COUNTING_DOWN,
    /// Phase is RESOLVED
    R002_PHASE_RESOLVED,

    // =========================================================================
    // R003: Observations
    // =========================================================================
    /// Observation stored as latest
    R003_OBSERVATION_RECORDED,
    /// Frame without a hand
    R003_NO_HAND,
    /// Hand tracked, no gesture cleared the classifier cutoff
    R003_UNRECOGNIZED_HAND,
    /// Observation dropped, phase does not accept samples
    R003_OBSERVATION_IGNORED,
    /// Feed frozen, samples are dropped
    R003_FEED_FROZEN,

    // =========================================================================
    // R004: Countdown
    // =========================================================================
    /// First hand seen, countdown started
    R004_COUNTDOWN_STARTED,
    /// Countdown decremented
    R004_COUNTDOWN_TICK,
    /// Tick dropped, no active countdown
    R004_TICK_IGNORED,

    // =========================================================================
    // R005: Round transitions
    // =========================================================================
    /// Countdown expired with a gesture, outcome computed
    R005_ROUND_RESOLVED,
    /// Countdown expired without a gesture
    R005_ROUND_FORFEITED,
    /// Round-scoped fields cleared for a replay
    R005_ROUND_RESET,
    /// Strategy chosen for the session
    R005_STRATEGY_SELECTED,
    /// Strategy cleared, session state wiped
    R005_STRATEGY_CHANGED,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_FEED_READY => "R001_FEED_READY",
            Self::R001_FEED_UNAVAILABLE => "R001_FEED_UNAVAILABLE",
            Self::R002_PHASE_IDLE => "R002_PHASE_IDLE",
            Self::R002_PHASE_SAMPLING => "R002_PHASE_SAMPLING",
            Self::R002_PHASE_COUNTING_DOWN => "R002_PHASE_COUNTING_DOWN",
            Self::R002_PHASE_RESOLVED => "R002_PHASE_RESOLVED",
            Self::R003_OBSERVATION_RECORDED => "R003_OBSERVATION_RECORDED",
            Self::R003_NO_HAND => "R003_NO_HAND",
            Self::R003_UNRECOGNIZED_HAND => "R003_UNRECOGNIZED_HAND",
            Self::R003_OBSERVATION_IGNORED => "R003_OBSERVATION_IGNORED",
            Self::R003_FEED_FROZEN => "R003_FEED_FROZEN",
            Self::R004_COUNTDOWN_STARTED => "R004_COUNTDOWN_STARTED",
            Self::R004_COUNTDOWN_TICK => "R004_COUNTDOWN_TICK",
            Self::R004_TICK_IGNORED => "R004_TICK_IGNORED",
            Self::R005_ROUND_RESOLVED => "R005_ROUND_RESOLVED",
            Self::R005_ROUND_FORFEITED => "R005_ROUND_FORFEITED",
            Self::R005_ROUND_RESET => "R005_ROUND_RESET",
            Self::R005_STRATEGY_SELECTED => "R005_STRATEGY_SELECTED",
            Self::R005_STRATEGY_CHANGED => "R005_STRATEGY_CHANGED",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_FEED_READY => "Capture feed ready",
            Self::R001_FEED_UNAVAILABLE => "Capture feed unavailable",
            Self::R002_PHASE_IDLE => "Waiting for a strategy and feed",
            Self::R002_PHASE_SAMPLING => "Looking for a hand",
            Self::R002_PHASE_COUNTING_DOWN => "Counting down",
            Self::R002_PHASE_RESOLVED => "Round over",
            Self::R003_OBSERVATION_RECORDED => "Gesture recorded",
            Self::R003_NO_HAND => "No hand in frame",
            Self::R003_UNRECOGNIZED_HAND => "Hand seen, gesture unclear",
            Self::R003_OBSERVATION_IGNORED => "Gesture ignored",
            Self::R003_FEED_FROZEN => "Feed frozen",
            Self::R004_COUNTDOWN_STARTED => "Countdown started",
            Self::R004_COUNTDOWN_TICK => "Countdown tick",
            Self::R004_TICK_IGNORED => "Tick ignored",
            Self::R005_ROUND_RESOLVED => "Round resolved",
            Self::R005_ROUND_FORFEITED => "Round forfeited, no gesture",
            Self::R005_ROUND_RESET => "Ready for the next round",
            Self::R005_STRATEGY_SELECTED => "Strategy selected",
            Self::R005_STRATEGY_CHANGED => "Strategy cleared",
        }
    }

    /// Reports that nothing visible changed; not worth broadcasting
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            Self::R003_NO_HAND
                | Self::R003_UNRECOGNIZED_HAND
                | Self::R003_FEED_FROZEN
                | Self::R003_OBSERVATION_IGNORED
                | Self::R003_OBSERVATION_RECORDED
                | Self::R004_TICK_IGNORED
        )
    }

    /// Steady-state code for a phase
    pub fn for_phase(phase: RoundPhase) -> Self {
        match phase {
            RoundPhase::Idle => Self::R002_PHASE_IDLE,
            RoundPhase::Sampling => Self::R002_PHASE_SAMPLING,
            RoundPhase::CountingDown => Self::R002_PHASE_COUNTING_DOWN,
            RoundPhase::Resolved => Self::R002_PHASE_RESOLVED,
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
