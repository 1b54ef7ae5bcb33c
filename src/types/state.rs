//! Round phase definitions

use serde::{Deserialize, Serialize};

/// The four phases of a play-round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    /// No capture feed yet, or strategy just changed
    Idle,
    /// Feed active, waiting for a hand to appear
    Sampling,
    /// Hand seen, countdown running, feed still active
    CountingDown,
    /// Outcome computed, feed frozen
    Resolved,
}

impl RoundPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "\x1b[90m",         // Gray
            RoundPhase::Sampling => "\x1b[36m",     // Cyan
            RoundPhase::CountingDown => "\x1b[33m", // Yellow
            RoundPhase::Resolved => "\x1b[32m",     // Green
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            RoundPhase::Idle => "⏸",
            RoundPhase::Sampling => "👀",
            RoundPhase::CountingDown => "⏳",
            RoundPhase::Resolved => "🏁",
        }
    }

    /// Does the capture feed deliver observations in this phase?
    pub fn accepts_observations(&self) -> bool {
        matches!(self, RoundPhase::Sampling | RoundPhase::CountingDown)
    }
}

impl std::fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RoundPhase::Idle => "IDLE",
            RoundPhase::Sampling => "SAMPLING",
            RoundPhase::CountingDown => "COUNTING_DOWN",
            RoundPhase::Resolved => "RESOLVED",
        };
        write!(f, "{}", name)
    }
}
