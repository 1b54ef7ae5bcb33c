//! Output structures for terminal display and the API

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{
    GestureObservation, Move, ReasonCode, RoundOutcome, RoundPhase, Scoreboard, StrategyMode,
};

/// Snapshot of the round after each handled event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundOutput {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Current phase
    pub phase: RoundPhase,
    /// Active strategy, if one is selected
    pub mode: Option<StrategyMode>,
    /// Ticks left on the countdown
    pub countdown: u32,
    /// Most recent gesture seen this round
    pub latest: Option<GestureObservation>,
    /// Finalized player move
    pub player_move: Option<Move>,
    /// Opponent move
    pub computer_move: Option<Move>,
    /// Outcome, set once per round
    pub outcome: Option<RoundOutcome>,
    /// Session scores
    pub scores: Scoreboard,
    /// Is the capture feed frozen?
    pub frozen: bool,
    /// Why this snapshot was produced
    pub reason: ReasonCode,
}

impl RoundOutput {
    /// Player result line, e.g. "You played Rock (85% confidence)"
    pub fn player_line(&self) -> String {
        match (self.player_move, self.latest) {
            (Some(mv), Some(obs)) => {
                format!("You played {} ({}% confidence)", mv, obs.confidence_percent())
            }
            (Some(mv), None) => format!("You played {}", mv),
            (None, _) => "No hand pose was detected.".to_string(),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = RoundPhase::color_reset();
        let emoji = self.phase.emoji();

        match self.outcome {
            Some(outcome) => format!(
                "{}{} {} | computer={} | {}{}{} | you {} - {} cpu{}",
                color,
                emoji,
                self.player_line(),
                fmt_move(self.computer_move),
                outcome.color_code(),
                outcome.message(),
                color,
                self.scores.player,
                self.scores.computer,
                reset
            ),
            None => format!(
                "{}{} phase={} | countdown={} | seen={} | {}{}",
                color,
                emoji,
                self.phase,
                self.countdown,
                fmt_move(self.latest.map(|o| o.mv)),
                self.reason.code(),
                reset
            ),
        }
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "phase={} | countdown={} | player={} | computer={} | outcome={} | score={}-{} | reason={}",
            self.phase,
            self.countdown,
            fmt_move(self.player_move),
            fmt_move(self.computer_move),
            self.outcome.map(|o| o.to_string()).unwrap_or_else(|| "-".to_string()),
            self.scores.player,
            self.scores.computer,
            self.reason.code()
        )
    }
}

fn fmt_move(mv: Option<Move>) -> String {
    mv.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string())
}
