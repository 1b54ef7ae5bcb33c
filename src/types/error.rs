//! Error type for game operations

use thiserror::Error;

use crate::types::RoundPhase;

/// Errors surfaced to the presentation layer.
///
/// A round without a gesture is an outcome, not an error.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("capture feed unavailable: {0}")]
    FeedUnavailable(String),
    #[error("no strategy selected")]
    NoStrategySelected,
    #[error("cannot {command} while {phase}")]
    InvalidTransition {
        phase: RoundPhase,
        command: &'static str,
    },
    #[error("unknown move: {0}")]
    UnknownMove(String),
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("session closed")]
    SessionClosed,
}

pub type Result<T> = std::result::Result<T, GameError>;
