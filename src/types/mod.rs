//! Core types for RPSense

mod moves;
mod observation;
mod outcome;
mod strategy;
mod state;
mod reason;
mod output;
mod config;
mod error;

pub use moves::Move;
pub use observation::{Finger, FingerCurl, GestureObservation, HandSample};
pub use outcome::{RoundOutcome, Scoreboard};
pub use strategy::{StrategyMode, StreakPolicy};
pub use state::RoundPhase;
pub use reason::ReasonCode;
pub use output::RoundOutput;
pub use config::GameConfig;
pub use error::{GameError, Result};
