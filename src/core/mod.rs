//! Core modules for RPSense

pub mod engine;
pub mod strategies;
pub mod machine;
pub mod classifier;
pub mod session;
pub mod api;

pub use engine::{AnticipationTally, EngineState, OpponentStrategyEngine, TransitionMatrix};
pub use strategies::{strategy_for, Strategy};
pub use machine::{RoundState, RoundStateMachine};
pub use classifier::{CurlEstimator, GestureClassifier, GestureDescription};
pub use session::{
    run_capture_feed, spawn_session, CaptureFeed, Frame, GameSession, RoundEvent, ScriptedFeed,
    SessionHandle,
};
pub use api::{create_router, run_server};
