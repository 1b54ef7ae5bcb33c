//! RPSense: adaptive rock-paper-scissors opponent for camera-driven play
//!
//! A capture feed classifies hand poses into gestures, the round state
//! machine runs a countdown over them, and the strategy engine picks the
//! opponent's counter-move.

pub mod core;
pub mod types;

// =============================================================================
// ROUND TIMING [C]
// =============================================================================

/// Countdown start value in ticks (one tick per second by default)
pub const COUNTDOWN_START_SECS: u32 = 5;

/// Interval between countdown ticks (milliseconds)
pub const TICK_INTERVAL_MS: u64 = 1000;

/// Interval between capture-feed frames (milliseconds), roughly 60 fps
pub const FRAME_INTERVAL_MS: u64 = 16;

// =============================================================================
// CLASSIFIER [C]
// =============================================================================

/// Minimum gesture score (0-10 scale) for a hand pose to count as a move
pub const MIN_GESTURE_SCORE: f64 = 7.5;

/// Upper bound of the gesture score scale
pub const MAX_GESTURE_SCORE: f64 = 10.0;

// =============================================================================
// SESSION LOOP
// =============================================================================

/// Capacity of the serialized round-event queue
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// Capacity of the live update broadcast channel
pub const UPDATE_CHANNEL_CAPACITY: usize = 100;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
